//! GeoJSON feature construction.
//!
//! Every builder takes [`Position`]s and emits `[longitude, latitude]`, whatever order the
//! source document used.

use geojson::{Feature, FeatureCollection, Geometry, JsonObject, JsonValue, Value};
use serde::Serialize;

use crate::model::Position;

fn feature(value: Value, properties: JsonObject) -> Feature {
    Feature {
        bbox: None,
        geometry: Some(Geometry {
            bbox: None,
            value,
            foreign_members: None,
        }),
        id: None,
        properties: Some(properties),
        foreign_members: None,
    }
}

pub fn point_feature(position: Position, properties: JsonObject) -> Feature {
    feature(Value::Point(position.lon_lat()), properties)
}

/// An empty slice gives a zero-point line rather than an error.
pub fn line_feature(positions: &[Position], properties: JsonObject) -> Feature {
    feature(
        Value::LineString(positions.iter().map(Position::lon_lat).collect()),
        properties,
    )
}

/// Single-ring polygon. There is no such thing as an empty polygon, so an absent or empty ring
/// yields `None`. An open ring is closed by repeating its first position.
pub fn polygon_feature(ring: Option<&[Position]>, properties: JsonObject) -> Option<Feature> {
    let ring = ring?;
    let first = ring.first()?;

    let mut coords: Vec<Vec<f64>> = ring.iter().map(Position::lon_lat).collect();
    if ring.last() != Some(first) {
        coords.push(first.lon_lat());
    }
    Some(feature(Value::Polygon(vec![coords]), properties))
}

/// Flattens a record into a property map.
pub fn record_properties<R: Serialize>(record: &R) -> JsonObject {
    match serde_json::to_value(record) {
        Ok(JsonValue::Object(map)) => map,
        _ => JsonObject::new(),
    }
}

/// Record fields are written over `tags`, so on a key collision the record wins.
pub fn merge_properties(mut tags: JsonObject, record: JsonObject) -> JsonObject {
    tags.extend(record);
    tags
}

/// The output unit: all features of one storm, plus optional storm metadata.
#[derive(Debug, Clone, PartialEq)]
pub struct StormFeatureCollection {
    pub features: Vec<Feature>,
    pub metadata: Option<JsonObject>,
}

impl StormFeatureCollection {
    /// Metadata goes out as a top-level `metadata` member next to `type` and `features`.
    pub fn to_geojson(&self) -> FeatureCollection {
        let foreign_members = self.metadata.as_ref().map(|metadata| {
            let mut members = JsonObject::new();
            members.insert("metadata".to_string(), JsonValue::Object(metadata.clone()));
            members
        });

        FeatureCollection {
            bbox: None,
            features: self.features.clone(),
            foreign_members,
        }
    }

    pub fn to_json_pretty(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(&self.to_geojson())
    }
}
