//! Per-storm assembly of extracted records into feature collections.

use geojson::{Feature, JsonObject, JsonValue};
use serde_json::json;

use crate::feature::{
    StormFeatureCollection, line_feature, merge_properties, point_feature, polygon_feature,
    record_properties,
};
use crate::model::{
    ActiveStormTracks, ClosedStorm, ForecastCone, Position, StormRecord, StormSummary,
};

fn tags(kind: &str, id: &str) -> JsonObject {
    let mut tags = JsonObject::new();
    tags.insert("type".to_string(), JsonValue::from(kind));
    tags.insert("id".to_string(), JsonValue::from(id));
    tags
}

fn point_features<I>(records: I, kind: &str, id: &str) -> Vec<Feature>
where
    I: IntoIterator,
    I::Item: Into<StormRecord>,
{
    records
        .into_iter()
        .map(|record| {
            let record = record.into();
            let properties = merge_properties(tags(kind, id), record_properties(&record));
            point_feature(record.position(), properties)
        })
        .collect()
}

fn cone_feature(cone: Option<&ForecastCone>, hours: u32, id: &str) -> Option<Feature> {
    let mut properties = tags("cone", id);
    properties.insert("hours".to_string(), json!(hours));
    properties.insert(
        "description".to_string(),
        json!(format!("{hours}-hour cone of uncertainty")),
    );
    polygon_feature(cone.map(|c| c.ring.as_slice()), properties)
}

/// Features of an active storm, in output order: best-track points and line, forecast points and
/// line, then whichever cones exist. Without forecast points the forecast line falls back to the
/// document's own `LineString`.
pub fn active_storm_collection(
    summary: &StormSummary,
    tracks: &ActiveStormTracks,
) -> StormFeatureCollection {
    let id = summary.id.as_str();
    let mut features = point_features(tracks.best_track.iter().cloned(), "track_point", id);

    let best_line: Vec<_> = tracks
        .best_track
        .iter()
        .map(|p| Position::new(p.latitude, p.longitude))
        .collect();
    features.push(line_feature(&best_line, tags("track_line", id)));

    features.extend(point_features(
        tracks.forecast_track.iter().cloned(),
        "forecast_track_point",
        id,
    ));

    let forecast_line: Vec<_> = match (&tracks.forecast_line, tracks.forecast_track.is_empty()) {
        (Some(line), true) => line.clone(),
        _ => tracks
            .forecast_track
            .iter()
            .map(|p| Position::new(p.latitude, p.longitude))
            .collect(),
    };
    features.push(line_feature(&forecast_line, tags("forecast_line", id)));

    features.extend(cone_feature(tracks.cone_72_hour.as_ref(), 72, id));
    features.extend(cone_feature(tracks.cone_120_hour.as_ref(), 120, id));

    StormFeatureCollection {
        features,
        metadata: Some(record_properties(summary)),
    }
}

/// Features of a closed storm: one point per placemark, then an untagged line through them.
pub fn closed_storm_collection(storm: &ClosedStorm) -> StormFeatureCollection {
    let line: Vec<_> = storm.points.iter().map(|p| Position::new(p.lat, p.lng)).collect();

    let mut features: Vec<Feature> = storm
        .points
        .iter()
        .zip(&line)
        .map(|(p, position)| point_feature(*position, record_properties(p)))
        .collect();
    features.push(line_feature(&line, JsonObject::new()));

    StormFeatureCollection {
        features,
        metadata: None,
    }
}

/// `storm_<id>.geojson`
pub fn active_file_name(summary: &StormSummary) -> String {
    format!("storm_{}.geojson", summary.id)
}

/// `<normalized id>.geojson`
pub fn closed_file_name(storm: &ClosedStorm) -> String {
    format!("{}.geojson", storm.normalized_id())
}
