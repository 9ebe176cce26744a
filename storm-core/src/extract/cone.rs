use crate::error::{Result, StormError};
use crate::extract::parse_coordinates;
use crate::model::ForecastCone;
use crate::xml::{Navigator, parse_document};

const RING_PATH: &str = "Polygon/outerBoundaryIs/LinearRing/coordinates";

/// Extracts the cone of uncertainty for a forecast horizon (`fcstpd`, in hours).
///
/// Returns `None` when no placemark is published for that horizon. When several placemarks share
/// a horizon the first one in document order wins.
pub fn extract_forecast_cone(kml: &str, ns: &str, hours: u32) -> Result<Option<ForecastCone>> {
    let doc = parse_document(kml)?;
    let nav = Navigator::new(ns);

    let Some(placemark) = nav
        .find_all(doc.root_element(), "Document/Folder/Placemark")
        .into_iter()
        .find(|p| nav.data_field::<u32>(*p, "fcstpd").ok() == Some(hours))
    else {
        return Ok(None);
    };

    let coordinates = nav
        .text(placemark, RING_PATH)
        .ok_or_else(|| StormError::missing(format!("Placemark[fcstpd={hours}]/{RING_PATH}")))?;

    Ok(Some(ForecastCone {
        hours,
        ring: parse_coordinates(coordinates)?,
    }))
}
