use roxmltree::Node;

use crate::error::{Result, StormError};
use crate::extract::{ATCF_DTG_FORMAT, utc};
use crate::model::{ClosedStorm, ClosedStormPoint};
use crate::xml::{Navigator, parse_document};

/// Extracts every placemark of a finalized storm document, at any folder depth. Placemarks
/// without a readable position are left out.
pub fn extract_closed_storm(kml: &str, ns: &str) -> Result<ClosedStorm> {
    let doc = parse_document(kml)?;
    let nav = Navigator::new(ns);
    let root = doc.root_element();

    let storm_id = nav
        .text(root, "Document/name")
        .ok_or_else(|| StormError::missing("Document/name"))?
        .to_string();

    let points = nav
        .find_all(root, ".//Placemark")
        .into_iter()
        .filter_map(|placemark| closed_point(&nav, placemark))
        .collect();

    Ok(ClosedStorm { storm_id, points })
}

fn closed_point(nav: &Navigator, placemark: Node) -> Option<ClosedStormPoint> {
    Some(ClosedStormPoint {
        title: nav.lookup(placemark, "name", String::new()),
        lat: nav.field(placemark, "lat").ok()?,
        lng: nav.field(placemark, "lon").ok()?,
        storm_name: nav.lookup(placemark, "stormName", String::new()),
        storm_number: nav.lookup(placemark, "stormNum", String::new()),
        basin: nav.lookup(placemark, "basin", String::new()),
        storm_type: nav.lookup(placemark, "stormType", String::new()),
        intensity_mph: nav.field(placemark, "intensityMPH").ok(),
        intensity_kph: nav.field(placemark, "intensityKPH").ok(),
        pressure: nav.field(placemark, "minSeaLevelPres").ok(),
        datetime: nav
            .datetime(placemark, "atcfdtg", ATCF_DTG_FORMAT, utc())
            .ok(),
    })
}
