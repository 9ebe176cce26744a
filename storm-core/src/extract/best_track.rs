use roxmltree::Node;

use crate::error::{Result, StormError};
use crate::extract::{ATCF_DTG_FORMAT, utc};
use crate::model::BestTrackPoint;
use crate::xml::{Navigator, parse_document};

const DATA_FOLDER: &str = "Document/Folder[@id='data']";

/// Extracts the archived observations of a best-track document.
///
/// One record per `Placemark` of the `data` folder, in document order. A placemark without a
/// usable position has no geometry and is left out; every other field falls back to its default.
pub fn extract_best_track_points(kml: &str, ns: &str) -> Result<Vec<BestTrackPoint>> {
    let doc = parse_document(kml)?;
    let nav = Navigator::new(ns);

    let folder = nav
        .find(doc.root_element(), DATA_FOLDER)
        .ok_or_else(|| StormError::missing(DATA_FOLDER))?;

    Ok(nav
        .find_all(folder, "Placemark")
        .into_iter()
        .filter_map(|placemark| best_track_point(&nav, placemark))
        .collect())
}

fn best_track_point(nav: &Navigator, placemark: Node) -> Option<BestTrackPoint> {
    Some(BestTrackPoint {
        latitude: nav.field(placemark, "lat").ok()?,
        longitude: nav.field(placemark, "lon").ok()?,
        name: nav.lookup(placemark, "stormName", String::new()),
        number: nav.field(placemark, "stormNum").ok(),
        region: nav.lookup(placemark, "basin", String::new()),
        intensity_mph: nav.field(placemark, "intensityMPH").ok(),
        intensity_kph: nav.field(placemark, "intensityKPH").ok(),
        pressure: nav.field(placemark, "minSeaLevelPres").ok(),
        datetime: nav
            .datetime(placemark, "atcfdtg", ATCF_DTG_FORMAT, utc())
            .ok(),
    })
}
