use roxmltree::{Document, Node};

use crate::error::{Result, StormError};
use crate::extract::parse_coordinates;
use crate::model::{ForecastTrackPoint, Position};
use crate::timezone::parse_advisory_timestamp;
use crate::xml::{Navigator, parse_document};

const TRACK_FOLDER: &str = "Document/Folder[@id='Forecast Track']";

/// Extracts the forecast positions of a forecast-track document.
///
/// The folder mixes one `LineString` placemark with one `Point` placemark per forecast position;
/// only the latter carry extended data and become records. A point without a readable position
/// is left out.
pub fn extract_forecast_track_points(kml: &str, ns: &str) -> Result<Vec<ForecastTrackPoint>> {
    let doc = parse_document(kml)?;
    let nav = Navigator::new(ns);
    let folder = track_folder(&nav, &doc)?;

    Ok(nav
        .find_all(folder, "Placemark")
        .into_iter()
        .filter(|placemark| nav.find(*placemark, "Point").is_some())
        .filter_map(|placemark| forecast_point(&nav, placemark))
        .collect())
}

/// Coordinates of the first `LineString` placemark in the forecast-track folder.
pub fn extract_forecast_track_line(kml: &str, ns: &str) -> Result<Option<Vec<Position>>> {
    let doc = parse_document(kml)?;
    let nav = Navigator::new(ns);
    let folder = track_folder(&nav, &doc)?;

    let Some(placemark) = nav
        .find_all(folder, "Placemark")
        .into_iter()
        .find(|p| nav.find(*p, "LineString").is_some())
    else {
        return Ok(None);
    };

    let coordinates = nav
        .text(placemark, "LineString/coordinates")
        .ok_or_else(|| StormError::missing(format!("{TRACK_FOLDER}/Placemark/LineString/coordinates")))?;
    parse_coordinates(coordinates).map(Some)
}

fn track_folder<'a, 'input>(nav: &Navigator, doc: &'a Document<'input>) -> Result<Node<'a, 'input>> {
    nav.find(doc.root_element(), TRACK_FOLDER)
        .ok_or_else(|| StormError::missing(TRACK_FOLDER))
}

fn forecast_point(nav: &Navigator, placemark: Node) -> Option<ForecastTrackPoint> {
    Some(ForecastTrackPoint {
        tc_speed: nav.data_field(placemark, "tcSpd").ok(),
        latitude: nav.data_field(placemark, "lat").ok()?,
        longitude: nav.data_field(placemark, "lon").ok()?,
        storm_type: nav.data_text(placemark, "stormType"),
        expected_speed: nav.data_field(placemark, "fctspd").ok(),
        atcf_id: nav.data_text(placemark, "atcfid"),
        storm_number: nav.data_field(placemark, "stormNum").ok(),
        storm_name: nav.data_text(placemark, "storm"),
        label: nav.data_text(placemark, "dateLbl"),
        region: nav.data_text(placemark, "basin"),
        advisory_number: nav.data_text(placemark, "advisoryNum"),
        direction: nav.data_field(placemark, "tcDir").ok(),
        dvlp: nav.data_text(placemark, "TcDvlp"),
        movement: nav.data_text(placemark, "movement"),
        timezone: nav.data_text(placemark, "timezone"),
        wind_gust: nav.data_text(placemark, "wndGust"),
        pressure: nav.data_field(placemark, "mslp").ok(),
        tau: nav.data_text(placemark, "tau"),
        max_wind: nav.data_text(placemark, "maxWnd"),
        advisory_datetime: nav
            .data_field::<String>(placemark, "advisoryDate")
            .ok()
            .and_then(|s| parse_advisory_timestamp(&s).ok()),
    })
}
