use chrono::NaiveDate;
use roxmltree::Node;

use crate::error::{Result, StormError};
use crate::model::{ActiveStorm, Region, StormLinks, StormSummary};
use crate::timezone::parse_local_timestamp;
use crate::xml::{Navigator, attribute, data_path, parse_document};

/// Reads the active-storms index: one entry per storm folder.
///
/// Folders whose id is in `skip` (wind-speed probabilities, for instance) are ignored. A storm
/// whose position or advisory time cannot be read comes back as an `Err` in its slot without
/// affecting the others. `reference` fills in the date when the advisory time only carries a
/// weekday.
pub fn extract_active_storms(
    kml: &str,
    ns: &str,
    skip: &[String],
    reference: NaiveDate,
) -> Result<Vec<Result<ActiveStorm>>> {
    let doc = parse_document(kml)?;
    let nav = Navigator::new(ns);

    let storms = nav
        .find_all(doc.root_element(), "Document/Folder")
        .into_iter()
        .enumerate()
        .filter(|(_, folder)| {
            folder
                .attribute("id")
                .is_none_or(|id| !skip.iter().any(|s| s == id))
        })
        .map(|(idx, folder)| active_storm(&nav, folder, idx, reference))
        .collect();

    Ok(storms)
}

fn active_storm(
    nav: &Navigator,
    folder: Node,
    idx: usize,
    reference: NaiveDate,
) -> Result<ActiveStorm> {
    let id = attribute(Some(folder), "id", "");
    if id.is_empty() {
        return Err(StormError::missing(format!("Document/Folder[{idx}]/@id")));
    }
    let missing =
        |name: &str| StormError::missing(format!("Folder[@id='{id}']/{}", data_path(name)));

    let latitude = nav
        .data_field::<f64>(folder, "centerLat")
        .ok()
        .ok_or_else(|| missing("centerLat"))?;
    let longitude = nav
        .data_field::<f64>(folder, "centerLon")
        .ok()
        .ok_or_else(|| missing("centerLon"))?;
    let datetime_str = nav
        .data_field::<String>(folder, "dateTime")
        .ok()
        .ok_or_else(|| missing("dateTime"))?;
    let datetime = parse_local_timestamp(&datetime_str, reference)?;

    let wallet = nav.data_text(folder, "wallet");
    let summary = StormSummary {
        storm_type: title_case(&nav.data_text(folder, "tcType")),
        storm_name: title_case(&nav.data_text(folder, "tcName")),
        // The index has no separate ATCF field; the wallet doubles as the id.
        atcf_id: wallet.clone(),
        region: Region::from_wallet(&wallet),
        wallet,
        latitude,
        longitude,
        datetime_str,
        datetime,
        movement: nav.data_text(folder, "movement"),
        pressure_mb: with_unit(&nav.data_text(folder, "minimumPressure"), "mb"),
        max_winds_mph: with_unit(&nav.data_text(folder, "maxSustainedWind"), "mph"),
        headline: nav.data_text(folder, "headline"),
        id,
    };

    let links = StormLinks {
        best_track: nav
            .find_all(folder, "NetworkLink")
            .into_iter()
            .find(|link| link.attribute("id").is_some_and(|v| v.ends_with("bt")))
            .and_then(|link| nav.text(link, "Link/href"))
            .map(str::to_string),
        forecast_track: forecast_link(nav, folder, &summary.id, "TRACK"),
        forecast_cone: forecast_link(nav, folder, &summary.id, "CONE"),
    };

    Ok(ActiveStorm { summary, links })
}

fn forecast_link(nav: &Navigator, folder: Node, id: &str, kind: &str) -> Option<String> {
    let path =
        format!("Folder[@id='{id}forecast']/NetworkLink[@id='{id}forecast{kind}']/Link/href");
    nav.text(folder, &path).map(str::to_string)
}

/// `"1004 mb"` -> `1004.0`
fn with_unit<T: std::str::FromStr>(text: &str, unit: &str) -> Option<T> {
    let text = text.trim();
    let number = text.strip_suffix(unit).unwrap_or(text).trim();
    number.parse().ok()
}

/// Uppercases the first letter of every word and lowercases the rest.
pub fn title_case(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut previous_is_letter = false;
    for c in text.chars() {
        if previous_is_letter {
            out.extend(c.to_lowercase());
        } else {
            out.extend(c.to_uppercase());
        }
        previous_is_letter = c.is_alphabetic();
    }
    out
}
