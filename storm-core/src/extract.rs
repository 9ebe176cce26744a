//! Record extractors, one per document shape the agency publishes.
//!
//! Each extractor takes the raw KML text plus the namespace the document is written in, and
//! returns typed records in document order. Missing leaf values become defaults and a placemark
//! without a position is left out; a truncated document, a missing enclosing folder or a missing
//! coordinate string is an error.

use chrono::{FixedOffset, Offset, Utc};

use crate::error::{Result, StormError};
use crate::model::Position;

pub mod active;
pub mod best_track;
pub mod closed;
pub mod cone;
pub mod forecast;
pub mod listing;

pub use active::extract_active_storms;
pub use best_track::extract_best_track_points;
pub use closed::extract_closed_storm;
pub use cone::extract_forecast_cone;
pub use forecast::{extract_forecast_track_line, extract_forecast_track_points};
pub use listing::scrape_kmz_links;

/// Namespace of the active-storm index, forecast-track and cone documents.
pub const KML_NS_OPENGIS: &str = "http://www.opengis.net/kml/2.2";

/// Namespace of the best-track archives.
pub const KML_NS_GOOGLE_EARTH: &str = "http://earth.google.com/kml/2.2";

/// `atcfdtg` values: `YYYYMMDDHH`, always UTC.
pub const ATCF_DTG_FORMAT: &str = "%Y%m%d%H";

pub(crate) fn utc() -> FixedOffset {
    Utc.fix()
}

/// Parses a KML `<coordinates>` string of `lon,lat[,elev]` tuples.
pub fn parse_coordinates(text: &str) -> Result<Vec<Position>> {
    text.split_whitespace()
        .map(|tuple| {
            let mut parts = tuple.split(',');
            let lon = parts.next().and_then(|v| v.parse::<f64>().ok());
            let lat = parts.next().and_then(|v| v.parse::<f64>().ok());
            match (lon, lat) {
                (Some(lon), Some(lat)) => Ok(Position::new(lat, lon)),
                _ => Err(StormError::MalformedCoordinates(tuple.to_string())),
            }
        })
        .collect()
}
