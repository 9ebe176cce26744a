use chrono::{DateTime, Utc};
use serde::{Serialize, Serializer};

/// Forecast horizons the cone documents are published for.
pub const CONE_HOURS: [u32; 2] = [72, 120];

/// A geographic position with explicit axis names.
///
/// KML sources disagree on axis order; extractors fill this in by name, and the feature builder is
/// the only place that decides the output order.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Position {
    pub latitude: f64,
    pub longitude: f64,
}

impl Position {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// GeoJSON axis order.
    pub fn lon_lat(&self) -> Vec<f64> {
        vec![self.longitude, self.latitude]
    }
}

/// One archived observation from a best-track document.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BestTrackPoint {
    pub latitude: f64,
    pub longitude: f64,
    pub name: String,
    pub number: Option<i64>,
    pub region: String,
    pub intensity_mph: Option<i64>,
    pub intensity_kph: Option<i64>,
    pub pressure: Option<i64>,
    #[serde(serialize_with = "iso8601")]
    pub datetime: Option<DateTime<Utc>>,
}

/// One forecast position from a forecast-track document.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ForecastTrackPoint {
    pub tc_speed: Option<i64>,
    pub latitude: f64,
    pub longitude: f64,
    pub storm_type: String,
    pub expected_speed: Option<i64>,
    pub atcf_id: String,
    pub storm_number: Option<i64>,
    pub storm_name: String,
    pub label: String,
    pub region: String,
    pub advisory_number: String,
    pub direction: Option<i64>,
    pub dvlp: String,
    pub movement: String,
    pub timezone: String,
    pub wind_gust: String,
    pub pressure: Option<f64>,
    pub tau: String,
    pub max_wind: String,
    #[serde(serialize_with = "iso8601")]
    pub advisory_datetime: Option<DateTime<Utc>>,
}

/// One placemark of a finalized (closed) storm document.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClosedStormPoint {
    pub title: String,
    pub lat: f64,
    pub lng: f64,
    pub storm_name: String,
    pub storm_number: String,
    pub basin: String,
    pub storm_type: String,
    pub intensity_mph: Option<f64>,
    pub intensity_kph: Option<f64>,
    pub pressure: Option<f64>,
    #[serde(serialize_with = "iso8601")]
    pub datetime: Option<DateTime<Utc>>,
}

/// Everything extracted from one closed-storm document.
#[derive(Debug, Clone, PartialEq)]
pub struct ClosedStorm {
    /// Text of the document's `<name>`, e.g. `Hurricane Arthur`.
    pub storm_id: String,
    pub points: Vec<ClosedStormPoint>,
}

impl ClosedStorm {
    /// `Hurricane Arthur` -> `hurricane_arthur`
    pub fn normalized_id(&self) -> String {
        self.storm_id.to_lowercase().replace(' ', "_")
    }
}

/// A cone of uncertainty for one forecast horizon.
#[derive(Debug, Clone, PartialEq)]
pub struct ForecastCone {
    pub hours: u32,
    pub ring: Vec<Position>,
}

/// A per-shape record, so each document shape keeps its own field set.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum StormRecord {
    BestTrack(BestTrackPoint),
    Forecast(ForecastTrackPoint),
    Closed(ClosedStormPoint),
}

impl StormRecord {
    pub fn position(&self) -> Position {
        match self {
            StormRecord::BestTrack(p) => Position::new(p.latitude, p.longitude),
            StormRecord::Forecast(p) => Position::new(p.latitude, p.longitude),
            StormRecord::Closed(p) => Position::new(p.lat, p.lng),
        }
    }
}

impl From<BestTrackPoint> for StormRecord {
    fn from(p: BestTrackPoint) -> Self {
        StormRecord::BestTrack(p)
    }
}

impl From<ForecastTrackPoint> for StormRecord {
    fn from(p: ForecastTrackPoint) -> Self {
        StormRecord::Forecast(p)
    }
}

impl From<ClosedStormPoint> for StormRecord {
    fn from(p: ClosedStormPoint) -> Self {
        StormRecord::Closed(p)
    }
}

/// Current state of an active storm, read from the active-storms index.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StormSummary {
    #[serde(skip)]
    pub id: String,
    pub storm_type: String,
    pub storm_name: String,
    pub wallet: String,
    pub atcf_id: String,
    pub latitude: f64,
    pub longitude: f64,
    pub datetime_str: String,
    #[serde(serialize_with = "iso8601_required")]
    pub datetime: DateTime<Utc>,
    pub movement: String,
    pub pressure_mb: Option<f64>,
    pub max_winds_mph: Option<i64>,
    pub headline: String,
    pub region: Option<Region>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Region {
    Atlantic,
    Pacific,
}

impl Region {
    /// Wallet ids start with `A` for the Atlantic and `E` for the eastern Pacific.
    pub fn from_wallet(wallet: &str) -> Option<Self> {
        match wallet.chars().next() {
            Some('A') => Some(Region::Atlantic),
            Some('E') => Some(Region::Pacific),
            _ => None,
        }
    }
}

/// KMZ links hanging off one storm folder of the active index.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StormLinks {
    pub best_track: Option<String>,
    pub forecast_track: Option<String>,
    pub forecast_cone: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ActiveStorm {
    pub summary: StormSummary,
    pub links: StormLinks,
}

/// Track data gathered for one active storm. Every part defaults to empty.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ActiveStormTracks {
    pub best_track: Vec<BestTrackPoint>,
    pub forecast_track: Vec<ForecastTrackPoint>,
    /// The forecast document's own line, used when it has no point placemarks.
    pub forecast_line: Option<Vec<Position>>,
    pub cone_72_hour: Option<ForecastCone>,
    pub cone_120_hour: Option<ForecastCone>,
}

fn iso8601<S: Serializer>(dt: &Option<DateTime<Utc>>, s: S) -> Result<S::Ok, S::Error> {
    match dt {
        Some(dt) => s.serialize_str(&dt.to_rfc3339()),
        None => s.serialize_none(),
    }
}

fn iso8601_required<S: Serializer>(dt: &DateTime<Utc>, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_str(&dt.to_rfc3339())
}
