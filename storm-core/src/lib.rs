//! Core library for the `storm` CLI.
//!
//! This crate defines:
//! - KMZ unpacking and namespace-aware KML navigation
//! - Record extractors for the active-storm, forecast and best-track documents
//! - GeoJSON assembly of the extracted records
//! - The two feed orchestrators, plus configuration and the HTTP fetcher they run on
//!
//! The extraction side (`archive`, `xml`, `timezone`, `extract`, `feature`, `collection`) works
//! on in-memory buffers only and never logs.

pub mod archive;
pub mod collection;
pub mod config;
pub mod error;
pub mod extract;
pub mod feature;
pub mod feed;
pub mod fetch;
pub mod model;
pub mod output;
pub mod timezone;
pub mod xml;

#[cfg(test)]
mod testutil;

pub use config::Config;
pub use error::{Result, StormError};
pub use feature::StormFeatureCollection;
pub use feed::{RunReport, run_active_feed, run_closed_feed};
pub use fetch::{Fetcher, HttpFetcher};
pub use model::{
    ActiveStorm, BestTrackPoint, ClosedStorm, ClosedStormPoint, ForecastCone, ForecastTrackPoint,
    Position, StormRecord, StormSummary,
};
