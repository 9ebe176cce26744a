//! Orchestrators for the two published feeds.
//!
//! Both follow the same shape: fetch an index, fetch every storm document it points to, assemble
//! one feature collection per storm, then write them all out. Documents are fetched one after
//! another. A storm that fails to fetch or parse is logged and skipped; a failure to fetch the
//! index itself ends the run.

use anyhow::{Context, Result};
use log::info;
use std::path::{Path, PathBuf};

use crate::archive::extract_kml;
use crate::feature::StormFeatureCollection;
use crate::fetch::Fetcher;
use crate::output::write_collection;

pub mod active;
pub mod closed;

pub use active::{collect_active_storms, run_active_feed};
pub use closed::{collect_closed_storms, run_closed_feed};

/// Logged once a run has written all of its files.
pub const FINISHED_MESSAGE: &str = "-- Finished Parsing Run --";

/// One storm ready to be written.
#[derive(Debug, Clone, PartialEq)]
pub struct AssembledStorm {
    pub file_name: String,
    pub collection: StormFeatureCollection,
}

#[derive(Debug, Default)]
pub struct Collected {
    pub storms: Vec<AssembledStorm>,
    /// Storms dropped because their documents could not be fetched or parsed.
    pub skipped: usize,
}

#[derive(Debug, Default)]
pub struct RunReport {
    pub written: Vec<PathBuf>,
    pub skipped: usize,
}

async fn fetch_kml(fetcher: &dyn Fetcher, url: &str) -> Result<String> {
    let bytes = fetcher.fetch_bytes(url).await?;
    extract_kml(&bytes).with_context(|| format!("Failed to extract KML from {url}"))
}

fn write_all(dir: &Path, collected: Collected) -> Result<RunReport> {
    let mut written = Vec::with_capacity(collected.storms.len());
    for storm in &collected.storms {
        let path = write_collection(dir, &storm.file_name, &storm.collection)?;
        info!("Creating File: {}", path.display());
        written.push(path);
    }

    info!("{FINISHED_MESSAGE}");
    Ok(RunReport {
        written,
        skipped: collected.skipped,
    })
}
