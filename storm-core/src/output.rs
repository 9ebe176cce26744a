use anyhow::{Context, Result};
use std::{
    fs,
    path::{Path, PathBuf},
};

use crate::feature::StormFeatureCollection;

/// Writes one collection as pretty-printed GeoJSON, replacing any previous file of that name.
pub fn write_collection(
    dir: &Path,
    file_name: &str,
    collection: &StormFeatureCollection,
) -> Result<PathBuf> {
    fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create output directory: {}", dir.display()))?;

    let json = collection
        .to_json_pretty()
        .context("Failed to serialize feature collection")?;

    let path = dir.join(file_name);
    fs::write(&path, json)
        .with_context(|| format!("Failed to write output file: {}", path.display()))?;

    Ok(path)
}
