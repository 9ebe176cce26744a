use anyhow::{Context, Result};
use log::{info, warn};

use super::{AssembledStorm, Collected, RunReport, fetch_kml, write_all};
use crate::Config;
use crate::collection::{closed_file_name, closed_storm_collection};
use crate::extract::{KML_NS_GOOGLE_EARTH, extract_closed_storm, scrape_kmz_links};
use crate::fetch::Fetcher;

/// Fetches the archive listing for the configured season and every best-track KMZ it links to.
pub async fn collect_closed_storms(fetcher: &dyn Fetcher, config: &Config) -> Result<Collected> {
    let url = config.archive_list_url_for_year();
    info!("Requesting Archive List URL: {url}");
    let html = fetcher.fetch_text(&url).await?;

    let links = scrape_kmz_links(&html, &config.archive_base_url);
    info!("Found {} archives for {}", links.len(), config.archive_year);

    let mut collected = Collected::default();
    for link in links {
        info!("Requesting URL: {link}");
        match assemble(fetcher, &link).await {
            Ok(assembled) => collected.storms.push(assembled),
            Err(err) => {
                warn!("Skipping archive {link}: {err:#}");
                collected.skipped += 1;
            }
        }
    }

    Ok(collected)
}

/// Collects the season's closed storms and writes one `<storm id>.geojson` per storm.
pub async fn run_closed_feed(fetcher: &dyn Fetcher, config: &Config) -> Result<RunReport> {
    let collected = collect_closed_storms(fetcher, config).await?;
    write_all(&config.output_dir, collected)
}

async fn assemble(fetcher: &dyn Fetcher, url: &str) -> Result<AssembledStorm> {
    let kml = fetch_kml(fetcher, url).await?;
    let storm = extract_closed_storm(&kml, KML_NS_GOOGLE_EARTH)
        .with_context(|| format!("Failed to read closed storm from {url}"))?;

    Ok(AssembledStorm {
        file_name: closed_file_name(&storm),
        collection: closed_storm_collection(&storm),
    })
}
