use anyhow::{Context, Result};
use chrono::{NaiveDate, Utc};
use log::{info, warn};

use super::{AssembledStorm, Collected, RunReport, fetch_kml, write_all};
use crate::Config;
use crate::collection::{active_file_name, active_storm_collection};
use crate::extract::{
    KML_NS_GOOGLE_EARTH, KML_NS_OPENGIS, extract_active_storms, extract_best_track_points,
    extract_forecast_cone, extract_forecast_track_line, extract_forecast_track_points,
};
use crate::fetch::Fetcher;
use crate::model::{ActiveStorm, ActiveStormTracks, CONE_HOURS, StormLinks};

/// Fetches the active-storm index and everything each storm links to.
///
/// `reference` is the date weekday-only advisory times are resolved against.
pub async fn collect_active_storms(
    fetcher: &dyn Fetcher,
    config: &Config,
    reference: NaiveDate,
) -> Result<Collected> {
    let url = config.active_feed_url.as_str();
    info!("Requesting Main URL: {url}");
    let index = fetcher.fetch_text(url).await?;

    let entries = extract_active_storms(&index, KML_NS_OPENGIS, &config.skip_folders, reference)
        .with_context(|| format!("Failed to read active storm index from {url}"))?;

    let mut collected = Collected::default();
    for entry in entries {
        let storm = match entry {
            Ok(storm) => storm,
            Err(err) => {
                warn!("Skipping storm: {err}");
                collected.skipped += 1;
                continue;
            }
        };

        collected.storms.push(assemble(fetcher, &storm).await);
    }

    Ok(collected)
}

/// Collects the active storms and writes one `storm_<id>.geojson` per storm.
pub async fn run_active_feed(fetcher: &dyn Fetcher, config: &Config) -> Result<RunReport> {
    let collected = collect_active_storms(fetcher, config, Utc::now().date_naive()).await?;
    write_all(&config.output_dir, collected)
}

async fn assemble(fetcher: &dyn Fetcher, storm: &ActiveStorm) -> AssembledStorm {
    let tracks = fetch_tracks(fetcher, &storm.links).await;

    AssembledStorm {
        file_name: active_file_name(&storm.summary),
        collection: active_storm_collection(&storm.summary, &tracks),
    }
}

/// Each linked document is read on its own; one that cannot be fetched or parsed leaves its part
/// of the tracks empty.
async fn fetch_tracks(fetcher: &dyn Fetcher, links: &StormLinks) -> ActiveStormTracks {
    let mut tracks = ActiveStormTracks::default();

    if let Some(url) = &links.best_track {
        let best = read_linked(fetcher, url, "Best Track", |kml| {
            Ok(extract_best_track_points(kml, KML_NS_GOOGLE_EARTH)?)
        });
        tracks.best_track = best.await.unwrap_or_default();
    }

    if let Some(url) = &links.forecast_track {
        let forecast = read_linked(fetcher, url, "Forecast Track", |kml| {
            let points = extract_forecast_track_points(kml, KML_NS_OPENGIS)?;
            let line = extract_forecast_track_line(kml, KML_NS_OPENGIS).ok().flatten();
            Ok((points, line))
        });
        if let Some((points, line)) = forecast.await {
            tracks.forecast_track = points;
            tracks.forecast_line = line;
        }
    }

    if let Some(url) = &links.forecast_cone {
        let [short, long] = CONE_HOURS;
        let cones = read_linked(fetcher, url, "Forecast Cone", |kml| {
            Ok((
                extract_forecast_cone(kml, KML_NS_OPENGIS, short)?,
                extract_forecast_cone(kml, KML_NS_OPENGIS, long)?,
            ))
        });
        if let Some((cone_72_hour, cone_120_hour)) = cones.await {
            tracks.cone_72_hour = cone_72_hour;
            tracks.cone_120_hour = cone_120_hour;
        }
    }

    tracks
}

async fn read_linked<T>(
    fetcher: &dyn Fetcher,
    url: &str,
    label: &str,
    extract: impl FnOnce(&str) -> Result<T>,
) -> Option<T> {
    info!("Requesting {label} URL: {url}");
    let parsed = fetch_kml(fetcher, url)
        .await
        .and_then(|kml| extract(&kml).with_context(|| format!("Failed to read {label} from {url}")));

    match parsed {
        Ok(value) => Some(value),
        Err(err) => {
            warn!("Leaving out {label}: {err:#}");
            None
        }
    }
}
