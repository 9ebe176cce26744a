use anyhow::{Context, Result, anyhow};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
};

pub const DEFAULT_ACTIVE_FEED_URL: &str = "http://www.nhc.noaa.gov/gis/kml/nhc_active.kml";
pub const DEFAULT_ARCHIVE_LIST_URL: &str =
    "http://www.nhc.noaa.gov/gis/archive_besttrack_results.php";
pub const DEFAULT_ARCHIVE_BASE_URL: &str = "http://www.nhc.noaa.gov/gis/";
pub const DEFAULT_ARCHIVE_YEAR: i32 = 2014;

/// Top-level configuration stored on disk. Every field falls back to its default when absent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Index of currently active storms.
    pub active_feed_url: String,

    /// Results page listing the best-track archives of one season; `?year=` is appended.
    pub archive_list_url: String,

    /// Relative KMZ links on the results page are resolved against this.
    pub archive_base_url: String,

    pub archive_year: i32,

    /// Directory the GeoJSON files are written to.
    pub output_dir: PathBuf,

    /// When set, log records are appended here instead of going to stderr.
    pub log_file: Option<PathBuf>,

    pub user_agent: String,

    /// Folder ids of the active index that do not describe a storm.
    pub skip_folders: Vec<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            active_feed_url: DEFAULT_ACTIVE_FEED_URL.to_string(),
            archive_list_url: DEFAULT_ARCHIVE_LIST_URL.to_string(),
            archive_base_url: DEFAULT_ARCHIVE_BASE_URL.to_string(),
            archive_year: DEFAULT_ARCHIVE_YEAR,
            output_dir: PathBuf::from("output"),
            log_file: None,
            user_agent: concat!("storm/", env!("CARGO_PKG_VERSION")).to_string(),
            skip_folders: vec!["wsp".to_string()],
        }
    }
}

impl Config {
    /// Load config from disk, or return the defaults if it doesn't exist yet.
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_file_path()?)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let cfg: Config = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(cfg)
    }

    /// Save config to disk, creating parent directories as needed.
    pub fn save(&self) -> Result<PathBuf> {
        let path = Self::config_file_path()?;
        self.save_to(&path)?;
        Ok(path)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        fs::write(path, self.to_toml()?)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(())
    }

    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).context("Failed to serialize configuration to TOML")
    }

    /// Path to the config file.
    pub fn config_file_path() -> Result<PathBuf> {
        let dirs = ProjectDirs::from("dev", "storm-feeds", "storm")
            .ok_or_else(|| anyhow!("Could not determine platform config directory"))?;

        Ok(dirs.config_dir().join("config.toml"))
    }

    /// Archive results page for the configured season.
    pub fn archive_list_url_for_year(&self) -> String {
        let separator = if self.archive_list_url.contains('?') {
            '&'
        } else {
            '?'
        };
        format!(
            "{}{separator}year={}",
            self.archive_list_url, self.archive_year
        )
    }
}
