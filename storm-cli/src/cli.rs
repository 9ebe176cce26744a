use anyhow::Result;
use clap::{Parser, Subcommand};
use log::info;
use std::path::PathBuf;
use storm_core::{Config, HttpFetcher, RunReport, run_active_feed, run_closed_feed};

use crate::logger;

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(
    name = "storm",
    version,
    about = "Convert tropical-storm KML/KMZ feeds into GeoJSON"
)]
pub struct Cli {
    /// Directory the GeoJSON files are written to (overrides the config file).
    #[arg(long, global = true)]
    pub output_dir: Option<PathBuf>,

    /// Append log records to this file instead of printing them (overrides the config file).
    #[arg(long, global = true)]
    pub log_file: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Convert every currently active storm to `storm_<id>.geojson`.
    Active,

    /// Convert the best tracks of one season's finished storms.
    Closed {
        /// Season to fetch; defaults to `archive_year` from the config file.
        #[arg(long)]
        year: Option<i32>,
    },

    /// Inspect or create the configuration file.
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Debug, Clone, Copy, Subcommand)]
pub enum ConfigAction {
    /// Print the effective configuration.
    Show,
    /// Print where the configuration file lives.
    Path,
    /// Write the default configuration, replacing any existing file.
    Init,
}

impl Cli {
    pub async fn run(self) -> Result<()> {
        let mut config = Config::load()?;
        self.apply_overrides(&mut config);

        match self.command {
            Command::Active => {
                logger::setup(config.log_file.as_deref())?;
                let fetcher = HttpFetcher::from_config(&config)?;
                report(&run_active_feed(&fetcher, &config).await?);
            }
            Command::Closed { year } => {
                if let Some(year) = year {
                    config.archive_year = year;
                }
                logger::setup(config.log_file.as_deref())?;
                let fetcher = HttpFetcher::from_config(&config)?;
                report(&run_closed_feed(&fetcher, &config).await?);
            }
            Command::Config { action } => match action {
                ConfigAction::Show => print!("{}", config.to_toml()?),
                ConfigAction::Path => println!("{}", Config::config_file_path()?.display()),
                ConfigAction::Init => {
                    let path = Config::default().save()?;
                    println!("Wrote default configuration to {}", path.display());
                }
            },
        }

        Ok(())
    }

    fn apply_overrides(&self, config: &mut Config) {
        if let Some(dir) = &self.output_dir {
            config.output_dir = dir.clone();
        }
        if let Some(file) = &self.log_file {
            config.log_file = Some(file.clone());
        }
    }
}

fn report(report: &RunReport) {
    info!(
        "Wrote {} file(s), skipped {} storm(s)",
        report.written.len(),
        report.skipped
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn global_flags_work_after_the_subcommand() {
        let cli = Cli::try_parse_from([
            "storm",
            "closed",
            "--year",
            "2012",
            "--output-dir",
            "geo",
        ])
        .unwrap();

        assert_eq!(cli.output_dir, Some(PathBuf::from("geo")));
        assert!(matches!(cli.command, Command::Closed { year: Some(2012) }));
    }

    #[test]
    fn flags_override_config() {
        let cli =
            Cli::try_parse_from(["storm", "--log-file", "log.txt", "--output-dir", "geo", "active"])
                .unwrap();
        let mut config = Config::default();
        cli.apply_overrides(&mut config);

        assert_eq!(config.output_dir, PathBuf::from("geo"));
        assert_eq!(config.log_file, Some(PathBuf::from("log.txt")));
    }

    #[test]
    fn config_requires_an_action() {
        assert!(Cli::try_parse_from(["storm", "config"]).is_err());
        let cli = Cli::try_parse_from(["storm", "config", "path"]).unwrap();
        assert!(matches!(
            cli.command,
            Command::Config {
                action: ConfigAction::Path
            }
        ));
    }
}
