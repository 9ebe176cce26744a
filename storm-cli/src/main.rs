//! Binary crate for the `storm` command-line tool.
//!
//! This crate focuses on:
//! - Parsing CLI arguments and applying them over the config file
//! - Logger setup
//! - Dispatching to the feed runs in `storm-core`

use clap::Parser;

mod cli;
mod logger;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cmd = cli::Cli::parse();
    cmd.run().await
}
