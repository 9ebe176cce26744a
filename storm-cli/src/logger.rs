use anyhow::{Context, Result};
use chrono::Local;
use env_logger::{Builder, Env, Target};
use std::{fs::OpenOptions, io::Write, path::Path};

/// Routes `log` records to stderr, or appends them to `log_file` when one is given.
///
/// The filter defaults to `info` and can be overridden with `RUST_LOG`.
pub fn setup(log_file: Option<&Path>) -> Result<()> {
    let mut builder = Builder::from_env(Env::default().default_filter_or("info"));

    if let Some(path) = log_file {
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .with_context(|| format!("Failed to open log file: {}", path.display()))?;

        builder
            .format(|buf, record| {
                writeln!(
                    buf,
                    "{}\t{}\t{}",
                    Local::now().format("%Y-%m-%d %H:%M:%S"),
                    record.level(),
                    record.args()
                )
            })
            .target(Target::Pipe(Box::new(file)));
    }

    builder.try_init().context("Logger already initialized")
}
