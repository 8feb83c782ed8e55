//! Tracing setup: stderr always, plus an optional daily-rotated log file.
//!
//! Stdout carries the MCP transport, so nothing is ever logged there.

use std::path::Path;

use anyhow::Context;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

use crate::config::Cli;

const LOG_FILE_PREFIX: &str = "regmcp";
const LOG_FILE_SUFFIX: &str = "log";

/// Install the global subscriber. `RUST_LOG` wins over `--log-filter`.
pub fn init(cli: &Cli) -> anyhow::Result<()> {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(&cli.log_filter)
            .with_context(|| format!("Invalid log filter '{}'", cli.log_filter))?,
    };

    let stderr_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .with_target(true);

    let file_layer = match &cli.log_dir {
        Some(dir) => Some(
            fmt::layer()
                .with_writer(file_appender(dir)?)
                .with_ansi(false)
                .with_target(true)
                .with_file(true)
                .with_line_number(true),
        ),
        None => None,
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(stderr_layer)
        .with(file_layer)
        .try_init()
        .context("Failed to install tracing subscriber")?;

    if let Some(dir) = &cli.log_dir {
        tracing::info!("Logging to {}", dir.display());
    }
    Ok(())
}

/// Daily-rotated `regmcp.<date>.log` files under `dir`, created if missing.
fn file_appender(dir: &Path) -> anyhow::Result<RollingFileAppender> {
    std::fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create log directory {}", dir.display()))?;

    RollingFileAppender::builder()
        .rotation(Rotation::DAILY)
        .filename_prefix(LOG_FILE_PREFIX)
        .filename_suffix(LOG_FILE_SUFFIX)
        .build(dir)
        .with_context(|| format!("Failed to open log file in {}", dir.display()))
}
