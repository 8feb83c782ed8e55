//! Command-line configuration.

use std::path::PathBuf;

use clap::Parser;

/// Read-only Windows Registry access over MCP (stdio transport).
#[derive(Debug, Parser)]
#[command(name = "regmcp", version, about)]
pub struct Cli {
    /// Serve an offline registry snapshot (JSON) instead of the live registry.
    #[arg(long, env = "REGMCP_SNAPSHOT", value_name = "FILE")]
    pub snapshot: Option<PathBuf>,

    /// Also write daily-rotated log files into this directory.
    #[arg(long, env = "REGMCP_LOG_DIR", value_name = "DIR")]
    pub log_dir: Option<PathBuf>,

    /// Log filter used when RUST_LOG is unset (e.g. "debug", "regmcp=trace").
    #[arg(long, value_name = "FILTER", default_value = "info")]
    pub log_filter: String,
}
