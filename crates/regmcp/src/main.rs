//! regmcp: read-only Windows Registry MCP server.
//!
//! Serves key/value lookups and bounded subtree searches over the stdio MCP
//! transport, against the live registry on Windows or an offline JSON snapshot.

mod config;
mod logging;
mod registry;
mod server;

use clap::Parser;
use rmcp::transport::stdio;
use rmcp::ServiceExt;
use server::tools::RegistryServer;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = config::Cli::parse();
    logging::init(&cli)?;

    tracing::info!("regmcp MCP server starting...");

    let backend = registry::open_backend(cli.snapshot.as_deref())
        .inspect_err(|e| tracing::error!("Failed to open registry backend: {:#}", e))?;
    tracing::info!("Using {} registry backend", backend.backend_name());

    let service = RegistryServer::new(backend)
        .serve(stdio())
        .await
        .inspect_err(|e| tracing::error!("Server error: {}", e))?;

    tracing::info!("regmcp MCP server running on stdio");
    service.waiting().await?;

    tracing::info!("regmcp MCP server shutting down");
    Ok(())
}
