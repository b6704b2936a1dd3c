// Standalone MCP server binary (stdio transport)

use anyhow::{Context, Result};
use std::path::PathBuf;
use std::sync::Arc;
use tracker_core::ProjectTable;
use tracker_mcp::server::McpServer;

#[tokio::main]
async fn main() -> Result<()> {
    // stdout carries protocol traffic, so logs go to stderr
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    tracing::info!("Jamiat tracker MCP server starting...");

    // Optional catalog file, built-in projects otherwise
    let table = match std::env::var("TRACKER_PROJECTS_FILE") {
        Ok(path) => ProjectTable::load(&PathBuf::from(path)).context("Failed to load project catalog")?,
        Err(_) => ProjectTable::builtin(),
    };

    let server = McpServer::for_table("jamiat-tracker", Arc::new(table))?;
    server.serve_stdio().await?;

    Ok(())
}
