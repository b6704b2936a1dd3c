use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;

mod api;
mod config;

use config::ServerConfig;

#[derive(Parser, Debug)]
#[command(name = "tracker")]
#[command(about = "Jamiat IT project tracker - MCP server over HTTP", long_about = None)]
struct Args {
    /// Path to configuration file
    #[arg(short, long, env = "TRACKER_CONFIG", default_value = "tracker.toml")]
    config: PathBuf,

    /// TOML file with the project catalog (overrides the config file)
    #[arg(long, env = "TRACKER_PROJECTS_FILE")]
    projects: Option<PathBuf>,

    /// Port to listen on (overrides the config file)
    #[arg(short, long, env = "TRACKER_PORT")]
    port: Option<u16>,

    /// Host to bind to (overrides the config file)
    #[arg(long, env = "TRACKER_HOST")]
    host: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "tracker=info,tracker_mcp=info,tower_http=debug".into()),
        )
        .with_target(false)
        .with_thread_ids(true)
        .with_file(true)
        .with_line_number(true)
        .init();

    let args = Args::parse();

    tracing::info!("Starting Jamiat tracker MCP server");

    // Load configuration, command line wins over file values
    let mut config = ServerConfig::load(&args.config)?;
    if let Some(projects) = args.projects {
        config.catalog.projects_file = Some(projects);
    }
    if let Some(port) = args.port {
        config.server.port = port;
    }
    if let Some(host) = args.host {
        config.server.host = host;
    }

    let addr = config.listen_addr();
    tracing::info!("Starting API server on {}", addr);

    api::serve(&addr, config).await?;

    Ok(())
}
