use anyhow::{Context, Result};
use clap::Parser;
use serde_json::json;
use tracker_sdk::TrackerClient;

#[derive(Parser, Debug)]
#[command(name = "tracker-client")]
#[command(about = "Walk through every tracker tool against a running server", long_about = None)]
struct Args {
    /// Base URL of the tracker server
    #[arg(short, long, env = "TRACKER_URL", default_value = "http://localhost:8000")]
    url: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "tracker_sdk=warn".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let client = TrackerClient::builder()
        .base_url(&args.url)
        .client_name("tracker-client")
        .build()?;

    let mcp = client.mcp();

    println!("Connecting to {}", args.url);
    let init = mcp
        .initialize()
        .await
        .context("Failed to initialize MCP session")?;
    println!(
        "Connected to {} {} (protocol {})\n",
        init.server_info.name, init.server_info.version, init.protocol_version
    );

    println!("Available tools:");
    for tool in mcp.list_tools().await? {
        let summary: String = tool.description.chars().take(60).collect();
        println!("  - {}: {}...", tool.name, summary);
    }

    let calls = [
        ("get_project", json!({"project_id": "jamiat"})),
        ("list_projects", json!({})),
        ("get_total_cost", json!({})),
        (
            "search_by_status",
            json!({"website_status": "live", "dashboard_status": "live"}),
        ),
    ];

    for (name, arguments) in calls {
        println!("\n=== {} ===", name);
        let result = mcp
            .call_tool(name, arguments)
            .await
            .with_context(|| format!("Tool '{}' failed", name))?;
        println!("{}", result.joined_text());
    }

    Ok(())
}
