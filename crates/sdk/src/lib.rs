//! # Tracker SDK
//!
//! Rust client for the Jamiat IT project tracker MCP server.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use tracker_sdk::{TrackerClient, TrackerResult};
//!
//! #[tokio::main]
//! async fn main() -> TrackerResult<()> {
//!     // Build client
//!     let client = TrackerClient::builder()
//!         .base_url("http://localhost:8000")
//!         .build()?;
//!
//!     // Check health
//!     let status = client.health().check().await?;
//!     println!("Server status: {}", status);
//!
//!     // Call a tool
//!     client.mcp().initialize().await?;
//!     let result = client
//!         .mcp()
//!         .call_tool("get_project", serde_json::json!({"project_id": "jamiat"}))
//!         .await?;
//!     println!("{}", result.joined_text());
//!
//!     Ok(())
//! }
//! ```

pub mod api;
pub mod client;
pub mod config;
pub mod error;
pub mod transport;

// Re-export main types
pub use client::{TrackerClient, TrackerClientBuilder};
pub use config::{ClientConfig, RetryConfig};
pub use error::{TrackerError, TrackerResult};

// Re-export protocol types returned by the MCP API
pub use tracker_mcp::protocol::{
    CallToolResult, GetPromptResult, InitializeResult, PromptDefinition, ReadResourceResult,
    ResourceContents, ResourceDefinition, ToolContent, ToolSchema,
};
