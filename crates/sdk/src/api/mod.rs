//! API endpoint groups exposed by [`TrackerClient`](crate::TrackerClient).

pub mod health;
pub mod mcp;

pub use health::{HealthApi, ServerSummary};
pub use mcp::McpApi;
