// MCP (Model Context Protocol) server implementation
// Exposes the project tracker tools to agent clients over JSON-RPC

pub mod error;
pub mod prompts;
pub mod protocol;
pub mod resources;
pub mod server;
pub mod tools;

pub use error::ToolError;
pub use server::McpServer;
