use crate::config::AppState;
use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Handle one JSON-RPC message posted to the MCP endpoint
pub async fn handle_mcp(State(state): State<Arc<AppState>>, body: String) -> Response {
    match state.mcp.handle_message(&body).await {
        Some(response) => {
            if let Some(error) = &response.error {
                tracing::debug!(code = error.code, message = %error.message, "MCP request failed");
            }
            Json(response).into_response()
        }
        None => StatusCode::ACCEPTED.into_response(),
    }
}

/// Friendly description of the running server
pub async fn server_info(State(state): State<Arc<AppState>>) -> Json<ServerInfoResponse> {
    let tools = state
        .mcp
        .dispatcher()
        .registry()
        .list()
        .iter()
        .map(|t| t.name.clone())
        .collect();

    Json(ServerInfoResponse {
        server: state.mcp.info().name.clone(),
        version: state.mcp.info().version.clone(),
        status: "running".to_string(),
        mcp_endpoint: "/mcp".to_string(),
        tools,
    })
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ServerInfoResponse {
    pub server: String,
    pub version: String,
    pub status: String,
    pub mcp_endpoint: String,
    pub tools: Vec<String>,
}
