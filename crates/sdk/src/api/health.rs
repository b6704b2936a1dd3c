//! Health and info endpoints.

use crate::client::TrackerClient;
use crate::error::TrackerResult;
use serde::{Deserialize, Serialize};

/// Health API for checking server status.
pub struct HealthApi<'a> {
    client: &'a TrackerClient,
}

impl<'a> HealthApi<'a> {
    pub(crate) fn new(client: &'a TrackerClient) -> Self {
        Self { client }
    }

    /// Liveness check; the server answers with plain `OK`.
    pub async fn check(&self) -> TrackerResult<String> {
        self.client.http.get_text("/health").await
    }

    /// Server name, status and registered tool names.
    pub async fn info(&self) -> TrackerResult<ServerSummary> {
        self.client.http.get("/").await
    }
}

/// Response of the root info endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerSummary {
    pub server: String,
    #[serde(default)]
    pub version: String,
    pub status: String,
    pub mcp_endpoint: String,
    pub tools: Vec<String>,
}

#[cfg(test)]
mod tests {
    use crate::config::RetryConfig;
    use crate::TrackerClient;
    use serde_json::json;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn client(server: &MockServer) -> TrackerClient {
        TrackerClient::builder()
            .base_url(server.uri())
            .retry_config(RetryConfig::no_retry())
            .build()
            .unwrap()
    }

    #[tokio::test]
    async fn test_check_returns_plain_ok() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/health"))
            .respond_with(ResponseTemplate::new(200).set_body_string("OK"))
            .expect(1)
            .mount(&server)
            .await;

        let client = client(&server).await;
        assert_eq!(client.health().check().await.unwrap(), "OK");
    }

    #[tokio::test]
    async fn test_info_lists_tools() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "server": "jamiat-tracker",
                "version": "0.1.0",
                "status": "running",
                "mcp_endpoint": "/mcp",
                "tools": ["list_all_projects", "get_project", "get_total_cost"]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = client(&server).await;
        let info = client.health().info().await.unwrap();
        assert_eq!(info.server, "jamiat-tracker");
        assert_eq!(info.status, "running");
        assert_eq!(info.mcp_endpoint, "/mcp");
        assert_eq!(info.tools.len(), 3);
    }

    #[tokio::test]
    async fn test_info_tolerates_missing_version() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "server": "jamiat-tracker",
                "status": "running",
                "mcp_endpoint": "/mcp",
                "tools": []
            })))
            .mount(&server)
            .await;

        let client = client(&server).await;
        let info = client.health().info().await.unwrap();
        assert!(info.version.is_empty());
        assert!(info.tools.is_empty());
    }
}
