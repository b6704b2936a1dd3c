//! Main client for the tracker SDK.

use crate::api::{HealthApi, McpApi};
use crate::config::{ClientConfig, RetryConfig};
use crate::error::{TrackerError, TrackerResult};
use crate::transport::HttpTransport;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use url::Url;

/// Main client for talking to a tracker server.
#[derive(Clone)]
pub struct TrackerClient {
    pub(crate) config: Arc<ClientConfig>,
    pub(crate) http: HttpTransport,
    next_id: Arc<AtomicU64>,
}

impl TrackerClient {
    /// Create a new client builder.
    pub fn builder() -> TrackerClientBuilder {
        TrackerClientBuilder::new()
    }

    /// Create a client from configuration.
    pub fn from_config(config: ClientConfig) -> TrackerResult<Self> {
        let config = Arc::new(config);
        let http = HttpTransport::new(config.clone())?;

        Ok(Self {
            config,
            http,
            next_id: Arc::new(AtomicU64::new(1)),
        })
    }

    /// Get the health API.
    pub fn health(&self) -> HealthApi<'_> {
        HealthApi::new(self)
    }

    /// Get the MCP (JSON-RPC) API.
    pub fn mcp(&self) -> McpApi<'_> {
        McpApi::new(self)
    }

    /// Next JSON-RPC request id, unique per client and its clones
    pub(crate) fn next_request_id(&self) -> u64 {
        self.next_id.fetch_add(1, Ordering::Relaxed)
    }
}

/// Builder for creating a TrackerClient.
pub struct TrackerClientBuilder {
    base_url: Option<String>,
    mcp_path: Option<String>,
    client_name: Option<String>,
    timeout: Duration,
    retry_config: RetryConfig,
}

impl TrackerClientBuilder {
    /// Create a new builder.
    pub fn new() -> Self {
        Self {
            base_url: None,
            mcp_path: None,
            client_name: None,
            timeout: Duration::from_secs(30),
            retry_config: RetryConfig::default(),
        }
    }

    /// Set the base URL of the tracker server.
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    /// Override the JSON-RPC endpoint path (defaults to `/mcp`).
    pub fn mcp_path(mut self, path: impl Into<String>) -> Self {
        self.mcp_path = Some(path.into());
        self
    }

    /// Name announced to the server during initialize.
    pub fn client_name(mut self, name: impl Into<String>) -> Self {
        self.client_name = Some(name.into());
        self
    }

    /// Set the request timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the retry configuration.
    pub fn retry_config(mut self, config: RetryConfig) -> Self {
        self.retry_config = config;
        self
    }

    /// Build the client.
    pub fn build(self) -> TrackerResult<TrackerClient> {
        let base_url_str = self
            .base_url
            .ok_or_else(|| TrackerError::Config("base_url is required".to_string()))?;

        let base_url = Url::parse(&base_url_str)?;

        let mut config = ClientConfig::new(base_url);
        config.timeout = self.timeout;
        config.retry_config = self.retry_config;
        if let Some(path) = self.mcp_path {
            config.mcp_path = path;
        }
        if let Some(name) = self.client_name {
            config.client_name = name;
        }

        TrackerClient::from_config(config)
    }
}

impl Default for TrackerClientBuilder {
    fn default() -> Self {
        Self::new()
    }
}
