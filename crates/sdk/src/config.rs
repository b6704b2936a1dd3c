//! Configuration types for the tracker SDK.

use std::time::Duration;
use url::Url;

/// Configuration for the tracker client.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Base URL of the tracker server.
    pub base_url: Url,
    /// Path of the JSON-RPC endpoint, relative to the base URL.
    pub mcp_path: String,
    /// Name and version sent in the initialize handshake.
    pub client_name: String,
    pub client_version: String,
    /// Per-attempt request timeout.
    pub timeout: Duration,
    pub retry_config: RetryConfig,
}

impl ClientConfig {
    pub fn new(base_url: Url) -> Self {
        Self {
            base_url,
            mcp_path: "/mcp".to_string(),
            client_name: env!("CARGO_PKG_NAME").to_string(),
            client_version: env!("CARGO_PKG_VERSION").to_string(),
            timeout: Duration::from_secs(30),
            retry_config: RetryConfig::default(),
        }
    }
}

/// How many times a failed request is re-sent and how long to wait between
/// attempts.
///
/// Which failures are worth re-sending is decided by
/// [`TrackerError::is_retryable`](crate::TrackerError::is_retryable), based on
/// whether the JSON-RPC method is safe to repeat.
#[derive(Debug, Clone)]
pub struct RetryConfig {
    /// Re-sends after the first attempt.
    pub max_retries: u32,
    /// Wait before the first re-send; doubles on every further one.
    pub initial_backoff: Duration,
    /// Upper bound for any single wait, including a server's `Retry-After`.
    pub max_backoff: Duration,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 3,
            initial_backoff: Duration::from_millis(200),
            max_backoff: Duration::from_secs(5),
        }
    }
}

impl RetryConfig {
    /// Send every request exactly once.
    pub fn no_retry() -> Self {
        Self {
            max_retries: 0,
            ..Default::default()
        }
    }

    /// Wait before re-send number `attempt + 1`.
    pub fn backoff_for_attempt(&self, attempt: u32) -> Duration {
        let factor = 2u32.saturating_pow(attempt);
        self.initial_backoff
            .saturating_mul(factor)
            .min(self.max_backoff)
    }

    /// Wait requested by the server, bounded by `max_backoff`, or the
    /// exponential backoff when the server gave none.
    pub fn delay(&self, attempt: u32, retry_after: Option<Duration>) -> Duration {
        match retry_after {
            Some(requested) => requested.min(self.max_backoff),
            None => self.backoff_for_attempt(attempt),
        }
    }
}
