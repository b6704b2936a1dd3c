//! HTTP transport layer for the tracker SDK.

use crate::config::ClientConfig;
use crate::error::{TrackerError, TrackerResult};
use reqwest::{header, Client, RequestBuilder, Response};
use serde::{de::DeserializeOwned, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

/// HTTP transport for making API requests.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
    config: Arc<ClientConfig>,
}

impl HttpTransport {
    /// Create a new HTTP transport with the given configuration.
    pub fn new(config: Arc<ClientConfig>) -> TrackerResult<Self> {
        let mut headers = header::HeaderMap::new();
        headers.insert(
            header::ACCEPT,
            header::HeaderValue::from_static("application/json"),
        );

        let user_agent = format!("{}/{}", config.client_name, config.client_version);
        let client = Client::builder()
            .timeout(config.timeout)
            .user_agent(user_agent)
            .default_headers(headers)
            .build()?;

        Ok(Self { client, config })
    }

    /// Build a URL for the given path.
    fn build_url(&self, path: &str) -> TrackerResult<url::Url> {
        self.config.base_url.join(path).map_err(TrackerError::InvalidUrl)
    }

    /// Send a request, re-sending it while the failure is retryable.
    async fn execute(&self, request_builder: RequestBuilder, idempotent: bool) -> TrackerResult<Response> {
        let retry_config = &self.config.retry_config;
        let mut attempt = 0;

        loop {
            let request = request_builder
                .try_clone()
                .ok_or_else(|| TrackerError::Config("Request cannot be cloned".to_string()))?;

            let (error, retry_after) = match request.send().await {
                Ok(response) if response.status().is_success() => return Ok(response),
                Ok(response) => {
                    let retry_after = retry_after_header(&response);
                    let status = response.status().as_u16();
                    let body = response.text().await.unwrap_or_default();
                    (TrackerError::from_response(status, &body), retry_after)
                }
                Err(e) => (TrackerError::from(e), None),
            };

            if attempt >= retry_config.max_retries || !error.is_retryable(idempotent) {
                return Err(error);
            }

            let delay = retry_config.delay(attempt, retry_after);
            warn!(
                attempt = attempt + 1,
                delay_ms = delay.as_millis(),
                error = %error,
                "Request failed, retrying"
            );
            tokio::time::sleep(delay).await;
            attempt += 1;
        }
    }

    /// Execute a GET request.
    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> TrackerResult<T> {
        let url = self.build_url(path)?;
        debug!(url = %url, "GET request");

        let response = self.execute(self.client.get(url), true).await?;
        let body = response.json().await?;
        Ok(body)
    }

    /// Execute a GET request returning the raw body.
    pub async fn get_text(&self, path: &str) -> TrackerResult<String> {
        let url = self.build_url(path)?;
        debug!(url = %url, "GET request (text)");

        let response = self.execute(self.client.get(url), true).await?;
        Ok(response.text().await?)
    }

    /// Execute a POST request. Timeouts and 500s are only re-sent when
    /// `idempotent` is set.
    pub async fn post<T: DeserializeOwned, B: Serialize>(
        &self,
        path: &str,
        body: &B,
        idempotent: bool,
    ) -> TrackerResult<T> {
        let url = self.build_url(path)?;
        debug!(url = %url, idempotent, "POST request");

        let response = self
            .execute(self.client.post(url).json(body), idempotent)
            .await?;
        let body = response.json().await?;
        Ok(body)
    }

    /// Execute a POST request without a response body.
    pub async fn post_no_response<B: Serialize>(&self, path: &str, body: &B) -> TrackerResult<()> {
        let url = self.build_url(path)?;
        debug!(url = %url, "POST request (no response)");

        self.execute(self.client.post(url).json(body), true).await?;
        Ok(())
    }
}

/// `Retry-After` given in seconds; HTTP-date values are ignored
fn retry_after_header(response: &Response) -> Option<Duration> {
    response
        .headers()
        .get(header::RETRY_AFTER)?
        .to_str()
        .ok()?
        .trim()
        .parse::<u64>()
        .ok()
        .map(Duration::from_secs)
}
