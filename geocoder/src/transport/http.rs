//! reqwest-backed transport.

use std::time::Duration;

use reqwest::header::{HeaderValue, USER_AGENT};
use tracing::debug;

use super::error::FetchError;
use super::{FetchRequest, Transport};

/// Default request timeout in seconds.
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Longest error body kept in a [`FetchError::Status`].
const MAX_ERROR_BODY: usize = 500;

/// Configuration for the HTTP transport.
#[derive(Debug, Clone)]
pub struct HttpConfig {
    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

impl HttpConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set request timeout.
    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }
}

/// Transport over a shared reqwest client.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    http: reqwest::Client,
}

impl HttpTransport {
    pub fn new(config: HttpConfig) -> Result<Self, FetchError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        Ok(Self { http })
    }
}

impl Transport for HttpTransport {
    async fn fetch(&self, request: &FetchRequest) -> Result<Option<String>, FetchError> {
        let user_agent = HeaderValue::from_str(&request.user_agent)
            .map_err(|_| FetchError::Other(format!("invalid user agent {:?}", request.user_agent)))?;

        debug!(url = %request.url, "fetching");
        let response = self
            .http
            .get(&request.url)
            .header(USER_AGENT, user_agent)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(FetchError::Status {
                status: status.as_u16(),
                message: body.chars().take(MAX_ERROR_BODY).collect(),
            });
        }

        let body = response.text().await?;
        if body.is_empty() {
            Ok(None)
        } else {
            Ok(Some(body))
        }
    }
}
