//! Configuration for the pollbus client.

use std::time::Duration;
use url::Url;

use crate::error::Result;

pub const DEFAULT_ENDPOINT: &str = "http://127.0.0.1:8124/chat";

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ClientConfig {
    /// The bus endpoint (`/chat` on the server).
    pub endpoint: Url,
    /// Per-request timeout. Must exceed the server's poll timeout.
    pub request_timeout: Duration,
    /// Pause before re-polling after a transient failure.
    pub retry_delay: Duration,
    /// Consecutive transient failures tolerated by a subscription (None = infinite).
    pub max_retries: Option<u32>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            endpoint: Url::parse(DEFAULT_ENDPOINT).expect("default endpoint is a valid URL"),
            request_timeout: Duration::from_secs(15),
            retry_delay: Duration::from_secs(1),
            max_retries: None,
        }
    }
}

impl ClientConfig {
    pub fn new(endpoint: &str) -> Result<Self> {
        Ok(Self {
            endpoint: Url::parse(endpoint)?,
            ..Default::default()
        })
    }

    #[must_use]
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    #[must_use]
    pub fn with_retry_delay(mut self, delay: Duration) -> Self {
        self.retry_delay = delay;
        self
    }

    #[must_use]
    pub fn with_max_retries(mut self, max: u32) -> Self {
        self.max_retries = Some(max);
        self
    }
}
