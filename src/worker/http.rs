//! Shared HTTP client for the resolver and fetcher

use reqwest::Client;
use std::time::Duration;

use super::error::{DownloadError, Result};

/// HTTP client configuration
#[derive(Debug, Clone)]
pub struct HttpConfig {
    pub request_timeout: Duration,
    pub user_agent: String,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            request_timeout: Duration::from_secs(30),
            user_agent: concat!("trackbox/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

/// Build the client used for every upstream request. There is no retry
/// layer; the timeout bounds each request as a whole.
pub fn build_client(config: &HttpConfig) -> Result<Client> {
    Client::builder()
        .timeout(config.request_timeout)
        .user_agent(&config.user_agent)
        .redirect(reqwest::redirect::Policy::limited(10))
        .build()
        .map_err(|e| DownloadError::Internal(format!("failed to build HTTP client: {e}")))
}
