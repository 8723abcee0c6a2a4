use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

/// Top-level configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub downloads: DownloadsConfig,
    #[serde(default)]
    pub upstream: UpstreamConfig,
    #[serde(default)]
    pub client: ClientConfig,
}

/// Server configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    #[serde(default = "default_bind_addr")]
    pub bind_addr: SocketAddr,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: default_bind_addr(),
        }
    }
}

fn default_bind_addr() -> SocketAddr {
    SocketAddr::from(([0, 0, 0, 0], 50051))
}

/// Where finished tracks land when a request names no directory
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DownloadsConfig {
    #[serde(default = "default_output_dir")]
    pub default_output_dir: PathBuf,
}

impl Default for DownloadsConfig {
    fn default() -> Self {
        Self {
            default_output_dir: default_output_dir(),
        }
    }
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("downloads")
}

/// Hosting site endpoints and HTTP behaviour
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct UpstreamConfig {
    /// Substring every submitted track URL must contain
    #[serde(default = "default_page_host")]
    pub page_host: String,
    /// Base of the streams endpoint (`{base}/i1/tracks/{id}/streams`)
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

impl UpstreamConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            page_host: default_page_host(),
            api_base_url: default_api_base_url(),
            request_timeout_secs: default_request_timeout_secs(),
            user_agent: default_user_agent(),
        }
    }
}

fn default_page_host() -> String {
    "soundcloud.com".to_string()
}

fn default_api_base_url() -> String {
    "https://api.soundcloud.com".to_string()
}

fn default_request_timeout_secs() -> u64 {
    30
}

fn default_user_agent() -> String {
    concat!("trackbox/", env!("CARGO_PKG_VERSION")).to_string()
}

/// Settings for the `download` and `list` commands
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ClientConfig {
    #[serde(default = "default_server_url")]
    pub server_url: String,
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,
    #[serde(default = "default_start_timeout_secs")]
    pub start_timeout_secs: u64,
    #[serde(default = "default_query_timeout_secs")]
    pub query_timeout_secs: u64,
}

impl ClientConfig {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn start_timeout(&self) -> Duration {
        Duration::from_secs(self.start_timeout_secs)
    }

    pub fn query_timeout(&self) -> Duration {
        Duration::from_secs(self.query_timeout_secs)
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            server_url: default_server_url(),
            poll_interval_ms: default_poll_interval_ms(),
            start_timeout_secs: default_start_timeout_secs(),
            query_timeout_secs: default_query_timeout_secs(),
        }
    }
}

fn default_server_url() -> String {
    "http://localhost:50051".to_string()
}

fn default_poll_interval_ms() -> u64 {
    2000
}

fn default_start_timeout_secs() -> u64 {
    30
}

fn default_query_timeout_secs() -> u64 {
    10
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();

        assert_eq!(config.server.bind_addr.to_string(), "0.0.0.0:50051");
        assert_eq!(config.downloads.default_output_dir, PathBuf::from("downloads"));
        assert_eq!(config.upstream.page_host, "soundcloud.com");
        assert_eq!(config.upstream.request_timeout(), Duration::from_secs(30));
        assert_eq!(config.client.poll_interval(), Duration::from_secs(2));
        assert_eq!(config.client.start_timeout(), Duration::from_secs(30));
        assert_eq!(config.client.query_timeout(), Duration::from_secs(10));
    }
}
