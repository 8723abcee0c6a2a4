//! Thin client for the download service, used by the `download` and `list`
//! commands.

use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::debug;

use crate::api::models::{
    DownloadRequest, DownloadResponse, ErrorResponse, ListResponse, StatusResponse,
};
use crate::config::ClientConfig;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("request to download service failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("server rejected request ({code}): {message}")]
    Rejected { code: String, message: String },

    #[error("download failed: {0}")]
    DownloadFailed(String),
}

pub type Result<T> = std::result::Result<T, ClientError>;

pub struct DownloadClient {
    http: Client,
    base_url: String,
    config: ClientConfig,
}

impl DownloadClient {
    pub fn new(config: ClientConfig) -> Result<Self> {
        let http = Client::builder().build()?;
        let base_url = config.server_url.trim_end_matches('/').to_string();
        Ok(Self {
            http,
            base_url,
            config,
        })
    }

    pub async fn start(&self, request: &DownloadRequest) -> Result<DownloadResponse> {
        let response = self
            .http
            .post(format!("{}/downloads", self.base_url))
            .timeout(self.config.start_timeout())
            .json(request)
            .send()
            .await?;
        decode(response).await
    }

    pub async fn status(&self, download_id: &str) -> Result<StatusResponse> {
        let response = self
            .http
            .get(format!("{}/downloads/{}", self.base_url, download_id))
            .timeout(self.config.query_timeout())
            .send()
            .await?;
        decode(response).await
    }

    pub async fn list(&self, limit: i32, offset: i32) -> Result<ListResponse> {
        let response = self
            .http
            .get(format!("{}/downloads", self.base_url))
            .query(&[("limit", limit), ("offset", offset)])
            .timeout(self.config.query_timeout())
            .send()
            .await?;
        decode(response).await
    }

    /// Poll until the job is terminal, handing every observed status to
    /// `on_update`. A failed job becomes `ClientError::DownloadFailed`.
    pub async fn wait_for(
        &self,
        download_id: &str,
        mut on_update: impl FnMut(&StatusResponse),
    ) -> Result<StatusResponse> {
        loop {
            let status = self.status(download_id).await?;
            on_update(&status);

            match status.status.as_str() {
                "completed" => return Ok(status),
                "failed" => return Err(ClientError::DownloadFailed(status.error_message)),
                _ => tokio::time::sleep(self.config.poll_interval()).await,
            }
        }
    }
}

async fn decode<T: DeserializeOwned>(response: Response) -> Result<T> {
    let status = response.status();
    if status.is_success() {
        return Ok(response.json().await?);
    }

    let body = response.text().await?;
    debug!(%status, body = %body, "Download service returned an error");
    let error = serde_json::from_str::<ErrorResponse>(&body).unwrap_or_else(|_| ErrorResponse {
        code: status.as_u16().to_string(),
        message: body,
    });

    Err(ClientError::Rejected {
        code: error.code,
        message: error.message,
    })
}
