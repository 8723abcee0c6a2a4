//! Track page and streams endpoint lookups.

use reqwest::{Client, StatusCode};
use tracing::debug;

use super::error::{DownloadError, Result};
use super::scrape;

/// Identifiers needed to query the streams endpoint for one track.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackRef {
    pub client_token: String,
    pub track_id: String,
}

/// Resolves a public track URL into a direct MP3 stream URL.
///
/// Stateless apart from the shared HTTP client; it never touches job state.
#[derive(Debug, Clone)]
pub struct Resolver {
    http: Client,
    api_base_url: String,
}

impl Resolver {
    pub fn new(http: Client, api_base_url: impl Into<String>) -> Self {
        let api_base_url = api_base_url.into().trim_end_matches('/').to_string();
        Self { http, api_base_url }
    }

    /// Fetch the track page and pull out the client token, then read the
    /// track id from the URL itself.
    pub async fn resolve_track(&self, url: &str) -> Result<TrackRef> {
        let html = self
            .get_text(url, "failed to fetch SoundCloud page", "failed to fetch page")
            .await?;

        let client_token = scrape::client_id(&html)
            .ok_or_else(|| DownloadError::Parse("could not find client_id in page source".into()))?
            .to_string();

        let track_id = scrape::track_id(url)
            .ok_or_else(|| {
                DownloadError::InvalidInput("could not extract track ID from URL".into())
            })?
            .to_string();

        debug!(track_id = %track_id, "Track resolved");
        Ok(TrackRef {
            client_token,
            track_id,
        })
    }

    /// Query the streams endpoint and return the MP3-128 URL.
    pub async fn get_stream_url(&self, track: &TrackRef) -> Result<String> {
        let api_url = self.streams_url(track);
        let body = self
            .get_text(&api_url, "failed to fetch stream info", "failed to get stream info")
            .await?;

        scrape::mp3_stream_url(&body)
            .ok_or_else(|| DownloadError::Parse("could not find stream URL in response".into()))
    }

    fn streams_url(&self, track: &TrackRef) -> String {
        format!(
            "{}/i1/tracks/{}/streams?client_id={}",
            self.api_base_url, track.track_id, track.client_token
        )
    }

    async fn get_text(
        &self,
        url: &str,
        request_context: &'static str,
        status_context: &'static str,
    ) -> Result<String> {
        let response = self
            .http
            .get(url)
            .send()
            .await
            .map_err(DownloadError::request(request_context))?;

        let status = response.status();
        if status != StatusCode::OK {
            return Err(DownloadError::Upstream {
                context: status_context,
                status: status.as_u16(),
            });
        }

        response
            .text()
            .await
            .map_err(DownloadError::request("failed to read response body"))
    }
}
