use thiserror::Error;

use super::models::DownloadRequest;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RequestValidationError {
    #[error("soundcloud_url is required")]
    MissingUrl,
    #[error("invalid SoundCloud URL")]
    ForeignUrl,
    #[error("download_id is required")]
    MissingDownloadId,
}

/// A start request needs a URL containing the configured page host.
pub fn validate_download_request(
    request: &DownloadRequest,
    page_host: &str,
) -> Result<(), RequestValidationError> {
    let url = request.soundcloud_url.trim();
    if url.is_empty() {
        return Err(RequestValidationError::MissingUrl);
    }

    if !url.contains(page_host) {
        return Err(RequestValidationError::ForeignUrl);
    }

    Ok(())
}

pub fn validate_download_id(download_id: &str) -> Result<(), RequestValidationError> {
    if download_id.trim().is_empty() {
        return Err(RequestValidationError::MissingDownloadId);
    }
    Ok(())
}
