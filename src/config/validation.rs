use super::models::Config;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("upstream.page_host must not be empty")]
    EmptyPageHost,

    #[error("upstream.api_base_url must be an http(s) URL, got '{0}'")]
    InvalidApiBaseUrl(String),

    #[error("client.server_url must be an http(s) URL, got '{0}'")]
    InvalidServerUrl(String),

    #[error("{field} must be positive")]
    ZeroDuration { field: &'static str },

    #[error("downloads.default_output_dir must not be empty")]
    EmptyOutputDir,
}

/// Validate the entire configuration
pub fn validate(config: &Config) -> Result<(), ValidationError> {
    validate_upstream(config)?;
    validate_downloads(config)?;
    validate_client(config)?;
    Ok(())
}

fn is_http_url(url: &str) -> bool {
    url.starts_with("http://") || url.starts_with("https://")
}

fn validate_upstream(config: &Config) -> Result<(), ValidationError> {
    let upstream = &config.upstream;

    if upstream.page_host.trim().is_empty() {
        return Err(ValidationError::EmptyPageHost);
    }

    if !is_http_url(&upstream.api_base_url) {
        return Err(ValidationError::InvalidApiBaseUrl(
            upstream.api_base_url.clone(),
        ));
    }

    if upstream.request_timeout_secs == 0 {
        return Err(ValidationError::ZeroDuration {
            field: "upstream.request_timeout_secs",
        });
    }

    Ok(())
}

fn validate_downloads(config: &Config) -> Result<(), ValidationError> {
    if config.downloads.default_output_dir.as_os_str().is_empty() {
        return Err(ValidationError::EmptyOutputDir);
    }
    Ok(())
}

fn validate_client(config: &Config) -> Result<(), ValidationError> {
    let client = &config.client;

    if !is_http_url(&client.server_url) {
        return Err(ValidationError::InvalidServerUrl(client.server_url.clone()));
    }

    let durations = [
        ("client.poll_interval_ms", client.poll_interval_ms),
        ("client.start_timeout_secs", client.start_timeout_secs),
        ("client.query_timeout_secs", client.query_timeout_secs),
    ];
    for (field, value) in durations {
        if value == 0 {
            return Err(ValidationError::ZeroDuration { field });
        }
    }

    Ok(())
}
