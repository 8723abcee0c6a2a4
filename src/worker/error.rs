use thiserror::Error;

/// Failure of one step of a download job.
///
/// The `Display` text is what ends up in a failed job's `error_message`.
#[derive(Debug, Error)]
pub enum DownloadError {
    #[error("{0}")]
    InvalidInput(String),

    #[error("{context}, status: {status}")]
    Upstream { context: &'static str, status: u16 },

    #[error("{context}: {source}")]
    Request {
        context: &'static str,
        #[source]
        source: reqwest::Error,
    },

    #[error("{0}")]
    Parse(String),

    #[error("{context}: {source}")]
    Io {
        context: &'static str,
        #[source]
        source: std::io::Error,
    },

    #[error("internal error: {0}")]
    Internal(String),
}

impl DownloadError {
    pub fn code(&self) -> &'static str {
        match self {
            DownloadError::InvalidInput(_) => "INVALID_INPUT",
            DownloadError::Upstream { .. } | DownloadError::Request { .. } => "UPSTREAM",
            DownloadError::Parse(_) => "PARSE_ERROR",
            DownloadError::Io { .. } => "IO",
            DownloadError::Internal(_) => "INTERNAL",
        }
    }

    pub(crate) fn request(context: &'static str) -> impl FnOnce(reqwest::Error) -> Self {
        move |source| DownloadError::Request { context, source }
    }

    pub(crate) fn io(context: &'static str) -> impl FnOnce(std::io::Error) -> Self {
        move |source| DownloadError::Io { context, source }
    }
}

pub type Result<T> = std::result::Result<T, DownloadError>;
