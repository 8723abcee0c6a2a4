//! Streams a media URL into a local file.

use std::path::Path;

use reqwest::{Client, StatusCode};
use tokio::fs::{self, File};
use tokio::io::AsyncWriteExt;
use tracing::debug;

use super::error::{DownloadError, Result};

#[derive(Debug, Clone)]
pub struct Fetcher {
    http: Client,
}

impl Fetcher {
    pub fn new(http: Client) -> Self {
        Self { http }
    }

    /// Download `stream_url` into `output_path`, returning the number of
    /// bytes written.
    ///
    /// Missing parent directories are created first. The file is only
    /// created once the server has answered 200, and is
    /// truncated if it already exists. A failure mid-copy leaves the partial
    /// file in place.
    pub async fn download(&self, stream_url: &str, output_path: &Path) -> Result<u64> {
        if let Some(parent) = output_path.parent() {
            ensure_dir(parent).await?;
        }

        let mut response = self
            .http
            .get(stream_url)
            .send()
            .await
            .map_err(DownloadError::request("failed to download file"))?;

        let status = response.status();
        if status != StatusCode::OK {
            return Err(DownloadError::Upstream {
                context: "failed to download file",
                status: status.as_u16(),
            });
        }

        let mut file = File::create(output_path)
            .await
            .map_err(DownloadError::io("failed to create output file"))?;

        let mut written: u64 = 0;
        while let Some(chunk) = response
            .chunk()
            .await
            .map_err(DownloadError::request("failed to read media stream"))?
        {
            file.write_all(&chunk)
                .await
                .map_err(DownloadError::io("failed to write file"))?;
            written += chunk.len() as u64;
        }

        file.flush()
            .await
            .map_err(DownloadError::io("failed to write file"))?;

        debug!(path = %output_path.display(), bytes = written, "Media written");
        Ok(written)
    }
}

/// Create `dir` and any missing parents (0755 on unix).
async fn ensure_dir(dir: &Path) -> Result<()> {
    if dir.as_os_str().is_empty() {
        return Ok(());
    }

    let mut builder = fs::DirBuilder::new();
    builder.recursive(true);
    #[cfg(unix)]
    builder.mode(0o755);

    builder
        .create(dir)
        .await
        .map_err(DownloadError::io("failed to create output directory"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{Router, routing::get};
    use tempfile::TempDir;
    use tokio::net::TcpListener;

    async fn serve_bytes(body: &'static [u8]) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let url = format!("http://{}/track.mp3", listener.local_addr().unwrap());
        let app = Router::new().route("/track.mp3", get(move || async move { body }));
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        url
    }

    #[tokio::test]
    async fn test_download_creates_parents_and_truncates() {
        let url = serve_bytes(b"short body").await;
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("nested/dir/track.mp3");

        let fetcher = Fetcher::new(Client::new());
        assert_eq!(fetcher.download(&url, &path).await.unwrap(), 10);

        std::fs::write(&path, vec![0u8; 64 * 1024]).unwrap();
        let written = fetcher.download(&url, &path).await.unwrap();

        assert_eq!(written, 10);
        assert_eq!(std::fs::read(&path).unwrap(), b"short body");
    }

    #[tokio::test]
    async fn test_ensure_dir_is_recursive_and_idempotent() {
        let temp_dir = TempDir::new().unwrap();
        let nested = temp_dir.path().join("a/b/c");

        ensure_dir(&nested).await.unwrap();
        ensure_dir(&nested).await.unwrap();
        assert!(nested.is_dir());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_ensure_dir_mode() {
        use std::os::unix::fs::PermissionsExt;

        let temp_dir = TempDir::new().unwrap();
        let dir = temp_dir.path().join("out");
        ensure_dir(&dir).await.unwrap();

        let mode = std::fs::metadata(&dir).unwrap().permissions().mode() & 0o777;
        // umask may only clear bits
        assert_eq!(mode & !0o755, 0);
    }

    #[tokio::test]
    async fn test_ensure_dir_fails_on_file() {
        let temp_dir = TempDir::new().unwrap();
        let file = temp_dir.path().join("plain");
        std::fs::write(&file, b"x").unwrap();

        let err = ensure_dir(&file.join("sub")).await.unwrap_err();
        assert_eq!(err.code(), "IO");
    }
}
