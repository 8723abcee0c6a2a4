//! Wire types for the download service.
//!
//! Three unary operations are exposed as JSON over HTTP:
//! - `POST /downloads` takes a [`DownloadRequest`] and answers with a
//!   [`DownloadResponse`] before any network I/O has started
//! - `GET /downloads/{download_id}` returns a [`StatusResponse`]
//! - `GET /downloads?limit=&offset=` returns a [`ListResponse`]
//!
//! `status` strings are `pending | started | downloading | completed | failed`.
//! `started` only ever appears in the response to a start call; stored jobs
//! report `pending` until their runner picks them up.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

use crate::jobs::{JobRecord, JobState};
use crate::observability::MetricsSnapshot;
use crate::worker::JobRequest;

/// Status reported by a successful start call.
pub const STATUS_STARTED: &str = "started";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DownloadRequest {
    pub soundcloud_url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output_directory: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filename: Option<String>,
}

impl DownloadRequest {
    pub fn new(soundcloud_url: impl Into<String>) -> Self {
        Self {
            soundcloud_url: soundcloud_url.into(),
            ..Default::default()
        }
    }

    pub fn into_job_request(self) -> JobRequest {
        JobRequest {
            source_url: self.soundcloud_url,
            output_directory: self.output_directory.filter(|dir| !dir.is_empty()),
            filename: self.filename.filter(|name| !name.is_empty()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DownloadResponse {
    pub download_id: String,
    pub status: String,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusResponse {
    pub download_id: String,
    pub status: String,
    pub message: String,
    pub progress_percent: i32,
    pub file_path: String,
    pub file_size: i64,
    pub error_message: String,
}

impl From<JobRecord> for StatusResponse {
    fn from(record: JobRecord) -> Self {
        let message = if record.state == JobState::Downloading && !record.stage.is_empty() {
            record.stage
        } else {
            format!("Download {}", record.state)
        };

        Self {
            download_id: record.id,
            status: record.state.to_string(),
            message,
            progress_percent: i32::from(record.progress_pct),
            file_path: record.output_path,
            file_size: file_size(record.bytes_written),
            error_message: record.error_message,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListRequest {
    /// Maximum number of entries; zero or negative returns everything.
    #[serde(default)]
    pub limit: i32,
    #[serde(default)]
    pub offset: i32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListResponse {
    pub downloads: Vec<DownloadInfo>,
    pub total_count: i32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DownloadInfo {
    pub download_id: String,
    pub soundcloud_url: String,
    pub status: String,
    pub file_path: String,
    pub file_size: i64,
    /// RFC 3339
    pub created_at: String,
    /// RFC 3339, empty while the job is running
    pub completed_at: String,
    pub error_message: String,
}

impl From<JobRecord> for DownloadInfo {
    fn from(record: JobRecord) -> Self {
        Self {
            download_id: record.id,
            soundcloud_url: record.source_url,
            status: record.state.to_string(),
            file_path: record.output_path,
            file_size: file_size(record.bytes_written),
            created_at: rfc3339(&record.created_at),
            completed_at: record
                .completed_at
                .as_ref()
                .map(rfc3339)
                .unwrap_or_default(),
            error_message: record.error_message,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub code: String,
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub counters: MetricsSnapshot,
}

fn rfc3339(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Secs, true)
}

fn file_size(bytes: u64) -> i64 {
    i64::try_from(bytes).unwrap_or(i64::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::jobs::JobPatch;
    use chrono::TimeZone;

    fn completed_record() -> JobRecord {
        let mut record = JobRecord::pending("dl_1", "https://soundcloud.com/user/12345");
        record.created_at = Utc.with_ymd_and_hms(2024, 5, 1, 10, 0, 0).unwrap();
        record.apply(JobPatch::progress(75, "Downloading file")).unwrap();
        record
            .apply(JobPatch::Complete {
                output_path: "out/soundcloud_12345.mp3".into(),
                bytes_written: 4096,
                completed_at: Utc.with_ymd_and_hms(2024, 5, 1, 10, 0, 7).unwrap(),
            })
            .unwrap();
        record
    }

    #[test]
    fn test_status_response_for_running_job_uses_stage() {
        let mut record = JobRecord::pending("dl_1", "u");
        record.apply(JobPatch::progress(25, "Track info extracted")).unwrap();

        let status = StatusResponse::from(record);
        assert_eq!(status.status, "downloading");
        assert_eq!(status.message, "Track info extracted");
        assert_eq!(status.progress_percent, 25);
        assert!(status.file_path.is_empty());
    }

    #[test]
    fn test_status_response_for_completed_job() {
        let status = StatusResponse::from(completed_record());
        assert_eq!(status.status, "completed");
        assert_eq!(status.message, "Download completed");
        assert_eq!(status.progress_percent, 100);
        assert_eq!(status.file_size, 4096);
        assert_eq!(status.file_path, "out/soundcloud_12345.mp3");
    }

    #[test]
    fn test_download_info_timestamps() {
        let info = DownloadInfo::from(completed_record());
        assert_eq!(info.created_at, "2024-05-01T10:00:00Z");
        assert_eq!(info.completed_at, "2024-05-01T10:00:07Z");

        let pending = DownloadInfo::from(JobRecord::pending("dl_2", "u"));
        assert_eq!(pending.status, "pending");
        assert!(pending.completed_at.is_empty());
    }

    #[test]
    fn test_download_request_optional_fields() {
        let request: DownloadRequest =
            serde_json::from_str(r#"{"soundcloud_url":"https://soundcloud.com/a/1"}"#).unwrap();
        assert_eq!(request.output_directory, None);

        let job = DownloadRequest {
            soundcloud_url: "https://soundcloud.com/a/1".into(),
            output_directory: Some(String::new()),
            filename: Some("song".into()),
        }
        .into_job_request();
        assert_eq!(job.output_directory, None);
        assert_eq!(job.filename.as_deref(), Some("song"));
    }
}
