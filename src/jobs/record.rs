use chrono::{DateTime, Utc};
use std::fmt;

use super::error::{Result, StoreError};

/// Lifecycle state of a download job.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobState {
    Pending,
    Downloading,
    Completed,
    Failed,
}

impl JobState {
    pub fn as_str(&self) -> &'static str {
        match self {
            JobState::Pending => "pending",
            JobState::Downloading => "downloading",
            JobState::Completed => "completed",
            JobState::Failed => "failed",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, JobState::Completed | JobState::Failed)
    }
}

impl fmt::Display for JobState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One submitted download.
///
/// `output_path` stays empty and `bytes_written` stays zero until the job
/// completes. `completed_at` is set on both terminal transitions.
#[derive(Debug, Clone, PartialEq)]
pub struct JobRecord {
    pub id: String,
    pub source_url: String,
    pub state: JobState,
    pub progress_pct: u8,
    /// Short description of the checkpoint last reached while downloading.
    pub stage: String,
    pub output_path: String,
    pub bytes_written: u64,
    pub created_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
    pub error_message: String,
}

impl JobRecord {
    pub fn pending(id: impl Into<String>, source_url: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            source_url: source_url.into(),
            state: JobState::Pending,
            progress_pct: 0,
            stage: String::new(),
            output_path: String::new(),
            bytes_written: 0,
            created_at: Utc::now(),
            completed_at: None,
            error_message: String::new(),
        }
    }

    /// Applies `patch` in place. Terminal records are frozen.
    pub(crate) fn apply(&mut self, patch: JobPatch) -> Result<()> {
        let target = patch.target_state();
        let skips_download = target == JobState::Completed && self.state == JobState::Pending;
        if self.state.is_terminal() || skips_download {
            return Err(StoreError::IllegalTransition {
                id: self.id.clone(),
                from: self.state,
                to: target,
            });
        }

        match patch {
            JobPatch::Progress {
                progress_pct,
                stage,
            } => {
                // 100 is reserved for the completed state
                let progress_pct = progress_pct.min(99);
                if self.state == JobState::Downloading && progress_pct < self.progress_pct {
                    return Err(StoreError::ProgressRegression {
                        id: self.id.clone(),
                        from: self.progress_pct,
                        to: progress_pct,
                    });
                }
                self.state = JobState::Downloading;
                self.progress_pct = progress_pct;
                self.stage = stage;
            }
            JobPatch::Complete {
                output_path,
                bytes_written,
                completed_at,
            } => {
                self.state = JobState::Completed;
                self.progress_pct = 100;
                self.stage.clear();
                self.output_path = output_path;
                self.bytes_written = bytes_written;
                self.completed_at = Some(completed_at);
            }
            JobPatch::Fail {
                error_message,
                completed_at,
            } => {
                self.state = JobState::Failed;
                self.stage.clear();
                self.error_message = if error_message.is_empty() {
                    "unknown error".to_string()
                } else {
                    error_message
                };
                self.completed_at = Some(completed_at);
            }
        }

        Ok(())
    }
}

/// The field sets a runner is allowed to change, one variant per transition.
#[derive(Debug, Clone, PartialEq)]
pub enum JobPatch {
    Progress {
        progress_pct: u8,
        stage: String,
    },
    Complete {
        output_path: String,
        bytes_written: u64,
        completed_at: DateTime<Utc>,
    },
    Fail {
        error_message: String,
        completed_at: DateTime<Utc>,
    },
}

impl JobPatch {
    pub fn progress(progress_pct: u8, stage: impl Into<String>) -> Self {
        JobPatch::Progress {
            progress_pct,
            stage: stage.into(),
        }
    }

    pub fn complete(output_path: impl Into<String>, bytes_written: u64) -> Self {
        JobPatch::Complete {
            output_path: output_path.into(),
            bytes_written,
            completed_at: Utc::now(),
        }
    }

    pub fn fail(error_message: impl Into<String>) -> Self {
        JobPatch::Fail {
            error_message: error_message.into(),
            completed_at: Utc::now(),
        }
    }

    pub fn target_state(&self) -> JobState {
        match self {
            JobPatch::Progress { .. } => JobState::Downloading,
            JobPatch::Complete { .. } => JobState::Completed,
            JobPatch::Fail { .. } => JobState::Failed,
        }
    }
}
