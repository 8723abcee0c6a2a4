use thiserror::Error;

use super::record::JobState;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("job already exists: {0}")]
    Conflict(String),

    #[error("job not found: {0}")]
    NotFound(String),

    #[error("illegal transition for job {id}: {from} -> {to}")]
    IllegalTransition {
        id: String,
        from: JobState,
        to: JobState,
    },

    #[error("progress for job {id} cannot move from {from}% to {to}%")]
    ProgressRegression { id: String, from: u8, to: u8 },
}

pub type Result<T> = std::result::Result<T, StoreError>;
