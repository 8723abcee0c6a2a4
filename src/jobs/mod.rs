//! In-memory job bookkeeping shared by the API handlers and the runners.
//!
//! [`JobStore`] is the only mutable state crossing task boundaries. Runners
//! advance a [`JobRecord`] exclusively through [`JobPatch`] values, which
//! keeps the pending -> downloading -> (completed | failed) ordering in one
//! place.

mod error;
mod record;
mod store;

pub use error::{Result, StoreError};
pub use record::{JobPatch, JobRecord, JobState};
pub use store::{JobPage, JobStore};
