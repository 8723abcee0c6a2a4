use std::collections::HashMap;

use tokio::sync::RwLock;
use tracing::{debug, warn};

use super::error::{Result, StoreError};
use super::record::{JobPatch, JobRecord};

#[derive(Debug, Default)]
struct Inner {
    records: HashMap<String, JobRecord>,
    /// Insertion order, used to page through `list`.
    order: Vec<String>,
}

/// A page of job snapshots plus the total number of stored jobs.
#[derive(Debug, Clone)]
pub struct JobPage {
    pub records: Vec<JobRecord>,
    pub total_count: usize,
}

/// In-memory job table guarded by a single reader/writer lock.
///
/// Readers (`get`, `list`) take the shared side, writers (`insert`,
/// `mutate`) the exclusive side. The lock is only held for the map access
/// itself, never across I/O, and every returned record is an owned snapshot.
/// Records are never evicted.
#[derive(Debug, Default)]
pub struct JobStore {
    inner: RwLock<Inner>,
}

impl JobStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a new record. Fails with `Conflict` if the id is taken.
    pub async fn insert(&self, record: JobRecord) -> Result<()> {
        let mut inner = self.inner.write().await;
        if inner.records.contains_key(&record.id) {
            return Err(StoreError::Conflict(record.id));
        }

        debug!(job_id = %record.id, "Job inserted");
        inner.order.push(record.id.clone());
        inner.records.insert(record.id.clone(), record);
        Ok(())
    }

    /// Apply `patch` to the named record under the exclusive lock.
    ///
    /// Unknown ids are ignored. Patches that would break the state machine
    /// (touching a terminal record, lowering progress) are rejected and leave
    /// the record unchanged.
    pub async fn mutate(&self, id: &str, patch: JobPatch) -> Result<()> {
        let mut inner = self.inner.write().await;
        let Some(record) = inner.records.get_mut(id) else {
            debug!(job_id = id, "Mutation for unknown job ignored");
            return Ok(());
        };

        let target = patch.target_state();
        record.apply(patch).inspect_err(|e| {
            warn!(job_id = id, to = %target, error = %e, "Job mutation rejected");
        })
    }

    /// Snapshot of a single record.
    pub async fn get(&self, id: &str) -> Result<JobRecord> {
        let inner = self.inner.read().await;
        inner
            .records
            .get(id)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(id.to_string()))
    }

    /// Snapshots in creation order, skipping `offset` records and returning
    /// at most `limit` of them (`None` means no bound).
    pub async fn list(&self, limit: Option<usize>, offset: usize) -> JobPage {
        let inner = self.inner.read().await;
        let records = inner
            .order
            .iter()
            .skip(offset)
            .take(limit.unwrap_or(usize::MAX))
            .filter_map(|id| inner.records.get(id).cloned())
            .collect();

        JobPage {
            records,
            total_count: inner.records.len(),
        }
    }

    pub async fn len(&self) -> usize {
        self.inner.read().await.records.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}
