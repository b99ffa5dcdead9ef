use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::{Mutex, OwnedMutexGuard};
use uuid::Uuid;

use crate::errors::AppError;

/// Per-job critical sections for regeneration and manual saves.
///
/// Acquisition never waits: if another generate/save holds the job, the caller
/// gets `AppError::Conflict` and the in-flight operation wins.
#[derive(Clone, Default)]
pub struct JobLocks {
    inner: Arc<Mutex<HashMap<Uuid, Arc<Mutex<()>>>>>,
}

/// Held for the duration of one generate or save. Released on drop.
pub type JobGuard = OwnedMutexGuard<()>;

impl JobLocks {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn try_acquire(&self, job_id: Uuid) -> Result<JobGuard, AppError> {
        let lock = {
            let mut locks = self.inner.lock().await;
            locks.entry(job_id).or_default().clone()
        };
        lock.try_lock_owned().map_err(|_| {
            AppError::Conflict(format!(
                "Job {job_id} is being regenerated or saved; try again once it finishes"
            ))
        })
    }

    /// Drops the lock entry of a deleted job.
    pub async fn forget(&self, job_id: Uuid) {
        self.inner.lock().await.remove(&job_id);
    }
}
