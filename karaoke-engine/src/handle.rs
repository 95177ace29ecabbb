//! Shared job handle
//!
//! The worker is the only writer of a job; HTTP handlers read it concurrently.
//! Readers never borrow live state: they take a [`JobSnapshot`] under the read
//! lock, so every snapshot is internally consistent.

use karaoke_core::{Job, JobSnapshot};
use std::path::{Path, PathBuf};
use std::sync::{Arc, PoisonError, RwLock};
use uuid::Uuid;

/// Cheaply clonable handle to a registered job
#[derive(Debug, Clone)]
pub struct JobHandle {
    id: Uuid,
    workdir: Arc<PathBuf>,
    job: Arc<RwLock<Job>>,
}

impl JobHandle {
    pub fn new(job: Job, workdir: PathBuf) -> Self {
        Self {
            id: job.id(),
            workdir: Arc::new(workdir),
            job: Arc::new(RwLock::new(job)),
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Private working directory of this job
    pub fn workdir(&self) -> &Path {
        &self.workdir
    }

    /// Consistent copy of the job's current state
    pub fn snapshot(&self) -> JobSnapshot {
        let job = self.job.read().unwrap_or_else(PoisonError::into_inner);
        JobSnapshot::from(&*job)
    }

    /// Applies `f` to the job under the write lock
    ///
    /// Everything `f` changes becomes visible to readers at once.
    pub fn update<T>(&self, f: impl FnOnce(&mut Job) -> T) -> T {
        let mut job = self.job.write().unwrap_or_else(PoisonError::into_inner);
        f(&mut *job)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use karaoke_core::{JobStatus, StageName, StageStatus};

    #[test]
    fn test_snapshot_reflects_updates() {
        let handle = JobHandle::new(
            Job::new(Uuid::new_v4(), "https://example.com/v"),
            PathBuf::from("/tmp/job"),
        );
        assert_eq!(handle.snapshot().status, JobStatus::Pending);

        handle
            .update(|job| job.mark_stage(StageName::Download, StageStatus::Running, "", None))
            .unwrap();

        assert_eq!(handle.snapshot().status, JobStatus::Running);
        assert_eq!(handle.workdir(), Path::new("/tmp/job"));
    }

    #[test]
    fn test_clones_share_state() {
        let handle = JobHandle::new(
            Job::new(Uuid::new_v4(), "https://example.com/v"),
            PathBuf::from("/tmp/job"),
        );
        let reader = handle.clone();

        handle.update(|job| job.record_error("boom"));

        assert_eq!(reader.snapshot().error.as_deref(), Some("boom"));
        assert_eq!(reader.id(), handle.id());
    }
}
