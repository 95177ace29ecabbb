//! Job manager
//!
//! Registry of every job created by this process and the only entry point
//! the HTTP layer uses. Construct one at startup and share it (e.g. behind an
//! `Arc`); jobs live in memory for the lifetime of the process.

use karaoke_core::{Job, JobSnapshot, JobStatus};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, PoisonError, RwLock};
use tracing::info;
use uuid::Uuid;

use crate::config::EngineConfig;
use crate::error::JobError;
use crate::handle::JobHandle;
use crate::pipeline::PipelineExecutor;
use crate::scheduler::JobQueue;
use crate::toolchain::{CommandToolchain, Toolchain};

/// Registered jobs, indexed by ID and kept in creation order
#[derive(Default)]
struct Registry {
    by_id: HashMap<Uuid, JobHandle>,
    order: Vec<Uuid>,
}

/// Creates, tracks and queues karaoke jobs
pub struct JobManager {
    jobs_root: PathBuf,
    jobs: RwLock<Registry>,
    queue: JobQueue,
}

impl JobManager {
    /// Creates a manager and starts its worker
    ///
    /// Must be called from within a tokio runtime.
    pub fn new(jobs_root: impl Into<PathBuf>, toolchain: Arc<dyn Toolchain>) -> Self {
        Self {
            jobs_root: jobs_root.into(),
            jobs: RwLock::new(Registry::default()),
            queue: JobQueue::start(PipelineExecutor::new(toolchain)),
        }
    }

    /// Creates a manager running the command-line toolchain from `config`
    ///
    /// The jobs root is created if missing.
    pub fn from_config(config: &EngineConfig) -> Result<Self, JobError> {
        let jobs_root = config.jobs_root();
        std::fs::create_dir_all(&jobs_root)?;
        info!("Job directories under {}", jobs_root.display());

        let toolchain = Arc::new(CommandToolchain::new(config.tools.clone()));
        Ok(Self::new(jobs_root, toolchain))
    }

    pub fn jobs_root(&self) -> &Path {
        &self.jobs_root
    }

    /// Validates `url`, registers a new job and queues it
    pub fn create_job(&self, url: &str) -> Result<JobSnapshot, JobError> {
        let url = validate_url(url)?;

        let id = Uuid::new_v4();
        let workdir = self.jobs_root.join(id.to_string());
        std::fs::create_dir_all(&workdir)?;

        let handle = JobHandle::new(Job::new(id, url), workdir);
        let snapshot = handle.snapshot();

        {
            let mut registry = self.jobs.write().unwrap_or_else(PoisonError::into_inner);
            // enqueued under the lock so queue order matches registry order
            self.queue.enqueue(handle.clone())?;
            registry.by_id.insert(id, handle);
            registry.order.push(id);
        }

        info!("Job created: {} for {}", id, snapshot.url);
        Ok(snapshot)
    }

    /// Current state of a job
    pub fn get_job(&self, id: Uuid) -> Result<JobSnapshot, JobError> {
        self.handle(id).map(|handle| handle.snapshot())
    }

    /// Every job, in creation order
    pub fn list_jobs(&self) -> Vec<JobSnapshot> {
        let registry = self.jobs.read().unwrap_or_else(PoisonError::into_inner);
        registry
            .order
            .iter()
            .filter_map(|id| registry.by_id.get(id))
            .map(JobHandle::snapshot)
            .collect()
    }

    /// Path of the final video, once the job has completed
    pub fn job_output(&self, id: Uuid) -> Result<PathBuf, JobError> {
        let snapshot = self.get_job(id)?;
        match (snapshot.status, snapshot.output_file) {
            (JobStatus::Completed, Some(path)) => Ok(PathBuf::from(path)),
            _ => Err(JobError::NotFinished(id)),
        }
    }

    /// Number of jobs queued or running
    pub fn outstanding(&self) -> usize {
        self.queue.outstanding()
    }

    /// Resolves once the worker has drained the queue
    pub async fn wait_idle(&self) {
        self.queue.wait_idle().await
    }

    fn handle(&self, id: Uuid) -> Result<JobHandle, JobError> {
        self.jobs
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .by_id
            .get(&id)
            .cloned()
            .ok_or(JobError::NotFound(id))
    }
}

/// Accepts non-empty absolute http(s) URLs, returned trimmed
pub fn validate_url(url: &str) -> Result<String, JobError> {
    let url = url.trim();
    if url.is_empty() {
        return Err(JobError::Validation("url is required".to_string()));
    }

    let parsed = url::Url::parse(url)
        .map_err(|e| JobError::Validation(format!("Invalid url '{}': {}", url, e)))?;

    match parsed.scheme() {
        "http" | "https" => Ok(url.to_string()),
        scheme => Err(JobError::Validation(format!(
            "Unsupported url scheme '{}'",
            scheme
        ))),
    }
}
