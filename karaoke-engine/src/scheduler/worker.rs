//! Job queue and worker
//!
//! A single worker task drains a FIFO queue and runs each job's pipeline to
//! completion before taking the next one, so pipelines never overlap within
//! a process. Pipelines block, so they run on tokio's blocking pool while the
//! worker task awaits them.

use std::sync::Arc;
use tokio::sync::{mpsc, watch};
use tracing::{debug, error, info};

use crate::error::JobError;
use crate::handle::JobHandle;
use crate::pipeline::PipelineExecutor;

/// Sending side of the job queue
pub struct JobQueue {
    sender: mpsc::UnboundedSender<JobHandle>,
    /// Jobs enqueued but not yet finished (including the one in flight)
    outstanding: Arc<watch::Sender<usize>>,
}

impl JobQueue {
    /// Spawns the worker and returns the queue feeding it
    ///
    /// Must be called from within a tokio runtime. The worker stops once the
    /// queue is dropped and every queued job has run.
    pub fn start(executor: PipelineExecutor) -> Self {
        let (sender, receiver) = mpsc::unbounded_channel();
        let (outstanding, _) = watch::channel(0usize);
        let outstanding = Arc::new(outstanding);

        let worker = Worker {
            executor: Arc::new(executor),
            receiver,
            outstanding: Arc::clone(&outstanding),
        };
        tokio::spawn(worker.run());

        Self {
            sender,
            outstanding,
        }
    }

    /// Queues a job without waiting for it to run
    pub fn enqueue(&self, job: JobHandle) -> Result<(), JobError> {
        let job_id = job.id();
        self.outstanding.send_modify(|count| *count += 1);

        if self.sender.send(job).is_err() {
            self.outstanding
                .send_modify(|count| *count = count.saturating_sub(1));
            return Err(JobError::WorkerStopped);
        }

        debug!("Job {} queued ({} outstanding)", job_id, self.outstanding());
        Ok(())
    }

    /// Number of jobs queued or running
    pub fn outstanding(&self) -> usize {
        *self.outstanding.borrow()
    }

    /// Resolves once every job enqueued so far has finished
    pub async fn wait_idle(&self) {
        let mut receiver = self.outstanding.subscribe();
        // the sender lives in `self`, so this cannot observe a closed channel
        let _ = receiver.wait_for(|count| *count == 0).await;
    }
}

/// Single consumer of the job queue
struct Worker {
    executor: Arc<PipelineExecutor>,
    receiver: mpsc::UnboundedReceiver<JobHandle>,
    outstanding: Arc<watch::Sender<usize>>,
}

impl Worker {
    async fn run(mut self) {
        info!("Job worker started");

        while let Some(job) = self.receiver.recv().await {
            let job_id = job.id();
            let executor = Arc::clone(&self.executor);
            let running = job.clone();

            match tokio::task::spawn_blocking(move || executor.run(&running)).await {
                Ok(snapshot) => {
                    info!("Job {} finished with status {:?}", job_id, snapshot.status);
                }
                Err(e) => {
                    error!("Pipeline for job {} aborted: {}", job_id, e);
                    job.update(|j| j.abort(format!("Pipeline aborted: {}", e)));
                }
            }

            self.outstanding
                .send_modify(|count| *count = count.saturating_sub(1));
        }

        info!("Job worker stopped");
    }
}
