//! Job domain types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::stage::{StageName, StageResult, StageStatus, StageTransitionError};

/// Overall job status, derived from the stages and the recorded error
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    Pending,
    Running,
    Completed,
    Failed,
}

impl JobStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, JobStatus::Completed | JobStatus::Failed)
    }
}

/// One end-to-end request to turn a URL into a karaoke video
///
/// Created by the job manager, mutated only by the pipeline executor.
/// The stage list always holds the six pipeline stages in execution order.
#[derive(Debug, Clone)]
pub struct Job {
    id: Uuid,
    url: String,
    created_at: DateTime<Utc>,
    stages: Vec<StageResult>,
    output_file: Option<String>,
    error: Option<String>,
}

impl Job {
    /// Creates a job with every stage pending
    pub fn new(id: Uuid, url: impl Into<String>) -> Self {
        Self {
            id,
            url: url.into(),
            created_at: Utc::now(),
            stages: StageName::ALL.into_iter().map(StageResult::pending).collect(),
            output_file: None,
            error: None,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Stages in execution order
    pub fn stages(&self) -> &[StageResult] {
        &self.stages
    }

    pub fn stage(&self, name: StageName) -> &StageResult {
        &self.stages[name.index()]
    }

    pub fn output_file(&self) -> Option<&str> {
        self.output_file.as_deref()
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Derived status
    ///
    /// `Failed` as soon as an error is recorded, `Completed` once every stage
    /// succeeded, `Running` while a stage runs, `Pending` otherwise.
    pub fn status(&self) -> JobStatus {
        if self.error.is_some() {
            return JobStatus::Failed;
        }
        if self
            .stages
            .iter()
            .all(|stage| stage.status == StageStatus::Success)
        {
            return JobStatus::Completed;
        }
        if self
            .stages
            .iter()
            .any(|stage| stage.status == StageStatus::Running)
        {
            return JobStatus::Running;
        }
        JobStatus::Pending
    }

    /// Single mutation entry point for stage state
    ///
    /// A `Failed` mark does not touch `error`; use [`Job::fail_stage`] for that.
    pub fn mark_stage(
        &mut self,
        name: StageName,
        status: StageStatus,
        message: impl Into<String>,
        output: Option<String>,
    ) -> Result<(), StageTransitionError> {
        self.stages[name.index()].mark(status, message, output)
    }

    /// Marks the stage failed and records the message as the job error
    pub fn fail_stage(
        &mut self,
        name: StageName,
        message: impl Into<String>,
    ) -> Result<(), StageTransitionError> {
        let message = message.into();
        self.mark_stage(name, StageStatus::Failed, message.clone(), None)?;
        self.record_error(message);
        Ok(())
    }

    /// Records the first failure; later calls keep the original message
    pub fn record_error(&mut self, message: impl Into<String>) {
        if self.error.is_none() {
            self.error = Some(message.into());
        }
    }

    pub fn set_output_file(&mut self, path: impl Into<String>) {
        self.output_file = Some(path.into());
    }

    /// Fails whatever stage is currently running, or just records the error
    /// when nothing is running.
    pub fn abort(&mut self, message: impl Into<String>) {
        let message = message.into();
        let running = self
            .stages
            .iter()
            .find(|stage| stage.status == StageStatus::Running)
            .map(|stage| stage.name);

        if let Some(name) = running {
            // Running -> Failed is always a legal transition
            let _ = self.mark_stage(name, StageStatus::Failed, message.clone(), None);
        }
        self.record_error(message);
    }
}
