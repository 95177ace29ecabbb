//! Error types for the karaoke engine

use thiserror::Error;
use uuid::Uuid;

use crate::subtitle::SubtitleError;
use crate::toolchain::ToolError;

/// Errors returned by the job manager to its callers
#[derive(Debug, Error)]
pub enum JobError {
    /// The submitted URL was rejected before a job was created
    #[error("{0}")]
    Validation(String),

    /// No job with this ID is registered
    #[error("Job {0} not found")]
    NotFound(Uuid),

    /// The job has no output yet (still running, or failed)
    #[error("Job {0} not finished")]
    NotFinished(Uuid),

    /// Working directory could not be provisioned
    #[error("Failed to prepare job directory: {0}")]
    Io(#[from] std::io::Error),

    /// The worker is gone and cannot accept jobs
    #[error("Job worker is not running")]
    WorkerStopped,
}

/// Why a single stage failed
///
/// The `Display` output is what ends up in the stage message and the job error.
#[derive(Debug, Error)]
pub enum StageError {
    #[error(transparent)]
    Tool(#[from] ToolError),

    #[error(transparent)]
    Subtitle(#[from] SubtitleError),

    /// An upstream stage did not leave the artifact this stage needs
    #[error("Missing {artifact} artifact for stage '{stage}'")]
    MissingArtifact {
        stage: karaoke_core::StageName,
        artifact: &'static str,
    },
}

/// Invalid engine configuration
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Invalid configuration: {0}")]
pub struct ConfigError(pub String);
