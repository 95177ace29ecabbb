//! Karaoke job engine
//!
//! Turns a video URL into a karaoke video by running six stages in order:
//! download, extract, separate vocals, transcribe, merge and overlay. Jobs are
//! queued and processed one at a time by a background worker; progress is
//! observable through [`JobManager`] at any point.

pub mod config;
pub mod error;
pub mod handle;
pub mod manager;
pub mod pipeline;
pub mod scheduler;
pub mod subtitle;
pub mod toolchain;

#[cfg(test)]
pub(crate) mod testing;

pub use config::{EngineConfig, ToolPaths};
pub use error::{ConfigError, JobError, StageError};
pub use handle::JobHandle;
pub use manager::JobManager;
pub use pipeline::PipelineExecutor;
pub use scheduler::JobQueue;
pub use toolchain::{CommandToolchain, ToolError, Toolchain};
