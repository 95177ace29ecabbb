//! External collaborators
//!
//! Each pipeline stage delegates its real work to an external tool. The
//! executor only sees the [`Toolchain`] contract: input artifact paths plus a
//! working directory in, output artifact paths or a failure message out.
//!
//! Implementations are synchronous and may block for a long time; the worker
//! runs them on the blocking thread pool.

mod command;

pub use command::CommandToolchain;

use std::path::{Path, PathBuf};
use thiserror::Error;

/// Failure reported by a collaborator
///
/// Displays as the bare message so that it can be surfaced verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{0}")]
pub struct ToolError(pub String);

impl ToolError {
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}

pub type ToolResult<T> = std::result::Result<T, ToolError>;

/// Output of the extract stage
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedStreams {
    pub audio: PathBuf,
    /// Video with the audio track removed
    pub video: PathBuf,
}

/// Output of the vocal separation stage
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeparatedStems {
    pub vocals: PathBuf,
    pub accompaniment: PathBuf,
}

/// The six collaborator calls the pipeline depends on
pub trait Toolchain: Send + Sync {
    /// Fetches the media at `url` into `workdir`, returning the video path
    fn download(&self, url: &str, workdir: &Path) -> ToolResult<PathBuf>;

    /// Splits a video into an audio track and a silent video
    fn extract(&self, video: &Path, workdir: &Path) -> ToolResult<ExtractedStreams>;

    /// Separates vocals from accompaniment
    fn separate(&self, audio: &Path, workdir: &Path) -> ToolResult<SeparatedStems>;

    /// Speech-to-text; returns a JSON transcript with timed segments
    fn transcribe(&self, audio: &Path, workdir: &Path) -> ToolResult<PathBuf>;

    /// Muxes `audio` onto `video`
    fn merge(&self, video: &Path, audio: &Path, workdir: &Path) -> ToolResult<PathBuf>;

    /// Burns the subtitle file into the video
    fn overlay(&self, video: &Path, subtitles: &Path, workdir: &Path) -> ToolResult<PathBuf>;
}
