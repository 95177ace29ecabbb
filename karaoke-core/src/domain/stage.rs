//! Stage domain types
//!
//! A job runs the same six stages in the same order every time. Each stage
//! carries its own small state machine: `Pending -> Running -> Success | Failed`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// One step of the karaoke pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StageName {
    Download,
    Extract,
    SeparateVocals,
    Transcribe,
    Merge,
    Overlay,
}

impl StageName {
    /// Every stage, in execution order
    pub const ALL: [StageName; 6] = [
        StageName::Download,
        StageName::Extract,
        StageName::SeparateVocals,
        StageName::Transcribe,
        StageName::Merge,
        StageName::Overlay,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            StageName::Download => "download",
            StageName::Extract => "extract",
            StageName::SeparateVocals => "separate_vocals",
            StageName::Transcribe => "transcribe",
            StageName::Merge => "merge",
            StageName::Overlay => "overlay",
        }
    }

    /// Position of the stage in the pipeline (0-based)
    pub fn index(&self) -> usize {
        *self as usize
    }

    /// The stage that runs after this one, if any
    pub fn next(&self) -> Option<StageName> {
        Self::ALL.get(self.index() + 1).copied()
    }
}

impl fmt::Display for StageName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StageName {
    type Err = UnknownStage;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|stage| stage.as_str() == s)
            .ok_or_else(|| UnknownStage(s.to_string()))
    }
}

/// Returned when a string does not name one of the pipeline stages
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown stage '{0}'")]
pub struct UnknownStage(pub String);

/// Stage execution status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StageStatus {
    Pending,
    Running,
    Success,
    Failed,
}

impl StageStatus {
    /// Success and Failed accept no further transitions
    pub fn is_terminal(&self) -> bool {
        matches!(self, StageStatus::Success | StageStatus::Failed)
    }

    pub fn can_transition_to(&self, next: StageStatus) -> bool {
        matches!(
            (self, next),
            (StageStatus::Pending, StageStatus::Running)
                | (StageStatus::Running, StageStatus::Success)
                | (StageStatus::Running, StageStatus::Failed)
        )
    }
}

/// Rejected stage transition
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("stage '{stage}' cannot move from {from:?} to {to:?}")]
pub struct StageTransitionError {
    pub stage: StageName,
    pub from: StageStatus,
    pub to: StageStatus,
}

/// State of one pipeline step within a job
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StageResult {
    pub name: StageName,
    pub status: StageStatus,
    pub started_at: Option<DateTime<Utc>>,
    pub finished_at: Option<DateTime<Utc>>,
    pub message: String,
    pub output: Option<String>,
}

impl StageResult {
    /// A stage that has not been attempted yet
    pub fn pending(name: StageName) -> Self {
        Self {
            name,
            status: StageStatus::Pending,
            started_at: None,
            finished_at: None,
            message: String::new(),
            output: None,
        }
    }

    /// Moves the stage to `status`, stamping `started_at` when it starts running
    /// and `finished_at` when it reaches a terminal status.
    ///
    /// Message and output are overwritten on every transition.
    pub fn mark(
        &mut self,
        status: StageStatus,
        message: impl Into<String>,
        output: Option<String>,
    ) -> Result<(), StageTransitionError> {
        if !self.status.can_transition_to(status) {
            return Err(StageTransitionError {
                stage: self.name,
                from: self.status,
                to: status,
            });
        }

        let now = Utc::now();
        if status == StageStatus::Running {
            self.started_at = Some(now);
        }
        if status.is_terminal() {
            self.finished_at = Some(now);
        }

        self.status = status;
        self.message = message.into();
        self.output = output;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stage_order_is_fixed() {
        let names: Vec<&str> = StageName::ALL.iter().map(|s| s.as_str()).collect();
        assert_eq!(
            names,
            vec![
                "download",
                "extract",
                "separate_vocals",
                "transcribe",
                "merge",
                "overlay"
            ]
        );
        for (idx, stage) in StageName::ALL.iter().enumerate() {
            assert_eq!(stage.index(), idx);
        }
        assert_eq!(StageName::Download.next(), Some(StageName::Extract));
        assert_eq!(StageName::Overlay.next(), None);
    }

    #[test]
    fn test_stage_name_parse() {
        assert_eq!(
            "separate_vocals".parse::<StageName>(),
            Ok(StageName::SeparateVocals)
        );
        assert!("mixdown".parse::<StageName>().is_err());
    }

    #[test]
    fn test_stage_name_serializes_snake_case() {
        let json = serde_json::to_string(&StageName::SeparateVocals).unwrap();
        assert_eq!(json, "\"separate_vocals\"");
    }

    #[test]
    fn test_pending_stage_has_no_timestamps() {
        let stage = StageResult::pending(StageName::Merge);
        assert_eq!(stage.status, StageStatus::Pending);
        assert!(stage.started_at.is_none());
        assert!(stage.finished_at.is_none());
        assert!(stage.output.is_none());
    }

    #[test]
    fn test_running_sets_started_at_only() {
        let mut stage = StageResult::pending(StageName::Download);
        stage
            .mark(StageStatus::Running, "Downloading video", None)
            .unwrap();

        assert_eq!(stage.status, StageStatus::Running);
        assert!(stage.started_at.is_some());
        assert!(stage.finished_at.is_none());
        assert_eq!(stage.message, "Downloading video");
    }

    #[test]
    fn test_success_keeps_started_at_and_sets_finished_at() {
        let mut stage = StageResult::pending(StageName::Download);
        stage.mark(StageStatus::Running, "", None).unwrap();
        let started = stage.started_at;

        stage
            .mark(
                StageStatus::Success,
                "Video downloaded",
                Some("/tmp/source.mp4".to_string()),
            )
            .unwrap();

        assert_eq!(stage.started_at, started);
        assert!(stage.finished_at.is_some());
        assert!(stage.finished_at >= stage.started_at);
        assert_eq!(stage.output.as_deref(), Some("/tmp/source.mp4"));
    }

    #[test]
    fn test_failed_stage_is_terminal() {
        let mut stage = StageResult::pending(StageName::Extract);
        stage.mark(StageStatus::Running, "", None).unwrap();
        stage.mark(StageStatus::Failed, "boom", None).unwrap();

        assert!(stage.status.is_terminal());
        assert!(stage.mark(StageStatus::Running, "again", None).is_err());
        assert!(stage.mark(StageStatus::Success, "late", None).is_err());
        assert_eq!(stage.message, "boom");
    }

    #[test]
    fn test_pending_cannot_skip_running() {
        let mut stage = StageResult::pending(StageName::Overlay);
        let err = stage
            .mark(StageStatus::Success, "done", None)
            .unwrap_err();

        assert_eq!(err.from, StageStatus::Pending);
        assert_eq!(err.to, StageStatus::Success);
        assert_eq!(stage.status, StageStatus::Pending);
        assert!(stage.started_at.is_none());
    }
}
