//! Karaoke Core
//!
//! Core types for the karaoke pipeline.
//!
//! This crate contains:
//! - Domain types: jobs, stages and the stage state machine
//! - DTOs: snapshots and requests exchanged with the HTTP layer

pub mod domain;
pub mod dto;

pub use domain::job::{Job, JobStatus};
pub use domain::stage::{StageName, StageResult, StageStatus, StageTransitionError};
pub use dto::job::{CreateJob, JobSnapshot, StageSnapshot};
