//! Job DTOs for the HTTP boundary

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::job::{Job, JobStatus};
use crate::domain::stage::{StageName, StageResult, StageStatus};

/// Request to create a new job
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CreateJob {
    #[serde(default)]
    pub url: Option<String>,
}

impl CreateJob {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: Some(url.into()),
        }
    }
}

/// Point-in-time copy of a job, safe to hand to readers
///
/// `stages` serializes as a JSON object keyed by stage name, in execution order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobSnapshot {
    pub job_id: Uuid,
    pub url: String,
    pub created_at: DateTime<Utc>,
    pub status: JobStatus,
    pub error: Option<String>,
    pub output_file: Option<String>,
    #[serde(with = "ordered_stages")]
    pub stages: Vec<StageSnapshot>,
}

impl JobSnapshot {
    pub fn stage(&self, name: StageName) -> Option<&StageSnapshot> {
        self.stages.iter().find(|stage| stage.name == name)
    }

    /// The stage that failed, if any
    pub fn failed_stage(&self) -> Option<&StageSnapshot> {
        self.stages
            .iter()
            .find(|stage| stage.status == StageStatus::Failed)
    }
}

/// Stage state as seen by readers
#[derive(Debug, Clone, PartialEq)]
pub struct StageSnapshot {
    pub name: StageName,
    pub status: StageStatus,
    pub started_at: Option<DateTime<Utc>>,
    pub finished_at: Option<DateTime<Utc>>,
    pub message: String,
    pub output: Option<String>,
}

impl From<&StageResult> for StageSnapshot {
    fn from(stage: &StageResult) -> Self {
        Self {
            name: stage.name,
            status: stage.status,
            started_at: stage.started_at,
            finished_at: stage.finished_at,
            message: stage.message.clone(),
            output: stage.output.clone(),
        }
    }
}

impl From<&Job> for JobSnapshot {
    fn from(job: &Job) -> Self {
        Self {
            job_id: job.id(),
            url: job.url().to_string(),
            created_at: job.created_at(),
            status: job.status(),
            error: job.error().map(str::to_string),
            output_file: job.output_file().map(str::to_string),
            stages: job.stages().iter().map(StageSnapshot::from).collect(),
        }
    }
}

/// Serializes the stage list as a name-keyed map without losing order
mod ordered_stages {
    use super::*;
    use serde::de::{MapAccess, Visitor};
    use serde::ser::SerializeMap;
    use serde::{Deserializer, Serializer};
    use std::fmt;

    #[derive(Serialize)]
    struct StageFieldsRef<'a> {
        status: StageStatus,
        started_at: Option<DateTime<Utc>>,
        finished_at: Option<DateTime<Utc>>,
        message: &'a str,
        output: Option<&'a str>,
    }

    #[derive(Deserialize)]
    struct StageFields {
        status: StageStatus,
        #[serde(default)]
        started_at: Option<DateTime<Utc>>,
        #[serde(default)]
        finished_at: Option<DateTime<Utc>>,
        #[serde(default)]
        message: String,
        #[serde(default)]
        output: Option<String>,
    }

    pub fn serialize<S>(stages: &[StageSnapshot], serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut map = serializer.serialize_map(Some(stages.len()))?;
        for stage in stages {
            map.serialize_entry(
                &stage.name,
                &StageFieldsRef {
                    status: stage.status,
                    started_at: stage.started_at,
                    finished_at: stage.finished_at,
                    message: &stage.message,
                    output: stage.output.as_deref(),
                },
            )?;
        }
        map.end()
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Vec<StageSnapshot>, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct StagesVisitor;

        impl<'de> Visitor<'de> for StagesVisitor {
            type Value = Vec<StageSnapshot>;

            fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
                formatter.write_str("a map of stage name to stage state")
            }

            fn visit_map<A>(self, mut access: A) -> Result<Self::Value, A::Error>
            where
                A: MapAccess<'de>,
            {
                let mut stages = Vec::with_capacity(access.size_hint().unwrap_or(0));
                while let Some((name, fields)) = access.next_entry::<StageName, StageFields>()? {
                    stages.push(StageSnapshot {
                        name,
                        status: fields.status,
                        started_at: fields.started_at,
                        finished_at: fields.finished_at,
                        message: fields.message,
                        output: fields.output,
                    });
                }
                Ok(stages)
            }
        }

        deserializer.deserialize_map(StagesVisitor)
    }
}
