//! Pipeline executor
//!
//! Runs the six stages of one job in order against its working directory,
//! feeding each stage the artifacts produced upstream. The first failure is
//! recorded on the stage and the job, and nothing after it runs.

use karaoke_core::{JobSnapshot, StageName, StageStatus, StageTransitionError};
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, error, info, warn};

use crate::error::StageError;
use crate::handle::JobHandle;
use crate::subtitle;
use crate::toolchain::Toolchain;

/// Artifacts produced so far, carried from stage to stage
#[derive(Debug, Default)]
struct Artifacts {
    video: Option<PathBuf>,
    audio: Option<PathBuf>,
    silent_video: Option<PathBuf>,
    vocals: Option<PathBuf>,
    accompaniment: Option<PathBuf>,
    subtitles: Option<PathBuf>,
    merged: Option<PathBuf>,
    final_video: Option<PathBuf>,
}

fn require<'a>(
    slot: &'a Option<PathBuf>,
    stage: StageName,
    artifact: &'static str,
) -> Result<&'a Path, StageError> {
    slot.as_deref()
        .ok_or(StageError::MissingArtifact { stage, artifact })
}

/// What a finished stage reports
struct StageCompletion {
    message: &'static str,
    output: String,
}

impl StageCompletion {
    fn path(message: &'static str, path: &Path) -> Self {
        Self {
            message,
            output: path.display().to_string(),
        }
    }

    /// Several artifacts, serialized as a JSON object keyed by role
    fn paths(message: &'static str, paths: &[(&str, &Path)]) -> Self {
        let map: Map<String, Value> = paths
            .iter()
            .map(|(role, path)| (role.to_string(), Value::String(path.display().to_string())))
            .collect();
        Self {
            message,
            output: Value::Object(map).to_string(),
        }
    }
}

fn running_message(stage: StageName) -> &'static str {
    match stage {
        StageName::Download => "Downloading video",
        StageName::Extract => "Extracting audio and video streams",
        StageName::SeparateVocals => "Separating vocals",
        StageName::Transcribe => "Transcribing vocals",
        StageName::Merge => "Merging instrumental with video",
        StageName::Overlay => "Rendering subtitles",
    }
}

/// Executes the karaoke pipeline for one job at a time
pub struct PipelineExecutor {
    toolchain: Arc<dyn Toolchain>,
}

impl PipelineExecutor {
    pub fn new(toolchain: Arc<dyn Toolchain>) -> Self {
        Self { toolchain }
    }

    /// Runs every stage of `job` and returns its final state
    ///
    /// Never panics on collaborator failure: errors end up in the job.
    pub fn run(&self, job: &JobHandle) -> JobSnapshot {
        let job_id = job.id();
        let url = job.update(|j| j.url().to_string());
        let workdir = job.workdir();
        let mut artifacts = Artifacts::default();

        info!("Starting pipeline for job {} ({})", job_id, url);

        let first = StageName::ALL[0];
        if let Err(e) = job.update(|j| {
            j.mark_stage(first, StageStatus::Running, running_message(first), None)
        }) {
            error!("Job {} could not start: {}", job_id, e);
            job.update(|j| j.abort(e.to_string()));
            return job.snapshot();
        }

        for stage in StageName::ALL {
            info!(
                "Job {}: stage {}/{} '{}'",
                job_id,
                stage.index() + 1,
                StageName::ALL.len(),
                stage
            );

            let completion = match self.run_stage(stage, &url, workdir, &mut artifacts) {
                Ok(completion) => completion,
                Err(e) => {
                    let message = e.to_string();
                    warn!("Job {}: stage '{}' failed: {}", job_id, stage, message);
                    if let Err(e) = job.update(|j| j.fail_stage(stage, message.clone())) {
                        error!("Job {}: {}", job_id, e);
                        job.update(|j| j.abort(message));
                    }
                    return job.snapshot();
                }
            };

            debug!("Job {}: stage '{}' produced {}", job_id, stage, completion.output);

            // Finishing this stage and starting the next happen in one write,
            // so readers never see the job drop back to pending in between.
            let final_video = artifacts.final_video.clone();
            let handoff = job.update(|j| -> Result<(), StageTransitionError> {
                j.mark_stage(
                    stage,
                    StageStatus::Success,
                    completion.message,
                    Some(completion.output),
                )?;
                match stage.next() {
                    Some(next) => {
                        j.mark_stage(next, StageStatus::Running, running_message(next), None)?
                    }
                    None => {
                        if let Some(path) = final_video {
                            j.set_output_file(path.display().to_string());
                        }
                    }
                }
                Ok(())
            });

            if let Err(e) = handoff {
                error!("Job {}: {}", job_id, e);
                job.update(|j| j.abort(e.to_string()));
                return job.snapshot();
            }
        }

        info!("Job {} completed", job_id);
        job.snapshot()
    }

    fn run_stage(
        &self,
        stage: StageName,
        url: &str,
        workdir: &Path,
        artifacts: &mut Artifacts,
    ) -> Result<StageCompletion, StageError> {
        let tools = &self.toolchain;

        match stage {
            StageName::Download => {
                let video = tools.download(url, workdir)?;
                let completion = StageCompletion::path("Video downloaded", &video);
                artifacts.video = Some(video);
                Ok(completion)
            }
            StageName::Extract => {
                let video = require(&artifacts.video, stage, "video")?;
                let streams = tools.extract(video, workdir)?;
                let completion = StageCompletion::paths(
                    "Audio/Video separated",
                    &[("audio", &streams.audio), ("video", &streams.video)],
                );
                artifacts.audio = Some(streams.audio);
                artifacts.silent_video = Some(streams.video);
                Ok(completion)
            }
            StageName::SeparateVocals => {
                let audio = require(&artifacts.audio, stage, "audio")?;
                let stems = tools.separate(audio, workdir)?;
                let completion = StageCompletion::paths(
                    "Vocals removed",
                    &[
                        ("vocals", &stems.vocals),
                        ("accompaniment", &stems.accompaniment),
                    ],
                );
                artifacts.vocals = Some(stems.vocals);
                artifacts.accompaniment = Some(stems.accompaniment);
                Ok(completion)
            }
            StageName::Transcribe => {
                let vocals = require(&artifacts.vocals, stage, "vocals")?;
                let transcript = tools.transcribe(vocals, workdir)?;
                let subtitles = subtitle::transcript_to_srt(&transcript)?;
                let completion = StageCompletion::path("Transcript generated", &subtitles);
                artifacts.subtitles = Some(subtitles);
                Ok(completion)
            }
            StageName::Merge => {
                let video = require(&artifacts.silent_video, stage, "silent video")?;
                let audio = require(&artifacts.accompaniment, stage, "accompaniment")?;
                let merged = tools.merge(video, audio, workdir)?;
                let completion = StageCompletion::path("Instrumental merged", &merged);
                artifacts.merged = Some(merged);
                Ok(completion)
            }
            StageName::Overlay => {
                let video = require(&artifacts.merged, stage, "merged video")?;
                let subtitles = require(&artifacts.subtitles, stage, "subtitle")?;
                let final_video = tools.overlay(video, subtitles, workdir)?;
                let completion = StageCompletion::path("Karaoke video ready", &final_video);
                artifacts.final_video = Some(final_video);
                Ok(completion)
            }
        }
    }
}
