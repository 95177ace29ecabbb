//! Command-line toolchain
//!
//! Runs the real tools: yt-dlp for downloads, ffmpeg for stream handling,
//! spleeter for vocal separation and whisper for transcription.

use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::Command;
use tracing::{debug, info};

use super::{ExtractedStreams, SeparatedStems, ToolError, ToolResult, Toolchain};
use crate::config::ToolPaths;

/// Toolchain backed by external processes
#[derive(Debug, Clone)]
pub struct CommandToolchain {
    tools: ToolPaths,
}

impl CommandToolchain {
    pub fn new(tools: ToolPaths) -> Self {
        Self { tools }
    }

    /// Runs `program` and fails with `failure: <stdout+stderr>` on a non-zero exit
    fn run(&self, program: &str, args: Vec<OsString>, failure: &str) -> ToolResult<()> {
        debug!("Running {} {:?}", program, args);

        let output = Command::new(program)
            .args(&args)
            .output()
            .map_err(|e| ToolError(format!("Failed to execute '{}': {}", program, e)))?;

        let stdout = String::from_utf8_lossy(&output.stdout);
        let stderr = String::from_utf8_lossy(&output.stderr);

        if !stdout.trim().is_empty() {
            debug!("{} stdout: {}", program, stdout.trim());
        }
        if !stderr.trim().is_empty() {
            debug!("{} stderr: {}", program, stderr.trim());
        }

        if !output.status.success() {
            return Err(ToolError(format!("{}: {}{}", failure, stdout, stderr)));
        }

        Ok(())
    }
}

fn args<I, S>(items: I) -> Vec<OsString>
where
    I: IntoIterator<Item = S>,
    S: Into<OsString>,
{
    items.into_iter().map(Into::into).collect()
}

/// File stem of `path`, used by spleeter and whisper to name their outputs
fn stem(path: &Path) -> OsString {
    path.file_stem().map(OsString::from).unwrap_or_default()
}

fn create_dir(dir: &Path) -> ToolResult<()> {
    std::fs::create_dir_all(dir)
        .map_err(|e| ToolError(format!("Failed to create {}: {}", dir.display(), e)))
}

impl Toolchain for CommandToolchain {
    fn download(&self, url: &str, workdir: &Path) -> ToolResult<PathBuf> {
        let output = workdir.join("source.mp4");
        info!("Downloading {} to {}", url, output.display());

        self.run(
            &self.tools.yt_dlp,
            args([OsString::from("-o"), output.clone().into(), url.into()]),
            "Failed to download video",
        )?;

        Ok(output)
    }

    fn extract(&self, video: &Path, workdir: &Path) -> ToolResult<ExtractedStreams> {
        let audio = workdir.join("audio.wav");
        let silent = workdir.join("video_silent.mp4");

        self.run(
            &self.tools.ffmpeg,
            args([
                OsString::from("-y"),
                "-i".into(),
                video.into(),
                "-q:a".into(),
                "0".into(),
                "-map".into(),
                "a".into(),
                audio.clone().into(),
            ]),
            "Audio extraction failed",
        )?;

        self.run(
            &self.tools.ffmpeg,
            args([
                OsString::from("-y"),
                "-i".into(),
                video.into(),
                "-an".into(),
                silent.clone().into(),
            ]),
            "Video extraction failed",
        )?;

        Ok(ExtractedStreams {
            audio,
            video: silent,
        })
    }

    fn separate(&self, audio: &Path, workdir: &Path) -> ToolResult<SeparatedStems> {
        let output_dir = workdir.join("spleeter");
        create_dir(&output_dir)?;

        self.run(
            &self.tools.spleeter,
            args([
                OsString::from("separate"),
                "-p".into(),
                self.tools.spleeter_model.as_str().into(),
                "-o".into(),
                output_dir.clone().into(),
                audio.into(),
            ]),
            "Spleeter failed",
        )?;

        // spleeter writes into a subdirectory named after the input stem
        let track_dir = output_dir.join(stem(audio));
        Ok(SeparatedStems {
            vocals: track_dir.join("vocals.wav"),
            accompaniment: track_dir.join("accompaniment.wav"),
        })
    }

    fn transcribe(&self, audio: &Path, workdir: &Path) -> ToolResult<PathBuf> {
        let transcript_dir = workdir.join("transcript");
        create_dir(&transcript_dir)?;

        self.run(
            &self.tools.whisper,
            args([
                OsString::from(audio),
                "--model".into(),
                self.tools.whisper_model.as_str().into(),
                "--output_format".into(),
                "json".into(),
                "--output_dir".into(),
                transcript_dir.clone().into(),
            ]),
            "Transcription failed",
        )?;

        let mut transcript = stem(audio);
        transcript.push(".json");
        Ok(transcript_dir.join(transcript))
    }

    fn merge(&self, video: &Path, audio: &Path, workdir: &Path) -> ToolResult<PathBuf> {
        let merged = workdir.join("karaoke_base.mp4");

        self.run(
            &self.tools.ffmpeg,
            args([
                OsString::from("-y"),
                "-i".into(),
                video.into(),
                "-i".into(),
                audio.into(),
                "-c:v".into(),
                "copy".into(),
                "-c:a".into(),
                "aac".into(),
                "-shortest".into(),
                merged.clone().into(),
            ]),
            "Failed to merge audio/video",
        )?;

        Ok(merged)
    }

    fn overlay(&self, video: &Path, subtitles: &Path, workdir: &Path) -> ToolResult<PathBuf> {
        let output = workdir.join("karaoke_final.mp4");

        let mut filter = OsString::from("subtitles=");
        filter.push(subtitles);

        self.run(
            &self.tools.ffmpeg,
            args([
                OsString::from("-y"),
                "-i".into(),
                video.into(),
                "-vf".into(),
                filter,
                "-c:a".into(),
                "copy".into(),
                output.clone().into(),
            ]),
            "Failed to overlay subtitles",
        )?;

        Ok(output)
    }
}
