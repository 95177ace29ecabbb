//! Transcript to SRT conversion
//!
//! Whisper writes a JSON transcript made of timed segments. The overlay stage
//! needs SubRip subtitles, so each segment becomes one numbered SRT entry.

use serde::Deserialize;
use std::fmt::Write as _;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Transcript could not be turned into subtitles
#[derive(Debug, Error)]
pub enum SubtitleError {
    #[error("Failed to read transcript {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Malformed transcript {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("Failed to write subtitles {}: {source}", .path.display())]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Whisper JSON transcript (only the fields we use)
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Transcript {
    #[serde(default)]
    pub segments: Vec<Segment>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Segment {
    #[serde(default)]
    pub start: f64,
    /// Defaults to `start` when absent
    #[serde(default)]
    pub end: Option<f64>,
    #[serde(default)]
    pub text: String,
}

/// Formats seconds as `HH:MM:SS,mmm`, truncating sub-millisecond precision
pub fn format_timestamp(seconds: f64) -> String {
    let total_millis = if seconds.is_finite() && seconds > 0.0 {
        (seconds * 1000.0).trunc() as u64
    } else {
        0
    };

    let hours = total_millis / 3_600_000;
    let minutes = (total_millis % 3_600_000) / 60_000;
    let secs = (total_millis % 60_000) / 1000;
    let millis = total_millis % 1000;

    format!("{:02}:{:02}:{:02},{:03}", hours, minutes, secs, millis)
}

/// Renders a transcript as SRT text
pub fn render_srt(transcript: &Transcript) -> String {
    let mut out = String::new();
    for (index, segment) in transcript.segments.iter().enumerate() {
        let end = segment.end.unwrap_or(segment.start);
        // writing to a String cannot fail
        let _ = write!(
            out,
            "{}\n{} --> {}\n{}\n\n",
            index + 1,
            format_timestamp(segment.start),
            format_timestamp(end),
            segment.text.trim()
        );
    }
    out
}

/// Converts a JSON transcript file into an `.srt` file next to it
pub fn transcript_to_srt(transcript_path: &Path) -> Result<PathBuf, SubtitleError> {
    let raw = std::fs::read_to_string(transcript_path).map_err(|source| SubtitleError::Read {
        path: transcript_path.to_path_buf(),
        source,
    })?;

    let transcript: Transcript =
        serde_json::from_str(&raw).map_err(|source| SubtitleError::Parse {
            path: transcript_path.to_path_buf(),
            source,
        })?;

    let srt_path = transcript_path.with_extension("srt");
    std::fs::write(&srt_path, render_srt(&transcript)).map_err(|source| {
        SubtitleError::Write {
            path: srt_path.clone(),
            source,
        }
    })?;

    Ok(srt_path)
}
