//! Engine configuration
//!
//! Where job working directories live and which external tools the
//! command toolchain invokes.

use std::path::PathBuf;

use crate::error::ConfigError;

/// Engine configuration
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Root data directory (e.g., "./data")
    pub data_dir: PathBuf,

    /// External tool binaries and models
    pub tools: ToolPaths,
}

/// Binaries and model names used by the command toolchain
#[derive(Debug, Clone)]
pub struct ToolPaths {
    pub yt_dlp: String,
    pub ffmpeg: String,
    pub spleeter: String,
    pub whisper: String,

    /// Spleeter model, e.g. "spleeter:2stems"
    pub spleeter_model: String,

    /// Whisper model size, e.g. "base"
    pub whisper_model: String,
}

impl Default for ToolPaths {
    fn default() -> Self {
        Self {
            yt_dlp: "yt-dlp".to_string(),
            ffmpeg: "ffmpeg".to_string(),
            spleeter: "spleeter".to_string(),
            whisper: "whisper".to_string(),
            spleeter_model: "spleeter:2stems".to_string(),
            whisper_model: "base".to_string(),
        }
    }
}

impl EngineConfig {
    /// Creates a configuration rooted at `data_dir` with default tools
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
            tools: ToolPaths::default(),
        }
    }

    /// Directory holding one working directory per job
    pub fn jobs_root(&self) -> PathBuf {
        self.data_dir.join("jobs")
    }

    /// Creates configuration from environment variables
    ///
    /// Recognized environment variables (all optional):
    /// - KARAOKE_DATA (default: ./data)
    /// - KARAOKE_YT_DLP, KARAOKE_FFMPEG, KARAOKE_SPLEETER, KARAOKE_WHISPER
    /// - KARAOKE_SPLEETER_MODEL (default: spleeter:2stems)
    /// - KARAOKE_WHISPER_MODEL (default: base)
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds configuration from an arbitrary key lookup
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = ToolPaths::default();
        let var = |key: &str, default: String| {
            lookup(key)
                .filter(|value| !value.trim().is_empty())
                .unwrap_or(default)
        };

        Self {
            data_dir: PathBuf::from(var("KARAOKE_DATA", "./data".to_string())),
            tools: ToolPaths {
                yt_dlp: var("KARAOKE_YT_DLP", defaults.yt_dlp),
                ffmpeg: var("KARAOKE_FFMPEG", defaults.ffmpeg),
                spleeter: var("KARAOKE_SPLEETER", defaults.spleeter),
                whisper: var("KARAOKE_WHISPER", defaults.whisper),
                spleeter_model: var("KARAOKE_SPLEETER_MODEL", defaults.spleeter_model),
                whisper_model: var("KARAOKE_WHISPER_MODEL", defaults.whisper_model),
            },
        }
    }

    /// Validates the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.data_dir.as_os_str().is_empty() {
            return Err(ConfigError("data_dir cannot be empty".to_string()));
        }

        let tools = [
            ("yt_dlp", &self.tools.yt_dlp),
            ("ffmpeg", &self.tools.ffmpeg),
            ("spleeter", &self.tools.spleeter),
            ("whisper", &self.tools.whisper),
            ("spleeter_model", &self.tools.spleeter_model),
            ("whisper_model", &self.tools.whisper_model),
        ];
        for (name, value) in tools {
            if value.trim().is_empty() {
                return Err(ConfigError(format!("{} cannot be empty", name)));
            }
        }

        Ok(())
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self::new("./data")
    }
}
