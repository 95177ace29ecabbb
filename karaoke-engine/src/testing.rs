//! Scripted toolchain for unit tests
//!
//! Writes placeholder artifacts into the job's working directory, records
//! every call, and can be told to fail or panic at a given stage.

use karaoke_core::StageName;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use crate::toolchain::{ExtractedStreams, SeparatedStems, ToolError, ToolResult, Toolchain};

#[derive(Default)]
pub(crate) struct ScriptedToolchain {
    fail_at: Option<(StageName, String)>,
    panic_at: Option<StageName>,
    delay: Option<Duration>,
    calls: Mutex<Vec<String>>,
    active: AtomicUsize,
    max_active: AtomicUsize,
}

impl ScriptedToolchain {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing_at(mut self, stage: StageName, message: &str) -> Self {
        self.fail_at = Some((stage, message.to_string()));
        self
    }

    pub fn panicking_at(mut self, stage: StageName) -> Self {
        self.panic_at = Some(stage);
        self
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Calls as `"<stage>:<job dir name>"`, in order
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    /// Highest number of collaborator calls that overlapped
    pub fn max_concurrency(&self) -> usize {
        self.max_active.load(Ordering::SeqCst)
    }

    fn step(&self, stage: StageName, workdir: &Path) -> ToolResult<()> {
        let running = self.active.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_active.fetch_max(running, Ordering::SeqCst);

        let job_dir = workdir
            .file_name()
            .map(|name| name.to_string_lossy().to_string())
            .unwrap_or_default();
        self.calls
            .lock()
            .unwrap()
            .push(format!("{}:{}", stage, job_dir));

        if let Some(delay) = self.delay {
            std::thread::sleep(delay);
        }
        self.active.fetch_sub(1, Ordering::SeqCst);

        if self.panic_at == Some(stage) {
            panic!("scripted panic in {}", stage);
        }
        match &self.fail_at {
            Some((failing, message)) if *failing == stage => Err(ToolError::new(message.clone())),
            _ => Ok(()),
        }
    }

    fn touch(workdir: &Path, name: &str) -> PathBuf {
        let path = workdir.join(name);
        std::fs::write(&path, b"").unwrap();
        path
    }
}

impl Toolchain for ScriptedToolchain {
    fn download(&self, _url: &str, workdir: &Path) -> ToolResult<PathBuf> {
        self.step(StageName::Download, workdir)?;
        Ok(Self::touch(workdir, "source.mp4"))
    }

    fn extract(&self, _video: &Path, workdir: &Path) -> ToolResult<ExtractedStreams> {
        self.step(StageName::Extract, workdir)?;
        Ok(ExtractedStreams {
            audio: Self::touch(workdir, "audio.wav"),
            video: Self::touch(workdir, "video_silent.mp4"),
        })
    }

    fn separate(&self, _audio: &Path, workdir: &Path) -> ToolResult<SeparatedStems> {
        self.step(StageName::SeparateVocals, workdir)?;
        Ok(SeparatedStems {
            vocals: Self::touch(workdir, "vocals.wav"),
            accompaniment: Self::touch(workdir, "accompaniment.wav"),
        })
    }

    fn transcribe(&self, _audio: &Path, workdir: &Path) -> ToolResult<PathBuf> {
        self.step(StageName::Transcribe, workdir)?;
        let transcript = workdir.join("vocals.json");
        std::fs::write(
            &transcript,
            r#"{"segments": [{"start": 0, "end": 2.5, "text": " Hello world "}]}"#,
        )
        .unwrap();
        Ok(transcript)
    }

    fn merge(&self, _video: &Path, _audio: &Path, workdir: &Path) -> ToolResult<PathBuf> {
        self.step(StageName::Merge, workdir)?;
        Ok(Self::touch(workdir, "merged.mp4"))
    }

    fn overlay(&self, _video: &Path, _subtitles: &Path, workdir: &Path) -> ToolResult<PathBuf> {
        self.step(StageName::Overlay, workdir)?;
        Ok(Self::touch(workdir, "final.mp4"))
    }
}
