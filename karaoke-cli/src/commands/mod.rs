//! Commands module
//!
//! Defines all CLI commands and their handlers.

mod job;

use anyhow::Result;
use clap::Subcommand;
use std::path::PathBuf;

use crate::config::Config;

/// Top-level CLI commands
#[derive(Subcommand)]
pub enum Commands {
    /// Submit a video URL for processing
    Submit {
        /// URL of the video to turn into karaoke
        url: String,

        /// Wait for the job to finish, printing stage progress
        #[arg(short, long)]
        wait: bool,

        /// Download the result here once finished (implies --wait)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Show a job and its stages
    Status {
        /// Job ID or unambiguous prefix
        id: String,

        /// Print the raw JSON snapshot
        #[arg(long)]
        json: bool,
    },
    /// List all jobs
    List {
        /// Print the raw JSON snapshots
        #[arg(long)]
        json: bool,
    },
    /// Wait for a job to finish, printing stage progress
    Wait {
        /// Job ID or unambiguous prefix
        id: String,
    },
    /// Download the karaoke video of a completed job
    Download {
        /// Job ID or unambiguous prefix
        id: String,

        /// Destination file (default: karaoke-<id>.mp4)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

/// Handle a CLI command
pub async fn handle_command(command: Commands, config: &Config) -> Result<()> {
    match command {
        Commands::Submit { url, wait, output } => job::submit(config, &url, wait, output).await,
        Commands::Status { id, json } => job::status(config, &id, json).await,
        Commands::List { json } => job::list(config, json).await,
        Commands::Wait { id } => job::wait(config, &id).await,
        Commands::Download { id, output } => job::download(config, &id, output).await,
    }
}
