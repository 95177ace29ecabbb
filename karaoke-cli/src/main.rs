//! Karaoke CLI
//!
//! Command-line interface for submitting videos to a karaoke server and
//! collecting the results.

mod commands;
mod config;
mod id_resolver;
mod types;

use anyhow::Result;
use clap::Parser;
use commands::{Commands, handle_command};
use config::Config;
use std::time::Duration;

#[derive(Parser)]
#[command(name = "karaoke")]
#[command(about = "Turn music videos into karaoke videos", long_about = None)]
struct Cli {
    /// Karaoke server URL
    #[arg(long, env = "KARAOKE_SERVER_URL", default_value = "http://localhost:8000")]
    server_url: String,

    /// Seconds between status polls when waiting on a job
    #[arg(long, default_value_t = 2)]
    poll_interval: u64,

    #[command(subcommand)]
    command: Commands,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = Config {
        server_url: cli.server_url,
        poll_interval: Duration::from_secs(cli.poll_interval.max(1)),
    };

    handle_command(cli.command, &config).await
}
