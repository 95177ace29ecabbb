//! Job command handlers
//!
//! Submitting videos, following their progress and fetching the finished
//! karaoke video.

use anyhow::{Context, Result, anyhow};
use colored::*;
use karaoke_client::KaraokeClient;
use karaoke_core::{JobSnapshot, JobStatus, StageSnapshot, StageStatus};
use std::path::PathBuf;
use std::time::Duration;
use uuid::Uuid;

use crate::config::Config;
use crate::id_resolver::resolve_job_id;
use crate::types::IdOrPrefix;

/// Submit a URL, optionally waiting for the result and downloading it
pub async fn submit(
    config: &Config,
    url: &str,
    wait: bool,
    output: Option<PathBuf>,
) -> Result<()> {
    let client = KaraokeClient::new(&config.server_url);

    let job = client
        .create_job(url)
        .await
        .context("Failed to submit job")?;
    println!(
        "{} Job {} created",
        "✓".green(),
        job.job_id.to_string().cyan()
    );

    if !wait && output.is_none() {
        println!(
            "{}",
            format!("  Follow it with: karaoke wait {}", job.job_id).dimmed()
        );
        return Ok(());
    }

    let job = follow(&client, job.job_id, config.poll_interval).await?;
    finish(&client, &job, output).await
}

/// Show a single job
pub async fn status(config: &Config, id: &str, json: bool) -> Result<()> {
    let client = KaraokeClient::new(&config.server_url);
    let job_id = resolve_job_id(&client, &IdOrPrefix::parse(id)).await?;

    let job = client.get_job(job_id).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&job)?);
    } else {
        print_job_details(&job);
    }

    Ok(())
}

/// List all jobs
pub async fn list(config: &Config, json: bool) -> Result<()> {
    let client = KaraokeClient::new(&config.server_url);
    let jobs = client.list_jobs().await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&jobs)?);
        return Ok(());
    }

    if jobs.is_empty() {
        println!("{}", "No jobs found.".yellow());
    } else {
        println!("{}", format!("Found {} job(s):", jobs.len()).bold());
        println!();
        for job in &jobs {
            print_job_summary(job);
        }
    }

    Ok(())
}

/// Block until a job finishes
pub async fn wait(config: &Config, id: &str) -> Result<()> {
    let client = KaraokeClient::new(&config.server_url);
    let job_id = resolve_job_id(&client, &IdOrPrefix::parse(id)).await?;

    let job = follow(&client, job_id, config.poll_interval).await?;
    finish(&client, &job, None).await
}

/// Save the finished video of a job
pub async fn download(config: &Config, id: &str, output: Option<PathBuf>) -> Result<()> {
    let client = KaraokeClient::new(&config.server_url);
    let job_id = resolve_job_id(&client, &IdOrPrefix::parse(id)).await?;

    save_output(&client, job_id, output).await
}

/// Poll until the job is terminal, printing each stage as it changes
async fn follow(client: &KaraokeClient, job_id: Uuid, interval: Duration) -> Result<JobSnapshot> {
    println!("{}", format!("Waiting for job {}...", job_id).dimmed());

    let mut reported: Vec<StageStatus> = Vec::new();
    let job = client
        .wait_for_job_with(job_id, interval, |job| {
            for (i, stage) in job.stages.iter().enumerate() {
                let changed = reported.get(i) != Some(&stage.status);
                if changed && stage.status != StageStatus::Pending {
                    print_stage_line(stage);
                }
            }
            reported = job.stages.iter().map(|stage| stage.status).collect();
        })
        .await
        .with_context(|| format!("Failed to follow job {}", job_id))?;

    Ok(job)
}

/// Report the outcome of a finished job; failures become an error exit
async fn finish(client: &KaraokeClient, job: &JobSnapshot, output: Option<PathBuf>) -> Result<()> {
    match job.status {
        JobStatus::Completed => {
            println!();
            println!("{} {}", "✓".green(), "Karaoke video ready".bold());
            match output {
                Some(path) => save_output(client, job.job_id, Some(path)).await,
                None => {
                    println!(
                        "{}",
                        format!("  Download it with: karaoke download {}", job.job_id).dimmed()
                    );
                    Ok(())
                }
            }
        }
        _ => {
            let stage = job
                .failed_stage()
                .map(|stage| stage.name.to_string())
                .unwrap_or_else(|| "unknown".to_string());
            let error = job.error.as_deref().unwrap_or("no error message");
            Err(anyhow!(
                "Job {} failed at stage '{}': {}",
                job.job_id,
                stage,
                error
            ))
        }
    }
}

async fn save_output(client: &KaraokeClient, job_id: Uuid, output: Option<PathBuf>) -> Result<()> {
    let dest = output.unwrap_or_else(|| default_output(job_id));

    let written = client
        .download_output(job_id, &dest)
        .await
        .with_context(|| format!("Failed to download output of job {}", job_id))?;

    println!(
        "{} Saved {} ({})",
        "✓".green(),
        dest.display().to_string().cyan(),
        format_size(written)
    );
    Ok(())
}

/// File name the server suggests for a job's video
fn default_output(job_id: Uuid) -> PathBuf {
    PathBuf::from(format!("karaoke-{}.mp4", job_id))
}

fn format_size(bytes: u64) -> String {
    const MIB: f64 = 1024.0 * 1024.0;
    if bytes as f64 >= MIB {
        format!("{:.1} MiB", bytes as f64 / MIB)
    } else {
        format!("{} bytes", bytes)
    }
}

/// Print a one-entry job summary
fn print_job_summary(job: &JobSnapshot) {
    println!("  {} Job {}", "▸".cyan(), job.job_id.to_string().dimmed());
    println!("    URL:      {}", job.url);
    println!("    Status:   {}", colorize_job_status(job.status));
    println!(
        "    Created:  {}",
        job.created_at
            .format("%Y-%m-%d %H:%M:%S")
            .to_string()
            .dimmed()
    );
    if let Some(stage) = job.failed_stage() {
        println!("    Failed:   {}", stage.name.to_string().red());
    }
    println!();
}

/// Print detailed job information with its stage table
fn print_job_details(job: &JobSnapshot) {
    println!("{}", "Job Details:".bold());
    println!("  ID:       {}", job.job_id.to_string().cyan());
    println!("  URL:      {}", job.url);
    println!("  Status:   {}", colorize_job_status(job.status));
    println!("  Created:  {}", job.created_at.format("%Y-%m-%d %H:%M:%S"));

    if let Some(output) = &job.output_file {
        println!("  Output:   {}", output);
    }

    if let Some(error) = &job.error {
        println!("\n{}", "Error:".bold());
        println!("{}", error.red());
    }

    println!("\n{}", "Stages:".bold());
    for stage in &job.stages {
        print_stage_line(stage);
    }
}

fn print_stage_line(stage: &StageSnapshot) {
    let duration = match (stage.started_at, stage.finished_at) {
        (Some(started), Some(finished)) => {
            let millis = finished.signed_duration_since(started).num_milliseconds();
            format!("{:.1}s", millis as f64 / 1000.0)
        }
        _ => String::new(),
    };

    println!(
        "  {} {} {} {}",
        format!("{:<16}", stage.name.to_string()).bold(),
        colorize_stage_status(stage.status),
        format!("{:>7}", duration).dimmed(),
        stage.message
    );
}

/// Colorize job status for display
fn colorize_job_status(status: JobStatus) -> ColoredString {
    let status_str = format!("{:?}", status);
    match status {
        JobStatus::Pending => status_str.yellow(),
        JobStatus::Running => status_str.cyan(),
        JobStatus::Completed => status_str.green(),
        JobStatus::Failed => status_str.red(),
    }
}

/// Colorize stage status, padded for the stage table
fn colorize_stage_status(status: StageStatus) -> ColoredString {
    let status_str = format!("{:<8}", format!("{:?}", status).to_lowercase());
    match status {
        StageStatus::Pending => status_str.dimmed(),
        StageStatus::Running => status_str.cyan(),
        StageStatus::Success => status_str.green(),
        StageStatus::Failed => status_str.red(),
    }
}
