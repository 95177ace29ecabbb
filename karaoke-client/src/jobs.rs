//! Job-related API endpoints

use crate::KaraokeClient;
use crate::error::{ClientError, Result};
use karaoke_core::{CreateJob, JobSnapshot};
use std::path::Path;
use std::time::Duration;
use tokio::io::AsyncWriteExt;
use uuid::Uuid;

impl KaraokeClient {
    /// Submit a video URL for processing
    ///
    /// Returns the newly created job; processing happens in the background.
    pub async fn create_job(&self, video_url: &str) -> Result<JobSnapshot> {
        let url = format!("{}/api/jobs", self.base_url);
        let response = self
            .client
            .post(&url)
            .json(&CreateJob::new(video_url))
            .send()
            .await?;

        self.handle_response(response).await
    }

    /// Get a job by ID
    pub async fn get_job(&self, job_id: Uuid) -> Result<JobSnapshot> {
        let url = format!("{}/api/jobs/{}", self.base_url, job_id);
        let response = self.client.get(&url).send().await?;

        self.handle_response(response).await
    }

    /// List all jobs, oldest first
    pub async fn list_jobs(&self) -> Result<Vec<JobSnapshot>> {
        let url = format!("{}/api/jobs", self.base_url);
        let response = self.client.get(&url).send().await?;

        self.handle_response(response).await
    }

    /// Download the final video of a completed job to `dest`
    ///
    /// Returns the number of bytes written.
    pub async fn download_output(&self, job_id: Uuid, dest: &Path) -> Result<u64> {
        let url = format!("{}/api/jobs/{}/download", self.base_url, job_id);
        let response = self.client.get(&url).send().await?;
        let mut response = self.check_status(response).await?;

        let io_error = |source| ClientError::Io {
            path: dest.display().to_string(),
            source,
        };
        let mut file = tokio::fs::File::create(dest).await.map_err(io_error)?;

        let mut written = 0u64;
        while let Some(chunk) = response.chunk().await? {
            file.write_all(&chunk).await.map_err(io_error)?;
            written += chunk.len() as u64;
        }
        file.flush().await.map_err(io_error)?;

        tracing::debug!("Downloaded {} bytes to {}", written, dest.display());
        Ok(written)
    }

    /// Poll a job until it completes or fails
    pub async fn wait_for_job(&self, job_id: Uuid, interval: Duration) -> Result<JobSnapshot> {
        self.wait_for_job_with(job_id, interval, |_| {}).await
    }

    /// Like [`KaraokeClient::wait_for_job`], calling `on_update` with every
    /// snapshot fetched, including the final one
    pub async fn wait_for_job_with(
        &self,
        job_id: Uuid,
        interval: Duration,
        mut on_update: impl FnMut(&JobSnapshot),
    ) -> Result<JobSnapshot> {
        loop {
            let job = self.get_job(job_id).await?;
            on_update(&job);

            if job.status.is_terminal() {
                return Ok(job);
            }

            tracing::trace!("Job {} is {:?}, polling again", job_id, job.status);
            tokio::time::sleep(interval).await;
        }
    }
}
