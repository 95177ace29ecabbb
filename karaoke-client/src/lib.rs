//! Karaoke HTTP Client
//!
//! A small, type-safe HTTP client for the karaoke server API.
//!
//! # Example
//!
//! ```no_run
//! use karaoke_client::KaraokeClient;
//! use std::path::Path;
//! use std::time::Duration;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let client = KaraokeClient::new("http://localhost:8000");
//!
//!     let job = client.create_job("https://www.youtube.com/watch?v=dQw4w9WgXcQ").await?;
//!     let job = client.wait_for_job(job.job_id, Duration::from_secs(2)).await?;
//!     client.download_output(job.job_id, Path::new("karaoke.mp4")).await?;
//!     Ok(())
//! }
//! ```

pub mod error;
mod jobs;

// Re-export commonly used types
pub use error::{ClientError, Result};
pub use karaoke_core::{JobSnapshot, JobStatus, StageName, StageSnapshot, StageStatus};

use reqwest::Client;
use serde::de::DeserializeOwned;

/// HTTP client for the karaoke server API
#[derive(Debug, Clone)]
pub struct KaraokeClient {
    /// Base URL of the server (e.g., "http://localhost:8000")
    base_url: String,
    /// HTTP client instance
    client: Client,
}

impl KaraokeClient {
    /// Create a new client
    ///
    /// # Example
    /// ```
    /// use karaoke_client::KaraokeClient;
    ///
    /// let client = KaraokeClient::new("http://localhost:8000");
    /// ```
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(base_url, Client::new())
    }

    /// Create a new client with a custom HTTP client
    ///
    /// This allows you to configure timeouts, proxies, TLS settings, etc.
    pub fn with_client(base_url: impl Into<String>, client: Client) -> Self {
        let base_url = base_url.into();
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
        }
    }

    /// Get the base URL of the server
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Fails with [`ClientError::ApiError`] on a non-success status
    async fn check_status(&self, response: reqwest::Response) -> Result<reqwest::Response> {
        let status = response.status();

        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(ClientError::api_error(status.as_u16(), error_text));
        }

        Ok(response)
    }

    /// Handle an API response and deserialize JSON
    async fn handle_response<T: DeserializeOwned>(&self, response: reqwest::Response) -> Result<T> {
        self.check_status(response)
            .await?
            .json()
            .await
            .map_err(|e| ClientError::ParseError(format!("Failed to parse JSON response: {}", e)))
    }
}
