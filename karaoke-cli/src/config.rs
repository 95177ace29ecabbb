//! Configuration module
//!
//! Handles CLI configuration: where the server lives and how often to poll it.

use std::time::Duration;

/// CLI configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// URL of the karaoke server
    pub server_url: String,
    /// Delay between status requests while waiting on a job
    pub poll_interval: Duration,
}
