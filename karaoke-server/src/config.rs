//! Server configuration

use std::path::PathBuf;

/// HTTP server settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub bind_addr: String,
    /// Directory served for any path not matched by the API
    pub static_dir: Option<PathBuf>,
}

impl ServerConfig {
    /// Reads KARAOKE_BIND_ADDR (default: 0.0.0.0:8000) and KARAOKE_STATIC_DIR
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let var = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        Self {
            bind_addr: var("KARAOKE_BIND_ADDR").unwrap_or_else(|| "0.0.0.0:8000".to_string()),
            static_dir: var("KARAOKE_STATIC_DIR").map(PathBuf::from),
        }
    }
}
