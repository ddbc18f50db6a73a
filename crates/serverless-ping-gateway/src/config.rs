//! Gateway configuration

use std::env;
use std::path::PathBuf;

/// Gateway configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Port the gateway listens on
    pub port: u16,

    /// Path to the functions manifest
    pub manifest_path: PathBuf,

    /// Optional stage prefix, e.g. `dev` serves `/dev/ping`
    pub stage: Option<String>,

    /// Maximum accepted request body in bytes
    pub body_limit_bytes: usize,
}

impl AppConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration through an arbitrary key lookup
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        Self {
            port: lookup("SERVERLESS_PING_PORT")
                .and_then(|s| s.parse().ok())
                .unwrap_or(3000),

            manifest_path: lookup("SERVERLESS_PING_MANIFEST")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("./functions.yaml")),

            stage: lookup("SERVERLESS_PING_STAGE")
                .map(|s| s.trim_matches('/').to_string())
                .filter(|s| !s.is_empty()),

            body_limit_bytes: lookup("SERVERLESS_PING_BODY_LIMIT")
                .and_then(|s| s.parse().ok())
                .unwrap_or(1024 * 1024),
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self::from_lookup(|_| None)
    }
}
