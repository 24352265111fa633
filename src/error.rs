use std::path::PathBuf;

use thiserror::Error;

/// Failures while reading a pipeline configuration file.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("reading config {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("parsing config {}: {source}", .path.display())]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid colour '{value}' for {key}")]
    InvalidColor { key: String, value: String },
}
