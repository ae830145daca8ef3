//! Error types for the conversion pipeline

use std::path::PathBuf;
use thiserror::Error;

/// Pipeline error
///
/// Every variant here is fatal for a run. Layout problems (failed moves,
/// failed dedup writes, failed directory removals) never surface as errors,
/// they are logged and counted in the reports instead.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration not found: {path}")]
    ConfigNotFound { path: PathBuf },

    #[error("Failed to parse configuration {path}: {message}")]
    ConfigParse { path: PathBuf, message: String },

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Download failed for {url}: {message}")]
    FetchFailed { url: String, message: String },

    #[error("Conversion failed for {input}: {message}")]
    ConversionFailed { input: PathBuf, message: String },
}

impl CoreError {
    /// Create a fetch error for a URL
    pub fn fetch(url: impl Into<String>, message: impl ToString) -> Self {
        Self::FetchFailed {
            url: url.into(),
            message: message.to_string(),
        }
    }

    /// Create a conversion error for an input file
    pub fn conversion(input: impl Into<PathBuf>, message: impl ToString) -> Self {
        Self::ConversionFailed {
            input: input.into(),
            message: message.to_string(),
        }
    }
}

/// Result type for pipeline operations
pub type Result<T> = std::result::Result<T, CoreError>;
