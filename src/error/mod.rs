//! Error handling for the onboarding dashboard.

pub mod util;

use std::io;
use std::path::{Path, PathBuf};

use arrow::error::ArrowError;
use parquet::errors::ParquetError;

/// Specialized error type for loading, filtering and rendering the dashboard
#[derive(Debug, thiserror::Error)]
pub enum DashboardError {
    /// Error opening or reading a file
    #[error("IO error: {context} ({})", .path.display())]
    Io {
        /// What was being attempted
        context: String,
        /// The path involved
        path: PathBuf,
        /// Underlying IO error, if there was one
        #[source]
        source: Option<io::Error>,
    },

    /// Error processing Arrow data (CSV decoding, kernels, batch assembly)
    #[error("Arrow error: {0}")]
    Arrow(#[from] ArrowError),

    /// Error reading a Parquet export
    #[error("Parquet error: {0}")]
    Parquet(#[from] ParquetError),

    /// A column exists but has an unexpected shape
    #[error("Schema error: {0}")]
    Schema(String),

    /// A filter expression could not be evaluated
    #[error("Filter error: {0}")]
    Filter(String),

    /// Chart specification or API payload could not be serialized
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Invalid configuration value
    #[error("Configuration error: {0}")]
    Config(String),

    /// The HTTP server could not bind or stopped with an error
    #[error("Server error on {addr}: {source}")]
    Server {
        addr: String,
        #[source]
        source: io::Error,
    },
}

impl DashboardError {
    /// Create an IO error without an underlying source
    pub fn io(context: impl Into<String>, path: &Path) -> Self {
        Self::Io {
            context: context.into(),
            path: path.to_path_buf(),
            source: None,
        }
    }

    /// Create an IO error wrapping a source error
    pub fn io_with_source(context: impl Into<String>, path: &Path, source: io::Error) -> Self {
        Self::Io {
            context: context.into(),
            path: path.to_path_buf(),
            source: Some(source),
        }
    }

    /// Create a filter error
    pub fn filter(message: impl Into<String>) -> Self {
        Self::Filter(message.into())
    }

    /// Create a schema error
    pub fn schema(message: impl Into<String>) -> Self {
        Self::Schema(message.into())
    }
}

/// Result type for dashboard operations
pub type Result<T> = std::result::Result<T, DashboardError>;
