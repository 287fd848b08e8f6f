//! Domain-specific error types for braintrust-export

use thiserror::Error;

/// Main error type for the exporter. Every variant is fatal; the run
/// terminates on the first error it hits.
#[derive(Error, Debug)]
pub enum ExportError {
    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Invalid arguments: {message}")]
    InvalidArguments { message: String },

    #[error("Project not found: no project named '{name}'")]
    ProjectNotFound { name: String },

    #[error("HTTP failure: {message}")]
    Http { message: String },

    #[error("API response error: {message}")]
    Api { message: String },

    #[error("CSV error: {message}")]
    Csv { message: String },

    #[error("Filesystem error: {message}")]
    Io { message: String },
}

impl From<reqwest::Error> for ExportError {
    fn from(err: reqwest::Error) -> Self {
        ExportError::Http {
            message: format!("HTTP request failed: {}", err),
        }
    }
}

impl From<serde_json::Error> for ExportError {
    fn from(err: serde_json::Error) -> Self {
        ExportError::Api {
            message: err.to_string(),
        }
    }
}

impl From<csv::Error> for ExportError {
    fn from(err: csv::Error) -> Self {
        ExportError::Csv {
            message: err.to_string(),
        }
    }
}

impl From<std::io::Error> for ExportError {
    fn from(err: std::io::Error) -> Self {
        ExportError::Io {
            message: err.to_string(),
        }
    }
}

/// Result type alias for exporter operations
pub type Result<T> = std::result::Result<T, ExportError>;
