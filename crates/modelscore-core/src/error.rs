//! Error types for ModelScore.
//!
//! Every upstream failure is mapped onto one `ScoreError` variant so the
//! record processor can decide, per category, whether to omit a tab and at
//! which level to log it.

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for the ModelScore library.
#[derive(Debug, Error)]
pub enum ScoreError {
    // Upstream resource errors
    #[error("{service} resource not found: {resource}")]
    NotFound { service: String, resource: String },

    #[error("{service} refused access to {resource} (HTTP {status})")]
    Unauthorized {
        service: String,
        resource: String,
        status: u16,
    },

    #[error("Rate limited by {service}, retry after {retry_after_secs:?} seconds")]
    RateLimited {
        service: String,
        retry_after_secs: Option<u64>,
    },

    #[error("{service} API returned HTTP {status} for {resource}")]
    Api {
        service: String,
        resource: String,
        status: u16,
    },

    #[error("{service} listing {resource} runs past {pages} pages")]
    Truncated {
        service: String,
        resource: String,
        pages: u32,
    },

    // Transport errors
    #[error("Network error: {message}")]
    Network {
        message: String,
        /// Optional cause description
        cause: Option<String>,
    },

    #[error("Request timeout: {message}")]
    Timeout { message: String },

    // Serialization errors
    #[error("JSON error: {message}")]
    Json {
        message: String,
        #[source]
        source: Option<serde_json::Error>,
    },

    // File system errors
    #[error("IO error at {path:?}: {message}")]
    Io {
        message: String,
        path: Option<PathBuf>,
        #[source]
        source: Option<std::io::Error>,
    },

    // Input errors
    #[error("Malformed input at line {line}: {message}")]
    MalformedInput { line: usize, message: String },

    #[error("No model entries found in {path:?}")]
    EmptyInput { path: PathBuf },

    // Report errors
    #[error("Report error: {message}")]
    Report {
        message: String,
        #[source]
        source: Option<rust_xlsxwriter::XlsxError>,
    },

    // Configuration errors
    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("{0}")]
    Other(String),
}

/// Result type alias for ModelScore operations.
pub type Result<T> = std::result::Result<T, ScoreError>;

/// Coarse failure taxonomy used for logging and run summaries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    NotFound,
    Unauthorized,
    RateLimited,
    Transport,
    MalformedInput,
    Internal,
}

impl From<std::io::Error> for ScoreError {
    fn from(err: std::io::Error) -> Self {
        ScoreError::Io {
            message: err.to_string(),
            path: None,
            source: Some(err),
        }
    }
}

impl From<serde_json::Error> for ScoreError {
    fn from(err: serde_json::Error) -> Self {
        ScoreError::Json {
            message: err.to_string(),
            source: Some(err),
        }
    }
}

impl From<reqwest::Error> for ScoreError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            ScoreError::Timeout {
                message: err.to_string(),
            }
        } else {
            ScoreError::Network {
                message: err.to_string(),
                cause: std::error::Error::source(&err).map(|s| s.to_string()),
            }
        }
    }
}

impl From<rust_xlsxwriter::XlsxError> for ScoreError {
    fn from(err: rust_xlsxwriter::XlsxError) -> Self {
        ScoreError::Report {
            message: err.to_string(),
            source: Some(err),
        }
    }
}

impl ScoreError {
    /// Create an IO error with path context.
    pub fn io_with_path(err: std::io::Error, path: impl Into<PathBuf>) -> Self {
        ScoreError::Io {
            message: err.to_string(),
            path: Some(path.into()),
            source: Some(err),
        }
    }

    /// Map this error onto the failure taxonomy.
    pub fn kind(&self) -> ErrorKind {
        match self {
            ScoreError::NotFound { .. } => ErrorKind::NotFound,
            ScoreError::Unauthorized { .. } => ErrorKind::Unauthorized,
            ScoreError::RateLimited { .. } => ErrorKind::RateLimited,
            ScoreError::Network { .. }
            | ScoreError::Timeout { .. }
            | ScoreError::Api { .. }
            | ScoreError::Truncated { .. }
            | ScoreError::Json { .. } => ErrorKind::Transport,
            ScoreError::MalformedInput { .. } | ScoreError::EmptyInput { .. } => {
                ErrorKind::MalformedInput
            }
            _ => ErrorKind::Internal,
        }
    }

    /// Whether the upstream signalled an exhausted request quota.
    pub fn is_rate_limited(&self) -> bool {
        matches!(self, ScoreError::RateLimited { .. })
    }
}
