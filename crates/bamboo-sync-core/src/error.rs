//! Error types for the Bamboo sync.
//!
//! Expected absences (no such user, crawl or WARC) are not errors; they are
//! reported through [`crate::network::Lookup`] or `Option`. Everything in
//! [`SyncError`] ends the current collection's pipeline.

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for the sync library.
#[derive(Debug, Error)]
pub enum SyncError {
    // Network errors
    #[error("Network error: {message}")]
    Network {
        message: String,
        #[source]
        source: Option<reqwest::Error>,
    },

    #[error("{service} returned {status} for {method} {url}")]
    Upstream {
        service: String,
        method: String,
        url: String,
        status: u16,
        /// Error body returned by the endpoint, parsed as JSON when possible.
        body: Option<serde_json::Value>,
    },

    #[error("Authentication failed: {message}")]
    Auth { message: String },

    // Key-value store errors
    #[error("Store error: {message}")]
    Store {
        message: String,
        #[source]
        source: Option<redis::RedisError>,
    },

    #[error("Malformed record {key}: {field}")]
    MalformedRecord { key: String, field: String },

    // File system errors
    #[error("IO error at {path:?}: {message}")]
    Io {
        message: String,
        path: Option<PathBuf>,
        #[source]
        source: Option<std::io::Error>,
    },

    // Serialization errors
    #[error("JSON error: {message}")]
    Json {
        message: String,
        #[source]
        source: Option<serde_json::Error>,
    },

    // Configuration errors
    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("{0}")]
    Other(String),
}

/// Result type alias for sync operations.
pub type Result<T> = std::result::Result<T, SyncError>;

impl From<std::io::Error> for SyncError {
    fn from(err: std::io::Error) -> Self {
        SyncError::Io {
            message: err.to_string(),
            path: None,
            source: Some(err),
        }
    }
}

impl From<serde_json::Error> for SyncError {
    fn from(err: serde_json::Error) -> Self {
        SyncError::Json {
            message: err.to_string(),
            source: Some(err),
        }
    }
}

impl From<reqwest::Error> for SyncError {
    fn from(err: reqwest::Error) -> Self {
        SyncError::Network {
            message: err.to_string(),
            source: Some(err),
        }
    }
}

impl From<redis::RedisError> for SyncError {
    fn from(err: redis::RedisError) -> Self {
        SyncError::Store {
            message: err.to_string(),
            source: Some(err),
        }
    }
}

impl SyncError {
    /// Create an IO error with path context.
    pub fn io_with_path(err: std::io::Error, path: impl Into<PathBuf>) -> Self {
        SyncError::Io {
            message: err.to_string(),
            path: Some(path.into()),
            source: Some(err),
        }
    }

    /// Structured body returned by a failing endpoint, if any.
    pub fn response_body(&self) -> Option<&serde_json::Value> {
        match self {
            SyncError::Upstream { body, .. } => body.as_ref(),
            _ => None,
        }
    }

    /// HTTP status of a failing upstream call.
    pub fn status(&self) -> Option<u16> {
        match self {
            SyncError::Upstream { status, .. } => Some(*status),
            _ => None,
        }
    }
}
