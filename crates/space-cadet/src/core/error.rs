//! Core error types for class extraction and view-state reconciliation
//!
//! Extraction errors are recoverable at the reconciler boundary; store and
//! serialization errors are handed back to whoever asked for the write.

use std::path::PathBuf;

use thiserror::Error;

/// Result alias used throughout the crate
pub type Result<T, E = ExplorerError> = std::result::Result<T, E>;

/// Core error types for the class explorer
#[derive(Error, Debug)]
pub enum ExplorerError {
    #[error("No {file_name} found at or above {}", .start.display())]
    ConfigNotFound { start: PathBuf, file_name: String },

    #[error("Config error in {}: {message}", .path.display())]
    ConfigParse { path: PathBuf, message: String },

    #[error("Parse error in {}: {message}", .path.display())]
    ParseOrCompile { path: PathBuf, message: String },

    #[error("Failed to read source file {}: {source}", .path.display())]
    ReadSource {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid file pattern '{pattern}': {message}")]
    Pattern { pattern: String, message: String },

    #[error("No class entity matches path {path}")]
    ApplyMoveNoMatch { path: String },

    #[error("Invalid position ({x}, {y}): coordinates must be finite")]
    InvalidPosition { x: f64, y: f64 },

    #[error("Store error: {message}")]
    Store { message: String },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {source}")]
    Io {
        #[from]
        source: std::io::Error,
    },
}

impl ExplorerError {
    /// Create a new config-not-found error
    pub fn config_not_found(start: impl Into<PathBuf>, file_name: impl Into<String>) -> Self {
        Self::ConfigNotFound {
            start: start.into(),
            file_name: file_name.into(),
        }
    }

    /// Create a new config parse error
    pub fn config_parse(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::ConfigParse {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Create a new parse/compile error
    pub fn parse_or_compile(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::ParseOrCompile {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Create a new pattern error
    pub fn pattern(pattern: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Pattern {
            pattern: pattern.into(),
            message: message.into(),
        }
    }

    /// Create a new store error
    pub fn store_error(message: impl Into<String>) -> Self {
        Self::Store {
            message: message.into(),
        }
    }
}
