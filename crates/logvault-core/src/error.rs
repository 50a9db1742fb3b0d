use crate::types::Level;
use std::io;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum LogVaultError {
    #[error("Invalid log level: {0}")]
    InvalidLevel(String),

    #[error("Malformed record: {reason}")]
    MalformedRecord { reason: String },

    #[error("Malformed record in {} at line {line}: {reason}", path.display())]
    MalformedPartition {
        path: PathBuf,
        line: usize,
        reason: String,
    },

    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid filter: {0}")]
    InvalidFilter(String),

    #[error("Record {field} must not be empty")]
    EmptyField { field: &'static str },

    #[error("Record ids exhausted for level {level}")]
    IdsExhausted { level: Level },

    #[error("Other error: {0}")]
    Other(#[from] anyhow::Error),
}

impl LogVaultError {
    pub fn malformed(reason: impl Into<String>) -> Self {
        LogVaultError::MalformedRecord {
            reason: reason.into(),
        }
    }

    /// True for codec failures, whether or not they carry a file location.
    pub fn is_malformed(&self) -> bool {
        matches!(
            self,
            LogVaultError::MalformedRecord { .. } | LogVaultError::MalformedPartition { .. }
        )
    }

    /// Attach the partition path and 1-based line number to a codec failure.
    ///
    /// Errors that are not codec failures pass through unchanged.
    pub fn in_partition(self, path: impl Into<PathBuf>, line: usize) -> Self {
        match self {
            LogVaultError::MalformedRecord { reason } => LogVaultError::MalformedPartition {
                path: path.into(),
                line,
                reason,
            },
            other => other,
        }
    }
}

pub type Result<T> = std::result::Result<T, LogVaultError>;
