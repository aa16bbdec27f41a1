//! Error taxonomy shared by every admin operation.
//!
//! Each variant belongs to exactly one [`ErrorKind`]; the kind is what the
//! HTTP and CLI front ends branch on, the variant carries the details.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use thiserror::Error;

/// Coarse failure category reported to callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorKind {
    InvalidInput,
    Conflict,
    NotFound,
    #[serde(rename = "IOError")]
    Io,
    UploadFailed,
    FetchFailed,
    ListFailed,
    #[serde(rename = "ArchiveError")]
    Archive,
}

impl ErrorKind {
    /// Name used on the wire and in CLI output.
    pub fn as_str(self) -> &'static str {
        match self {
            ErrorKind::InvalidInput => "InvalidInput",
            ErrorKind::Conflict => "Conflict",
            ErrorKind::NotFound => "NotFound",
            ErrorKind::Io => "IOError",
            ErrorKind::UploadFailed => "UploadFailed",
            ErrorKind::FetchFailed => "FetchFailed",
            ErrorKind::ListFailed => "ListFailed",
            ErrorKind::Archive => "ArchiveError",
        }
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Admin backend error types
#[derive(Error, Debug)]
pub enum AdminError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("{0} already exists")]
    Conflict(String),

    #[error("{0} not found")]
    NotFound(String),

    #[error("Failed to {action} {}: {source}", path.display())]
    Io {
        action: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Upload failed: {output}")]
    UploadFailed { output: String },

    #[error("Fetch failed: {output}")]
    FetchFailed { output: String },

    #[error("Listing backups failed: {output}")]
    ListFailed { output: String },

    #[error("Archive error: {0}")]
    Archive(String),
}

impl AdminError {
    pub fn io(action: &'static str, path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        AdminError::Io {
            action,
            path: path.into(),
            source,
        }
    }

    pub fn invalid(message: impl Into<String>) -> Self {
        AdminError::InvalidInput(message.into())
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            AdminError::InvalidInput(_) => ErrorKind::InvalidInput,
            AdminError::Conflict(_) => ErrorKind::Conflict,
            AdminError::NotFound(_) => ErrorKind::NotFound,
            AdminError::Io { .. } | AdminError::Parse { .. } => ErrorKind::Io,
            AdminError::UploadFailed { .. } => ErrorKind::UploadFailed,
            AdminError::FetchFailed { .. } => ErrorKind::FetchFailed,
            AdminError::ListFailed { .. } => ErrorKind::ListFailed,
            AdminError::Archive(_) => ErrorKind::Archive,
        }
    }
}

/// Result type alias for admin operations
pub type Result<T> = std::result::Result<T, AdminError>;
