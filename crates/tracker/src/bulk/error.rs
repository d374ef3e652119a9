use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while gathering identifiers, before any operation runs.
#[derive(Debug, Error)]
pub enum BulkError {
    /// The bulk file does not exist.
    #[error("Bulk file not found: {}", path.display())]
    FileNotFound { path: PathBuf },

    /// Any other read failure, passed through as-is.
    #[error(transparent)]
    Io(#[from] io::Error),
}

impl BulkError {
    #[inline]
    pub fn file_not_found(path: impl Into<PathBuf>) -> Self {
        Self::FileNotFound { path: path.into() }
    }
}

/// Result type for identifier collection.
pub type Result<T> = std::result::Result<T, BulkError>;
