//! Storage errors shared by every league store backend.

use std::{error::Error, path::PathBuf};
use thiserror::Error;

/// Result alias for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;

/// Error raised by storage backends regardless of where the document lives.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Reading or writing the backing file failed.
    #[error("storage i/o failed for `{path}`")]
    Io {
        /// File that could not be accessed.
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// The in-memory document could not be encoded.
    #[error("failed to encode league document")]
    Serialize {
        #[source]
        source: serde_json::Error,
    },
    /// The persisted document exists but cannot be decoded.
    #[error("league document at `{path}` is corrupted")]
    Corrupted {
        /// Location of the undecodable document.
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    /// The backend refused or could not be reached.
    #[error("storage unavailable: {message}")]
    Unavailable {
        /// What the backend was doing.
        message: String,
        #[source]
        source: Box<dyn Error + Send + Sync>,
    },
}

impl StorageError {
    /// Construct an unavailable error from any backend failure.
    pub fn unavailable(message: String, source: impl Error + Send + Sync + 'static) -> Self {
        StorageError::Unavailable {
            message,
            source: Box::new(source),
        }
    }

    /// Whether the error means the persisted data cannot be trusted at all.
    pub fn is_corruption(&self) -> bool {
        matches!(self, StorageError::Corrupted { .. })
    }
}
