//! Error taxonomy for the history store and clipboard access.
//!
//! Store and clipboard operations return `HistoryError`; the binary and the
//! interactive loop wrap it in `anyhow` context where the policy is "report
//! and exit".

use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum HistoryError {
    /// Creating, opening, reading or writing a file failed.
    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The persisted history is not valid JSON for our schema.
    #[error("Invalid history JSON at {}: {source}", path.display())]
    Decode {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// The platform clipboard could not be opened, read or written.
    #[error("Clipboard error: {0}")]
    Clipboard(String),
}

impl HistoryError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        HistoryError::Io {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn decode(path: impl Into<PathBuf>, source: serde_json::Error) -> Self {
        HistoryError::Decode {
            path: path.into(),
            source,
        }
    }
}

impl From<arboard::Error> for HistoryError {
    fn from(err: arboard::Error) -> Self {
        HistoryError::Clipboard(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, HistoryError>;
