//! Error types for the history tail.

use thiserror::Error;

/// The main error type for history tail operations.
#[derive(Error, Debug)]
pub enum Error {
    /// The session could not be established for `path`.
    #[error("Cannot open {path}: {source}")]
    Open {
        path: String,
        #[source]
        source: Box<Error>,
    },

    /// I/O errors when reading the file.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// File watching errors from the notify crate.
    #[error("File watcher error: {0}")]
    Watcher(#[from] notify::Error),

    /// The configuration blob is not valid JSON for the expected shape.
    #[error("Invalid configuration: {0}")]
    Config(#[from] serde_json::Error),

    /// File path errors.
    #[error("Invalid file path: {message}")]
    InvalidPath { message: String },

    /// File has been removed or is no longer accessible.
    #[error("File no longer exists: {path}")]
    FileNotFound { path: String },

    /// File shrank below the read cursor. Rotation is not followed.
    #[error("File truncated: {path} is {size} bytes, cursor was at {position}")]
    Truncated {
        path: String,
        position: u64,
        size: u64,
    },

    /// Extraction was requested for a field this source does not declare.
    #[error("Unsupported field: {field}")]
    UnsupportedField { field: String },

    /// The session has been closed or already reported its terminal error.
    #[error("Session closed")]
    SessionClosed,
}

impl Error {
    pub(crate) fn open(path: impl Into<String>, source: Error) -> Self {
        Error::Open {
            path: path.into(),
            source: Box::new(source),
        }
    }
}

/// A convenient Result type for history tail operations.
pub type Result<T> = std::result::Result<T, Error>;
