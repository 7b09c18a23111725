//! Error types for the jevents crate.

use std::collections::TryReserveError;
use std::path::PathBuf;

/// `errno` value reported for unreadable or malformed event files.
pub const EIO: i32 = 5;

/// `errno` value reported when a string buffer cannot grow.
pub const ENOMEM: i32 = 12;

/// Errors that can occur while reading an event list.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Failed to read the event file from disk.
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    /// No file was given and no default location could be derived.
    #[error("no event file given and no default event file could be determined")]
    NoDefaultPath,

    /// The file is not valid JSON.
    #[error("{file}:{line}: {message}")]
    Syntax {
        file: String,
        line: usize,
        message: String,
    },

    /// The JSON is well formed but not shaped like an event list.
    #[error("{file}:{line}: {message}, got {got}")]
    Structure {
        file: String,
        line: usize,
        message: &'static str,
        got: &'static str,
    },

    /// An event object had no name or no encodable field.
    ///
    /// This aborts the remaining walk, not only the offending object.
    #[error("{file}: event #{index} has no name or no encodable fields")]
    IncompleteRecord { file: String, index: usize },

    /// The sink returned a non-zero status.
    #[error("event consumer aborted with status {0}")]
    SinkAbort(i32),

    /// A string buffer could not be grown.
    #[error("out of memory: {0}")]
    OutOfMemory(#[from] TryReserveError),

    /// The CPU could not be identified.
    #[error("cannot identify cpu: {0}")]
    Cpu(String),

    /// Failed to write a downloaded event file.
    #[error("failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Network error during event list download.
    #[cfg(feature = "download")]
    #[error("download failed: {0}")]
    Download(String),
}

impl Error {
    /// Status code compatible with the C-style `json_events` contract.
    ///
    /// Sink aborts pass the sink's own code through; everything else maps
    /// to a negative `errno`.
    pub fn status(&self) -> i32 {
        match self {
            Error::SinkAbort(code) => *code,
            Error::OutOfMemory(_) => -ENOMEM,
            _ => -EIO,
        }
    }
}

/// Convenience alias for `Result<T, Error>`.
pub type Result<T> = std::result::Result<T, Error>;

/// Collapse a result into a status code: `0` on success.
pub fn status_of<T>(result: &Result<T>) -> i32 {
    match result {
        Ok(_) => 0,
        Err(e) => e.status(),
    }
}
