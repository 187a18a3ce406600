use std::{io, path::PathBuf};

use thiserror::Error;

/// Failures while reading the location list or writing the report.
///
/// None of these are retried; the caller aborts the whole run.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("cannot access file {}: {source}", path.display())]
    FileAccess {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("malformed row at line {line}: {message}")]
    Parse { line: u64, message: String },

    /// A non-IO failure from the csv writer. Values that merely need quoting
    /// are quoted, so this only fires for shapes csv cannot encode.
    #[error("cannot serialize report row: {message}")]
    Serialization { message: String },
}

impl StorageError {
    pub(crate) fn file_access(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::FileAccess { path: path.into(), source }
    }

    pub(crate) fn parse(line: u64, message: impl Into<String>) -> Self {
        Self::Parse { line, message: message.into() }
    }
}
