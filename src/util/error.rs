//! Error types for the NWB reader.

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for reader operations.
#[derive(Error, Debug)]
pub enum Error {
    /// Opening or parsing a container file failed at the format boundary.
    #[error("Error reading the NWB file {path}: {source}")]
    UnreadableContainer {
        path: PathBuf,
        #[source]
        source: Box<Error>,
    },

    /// Decimated channel length disagrees with the decimated time axis.
    #[error("Length of time series ({values}) is different from timestamps ({timestamps})")]
    LengthMismatch { values: usize, timestamps: usize },

    /// Node was expected to be an image series
    #[error("Not an image series: {0}")]
    NotAnImageStream(String),

    /// Node was expected to be a time series
    #[error("Not a time series: {0}")]
    NotASignalStream(String),

    /// File does not exist or cannot be accessed
    #[error("File not found: {0}")]
    FileNotFound(PathBuf),

    /// Invalid data structure in file
    #[error("Invalid file structure: {0}")]
    InvalidStructure(String),

    /// Neither usable timestamps nor a positive rate
    #[error("Invalid time axis: {0}")]
    InvalidTimeAxis(String),

    /// A link names a node that does not exist (or is not built yet)
    #[error("Unresolved link: {0}")]
    UnresolvedLink(String),

    /// Type mismatch when reading data
    #[error("Type mismatch: expected {expected}, got {actual}")]
    TypeMismatch { expected: String, actual: String },

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Malformed JSON document
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Generic error with message
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Create an "other" error from a string.
    pub fn other(msg: impl Into<String>) -> Self {
        Self::Other(msg.into())
    }

    /// Create an invalid structure error.
    pub fn invalid(msg: impl Into<String>) -> Self {
        Self::InvalidStructure(msg.into())
    }

    /// Wrap a format-level failure as an unreadable container.
    pub fn unreadable(path: impl Into<PathBuf>, source: Error) -> Self {
        Self::UnreadableContainer {
            path: path.into(),
            source: Box::new(source),
        }
    }
}

/// Result type alias for reader operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    #[test]
    fn test_error_display() {
        let e = Error::LengthMismatch { values: 25, timestamps: 100 };
        assert!(e.to_string().contains("25"));
        assert!(e.to_string().contains("100"));

        let e = Error::NotAnImageStream("series_0".into());
        assert!(e.to_string().contains("series_0"));
    }

    #[test]
    fn test_unreadable_keeps_cause() {
        let e = Error::unreadable("missing.nwb.json", Error::FileNotFound("missing.nwb.json".into()));
        assert!(e.to_string().contains("missing.nwb.json"));
        let cause = e.source().expect("cause attached");
        assert!(cause.to_string().contains("File not found"));
    }

    #[test]
    fn test_error_from_io() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "test");
        let err: Error = io_err.into();
        assert!(matches!(err, Error::Io(_)));
    }
}
