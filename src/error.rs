//! Error types for the folio library.

use std::io;
use thiserror::Error;

use crate::reorder::Direction;

/// Result type alias for folio operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error types that can occur while editing, structuring or paginating a document.
#[derive(Error, Debug)]
pub enum Error {
    /// I/O error when reading or writing files.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// A position or range does not address the document correctly.
    ///
    /// Raised for inverted ranges, positions past the end of the document and
    /// positions that do not fall where the operation requires them to.
    #[error("Invalid range: {0}")]
    Range(String),

    /// An outline index cannot be used for the requested move.
    #[error("Outline entry {index} cannot move {direction} (outline has {len} entries)")]
    Index {
        /// Requested outline index
        index: usize,
        /// Number of outline entries at the time of the request
        len: usize,
        /// Requested move direction
        direction: Direction,
    },

    /// The height measurement capability could not measure a block.
    #[error("Height measurement unavailable: {0}")]
    MeasurementUnavailable(String),

    /// A call to an external collaborator (assist service, exporter) failed.
    #[error("External service error: {0}")]
    ExternalService(String),

    /// Error parsing HTML content.
    #[error("HTML parsing error: {0}")]
    Parse(String),

    /// Error during rendering (HTML, text, JSON).
    #[error("Rendering error: {0}")]
    Render(String),

    /// No template with the given name exists.
    #[error("Template not found: {0}")]
    TemplateNotFound(String),

    /// Generic error with message.
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Check if this error is a structural contract violation
    /// (range or index error).
    pub fn is_structural(&self) -> bool {
        matches!(self, Error::Range(_) | Error::Index { .. })
    }

    /// Check if this error is recoverable at the UI boundary.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Error::ExternalService(_) | Error::MeasurementUnavailable(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::Range("5..3 is inverted".to_string());
        assert_eq!(err.to_string(), "Invalid range: 5..3 is inverted");

        let err = Error::Index {
            index: 0,
            len: 4,
            direction: Direction::Up,
        };
        assert_eq!(
            err.to_string(),
            "Outline entry 0 cannot move up (outline has 4 entries)"
        );
    }

    #[test]
    fn test_error_classification() {
        assert!(Error::Range("x".into()).is_structural());
        assert!(!Error::Range("x".into()).is_recoverable());
        assert!(Error::ExternalService("timeout".into()).is_recoverable());
        assert!(!Error::Parse("bad".into()).is_structural());
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = io::Error::new(io::ErrorKind::NotFound, "file not found");
        let err: Error = io_err.into();
        assert!(matches!(err, Error::Io(_)));
    }
}
