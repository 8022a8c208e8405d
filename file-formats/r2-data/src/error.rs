//! Error handling for R2 asset decoding

use std::io;
use thiserror::Error;

/// Errors that can occur while decoding an RMB/RAB stream or a model
/// manifest.
///
/// A failure is always scoped to the file being decoded: batch drivers
/// report the offending file and carry on with its siblings. Reserved
/// and unknown fields are never validated, so unexpected values there
/// do not produce errors.
#[derive(Debug, Error)]
pub enum DecodeError {
    /// The underlying stream could not be read or ended before a
    /// requested field was complete
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// A structurally required field is inconsistent (negative count,
    /// malformed filename, missing manifest element)
    #[error("Format error: {0}")]
    Format(String),

    /// A decoded field references an entity that does not exist
    #[error("Reference error: {0}")]
    Reference(String),
}

/// Type alias for Results from R2 decode operations
pub type Result<T> = std::result::Result<T, DecodeError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let error = DecodeError::Format("negative bone count: -3".to_string());
        assert_eq!(format!("{error}"), "Format error: negative bone count: -3");

        let error = DecodeError::Reference("texture index 5 out of range".to_string());
        assert_eq!(
            format!("{error}"),
            "Reference error: texture index 5 out of range"
        );
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = io::Error::new(io::ErrorKind::UnexpectedEof, "truncated");
        let error: DecodeError = io_err.into();
        assert!(matches!(error, DecodeError::Io(_)));
    }
}
