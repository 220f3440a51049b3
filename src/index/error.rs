//! Index error types
//!
//! Defines all errors that can occur in the checkpoint index layer.

use thiserror::Error;

/// Errors that can occur while building or querying a checkpoint index
#[derive(Error, Debug)]
pub enum IndexError {
    /// I/O operation failed
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Data corruption detected (undecodable node, header, or location)
    #[error("Corrupt index: {0}")]
    Corrupt(String),

    /// Insert attempted after the index was completed and frozen
    #[error("Index is complete; no further inserts are allowed")]
    IndexFrozen,
}

/// Result type alias for index operations
pub type IndexResult<T> = Result<T, IndexError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = IndexError::Corrupt("bad node at offset 44".to_string());
        assert_eq!(err.to_string(), "Corrupt index: bad node at offset 44");

        let err = IndexError::IndexFrozen;
        assert_eq!(
            err.to_string(),
            "Index is complete; no further inserts are allowed"
        );
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let index_err: IndexError = io_err.into();
        assert!(matches!(index_err, IndexError::Io(_)));
    }
}
