//! Error types for storage operations.

use std::io;
use thiserror::Error;

/// Result type for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;

/// Errors that can occur while reading a source.
#[derive(Debug, Error)]
pub enum StorageError {
    /// An I/O error occurred.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Attempted to seek beyond the end of the source.
    #[error("seek beyond end of source: offset {offset}, size {size}")]
    SeekPastEnd {
        /// The requested offset.
        offset: u64,
        /// The source size.
        size: u64,
    },
}
