//! Error types for awcache core.

use awcache_codec::ErrorCategory;
use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Result type for core operations.
pub type CoreResult<T> = Result<T, CoreError>;

/// Errors that can occur in awcache core operations.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Storage backend error.
    #[error("storage error: {0}")]
    Storage(#[from] awcache_storage::StorageError),

    /// Value or schema error.
    #[error("codec error: {0}")]
    Codec(#[from] awcache_codec::CodecError),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The cache file's header or offset map is malformed.
    #[error("invalid cache file format: {message}")]
    InvalidFormat {
        /// Description of the format issue.
        message: String,
    },

    /// A year is not present in the catalog.
    #[error("year not found: {year}")]
    YearNotFound {
        /// The requested year.
        year: i32,
    },

    /// A month is not present in a year.
    #[error("month not found: {year}-{month:02}")]
    MonthNotFound {
        /// Year searched.
        year: i32,
        /// The requested month.
        month: u32,
    },

    /// A section has no entry in the file's offset map.
    #[error("section not found: {name}")]
    SectionNotFound {
        /// The requested section name.
        name: String,
    },

    /// A catalog directory does not exist or is not a directory.
    #[error("not a directory: {}", path.display())]
    DirectoryNotFound {
        /// The offending path.
        path: PathBuf,
    },

    /// An option, override or option combination is invalid.
    #[error("configuration error: {message}")]
    Configuration {
        /// Description of the problem.
        message: String,
    },

    /// An earlier indexing attempt on this file failed.
    #[error("cache file previously failed to index: {message}")]
    IndexFailed {
        /// The original failure, rendered.
        message: String,
        /// Category of the original failure.
        category: ErrorCategory,
    },
}

impl CoreError {
    /// Creates an invalid format error.
    pub fn invalid_format(message: impl Into<String>) -> Self {
        Self::InvalidFormat {
            message: message.into(),
        }
    }

    /// Creates a configuration error.
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// Creates a section not found error.
    pub fn section_not_found(name: impl Into<String>) -> Self {
        Self::SectionNotFound { name: name.into() }
    }

    /// Returns the broad category of this error.
    #[must_use]
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::Storage(awcache_storage::StorageError::Io(_)) | Self::Io(_) => ErrorCategory::Io,
            Self::Storage(_) | Self::InvalidFormat { .. } => ErrorCategory::Format,
            Self::Codec(err) => err.category(),
            Self::YearNotFound { .. }
            | Self::MonthNotFound { .. }
            | Self::SectionNotFound { .. } => ErrorCategory::NotFound,
            Self::DirectoryNotFound { .. } => ErrorCategory::Io,
            Self::Configuration { .. } => ErrorCategory::Configuration,
            Self::IndexFailed { category, .. } => *category,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn categories() {
        assert_eq!(
            CoreError::YearNotFound { year: 2009 }.category(),
            ErrorCategory::NotFound
        );
        assert_eq!(
            CoreError::invalid_format("bad").category(),
            ErrorCategory::Format
        );
        assert_eq!(
            CoreError::configuration("bad").category(),
            ErrorCategory::Configuration
        );
        assert_eq!(
            CoreError::from(io::Error::new(io::ErrorKind::NotFound, "x")).category(),
            ErrorCategory::Io
        );
        assert_eq!(
            CoreError::from(awcache_codec::CodecError::unknown_section("x")).category(),
            ErrorCategory::NotFound
        );
    }

    #[test]
    fn month_message_is_zero_padded() {
        let err = CoreError::MonthNotFound {
            year: 2009,
            month: 3,
        };
        assert_eq!(err.to_string(), "month not found: 2009-03");
    }
}
