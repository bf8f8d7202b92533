//! Error types for the codec crate.

use std::fmt;
use thiserror::Error;

/// Result type for codec operations.
pub type CodecResult<T> = Result<T, CodecError>;

/// Broad classification of an error.
///
/// Callers that only need to know *what kind* of failure occurred (missing
/// data versus bad input versus a broken schema) match on this instead of
/// on individual variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    /// A requested year, month, section or row does not exist.
    NotFound,
    /// Input text is malformed.
    Format,
    /// The schema table, a merge rule or an option combination is invalid.
    Configuration,
    /// A file or directory could not be read or written.
    Io,
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::NotFound => "not found",
            Self::Format => "format error",
            Self::Configuration => "configuration error",
            Self::Io => "I/O error",
        };
        f.write_str(name)
    }
}

/// Errors that can occur while decoding, encoding or merging values.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CodecError {
    /// A date/time token has the wrong length or is not a calendar value.
    #[error("invalid date/time token: '{token}'")]
    InvalidTimestamp {
        /// The offending token.
        token: String,
    },

    /// An integer field holds a non-numeric or out-of-range token.
    #[error("invalid integer token: '{token}'")]
    InvalidInteger {
        /// The offending token.
        token: String,
    },

    /// A row has too few tokens for a non-optional field.
    #[error("section '{section}', row '{row}': missing required field '{field}'")]
    MissingField {
        /// Section name.
        section: String,
        /// Row key.
        row: String,
        /// Name of the first missing field.
        field: String,
    },

    /// No schema exists for a section name.
    #[error("section '{name}' does not exist")]
    UnknownSection {
        /// The requested section name.
        name: String,
    },

    /// A row key is not present in a section.
    #[error("section '{section}' has no row '{row}'")]
    RowNotFound {
        /// Section name.
        section: String,
        /// The requested row key.
        row: String,
    },

    /// A merge rule string is not recognized.
    #[error("unrecognized merge rule: '{rule}'")]
    UnknownMergeRule {
        /// The rule text.
        rule: String,
    },

    /// The schema table has no entry for a field.
    #[error("no merge rule for section '{section}', row '{row}', field '{field}'")]
    UnmappedField {
        /// Section name.
        section: String,
        /// Row key.
        row: String,
        /// Field name.
        field: String,
    },

    /// The schema table violates one of its structural rules.
    #[error("invalid schema: {message}")]
    InvalidSchema {
        /// Description of the violation.
        message: String,
    },

    /// Two values of different kinds were combined.
    #[error("field '{field}': cannot combine {left} with {right}")]
    IncompatibleValues {
        /// Field name.
        field: String,
        /// Kind of the left operand.
        left: &'static str,
        /// Kind of the right operand.
        right: &'static str,
    },

    /// A sum left the range of the field's decoder.
    #[error("field '{field}': integer overflow")]
    Overflow {
        /// Field name.
        field: String,
    },

    /// An empty `replace:` literal targets a field every row must carry.
    #[error("field '{field}': empty replacement for a required field")]
    EmptyLiteral {
        /// Field name.
        field: String,
    },

    /// A row key that must be numeric is not.
    #[error("section '{section}': row key '{key}' is not an integer")]
    InvalidRowKey {
        /// Section name.
        section: String,
        /// The offending key.
        key: String,
    },
}

impl CodecError {
    /// Create an invalid timestamp error.
    pub fn invalid_timestamp(token: impl Into<String>) -> Self {
        Self::InvalidTimestamp {
            token: token.into(),
        }
    }

    /// Create an invalid integer error.
    pub fn invalid_integer(token: impl Into<String>) -> Self {
        Self::InvalidInteger {
            token: token.into(),
        }
    }

    /// Create an unknown section error.
    pub fn unknown_section(name: impl Into<String>) -> Self {
        Self::UnknownSection { name: name.into() }
    }

    /// Create an invalid schema error.
    pub fn invalid_schema(message: impl Into<String>) -> Self {
        Self::InvalidSchema {
            message: message.into(),
        }
    }

    /// Returns the broad category of this error.
    #[must_use]
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::UnknownSection { .. } | Self::RowNotFound { .. } => ErrorCategory::NotFound,
            Self::UnknownMergeRule { .. }
            | Self::UnmappedField { .. }
            | Self::InvalidSchema { .. }
            | Self::EmptyLiteral { .. } => ErrorCategory::Configuration,
            Self::InvalidTimestamp { .. }
            | Self::InvalidInteger { .. }
            | Self::MissingField { .. }
            | Self::IncompatibleValues { .. }
            | Self::Overflow { .. }
            | Self::InvalidRowKey { .. } => ErrorCategory::Format,
        }
    }
}
