//! Unified error types for hitrec.
//!
//! This module provides a clean error type that wraps the recording
//! subsystem's errors together with configuration loading failures.

use hitrec_core::HitsError;
use thiserror::Error;

/// All hitrec errors.
#[derive(Debug, Error)]
pub enum Error {
    /// Invalid setup (attribute lists, filters, collection wiring)
    #[error("configuration error: {0}")]
    Configuration(String),

    /// Attribute not registered, or not present in a collection
    #[error("unknown attribute: {0}")]
    UnknownAttribute(String),

    /// Value kind does not match the column kind
    #[error("type mismatch on '{attribute}': expected {expected}, got {actual}")]
    TypeMismatch {
        /// Attribute (column) name
        attribute: String,
        /// Kind the column holds
        expected: String,
        /// Kind that was offered or requested
        actual: String,
    },

    /// The transport step could not supply an attribute value
    #[error("extraction failed for '{attribute}': {reason}")]
    Extraction {
        /// Attribute being extracted
        attribute: String,
        /// Why no value was available
        reason: String,
    },

    /// Row index beyond the current row count
    #[error("row index {index} out of range (row count {len})")]
    IndexOutOfRange {
        /// Requested row
        index: usize,
        /// Current row count
        len: usize,
    },

    /// No collection with this name is configured
    #[error("collection not found: {0}")]
    CollectionNotFound(String),

    /// Configuration file could not be parsed
    #[error("config parse error: {0}")]
    ConfigParse(String),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for hitrec operations.
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Check if this is a configuration error (including parse failures).
    pub fn is_configuration(&self) -> bool {
        matches!(self, Error::Configuration(_) | Error::ConfigParse(_))
    }

    /// Check if this is an unknown-attribute error.
    pub fn is_unknown_attribute(&self) -> bool {
        matches!(self, Error::UnknownAttribute(_))
    }

    /// Check if this is a type mismatch.
    pub fn is_type_mismatch(&self) -> bool {
        matches!(self, Error::TypeMismatch { .. })
    }

    /// Check if the failure only concerns the current row.
    ///
    /// The run loop may skip the event and continue after these.
    pub fn is_row_local(&self) -> bool {
        matches!(self, Error::Extraction { .. })
    }
}

// Convert from recording subsystem errors
impl From<HitsError> for Error {
    fn from(e: HitsError) -> Self {
        match e {
            HitsError::Configuration { reason } => Error::Configuration(reason),
            HitsError::UnknownAttribute { name } => Error::UnknownAttribute(name),
            HitsError::TypeMismatch {
                attribute,
                expected,
                actual,
            } => Error::TypeMismatch {
                attribute,
                expected: expected.to_string(),
                actual: actual.to_string(),
            },
            HitsError::ExtractionFailure { attribute, reason } => {
                Error::Extraction { attribute, reason }
            }
            HitsError::IndexOutOfRange { index, len } => Error::IndexOutOfRange { index, len },
        }
    }
}

// Convert from TOML parse errors
impl From<toml::de::Error> for Error {
    fn from(e: toml::de::Error) -> Self {
        Error::ConfigParse(e.to_string())
    }
}
