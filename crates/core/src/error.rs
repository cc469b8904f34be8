//! Error types for hit recording
//!
//! Every failure in the subsystem is a local contract violation. Nothing is
//! retried or logged here; errors surface synchronously to the caller, which
//! owns the run loop and decides whether to abort the run or skip the event.

use crate::value::AttributeKind;
use thiserror::Error;

/// All hit-recording errors
#[derive(Debug, Clone, PartialEq, Error)]
pub enum HitsError {
    /// Invalid setup detected at initialization
    #[error("configuration error: {reason}")]
    Configuration {
        /// What is wrong with the configuration
        reason: String,
    },

    /// Attribute name has no registry entry or is absent from a collection
    #[error("unknown attribute: {name}")]
    UnknownAttribute {
        /// The requested attribute name
        name: String,
    },

    /// Value kind does not match the column or paired column kind
    #[error("type mismatch on '{attribute}': expected {expected}, got {actual}")]
    TypeMismatch {
        /// Attribute (column) name
        attribute: String,
        /// Kind the column holds
        expected: AttributeKind,
        /// Kind that was offered or requested
        actual: AttributeKind,
    },

    /// The transport step could not yield a value for an attribute
    #[error("extraction failed for '{attribute}': {reason}")]
    ExtractionFailure {
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
}

/// Result type for hit-recording operations
pub type HitsResult<T> = std::result::Result<T, HitsError>;

impl HitsError {
    /// Build a configuration error
    pub fn configuration(reason: impl Into<String>) -> Self {
        HitsError::Configuration {
            reason: reason.into(),
        }
    }

    /// Build an unknown-attribute error
    pub fn unknown_attribute(name: impl Into<String>) -> Self {
        HitsError::UnknownAttribute { name: name.into() }
    }

    /// Build an extraction failure
    pub fn extraction(attribute: impl Into<String>, reason: impl Into<String>) -> Self {
        HitsError::ExtractionFailure {
            attribute: attribute.into(),
            reason: reason.into(),
        }
    }

    /// Canonical error code, stable across releases
    pub fn code(&self) -> &'static str {
        match self {
            HitsError::Configuration { .. } => "ConfigurationError",
            HitsError::UnknownAttribute { .. } => "UnknownAttribute",
            HitsError::TypeMismatch { .. } => "TypeMismatch",
            HitsError::ExtractionFailure { .. } => "ExtractionFailure",
            HitsError::IndexOutOfRange { .. } => "IndexOutOfRange",
        }
    }
}
