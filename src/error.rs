//! Error types for rule dispatch and record conversion.
//!
//! This module provides the [`MarcError`] type for all library operations
//! and the [`Result`] convenience type.

use thiserror::Error;

/// Error type for all library operations.
///
/// Represents configuration problems detected while building a rule index,
/// fatal conditions raised while dispatching a record, and failures of the
/// MARCXML/JSON loaders and dumpers.
#[derive(Error, Debug)]
pub enum MarcError {
    /// A rule pattern is not a valid regular expression.
    #[error("Invalid rule pattern '{pattern}': {source}")]
    InvalidPattern {
        /// The offending pattern as registered
        pattern: String,
        /// Underlying regex compilation error
        #[source]
        source: regex::Error,
    },

    /// Invalid dispatcher configuration.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// No rule matched a key while transforming in strict mode.
    #[error("No rule matched key '{0}'")]
    MissingRule(String),

    /// A rule's transform function failed and no handler was registered for
    /// the error's type.
    #[error("Transform failed for key '{key}': {source}")]
    Transform {
        /// Input key being transformed
        key: String,
        /// Error returned by the transform function
        #[source]
        source: anyhow::Error,
    },

    /// Error indicating an invalid or malformed record.
    #[error("Invalid record: {0}")]
    InvalidRecord(String),

    /// Error indicating an invalid field structure.
    #[error("Invalid field: {0}")]
    InvalidField(String),

    /// Error during parsing of MARCXML or JSON data.
    #[error("Parse error: {0}")]
    ParseError(String),

    /// IO error from the underlying source/destination.
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

/// Convenience type alias for [`std::result::Result`] with [`MarcError`].
pub type Result<T> = std::result::Result<T, MarcError>;
