//! Error types for relstore
//!
//! This module defines all error types used throughout the system.
//! We use `thiserror` for automatic `Display` and `Error` trait implementations.

use crate::type_desc::TypeDescriptor;
use crate::types::RowId;
use std::io;
use thiserror::Error;

/// Result type alias for relstore operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for the store
#[derive(Debug, Error)]
pub enum Error {
    /// Insert found an id that is already live
    ///
    /// Without `atomic_insert`, rows processed before the conflicting one
    /// stay inserted.
    #[error("Duplicate row id: {0}")]
    DuplicateIdentity(RowId),

    /// Lookup or delete of an id that is not in the domain
    #[error("Unknown row id: {0}")]
    UnknownIdentity(RowId),

    /// Mutation rejected by the storage backend (fixed-capacity or view relations)
    #[error("Unsupported mutation: {0}")]
    UnsupportedMutation(String),

    /// Label resolution exhausted its preference list
    #[error("No label-like representation was found")]
    NoLabelLikeColumn,

    /// No relation matches the requested type restriction
    #[error("No relation accepts type {0}")]
    NoSupportedDataType(TypeDescriptor),

    /// A value is not storable under a column's descriptor
    #[error("Type mismatch: expected {expected}, got {actual}")]
    TypeMismatch {
        /// Descriptor of the target column
        expected: TypeDescriptor,
        /// Kind of the offending value
        actual: &'static str,
    },

    /// Malformed input (ragged batch, bad argument)
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// A store listener failed; the mutation itself was committed
    #[error("Listener failed: {0}")]
    ListenerFailed(String),

    /// Configuration could not be read or parsed
    #[error("Configuration error: {0}")]
    Config(String),

    /// I/O error (config files)
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

impl Error {
    /// Shorthand for [`Error::InvalidInput`]
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Error::InvalidInput(message.into())
    }

    /// Shorthand for [`Error::UnsupportedMutation`]
    pub fn unsupported(message: impl Into<String>) -> Self {
        Error::UnsupportedMutation(message.into())
    }

    /// True for errors that leave earlier rows of an insert committed
    pub fn is_partial_commit(&self) -> bool {
        matches!(self, Error::DuplicateIdentity(_) | Error::ListenerFailed(_))
    }
}
