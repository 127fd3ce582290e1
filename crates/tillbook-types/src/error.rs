//! Error types for parsing domain values

use thiserror::Error;

/// Errors raised when decoding domain values from their string forms
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TypesError {
    /// Unknown role name
    #[error("Unknown role: {0}")]
    InvalidRole(String),

    /// Unknown expense type
    #[error("Type must be either expense or payment")]
    InvalidExpenseType(String),

    /// Unknown entry kind
    #[error("Unknown entry kind: {0}")]
    InvalidEntryKind(String),
}
