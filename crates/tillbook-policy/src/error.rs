//! Policy rejection types
//!
//! A rejection is a definite, user-facing outcome, never a server fault.
//! Its `Display` text is the message clients show verbatim.

use thiserror::Error;

use crate::window::DateWindow;

/// Result type alias for policy checks
pub type PolicyResult<T> = Result<T, PolicyRejection>;

/// Why a request was turned down
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PolicyRejection {
    /// No verified principal
    #[error("Unauthorized")]
    Unauthenticated,

    /// Authenticated but not permitted
    #[error("{reason}")]
    Forbidden { reason: String },

    /// Record date outside the allowed window
    #[error("{reason}")]
    OutOfWindow { reason: String, window: DateWindow },

    /// Date string could not be read as a calendar day
    #[error("Invalid date: {raw}")]
    MalformedDate { raw: String },

    /// Store still referenced by entries
    #[error("Cannot delete store with associated income entries or expenses")]
    DependentRecords { income: u64, expense: u64 },
}

/// Rejection taxonomy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RejectionKind {
    Authentication,
    Authorization,
    Validation,
    ReferentialIntegrity,
}

impl RejectionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Authentication => "authentication",
            Self::Authorization => "authorization",
            Self::Validation => "validation",
            Self::ReferentialIntegrity => "referential_integrity",
        }
    }
}

impl PolicyRejection {
    pub fn kind(&self) -> RejectionKind {
        match self {
            Self::Unauthenticated => RejectionKind::Authentication,
            Self::Forbidden { .. } => RejectionKind::Authorization,
            Self::OutOfWindow { .. } | Self::MalformedDate { .. } => RejectionKind::Validation,
            Self::DependentRecords { .. } => RejectionKind::ReferentialIntegrity,
        }
    }
}
