//! Authentication error types
//!
//! Errors are safe for external exposure and convertible to HTTP status
//! codes. Internal details are only ever logged.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type alias for authentication operations
pub type AuthResult<T> = Result<T, AuthError>;

/// Authentication error types
#[derive(Debug, Clone, Error)]
pub enum AuthError {
    // =========================================================================
    // Token Errors
    // =========================================================================
    /// Token has expired
    #[error("Token has expired")]
    TokenExpired,

    /// Token is invalid (malformed, wrong signature, etc.)
    #[error("Invalid token")]
    InvalidToken,

    /// Token has been revoked by logout
    #[error("Token has been revoked")]
    TokenRevoked,

    // =========================================================================
    // Credential Errors
    // =========================================================================
    /// Unknown username or wrong password
    #[error("Invalid credentials")]
    InvalidCredentials,

    /// Current password given for a password change does not match
    #[error("Current password is incorrect")]
    IncorrectCurrentPassword,

    // =========================================================================
    // Password Errors
    // =========================================================================
    /// Password does not meet requirements
    #[error("{0}")]
    WeakPassword(String),

    /// Stored hash could not be parsed
    #[error("Password verification failed")]
    PasswordVerificationFailed,

    /// Password hashing failed
    #[error("Password hashing failed")]
    PasswordHashingFailed,

    // =========================================================================
    // Session Errors
    // =========================================================================
    /// No session presented
    #[error("Unauthorized")]
    Unauthenticated,

    /// Session refers to an account that no longer exists
    #[error("User not found")]
    UserNotFound,

    // =========================================================================
    // Internal Errors
    // =========================================================================
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Internal error (should not be exposed to clients)
    #[error("Internal error")]
    Internal(String),
}

impl AuthError {
    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> u16 {
        match self {
            // 400 Bad Request
            Self::WeakPassword(_) | Self::IncorrectCurrentPassword => 400,

            // 401 Unauthorized
            Self::TokenExpired
            | Self::InvalidToken
            | Self::TokenRevoked
            | Self::InvalidCredentials
            | Self::PasswordVerificationFailed
            | Self::Unauthenticated
            | Self::UserNotFound => 401,

            // 500 Internal Server Error
            Self::PasswordHashingFailed | Self::Config(_) | Self::Internal(_) => 500,
        }
    }

    /// Get an error code for the client (safe to expose)
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::TokenExpired => "TOKEN_EXPIRED",
            Self::InvalidToken => "INVALID_TOKEN",
            Self::TokenRevoked => "TOKEN_REVOKED",
            Self::InvalidCredentials => "INVALID_CREDENTIALS",
            Self::IncorrectCurrentPassword => "INCORRECT_PASSWORD",
            Self::WeakPassword(_) => "WEAK_PASSWORD",
            Self::PasswordVerificationFailed => "INVALID_CREDENTIALS",
            Self::PasswordHashingFailed => "INTERNAL_ERROR",
            Self::Unauthenticated => "UNAUTHENTICATED",
            Self::UserNotFound => "UNAUTHENTICATED",
            Self::Config(_) => "INTERNAL_ERROR",
            Self::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// Check if this error should be logged at error level
    pub fn is_server_error(&self) -> bool {
        self.status_code() >= 500
    }

    /// Get safe message for client (doesn't leak internal details)
    pub fn client_message(&self) -> String {
        match self {
            Self::Internal(_) | Self::Config(_) | Self::PasswordHashingFailed => {
                "An internal error occurred".to_string()
            }
            _ => self.to_string(),
        }
    }
}

/// Error body for API clients
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Error message (human-readable)
    pub error: String,
    /// Error code (machine-readable)
    pub code: String,
}

impl From<&AuthError> for ErrorResponse {
    fn from(error: &AuthError) -> Self {
        Self {
            error: error.client_message(),
            code: error.error_code().to_string(),
        }
    }
}

impl From<jsonwebtoken::errors::Error> for AuthError {
    fn from(err: jsonwebtoken::errors::Error) -> Self {
        use jsonwebtoken::errors::ErrorKind;
        match err.kind() {
            ErrorKind::ExpiredSignature => Self::TokenExpired,
            _ => Self::InvalidToken,
        }
    }
}

impl From<argon2::password_hash::Error> for AuthError {
    fn from(_: argon2::password_hash::Error) -> Self {
        Self::PasswordVerificationFailed
    }
}
