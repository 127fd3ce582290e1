//! API error handling
//!
//! Every failure leaves the API as `{"error": <message>, "code": <CODE>}`.
//! Policy rejections keep their user-facing reason as the message and are
//! mapped onto distinct statuses: authentication 401, authorization 403,
//! date validation 400, referential integrity 409.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;

use tillbook_auth::AuthError;
use tillbook_db::DbError;
use tillbook_policy::{PolicyRejection, RejectionKind};

pub use tillbook_auth::ErrorResponse;

/// API result type
pub type ApiResult<T> = Result<T, ApiError>;

/// API error
#[derive(Debug, Error)]
pub enum ApiError {
    // =========================================================================
    // Authentication
    // =========================================================================
    #[error("{0}")]
    Auth(AuthError),

    // =========================================================================
    // Policy
    // =========================================================================
    #[error("{0}")]
    Policy(PolicyRejection),

    // =========================================================================
    // Request Errors
    // =========================================================================
    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    Validation(String),

    // =========================================================================
    // Resource Errors
    // =========================================================================
    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Conflict(String),

    // =========================================================================
    // Internal Errors
    // =========================================================================
    #[error("Internal error: {0}")]
    Internal(String),
}

impl ApiError {
    /// Machine-readable error code
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Auth(err) => err.error_code(),
            Self::Policy(rejection) => match rejection {
                PolicyRejection::Unauthenticated => "UNAUTHENTICATED",
                PolicyRejection::Forbidden { .. } => "FORBIDDEN",
                PolicyRejection::OutOfWindow { .. } => "DATE_OUT_OF_WINDOW",
                PolicyRejection::MalformedDate { .. } => "INVALID_DATE",
                PolicyRejection::DependentRecords { .. } => "STORE_IN_USE",
            },
            Self::BadRequest(_) => "BAD_REQUEST",
            Self::Validation(_) => "VALIDATION_ERROR",
            Self::NotFound(_) => "NOT_FOUND",
            Self::Conflict(_) => "CONFLICT",
            Self::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// Get the HTTP status code
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::Auth(err) => StatusCode::from_u16(err.status_code())
                .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
            Self::Policy(rejection) => match rejection.kind() {
                RejectionKind::Authentication => StatusCode::UNAUTHORIZED,
                RejectionKind::Authorization => StatusCode::FORBIDDEN,
                RejectionKind::Validation => StatusCode::BAD_REQUEST,
                RejectionKind::ReferentialIntegrity => StatusCode::CONFLICT,
            },
            Self::BadRequest(_) | Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Conflict(_) => StatusCode::CONFLICT,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Message safe to show to clients
    pub fn client_message(&self) -> String {
        match self {
            Self::Auth(err) => err.client_message(),
            Self::Internal(_) => "Internal server error".to_string(),
            other => other.to_string(),
        }
    }
}

impl From<&ApiError> for ErrorResponse {
    fn from(err: &ApiError) -> Self {
        Self {
            error: err.client_message(),
            code: err.error_code().to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = ErrorResponse::from(&self);
        (status, Json(body)).into_response()
    }
}

// Implement From conversions
impl From<PolicyRejection> for ApiError {
    fn from(rejection: PolicyRejection) -> Self {
        let kind = rejection.kind();
        metrics::counter!("tillbook_policy_denials_total", "kind" => kind.as_str()).increment(1);
        tracing::warn!(kind = kind.as_str(), reason = %rejection, "Policy denied request");
        Self::Policy(rejection)
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        if err.is_server_error() {
            tracing::error!(error = ?err, "Authentication error");
        }
        Self::Auth(err)
    }
}

impl From<DbError> for ApiError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::NotFound(what) => Self::NotFound(format!("{} not found", what)),
            DbError::Duplicate(msg) | DbError::Constraint(msg) => Self::Conflict(msg),
            DbError::InvalidInput(msg) => Self::BadRequest(msg),
            other => {
                tracing::error!(error = ?other, "Database error");
                Self::Internal(other.to_string())
            }
        }
    }
}

impl From<validator::ValidationErrors> for ApiError {
    fn from(err: validator::ValidationErrors) -> Self {
        Self::Validation(format_validation_errors(&err))
    }
}

/// Collect field messages into one line, falling back to `field: invalid`
pub fn format_validation_errors(errors: &validator::ValidationErrors) -> String {
    let mut messages: Vec<String> = errors
        .field_errors()
        .iter()
        .flat_map(|(field, errs)| {
            errs.iter().map(move |e| match &e.message {
                Some(message) => message.to_string(),
                None => format!("{}: invalid", field),
            })
        })
        .collect();
    messages.sort();
    messages.dedup();
    messages.join(", ")
}
