//! Custom Axum Extractors
//!
//! Request extractors for the current account, validated bodies and ids.

use axum::{
    async_trait,
    extract::{FromRequest, FromRequestParts, Path, Query, Request},
    http::request::Parts,
    Json,
};
use serde::de::DeserializeOwned;
use std::sync::Arc;
use uuid::Uuid;

use tillbook_auth::{AuthError, AuthSession, RequireSession};
use tillbook_db::DbUser;
use tillbook_types::Principal;

use crate::error::ApiError;
use crate::state::AppState;

// =============================================================================
// Current Account Extractor
// =============================================================================

/// The authenticated account behind a request.
///
/// The session must verify and the account must still exist with the role
/// and business the token was issued for. Otherwise the request is rejected
/// with 401.
#[derive(Debug, Clone)]
pub struct CurrentUser {
    pub principal: Principal,
    pub session: AuthSession,
    pub account: DbUser,
}

#[async_trait]
impl FromRequestParts<Arc<AppState>> for CurrentUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let RequireSession(session) = RequireSession::from_request_parts(parts, state).await?;

        let account = state
            .db
            .user_repo()
            .find_by_id(*session.principal.id.as_uuid())
            .await?
            .ok_or(AuthError::UserNotFound)?;

        let principal = account.principal()?;
        if principal != session.principal {
            tracing::warn!(user_id = %principal.id, "Session no longer matches account");
            return Err(AuthError::InvalidToken.into());
        }

        Ok(CurrentUser {
            principal,
            session,
            account,
        })
    }
}

// =============================================================================
// Path Id Extractor
// =============================================================================

/// UUID path parameter; malformed ids are a 400 with the usual error body
#[derive(Debug, Clone, Copy)]
pub struct PathId(pub Uuid);

#[async_trait]
impl<S> FromRequestParts<S> for PathId
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(raw) = Path::<String>::from_request_parts(parts, state)
            .await
            .map_err(|e| ApiError::BadRequest(e.body_text()))?;

        Uuid::parse_str(&raw)
            .map(PathId)
            .map_err(|_| ApiError::BadRequest("Invalid id".to_string()))
    }
}

// =============================================================================
// Query Extractor
// =============================================================================

/// Query string extractor whose rejection uses the API error body
pub struct ApiQuery<T>(pub T);

#[async_trait]
impl<S, T> FromRequestParts<S> for ApiQuery<T>
where
    S: Send + Sync,
    T: DeserializeOwned,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Query(value) = Query::<T>::from_request_parts(parts, state)
            .await
            .map_err(|e| ApiError::BadRequest(e.body_text()))?;

        Ok(ApiQuery(value))
    }
}

// =============================================================================
// Validated JSON Extractor
// =============================================================================

/// JSON extractor with validation
pub struct ValidatedJson<T>(pub T);

#[async_trait]
impl<S, T> FromRequest<S> for ValidatedJson<T>
where
    S: Send + Sync,
    T: DeserializeOwned + validator::Validate,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(|e| ApiError::BadRequest(e.body_text()))?;

        value.validate()?;

        Ok(ValidatedJson(value))
    }
}
