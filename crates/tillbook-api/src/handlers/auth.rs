//! Authentication Handlers
//!
//! Registration, login, logout and password change. Successful register and
//! login both return the token in the body and set it as an `HttpOnly` cookie.

use axum::{
    extract::State,
    http::{header, StatusCode},
    Json,
};
use std::sync::Arc;

use tillbook_auth::{AuthError, OptionalSession};
use tillbook_db::{DbError, DbUser};
use tillbook_policy::{Action, Target};

use crate::dto::{
    AuthResponse, ChangePasswordRequest, LoginRequest, MessageResponse, RegisterRequest,
    UserResponse,
};
use crate::error::{ApiError, ApiResult};
use crate::extractors::{CurrentUser, ValidatedJson};
use crate::state::AppState;

type SetCookie = [(header::HeaderName, String); 1];

/// Issue a session for `user`, returning the cookie header and response body
fn start_session(state: &AppState, user: &DbUser) -> ApiResult<(SetCookie, AuthResponse)> {
    let principal = user.principal()?;
    let issued = state.auth.jwt.issue(&principal, &user.username)?;
    let cookie = state.auth.session_cookie(&issued.token);

    Ok((
        [(header::SET_COOKIE, cookie)],
        AuthResponse {
            user: UserResponse::from(user),
            token: issued.token,
            expires_at: issued.expires_at,
        },
    ))
}

pub(crate) fn username_taken(err: DbError) -> ApiError {
    match err {
        DbError::Duplicate(_) => ApiError::Conflict("Username already exists".to_string()),
        other => other.into(),
    }
}

/// Register a business
pub async fn register(
    State(state): State<Arc<AppState>>,
    ValidatedJson(request): ValidatedJson<RegisterRequest>,
) -> ApiResult<(StatusCode, SetCookie, Json<AuthResponse>)> {
    let password_hash = state.auth.password.hash_password(&request.password)?;

    let user = state
        .db
        .user_repo()
        .create_business(
            request.company_name.trim(),
            request.username.trim(),
            &password_hash,
        )
        .await
        .map_err(username_taken)?;

    let (cookie, response) = start_session(&state, &user)?;

    tracing::info!(business_id = %user.business_id, username = %user.username, "Business registered");

    Ok((StatusCode::CREATED, cookie, Json(response)))
}

/// Log in as a business owner or employee
pub async fn login(
    State(state): State<Arc<AppState>>,
    ValidatedJson(request): ValidatedJson<LoginRequest>,
) -> ApiResult<(SetCookie, Json<AuthResponse>)> {
    let user = state
        .db
        .user_repo()
        .find_for_login(&request.username)
        .await?
        .ok_or(AuthError::InvalidCredentials)?;

    let valid = state
        .auth
        .password
        .verify_password(&request.password, &user.password_hash)?;
    if !valid {
        tracing::info!(user_id = %user.id, "Login failed");
        return Err(AuthError::InvalidCredentials.into());
    }

    let (cookie, response) = start_session(&state, &user)?;

    tracing::info!(user_id = %user.id, role = %user.role, "User logged in");

    Ok((cookie, Json(response)))
}

/// Revoke the presented session, if any, and clear the cookie
pub async fn logout(
    State(state): State<Arc<AppState>>,
    OptionalSession(session): OptionalSession,
) -> (SetCookie, Json<MessageResponse>) {
    if let Some(session) = session {
        state.auth.jwt.revoke(&session.claims).await;
        tracing::info!(user_id = %session.principal.id, "User logged out");
    }

    (
        [(header::SET_COOKIE, state.auth.clear_session_cookie())],
        Json(MessageResponse::new("Logged out successfully")),
    )
}

/// Change the caller's own password
pub async fn change_password(
    State(state): State<Arc<AppState>>,
    user: CurrentUser,
    ValidatedJson(request): ValidatedJson<ChangePasswordRequest>,
) -> ApiResult<Json<MessageResponse>> {
    state
        .authorization()
        .authorize(Some(&user.principal), Action::Update, Target::OwnPassword)
        .into_result()?;

    state
        .auth
        .password
        .validate_password_strength(&request.new_password)?;

    let valid = state
        .auth
        .password
        .verify_password(&request.current_password, &user.account.password_hash)?;
    if !valid {
        return Err(AuthError::IncorrectCurrentPassword.into());
    }

    let password_hash = state.auth.password.hash_password(&request.new_password)?;
    state
        .db
        .user_repo()
        .update_password(user.account.id, &password_hash)
        .await?;

    tracing::info!(user_id = %user.principal.id, "Password changed");

    Ok(Json(MessageResponse::new("Password changed successfully")))
}
