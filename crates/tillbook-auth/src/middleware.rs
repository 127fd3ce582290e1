//! Authentication Middleware for Axum
//!
//! The layer looks for a session token in the `Authorization: Bearer`
//! header, then in the session cookie. A valid token puts an
//! [`AuthSession`] into the request extensions. A missing or bad token lets
//! the request through without one, so public routes keep working with a
//! stale cookie; routes that need a session reject it through
//! [`RequireSession`].

use axum::{
    async_trait,
    body::Body,
    extract::{FromRequestParts, Request},
    http::{header, request::Parts, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
};
use std::sync::Arc;
use std::task::{Context, Poll};
use tower::{Layer, Service};

use tillbook_types::Principal;

use crate::config::TokenConfig;
use crate::error::{AuthError, ErrorResponse};
use crate::jwt::{JwtService, SessionClaims};

/// Verified session attached to a request
#[derive(Debug, Clone)]
pub struct AuthSession {
    pub principal: Principal,
    pub claims: SessionClaims,
}

/// Why a presented token was not accepted
#[derive(Debug, Clone)]
struct SessionRejection(AuthError);

/// Authentication middleware layer
#[derive(Clone)]
pub struct AuthLayer {
    jwt: Arc<JwtService>,
}

impl AuthLayer {
    /// Create a new authentication layer
    pub fn new(jwt: Arc<JwtService>) -> Self {
        Self { jwt }
    }
}

impl<S> Layer<S> for AuthLayer {
    type Service = AuthMiddleware<S>;

    fn layer(&self, inner: S) -> Self::Service {
        AuthMiddleware {
            inner,
            jwt: self.jwt.clone(),
        }
    }
}

/// Authentication middleware service
#[derive(Clone)]
pub struct AuthMiddleware<S> {
    inner: S,
    jwt: Arc<JwtService>,
}

impl<S> Service<Request> for AuthMiddleware<S>
where
    S: Service<Request, Response = Response> + Send + Clone + 'static,
    S::Future: Send + 'static,
{
    type Response = S::Response;
    type Error = S::Error;
    type Future = std::pin::Pin<
        Box<dyn std::future::Future<Output = Result<Self::Response, Self::Error>> + Send>,
    >;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, req: Request) -> Self::Future {
        let jwt = self.jwt.clone();
        let mut inner = self.inner.clone();

        Box::pin(async move {
            let token = extract_token(req.headers(), &jwt.config().cookie_name);
            let (mut parts, body) = req.into_parts();

            if let Some(token) = token {
                match authenticate(&token, &jwt).await {
                    Ok(session) => {
                        parts.extensions.insert(session);
                    }
                    Err(e) => {
                        tracing::debug!(error = %e, "Rejected session token");
                        parts.extensions.insert(SessionRejection(e));
                    }
                }
            }

            inner.call(Request::from_parts(parts, body)).await
        })
    }
}

async fn authenticate(token: &str, jwt: &JwtService) -> Result<AuthSession, AuthError> {
    let claims = jwt.validate(token).await?;
    let principal = claims.principal()?;
    Ok(AuthSession { principal, claims })
}

/// Extract a session token from the bearer header or the session cookie
pub fn extract_token(headers: &HeaderMap, cookie_name: &str) -> Option<String> {
    if let Some(auth_header) = headers.get(header::AUTHORIZATION) {
        if let Some(token) = auth_header
            .to_str()
            .ok()
            .and_then(|value| value.strip_prefix("Bearer "))
        {
            return Some(token.trim().to_string());
        }
    }

    for cookie_header in headers.get_all(header::COOKIE) {
        let Ok(cookies) = cookie_header.to_str() else {
            continue;
        };
        for cookie in cookies.split(';') {
            if let Some((name, value)) = cookie.trim().split_once('=') {
                if name == cookie_name && !value.is_empty() {
                    return Some(value.to_string());
                }
            }
        }
    }

    None
}

/// `Set-Cookie` value carrying a session token
pub fn session_cookie(config: &TokenConfig, token: &str) -> String {
    let mut cookie = format!(
        "{}={}; HttpOnly; Path=/; Max-Age={}; SameSite=Strict",
        config.cookie_name,
        token,
        config.lifetime.as_secs()
    );
    if config.secure_cookie {
        cookie.push_str("; Secure");
    }
    cookie
}

/// `Set-Cookie` value clearing the session cookie
pub fn clear_session_cookie(config: &TokenConfig) -> String {
    let mut cookie = format!(
        "{}=; HttpOnly; Path=/; Max-Age=0; SameSite=Strict",
        config.cookie_name
    );
    if config.secure_cookie {
        cookie.push_str("; Secure");
    }
    cookie
}

/// Create error response for authentication errors
pub fn auth_error_response(error: AuthError) -> Response {
    let status =
        StatusCode::from_u16(error.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    let body = ErrorResponse::from(&error);

    Response::builder()
        .status(status)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(serde_json::to_string(&body).unwrap_or_default()))
        .unwrap_or_else(|_| Response::new(Body::empty()))
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        auth_error_response(self)
    }
}

// =============================================================================
// Axum Extractors
// =============================================================================

/// Extractor for the session, if any
pub struct OptionalSession(pub Option<AuthSession>);

#[async_trait]
impl<S> FromRequestParts<S> for OptionalSession
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(OptionalSession(parts.extensions.get::<AuthSession>().cloned()))
    }
}

/// Extractor for a required session
/// Returns 401 if not authenticated
pub struct RequireSession(pub AuthSession);

#[async_trait]
impl<S> FromRequestParts<S> for RequireSession
where
    S: Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        if let Some(session) = parts.extensions.get::<AuthSession>() {
            return Ok(RequireSession(session.clone()));
        }
        match parts.extensions.get::<SessionRejection>() {
            Some(SessionRejection(error)) => Err(error.clone()),
            None => Err(AuthError::Unauthenticated),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{routing::get, Router};
    use tillbook_types::BusinessId;
    use axum::http::Request as HttpRequest;
    use tower::ServiceExt;

    fn token_config() -> TokenConfig {
        TokenConfig {
            secret: "test-secret-key-for-jwt-tokens-min-32-bytes!".to_string(),
            ..Default::default()
        }
    }

    async fn whoami(RequireSession(session): RequireSession) -> String {
        session.principal.role.to_string()
    }

    async fn public(OptionalSession(session): OptionalSession) -> String {
        session.map_or("anonymous".to_string(), |s| s.claims.username)
    }

    fn app(jwt: Arc<JwtService>) -> Router {
        Router::new()
            .route("/me", get(whoami))
            .route("/public", get(public))
            .layer(AuthLayer::new(jwt))
    }

    async fn body_string(response: Response) -> String {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[test]
    fn test_extract_token_from_bearer() {
        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, "Bearer abc.def".parse().unwrap());
        assert_eq!(extract_token(&headers, "auth-token"), Some("abc.def".to_string()));
    }

    #[test]
    fn test_extract_token_from_cookie() {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::COOKIE,
            "other=value; auth-token=cookie-token; more=stuff".parse().unwrap(),
        );
        assert_eq!(
            extract_token(&headers, "auth-token"),
            Some("cookie-token".to_string())
        );
        assert_eq!(extract_token(&headers, "session"), None);
    }

    #[test]
    fn test_cookie_strings() {
        let mut config = token_config();
        assert_eq!(
            session_cookie(&config, "tok"),
            "auth-token=tok; HttpOnly; Path=/; Max-Age=604800; SameSite=Strict"
        );
        config.secure_cookie = true;
        assert!(clear_session_cookie(&config).contains("Max-Age=0"));
        assert!(clear_session_cookie(&config).ends_with("; Secure"));
    }

    #[test]
    fn test_auth_error_response() {
        let response = auth_error_response(AuthError::InvalidToken);
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

        let response = auth_error_response(AuthError::IncorrectCurrentPassword);
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_session_from_bearer_and_cookie() {
        let jwt = Arc::new(JwtService::new(token_config()));
        let issued = jwt
            .issue(&Principal::business_owner(BusinessId::new()), "acme")
            .unwrap();

        let response = app(jwt.clone())
            .oneshot(
                HttpRequest::builder()
                    .uri("/me")
                    .header(header::AUTHORIZATION, format!("Bearer {}", issued.token))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_string(response).await, "business");

        let response = app(jwt)
            .oneshot(
                HttpRequest::builder()
                    .uri("/public")
                    .header(header::COOKIE, format!("auth-token={}", issued.token))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(body_string(response).await, "acme");
    }

    #[tokio::test]
    async fn test_missing_and_bad_tokens() {
        let jwt = Arc::new(JwtService::new(token_config()));

        let response = app(jwt.clone())
            .oneshot(HttpRequest::builder().uri("/me").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert!(body_string(response).await.contains("UNAUTHENTICATED"));

        let response = app(jwt.clone())
            .oneshot(
                HttpRequest::builder()
                    .uri("/me")
                    .header(header::COOKIE, "auth-token=garbage")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert!(body_string(response).await.contains("INVALID_TOKEN"));

        // public routes tolerate a stale cookie
        let response = app(jwt)
            .oneshot(
                HttpRequest::builder()
                    .uri("/public")
                    .header(header::COOKIE, "auth-token=garbage")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_string(response).await, "anonymous");
    }
}
