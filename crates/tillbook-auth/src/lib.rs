//! Tillbook Authentication Layer
//!
//! - **Sessions**: signed JWTs delivered as a bearer token or an
//!   `HttpOnly` cookie, revocable on logout
//! - **Password Security**: Argon2id hashing with random salts and an
//!   optional pepper
//! - **Middleware**: an Axum layer that turns a valid token into an
//!   [`AuthSession`] carrying the request's [`Principal`](tillbook_types::Principal)
//!
//! ```text
//! Request → AuthLayer → Handler
//!              │
//!      Bearer header / cookie
//!              │
//!              ▼
//!         JwtService ──▶ AuthSession
//! ```

pub mod config;
pub mod error;
pub mod jwt;
pub mod middleware;
pub mod password;

pub use config::{AuthConfig, PasswordConfig, TokenConfig};
pub use error::{AuthError, AuthResult, ErrorResponse};
pub use jwt::{IssuedToken, JwtService, SessionClaims};
pub use middleware::{
    auth_error_response, AuthLayer, AuthMiddleware, AuthSession, OptionalSession, RequireSession,
};
pub use password::PasswordService;

use std::sync::Arc;

/// Authentication service bundling sessions and password hashing
#[derive(Clone)]
pub struct AuthService {
    pub jwt: Arc<JwtService>,
    pub password: PasswordService,
    config: AuthConfig,
}

impl AuthService {
    pub fn new(config: AuthConfig) -> Self {
        Self {
            jwt: Arc::new(JwtService::new(config.token.clone())),
            password: PasswordService::new(config.password.clone()),
            config,
        }
    }

    /// Create an auth layer for Axum router
    pub fn layer(&self) -> AuthLayer {
        AuthLayer::new(self.jwt.clone())
    }

    /// `Set-Cookie` value for a freshly issued token
    pub fn session_cookie(&self, token: &str) -> String {
        middleware::session_cookie(&self.config.token, token)
    }

    /// `Set-Cookie` value that clears the session
    pub fn clear_session_cookie(&self) -> String {
        middleware::clear_session_cookie(&self.config.token)
    }
}
