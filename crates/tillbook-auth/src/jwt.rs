//! Session token service
//!
//! Sessions are signed JWTs carrying the principal's id, role and business.
//! Logout revokes a token by its `jti` until the token would have expired
//! anyway.

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

use tillbook_types::{BusinessId, Principal, Role, UserId};

use crate::config::TokenConfig;
use crate::error::{AuthError, AuthResult};

/// Claims carried by a session token
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionClaims {
    /// Account id
    pub sub: String,
    pub role: Role,
    /// Business id
    pub bid: String,
    pub username: String,
    pub iat: i64,
    pub exp: i64,
    pub nbf: i64,
    pub iss: String,
    pub aud: String,
    pub jti: String,
}

impl SessionClaims {
    /// Materialize the principal these claims identify.
    pub fn principal(&self) -> AuthResult<Principal> {
        let id = UserId::parse(&self.sub).map_err(|_| AuthError::InvalidToken)?;
        let business_id = BusinessId::parse(&self.bid).map_err(|_| AuthError::InvalidToken)?;
        Ok(Principal::new(id, self.role, business_id))
    }
}

/// A freshly signed token
#[derive(Debug, Clone)]
pub struct IssuedToken {
    pub token: String,
    pub jti: String,
    pub expires_at: DateTime<Utc>,
}

/// JWT service for session tokens
#[derive(Clone)]
pub struct JwtService {
    config: TokenConfig,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    /// Revoked token ids mapped to their expiry timestamp
    revoked_tokens: Arc<RwLock<HashMap<String, i64>>>,
}

impl JwtService {
    /// Create a new JWT service
    pub fn new(config: TokenConfig) -> Self {
        let encoding_key = EncodingKey::from_secret(config.secret.as_bytes());
        let decoding_key = DecodingKey::from_secret(config.secret.as_bytes());

        Self {
            config,
            encoding_key,
            decoding_key,
            revoked_tokens: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    pub fn config(&self) -> &TokenConfig {
        &self.config
    }

    /// Sign a session token for `principal`
    pub fn issue(&self, principal: &Principal, username: &str) -> AuthResult<IssuedToken> {
        let now = Utc::now();
        let expires_at = now
            + Duration::from_std(self.config.lifetime)
                .map_err(|e| AuthError::Internal(e.to_string()))?;

        let jti = Uuid::new_v4().to_string();
        let claims = SessionClaims {
            sub: principal.id.as_uuid().to_string(),
            role: principal.role,
            bid: principal.business_id.as_uuid().to_string(),
            username: username.to_string(),
            iat: now.timestamp(),
            exp: expires_at.timestamp(),
            nbf: now.timestamp(),
            iss: self.config.issuer.clone(),
            aud: self.config.audience.clone(),
            jti: jti.clone(),
        };

        let token = encode(&Header::default(), &claims, &self.encoding_key)
            .map_err(|e| AuthError::Internal(format!("Failed to encode session token: {}", e)))?;

        Ok(IssuedToken {
            token,
            jti,
            expires_at,
        })
    }

    /// Validate a token and return its claims
    pub async fn validate(&self, token: &str) -> AuthResult<SessionClaims> {
        let claims = self.decode_token(token)?;

        if self.is_revoked(&claims.jti).await {
            return Err(AuthError::TokenRevoked);
        }

        Ok(claims)
    }

    /// Revoke a token until its natural expiry
    pub async fn revoke(&self, claims: &SessionClaims) {
        let mut revoked = self.revoked_tokens.write().await;
        revoked.insert(claims.jti.clone(), claims.exp);
    }

    pub async fn is_revoked(&self, jti: &str) -> bool {
        let revoked = self.revoked_tokens.read().await;
        revoked.contains_key(jti)
    }

    /// Drop revocations for tokens that have expired. Returns how many were removed.
    pub async fn purge_revoked(&self) -> usize {
        let now = Utc::now().timestamp();
        let mut revoked = self.revoked_tokens.write().await;
        let before = revoked.len();
        revoked.retain(|_, exp| *exp > now);
        let removed = before - revoked.len();
        if removed > 0 {
            tracing::debug!(removed, "Purged expired token revocations");
        }
        removed
    }

    fn decode_token(&self, token: &str) -> AuthResult<SessionClaims> {
        let mut validation = Validation::default();
        validation.set_issuer(&[&self.config.issuer]);
        validation.set_audience(&[&self.config.audience]);
        validation.validate_exp = true;
        validation.validate_nbf = true;

        let token_data = decode::<SessionClaims>(token, &self.decoding_key, &validation)?;

        Ok(token_data.claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config() -> TokenConfig {
        TokenConfig {
            secret: "test-secret-key-for-jwt-tokens-min-32-bytes!".to_string(),
            lifetime: std::time::Duration::from_secs(3600),
            issuer: "test-issuer".to_string(),
            audience: "test-audience".to_string(),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_issue_and_validate() {
        let service = JwtService::new(test_config());
        let principal = Principal::employee(UserId::new(), BusinessId::new());

        let issued = service.issue(&principal, "alice").unwrap();
        assert!(!issued.token.is_empty());

        let claims = service.validate(&issued.token).await.unwrap();
        assert_eq!(claims.username, "alice");
        assert_eq!(claims.jti, issued.jti);
        assert_eq!(claims.principal().unwrap(), principal);
    }

    #[tokio::test]
    async fn test_business_owner_round_trips() {
        let service = JwtService::new(test_config());
        let principal = Principal::business_owner(BusinessId::new());

        let issued = service.issue(&principal, "acme").unwrap();
        let claims = service.validate(&issued.token).await.unwrap();
        let restored = claims.principal().unwrap();
        assert!(restored.is_business_owner());
        assert_eq!(restored.id, restored.business_id.owner_id());
    }

    #[tokio::test]
    async fn test_token_revocation() {
        let service = JwtService::new(test_config());
        let principal = Principal::business_owner(BusinessId::new());

        let issued = service.issue(&principal, "acme").unwrap();
        let claims = service.validate(&issued.token).await.unwrap();

        service.revoke(&claims).await;

        let result = service.validate(&issued.token).await;
        assert!(matches!(result, Err(AuthError::TokenRevoked)));

        // not yet expired, so the revocation survives a purge
        assert_eq!(service.purge_revoked().await, 0);
        assert!(service.is_revoked(&claims.jti).await);
    }

    #[tokio::test]
    async fn test_purge_drops_expired_revocations() {
        let service = JwtService::new(test_config());
        let principal = Principal::business_owner(BusinessId::new());
        let issued = service.issue(&principal, "acme").unwrap();
        let mut claims = service.validate(&issued.token).await.unwrap();

        claims.exp = Utc::now().timestamp() - 10;
        service.revoke(&claims).await;
        assert_eq!(service.purge_revoked().await, 1);
    }

    #[tokio::test]
    async fn test_expired_token() {
        let service = JwtService::new(test_config());
        let now = Utc::now().timestamp();
        let claims = SessionClaims {
            sub: Uuid::new_v4().to_string(),
            role: Role::Employee,
            bid: Uuid::new_v4().to_string(),
            username: "alice".to_string(),
            iat: now - 7200,
            exp: now - 3600,
            nbf: now - 7200,
            iss: "test-issuer".to_string(),
            aud: "test-audience".to_string(),
            jti: Uuid::new_v4().to_string(),
        };
        let token = encode(&Header::default(), &claims, &service.encoding_key).unwrap();

        assert!(matches!(
            service.validate(&token).await,
            Err(AuthError::TokenExpired)
        ));
    }

    #[tokio::test]
    async fn test_wrong_secret_or_audience() {
        let service = JwtService::new(test_config());
        let principal = Principal::business_owner(BusinessId::new());
        let issued = service.issue(&principal, "acme").unwrap();

        let mut other = test_config();
        other.secret = "another-secret-key-for-jwt-tokens-32-bytes".to_string();
        assert!(JwtService::new(other).validate(&issued.token).await.is_err());

        let mut other = test_config();
        other.audience = "someone-else".to_string();
        assert!(JwtService::new(other).validate(&issued.token).await.is_err());
    }

    #[tokio::test]
    async fn test_invalid_token() {
        let service = JwtService::new(test_config());
        assert!(matches!(
            service.validate("invalid-token").await,
            Err(AuthError::InvalidToken)
        ));
    }
}
