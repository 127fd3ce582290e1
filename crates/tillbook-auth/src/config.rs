//! Authentication configuration
//!
//! Secure defaults for session tokens and Argon2id password hashing.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Main authentication configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    /// Session token configuration
    pub token: TokenConfig,
    /// Password hashing configuration
    pub password: PasswordConfig,
}

/// Session token (JWT) configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TokenConfig {
    /// Secret key for signing tokens (should be at least 256 bits)
    pub secret: String,
    /// Token lifetime, also used as the cookie Max-Age
    #[serde(with = "humantime_serde")]
    pub lifetime: Duration,
    /// Token issuer claim
    pub issuer: String,
    /// Token audience claim
    pub audience: String,
    /// Name of the session cookie
    pub cookie_name: String,
    /// Mark the session cookie `Secure`
    pub secure_cookie: bool,
}

impl Default for TokenConfig {
    fn default() -> Self {
        Self {
            secret: String::new(), // Must be set in production
            lifetime: Duration::from_secs(7 * 24 * 60 * 60), // 7 days
            issuer: "tillbook".to_string(),
            audience: "tillbook-api".to_string(),
            cookie_name: "auth-token".to_string(),
            secure_cookie: false,
        }
    }
}

/// Password hashing configuration (Argon2id)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PasswordConfig {
    /// Memory cost in KiB (OWASP recommends 19456 KiB = 19 MiB minimum)
    pub memory_cost: u32,
    /// Time cost (iterations) - OWASP recommends 2 minimum
    pub time_cost: u32,
    /// Parallelism factor
    pub parallelism: u32,
    /// Output hash length in bytes
    pub hash_length: u32,
    /// Pepper (additional secret, optional)
    pub pepper: Option<String>,
    /// Minimum password length
    pub min_password_length: usize,
    /// Maximum password length (to prevent DoS)
    pub max_password_length: usize,
}

impl Default for PasswordConfig {
    fn default() -> Self {
        Self {
            memory_cost: 19456, // 19 MiB
            time_cost: 2,
            parallelism: 1,
            hash_length: 32,
            pepper: None,
            min_password_length: 6,
            max_password_length: 128,
        }
    }
}

impl AuthConfig {
    /// Validate the configuration
    pub fn validate(&self) -> Result<(), Vec<String>> {
        let mut errors = Vec::new();

        if self.token.secret.is_empty() {
            errors.push("JWT secret must be set".to_string());
        } else if self.token.secret.len() < 32 {
            errors.push("JWT secret should be at least 256 bits (32 bytes)".to_string());
        }
        if self.token.lifetime.is_zero() {
            errors.push("Token lifetime must be non-zero".to_string());
        }
        if self.token.cookie_name.is_empty() {
            errors.push("Cookie name must be set".to_string());
        }

        if self.password.memory_cost < 19456 {
            errors.push(
                "Argon2 memory cost should be at least 19456 KiB (OWASP recommendation)".to_string(),
            );
        }
        if self.password.time_cost < 2 {
            errors.push("Argon2 time cost should be at least 2 (OWASP recommendation)".to_string());
        }
        if self.password.min_password_length == 0
            || self.password.min_password_length > self.password.max_password_length
        {
            errors.push("Password length bounds are inconsistent".to_string());
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}
