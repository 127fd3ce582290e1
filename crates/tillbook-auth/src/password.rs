//! Password Service
//!
//! Argon2id hashing with a per-hash random salt and an optional pepper.
//! There is no plain-text storage or comparison path.

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2, Params, Version,
};
use zeroize::Zeroizing;

use crate::config::PasswordConfig;
use crate::error::{AuthError, AuthResult};

/// Password service for hashing and verification
#[derive(Debug, Clone)]
pub struct PasswordService {
    config: PasswordConfig,
}

impl PasswordService {
    /// Create a new password service
    pub fn new(config: PasswordConfig) -> Self {
        Self { config }
    }

    fn peppered(&self, password: &str) -> Zeroizing<String> {
        match self.config.pepper {
            Some(ref pepper) => Zeroizing::new(format!("{}{}", password, pepper)),
            None => Zeroizing::new(password.to_string()),
        }
    }

    /// Hash a password using Argon2id
    pub fn hash_password(&self, password: &str) -> AuthResult<String> {
        self.validate_password_strength(password)?;

        let password_with_pepper = self.peppered(password);
        let salt = SaltString::generate(&mut OsRng);

        let params = Params::new(
            self.config.memory_cost,
            self.config.time_cost,
            self.config.parallelism,
            Some(self.config.hash_length as usize),
        )
        .map_err(|e| AuthError::Internal(format!("Invalid Argon2 params: {}", e)))?;

        let argon2 = Argon2::new(argon2::Algorithm::Argon2id, Version::V0x13, params);

        let hash = argon2
            .hash_password(password_with_pepper.as_bytes(), &salt)
            .map_err(|_| AuthError::PasswordHashingFailed)?;

        Ok(hash.to_string())
    }

    /// Verify a password against a stored PHC hash string
    pub fn verify_password(&self, password: &str, hash: &str) -> AuthResult<bool> {
        let password_with_pepper = self.peppered(password);

        let parsed_hash = PasswordHash::new(hash)?;

        // parameters come from the PHC string
        match Argon2::default().verify_password(password_with_pepper.as_bytes(), &parsed_hash) {
            Ok(_) => Ok(true),
            Err(argon2::password_hash::Error::Password) => Ok(false),
            Err(_) => Err(AuthError::PasswordVerificationFailed),
        }
    }

    /// Validate password length bounds
    pub fn validate_password_strength(&self, password: &str) -> AuthResult<()> {
        let length = password.chars().count();

        if length < self.config.min_password_length {
            return Err(AuthError::WeakPassword(format!(
                "Password must be at least {} characters long",
                self.config.min_password_length
            )));
        }

        if length > self.config.max_password_length {
            return Err(AuthError::WeakPassword(format!(
                "Password must be at most {} characters long",
                self.config.max_password_length
            )));
        }

        Ok(())
    }
}
