//! Authentication DTOs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use tillbook_db::DbUser;

use super::common::not_blank;

// =============================================================================
// Registration
// =============================================================================

/// Business registration request
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    #[serde(default)]
    #[validate(custom(
        function = "not_blank",
        message = "Company name, username and password are required"
    ))]
    pub company_name: String,
    #[serde(default)]
    #[validate(custom(
        function = "not_blank",
        message = "Company name, username and password are required"
    ))]
    pub username: String,
    #[serde(default)]
    #[validate(length(min = 1, message = "Company name, username and password are required"))]
    pub password: String,
}

// =============================================================================
// Login
// =============================================================================

/// Login request
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct LoginRequest {
    #[serde(default)]
    #[validate(custom(function = "not_blank", message = "Username and password are required"))]
    pub username: String,
    #[serde(default)]
    #[validate(length(min = 1, message = "Username and password are required"))]
    pub password: String,
}

/// Account as returned to its owner
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    pub id: Uuid,
    pub role: String,
    pub business_id: Uuid,
    /// Company name for business accounts
    pub name: String,
    pub username: String,
}

impl From<&DbUser> for UserResponse {
    fn from(user: &DbUser) -> Self {
        Self {
            id: user.id,
            role: user.role.clone(),
            business_id: user.business_id,
            name: user.name.clone(),
            username: user.username.clone(),
        }
    }
}

/// Register and login response
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthResponse {
    pub user: UserResponse,
    /// Session token, also set as a cookie
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

// =============================================================================
// Password Change
// =============================================================================

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ChangePasswordRequest {
    #[serde(default)]
    #[validate(length(min = 1, message = "Current password and new password are required"))]
    pub current_password: String,
    #[serde(default)]
    #[validate(length(min = 1, message = "Current password and new password are required"))]
    pub new_password: String,
}
