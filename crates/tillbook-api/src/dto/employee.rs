//! Employee DTOs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use tillbook_db::DbUser;

use super::common::not_blank;

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateEmployeeRequest {
    #[serde(default)]
    #[validate(custom(function = "not_blank", message = "Name, username and password are required"))]
    pub name: String,
    #[serde(default)]
    #[validate(custom(function = "not_blank", message = "Name, username and password are required"))]
    pub username: String,
    #[serde(default)]
    #[validate(length(min = 1, message = "Name, username and password are required"))]
    pub password: String,
}

/// Update an employee; the password is only replaced when present and non-empty
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct UpdateEmployeeRequest {
    #[serde(default)]
    #[validate(custom(function = "not_blank", message = "Name and username are required"))]
    pub name: String,
    #[serde(default)]
    #[validate(custom(function = "not_blank", message = "Name and username are required"))]
    pub username: String,
    #[serde(default)]
    pub password: Option<String>,
}

impl UpdateEmployeeRequest {
    pub fn new_password(&self) -> Option<&str> {
        self.password.as_deref().filter(|p| !p.is_empty())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmployeeResponse {
    pub id: Uuid,
    pub business_id: Uuid,
    pub name: String,
    pub username: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<DbUser> for EmployeeResponse {
    fn from(user: DbUser) -> Self {
        Self {
            id: user.id,
            business_id: user.business_id,
            name: user.name,
            username: user.username,
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmployeeEnvelope {
    pub employee: EmployeeResponse,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmployeeListResponse {
    pub employees: Vec<EmployeeResponse>,
}
