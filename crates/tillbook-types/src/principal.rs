//! The authenticated actor behind a request

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::TypesError;
use crate::identity::{BusinessId, UserId};

/// Account role
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Owner of a business; manages stores and employees
    Business,
    /// Employee of a business; records entries
    Employee,
}

impl Role {
    /// Stable string form, used for storage and token claims
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Business => "business",
            Self::Employee => "employee",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = TypesError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "business" => Ok(Self::Business),
            "employee" => Ok(Self::Employee),
            other => Err(TypesError::InvalidRole(other.to_string())),
        }
    }
}

/// Authenticated principal, materialized per request from a verified session.
///
/// Never persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Principal {
    pub id: UserId,
    pub role: Role,
    pub business_id: BusinessId,
}

impl Principal {
    pub fn new(id: UserId, role: Role, business_id: BusinessId) -> Self {
        Self { id, role, business_id }
    }

    /// Principal for the owner of `business_id`
    pub fn business_owner(business_id: BusinessId) -> Self {
        Self::new(business_id.owner_id(), Role::Business, business_id)
    }

    /// Principal for an employee of `business_id`
    pub fn employee(id: UserId, business_id: BusinessId) -> Self {
        Self::new(id, Role::Employee, business_id)
    }

    pub fn is_business_owner(&self) -> bool {
        self.role == Role::Business
    }
}
