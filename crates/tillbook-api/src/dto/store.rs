//! Store DTOs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use tillbook_db::DbStore;

use super::common::not_blank;

/// Create or rename a store
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct StoreRequest {
    #[serde(default)]
    #[validate(custom(function = "not_blank", message = "Store name is required"))]
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoreResponse {
    pub id: Uuid,
    pub business_id: Uuid,
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<DbStore> for StoreResponse {
    fn from(store: DbStore) -> Self {
        Self {
            id: store.id,
            business_id: store.business_id,
            name: store.name,
            created_at: store.created_at,
            updated_at: store.updated_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreEnvelope {
    pub store: StoreResponse,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreListResponse {
    pub stores: Vec<StoreResponse>,
}
