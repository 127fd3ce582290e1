//! API Handlers
//!
//! Every entry write follows the same order: fetch the record, authorize,
//! check the date window, write.

pub mod auth;
pub mod employee;
pub mod expense;
pub mod health;
pub mod income;
pub mod store;
pub mod window;

use uuid::Uuid;

use tillbook_db::{DbStore, EntryScope};
use tillbook_policy::{Action, ReadScope};
use tillbook_types::{EntryKind, Principal};

use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

/// Listing scope for a read scope
pub(crate) fn entry_scope(scope: ReadScope) -> EntryScope {
    match scope {
        ReadScope::Own(user_id) => EntryScope::Owner(*user_id.as_uuid()),
        ReadScope::Business(business_id) => EntryScope::Business(*business_id.as_uuid()),
    }
}

/// Load a store of the principal's business
pub(crate) async fn business_store(
    state: &AppState,
    principal: &Principal,
    store_id: Uuid,
) -> ApiResult<DbStore> {
    state
        .db
        .store_repo()
        .find(*principal.business_id.as_uuid(), store_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Store not found".to_string()))
}

pub(crate) fn record_entry_write(kind: EntryKind, action: Action) {
    metrics::counter!(
        "tillbook_entry_writes_total",
        "kind" => kind.as_str(),
        "action" => action.as_str()
    )
    .increment(1);
}
