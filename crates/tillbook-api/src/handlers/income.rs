//! Income Handlers
//!
//! An income entry's date is fixed once created; edits replace the amounts
//! and optionally the store, and are checked against the stored date.

use axum::{extract::State, http::StatusCode, Json};
use std::sync::Arc;
use uuid::Uuid;

use tillbook_db::{DbIncome, IncomeFields};
use tillbook_policy::{Action, Target};
use tillbook_types::{BusinessId, EntryKind, UserId};

use crate::dto::{
    parse_store_ref, CreateIncomeRequest, EntryQuery, IncomeEnvelope, IncomeListResponse,
    IncomeResponse, MessageResponse, UpdateIncomeRequest,
};
use crate::error::{ApiError, ApiResult};
use crate::extractors::{ApiQuery, CurrentUser, PathId, ValidatedJson};
use crate::handlers::{business_store, entry_scope, record_entry_write};
use crate::state::AppState;

const KIND: EntryKind = EntryKind::Income;

/// Fetch an entry and authorize `action` on it
async fn fetch_authorized(
    state: &AppState,
    user: &CurrentUser,
    action: Action,
    id: Uuid,
) -> ApiResult<DbIncome> {
    let entry = state
        .db
        .income_repo()
        .find_by_id(id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Entry not found".to_string()))?;

    state
        .authorization()
        .authorize(
            Some(&user.principal),
            action,
            Target::entry(
                KIND,
                UserId::from_uuid(entry.user_id),
                BusinessId::from_uuid(entry.business_id),
            ),
        )
        .into_result()?;

    Ok(entry)
}

/// List income entries visible to the caller
pub async fn list_income(
    State(state): State<Arc<AppState>>,
    user: CurrentUser,
    ApiQuery(query): ApiQuery<EntryQuery>,
) -> ApiResult<Json<IncomeListResponse>> {
    let scope = entry_scope(state.authorization().read_scope(&user.principal));
    let filter = query.into_filter(scope)?;

    let entries = state.db.income_repo().list(&filter).await?;

    Ok(Json(IncomeListResponse {
        entries: entries.into_iter().map(IncomeResponse::from).collect(),
    }))
}

pub async fn create_income(
    State(state): State<Arc<AppState>>,
    user: CurrentUser,
    ValidatedJson(request): ValidatedJson<CreateIncomeRequest>,
) -> ApiResult<(StatusCode, Json<IncomeEnvelope>)> {
    let principal = user.principal;
    state
        .authorization()
        .authorize(
            Some(&principal),
            Action::Create,
            Target::entry(KIND, principal.id, principal.business_id),
        )
        .into_result()?;

    let date = state
        .policy
        .check_entry_date_str(KIND, Action::Create, &request.date, state.now())?;

    let store = business_store(&state, &principal, parse_store_ref(&request.store)?).await?;

    let entry = state
        .db
        .income_repo()
        .create(
            &principal,
            &IncomeFields {
                store_id: store.id,
                date,
                amounts: request.amounts.amounts(),
            },
        )
        .await?;

    record_entry_write(KIND, Action::Create);
    tracing::info!(entry_id = %entry.id, user_id = %principal.id, date = %entry.date, "Income entry created");

    Ok((
        StatusCode::CREATED,
        Json(IncomeEnvelope {
            entry: entry.into(),
        }),
    ))
}

pub async fn update_income(
    State(state): State<Arc<AppState>>,
    user: CurrentUser,
    PathId(id): PathId,
    ValidatedJson(request): ValidatedJson<UpdateIncomeRequest>,
) -> ApiResult<Json<IncomeEnvelope>> {
    let entry = fetch_authorized(&state, &user, Action::Update, id).await?;

    state
        .policy
        .check_entry_date(KIND, Action::Update, entry.date, state.now())?;

    let store_id = match request.store.as_deref().filter(|s| !s.trim().is_empty()) {
        Some(raw) => {
            business_store(&state, &user.principal, parse_store_ref(raw)?)
                .await?
                .id
        }
        None => entry.store_id,
    };

    let updated = state
        .db
        .income_repo()
        .update(entry.id, store_id, &request.amounts.amounts())
        .await?;

    record_entry_write(KIND, Action::Update);
    tracing::info!(entry_id = %updated.id, user_id = %user.principal.id, "Income entry updated");

    Ok(Json(IncomeEnvelope {
        entry: updated.into(),
    }))
}

pub async fn delete_income(
    State(state): State<Arc<AppState>>,
    user: CurrentUser,
    PathId(id): PathId,
) -> ApiResult<Json<MessageResponse>> {
    let entry = fetch_authorized(&state, &user, Action::Delete, id).await?;

    state
        .policy
        .check_entry_date(KIND, Action::Delete, entry.date, state.now())?;

    if !state.db.income_repo().delete(entry.id).await? {
        return Err(ApiError::NotFound("Entry not found".to_string()));
    }

    record_entry_write(KIND, Action::Delete);
    tracing::info!(entry_id = %entry.id, user_id = %user.principal.id, "Income entry deleted");

    Ok(Json(MessageResponse::new("Entry deleted successfully")))
}
