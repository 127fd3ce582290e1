//! Expense Handlers
//!
//! Expenses and payments. Unlike income entries, an edit may move the entry
//! to another date; the window is then checked against the new date.

use axum::{extract::State, http::StatusCode, Json};
use std::sync::Arc;
use uuid::Uuid;

use tillbook_db::{DbExpense, ExpenseFields};
use tillbook_policy::{Action, Target};
use tillbook_types::{BusinessId, EntryKind, ExpenseType, Principal, UserId};

use crate::dto::{
    parse_store_ref, EntryQuery, ExpenseEnvelope, ExpenseListResponse, ExpenseRequest,
    ExpenseResponse, MessageResponse,
};
use crate::error::{ApiError, ApiResult};
use crate::extractors::{ApiQuery, CurrentUser, PathId, ValidatedJson};
use crate::handlers::{business_store, entry_scope, record_entry_write};
use crate::state::AppState;

const KIND: EntryKind = EntryKind::Expense;

async fn fetch_authorized(
    state: &AppState,
    user: &CurrentUser,
    action: Action,
    id: Uuid,
) -> ApiResult<DbExpense> {
    let entry = state
        .db
        .expense_repo()
        .find_by_id(id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Expense not found".to_string()))?;

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

/// Window-check the requested date and resolve the rest of the body
async fn expense_fields(
    state: &AppState,
    principal: &Principal,
    action: Action,
    request: &ExpenseRequest,
    expense_type: ExpenseType,
) -> ApiResult<ExpenseFields> {
    let date = state
        .policy
        .check_entry_date_str(KIND, action, &request.date, state.now())?;

    let store = business_store(state, principal, parse_store_ref(&request.store)?).await?;

    Ok(ExpenseFields {
        store_id: store.id,
        date,
        description: request.description.trim().to_string(),
        amount: request.amount()?,
        expense_type,
    })
}

/// List expenses visible to the caller
pub async fn list_expenses(
    State(state): State<Arc<AppState>>,
    user: CurrentUser,
    ApiQuery(query): ApiQuery<EntryQuery>,
) -> ApiResult<Json<ExpenseListResponse>> {
    let scope = entry_scope(state.authorization().read_scope(&user.principal));
    let filter = query.into_filter(scope)?;

    let entries = state.db.expense_repo().list(&filter).await?;

    Ok(Json(ExpenseListResponse {
        entries: entries.into_iter().map(ExpenseResponse::from).collect(),
    }))
}

pub async fn create_expense(
    State(state): State<Arc<AppState>>,
    user: CurrentUser,
    ValidatedJson(request): ValidatedJson<ExpenseRequest>,
) -> ApiResult<(StatusCode, Json<ExpenseEnvelope>)> {
    let principal = user.principal;
    state
        .authorization()
        .authorize(
            Some(&principal),
            Action::Create,
            Target::entry(KIND, principal.id, principal.business_id),
        )
        .into_result()?;

    let expense_type = request.expense_type(false)?;
    let fields = expense_fields(&state, &principal, Action::Create, &request, expense_type).await?;

    let entry = state.db.expense_repo().create(&principal, &fields).await?;

    record_entry_write(KIND, Action::Create);
    tracing::info!(
        entry_id = %entry.id,
        user_id = %principal.id,
        date = %entry.date,
        expense_type = %entry.expense_type,
        "Expense created"
    );

    Ok((
        StatusCode::CREATED,
        Json(ExpenseEnvelope {
            entry: entry.into(),
        }),
    ))
}

pub async fn update_expense(
    State(state): State<Arc<AppState>>,
    user: CurrentUser,
    PathId(id): PathId,
    ValidatedJson(request): ValidatedJson<ExpenseRequest>,
) -> ApiResult<Json<ExpenseEnvelope>> {
    let entry = fetch_authorized(&state, &user, Action::Update, id).await?;

    let expense_type = request.expense_type(true)?;
    let fields =
        expense_fields(&state, &user.principal, Action::Update, &request, expense_type).await?;

    let updated = state.db.expense_repo().update(entry.id, &fields).await?;

    record_entry_write(KIND, Action::Update);
    tracing::info!(
        entry_id = %updated.id,
        user_id = %user.principal.id,
        previous_date = %entry.date,
        date = %updated.date,
        "Expense updated"
    );

    Ok(Json(ExpenseEnvelope {
        entry: updated.into(),
    }))
}

pub async fn delete_expense(
    State(state): State<Arc<AppState>>,
    user: CurrentUser,
    PathId(id): PathId,
) -> ApiResult<Json<MessageResponse>> {
    let entry = fetch_authorized(&state, &user, Action::Delete, id).await?;

    state
        .policy
        .check_entry_date(KIND, Action::Delete, entry.date, state.now())?;

    if !state.db.expense_repo().delete(entry.id).await? {
        return Err(ApiError::NotFound("Expense not found".to_string()));
    }

    record_entry_write(KIND, Action::Delete);
    tracing::info!(entry_id = %entry.id, user_id = %user.principal.id, "Expense deleted");

    Ok(Json(MessageResponse::new("Expense deleted successfully")))
}
