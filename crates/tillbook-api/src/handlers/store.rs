//! Store Handlers
//!
//! Stores are scoped to a business: lookups outside the caller's business
//! answer 404. Only business owners may create, rename or delete them.

use axum::{extract::State, http::StatusCode, Json};
use std::sync::Arc;

use tillbook_db::DbError;
use tillbook_policy::{Action, DependentRecords, Target};

use crate::dto::{MessageResponse, StoreEnvelope, StoreListResponse, StoreRequest, StoreResponse};
use crate::error::{ApiError, ApiResult};
use crate::extractors::{CurrentUser, PathId, ValidatedJson};
use crate::handlers::business_store;
use crate::state::AppState;

const STORE_IN_USE: &str = "Cannot delete store with associated income entries or expenses";

fn store_write_error(err: DbError) -> ApiError {
    match err {
        DbError::Duplicate(_) => ApiError::BadRequest("Store name already exists".to_string()),
        DbError::NotFound(_) => ApiError::NotFound("Store not found".to_string()),
        DbError::Constraint(_) => ApiError::Conflict(STORE_IN_USE.to_string()),
        other => other.into(),
    }
}

fn authorize_store(user: &CurrentUser, state: &AppState, action: Action) -> ApiResult<()> {
    state
        .authorization()
        .authorize(
            Some(&user.principal),
            action,
            Target::Store {
                business_id: user.principal.business_id,
            },
        )
        .into_result()?;
    Ok(())
}

/// List the stores of the caller's business
pub async fn list_stores(
    State(state): State<Arc<AppState>>,
    user: CurrentUser,
) -> ApiResult<Json<StoreListResponse>> {
    authorize_store(&user, &state, Action::Read)?;

    let stores = state
        .db
        .store_repo()
        .list(*user.principal.business_id.as_uuid())
        .await?;

    Ok(Json(StoreListResponse {
        stores: stores.into_iter().map(StoreResponse::from).collect(),
    }))
}

pub async fn create_store(
    State(state): State<Arc<AppState>>,
    user: CurrentUser,
    ValidatedJson(request): ValidatedJson<StoreRequest>,
) -> ApiResult<(StatusCode, Json<StoreEnvelope>)> {
    authorize_store(&user, &state, Action::Create)?;

    let store = state
        .db
        .store_repo()
        .create(*user.principal.business_id.as_uuid(), request.name.trim())
        .await
        .map_err(store_write_error)?;

    tracing::info!(store_id = %store.id, business_id = %store.business_id, "Store created");

    Ok((
        StatusCode::CREATED,
        Json(StoreEnvelope {
            store: store.into(),
        }),
    ))
}

pub async fn get_store(
    State(state): State<Arc<AppState>>,
    user: CurrentUser,
    PathId(id): PathId,
) -> ApiResult<Json<StoreEnvelope>> {
    authorize_store(&user, &state, Action::Read)?;

    let store = business_store(&state, &user.principal, id).await?;

    Ok(Json(StoreEnvelope {
        store: store.into(),
    }))
}

/// Rename a store
pub async fn update_store(
    State(state): State<Arc<AppState>>,
    user: CurrentUser,
    PathId(id): PathId,
    ValidatedJson(request): ValidatedJson<StoreRequest>,
) -> ApiResult<Json<StoreEnvelope>> {
    authorize_store(&user, &state, Action::Update)?;

    let store = state
        .db
        .store_repo()
        .rename(*user.principal.business_id.as_uuid(), id, request.name.trim())
        .await
        .map_err(store_write_error)?;

    tracing::info!(store_id = %store.id, "Store renamed");

    Ok(Json(StoreEnvelope {
        store: store.into(),
    }))
}

/// Delete a store that no entry references
pub async fn delete_store(
    State(state): State<Arc<AppState>>,
    user: CurrentUser,
    PathId(id): PathId,
) -> ApiResult<Json<MessageResponse>> {
    authorize_store(&user, &state, Action::Delete)?;

    let store = business_store(&state, &user.principal, id).await?;

    let dependents = DependentRecords {
        income: state.db.income_repo().count_by_store(store.id).await?,
        expense: state.db.expense_repo().count_by_store(store.id).await?,
    };
    state.authorization().check_store_deletion(dependents)?;

    let deleted = state
        .db
        .store_repo()
        .delete(store.business_id, store.id)
        .await
        .map_err(store_write_error)?;
    if !deleted {
        return Err(ApiError::NotFound("Store not found".to_string()));
    }

    tracing::info!(store_id = %store.id, "Store deleted");

    Ok(Json(MessageResponse::new("Store deleted successfully")))
}
