//! Employee Handlers
//!
//! Business owners manage the employee accounts of their own business.

use axum::{extract::State, http::StatusCode, Json};
use std::sync::Arc;
use uuid::Uuid;

use tillbook_db::DbUser;
use tillbook_policy::{Action, Target};
use tillbook_types::{BusinessId, Role};

use crate::dto::{
    CreateEmployeeRequest, EmployeeEnvelope, EmployeeListResponse, EmployeeResponse,
    MessageResponse, UpdateEmployeeRequest,
};
use crate::error::{ApiError, ApiResult};
use crate::extractors::{CurrentUser, PathId, ValidatedJson};
use crate::handlers::auth::username_taken;
use crate::state::AppState;

fn authorize_employees(
    state: &AppState,
    user: &CurrentUser,
    action: Action,
    business_id: BusinessId,
) -> ApiResult<()> {
    state
        .authorization()
        .authorize(Some(&user.principal), action, Target::Employee { business_id })
        .into_result()?;
    Ok(())
}

/// Fetch an employee by id, then check it belongs to the caller's business
async fn fetch_employee(
    state: &AppState,
    user: &CurrentUser,
    action: Action,
    id: Uuid,
) -> ApiResult<DbUser> {
    let employee = state
        .db
        .user_repo()
        .find_by_id(id)
        .await?
        .filter(|account| account.role == Role::Employee.as_str())
        .ok_or_else(|| ApiError::NotFound("Employee not found".to_string()))?;

    authorize_employees(
        state,
        user,
        action,
        BusinessId::from_uuid(employee.business_id),
    )?;

    Ok(employee)
}

pub async fn list_employees(
    State(state): State<Arc<AppState>>,
    user: CurrentUser,
) -> ApiResult<Json<EmployeeListResponse>> {
    authorize_employees(&state, &user, Action::Read, user.principal.business_id)?;

    let employees = state
        .db
        .user_repo()
        .list_employees(*user.principal.business_id.as_uuid())
        .await?;

    Ok(Json(EmployeeListResponse {
        employees: employees.into_iter().map(EmployeeResponse::from).collect(),
    }))
}

pub async fn create_employee(
    State(state): State<Arc<AppState>>,
    user: CurrentUser,
    ValidatedJson(request): ValidatedJson<CreateEmployeeRequest>,
) -> ApiResult<(StatusCode, Json<EmployeeEnvelope>)> {
    authorize_employees(&state, &user, Action::Create, user.principal.business_id)?;

    let password_hash = state.auth.password.hash_password(&request.password)?;

    let employee = state
        .db
        .user_repo()
        .create_employee(
            *user.principal.business_id.as_uuid(),
            request.name.trim(),
            request.username.trim(),
            &password_hash,
        )
        .await
        .map_err(username_taken)?;

    tracing::info!(
        employee_id = %employee.id,
        business_id = %employee.business_id,
        "Employee created"
    );

    Ok((
        StatusCode::CREATED,
        Json(EmployeeEnvelope {
            employee: employee.into(),
        }),
    ))
}

/// Update name and username, and the password when one is given
pub async fn update_employee(
    State(state): State<Arc<AppState>>,
    user: CurrentUser,
    PathId(id): PathId,
    ValidatedJson(request): ValidatedJson<UpdateEmployeeRequest>,
) -> ApiResult<Json<EmployeeEnvelope>> {
    let employee = fetch_employee(&state, &user, Action::Update, id).await?;

    let password_hash = request
        .new_password()
        .map(|password| state.auth.password.hash_password(password))
        .transpose()?;

    let employee = state
        .db
        .user_repo()
        .update_employee(
            employee.business_id,
            employee.id,
            request.name.trim(),
            request.username.trim(),
            password_hash.as_deref(),
        )
        .await
        .map_err(username_taken)?;

    tracing::info!(
        employee_id = %employee.id,
        password_changed = password_hash.is_some(),
        "Employee updated"
    );

    Ok(Json(EmployeeEnvelope {
        employee: employee.into(),
    }))
}

pub async fn delete_employee(
    State(state): State<Arc<AppState>>,
    user: CurrentUser,
    PathId(id): PathId,
) -> ApiResult<Json<MessageResponse>> {
    let employee = fetch_employee(&state, &user, Action::Delete, id).await?;

    let deleted = state
        .db
        .user_repo()
        .delete_employee(employee.business_id, employee.id)
        .await?;
    if !deleted {
        return Err(ApiError::NotFound("Employee not found".to_string()));
    }

    tracing::info!(employee_id = %employee.id, "Employee deleted");

    Ok(Json(MessageResponse::new("Employee deleted successfully")))
}
