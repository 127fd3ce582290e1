//! API Routes
//!
//! Route definitions for all API endpoints.

use axum::{
    routing::{get, post, put},
    Router,
};
use std::sync::Arc;

use crate::handlers;
use crate::state::AppState;

/// Create API v1 routes
pub fn api_v1_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/health", get(handlers::health::health_check))
        .route("/date-window", get(handlers::window::date_window))
        .nest("/auth", auth_routes())
        .nest("/stores", store_routes())
        .nest("/employees", employee_routes())
        .nest("/income", income_routes())
        .nest("/expenses", expense_routes())
}

/// Authentication routes
fn auth_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/register", post(handlers::auth::register))
        .route("/login", post(handlers::auth::login))
        .route("/logout", post(handlers::auth::logout))
        .route("/change-password", put(handlers::auth::change_password))
}

/// Store routes
fn store_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route(
            "/",
            get(handlers::store::list_stores).post(handlers::store::create_store),
        )
        .route(
            "/:id",
            get(handlers::store::get_store)
                .put(handlers::store::update_store)
                .delete(handlers::store::delete_store),
        )
}

/// Employee routes (business owners only)
fn employee_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route(
            "/",
            get(handlers::employee::list_employees).post(handlers::employee::create_employee),
        )
        .route(
            "/:id",
            put(handlers::employee::update_employee).delete(handlers::employee::delete_employee),
        )
}

/// Income entry routes
fn income_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route(
            "/",
            get(handlers::income::list_income).post(handlers::income::create_income),
        )
        .route(
            "/:id",
            put(handlers::income::update_income).delete(handlers::income::delete_income),
        )
}

/// Expense routes
fn expense_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route(
            "/",
            get(handlers::expense::list_expenses).post(handlers::expense::create_expense),
        )
        .route(
            "/:id",
            put(handlers::expense::update_expense).delete(handlers::expense::delete_expense),
        )
}
