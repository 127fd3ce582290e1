//! API Integration Tests
//!
//! Drives the router end to end against an in-memory SQLite database with
//! the clock pinned, so date-window outcomes are deterministic.

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    Router,
};
use chrono::NaiveDate;
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;

use tillbook_api::{create_test_router, AppState};
use tillbook_auth::{AuthConfig, AuthService};
use tillbook_db::Database;
use tillbook_policy::{EntryWindows, FixedClock, PolicyConfig, WindowRule};

// =============================================================================
// Helpers
// =============================================================================

fn day(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn test_auth_config() -> AuthConfig {
    let mut config = AuthConfig::default();
    config.token.secret = "test-secret-key-for-jwt-tokens-min-32-bytes!".to_string();
    // Cheap Argon2 parameters keep the suite fast
    config.password.memory_cost = 4096;
    config.password.time_cost = 1;
    config
}

async fn test_state(policy: PolicyConfig, today: NaiveDate) -> AppState {
    let db = Database::in_memory().await.expect("in-memory database");
    AppState::new(
        Arc::new(db),
        Arc::new(AuthService::new(test_auth_config())),
        policy,
    )
    .with_clock(Arc::new(FixedClock::at_noon(today)))
}

/// Router with the default policy and "today" = 2024-06-20
async fn test_router() -> Router {
    create_test_router(Arc::new(test_state(PolicyConfig::default(), day(2024, 6, 20)).await))
}

/// Test helper to make a request and get JSON response
async fn json_request(
    router: &Router,
    method: &str,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut request = Request::builder()
        .method(method)
        .uri(uri)
        .header("Content-Type", "application/json");

    if let Some(token) = token {
        request = request.header("Authorization", format!("Bearer {}", token));
    }

    let body = if let Some(json_body) = body {
        Body::from(serde_json::to_vec(&json_body).unwrap())
    } else {
        Body::empty()
    };

    let response = router
        .clone()
        .oneshot(request.body(body).unwrap())
        .await
        .unwrap();

    let status = response.status();
    let body_bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();

    let json: Value = serde_json::from_slice(&body_bytes).unwrap_or(json!(null));

    (status, json)
}

async fn register(router: &Router, company: &str, username: &str) -> String {
    let (status, body) = json_request(
        router,
        "POST",
        "/api/v1/auth/register",
        None,
        Some(json!({"companyName": company, "username": username, "password": "secret1"})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    body["token"].as_str().unwrap().to_string()
}

async fn login(router: &Router, username: &str, password: &str) -> String {
    let (status, body) = json_request(
        router,
        "POST",
        "/api/v1/auth/login",
        None,
        Some(json!({"username": username, "password": password})),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    body["token"].as_str().unwrap().to_string()
}

async fn create_store(router: &Router, token: &str, name: &str) -> String {
    let (status, body) = json_request(
        router,
        "POST",
        "/api/v1/stores",
        Some(token),
        Some(json!({"name": name})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    body["store"]["id"].as_str().unwrap().to_string()
}

async fn create_employee(router: &Router, token: &str, username: &str) -> String {
    let (status, body) = json_request(
        router,
        "POST",
        "/api/v1/employees",
        Some(token),
        Some(json!({"name": "Alice", "username": username, "password": "alice-pw"})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    body["employee"]["id"].as_str().unwrap().to_string()
}

async fn post_income(
    router: &Router,
    token: &str,
    store: &str,
    date: &str,
) -> (StatusCode, Value) {
    json_request(
        router,
        "POST",
        "/api/v1/income",
        Some(token),
        Some(json!({"date": date, "store": store, "cashIncome": 100, "posIncome": "25.50"})),
    )
    .await
}

async fn post_expense(
    router: &Router,
    token: &str,
    store: &str,
    date: &str,
) -> (StatusCode, Value) {
    json_request(
        router,
        "POST",
        "/api/v1/expenses",
        Some(token),
        Some(json!({
            "date": date,
            "description": "  Ice delivery ",
            "amount": 42.5,
            "store": store,
            "type": "expense"
        })),
    )
    .await
}

/// A business with one store and one employee
struct Shop {
    router: Router,
    owner: String,
    employee: String,
    employee_id: String,
    store: String,
}

async fn shop() -> Shop {
    let router = test_router().await;
    let owner = register(&router, "Corner Shop", "owner").await;
    let store = create_store(&router, &owner, "Main Street").await;
    let employee_id = create_employee(&router, &owner, "alice").await;
    let employee = login(&router, "alice", "alice-pw").await;
    Shop {
        router,
        owner,
        employee,
        employee_id,
        store,
    }
}

// =============================================================================
// Public Endpoints
// =============================================================================

mod public_endpoints {
    use super::*;

    #[tokio::test]
    async fn test_health() {
        let router = test_router().await;
        let (status, json) = json_request(&router, "GET", "/health", None, None).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["status"], "ok");
        assert_eq!(json["database"], true);
    }

    #[tokio::test]
    async fn test_date_window_diagnostic() {
        let router = test_router().await;
        let (status, json) = json_request(
            &router,
            "GET",
            "/api/v1/date-window?date=2024-06-04&kind=income&action=create",
            None,
            None,
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["today"], "2024-06-20");
        assert_eq!(json["window"]["earliest"], "2024-06-05");
        assert_eq!(json["window"]["latest"], "2024-06-21");
        assert_eq!(json["date"]["allowed"], false);
        assert_eq!(
            json["date"]["reason"],
            "Can only add income entries for the last 15 days"
        );
    }

    #[tokio::test]
    async fn test_date_window_malformed_date() {
        let router = test_router().await;
        let (status, json) = json_request(
            &router,
            "GET",
            "/api/v1/date-window?date=2024-13-01",
            None,
            None,
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["date"]["allowed"], false);
        assert_eq!(json["date"]["parsed"], Value::Null);
    }
}

// =============================================================================
// Authentication
// =============================================================================

mod auth {
    use super::*;

    #[tokio::test]
    async fn test_register_sets_cookie() {
        let router = test_router().await;
        let response = router
            .clone()
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/api/v1/auth/register")
                    .header("Content-Type", "application/json")
                    .body(Body::from(
                        json!({"companyName": "Corner Shop", "username": "owner", "password": "secret1"})
                            .to_string(),
                    ))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::CREATED);
        let cookie = response
            .headers()
            .get(header::SET_COOKIE)
            .and_then(|v| v.to_str().ok())
            .unwrap();
        assert!(cookie.starts_with("auth-token="));
        assert!(cookie.contains("HttpOnly"));
    }

    #[tokio::test]
    async fn test_register_validation() {
        let router = test_router().await;

        let (status, json) = json_request(
            &router,
            "POST",
            "/api/v1/auth/register",
            None,
            Some(json!({"companyName": "Corner Shop", "username": "owner", "password": "abc"})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["error"], "Password must be at least 6 characters long");

        let (status, json) = json_request(
            &router,
            "POST",
            "/api/v1/auth/register",
            None,
            Some(json!({"username": "owner", "password": "secret1"})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["error"], "Company name, username and password are required");
    }

    #[tokio::test]
    async fn test_duplicate_username_conflicts() {
        let router = test_router().await;
        let owner = register(&router, "Corner Shop", "owner").await;

        let (status, json) = json_request(
            &router,
            "POST",
            "/api/v1/auth/register",
            None,
            Some(json!({"companyName": "Other", "username": "owner", "password": "secret1"})),
        )
        .await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(json["error"], "Username already exists");

        // usernames are unique across businesses and employees
        let (status, _) = json_request(
            &router,
            "POST",
            "/api/v1/employees",
            Some(&owner),
            Some(json!({"name": "Owner Again", "username": "owner", "password": "secret1"})),
        )
        .await;
        assert_eq!(status, StatusCode::CONFLICT);
    }

    #[tokio::test]
    async fn test_login() {
        let router = test_router().await;
        register(&router, "Corner Shop", "owner").await;

        let (status, json) = json_request(
            &router,
            "POST",
            "/api/v1/auth/login",
            None,
            Some(json!({"username": "owner", "password": "secret1"})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["user"]["role"], "business");
        assert_eq!(json["user"]["name"], "Corner Shop");

        let (status, json) = json_request(
            &router,
            "POST",
            "/api/v1/auth/login",
            None,
            Some(json!({"username": "owner", "password": "wrong-pw"})),
        )
        .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(json["code"], "INVALID_CREDENTIALS");

        let (status, _) = json_request(
            &router,
            "POST",
            "/api/v1/auth/login",
            None,
            Some(json!({"username": "nobody", "password": "secret1"})),
        )
        .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_missing_and_invalid_token() {
        let router = test_router().await;

        let (status, json) = json_request(&router, "GET", "/api/v1/stores", None, None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(json["error"], "Unauthorized");

        let (status, json) =
            json_request(&router, "GET", "/api/v1/stores", Some("not-a-jwt"), None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(json["code"], "INVALID_TOKEN");
    }

    #[tokio::test]
    async fn test_logout_revokes_token() {
        let router = test_router().await;
        let token = register(&router, "Corner Shop", "owner").await;

        let (status, json) =
            json_request(&router, "POST", "/api/v1/auth/logout", Some(&token), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["message"], "Logged out successfully");

        let (status, json) = json_request(&router, "GET", "/api/v1/stores", Some(&token), None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(json["code"], "TOKEN_REVOKED");
    }

    #[tokio::test]
    async fn test_change_password() {
        let Shop {
            router, employee, ..
        } = shop().await;

        let (status, json) = json_request(
            &router,
            "PUT",
            "/api/v1/auth/change-password",
            Some(&employee),
            Some(json!({"currentPassword": "wrong-pw", "newPassword": "new-secret"})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["error"], "Current password is incorrect");

        let (status, _) = json_request(
            &router,
            "PUT",
            "/api/v1/auth/change-password",
            Some(&employee),
            Some(json!({"currentPassword": "alice-pw", "newPassword": "new"})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, _) = json_request(
            &router,
            "PUT",
            "/api/v1/auth/change-password",
            Some(&employee),
            Some(json!({"currentPassword": "alice-pw", "newPassword": "new-secret"})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);

        login(&router, "alice", "new-secret").await;
    }
}

// =============================================================================
// Stores and Employees
// =============================================================================

mod stores {
    use super::*;

    #[tokio::test]
    async fn test_store_crud() {
        let router = test_router().await;
        let owner = register(&router, "Corner Shop", "owner").await;
        let store = create_store(&router, &owner, "Main Street").await;

        let (status, json) = json_request(
            &router,
            "POST",
            "/api/v1/stores",
            Some(&owner),
            Some(json!({"name": "Main Street"})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["error"], "Store name already exists");

        let (status, json) = json_request(
            &router,
            "PUT",
            &format!("/api/v1/stores/{}", store),
            Some(&owner),
            Some(json!({"name": "High Street"})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["store"]["name"], "High Street");

        let (status, json) = json_request(&router, "GET", "/api/v1/stores", Some(&owner), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["stores"].as_array().unwrap().len(), 1);

        let (status, _) = json_request(
            &router,
            "DELETE",
            &format!("/api/v1/stores/{}", store),
            Some(&owner),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::OK);

        let (status, _) = json_request(
            &router,
            "GET",
            &format!("/api/v1/stores/{}", store),
            Some(&owner),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_employee_cannot_manage_stores() {
        let Shop {
            router,
            employee,
            store,
            ..
        } = shop().await;

        // reading is fine
        let (status, json) =
            json_request(&router, "GET", "/api/v1/stores", Some(&employee), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["stores"].as_array().unwrap().len(), 1);

        let (status, json) = json_request(
            &router,
            "POST",
            "/api/v1/stores",
            Some(&employee),
            Some(json!({"name": "Side Street"})),
        )
        .await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(json["error"], "Unauthorized");

        let (status, _) = json_request(
            &router,
            "DELETE",
            &format!("/api/v1/stores/{}", store),
            Some(&employee),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn test_other_business_store_is_not_found() {
        let Shop { router, store, .. } = shop().await;
        let rival = register(&router, "Rival Shop", "rival").await;

        let (status, _) = json_request(
            &router,
            "GET",
            &format!("/api/v1/stores/{}", store),
            Some(&rival),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, json) = post_income(&router, &rival, &store, "2024-06-20").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(json["error"], "Store not found");
    }

    #[tokio::test]
    async fn test_store_with_entries_cannot_be_deleted() {
        let Shop {
            router,
            owner,
            employee,
            store,
            ..
        } = shop().await;

        let (status, json) = post_income(&router, &employee, &store, "2024-06-19").await;
        assert_eq!(status, StatusCode::CREATED);
        let entry = json["entry"]["id"].as_str().unwrap().to_string();

        let (status, json) = json_request(
            &router,
            "DELETE",
            &format!("/api/v1/stores/{}", store),
            Some(&owner),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(json["code"], "STORE_IN_USE");
        assert_eq!(
            json["error"],
            "Cannot delete store with associated income entries or expenses"
        );

        let (status, _) = json_request(
            &router,
            "DELETE",
            &format!("/api/v1/income/{}", entry),
            Some(&employee),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::OK);

        let (status, _) = json_request(
            &router,
            "DELETE",
            &format!("/api/v1/stores/{}", store),
            Some(&owner),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
    }
}

mod employees {
    use super::*;

    #[tokio::test]
    async fn test_employee_management() {
        let Shop {
            router,
            owner,
            employee,
            employee_id,
            ..
        } = shop().await;

        let (status, json) =
            json_request(&router, "GET", "/api/v1/employees", Some(&owner), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["employees"][0]["username"], "alice");
        assert!(json["employees"][0].get("passwordHash").is_none());

        let (status, _) =
            json_request(&router, "GET", "/api/v1/employees", Some(&employee), None).await;
        assert_eq!(status, StatusCode::FORBIDDEN);

        let (status, json) = json_request(
            &router,
            "PUT",
            &format!("/api/v1/employees/{}", employee_id),
            Some(&owner),
            Some(json!({"name": "Alice Smith", "username": "alice", "password": ""})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["employee"]["name"], "Alice Smith");

        // an empty password leaves the old one in place
        login(&router, "alice", "alice-pw").await;

        let (status, _) = json_request(
            &router,
            "DELETE",
            &format!("/api/v1/employees/{}", employee_id),
            Some(&owner),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::OK);

        // the deleted employee's session no longer resolves to an account
        let (status, _) =
            json_request(&router, "GET", "/api/v1/income", Some(&employee), None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_other_business_employee_is_forbidden() {
        let Shop {
            router,
            employee_id,
            ..
        } = shop().await;
        let rival = register(&router, "Rival Shop", "rival").await;

        let (status, json) = json_request(
            &router,
            "PUT",
            &format!("/api/v1/employees/{}", employee_id),
            Some(&rival),
            Some(json!({"name": "Mallory", "username": "mallory"})),
        )
        .await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(json["error"], "Unauthorized");

        let (status, _) = json_request(
            &router,
            "DELETE",
            &format!("/api/v1/employees/{}", uuid::Uuid::new_v4()),
            Some(&rival),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }
}

// =============================================================================
// Entries: authorization and date windows
// =============================================================================

mod entries {
    use super::*;

    #[tokio::test]
    async fn test_income_window_boundaries() {
        let Shop {
            router,
            employee,
            store,
            ..
        } = shop().await;

        let (status, json) = post_income(&router, &employee, &store, "2024-06-05").await;
        assert_eq!(status, StatusCode::CREATED, "{json}");
        assert_eq!(json["entry"]["date"], "2024-06-05");
        assert_eq!(json["entry"]["totalIncome"], 125.5);
        assert_eq!(json["entry"]["storeName"], "Main Street");

        let (status, json) = post_income(&router, &employee, &store, "2024-06-04").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["code"], "DATE_OUT_OF_WINDOW");
        assert_eq!(json["error"], "Can only add income entries for the last 15 days");

        // one day of slack ahead of today
        let (status, _) = post_income(&router, &employee, &store, "2024-06-21").await;
        assert_eq!(status, StatusCode::CREATED);
        let (status, _) = post_income(&router, &employee, &store, "2024-06-22").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, json) = post_income(&router, &employee, &store, "2024-6-5T00:00").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["code"], "INVALID_DATE");
    }

    #[tokio::test]
    async fn test_listing_is_scoped_by_role() {
        let Shop {
            router,
            owner,
            employee,
            store,
            ..
        } = shop().await;

        post_income(&router, &employee, &store, "2024-06-10").await;
        post_income(&router, &employee, &store, "2024-06-18").await;
        post_income(&router, &owner, &store, "2024-06-15").await;

        let (status, json) =
            json_request(&router, "GET", "/api/v1/income", Some(&employee), None).await;
        assert_eq!(status, StatusCode::OK);
        let entries = json["entries"].as_array().unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0]["date"], "2024-06-18");

        let (_, json) = json_request(&router, "GET", "/api/v1/income", Some(&owner), None).await;
        assert_eq!(json["entries"].as_array().unwrap().len(), 3);

        let (_, json) = json_request(
            &router,
            "GET",
            "/api/v1/income?startDate=2024-06-15&endDate=2024-06-18",
            Some(&owner),
            None,
        )
        .await;
        assert_eq!(json["entries"].as_array().unwrap().len(), 2);

        let (status, _) = json_request(
            &router,
            "GET",
            "/api/v1/income?startDate=yesterday&endDate=2024-06-18",
            Some(&owner),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_owner_cannot_edit_employee_income() {
        let Shop {
            router,
            owner,
            employee,
            store,
            ..
        } = shop().await;

        let (_, json) = post_income(&router, &employee, &store, "2024-06-19").await;
        let entry = json["entry"]["id"].as_str().unwrap().to_string();

        let (status, json) = json_request(
            &router,
            "PUT",
            &format!("/api/v1/income/{}", entry),
            Some(&owner),
            Some(json!({"cashIncome": 1})),
        )
        .await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(json["error"], "Unauthorized");

        let (status, json) = json_request(
            &router,
            "PUT",
            &format!("/api/v1/income/{}", entry),
            Some(&employee),
            Some(json!({"cashIncome": 80, "lotteryTicketIncome": 20})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["entry"]["totalIncome"], 100.0);
        // omitted amounts reset to zero
        assert_eq!(json["entry"]["posIncome"], 0.0);
    }

    #[tokio::test]
    async fn test_stale_income_cannot_be_deleted() {
        let state = test_state(PolicyConfig::default(), day(2024, 6, 20)).await;
        let router = create_test_router(Arc::new(state.clone()));
        let owner = register(&router, "Corner Shop", "owner").await;
        let store = create_store(&router, &owner, "Main Street").await;
        let (_, json) = post_income(&router, &owner, &store, "2024-06-05").await;
        let entry = json["entry"]["id"].as_str().unwrap().to_string();

        // five days later the entry has left the window
        let later = create_test_router(Arc::new(
            state.with_clock(Arc::new(FixedClock::at_noon(day(2024, 6, 25)))),
        ));

        let (status, json) = json_request(
            &later,
            "DELETE",
            &format!("/api/v1/income/{}", entry),
            Some(&owner),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["error"], "Cannot delete entries older than 15 days");

        let (status, json) = json_request(
            &later,
            "PUT",
            &format!("/api/v1/income/{}", entry),
            Some(&owner),
            Some(json!({"cashIncome": 5})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["error"], "Cannot edit entries older than 15 days");
    }

    #[tokio::test]
    async fn test_expense_ownership_and_window() {
        let Shop {
            router,
            owner,
            employee,
            store,
            ..
        } = shop().await;

        let (status, json) = post_expense(&router, &employee, &store, "2024-06-18").await;
        assert_eq!(status, StatusCode::CREATED, "{json}");
        assert_eq!(json["entry"]["description"], "Ice delivery");
        assert_eq!(json["entry"]["type"], "expense");
        let entry = json["entry"]["id"].as_str().unwrap().to_string();

        let update = |date: &str| {
            json!({
                "date": date,
                "description": "Ice delivery",
                "amount": 40,
                "store": store.clone(),
                "type": "payment"
            })
        };

        let (status, json) = json_request(
            &router,
            "PUT",
            &format!("/api/v1/expenses/{}", entry),
            Some(&owner),
            Some(update("2024-06-18")),
        )
        .await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(json["error"], "Cannot edit other users expenses");

        let (status, json) = json_request(
            &router,
            "DELETE",
            &format!("/api/v1/expenses/{}", entry),
            Some(&owner),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(json["error"], "Cannot delete other users expenses");

        let (status, json) = json_request(
            &router,
            "PUT",
            &format!("/api/v1/expenses/{}", entry),
            Some(&employee),
            Some(update("2024-06-01")),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["error"], "Can only edit expenses for the last 15 days");

        let (status, json) = json_request(
            &router,
            "PUT",
            &format!("/api/v1/expenses/{}", entry),
            Some(&employee),
            Some(update("2024-06-07")),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["entry"]["date"], "2024-06-07");
        assert_eq!(json["entry"]["type"], "payment");
        assert_eq!(json["entry"]["amount"], 40.0);

        let mut body = update("2024-06-07");
        body["type"] = json!("refund");
        let (status, json) = json_request(
            &router,
            "PUT",
            &format!("/api/v1/expenses/{}", entry),
            Some(&employee),
            Some(body),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["error"], "Type must be either expense or payment");
    }

    #[tokio::test]
    async fn test_negative_amount_rejected() {
        let Shop {
            router,
            employee,
            store,
            ..
        } = shop().await;

        let (status, json) = json_request(
            &router,
            "POST",
            "/api/v1/expenses",
            Some(&employee),
            Some(json!({"date": "2024-06-20", "description": "Refund", "amount": -3, "store": store})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["code"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn test_expense_edits_owner_only() {
        let policy = PolicyConfig {
            expense_edits_owner_only: true,
            ..Default::default()
        };
        let router =
            create_test_router(Arc::new(test_state(policy, day(2024, 6, 20)).await));
        let owner = register(&router, "Corner Shop", "owner").await;
        let store = create_store(&router, &owner, "Main Street").await;
        create_employee(&router, &owner, "alice").await;
        let employee = login(&router, "alice", "alice-pw").await;

        let (_, json) = post_expense(&router, &employee, &store, "2024-06-18").await;
        let entry = json["entry"]["id"].as_str().unwrap().to_string();

        let (status, json) = json_request(
            &router,
            "DELETE",
            &format!("/api/v1/expenses/{}", entry),
            Some(&employee),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(json["error"], "Only business owners can delete expenses");

        // the owner's own expenses stay editable
        let (_, json) = post_expense(&router, &owner, &store, "2024-06-18").await;
        let own = json["entry"]["id"].as_str().unwrap().to_string();
        let (status, _) = json_request(
            &router,
            "DELETE",
            &format!("/api/v1/expenses/{}", own),
            Some(&owner),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
    }

    #[tokio::test]
    async fn test_calendar_month_window() {
        let policy = PolicyConfig {
            expense: EntryWindows::uniform(WindowRule::previous_and_current_month()),
            ..Default::default()
        };
        let router =
            create_test_router(Arc::new(test_state(policy, day(2024, 3, 15)).await));
        let owner = register(&router, "Corner Shop", "owner").await;
        let store = create_store(&router, &owner, "Main Street").await;

        let (status, _) = post_expense(&router, &owner, &store, "2024-02-01").await;
        assert_eq!(status, StatusCode::CREATED);
        let (status, _) = post_expense(&router, &owner, &store, "2024-03-31").await;
        assert_eq!(status, StatusCode::CREATED);

        let (status, json) = post_expense(&router, &owner, &store, "2024-01-31").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(
            json["error"],
            "Can only add expenses for the last month and current month"
        );
        let (status, _) = post_expense(&router, &owner, &store, "2024-04-01").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_unknown_entry_is_not_found() {
        let Shop { router, owner, .. } = shop().await;

        let (status, json) = json_request(
            &router,
            "DELETE",
            &format!("/api/v1/income/{}", uuid::Uuid::new_v4()),
            Some(&owner),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(json["error"], "Entry not found");

        let (status, _) =
            json_request(&router, "DELETE", "/api/v1/income/not-an-id", Some(&owner), None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }
}
