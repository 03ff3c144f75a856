//! Router-level tests against the in-memory store

use std::sync::Arc;

use async_trait::async_trait;
use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use spendctl_server::models::{
    Category, Expense, ExpenseFilter, ExpensePatch, Name, NewExpense, User,
};
use spendctl_server::{build_router, AppState, DbError, MemoryStore, Store};
use tower::ServiceExt;

/// Route handler logs to the test writer; shown only when a test fails.
fn init_logging() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter("spendctl_server=debug,tower_http=debug")
        .with_test_writer()
        .try_init();
}

fn app() -> Router {
    init_logging();
    build_router(AppState::new(Arc::new(MemoryStore::new())))
}

async fn send(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(json) => builder
            .header("content-type", "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

async fn create_user(app: &Router, name: &str) -> i64 {
    let (status, body) = send(app, "POST", "/users", Some(json!({ "name": name }))).await;
    assert_eq!(status, StatusCode::CREATED);
    body["id"].as_i64().unwrap()
}

async fn create_expense(app: &Router, expense: Value) -> Value {
    let (status, body) = send(app, "POST", "/expenses", Some(expense)).await;
    assert_eq!(status, StatusCode::CREATED, "body: {body}");
    body
}

fn titles(list: &Value) -> Vec<&str> {
    list.as_array()
        .unwrap()
        .iter()
        .map(|e| e["title"].as_str().unwrap())
        .collect()
}

// === Health ===

#[tokio::test]
async fn health_is_ok() {
    let app = app();
    let (status, body) = send(&app, "GET", "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["store"], "memory");
}

// === Users ===

#[tokio::test]
async fn created_user_is_retrievable() {
    let app = app();
    let (status, created) = send(&app, "POST", "/users", Some(json!({ "name": "Ada" }))).await;
    assert_eq!(status, StatusCode::CREATED);
    let id = created["id"].as_i64().unwrap();

    let (status, fetched) = send(&app, "GET", &format!("/users/{id}"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched, json!({ "id": id, "name": "Ada" }));
}

#[tokio::test]
async fn user_without_name_is_rejected_and_not_stored() {
    let app = app();

    let (status, body) = send(&app, "POST", "/users", Some(json!({}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({ "error": "Name is required" }));

    let (status, body) = send(&app, "POST", "/users", Some(json!({ "name": "  " }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({ "error": "Name is required" }));

    let (status, list) = send(&app, "GET", "/users", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(list, json!([]));
}

#[tokio::test]
async fn users_list_in_insertion_order() {
    let app = app();
    create_user(&app, "first").await;
    create_user(&app, "second").await;

    let (_, list) = send(&app, "GET", "/users", None).await;
    let names: Vec<_> = list
        .as_array()
        .unwrap()
        .iter()
        .map(|u| u["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["first", "second"]);
}

#[tokio::test]
async fn rename_user() {
    let app = app();
    let id = create_user(&app, "Ada").await;

    let uri = format!("/users/{id}");
    let (status, body) = send(&app, "PATCH", &uri, Some(json!({ "name": "Ada L." }))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "id": id, "name": "Ada L." }));

    let (status, _) = send(&app, "PATCH", &uri, Some(json!({}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(&app, "PATCH", "/users/999", Some(json!({ "name": "x" }))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn invalid_user_id_is_bad_request() {
    let app = app();
    let (status, body) = send(&app, "GET", "/users/abc", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({ "error": "Bad request" }));

    let (status, _) = send(&app, "DELETE", "/users/0", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn malformed_body_is_bad_request() {
    let app = app();
    let request = Request::builder()
        .method("POST")
        .uri("/users")
        .header("content-type", "application/json")
        .body(Body::from("{not json"))
        .unwrap();
    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let (status, body) = send(&app, "POST", "/users", Some(json!({ "name": 12 }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().starts_with("Bad request"));
}

// === Deletes ===

#[tokio::test]
async fn deleting_missing_records_is_not_found() {
    let app = app();
    for uri in ["/users/41", "/expenses/42", "/categories/43"] {
        let (status, body) = send(&app, "DELETE", uri, None).await;
        assert_eq!(status, StatusCode::NOT_FOUND, "{uri}");
        assert_eq!(body, json!({ "error": "Not found" }));
    }
}

#[tokio::test]
async fn delete_returns_no_content_then_get_is_not_found() {
    let app = app();
    let user = create_user(&app, "Ada").await;
    let expense = create_expense(
        &app,
        json!({ "userId": user, "spentAt": "2024-01-02", "title": "Tea", "amount": 2 }),
    )
    .await;
    let (_, category) = send(&app, "POST", "/categories", Some(json!({ "name": "food" }))).await;

    let uris = [
        format!("/expenses/{}", expense["id"]),
        format!("/categories/{}", category["id"]),
        format!("/users/{user}"),
    ];
    for uri in &uris {
        let (status, body) = send(&app, "DELETE", uri, None).await;
        assert_eq!(status, StatusCode::NO_CONTENT);
        assert_eq!(body, Value::Null);

        let (status, _) = send(&app, "GET", uri, None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }
}

#[tokio::test]
async fn deleting_user_keeps_their_expenses() {
    let app = app();
    let user = create_user(&app, "Ada").await;
    let expense = create_expense(
        &app,
        json!({ "userId": user, "spentAt": "2024-01-02", "title": "Tea", "amount": 2 }),
    )
    .await;

    let (status, _) = send(&app, "DELETE", &format!("/users/{user}"), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = send(&app, "GET", &format!("/expenses/{}", expense["id"]), None).await;
    assert_eq!(status, StatusCode::OK);
}

// === Categories ===

#[tokio::test]
async fn category_update_without_name_is_bad_request_even_if_missing() {
    let app = app();
    let (_, category) = send(&app, "POST", "/categories", Some(json!({ "name": "food" }))).await;

    let existing = format!("/categories/{}", category["id"]);
    let (status, _) = send(&app, "PATCH", &existing, Some(json!({}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(&app, "PATCH", "/categories/999", Some(json!({}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn category_crud() {
    let app = app();
    let (status, created) =
        send(&app, "POST", "/categories", Some(json!({ "name": "travel" }))).await;
    assert_eq!(status, StatusCode::CREATED);
    let uri = format!("/categories/{}", created["id"]);

    let (status, renamed) = send(&app, "PATCH", &uri, Some(json!({ "name": "trips" }))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(renamed["name"], "trips");

    let (status, fetched) = send(&app, "GET", &uri, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched, renamed);

    let (status, _) = send(&app, "PATCH", "/categories/999", Some(json!({ "name": "x" }))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn duplicate_category_names_are_allowed() {
    let app = app();
    for _ in 0..2 {
        let (status, _) = send(&app, "POST", "/categories", Some(json!({ "name": "food" }))).await;
        assert_eq!(status, StatusCode::CREATED);
    }
    let (_, list) = send(&app, "GET", "/categories", None).await;
    assert_eq!(list.as_array().unwrap().len(), 2);
}

// === Expenses ===

#[tokio::test]
async fn expense_for_unknown_user_is_bad_request() {
    let app = app();
    let (status, body) = send(
        &app,
        "POST",
        "/expenses",
        Some(json!({ "userId": 77, "spentAt": "2024-01-02", "title": "Tea", "amount": 2 })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({ "error": "Bad Request" }));
}

#[tokio::test]
async fn expense_missing_field_is_bad_request() {
    let app = app();
    let user = create_user(&app, "Ada").await;
    let (status, body) = send(
        &app,
        "POST",
        "/expenses",
        Some(json!({ "userId": user, "spentAt": "2024-01-02", "amount": 2 })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({ "error": "Bad Request" }));
}

#[tokio::test]
async fn created_expense_is_retrievable() {
    let app = app();
    let user = create_user(&app, "Ada").await;
    let created = create_expense(
        &app,
        json!({
            "userId": user,
            "spentAt": "2024-01-15T12:30:00Z",
            "title": "Lunch",
            "amount": 12.5,
            "category": "food",
            "note": "with Bo"
        }),
    )
    .await;

    assert_eq!(created["userId"], user);
    assert_eq!(created["title"], "Lunch");
    assert_eq!(created["amount"], 12.5);
    assert_eq!(created["category"], "food");
    assert_eq!(created["spentAt"], "2024-01-15T12:30:00Z");

    let (status, fetched) = send(&app, "GET", &format!("/expenses/{}", created["id"]), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched, created);
}

#[tokio::test]
async fn expense_list_filters() {
    let app = app();
    let ada = create_user(&app, "Ada").await;
    let bo = create_user(&app, "Bo").await;

    for (user, day, title, category) in [
        (ada, "2023-12-31T23:00:00Z", "nye", Some("food")),
        (ada, "2024-01-01T00:00:00Z", "new year", Some("food")),
        (ada, "2024-01-15T10:00:00Z", "train", Some("travel")),
        (bo, "2024-01-20T10:00:00Z", "rent", Some("home")),
        (bo, "2024-01-31T22:00:00Z", "late snack", Some("food")),
        (ada, "2024-01-25T10:00:00Z", "misc", None),
        (ada, "2024-02-01T00:00:00Z", "feb", Some("food")),
    ] {
        create_expense(
            &app,
            json!({ "userId": user, "spentAt": day, "title": title, "amount": 1, "category": category }),
        )
        .await;
    }

    let (status, all) = send(&app, "GET", "/expenses", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(all.as_array().unwrap().len(), 7);

    let (_, january) = send(&app, "GET", "/expenses?from=2024-01-01&to=2024-01-31", None).await;
    assert_eq!(
        titles(&january),
        vec!["new year", "train", "rent", "late snack", "misc"]
    );

    let (_, food_travel) = send(
        &app,
        "GET",
        "/expenses?from=2024-01-01&to=2024-01-31&categories=food,travel",
        None,
    )
    .await;
    assert_eq!(titles(&food_travel), vec!["new year", "train", "late snack"]);

    let (_, ada_only) = send(
        &app,
        "GET",
        &format!("/expenses?userId={ada}&categories=food,%20travel"),
        None,
    )
    .await;
    assert_eq!(titles(&ada_only), vec!["nye", "new year", "train", "feb"]);

    let (_, open_ended) = send(&app, "GET", "/expenses?from=2024-01-25", None).await;
    assert_eq!(titles(&open_ended), vec!["late snack", "misc", "feb"]);
}

#[tokio::test]
async fn invalid_filter_is_bad_request() {
    let app = app();
    let (status, body) = send(&app, "GET", "/expenses?from=yesterday", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().starts_with("from"));

    let (status, _) = send(&app, "GET", "/expenses?userId=abc", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn partial_update_changes_only_amount() {
    let app = app();
    let user = create_user(&app, "Ada").await;
    let created = create_expense(
        &app,
        json!({
            "userId": user,
            "spentAt": "2024-01-15T12:30:00Z",
            "title": "Lunch",
            "amount": 12.5,
            "category": "food",
            "note": "with Bo"
        }),
    )
    .await;

    let uri = format!("/expenses/{}", created["id"]);
    let (status, updated) = send(&app, "PATCH", &uri, Some(json!({ "amount": 42 }))).await;
    assert_eq!(status, StatusCode::OK);

    let mut expected = created.clone();
    expected["amount"] = json!(42.0);
    assert_eq!(updated, expected);

    let (_, fetched) = send(&app, "GET", &uri, None).await;
    assert_eq!(fetched, expected);
}

#[tokio::test]
async fn update_can_clear_category_and_ignores_unknown_fields() {
    let app = app();
    let user = create_user(&app, "Ada").await;
    let created = create_expense(
        &app,
        json!({ "userId": user, "spentAt": "2024-01-02", "title": "Tea", "amount": 2, "category": "food" }),
    )
    .await;
    let uri = format!("/expenses/{}", created["id"]);

    let (status, updated) = send(
        &app,
        "PATCH",
        &uri,
        Some(json!({ "category": null, "colour": "red" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(updated["category"].is_null());
    assert!(updated.get("colour").is_none());
}

#[tokio::test]
async fn update_without_valid_fields_is_bad_request() {
    let app = app();
    let (status, body) = send(&app, "PATCH", "/expenses/5", Some(json!({ "colour": "red" }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({ "error": "No valid fields to update" }));
}

#[tokio::test]
async fn update_missing_expense_is_not_found() {
    let app = app();
    let (status, _) = send(&app, "PATCH", "/expenses/5", Some(json!({ "amount": 1 }))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn update_to_unknown_user_is_bad_request() {
    let app = app();
    let user = create_user(&app, "Ada").await;
    let created = create_expense(
        &app,
        json!({ "userId": user, "spentAt": "2024-01-02", "title": "Tea", "amount": 2 }),
    )
    .await;

    let uri = format!("/expenses/{}", created["id"]);
    let (status, body) = send(&app, "PATCH", &uri, Some(json!({ "userId": 999 }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Bad Request");
}

// === Storage failures ===

/// Store whose every call fails as if the pool were exhausted
struct UnavailableStore;

fn unavailable<T>() -> Result<T, DbError> {
    Err(DbError::Sqlx(sqlx::Error::PoolTimedOut))
}

#[async_trait]
impl Store for UnavailableStore {
    fn backend(&self) -> &'static str {
        "unavailable"
    }

    async fn list_users(&self) -> Result<Vec<User>, DbError> {
        unavailable()
    }
    async fn create_user(&self, _: &Name) -> Result<User, DbError> {
        unavailable()
    }
    async fn get_user(&self, _: i64) -> Result<Option<User>, DbError> {
        unavailable()
    }
    async fn rename_user(&self, _: i64, _: &Name) -> Result<u64, DbError> {
        unavailable()
    }
    async fn delete_user(&self, _: i64) -> Result<u64, DbError> {
        unavailable()
    }

    async fn list_expenses(&self, _: &ExpenseFilter) -> Result<Vec<Expense>, DbError> {
        unavailable()
    }
    async fn create_expense(&self, _: &NewExpense) -> Result<Expense, DbError> {
        unavailable()
    }
    async fn get_expense(&self, _: i64) -> Result<Option<Expense>, DbError> {
        unavailable()
    }
    async fn update_expense(&self, _: i64, _: &ExpensePatch) -> Result<u64, DbError> {
        unavailable()
    }
    async fn delete_expense(&self, _: i64) -> Result<u64, DbError> {
        unavailable()
    }

    async fn list_categories(&self) -> Result<Vec<Category>, DbError> {
        unavailable()
    }
    async fn create_category(&self, _: &Name) -> Result<Category, DbError> {
        unavailable()
    }
    async fn get_category(&self, _: i64) -> Result<Option<Category>, DbError> {
        unavailable()
    }
    async fn rename_category(&self, _: i64, _: &Name) -> Result<u64, DbError> {
        unavailable()
    }
    async fn delete_category(&self, _: i64) -> Result<u64, DbError> {
        unavailable()
    }
}

#[tokio::test]
async fn storage_failure_is_internal_error_on_every_route() {
    init_logging();
    let app = build_router(AppState::new(Arc::new(UnavailableStore)));
    let name = json!({ "name": "Ada" });
    let expense = json!({ "userId": 1, "spentAt": "2024-01-02", "title": "Tea", "amount": 2 });

    let calls = [
        ("GET", "/users", None),
        ("POST", "/users", Some(name.clone())),
        ("GET", "/users/1", None),
        ("PATCH", "/users/1", Some(name.clone())),
        ("DELETE", "/users/1", None),
        ("GET", "/expenses?userId=1&from=2024-01-01", None),
        ("POST", "/expenses", Some(expense)),
        ("GET", "/expenses/1", None),
        ("PATCH", "/expenses/1", Some(json!({ "amount": 42 }))),
        ("DELETE", "/expenses/1", None),
        ("GET", "/categories", None),
        ("POST", "/categories", Some(name.clone())),
        ("GET", "/categories/1", None),
        ("PATCH", "/categories/1", Some(name)),
        ("DELETE", "/categories/1", None),
    ];

    for (method, uri, body) in calls {
        let (status, body) = send(&app, method, uri, body).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR, "{method} {uri}");
        assert_eq!(body, json!({ "error": "Internal Server Error" }), "{method} {uri}");
    }

    // Health never touches storage
    let (status, body) = send(&app, "GET", "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["store"], "unavailable");
}

#[tokio::test]
async fn expense_body_with_wrong_types_is_rejected_like_any_bad_expense() {
    let app = app();
    let user = create_user(&app, "Ada").await;

    let (status, body) = send(
        &app,
        "POST",
        "/expenses",
        Some(json!({ "userId": user.to_string(), "spentAt": "2024-01-02", "title": "Tea", "amount": 2 })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({ "error": "Bad Request" }));

    let request = Request::builder()
        .method("POST")
        .uri("/expenses")
        .header("content-type", "application/json")
        .body(Body::from("{\"userId\": "))
        .unwrap();
    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body, json!({ "error": "Bad Request" }));
}
