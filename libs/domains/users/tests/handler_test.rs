//! Handler tests for the Users domain
//!
//! Exercise the users router on its own, backed by the in-memory
//! repository: status codes, response shapes and validation messages.

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use domain_users::*;
use http_body_util::BodyExt;
use serde_json::{Value, json};
use tower::ServiceExt; // For oneshot()

fn app() -> Router {
    handlers::router(UserService::new(InMemoryUserRepository::new()))
}

async fn send(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    let body = match body {
        Some(json) => {
            builder = builder.header("content-type", "application/json");
            Body::from(serde_json::to_vec(&json).unwrap())
        }
        None => Body::empty(),
    };

    let response = app.clone().oneshot(builder.body(body).unwrap()).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

fn signup(name: &str, email: &str) -> Value {
    json!({
        "name": name,
        "email": email,
        "password": "password123",
        "password_confirmation": "password123"
    })
}

#[tokio::test]
async fn test_create_without_password_returns_422() {
    let app = app();

    let (status, body) = send(&app, "POST", "/", Some(json!({"name": "A", "email": "a@x.com"}))).await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["error"], "VALIDATION_ERROR");
    assert_eq!(body["details"]["password"][0], "Password is required");
    assert!(body["message"].as_str().unwrap().starts_with("Password is required"));
}

#[tokio::test]
async fn test_create_then_show_hides_password() {
    let app = app();

    let (status, created) = send(&app, "POST", "/", Some(signup("Alice", "alice@x.com"))).await;
    assert_eq!(status, StatusCode::CREATED);

    let id = created["id"].as_str().unwrap();
    let (status, shown) = send(&app, "GET", &format!("/{id}"), None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(shown["name"], "Alice");
    assert_eq!(shown["email"], "alice@x.com");
    assert!(shown.get("password").is_none());
    assert!(shown.get("password_hash").is_none());
    assert!(shown["created_at"].is_string());
}

#[tokio::test]
async fn test_duplicate_email_names_email_field() {
    let app = app();
    send(&app, "POST", "/", Some(signup("Alice", "alice@x.com"))).await;

    let (status, body) = send(&app, "POST", "/", Some(signup("Other", "ALICE@x.com"))).await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["details"]["email"][0], "This email is already registered");
}

#[tokio::test]
async fn test_mismatched_confirmation_persists_nothing() {
    let app = app();
    let mut payload = signup("Alice", "alice@x.com");
    payload["password_confirmation"] = json!("something-else");

    let (status, body) = send(&app, "POST", "/", Some(payload)).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["details"]["password"][0], "Password confirmation does not match");

    let (_, list) = send(&app, "GET", "/", None).await;
    assert_eq!(list["meta"]["total"], 0);
}

#[tokio::test]
async fn test_delete_twice_returns_404() {
    let app = app();
    let (_, created) = send(&app, "POST", "/", Some(signup("Alice", "alice@x.com"))).await;
    let uri = format!("/{}", created["id"].as_str().unwrap());

    let (status, body) = send(&app, "DELETE", &uri, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "User deleted successfully");

    let (status, body) = send(&app, "DELETE", &uri, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "NOT_FOUND");
}

#[tokio::test]
async fn test_malformed_id_is_not_found() {
    let (status, _) = send(&app(), "GET", "/not-a-uuid", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_pagination_splits_twenty_users() {
    let app = app();
    for i in 0..20 {
        let (status, _) = send(
            &app,
            "POST",
            "/",
            Some(signup(&format!("User {i:02}"), &format!("user{i}@x.com"))),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
    }

    let (_, first) = send(&app, "GET", "/?per_page=15&page=1", None).await;
    let (_, second) = send(&app, "GET", "/?per_page=15&page=2", None).await;

    assert_eq!(first["data"].as_array().unwrap().len(), 15);
    assert_eq!(second["data"].as_array().unwrap().len(), 5);
    assert_eq!(first["data"][0]["name"], "User 00");
    assert_eq!(second["data"][0]["name"], "User 15");
    assert_eq!(second["meta"]["last_page"], 2);
    assert_eq!(second["meta"]["from"], 16);
    assert_eq!(second["meta"]["to"], 20);
}

#[tokio::test]
async fn test_search_matches_name_substring() {
    let app = app();
    send(&app, "POST", "/", Some(signup("Alice", "alice@x.com"))).await;
    send(&app, "POST", "/", Some(signup("Bob", "bob@x.com"))).await;

    let (status, body) = send(&app, "GET", "/?search=ali", None).await;

    assert_eq!(status, StatusCode::OK);
    let data = body["data"].as_array().unwrap();
    assert_eq!(data.len(), 1);
    assert_eq!(data[0]["name"], "Alice");
}

#[tokio::test]
async fn test_patch_updates_only_sent_fields() {
    let app = app();
    let (_, created) = send(&app, "POST", "/", Some(signup("Alice", "alice@x.com"))).await;
    let uri = format!("/{}", created["id"].as_str().unwrap());

    let (status, updated) = send(&app, "PATCH", &uri, Some(json!({"name": "Alicia"}))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["name"], "Alicia");
    assert_eq!(updated["email"], "alice@x.com");

    let (status, body) = send(&app, "PUT", &uri, Some(json!({"email": "nope"}))).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["details"]["email"][0], "Please provide a valid email address");
}

#[tokio::test]
async fn test_update_missing_user_returns_404() {
    let uri = format!("/{}", uuid::Uuid::now_v7());
    let (status, _) = send(&app(), "PUT", &uri, Some(json!({"name": "Nobody"}))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_non_object_body_is_bad_request() {
    let (status, body) = send(&app(), "POST", "/", Some(json!([1, 2, 3]))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "INVALID_JSON");
}

#[tokio::test]
async fn test_update_with_non_string_confirmation_returns_422() {
    let app = app();
    let (_, created) = send(&app, "POST", "/", Some(signup("Alice", "alice@x.com"))).await;
    let uri = format!("/{}", created["id"].as_str().unwrap());

    let (status, body) = send(
        &app,
        "PATCH",
        &uri,
        Some(json!({"name": "X", "password_confirmation": 123})),
    )
    .await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(
        body["details"]["password_confirmation"][0],
        "The password confirmation field must be a string."
    );

    let (_, unchanged) = send(&app, "GET", &uri, None).await;
    assert_eq!(unchanged["name"], "Alice");
}

#[tokio::test]
async fn test_out_of_range_page_returns_empty_list() {
    let app = app();
    send(&app, "POST", "/", Some(signup("Alice", "alice@x.com"))).await;

    let (status, body) = send(&app, "GET", "/?page=18446744073709551615", None).await;

    assert_eq!(status, StatusCode::OK);
    assert!(body["data"].as_array().unwrap().is_empty());
    assert_eq!(body["meta"]["total"], 1);
}
