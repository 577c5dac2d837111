//! Handler tests for signup, login, logout and me.

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use axum::middleware::from_fn_with_state;
use axum_helpers::{InMemoryTokenStore, JwtAuth, JwtConfig, jwt_auth_middleware};
use domain_users::*;
use http_body_util::BodyExt;
use serde_json::{Value, json};
use std::sync::Arc;
use tower::ServiceExt;

fn app() -> Router {
    let jwt = JwtAuth::new(
        &JwtConfig::new("auth-handler-test-secret-0123456789").unwrap(),
        Arc::new(InMemoryTokenStore::new()),
    );
    let service = Arc::new(UserService::new(InMemoryUserRepository::new()));
    let state = AuthState::new(service, jwt.clone()).with_secure_cookies(false);

    auth_handlers::public_router(state.clone()).merge(
        auth_handlers::protected_router(state)
            .route_layer(from_fn_with_state(jwt, jwt_auth_middleware)),
    )
}

async fn send(
    app: &Router,
    method: &str,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    let body = body
        .map(|json| Body::from(serde_json::to_vec(&json).unwrap()))
        .unwrap_or_else(Body::empty);

    let response = app.clone().oneshot(builder.body(body).unwrap()).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    (status, serde_json::from_slice(&bytes).unwrap_or(Value::Null))
}

fn alice() -> Value {
    json!({
        "name": "Alice",
        "email": "alice@x.com",
        "password": "password123",
        "password_confirmation": "password123"
    })
}

#[tokio::test]
async fn test_signup_returns_token_and_user() {
    let app = app();

    let (status, body) = send(&app, "POST", "/signup", None, Some(alice())).await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["token_type"], "Bearer");
    assert_eq!(body["expires_in"], 3600);
    assert!(body["access_token"].as_str().is_some_and(|t| !t.is_empty()));
    assert_eq!(body["user"]["email"], "alice@x.com");
    assert!(body["user"].get("password_hash").is_none());
}

#[tokio::test]
async fn test_login_me_logout_me() {
    let app = app();
    send(&app, "POST", "/signup", None, Some(alice())).await;

    let (status, login) = send(
        &app,
        "POST",
        "/login",
        None,
        Some(json!({"email": "alice@x.com", "password": "password123"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let token = login["access_token"].as_str().unwrap().to_string();

    let (status, me) = send(&app, "GET", "/me", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(me["name"], "Alice");

    let (status, body) = send(&app, "POST", "/logout", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Successfully logged out");

    let (status, _) = send(&app, "GET", "/me", Some(&token), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_login_with_wrong_password_is_unauthorized() {
    let app = app();
    send(&app, "POST", "/signup", None, Some(alice())).await;

    let (status, body) = send(
        &app,
        "POST",
        "/login",
        None,
        Some(json!({"email": "alice@x.com", "password": "wrong-password"})),
    )
    .await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], "Invalid credentials");
}

#[tokio::test]
async fn test_login_without_fields_is_unprocessable() {
    let (status, body) = send(&app(), "POST", "/login", None, None).await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["details"]["email"][0], "Email is required");
    assert_eq!(body["details"]["password"][0], "Password is required");
}

#[tokio::test]
async fn test_me_without_token_is_unauthorized() {
    let (status, _) = send(&app(), "GET", "/me", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}
