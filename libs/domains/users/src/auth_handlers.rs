use axum::{
    Extension, Json, Router,
    extract::State,
    http::{HeaderMap, HeaderValue, StatusCode, header},
    response::{AppendHeaders, IntoResponse, Response},
    routing::{get, post},
};
use axum_helpers::{
    AppError, AuditEvent, AuditOutcome, ErrorResponse, JsonObject, JwtAuth, JwtClaims,
    extract_ip_from_headers, extract_user_agent,
};
use serde_json::json;
use std::sync::Arc;
use utoipa::OpenApi;

use crate::context::RequestContext;
use crate::error::UserError;
use crate::models::{LoginRequest, SignupRequest, User};
use crate::repository::UserRepository;
use crate::resource::{MessageResponse, TokenResponse, UserResource};
use crate::service::UserService;

pub const TAG: &str = "auth";

/// OpenAPI documentation for the Auth API
#[derive(OpenApi)]
#[openapi(
    paths(signup, login, logout, me),
    components(schemas(TokenResponse, UserResource, SignupRequest, LoginRequest, MessageResponse, ErrorResponse)),
    tags(
        (name = TAG, description = "Signup, login and session endpoints")
    )
)]
pub struct ApiDoc;

/// Application state for auth handlers
pub struct AuthState<R: UserRepository> {
    pub service: Arc<UserService<R>>,
    pub jwt: JwtAuth,
    /// Mark the `access_token` cookie `Secure`
    pub secure_cookies: bool,
}

impl<R: UserRepository> Clone for AuthState<R> {
    fn clone(&self) -> Self {
        Self {
            service: Arc::clone(&self.service),
            jwt: self.jwt.clone(),
            secure_cookies: self.secure_cookies,
        }
    }
}

impl<R: UserRepository> AuthState<R> {
    pub fn new(service: Arc<UserService<R>>, jwt: JwtAuth) -> Self {
        Self {
            service,
            jwt,
            secure_cookies: true,
        }
    }

    pub fn with_secure_cookies(mut self, secure: bool) -> Self {
        self.secure_cookies = secure;
        self
    }

    fn cookie(&self, value: &str, max_age: i64) -> Result<HeaderValue, AppError> {
        let secure_flag = if self.secure_cookies { " Secure;" } else { "" };
        let cookie = format!(
            "access_token={value}; HttpOnly;{secure_flag} SameSite=Strict; Path=/; Max-Age={max_age}"
        );
        HeaderValue::from_str(&cookie)
            .map_err(|e| AppError::InternalServerError(format!("Failed to create cookie: {e}")))
    }

    /// Token body plus matching cookie.
    fn token_response(&self, user: User, status: StatusCode) -> Result<Response, AppError> {
        let issued = self
            .jwt
            .issue(&user.id.to_string(), &user.email, &user.name)?;
        let cookie = self.cookie(&issued.access_token, issued.expires_in)?;

        let body = TokenResponse {
            access_token: issued.access_token,
            token_type: "Bearer".to_string(),
            expires_in: issued.expires_in,
            user: user.into(),
        };

        Ok((status, AppendHeaders([(header::SET_COOKIE, cookie)]), Json(body)).into_response())
    }
}

/// `/signup` and `/login`
pub fn public_router<R: UserRepository + 'static>(state: AuthState<R>) -> Router {
    Router::new()
        .route("/signup", post(signup))
        .route("/login", post(login))
        .with_state(state)
}

/// `/logout` and `/me`. Mount behind the JWT middleware.
pub fn protected_router<R: UserRepository + 'static>(state: AuthState<R>) -> Router {
    Router::new()
        .route("/logout", post(logout))
        .route("/me", get(me))
        .with_state(state)
}

/// Create an account and sign in
#[utoipa::path(
    post,
    path = "/signup",
    tag = TAG,
    request_body = SignupRequest,
    responses(
        (status = 201, description = "Account created", body = TokenResponse),
        (status = 422, description = "Validation failed", body = ErrorResponse)
    )
)]
async fn signup<R: UserRepository>(
    State(state): State<AuthState<R>>,
    ctx: RequestContext,
    JsonObject(input): JsonObject,
) -> Result<Response, AppError> {
    let user = state.service.create_user(&ctx, input).await?;
    state.token_response(user, StatusCode::CREATED)
}

/// Exchange credentials for an access token
#[utoipa::path(
    post,
    path = "/login",
    tag = TAG,
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Signed in", body = TokenResponse),
        (status = 401, description = "Invalid credentials", body = ErrorResponse),
        (status = 422, description = "Validation failed", body = ErrorResponse)
    )
)]
async fn login<R: UserRepository>(
    State(state): State<AuthState<R>>,
    headers: HeaderMap,
    JsonObject(input): JsonObject,
) -> Result<Response, AppError> {
    let email = input.get("email").and_then(|v| v.as_str()).map(str::to_string);

    match state.service.authenticate(input).await {
        Ok(user) => {
            AuditEvent::new(
                Some(user.id.to_string()),
                "auth.login",
                Some(format!("user:{}", user.id)),
                AuditOutcome::Success,
            )
            .with_ip(extract_ip_from_headers(&headers))
            .with_user_agent(extract_user_agent(&headers))
            .log();

            state.token_response(user, StatusCode::OK)
        }
        Err(UserError::InvalidCredentials) => {
            AuditEvent::new(None, "auth.login", None, AuditOutcome::Failure)
                .with_ip(extract_ip_from_headers(&headers))
                .with_user_agent(extract_user_agent(&headers))
                .with_details(json!({ "email": email }))
                .log();

            Err(UserError::InvalidCredentials.into())
        }
        Err(e) => Err(e.into()),
    }
}

/// Revoke the presented token
#[utoipa::path(
    post,
    path = "/logout",
    tag = TAG,
    responses(
        (status = 200, description = "Token revoked", body = MessageResponse),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse)
    )
)]
async fn logout<R: UserRepository>(
    State(state): State<AuthState<R>>,
    Extension(claims): Extension<JwtClaims>,
) -> Result<Response, AppError> {
    state.jwt.revoke(&claims).await?;
    tracing::info!(user_id = %claims.sub, "User logged out");

    let cleared = state.cookie("", 0)?;
    Ok((
        AppendHeaders([(header::SET_COOKIE, cleared)]),
        Json(MessageResponse::new("Successfully logged out")),
    )
        .into_response())
}

/// The authenticated user
#[utoipa::path(
    get,
    path = "/me",
    tag = TAG,
    responses(
        (status = 200, description = "Current user", body = UserResource),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse)
    )
)]
pub async fn me<R: UserRepository>(
    State(state): State<AuthState<R>>,
    Extension(claims): Extension<JwtClaims>,
) -> Result<Json<UserResource>, AppError> {
    let id = claims
        .user_id()
        .ok_or_else(|| AppError::Unauthorized("Invalid token".to_string()))?;

    // A valid token for a deleted account no longer identifies anyone.
    match state.service.get_user(id).await {
        Ok(user) => Ok(Json(user.into())),
        Err(UserError::NotFound(_)) => Err(AppError::Unauthorized("Invalid token".to_string())),
        Err(e) => Err(e.into()),
    }
}
