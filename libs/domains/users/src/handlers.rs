use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::get,
};
use axum_helpers::{ErrorResponse, JsonObject, UuidPath};
use std::sync::Arc;
use utoipa::OpenApi;

use crate::context::RequestContext;
use crate::error::UserResult;
use crate::models::{SignupRequest, UpdateUserRequest};
use crate::repository::UserRepository;
use crate::resource::{MessageResponse, PaginationMeta, UserCollection, UserResource};
use crate::service::UserService;

pub const TAG: &str = "users";

/// OpenAPI documentation for the Users API
#[derive(OpenApi)]
#[openapi(
    paths(list_users, create_user, get_user, update_user, patch_user, delete_user),
    components(schemas(
        UserResource,
        UserCollection,
        PaginationMeta,
        SignupRequest,
        UpdateUserRequest,
        MessageResponse,
        ErrorResponse
    )),
    tags(
        (name = TAG, description = "User account management")
    )
)]
pub struct ApiDoc;

/// Create the users router with all HTTP endpoints
pub fn router<R: UserRepository + 'static>(service: UserService<R>) -> Router {
    let shared_service = Arc::new(service);

    Router::new()
        .route("/", get(list_users).post(create_user))
        .route(
            "/{id}",
            get(get_user)
                .put(update_user)
                .patch(patch_user)
                .delete(delete_user),
        )
        .with_state(shared_service)
}

/// Search users
#[utoipa::path(
    get,
    path = "",
    tag = TAG,
    params(
        ("search" = Option<String>, Query, description = "Case-insensitive match on name or email"),
        ("page" = Option<u64>, Query, description = "1-based page number"),
        ("per_page" = Option<u64>, Query, description = "Page size, 1 to 100, default 15")
    ),
    responses(
        (status = 200, description = "Page of users", body = UserCollection),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
async fn list_users<R: UserRepository>(
    State(service): State<Arc<UserService<R>>>,
    ctx: RequestContext,
) -> UserResult<Json<UserCollection>> {
    let page = service.list_users(&ctx).await?;
    Ok(Json(UserCollection::from(page)))
}

/// Create a new user
#[utoipa::path(
    post,
    path = "",
    tag = TAG,
    request_body = SignupRequest,
    responses(
        (status = 201, description = "User created", body = UserResource),
        (status = 400, description = "Body is not a JSON object", body = ErrorResponse),
        (status = 422, description = "Validation failed", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
async fn create_user<R: UserRepository>(
    State(service): State<Arc<UserService<R>>>,
    ctx: RequestContext,
    JsonObject(input): JsonObject,
) -> UserResult<impl IntoResponse> {
    let user = service.create_user(&ctx, input).await?;
    Ok((StatusCode::CREATED, Json(UserResource::from(user))))
}

/// Get a user by ID
#[utoipa::path(
    get,
    path = "/{id}",
    tag = TAG,
    params(("id" = uuid::Uuid, Path, description = "User ID")),
    responses(
        (status = 200, description = "User found", body = UserResource),
        (status = 404, description = "User not found", body = ErrorResponse)
    )
)]
async fn get_user<R: UserRepository>(
    State(service): State<Arc<UserService<R>>>,
    UuidPath(id): UuidPath,
) -> UserResult<Json<UserResource>> {
    let user = service.get_user(id).await?;
    Ok(Json(user.into()))
}

/// Replace fields of a user
#[utoipa::path(
    put,
    path = "/{id}",
    tag = TAG,
    params(("id" = uuid::Uuid, Path, description = "User ID")),
    request_body = UpdateUserRequest,
    responses(
        (status = 200, description = "User updated", body = UserResource),
        (status = 404, description = "User not found", body = ErrorResponse),
        (status = 422, description = "Validation failed", body = ErrorResponse)
    )
)]
async fn update_user<R: UserRepository>(
    State(service): State<Arc<UserService<R>>>,
    UuidPath(id): UuidPath,
    ctx: RequestContext,
    JsonObject(input): JsonObject,
) -> UserResult<Json<UserResource>> {
    let user = service.update_user(&ctx, id, input).await?;
    Ok(Json(user.into()))
}

/// Update fields of a user
#[utoipa::path(
    patch,
    path = "/{id}",
    tag = TAG,
    params(("id" = uuid::Uuid, Path, description = "User ID")),
    request_body = UpdateUserRequest,
    responses(
        (status = 200, description = "User updated", body = UserResource),
        (status = 404, description = "User not found", body = ErrorResponse),
        (status = 422, description = "Validation failed", body = ErrorResponse)
    )
)]
async fn patch_user<R: UserRepository>(
    state: State<Arc<UserService<R>>>,
    id: UuidPath,
    ctx: RequestContext,
    input: JsonObject,
) -> UserResult<Json<UserResource>> {
    update_user(state, id, ctx, input).await
}

/// Delete a user
#[utoipa::path(
    delete,
    path = "/{id}",
    tag = TAG,
    params(("id" = uuid::Uuid, Path, description = "User ID")),
    responses(
        (status = 200, description = "User deleted", body = MessageResponse),
        (status = 404, description = "User not found", body = ErrorResponse)
    )
)]
async fn delete_user<R: UserRepository>(
    State(service): State<Arc<UserService<R>>>,
    UuidPath(id): UuidPath,
    ctx: RequestContext,
) -> UserResult<Json<MessageResponse>> {
    service.delete_user(&ctx, id).await?;
    Ok(Json(MessageResponse::new("User deleted successfully")))
}
