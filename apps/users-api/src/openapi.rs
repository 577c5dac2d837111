use axum::{Json, Router, routing::get};
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    components(
        schemas(axum_helpers::ErrorResponse, axum_helpers::HealthResponse)
    ),
    info(
        title = "Users API",
        description = "User account management: signup, login and user CRUD"
    ),
    nest(
        (path = "/v1/auth", api = domain_users::auth_handlers::ApiDoc),
        (path = "/v1/users", api = domain_users::handlers::ApiDoc)
    )
)]
pub struct ApiDoc;

/// `GET /api-docs/openapi.json`
pub fn router() -> Router {
    Router::new().route("/api-docs/openapi.json", get(openapi_json))
}

async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}
