use axum::{Json, Router, routing::get};
use domain_users::RequestContext;

/// Diagnostics mounted under the `TestRoute` group.
pub fn router() -> Router {
    Router::new().route("/context", get(context))
}

/// Echo the resolved request context.
async fn context(ctx: RequestContext) -> Json<RequestContext> {
    Json(ctx)
}
