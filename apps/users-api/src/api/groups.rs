//! Named middleware groups attached by the route registrar.

use axum::{
    Router,
    extract::{Request, State},
    middleware::{Next, from_fn_with_state},
    response::Response,
};
use axum_helpers::{
    AppError, EmailAllowList, jwt_auth_middleware, optional_jwt_auth_middleware,
    require_allowed_email,
};

use crate::config::Environment;
use crate::state::AppState;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MiddlewareGroup {
    /// Valid, unrevoked bearer token
    Auth,
    /// Optional bearer token; claims are attached when present
    Identify,
    /// `Auth` plus an `ADMIN_EMAILS` allow-list
    Admin,
    /// Development-only diagnostics, 404 elsewhere
    TestRoute,
}

impl MiddlewareGroup {
    /// Wrap every route of `router` with this group's middleware.
    pub fn apply(self, router: Router, state: &AppState) -> Router {
        let jwt = state.jwt.clone();
        match self {
            Self::Auth => router.route_layer(from_fn_with_state(jwt, jwt_auth_middleware)),
            Self::Identify => {
                router.route_layer(from_fn_with_state(jwt, optional_jwt_auth_middleware))
            }
            // Layers added last run first, so the token is checked before the allow-list.
            Self::Admin => router
                .route_layer(from_fn_with_state(
                    EmailAllowList::new(&state.config.admin_emails),
                    require_allowed_email,
                ))
                .route_layer(from_fn_with_state(jwt, jwt_auth_middleware)),
            Self::TestRoute => router
                .route_layer(from_fn_with_state(jwt, optional_jwt_auth_middleware))
                .route_layer(from_fn_with_state(
                    state.config.environment,
                    development_only,
                )),
        }
    }
}

async fn development_only(
    State(environment): State<Environment>,
    request: Request,
    next: Next,
) -> Result<Response, AppError> {
    if !environment.is_development() {
        return Err(AppError::NotFound("Resource not found".to_string()));
    }
    Ok(next.run(request).await)
}
