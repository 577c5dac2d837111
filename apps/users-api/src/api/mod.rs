use axum::{Router, routing::get};
use domain_users::{AuthState, UserRepository, UserService, auth_handlers, handlers};
use std::sync::Arc;

pub mod groups;
pub mod health;
pub mod test_route;

use crate::config::AccessPolicy;
use crate::state::AppState;
use groups::MiddlewareGroup;

/// Register every application route.
///
/// ```text
/// /v1/auth/{signup,login}          public
/// /v1/auth/{logout,me}             auth
/// /v1/users[/{id}]                 auth, or public per USERS_ACCESS
/// /user                            auth (current user)
/// /admin/users[/{id}]              admin
/// /test-route/context              test-route
/// ```
///
/// Returns a stateless Router (all sub-routers have state already applied).
pub fn routes<R: UserRepository + 'static>(state: &AppState, service: UserService<R>) -> Router {
    let auth = AuthState::new(Arc::new(service.clone()), state.jwt.clone())
        .with_secure_cookies(!state.config.environment.is_development());

    let auth_routes = auth_handlers::public_router(auth.clone()).merge(MiddlewareGroup::Auth.apply(
        auth_handlers::protected_router(auth.clone()),
        state,
    ));

    let users_group = match state.config.users_access {
        AccessPolicy::Authenticated => MiddlewareGroup::Auth,
        AccessPolicy::Public => MiddlewareGroup::Identify,
    };

    let v1 = Router::new()
        .nest("/auth", auth_routes)
        .nest("/users", users_group.apply(handlers::router(service.clone()), state));

    let current_user = Router::new()
        .route("/user", get(auth_handlers::me::<R>))
        .with_state(auth);

    Router::new()
        .nest("/v1", v1)
        .merge(MiddlewareGroup::Auth.apply(current_user, state))
        .nest(
            "/admin/users",
            MiddlewareGroup::Admin.apply(handlers::router(service), state),
        )
        .nest(
            "/test-route",
            MiddlewareGroup::TestRoute.apply(test_route::router(), state),
        )
}

/// Creates a router with the /ready endpoint that performs actual health checks.
pub fn ready_router(state: AppState) -> Router {
    Router::new()
        .route("/ready", get(health::ready_handler))
        .with_state(state)
}
