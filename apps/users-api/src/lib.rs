//! Users API
//!
//! HTTP service for user accounts. [`build_app`] assembles the full router
//! for any [`UserRepository`], so the binary can run on PostgreSQL or on
//! in-memory storage and tests can drive it with `oneshot`.

use axum::Router;
use axum_helpers::{create_cors_layer, create_router, health_router};
use domain_users::{AuditHook, UserRepository, UserService};

pub mod api;
pub mod config;
pub mod openapi;
pub mod state;

pub use config::{AccessPolicy, Config};
pub use state::AppState;

/// Application routes plus liveness, readiness and API docs, wrapped in the
/// shared middleware stack.
pub fn build_app<R: UserRepository + 'static>(state: &AppState, repository: R) -> Router {
    let service = UserService::new(repository).with_hook(AuditHook);

    let routes = api::routes(state, service)
        .merge(health_router(state.config.app.clone()))
        .merge(api::ready_router(state.clone()))
        .merge(openapi::router());

    let cors = (!state.config.cors_origins.is_empty())
        .then(|| create_cors_layer(state.config.cors_origins.clone()));

    create_router(routes, cors)
}
