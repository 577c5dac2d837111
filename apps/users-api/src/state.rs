//! Application state management.

use axum_helpers::JwtAuth;
use database::postgres::DatabaseConnection;

use crate::config::Config;

/// Shared application state.
///
/// Cheap to clone: the token verifier and the connection pool share their
/// internals behind `Arc`s.
#[derive(Clone)]
pub struct AppState {
    /// Application configuration loaded from environment variables
    pub config: Config,
    /// Bearer token issuer and verifier
    pub jwt: JwtAuth,
    /// PostgreSQL pool, `None` on in-memory storage
    pub db: Option<DatabaseConnection>,
}

impl AppState {
    pub fn new(config: Config, jwt: JwtAuth, db: Option<DatabaseConnection>) -> Self {
        Self { config, jwt, db }
    }
}
