//! # Axum Helpers
//!
//! Shared building blocks for the HTTP services in this workspace.
//!
//! - **[`auth`]**: bearer tokens with a revocation list, guard middleware
//! - **[`server`]**: middleware stack, liveness routes, graceful shutdown
//! - **[`http`]**: CORS and security headers
//! - **[`errors`]**: [`AppError`] and the JSON error body
//! - **[`extractors`]**: [`UuidPath`], [`JsonObject`]
//! - **[`audit`]**: audit events on the `audit` tracing target

pub mod audit;
pub mod auth;
pub mod errors;
pub mod extractors;
pub mod http;
pub mod server;

pub use auth::{
    AuthError, EmailAllowList, InMemoryTokenStore, IssuedToken, JwtAuth, JwtClaims, JwtConfig,
    PostgresTokenStore, TokenStore, jwt_auth_middleware, optional_jwt_auth_middleware,
    require_allowed_email,
};

pub use server::{
    HealthCheckFuture, HealthResponse, ShutdownCoordinator, create_production_app, create_router,
    health_router, run_health_checks,
};

pub use http::{create_cors_layer, security_headers};

pub use errors::{AppError, ErrorCode, ErrorResponse, FieldErrors};

pub use extractors::{JsonObject, UuidPath};

pub use audit::{AuditEvent, AuditOutcome, extract_ip_from_headers, extract_user_agent};
