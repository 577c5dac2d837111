//! Bearer token authentication.
//!
//! - [`JwtAuth`] issues and verifies HS256 tokens
//! - [`TokenStore`] records revoked token ids (logout)
//! - [`jwt_auth_middleware`] guards routes and stores [`JwtClaims`] in request extensions
//!
//! ```ignore
//! let auth = JwtAuth::new(&JwtConfig::from_env()?, Arc::new(InMemoryTokenStore::new()));
//!
//! let protected = Router::new()
//!     .route("/v1/auth/me", get(me))
//!     .route_layer(axum::middleware::from_fn_with_state(auth, jwt_auth_middleware));
//! ```

pub mod config;
pub mod jwt;
pub mod middleware;
pub mod store;

pub use config::{DEFAULT_ACCESS_TOKEN_TTL, JwtConfig};
pub use jwt::{AuthError, IssuedToken, JwtAuth, JwtClaims};
pub use middleware::{
    EmailAllowList, jwt_auth_middleware, optional_jwt_auth_middleware, require_allowed_email,
};
pub use store::{InMemoryTokenStore, PostgresTokenStore, TokenStore};
