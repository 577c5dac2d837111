//! Users Domain
//!
//! User accounts: signup validation, CRUD, search and credential checks.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────┐
//! │  Handlers   │  ← HTTP endpoints (users CRUD, auth)
//! └──────┬──────┘
//!        │
//! ┌──────▼──────┐
//! │   Service   │  ← Validation, password hashing, lifecycle hooks
//! └──────┬──────┘
//!        │
//! ┌──────▼──────┐
//! │ Repository  │  ← Data access (trait + in-memory and Postgres)
//! └──────┬──────┘
//!        │
//! ┌──────▼──────┐
//! │   Models    │  ← Records, payloads, pagination
//! └─────────────┘
//! ```
//!
//! # Usage
//!
//! ```rust,no_run
//! use domain_users::{
//!     handlers,
//!     hooks::AuditHook,
//!     repository::InMemoryUserRepository,
//!     service::UserService,
//! };
//!
//! let service = UserService::new(InMemoryUserRepository::new()).with_hook(AuditHook);
//!
//! // Mount under e.g. `/v1/users`
//! let router = handlers::router(service);
//! ```

pub mod auth_handlers;
pub mod context;
pub mod error;
pub mod handlers;
pub mod hooks;
pub mod models;
pub mod postgres_repository_impl;
pub mod repository;
pub mod resource;
pub mod rules;
pub mod service;
pub mod validation;

pub use auth_handlers::AuthState;
pub use context::{Identity, RequestContext};
pub use error::{UserError, UserResult};
pub use hooks::{AuditHook, UserLifecycleHook};
pub use models::{Page, PageRequest, User, UserChanges, UserQuery};
pub use postgres_repository_impl::PostgresUserRepository;
pub use repository::{InMemoryUserRepository, UserRepository};
pub use resource::{UserCollection, UserResource};
pub use service::UserService;
