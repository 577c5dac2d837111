//! Server plumbing: middleware stack, liveness endpoints, graceful shutdown.
//!
//! ```ignore
//! let app = create_router(routes.merge(health_router(app_info!())), cors);
//!
//! create_production_app(app, &config.server, Duration::from_secs(30), cleanup).await?;
//! ```

pub mod app;
pub mod health;
pub mod shutdown;

pub use app::{create_production_app, create_router};
pub use health::{HealthCheckFuture, HealthResponse, health_router, run_health_checks};
pub use shutdown::ShutdownCoordinator;
