use axum::Router;
use axum_helpers::{InMemoryTokenStore, JwtAuth, PostgresTokenStore, create_production_app};
use core_config::tracing::{init_tracing, install_color_eyre};
use domain_users::{InMemoryUserRepository, PostgresUserRepository};
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};
use users_api::{AppState, Config, build_app};

const SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(30);

#[tokio::main]
async fn main() -> eyre::Result<()> {
    // Install color-eyre first for colored error output (before any fallible operations)
    install_color_eyre();

    let config = Config::from_env()?;

    init_tracing(&config.environment);

    let (state, app) = match config.database.clone() {
        Some(db_config) => {
            let db = database::postgres::connect_from_config_with_retry(db_config, None)
                .await
                .map_err(|e| eyre::eyre!("PostgreSQL connection failed: {}", e))?;

            if config.run_migrations {
                database::postgres::run_migrations::<migration::Migrator>(&db, &config.app.name)
                    .await
                    .map_err(|e| eyre::eyre!("Migration failed: {}", e))?;
            }

            let jwt = JwtAuth::new(&config.jwt, Arc::new(PostgresTokenStore::new(db.clone())));
            let state = AppState::new(config, jwt, Some(db.clone()));
            let app = build_app(&state, PostgresUserRepository::new(db));
            (state, app)
        }
        None => {
            warn!("DATABASE_URL not set, users and revoked tokens are kept in memory");
            let jwt = JwtAuth::new(&config.jwt, Arc::new(InMemoryTokenStore::new()));
            let state = AppState::new(config, jwt, None);
            let app = build_app(&state, InMemoryUserRepository::new());
            (state, app)
        }
    };

    serve(app, state).await
}

async fn serve(app: Router, state: AppState) -> eyre::Result<()> {
    info!(
        app = %state.config.app.name,
        version = %state.config.app.version,
        environment = state.config.environment.as_str(),
        "Starting users API"
    );

    let server = state.config.server.clone();
    create_production_app(app, &server, SHUTDOWN_TIMEOUT, async move {
        if let Some(db) = state.db {
            info!("Shutting down: closing database connections");
            match db.close().await {
                Ok(_) => info!("PostgreSQL connection closed successfully"),
                Err(e) => tracing::error!("Error closing PostgreSQL: {}", e),
            }
        }
    })
    .await
    .map_err(|e| eyre::eyre!("Server error: {}", e))?;

    info!("Users API shutdown complete");
    Ok(())
}
