use sea_orm::{ConnectionTrait, DatabaseBackend, DatabaseConnection, Statement};
use tracing::debug;

use crate::common::DatabaseError;

/// Ping the pool with `SELECT 1`.
pub async fn check_health(db: &DatabaseConnection) -> Result<(), DatabaseError> {
    let ping = Statement::from_string(DatabaseBackend::Postgres, "SELECT 1".to_owned());
    db.query_one_raw(ping)
        .await
        .map_err(|e| DatabaseError::HealthCheckFailed(e.to_string()))?;

    debug!("Database ping succeeded");
    Ok(())
}
