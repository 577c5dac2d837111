use super::jwt::AuthError;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sea_orm::{ConnectionTrait, DatabaseConnection, DbBackend, FromQueryResult, Statement};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Revocation list keyed by token id.
#[async_trait]
pub trait TokenStore: Send + Sync {
    /// Remember `jti` as revoked until `expires_at`.
    async fn revoke(&self, jti: &str, expires_at: DateTime<Utc>) -> Result<(), AuthError>;

    async fn is_revoked(&self, jti: &str) -> Result<bool, AuthError>;
}

/// Process local revocation list.
#[derive(Clone, Default)]
pub struct InMemoryTokenStore {
    revoked: Arc<RwLock<HashMap<String, DateTime<Utc>>>>,
}

impl InMemoryTokenStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl TokenStore for InMemoryTokenStore {
    async fn revoke(&self, jti: &str, expires_at: DateTime<Utc>) -> Result<(), AuthError> {
        let now = Utc::now();
        let mut revoked = self.revoked.write().await;
        revoked.retain(|_, until| *until > now);
        revoked.insert(jti.to_string(), expires_at);
        Ok(())
    }

    async fn is_revoked(&self, jti: &str) -> Result<bool, AuthError> {
        Ok(self.revoked.read().await.contains_key(jti))
    }
}

/// Revocation list in the `revoked_tokens` table.
#[derive(Clone)]
pub struct PostgresTokenStore {
    db: DatabaseConnection,
}

impl PostgresTokenStore {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[derive(Debug, FromQueryResult)]
struct RevokedRow {
    revoked: bool,
}

fn store_error(e: sea_orm::DbErr) -> AuthError {
    AuthError::Store(e.to_string())
}

#[async_trait]
impl TokenStore for PostgresTokenStore {
    async fn revoke(&self, jti: &str, expires_at: DateTime<Utc>) -> Result<(), AuthError> {
        let purge = Statement::from_string(
            DbBackend::Postgres,
            "DELETE FROM revoked_tokens WHERE expires_at < NOW()",
        );
        self.db.execute_raw(purge).await.map_err(store_error)?;

        let insert = Statement::from_sql_and_values(
            DbBackend::Postgres,
            "INSERT INTO revoked_tokens (jti, expires_at) VALUES ($1, $2) ON CONFLICT (jti) DO NOTHING",
            [jti.into(), expires_at.into()],
        );
        self.db.execute_raw(insert).await.map_err(store_error)?;
        Ok(())
    }

    async fn is_revoked(&self, jti: &str) -> Result<bool, AuthError> {
        let stmt = Statement::from_sql_and_values(
            DbBackend::Postgres,
            "SELECT EXISTS(SELECT 1 FROM revoked_tokens WHERE jti = $1) AS revoked",
            [jti.into()],
        );

        let row = RevokedRow::find_by_statement(stmt)
            .one(&self.db)
            .await
            .map_err(store_error)?;

        Ok(row.is_some_and(|row| row.revoked))
    }
}
