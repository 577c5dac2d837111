use sea_orm::ConnectOptions;
use std::time::Duration;

#[cfg(feature = "config")]
use core_config::{ConfigError, FromEnv, env_parse, env_required};

/// Pool settings for the user store.
///
/// ```ignore
/// let db = connect_from_config_with_retry(PostgresConfig::new(url), None).await?;
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PostgresConfig {
    pub url: String,
    pub max_connections: u32,
    pub min_connections: u32,
    pub connect_timeout: Duration,
    pub idle_timeout: Duration,
    /// Emit every SQL statement at debug level
    pub log_statements: bool,
}

impl PostgresConfig {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            max_connections: 10,
            min_connections: 1,
            connect_timeout: Duration::from_secs(8),
            idle_timeout: Duration::from_secs(300),
            log_statements: false,
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn connect_options(&self) -> ConnectOptions {
        let mut options = ConnectOptions::new(self.url.as_str());
        options
            .max_connections(self.max_connections)
            .min_connections(self.min_connections)
            .connect_timeout(self.connect_timeout)
            .acquire_timeout(self.connect_timeout)
            .idle_timeout(self.idle_timeout)
            .sqlx_logging(self.log_statements);
        options
    }
}

/// `DATABASE_URL` plus optional `DB_MAX_CONNECTIONS`, `DB_MIN_CONNECTIONS`,
/// `DB_CONNECT_TIMEOUT_SECS`, `DB_IDLE_TIMEOUT_SECS` and `DB_LOG_STATEMENTS`.
#[cfg(feature = "config")]
impl FromEnv for PostgresConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let config = Self {
            url: env_required("DATABASE_URL")?,
            max_connections: env_parse("DB_MAX_CONNECTIONS", "10")?,
            min_connections: env_parse("DB_MIN_CONNECTIONS", "1")?,
            connect_timeout: Duration::from_secs(env_parse("DB_CONNECT_TIMEOUT_SECS", "8")?),
            idle_timeout: Duration::from_secs(env_parse("DB_IDLE_TIMEOUT_SECS", "300")?),
            log_statements: env_parse("DB_LOG_STATEMENTS", "false")?,
        };

        if config.min_connections > config.max_connections {
            return Err(ConfigError::invalid(
                "DB_MIN_CONNECTIONS",
                format!("must not exceed DB_MAX_CONNECTIONS ({})", config.max_connections),
            ));
        }
        Ok(config)
    }
}
