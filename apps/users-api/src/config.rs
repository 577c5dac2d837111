use axum::http::HeaderValue;
use axum_helpers::JwtConfig;
use core_config::{
    AppInfo, ConfigError, FromEnv, app_info, env_list, env_optional, env_parse,
    server::ServerConfig,
};
use database::postgres::PostgresConfig;
use std::str::FromStr;

// Re-export Environment for use in other modules
pub use core_config::Environment;

/// Who may call the `/v1/users` endpoints.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum AccessPolicy {
    /// Bearer token required
    #[default]
    Authenticated,
    /// Open to anyone
    Public,
}

impl FromStr for AccessPolicy {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "authenticated" | "auth" => Ok(Self::Authenticated),
            "public" => Ok(Self::Public),
            other => Err(ConfigError::invalid(
                "USERS_ACCESS",
                format!("expected 'authenticated' or 'public', got '{other}'"),
            )),
        }
    }
}

/// Application-specific configuration
/// Composes shared config components from the `config` library
#[derive(Clone, Debug)]
pub struct Config {
    pub app: AppInfo,
    pub environment: Environment,
    pub server: ServerConfig,
    /// `None` runs on in-memory storage
    pub database: Option<PostgresConfig>,
    pub run_migrations: bool,
    pub jwt: JwtConfig,
    pub users_access: AccessPolicy,
    /// Emails allowed through the admin group
    pub admin_emails: Vec<String>,
    pub cors_origins: Vec<HeaderValue>,
}

impl Config {
    /// Defaults for everything but the signing secret.
    pub fn new(jwt: JwtConfig) -> Self {
        Self {
            app: app_info!(),
            environment: Environment::Development,
            server: ServerConfig::default(),
            database: None,
            run_migrations: true,
            jwt,
            users_access: AccessPolicy::default(),
            admin_emails: Vec::new(),
            cors_origins: Vec::new(),
        }
    }

    pub fn from_env() -> Result<Self, ConfigError> {
        let environment = Environment::from_env();
        let server = ServerConfig::from_env()?; // Uses defaults: HOST=0.0.0.0, PORT=8080
        let jwt = JwtConfig::from_env()?; // Required - will fail if JWT_SECRET is not set

        let database = match env_optional("DATABASE_URL") {
            Some(_) => Some(PostgresConfig::from_env()?),
            None => None,
        };

        let cors_origins = env_list("CORS_ALLOWED_ORIGIN")
            .into_iter()
            .map(|origin| {
                HeaderValue::from_str(&origin)
                    .map_err(|e| ConfigError::invalid("CORS_ALLOWED_ORIGIN", e.to_string()))
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            app: app_info!(),
            environment,
            server,
            database,
            run_migrations: env_parse("RUN_MIGRATIONS", "true")?,
            jwt,
            users_access: env_parse("USERS_ACCESS", "authenticated")?,
            admin_emails: env_list("ADMIN_EMAILS"),
            cors_origins,
        })
    }
}
