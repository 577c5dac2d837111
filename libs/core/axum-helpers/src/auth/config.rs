use core_config::{ConfigError, FromEnv, env_parse, env_required};

/// Access token lifetime when `JWT_TTL_SECS` is unset.
pub const DEFAULT_ACCESS_TOKEN_TTL: i64 = 3600;

const MIN_SECRET_LEN: usize = 32;

/// Signing settings for bearer tokens.
///
/// - `JWT_SECRET` (required, at least 32 characters)
/// - `JWT_TTL_SECS` (default 3600)
#[derive(Clone, Debug)]
pub struct JwtConfig {
    pub secret: String,
    pub ttl_secs: i64,
}

impl JwtConfig {
    pub fn new(secret: impl Into<String>) -> Result<Self, ConfigError> {
        let secret = secret.into();
        if secret.len() < MIN_SECRET_LEN {
            return Err(ConfigError::invalid(
                "JWT_SECRET",
                format!(
                    "must be at least {MIN_SECRET_LEN} characters (got {}). Generate one with: openssl rand -base64 32",
                    secret.len()
                ),
            ));
        }
        Ok(Self {
            secret,
            ttl_secs: DEFAULT_ACCESS_TOKEN_TTL,
        })
    }

    pub fn with_ttl(mut self, ttl_secs: i64) -> Self {
        self.ttl_secs = ttl_secs;
        self
    }
}

impl FromEnv for JwtConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let ttl_secs: i64 = env_parse("JWT_TTL_SECS", &DEFAULT_ACCESS_TOKEN_TTL.to_string())?;
        if ttl_secs <= 0 {
            return Err(ConfigError::invalid("JWT_TTL_SECS", "must be positive"));
        }
        Ok(Self::new(env_required("JWT_SECRET")?)?.with_ttl(ttl_secs))
    }
}
