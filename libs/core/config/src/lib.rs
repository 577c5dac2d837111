pub mod app;
pub mod server;
pub mod tracing;

pub use app::AppInfo;

use std::env;
use std::str::FromStr;
use thiserror::Error;

/// Configuration error type
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Environment variable '{0}' is required but not set")]
    MissingEnvVar(String),

    #[error("Failed to parse environment variable '{key}': {details}")]
    ParseError { key: String, details: String },

    #[error("Invalid value for '{key}': {details}")]
    Invalid { key: String, details: String },
}

impl ConfigError {
    pub fn invalid(key: &str, details: impl Into<String>) -> Self {
        Self::Invalid {
            key: key.to_string(),
            details: details.into(),
        }
    }
}

/// Runtime environment selected by `APP_ENV`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Environment {
    Development,
    Production,
}

impl Environment {
    pub fn from_env() -> Self {
        let app_env = env_or_default("APP_ENV", "development");

        if app_env.eq_ignore_ascii_case("production") {
            Environment::Production
        } else {
            Environment::Development
        }
    }

    pub fn is_production(&self) -> bool {
        matches!(self, Environment::Production)
    }

    pub fn is_development(&self) -> bool {
        matches!(self, Environment::Development)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Environment::Development => "development",
            Environment::Production => "production",
        }
    }
}

/// Trait for configuration that can be loaded from environment variables
pub trait FromEnv: Sized {
    fn from_env() -> Result<Self, ConfigError>;
}

/// Read a variable, falling back to `default` when unset.
pub fn env_or_default(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

/// Read a variable that must be present.
pub fn env_required(key: &str) -> Result<String, ConfigError> {
    env::var(key).map_err(|_| ConfigError::MissingEnvVar(key.to_string()))
}

/// Read a variable that may be absent. Empty strings count as absent.
pub fn env_optional(key: &str) -> Option<String> {
    env::var(key).ok().filter(|value| !value.trim().is_empty())
}

/// Read and parse a variable, using `default` when unset.
pub fn env_parse<T>(key: &str, default: &str) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    env_or_default(key, default)
        .trim()
        .parse()
        .map_err(|e: T::Err| ConfigError::ParseError {
            key: key.to_string(),
            details: e.to_string(),
        })
}

/// Read a comma separated list. Blank entries are dropped.
pub fn env_list(key: &str) -> Vec<String> {
    env::var(key)
        .map(|raw| {
            raw.split(',')
                .map(str::trim)
                .filter(|item| !item.is_empty())
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn environment_defaults_to_development() {
        temp_env::with_var_unset("APP_ENV", || {
            let env = Environment::from_env();
            assert_eq!(env, Environment::Development);
            assert_eq!(env.as_str(), "development");
        });
    }

    #[test]
    fn environment_production_is_case_insensitive() {
        for value in ["production", "PRODUCTION", "Production"] {
            temp_env::with_var("APP_ENV", Some(value), || {
                assert!(Environment::from_env().is_production());
            });
        }
    }

    #[test]
    fn unknown_environment_falls_back_to_development() {
        temp_env::with_var("APP_ENV", Some("staging"), || {
            assert!(Environment::from_env().is_development());
        });
    }

    #[test]
    fn env_required_reports_missing_key() {
        temp_env::with_var_unset("USERS_TEST_REQUIRED", || {
            let err = env_required("USERS_TEST_REQUIRED").unwrap_err();
            assert!(err.to_string().contains("USERS_TEST_REQUIRED"));
        });
    }

    #[test]
    fn env_optional_treats_blank_as_unset() {
        temp_env::with_var("USERS_TEST_OPTIONAL", Some("   "), || {
            assert_eq!(env_optional("USERS_TEST_OPTIONAL"), None);
        });
        temp_env::with_var("USERS_TEST_OPTIONAL", Some("value"), || {
            assert_eq!(env_optional("USERS_TEST_OPTIONAL").as_deref(), Some("value"));
        });
    }

    #[test]
    fn env_parse_uses_default_and_reports_bad_values() {
        temp_env::with_var_unset("USERS_TEST_NUMBER", || {
            let value: u32 = env_parse("USERS_TEST_NUMBER", "15").unwrap();
            assert_eq!(value, 15);
        });

        temp_env::with_var("USERS_TEST_NUMBER", Some("fifteen"), || {
            let err = env_parse::<u32>("USERS_TEST_NUMBER", "15").unwrap_err();
            assert!(matches!(err, ConfigError::ParseError { ref key, .. } if key == "USERS_TEST_NUMBER"));
        });
    }

    #[test]
    fn env_list_splits_and_trims() {
        temp_env::with_var("USERS_TEST_LIST", Some(" a@x.com, ,b@x.com "), || {
            assert_eq!(env_list("USERS_TEST_LIST"), vec!["a@x.com", "b@x.com"]);
        });
        temp_env::with_var_unset("USERS_TEST_LIST", || {
            assert!(env_list("USERS_TEST_LIST").is_empty());
        });
    }
}
