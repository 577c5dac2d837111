use crate::env_or_default;

/// Name and version reported by health endpoints and logs.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AppInfo {
    pub name: String,
    pub version: String,
}

impl AppInfo {
    pub fn new(name: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            version: version.into(),
        }
    }

    /// Build from compile-time package metadata, letting `APP_VERSION`
    /// override the reported version.
    pub fn from_package(name: &str, package_version: &str) -> Self {
        Self::new(name, env_or_default("APP_VERSION", package_version))
    }
}

/// Capture the calling crate's package name and version.
#[macro_export]
macro_rules! app_info {
    () => {
        $crate::AppInfo::from_package(env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"))
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn version_defaults_to_package_version() {
        temp_env::with_var_unset("APP_VERSION", || {
            let info = crate::app_info!();
            assert_eq!(info.name, "core_config");
            assert_eq!(info.version, env!("CARGO_PKG_VERSION"));
        });
    }

    #[test]
    fn app_version_overrides_package_version() {
        temp_env::with_var("APP_VERSION", Some("2.3.4"), || {
            let info = AppInfo::from_package("users_api", "1.0.0");
            assert_eq!(info.version, "2.3.4");
        });
    }
}
