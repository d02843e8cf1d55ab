//! Core runtime configuration.
//!
//! Configuration is resolved once at process startup and then passed into the store and
//! services. Nothing in this crate reads environment variables during request handling.

use crate::constants::DEFAULT_DATABASE_URL;
use crate::{KeeperError, KeeperResult};

/// Core configuration resolved at startup.
#[derive(Clone, Debug)]
pub struct CoreConfig {
    database_url: String,
    production: bool,
}

impl CoreConfig {
    /// Create a new `CoreConfig`.
    ///
    /// # Errors
    ///
    /// Returns [`KeeperError::InvalidConfig`] if `database_url` is blank or does not use the
    /// `sqlite:` scheme.
    pub fn new(database_url: String, production: bool) -> KeeperResult<Self> {
        let database_url = database_url.trim().to_owned();
        if database_url.is_empty() {
            return Err(KeeperError::InvalidConfig(
                "database url cannot be empty".into(),
            ));
        }
        if !database_url.starts_with("sqlite:") {
            return Err(KeeperError::InvalidConfig(format!(
                "unsupported database url {database_url}, expected a sqlite: url"
            )));
        }

        Ok(Self {
            database_url,
            production,
        })
    }

    pub fn database_url(&self) -> &str {
        &self.database_url
    }

    pub fn production(&self) -> bool {
        self.production
    }
}

/// Parse the database url from an optional environment value.
///
/// If `value` is `None` or empty/whitespace, returns [`DEFAULT_DATABASE_URL`].
pub fn database_url_from_env_value(value: Option<String>) -> String {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .unwrap_or_else(|| DEFAULT_DATABASE_URL.to_string())
}

/// Parse a boolean flag such as `PRODUCTION` from an optional environment value.
///
/// Accepts `true/false`, `1/0` and `yes/no` in any case. Missing or blank values are
/// `false`.
pub fn flag_from_env_value(name: &str, value: Option<String>) -> KeeperResult<bool> {
    let Some(value) = value.map(|v| v.trim().to_ascii_lowercase()) else {
        return Ok(false);
    };
    match value.as_str() {
        "" | "false" | "0" | "no" => Ok(false),
        "true" | "1" | "yes" => Ok(true),
        other => Err(KeeperError::InvalidConfig(format!(
            "{name} must be a boolean, got {other}"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_database_url_defaults_when_missing_or_blank() {
        assert_eq!(database_url_from_env_value(None), DEFAULT_DATABASE_URL);
        assert_eq!(
            database_url_from_env_value(Some("   ".into())),
            DEFAULT_DATABASE_URL
        );
        assert_eq!(
            database_url_from_env_value(Some(" sqlite::memory: ".into())),
            "sqlite::memory:"
        );
    }

    #[test]
    fn test_core_config_rejects_non_sqlite_urls() {
        let err = CoreConfig::new("postgres://localhost/keeper".into(), false).unwrap_err();
        assert!(matches!(err, KeeperError::InvalidConfig(_)));
        assert!(CoreConfig::new("".into(), false).is_err());
    }

    #[test]
    fn test_core_config_accepts_sqlite() {
        let cfg = CoreConfig::new("sqlite::memory:".into(), true).unwrap();
        assert_eq!(cfg.database_url(), "sqlite::memory:");
        assert!(cfg.production());
    }

    #[test]
    fn test_flag_parsing() {
        assert!(!flag_from_env_value("PRODUCTION", None).unwrap());
        assert!(flag_from_env_value("PRODUCTION", Some("TRUE".into())).unwrap());
        assert!(!flag_from_env_value("PRODUCTION", Some("0".into())).unwrap());
        assert!(flag_from_env_value("PRODUCTION", Some("maybe".into())).is_err());
    }
}
