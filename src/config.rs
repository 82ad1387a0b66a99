use std::env;
use std::time::Duration;

use thiserror::Error;

const DATABASE_URL: &str = "DATABASE_URL";
const HOST: &str = "HOST";
const PORT: &str = "PORT";
const LOG_LEVEL: &str = "LOG_LEVEL";
const CLEANUP_INTERVAL_SECS: &str = "CLEANUP_INTERVAL_SECS";
const ORDER_RETENTION_MINUTES: &str = "ORDER_RETENTION_MINUTES";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),

    #[error("{name} must be {expected}, got {value:?}")]
    Invalid {
        name: &'static str,
        expected: &'static str,
        value: String,
    },
}

/// Process settings read from the environment (and `.env`, when present).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub database_url: String,
    pub host: String,
    pub port: u16,
    /// Default `env_logger` filter; `RUST_LOG` still wins when set.
    pub log_level: String,
    pub cleanup_interval: Duration,
    pub order_retention: Duration,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build from any key lookup, so tests don't have to touch the process
    /// environment.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let database_url = lookup(DATABASE_URL)
            .filter(|v| !v.trim().is_empty())
            .ok_or(ConfigError::Missing(DATABASE_URL))?;
        let host = lookup(HOST).unwrap_or_else(|| "0.0.0.0".to_string());
        let port = parse_number(&lookup, PORT, 8080u16, "a port number")?;
        let log_level = lookup(LOG_LEVEL).unwrap_or_else(|| "info".to_string());

        let cleanup_secs = parse_number(&lookup, CLEANUP_INTERVAL_SECS, 60u64, "a positive integer")?;
        let retention_minutes =
            parse_number(&lookup, ORDER_RETENTION_MINUTES, 30u64, "a positive integer")?;

        Ok(Self {
            database_url,
            host,
            port,
            log_level,
            cleanup_interval: Duration::from_secs(cleanup_secs),
            order_retention: Duration::from_secs(retention_minutes.saturating_mul(60)),
        })
    }
}

fn parse_number<F, T>(
    lookup: &F,
    name: &'static str,
    default: T,
    expected: &'static str,
) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr + PartialEq + Default,
{
    let Some(raw) = lookup(name) else {
        return Ok(default);
    };
    match raw.trim().parse::<T>() {
        Ok(value) if value != T::default() => Ok(value),
        _ => Err(ConfigError::Invalid {
            name,
            expected,
            value: raw,
        }),
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::time::Duration;

    use super::{Config, ConfigError};

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| vars.get(key).cloned()
    }

    #[test]
    fn defaults_apply_when_only_database_url_is_set() {
        let config =
            Config::from_lookup(lookup(&[("DATABASE_URL", "postgres://localhost/shop")]))
                .expect("config");
        assert_eq!(config.database_url, "postgres://localhost/shop");
        assert_eq!(config.host, "0.0.0.0");
        assert_eq!(config.port, 8080);
        assert_eq!(config.log_level, "info");
        assert_eq!(config.cleanup_interval, Duration::from_secs(60));
        assert_eq!(config.order_retention, Duration::from_secs(30 * 60));
    }

    #[test]
    fn explicit_values_override_defaults() {
        let config = Config::from_lookup(lookup(&[
            ("DATABASE_URL", "postgres://db/shop"),
            ("HOST", "127.0.0.1"),
            ("PORT", "9000"),
            ("LOG_LEVEL", "debug"),
            ("CLEANUP_INTERVAL_SECS", "15"),
            ("ORDER_RETENTION_MINUTES", "5"),
        ]))
        .expect("config");
        assert_eq!(config.host, "127.0.0.1");
        assert_eq!(config.port, 9000);
        assert_eq!(config.log_level, "debug");
        assert_eq!(config.cleanup_interval, Duration::from_secs(15));
        assert_eq!(config.order_retention, Duration::from_secs(300));
    }

    #[test]
    fn database_url_is_required() {
        assert_eq!(
            Config::from_lookup(lookup(&[])),
            Err(ConfigError::Missing("DATABASE_URL"))
        );
        assert_eq!(
            Config::from_lookup(lookup(&[("DATABASE_URL", " ")])),
            Err(ConfigError::Missing("DATABASE_URL"))
        );
    }

    #[test]
    fn malformed_numbers_are_rejected() {
        let err = Config::from_lookup(lookup(&[
            ("DATABASE_URL", "postgres://db/shop"),
            ("PORT", "eighty"),
        ]))
        .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { name: "PORT", .. }));

        let err = Config::from_lookup(lookup(&[
            ("DATABASE_URL", "postgres://db/shop"),
            ("CLEANUP_INTERVAL_SECS", "0"),
        ]))
        .unwrap_err();
        assert_eq!(
            err.to_string(),
            "CLEANUP_INTERVAL_SECS must be a positive integer, got \"0\""
        );
    }
}
