//! Service configuration from environment variables.

use crate::error::ConfigError;
use std::str::FromStr;

pub const DEFAULT_DATABASE_URL: &str = "postgres://localhost/products";
pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";
pub const DEFAULT_MAX_CONNECTIONS: u32 = 5;
pub const DEFAULT_BODY_LIMIT_BYTES: usize = 1024 * 1024;

/// Which [`crate::store::ProductStore`] backend to run with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreKind {
    Postgres,
    Memory,
}

impl FromStr for StoreKind {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "postgres" | "postgresql" => Ok(StoreKind::Postgres),
            "memory" | "in-memory" => Ok(StoreKind::Memory),
            _ => Err(ConfigError::Invalid {
                key: "PRODUCT_STORE",
                value: s.to_string(),
            }),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ServiceConfig {
    pub store: StoreKind,
    pub database_url: String,
    pub max_connections: u32,
    pub bind_addr: String,
    pub body_limit_bytes: usize,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            store: StoreKind::Postgres,
            database_url: DEFAULT_DATABASE_URL.into(),
            max_connections: DEFAULT_MAX_CONNECTIONS,
            bind_addr: DEFAULT_BIND_ADDR.into(),
            body_limit_bytes: DEFAULT_BODY_LIMIT_BYTES,
        }
    }
}

impl ServiceConfig {
    /// Read `PRODUCT_STORE`, `DATABASE_URL`, `DATABASE_MAX_CONNECTIONS`, `BIND_ADDR`, `BODY_LIMIT_BYTES`.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`Self::from_env`] with an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let lookup = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        Ok(Self {
            store: match lookup("PRODUCT_STORE") {
                Some(v) => v.parse()?,
                None => defaults.store,
            },
            database_url: lookup("DATABASE_URL").unwrap_or(defaults.database_url),
            max_connections: parse_or("DATABASE_MAX_CONNECTIONS", lookup("DATABASE_MAX_CONNECTIONS"), defaults.max_connections)?,
            bind_addr: lookup("BIND_ADDR").unwrap_or(defaults.bind_addr),
            body_limit_bytes: parse_or("BODY_LIMIT_BYTES", lookup("BODY_LIMIT_BYTES"), defaults.body_limit_bytes)?,
        })
    }
}

fn parse_or<T: FromStr>(key: &'static str, value: Option<String>, default: T) -> Result<T, ConfigError> {
    match value {
        None => Ok(default),
        Some(v) => v.trim().parse().map_err(|_| ConfigError::Invalid { key, value: v }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn load(vars: &[(&str, &str)]) -> Result<ServiceConfig, ConfigError> {
        let vars: HashMap<String, String> = vars.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        ServiceConfig::from_lookup(|k| vars.get(k).cloned())
    }

    #[test]
    fn defaults_when_unset() {
        let config = load(&[]).unwrap();
        assert_eq!(config.store, StoreKind::Postgres);
        assert_eq!(config.database_url, DEFAULT_DATABASE_URL);
        assert_eq!(config.max_connections, 5);
        assert_eq!(config.bind_addr, "0.0.0.0:8080");
        assert_eq!(config.body_limit_bytes, 1024 * 1024);
    }

    #[test]
    fn reads_overrides() {
        let config = load(&[
            ("PRODUCT_STORE", "Memory"),
            ("DATABASE_URL", "postgres://db/catalog"),
            ("DATABASE_MAX_CONNECTIONS", "12"),
            ("BIND_ADDR", "127.0.0.1:9000"),
            ("BODY_LIMIT_BYTES", "2048"),
        ])
        .unwrap();
        assert_eq!(config.store, StoreKind::Memory);
        assert_eq!(config.database_url, "postgres://db/catalog");
        assert_eq!(config.max_connections, 12);
        assert_eq!(config.bind_addr, "127.0.0.1:9000");
        assert_eq!(config.body_limit_bytes, 2048);
    }

    #[test]
    fn blank_values_fall_back_to_defaults() {
        let config = load(&[("BIND_ADDR", "  ")]).unwrap();
        assert_eq!(config.bind_addr, DEFAULT_BIND_ADDR);
    }

    #[test]
    fn rejects_invalid_values() {
        assert!(matches!(
            load(&[("DATABASE_MAX_CONNECTIONS", "many")]),
            Err(ConfigError::Invalid { key: "DATABASE_MAX_CONNECTIONS", .. })
        ));
        assert!(matches!(
            load(&[("PRODUCT_STORE", "sqlite")]),
            Err(ConfigError::Invalid { key: "PRODUCT_STORE", .. })
        ));
    }
}
