//! Server settings read from the environment (after `.env` is loaded)

use std::net::SocketAddr;
use std::str::FromStr;

use anyhow::{Context, bail};
use throttle::ThrottleConfig;

/// Which attempt state store backs the throttle
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreBackend {
    Memory,
    Postgres { database_url: String },
}

#[derive(Debug, Clone)]
pub struct Settings {
    pub bind_addr: SocketAddr,
    pub frontend_origins: Vec<String>,
    pub store: StoreBackend,
    pub throttle: ThrottleConfig,
}

impl Settings {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// `lookup` returns the raw value of a variable, `None` when unset
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let bind_addr = parse_or(&lookup, "BIND_ADDR", SocketAddr::from(([0, 0, 0, 0], 31113)))?;

        let frontend_origins = lookup("FRONTEND_ORIGINS")
            .unwrap_or_else(|| "http://localhost:40922,http://127.0.0.1:40922".to_string())
            .split(',')
            .map(|origin| origin.trim().to_string())
            .filter(|origin| !origin.is_empty())
            .collect();

        let store = match lookup("THROTTLE_STORE").as_deref().unwrap_or("memory") {
            "memory" => StoreBackend::Memory,
            "postgres" => StoreBackend::Postgres {
                database_url: lookup("DATABASE_URL")
                    .context("DATABASE_URL must be set when THROTTLE_STORE=postgres")?,
            },
            other => bail!("THROTTLE_STORE must be `memory` or `postgres`, got `{other}`"),
        };

        let defaults = if cfg!(debug_assertions) {
            ThrottleConfig::development()
        } else {
            ThrottleConfig::default()
        };
        let max_attempts = parse_or(&lookup, "THROTTLE_MAX_ATTEMPTS", defaults.max_attempts)?;
        let timeout_secs = parse_or(
            &lookup,
            "THROTTLE_ATTEMPTS_TIMEOUT_SECS",
            defaults.attempts_timeout.as_secs(),
        )?;
        let cookie_secure = parse_or(&lookup, "COOKIE_SECURE", defaults.cookie_secure)?;

        let throttle = ThrottleConfig {
            cookie_secure,
            ..ThrottleConfig::new(max_attempts, timeout_secs)?
        };

        Ok(Self {
            bind_addr,
            frontend_origins,
            store,
            throttle,
        })
    }
}

fn parse_or<T>(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> anyhow::Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .with_context(|| format!("invalid value for {key}: `{raw}`")),
        None => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn settings(vars: &[(&str, &str)]) -> anyhow::Result<Settings> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Settings::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let settings = settings(&[]).unwrap();
        assert_eq!(settings.bind_addr.port(), 31113);
        assert_eq!(settings.store, StoreBackend::Memory);
        assert_eq!(settings.throttle.max_attempts, 5);
        assert_eq!(settings.throttle.attempts_timeout.as_secs(), 60);
        assert_eq!(settings.frontend_origins.len(), 2);
    }

    #[test]
    fn test_throttle_limits_from_env() {
        let settings = settings(&[
            ("THROTTLE_MAX_ATTEMPTS", "3"),
            ("THROTTLE_ATTEMPTS_TIMEOUT_SECS", "300"),
            ("COOKIE_SECURE", "true"),
        ])
        .unwrap();
        assert_eq!(settings.throttle.max_attempts, 3);
        assert_eq!(settings.throttle.attempts_timeout.as_secs(), 300);
        assert!(settings.throttle.cookie_secure);
    }

    #[test]
    fn test_invalid_values_abort() {
        assert!(settings(&[("THROTTLE_MAX_ATTEMPTS", "0")]).is_err());
        assert!(settings(&[("THROTTLE_MAX_ATTEMPTS", "-1")]).is_err());
        assert!(settings(&[("THROTTLE_ATTEMPTS_TIMEOUT_SECS", "soon")]).is_err());
        assert!(settings(&[("THROTTLE_STORE", "redis")]).is_err());
        assert!(settings(&[("THROTTLE_STORE", "postgres")]).is_err());
    }

    #[test]
    fn test_postgres_backend() {
        let settings = settings(&[
            ("THROTTLE_STORE", "postgres"),
            ("DATABASE_URL", "postgres://localhost/throttle"),
        ])
        .unwrap();
        assert_eq!(
            settings.store,
            StoreBackend::Postgres {
                database_url: "postgres://localhost/throttle".to_string()
            }
        );
    }
}
