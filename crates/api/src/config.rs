use std::time::Duration;

use anyhow::{Result, bail};
use serde::{Deserialize, Serialize};

/// Which backend holds scores and the balance document.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    /// In-process state, lost on restart.
    #[default]
    Memory,
    /// Redis at `redis_url`.
    Redis,
}

/// Loaded from `LEADERBOARD_*` environment variables.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default)]
    pub store: StoreBackend,
    /// Required when `store` is `redis`.
    #[serde(default)]
    pub redis_url: Option<String>,
    /// Deadline for each ranked store call against Redis.
    #[serde(default = "default_redis_timeout_ms")]
    pub redis_timeout_ms: u64,
    /// PostgreSQL URL for user accounts. User endpoints are disabled without it.
    #[serde(default)]
    pub database_url: Option<String>,
    /// Set to "production" for JSON logging, anything else for human-readable.
    #[serde(default)]
    pub env: String,
    /// Sentry DSN for error tracking
    #[serde(default)]
    pub sentry_dsn: Option<String>,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8888
}

fn default_redis_timeout_ms() -> u64 {
    2000
}

impl Config {
    pub fn from_env() -> Result<Self> {
        let config = envy::prefixed("LEADERBOARD_").from_env::<Config>()?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.store == StoreBackend::Redis && self.redis_url.is_none() {
            bail!("LEADERBOARD_REDIS_URL is required when LEADERBOARD_STORE=redis");
        }
        if self.redis_timeout_ms == 0 {
            bail!("LEADERBOARD_REDIS_TIMEOUT_MS must be greater than zero");
        }
        Ok(())
    }

    pub fn is_production(&self) -> bool {
        self.env == "production"
    }

    pub fn redis_timeout(&self) -> Duration {
        Duration::from_millis(self.redis_timeout_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn from_vars(vars: &[(&str, &str)]) -> Result<Config> {
        let vars = vars
            .iter()
            .map(|(k, v)| (format!("LEADERBOARD_{k}"), v.to_string()));
        let config = envy::prefixed("LEADERBOARD_").from_iter::<_, Config>(vars)?;
        config.validate()?;
        Ok(config)
    }

    #[test]
    fn defaults_to_memory_store_on_port_8888() {
        let config = from_vars(&[]).unwrap();

        assert_eq!(config.store, StoreBackend::Memory);
        assert_eq!(config.port, 8888);
        assert_eq!(config.redis_timeout(), Duration::from_secs(2));
        assert!(config.database_url.is_none());
        assert!(!config.is_production());
    }

    #[test]
    fn redis_store_requires_url() {
        assert!(from_vars(&[("STORE", "redis")]).is_err());

        let config = from_vars(&[("STORE", "redis"), ("REDIS_URL", "redis://localhost")]).unwrap();
        assert_eq!(config.store, StoreBackend::Redis);
    }

    #[test]
    fn zero_timeout_rejected() {
        assert!(from_vars(&[("REDIS_TIMEOUT_MS", "0")]).is_err());
    }

    #[test]
    fn unknown_store_rejected() {
        assert!(from_vars(&[("STORE", "postgres")]).is_err());
    }
}
