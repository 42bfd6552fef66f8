use std::{env, num::NonZeroU32, path::PathBuf, str::FromStr, time::Duration};

use thiserror::Error;

const DEFAULT_LOGIN_ATTEMPTS_PER_MINUTE: NonZeroU32 = NonZeroU32::new(60).unwrap();

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),

    #[error("{var} has an invalid value: {value:?}")]
    Invalid { var: &'static str, value: String },
}

/// Runtime settings, read from the environment (and `.env`).
#[derive(Debug, Clone)]
pub struct Config {
    pub jwt_secret: String,
    pub database_path: PathBuf,
    pub bind_addr: String,
    /// Shared secret expected from the Polka webhook. `None` disables the check.
    pub polka_api_key: Option<String>,
    pub fileserver_root: PathBuf,
    pub bcrypt_cost: u32,
    pub login_attempts_per_minute: NonZeroU32,
    pub request_timeout: Duration,
    pub max_concurrent_requests: usize,
}

impl Config {
    /// Defaults for everything except the signing secret and database path.
    pub fn new(jwt_secret: impl Into<String>, database_path: impl Into<PathBuf>) -> Self {
        Self {
            jwt_secret: jwt_secret.into(),
            database_path: database_path.into(),
            bind_addr: "localhost:8080".to_string(),
            polka_api_key: None,
            fileserver_root: PathBuf::from("."),
            bcrypt_cost: bcrypt::DEFAULT_COST,
            login_attempts_per_minute: DEFAULT_LOGIN_ATTEMPTS_PER_MINUTE,
            request_timeout: Duration::from_secs(10),
            max_concurrent_requests: 1024,
        }
    }

    pub fn from_env() -> Result<Self, ConfigError> {
        let jwt_secret = env::var("JWT_SECRET")
            .ok()
            .filter(|secret| !secret.is_empty())
            .ok_or(ConfigError::Missing("JWT_SECRET"))?;
        let database_path = env::var("DATABASE_PATH").unwrap_or_else(|_| "./database.json".into());

        let mut config = Self::new(jwt_secret, database_path);

        if let Ok(addr) = env::var("BIND_ADDR") {
            config.bind_addr = addr;
        }
        config.polka_api_key = env::var("POLKA_API_KEY").ok().filter(|key| !key.is_empty());
        if let Ok(root) = env::var("FILESERVER_ROOT") {
            config.fileserver_root = root.into();
        }
        if let Some(cost) = parse_var("BCRYPT_COST")? {
            config.bcrypt_cost = cost;
        }
        if let Some(attempts) = parse_var("LOGIN_ATTEMPTS_PER_MINUTE")? {
            config.login_attempts_per_minute = attempts;
        }
        if let Some(secs) = parse_var("REQUEST_TIMEOUT_SECS")? {
            config.request_timeout = Duration::from_secs(secs);
        }
        if let Some(max) = parse_var("MAX_CONCURRENT_REQUESTS")? {
            config.max_concurrent_requests = max;
        }

        Ok(config)
    }
}

fn parse_var<T: FromStr>(var: &'static str) -> Result<Option<T>, ConfigError> {
    match env::var(var) {
        Ok(value) => value
            .parse()
            .map(Some)
            .map_err(|_| ConfigError::Invalid { var, value }),
        Err(_) => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_uses_defaults() {
        let config = Config::new("secret", "/tmp/db.json");

        assert_eq!(config.jwt_secret, "secret");
        assert_eq!(config.database_path, PathBuf::from("/tmp/db.json"));
        assert_eq!(config.bind_addr, "localhost:8080");
        assert!(config.polka_api_key.is_none());
        assert_eq!(config.login_attempts_per_minute.get(), 60);
        assert_eq!(config.bcrypt_cost, bcrypt::DEFAULT_COST);
    }
}
