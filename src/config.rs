use std::{env, net::SocketAddr};

use thiserror::Error;

#[cfg(test)]
pub(crate) static ENV_MUTEX: std::sync::LazyLock<std::sync::Mutex<()>> =
    std::sync::LazyLock::new(|| std::sync::Mutex::new(()));

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    http_bind: SocketAddr,
    prng_seed: Option<u64>,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for {name}: {source}")]
    Invalid {
        name: &'static str,
        #[source]
        source: anyhow::Error,
    },
}

impl Config {
    /// Reads the service configuration from the environment.
    ///
    /// `COMMENT_REPORTER_PRNG_SEED` pins the reproducibility seed for the
    /// service lifetime; when unset a random seed is drawn at service
    /// construction and logged.
    ///
    /// # Errors
    /// Returns [`ConfigError`] when a value fails to parse.
    pub fn from_env() -> Result<Self, ConfigError> {
        let http_bind = parse_socket_addr("COMMENT_REPORTER_HTTP_BIND", "0.0.0.0:8080")?;
        let prng_seed = parse_optional_u64("COMMENT_REPORTER_PRNG_SEED")?;

        Ok(Self {
            http_bind,
            prng_seed,
        })
    }

    #[must_use]
    pub fn http_bind(&self) -> SocketAddr {
        self.http_bind
    }

    #[must_use]
    pub fn prng_seed(&self) -> Option<u64> {
        self.prng_seed
    }
}

fn parse_socket_addr(name: &'static str, default: &str) -> Result<SocketAddr, ConfigError> {
    let raw = env::var(name).unwrap_or_else(|_| default.to_string());
    raw.parse::<SocketAddr>()
        .map_err(|error| ConfigError::Invalid {
            name,
            source: anyhow::Error::new(error),
        })
}

fn parse_optional_u64(name: &'static str) -> Result<Option<u64>, ConfigError> {
    match env::var(name) {
        Err(_) => Ok(None),
        Ok(raw) => raw
            .parse::<u64>()
            .map(Some)
            .map_err(|error| ConfigError::Invalid {
                name,
                source: anyhow::Error::new(error),
            }),
    }
}
