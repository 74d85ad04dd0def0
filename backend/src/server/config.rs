//! HTTP server configuration object and helpers.

use std::net::SocketAddr;

use mockable::{DefaultEnv, Env};
use seqtrack::domain::{ConfigError, EntityConfig};

/// Environment variable holding the listen address.
pub const BIND_ADDR_ENV: &str = "SEQTRACK_BIND_ADDR";

/// Listen address used when [`BIND_ADDR_ENV`] is unset.
pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8881";

/// Problems reading the server configuration.
#[derive(Debug, thiserror::Error)]
pub enum ServerConfigError {
    /// The listen address does not parse.
    #[error("{name}={value:?} is not a socket address: {source}")]
    InvalidBindAddr {
        /// Variable name.
        name: &'static str,
        /// Rejected value.
        value: String,
        /// Parse failure.
        #[source]
        source: std::net::AddrParseError,
    },
    /// Entity configuration is invalid.
    #[error(transparent)]
    Entity(#[from] ConfigError),
}

/// Everything the binary needs before serving requests.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub(crate) bind_addr: SocketAddr,
    pub(crate) entity: EntityConfig,
}

impl ServerConfig {
    /// Read the configuration from `env`.
    pub fn from_env<E: Env>(env: &E) -> Result<Self, ServerConfigError> {
        let raw = env
            .string(BIND_ADDR_ENV)
            .unwrap_or_else(|| DEFAULT_BIND_ADDR.to_owned());
        let bind_addr = raw
            .parse()
            .map_err(|source| ServerConfigError::InvalidBindAddr {
                name: BIND_ADDR_ENV,
                value: raw.clone(),
                source,
            })?;
        let entity = EntityConfig::from_env(env)?;
        Ok(Self { bind_addr, entity })
    }

    /// Read the configuration from the process environment.
    pub fn from_process_env() -> Result<Self, ServerConfigError> {
        Self::from_env(&DefaultEnv::new())
    }

    /// Return the socket address the server will bind to.
    #[must_use]
    pub const fn bind_addr(&self) -> SocketAddr {
        self.bind_addr
    }
}
