use serde::Deserialize;
use thiserror::Error;
use url::Url;

#[derive(Error, Debug, PartialEq)]
pub enum ValidationError {
    #[error("Port cannot be 0")]
    InvalidPort,

    #[error("Listener and admin listener share the address {0}")]
    ListenerConflict(String),

    #[error("Unsupported account lookup URL scheme: {0}")]
    UnsupportedScheme(String),

    #[error("Account lookup timeout cannot be 0")]
    InvalidTimeout,

    #[error("Cache TTL cannot be 0")]
    InvalidCacheTtl,
}

/// Integration service configuration
#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct Config {
    /// Listener for the web API
    pub listener: Listener,
    /// Listener for health and readiness probes
    pub admin_listener: Listener,
    pub account_lookup: AccountLookupConfig,
    #[serde(default)]
    pub cache: CacheConfig,
}

impl Config {
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.listener.validate()?;
        self.admin_listener.validate()?;

        if self.listener == self.admin_listener {
            return Err(ValidationError::ListenerConflict(format!(
                "{}:{}",
                self.listener.host, self.listener.port
            )));
        }

        self.account_lookup.validate()?;

        if self.cache.ttl_secs == 0 {
            return Err(ValidationError::InvalidCacheTtl);
        }

        Ok(())
    }
}

/// Network listener configuration
#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct Listener {
    pub host: String,
    pub port: u16,
}

impl Listener {
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.port == 0 {
            return Err(ValidationError::InvalidPort);
        }
        Ok(())
    }
}

#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct AccountLookupConfig {
    /// Base URL of the account API, e.g. `https://api.ksearchnet.com`
    pub base_url: Url,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl AccountLookupConfig {
    pub fn validate(&self) -> Result<(), ValidationError> {
        match self.base_url.scheme() {
            "http" | "https" => {}
            other => return Err(ValidationError::UnsupportedScheme(other.to_string())),
        }
        if self.timeout_secs == 0 {
            return Err(ValidationError::InvalidTimeout);
        }
        Ok(())
    }
}

fn default_timeout_secs() -> u64 {
    10
}

/// Account feature cache configuration
#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct CacheConfig {
    #[serde(default = "default_ttl_secs")]
    pub ttl_secs: u64,
    #[serde(default = "default_max_capacity")]
    pub max_capacity: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        CacheConfig {
            ttl_secs: default_ttl_secs(),
            max_capacity: default_max_capacity(),
        }
    }
}

fn default_ttl_secs() -> u64 {
    86_400
}

fn default_max_capacity() -> u64 {
    10_000
}
