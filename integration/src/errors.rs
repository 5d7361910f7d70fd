use crate::cache_key::CacheKeyError;
use scope::{ScopeError, ScopeType};
use thiserror::Error;

/// Result type alias for integration operations
pub type Result<T, E = IntegrationError> = std::result::Result<T, E>;

/// Errors that can occur while checking, integrating or removing API keys
#[derive(Error, Debug)]
pub enum IntegrationError {
    #[error(transparent)]
    Scope(#[from] ScopeError),

    #[error(transparent)]
    CacheKey(#[from] CacheKeyError),

    #[error("Invalid API keys: {0}")]
    InvalidApiKeys(String),

    #[error("The API keys were rejected by the account lookup")]
    InvalidCredentials,

    #[error("No account found for the provided API keys")]
    AccountNotFound,

    #[error("The account is not active")]
    AccountInactive,

    #[error("The account platform is not supported: {0}")]
    IncorrectPlatform(String),

    #[error("The API keys are already integrated with {scope_type} {scope_id}")]
    AlreadyIntegrated { scope_type: ScopeType, scope_id: u32 },

    #[error("Account lookup failed with status {0}")]
    AccountLookupFailed(u16),

    #[error("Account lookup response is missing {0}")]
    IncompleteAccount(&'static str),

    #[error("Invalid URL: {0}")]
    Url(#[from] url::ParseError),

    #[error("HTTP client error: {0}")]
    HttpClient(#[from] reqwest::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Failed to read request body: {0}")]
    RequestBody(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
