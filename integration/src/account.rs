use crate::errors::{IntegrationError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

const JS_API_KEY_PREFIX: &str = "klevu-";
const MIN_KEY_LENGTH: usize = 10;

/// Credentials of a Klevu account.
#[derive(Clone, PartialEq, Eq)]
pub struct ApiKeys {
    pub js_api_key: String,
    pub rest_auth_key: String,
}

impl ApiKeys {
    pub fn new(js_api_key: impl Into<String>, rest_auth_key: impl Into<String>) -> Self {
        ApiKeys {
            js_api_key: js_api_key.into(),
            rest_auth_key: rest_auth_key.into(),
        }
    }

    /// Checks the shape of both keys before anything is sent to the account API.
    pub fn validate(&self) -> Result<()> {
        let js = self.js_api_key.as_str();
        if !js.starts_with(JS_API_KEY_PREFIX)
            || js.len() < MIN_KEY_LENGTH
            || !js.chars().all(|c| c.is_ascii_alphanumeric() || c == '-')
        {
            return Err(IntegrationError::InvalidApiKeys(format!(
                "JS API key must start with \"{JS_API_KEY_PREFIX}\" and contain at least {MIN_KEY_LENGTH} alphanumeric characters or dashes"
            )));
        }

        let rest = self.rest_auth_key.as_str();
        if rest.len() < MIN_KEY_LENGTH
            || !rest
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '/' | '='))
        {
            return Err(IntegrationError::InvalidApiKeys(format!(
                "REST AUTH key must contain at least {MIN_KEY_LENGTH} base64 characters"
            )));
        }

        Ok(())
    }
}

impl fmt::Debug for ApiKeys {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApiKeys")
            .field("js_api_key", &self.js_api_key)
            .field("rest_auth_key", &"********")
            .finish()
    }
}

/// Account details returned by the account lookup.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Account {
    /// Not part of the lookup response; filled from the keys used for the lookup.
    #[serde(default)]
    pub js_api_key: String,
    pub platform: String,
    pub active: bool,
    pub company_name: Option<String>,
    pub email: Option<String>,
    pub indexing_url: Option<String>,
    pub search_url: Option<String>,
    pub smart_category_merchandising_url: Option<String>,
    pub analytics_url: Option<String>,
    pub js_url: Option<String>,
    pub tiers_url: Option<String>,
}

/// Feature flags enabled for an account.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountFeatures {
    #[serde(default)]
    pub smart_category_merchandising: bool,
    #[serde(default)]
    pub smart_recommendations: bool,
    #[serde(default)]
    pub preserve_layout: bool,
}
