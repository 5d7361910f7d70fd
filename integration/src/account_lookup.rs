use crate::account::{Account, AccountFeatures, ApiKeys};
use crate::config::AccountLookupConfig;
use crate::errors::{IntegrationError, Result};
use crate::metrics_defs::{ACCOUNT_LOOKUP_DURATION, ACCOUNT_LOOKUP_FAILURE};
use async_trait::async_trait;
use base64::{Engine as _, engine::general_purpose::STANDARD};
use hmac::{Hmac, Mac};
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use sha2::Sha384;
use shared::{counter, histogram};
use std::time::{Duration, Instant};
use url::Url;

type HmacSha384 = Hmac<Sha384>;

const ACCOUNT_DETAILS_PATH: &str = "user-account/public/platform/account/details";
const FEATURE_VALUES_PATH: &str = "uti/getFeatureValues";
const AUTH_ALGORITHM: &str = "HmacSHA384";

const FEATURE_SMART_CATEGORY_MERCHANDISING: &str = "s.enablecategorynavigation";
const FEATURE_SMART_RECOMMENDATIONS: &str = "allow.personalizedrecommendations";
const FEATURE_PRESERVE_LAYOUT: &str = "s.preservedlayout";

/// Remote lookup of account details and feature flags for a pair of API keys.
#[async_trait]
pub trait AccountLookup: Send + Sync {
    async fn get_account(&self, keys: &ApiKeys) -> Result<Account>;

    async fn get_features(&self, keys: &ApiKeys, account: &Account) -> Result<AccountFeatures>;
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct FeatureValuesRequest<'a> {
    rest_api_key: &'a str,
    features: &'a [&'a str],
}

#[derive(Deserialize)]
struct FeatureValue {
    key: String,
    value: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct FeatureValuesResponse {
    feature_values: Vec<FeatureValue>,
}

impl FeatureValuesResponse {
    fn into_features(self) -> AccountFeatures {
        let enabled = |key: &str| {
            self.feature_values
                .iter()
                .any(|f| f.key == key && matches!(f.value.as_str(), "yes" | "true" | "1"))
        };

        AccountFeatures {
            smart_category_merchandising: enabled(FEATURE_SMART_CATEGORY_MERCHANDISING),
            smart_recommendations: enabled(FEATURE_SMART_RECOMMENDATIONS),
            preserve_layout: enabled(FEATURE_PRESERVE_LAYOUT),
        }
    }
}

/// Account lookup over the Klevu HTTP API.
///
/// Account detail requests are signed with an HMAC-SHA384 of the canonical
/// request keyed by the REST AUTH key. Requests are not retried.
pub struct HttpAccountLookup {
    client: reqwest::Client,
    account_details_url: Url,
}

impl HttpAccountLookup {
    pub fn new(config: &AccountLookupConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        let mut base_url = config.base_url.clone();
        if !base_url.path().ends_with('/') {
            base_url.set_path(&format!("{}/", base_url.path()));
        }
        let account_details_url = base_url.join(ACCOUNT_DETAILS_PATH)?;

        Ok(HttpAccountLookup {
            client,
            account_details_url,
        })
    }

    fn features_url(tiers_url: &str) -> Result<Url> {
        let tiers_url = tiers_url.trim_end_matches('/');
        let full_url = if tiers_url.contains("://") {
            format!("{tiers_url}/{FEATURE_VALUES_PATH}")
        } else {
            format!("https://{tiers_url}/{FEATURE_VALUES_PATH}")
        };
        Ok(Url::parse(&full_url)?)
    }

    fn map_status(status: StatusCode) -> IntegrationError {
        match status {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => IntegrationError::InvalidCredentials,
            StatusCode::NOT_FOUND => IntegrationError::AccountNotFound,
            other => IntegrationError::AccountLookupFailed(other.as_u16()),
        }
    }

    async fn fetch_account(&self, keys: &ApiKeys) -> Result<Account> {
        let timestamp = chrono::Utc::now()
            .format("%Y-%m-%dT%H:%M:%S%.3fZ")
            .to_string();
        let signature = sign_request("GET", &self.account_details_url, &timestamp, keys, "")?;

        let response = self
            .client
            .get(self.account_details_url.clone())
            .header("X-KLEVU-TIMESTAMP", &timestamp)
            .header("X-KLEVU-APIKEY", &keys.js_api_key)
            .header("X-KLEVU-AUTH-ALGO", AUTH_ALGORITHM)
            .header("X-KLEVU-AUTH", signature)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(Self::map_status(response.status()));
        }

        let mut account = response.json::<Account>().await?;
        account.js_api_key = keys.js_api_key.clone();
        Ok(account)
    }

    async fn fetch_features(&self, keys: &ApiKeys, account: &Account) -> Result<AccountFeatures> {
        let tiers_url = account
            .tiers_url
            .as_deref()
            .ok_or(IntegrationError::IncompleteAccount("tiersUrl"))?;

        let response = self
            .client
            .post(Self::features_url(tiers_url)?)
            .json(&FeatureValuesRequest {
                rest_api_key: &keys.rest_auth_key,
                features: &[
                    FEATURE_SMART_CATEGORY_MERCHANDISING,
                    FEATURE_SMART_RECOMMENDATIONS,
                    FEATURE_PRESERVE_LAYOUT,
                ],
            })
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(Self::map_status(response.status()));
        }

        Ok(response.json::<FeatureValuesResponse>().await?.into_features())
    }
}

#[async_trait]
impl AccountLookup for HttpAccountLookup {
    async fn get_account(&self, keys: &ApiKeys) -> Result<Account> {
        let start = Instant::now();
        let result = self.fetch_account(keys).await;
        record("account_details", start, result.is_ok());
        result
    }

    async fn get_features(&self, keys: &ApiKeys, account: &Account) -> Result<AccountFeatures> {
        let start = Instant::now();
        let result = self.fetch_features(keys, account).await;
        record("feature_values", start, result.is_ok());
        result
    }
}

fn record(endpoint: &'static str, start: Instant, success: bool) {
    histogram!(ACCOUNT_LOOKUP_DURATION, "endpoint" => endpoint)
        .record(start.elapsed().as_secs_f64());
    if !success {
        counter!(ACCOUNT_LOOKUP_FAILURE, "endpoint" => endpoint).increment(1);
    }
}

/// Signature for the `X-KLEVU-AUTH` header.
///
/// The signed string is the method, path, query, the Klevu headers in
/// alphabetical order and the body, separated by newlines.
fn sign_request(
    method: &str,
    url: &Url,
    timestamp: &str,
    keys: &ApiKeys,
    body: &str,
) -> Result<String> {
    let canonical = format!(
        "{method}\n{}\n{}\nX-KLEVU-APIKEY={}&X-KLEVU-AUTH-ALGO={AUTH_ALGORITHM}&X-KLEVU-TIMESTAMP={timestamp}\n{body}",
        url.path(),
        url.query().unwrap_or(""),
        keys.js_api_key,
    );

    let mut mac = HmacSha384::new_from_slice(keys.rest_auth_key.as_bytes())
        .map_err(|_| IntegrationError::InvalidApiKeys("REST AUTH key is not usable".into()))?;
    mac.update(canonical.as_bytes());
    Ok(STANDARD.encode(mac.finalize().into_bytes()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutils::{TestAccountServer, api_keys};

    fn lookup_for(server: &TestAccountServer) -> HttpAccountLookup {
        HttpAccountLookup::new(&AccountLookupConfig {
            base_url: server.url(),
            timeout_secs: 5,
        })
        .unwrap()
    }

    #[test]
    fn test_signature_is_deterministic() {
        let url = Url::parse("https://api.ksearchnet.com/user-account/public/platform/account/details")
            .unwrap();
        let keys = api_keys();
        let first = sign_request("GET", &url, "2024-01-01T00:00:00.000Z", &keys, "").unwrap();
        let second = sign_request("GET", &url, "2024-01-01T00:00:00.000Z", &keys, "").unwrap();
        assert_eq!(first, second);
        // 48 byte digest
        assert_eq!(STANDARD.decode(&first).unwrap().len(), 48);

        let other = sign_request("GET", &url, "2024-01-01T00:00:01.000Z", &keys, "").unwrap();
        assert_ne!(first, other);
    }

    #[test]
    fn test_features_url() {
        assert_eq!(
            HttpAccountLookup::features_url("tiers.klevu.com").unwrap().as_str(),
            "https://tiers.klevu.com/uti/getFeatureValues"
        );
        assert_eq!(
            HttpAccountLookup::features_url("http://127.0.0.1:9000/")
                .unwrap()
                .as_str(),
            "http://127.0.0.1:9000/uti/getFeatureValues"
        );
    }

    #[test]
    fn test_into_features() {
        let response: FeatureValuesResponse = serde_json::from_str(
            r#"{"featureValues": [
                {"key": "s.enablecategorynavigation", "value": "yes"},
                {"key": "allow.personalizedrecommendations", "value": "no"},
                {"key": "s.preservedlayout", "value": "true"}
            ]}"#,
        )
        .unwrap();

        assert_eq!(
            response.into_features(),
            AccountFeatures {
                smart_category_merchandising: true,
                smart_recommendations: false,
                preserve_layout: true,
            }
        );
    }

    #[tokio::test]
    async fn test_get_account_and_features() {
        let server = TestAccountServer::start().await;
        let lookup = lookup_for(&server);
        let keys = api_keys();

        let account = lookup.get_account(&keys).await.unwrap();
        assert_eq!(account.js_api_key, keys.js_api_key);
        assert_eq!(account.platform, "magento");
        assert!(account.active);

        let features = lookup.get_features(&keys, &account).await.unwrap();
        assert!(features.smart_category_merchandising);
        assert!(!features.smart_recommendations);
        assert!(features.preserve_layout);
    }

    #[tokio::test]
    async fn test_get_account_errors() {
        let server = TestAccountServer::start().await;
        let lookup = lookup_for(&server);

        let unknown = ApiKeys::new("klevu-0000000000", "ABCDE1234567890");
        assert!(matches!(
            lookup.get_account(&unknown).await,
            Err(IntegrationError::AccountNotFound)
        ));

        let rejected = ApiKeys::new("klevu-1111111111", "ABCDE1234567890");
        assert!(matches!(
            lookup.get_account(&rejected).await,
            Err(IntegrationError::InvalidCredentials)
        ));

        let broken = ApiKeys::new("klevu-5555555555", "ABCDE1234567890");
        assert!(matches!(
            lookup.get_account(&broken).await,
            Err(IntegrationError::AccountLookupFailed(500))
        ));
    }

    #[tokio::test]
    async fn test_features_require_tiers_url() {
        let server = TestAccountServer::start().await;
        let lookup = lookup_for(&server);
        let keys = api_keys();
        let mut account = lookup.get_account(&keys).await.unwrap();
        account.tiers_url = None;

        assert!(matches!(
            lookup.get_features(&keys, &account).await,
            Err(IntegrationError::IncompleteAccount("tiersUrl"))
        ));
    }
}
