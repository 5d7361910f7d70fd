use crate::account::{Account, AccountFeatures, ApiKeys};
use crate::account_lookup::AccountLookup;
use crate::errors::{IntegrationError, Result};
use async_trait::async_trait;
use http_body_util::{BodyExt, Full};
use hyper::body::{Bytes, Incoming};
use hyper::service::service_fn;
use hyper::{Method, Request, Response, StatusCode};
use hyper_util::rt::{TokioExecutor, TokioIo};
use scope::config::RegistryConfig;
use scope::{InMemoryScopeRegistry, ScopeRegistry};
use std::convert::Infallible;
use std::sync::Arc;
use tokio::net::TcpListener;
use url::Url;

/// Website `base` (1) with store `default` (1), website `eu` (2) with stores
/// `en` (5, the website default) and `de` (6).
pub fn registry() -> Arc<dyn ScopeRegistry> {
    Arc::new(in_memory_registry())
}

pub fn in_memory_registry() -> InMemoryScopeRegistry {
    let config: RegistryConfig = serde_yaml::from_str(
        r#"
default_website: base
websites:
    - {id: 1, code: base, name: Main Website, default_store: default}
    - {id: 2, code: eu, name: Europe, default_store: en}
stores:
    - {id: 1, code: default, name: Default Store View, website: base}
    - {id: 5, code: en, name: English, website: eu}
    - {id: 6, code: de, name: German, website: eu}
"#,
    )
    .unwrap();
    InMemoryScopeRegistry::from_config(&config).unwrap()
}

pub fn api_keys() -> ApiKeys {
    ApiKeys::new("klevu-1234567890", "ABCDE1234567890")
}

pub fn account() -> Account {
    Account {
        js_api_key: api_keys().js_api_key,
        platform: "magento".into(),
        active: true,
        company_name: Some("Klevu".into()),
        email: Some("user@klevu.com".into()),
        indexing_url: Some("indexing.ksearchnet.com".into()),
        search_url: Some("eucs1.ksearchnet.com".into()),
        smart_category_merchandising_url: Some("eucsv1.ksearchnet.com".into()),
        analytics_url: Some("stats.ksearchnet.com".into()),
        js_url: Some("js.klevu.com".into()),
        tiers_url: Some("tiers.klevu.com".into()),
    }
}

pub fn features() -> AccountFeatures {
    AccountFeatures {
        smart_category_merchandising: true,
        smart_recommendations: false,
        preserve_layout: true,
    }
}

/// Account lookup returning canned results.
pub struct MockAccountLookup {
    pub account: Result<Account, fn() -> IntegrationError>,
    pub features: Option<AccountFeatures>,
}

impl MockAccountLookup {
    pub fn new() -> Self {
        MockAccountLookup {
            account: Ok(account()),
            features: Some(features()),
        }
    }

    pub fn with_account(account: Account) -> Self {
        MockAccountLookup {
            account: Ok(account),
            features: Some(features()),
        }
    }

    pub fn failing(error: fn() -> IntegrationError) -> Self {
        MockAccountLookup {
            account: Err(error),
            features: None,
        }
    }
}

#[async_trait]
impl AccountLookup for MockAccountLookup {
    async fn get_account(&self, keys: &ApiKeys) -> Result<Account> {
        match &self.account {
            Ok(account) => Ok(Account {
                js_api_key: keys.js_api_key.clone(),
                ..account.clone()
            }),
            Err(error) => Err(error()),
        }
    }

    async fn get_features(&self, _keys: &ApiKeys, _account: &Account) -> Result<AccountFeatures> {
        self.features
            .clone()
            .ok_or(IntegrationError::AccountLookupFailed(503))
    }
}

/// Local stand-in for the Klevu account API.
///
/// The account details endpoint answers by JS API key: `klevu-0000000000` is
/// unknown, `klevu-1111111111` is rejected, `klevu-5555555555` fails. Any other
/// signed request gets an active magento account whose tiers URL points back at
/// this server.
pub struct TestAccountServer {
    port: u16,
}

impl TestAccountServer {
    pub async fn start() -> Self {
        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind to address");
        let port = listener.local_addr().unwrap().port();

        tokio::spawn(async move {
            loop {
                let (stream, _) = listener.accept().await.unwrap();
                let io = TokioIo::new(stream);

                tokio::spawn(async move {
                    let service = service_fn(move |req| handle(req, port));
                    if let Err(err) = hyper_util::server::conn::auto::Builder::new(TokioExecutor::new())
                        .serve_connection(io, service)
                        .await
                    {
                        eprintln!("Error serving connection: {:?}", err);
                    }
                });
            }
        });

        TestAccountServer { port }
    }

    pub fn url(&self) -> Url {
        Url::parse(&format!("http://127.0.0.1:{}", self.port)).unwrap()
    }
}

fn json_response(status: StatusCode, body: serde_json::Value) -> Response<Full<Bytes>> {
    let mut response = Response::new(Full::new(Bytes::from(body.to_string())));
    *response.status_mut() = status;
    response
        .headers_mut()
        .insert("content-type", "application/json".parse().unwrap());
    response
}

async fn handle(req: Request<Incoming>, port: u16) -> Result<Response<Full<Bytes>>, Infallible> {
    let method = req.method().clone();
    let path = req.uri().path().to_string();
    let header = |name: &str| {
        req.headers()
            .get(name)
            .and_then(|value| value.to_str().ok())
            .map(str::to_string)
    };
    let api_key = header("X-KLEVU-APIKEY");
    let signed = header("X-KLEVU-AUTH").is_some()
        && header("X-KLEVU-TIMESTAMP").is_some()
        && header("X-KLEVU-AUTH-ALGO").as_deref() == Some("HmacSHA384");

    let response = match (method, path.as_str()) {
        (Method::GET, "/user-account/public/platform/account/details") => {
            match api_key.as_deref() {
                _ if !signed => json_response(StatusCode::UNAUTHORIZED, serde_json::json!({})),
                Some("klevu-0000000000") => {
                    json_response(StatusCode::NOT_FOUND, serde_json::json!({}))
                }
                Some("klevu-1111111111") => {
                    json_response(StatusCode::UNAUTHORIZED, serde_json::json!({}))
                }
                Some("klevu-5555555555") => {
                    json_response(StatusCode::INTERNAL_SERVER_ERROR, serde_json::json!({}))
                }
                _ => json_response(
                    StatusCode::OK,
                    serde_json::json!({
                        "platform": "magento",
                        "active": true,
                        "companyName": "Klevu",
                        "email": "user@klevu.com",
                        "indexingUrl": "indexing.ksearchnet.com",
                        "searchUrl": "eucs1.ksearchnet.com",
                        "tiersUrl": format!("http://127.0.0.1:{port}"),
                    }),
                ),
            }
        }
        (Method::POST, "/uti/getFeatureValues") => {
            let body = req.into_body().collect().await.unwrap().to_bytes();
            let request: serde_json::Value = serde_json::from_slice(&body).unwrap();
            if request["restApiKey"].as_str().is_none() {
                json_response(StatusCode::BAD_REQUEST, serde_json::json!({}))
            } else {
                json_response(
                    StatusCode::OK,
                    serde_json::json!({"featureValues": [
                        {"key": "s.enablecategorynavigation", "value": "yes"},
                        {"key": "allow.personalizedrecommendations", "value": "no"},
                        {"key": "s.preservedlayout", "value": "yes"},
                    ]}),
                )
            }
        }
        _ => json_response(StatusCode::NOT_FOUND, serde_json::json!({})),
    };

    Ok(response)
}
