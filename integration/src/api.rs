use crate::account::ApiKeys;
use crate::cache_key::CacheKeyError;
use crate::config::Config;
use crate::errors::{IntegrationError, Result};
use crate::integration::IntegrationService;
use crate::metrics_defs::API_REQUESTS;
use crate::status::IntegrationStatusProvider;
use axum::extract::rejection::JsonRejection;
use axum::extract::{MatchedPath, Request, State};
use axum::http::StatusCode;
use axum::middleware::{self, Next};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use scope::ScopeError;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use shared::admin_service::AdminService;
use shared::counter;
use shared::http::run_http_service;
use std::convert::Infallible;
use std::sync::Arc;
use tokio::net::TcpListener;

pub const API_PREFIX: &str = "/rest/V1/klevu/integration";

#[derive(Clone)]
pub struct ApiState {
    service: Arc<IntegrationService>,
    status: Arc<IntegrationStatusProvider>,
}

impl ApiState {
    pub fn new(service: Arc<IntegrationService>, status: Arc<IntegrationStatusProvider>) -> Self {
        ApiState { service, status }
    }
}

/// Response envelope shared by every endpoint.
#[derive(Debug, Serialize)]
pub struct ApiResponse {
    code: u16,
    status: &'static str,
    message: String,
    data: Value,
}

impl ApiResponse {
    fn success(message: impl Into<String>, data: Value) -> Self {
        ApiResponse {
            code: StatusCode::OK.as_u16(),
            status: "success",
            message: message.into(),
            data,
        }
    }

    fn error(code: StatusCode, message: impl Into<String>) -> Self {
        ApiResponse {
            code: code.as_u16(),
            status: "error",
            message: message.into(),
            data: Value::Null,
        }
    }
}

impl IntoResponse for ApiResponse {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        (status, Json(self)).into_response()
    }
}

fn status_code(error: &IntegrationError) -> StatusCode {
    match error {
        IntegrationError::InvalidApiKeys(_)
        | IntegrationError::InvalidCredentials
        | IntegrationError::AccountInactive
        | IntegrationError::IncorrectPlatform(_)
        | IntegrationError::RequestBody(_)
        | IntegrationError::Scope(ScopeError::InvalidArgument(_))
        | IntegrationError::CacheKey(CacheKeyError::ScopeValidation(_))
        | IntegrationError::CacheKey(CacheKeyError::Scope(ScopeError::InvalidArgument(_))) => {
            StatusCode::BAD_REQUEST
        }
        IntegrationError::AccountNotFound
        | IntegrationError::Scope(ScopeError::NotFound { .. })
        | IntegrationError::CacheKey(CacheKeyError::Scope(ScopeError::NotFound { .. })) => {
            StatusCode::NOT_FOUND
        }
        IntegrationError::AlreadyIntegrated { .. } => StatusCode::CONFLICT,
        IntegrationError::AccountLookupFailed(_)
        | IntegrationError::IncompleteAccount(_)
        | IntegrationError::HttpClient(_)
        | IntegrationError::Url(_) => StatusCode::BAD_GATEWAY,
        IntegrationError::Serialization(_) | IntegrationError::Io(_) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

impl IntoResponse for IntegrationError {
    fn into_response(self) -> Response {
        let status = status_code(&self);
        if status.is_server_error() {
            tracing::error!(error = %self, "Integration request failed");
        } else {
            tracing::debug!(error = %self, "Integration request rejected");
        }
        ApiResponse::error(status, self.to_string()).into_response()
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CheckApiKeysRequest {
    api_key: String,
    auth_key: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct IntegrateApiKeysRequest {
    api_key: String,
    auth_key: String,
    scope_id: u32,
    scope_type: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RemoveApiKeysRequest {
    scope_id: u32,
    scope_type: String,
}

fn parse<T>(payload: std::result::Result<Json<T>, JsonRejection>) -> Result<T> {
    payload
        .map(|Json(request)| request)
        .map_err(|rejection| IntegrationError::RequestBody(rejection.body_text()))
}

pub fn router(state: ApiState) -> Router {
    Router::new()
        .route(&format!("{API_PREFIX}/checkApiKeys"), post(check_api_keys))
        .route(
            &format!("{API_PREFIX}/integrateApiKeys"),
            post(integrate_api_keys),
        )
        .route(&format!("{API_PREFIX}/removeApiKeys"), post(remove_api_keys))
        .route(&format!("{API_PREFIX}/status"), get(status))
        .route_layer(middleware::from_fn(record_request))
        .fallback(not_found)
        .with_state(state)
}

async fn record_request(request: Request, next: Next) -> Response {
    let endpoint = request
        .extensions()
        .get::<MatchedPath>()
        .map(|path| path.as_str().trim_start_matches(API_PREFIX).to_string())
        .unwrap_or_default();

    let response = next.run(request).await;

    counter!(
        API_REQUESTS,
        "endpoint" => endpoint,
        "status" => response.status().as_u16().to_string()
    )
    .increment(1);
    response
}

async fn not_found() -> ApiResponse {
    ApiResponse::error(StatusCode::NOT_FOUND, "Route not found")
}

async fn check_api_keys(
    State(state): State<ApiState>,
    payload: std::result::Result<Json<CheckApiKeysRequest>, JsonRejection>,
) -> Result<ApiResponse> {
    let request = parse(payload)?;
    let keys = ApiKeys::new(request.api_key, request.auth_key);

    let account = state.service.check_api_keys(&keys).await?;
    Ok(ApiResponse::success(
        "API keys are valid",
        serde_json::to_value(&account)?,
    ))
}

async fn integrate_api_keys(
    State(state): State<ApiState>,
    payload: std::result::Result<Json<IntegrateApiKeysRequest>, JsonRejection>,
) -> Result<ApiResponse> {
    let request = parse(payload)?;
    let keys = ApiKeys::new(request.api_key, request.auth_key);

    let account = state
        .service
        .integrate_api_keys(&keys, request.scope_id, &request.scope_type)
        .await?;
    Ok(ApiResponse::success(
        "API keys integrated",
        serde_json::to_value(&account)?,
    ))
}

async fn remove_api_keys(
    State(state): State<ApiState>,
    payload: std::result::Result<Json<RemoveApiKeysRequest>, JsonRejection>,
) -> Result<ApiResponse> {
    let request = parse(payload)?;

    let removed = state
        .service
        .remove_api_keys(request.scope_id, &request.scope_type)?;
    let message = match removed {
        true => "API keys removed",
        false => "No API keys were integrated with this scope",
    };
    Ok(ApiResponse::success(
        message,
        serde_json::json!({ "removed": removed }),
    ))
}

async fn status(State(state): State<ApiState>) -> Result<ApiResponse> {
    let rows = state.status.get_status()?;
    Ok(ApiResponse::success(
        "Integration status",
        serde_json::to_value(&rows)?,
    ))
}

/// Serves the web API and the admin listener until either fails.
pub async fn run<F>(config: &Config, state: ApiState, is_ready: F) -> Result<()>
where
    F: Fn() -> bool + Send + Sync + 'static,
{
    let listener = TcpListener::bind(format!(
        "{}:{}",
        config.listener.host, config.listener.port
    ))
    .await?;
    tracing::info!(
        host = %config.listener.host,
        port = config.listener.port,
        "Serving web API"
    );

    let api_task = async {
        axum::serve(listener, router(state))
            .await
            .map_err(IntegrationError::from)
    };
    let admin_task = run_http_service::<_, Infallible, IntegrationError>(
        &config.admin_listener.host,
        config.admin_listener.port,
        AdminService::new(is_ready),
    );

    tokio::try_join!(api_task, admin_task)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::account_feature_cache::AccountFeatureCache;
    use crate::api_keys::{ApiKeyProvider, ApiKeyStorage};
    use crate::cache::MokaCache;
    use crate::cache_key::CacheKeyResolver;
    use crate::serializer::JsonSerializer;
    use crate::testutils::{MockAccountLookup, registry};
    use axum::body::Body;
    use scope::config_value::InMemoryConfigStore;
    use std::time::Duration;
    use tower::ServiceExt;

    fn app() -> Router {
        let registry = registry();
        let store = Arc::new(InMemoryConfigStore::new(registry.clone()));
        let provider = ApiKeyProvider::new(store.clone(), registry.clone());
        let feature_cache = AccountFeatureCache::new(
            Arc::new(MokaCache::new(100)),
            Arc::new(JsonSerializer),
            CacheKeyResolver::new(registry.clone()),
            Duration::from_secs(60),
        );
        let service = IntegrationService::new(
            registry.clone(),
            Arc::new(MockAccountLookup::new()),
            provider.clone(),
            ApiKeyStorage::new(store),
            feature_cache.clone(),
        );
        let status = IntegrationStatusProvider::new(registry, provider, feature_cache);
        router(ApiState::new(Arc::new(service), Arc::new(status)))
    }

    async fn call(
        app: &Router,
        method: &str,
        path: &str,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = axum::http::Request::builder()
            .method(method)
            .uri(format!("{API_PREFIX}{path}"));
        let body = match body {
            Some(body) => {
                builder = builder.header("content-type", "application/json");
                Body::from(body.to_string())
            }
            None => Body::empty(),
        };

        let response = app
            .clone()
            .oneshot(builder.body(body).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_check_api_keys() {
        let app = app();
        let (status, body) = call(
            &app,
            "POST",
            "/checkApiKeys",
            Some(serde_json::json!({"apiKey": "klevu-1234567890", "authKey": "ABCDE1234567890"})),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["code"], 200);
        assert_eq!(body["status"], "success");
        assert_eq!(body["data"]["platform"], "magento");

        let (status, body) = call(
            &app,
            "POST",
            "/checkApiKeys",
            Some(serde_json::json!({"apiKey": "nope", "authKey": "ABCDE1234567890"})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["status"], "error");
        assert_eq!(body["data"], Value::Null);
    }

    #[tokio::test]
    async fn test_integrate_status_and_remove() {
        let app = app();
        let keys = serde_json::json!({
            "apiKey": "klevu-1234567890",
            "authKey": "ABCDE1234567890",
            "scopeId": 5,
            "scopeType": "stores",
        });

        let (status, _) = call(&app, "POST", "/integrateApiKeys", Some(keys.clone())).await;
        assert_eq!(status, StatusCode::OK);

        let (status, body) = call(&app, "GET", "/status", None).await;
        assert_eq!(status, StatusCode::OK);
        let rows = body["data"].as_array().unwrap();
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[1]["storeId"], 5);
        assert_eq!(rows[1]["integrated"], true);
        assert_eq!(rows[2]["integrated"], false);

        // Same keys on another store
        let mut other = keys.clone();
        other["scopeId"] = 6.into();
        let (status, body) = call(&app, "POST", "/integrateApiKeys", Some(other)).await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body["code"], 409);

        let (status, body) = call(
            &app,
            "POST",
            "/removeApiKeys",
            Some(serde_json::json!({"scopeId": 5, "scopeType": "store"})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["removed"], true);
    }

    #[tokio::test]
    async fn test_scope_errors() {
        let app = app();

        let (status, body) = call(
            &app,
            "POST",
            "/removeApiKeys",
            Some(serde_json::json!({"scopeId": 1, "scopeType": "groups"})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["message"].as_str().unwrap().contains("groups"));

        let (status, _) = call(
            &app,
            "POST",
            "/removeApiKeys",
            Some(serde_json::json!({"scopeId": 99, "scopeType": "stores"})),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_invalid_requests() {
        let app = app();

        let (status, body) = call(
            &app,
            "POST",
            "/integrateApiKeys",
            Some(serde_json::json!({"apiKey": "klevu-1234567890"})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["status"], "error");

        let (status, _) = call(&app, "POST", "/checkApiKeys", None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, body) = call(&app, "GET", "/unknown", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["code"], 404);
    }

    #[test]
    fn test_status_codes() {
        assert_eq!(
            status_code(&IntegrationError::AccountLookupFailed(500)),
            StatusCode::BAD_GATEWAY
        );
        assert_eq!(
            status_code(&IntegrationError::CacheKey(CacheKeyError::ScopeValidation(
                "default".into()
            ))),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            status_code(&IntegrationError::Scope(ScopeError::website_not_found(9))),
            StatusCode::NOT_FOUND
        );
    }
}
