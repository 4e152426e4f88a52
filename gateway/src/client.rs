//! Pesapal API client implementation

use crate::{
    credentials::Credentials,
    error::{GatewayError, Result},
    token::{parse_expiry, Clock, SystemClock, Token, TokenCache},
    types::{AuthResponse, IpnRegistration, IpnResponse, OrderRequest, OrderResponse, OrderStatus},
};
use reqwest::{
    header::{HeaderMap, HeaderValue, ACCEPT, CACHE_CONTROL, CONTENT_TYPE},
    Client, RequestBuilder, StatusCode,
};
use serde::de::DeserializeOwned;
use std::{sync::Arc, time::Duration};

/// Production endpoint
pub const LIVE_BASE_URL: &str = "https://pay.pesapal.com/v3/";

/// Sandbox endpoint
pub const SANDBOX_BASE_URL: &str = "https://cybqa.pesapal.com/pesapalv3/";

/// Per-request timeout applied when none is configured
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

const AUTH_ENDPOINT: &str = "api/Auth/RequestToken";
const SUBMIT_ORDER_ENDPOINT: &str = "api/Transactions/SubmitOrderRequest";
const REGISTER_IPN_ENDPOINT: &str = "api/URLSetup/RegisterIPN";
const ORDER_STATUS_ENDPOINT: &str = "api/Transactions/GetTransactionStatus";

/// Pesapal API client
///
/// Owns a single bearer token slot. Clones share the slot and the underlying
/// connection pool.
#[derive(Clone)]
pub struct PesapalClient {
    client: Client,
    base_url: String,
    tokens: Arc<TokenCache>,
    clock: Arc<dyn Clock>,
}

impl std::fmt::Debug for PesapalClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PesapalClient")
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

/// Builder for [`PesapalClient`]
pub struct PesapalClientBuilder {
    base_url: String,
    timeout: Duration,
    clock: Arc<dyn Clock>,
}

impl Default for PesapalClientBuilder {
    fn default() -> Self {
        Self {
            base_url: LIVE_BASE_URL.to_string(),
            timeout: DEFAULT_TIMEOUT,
            clock: Arc::new(SystemClock),
        }
    }
}

impl PesapalClientBuilder {
    /// Point the client at another deployment (sandbox, mock server)
    #[must_use]
    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Use the sandbox endpoint
    #[must_use]
    pub fn sandbox(self) -> Self {
        self.base_url(SANDBOX_BASE_URL)
    }

    /// Override the per-request timeout
    #[must_use]
    pub const fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Inject the clock used for token freshness checks
    #[must_use]
    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Build the client
    ///
    /// # Errors
    ///
    /// Returns `GatewayError::Network` if the TLS backend cannot be initialized
    pub fn build(self) -> Result<PesapalClient> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        headers.insert(CACHE_CONTROL, HeaderValue::from_static("no-cache"));

        let client = Client::builder()
            .default_headers(headers)
            .timeout(self.timeout)
            .build()
            .map_err(|e| GatewayError::Network {
                message: e.to_string(),
            })?;

        let mut base_url = self.base_url;
        if !base_url.ends_with('/') {
            base_url.push('/');
        }

        Ok(PesapalClient {
            client,
            base_url,
            tokens: Arc::new(TokenCache::new()),
            clock: self.clock,
        })
    }
}

impl PesapalClient {
    /// Start building a client
    #[must_use]
    pub fn builder() -> PesapalClientBuilder {
        PesapalClientBuilder::default()
    }

    /// Base URL requests are resolved against
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// The cached token, if still usable
    pub async fn cached_token(&self) -> Option<Token> {
        self.tokens.current(self.clock.now()).await
    }

    /// Request a fresh bearer token and cache it
    ///
    /// # Errors
    ///
    /// Returns `GatewayError::Auth` for any failure: transport, timeout,
    /// non-2xx status, or a body without a usable token
    pub async fn authenticate(&self, credentials: &Credentials) -> Result<Token> {
        let request = self.client.post(self.url(AUTH_ENDPOINT)).json(credentials);
        let response: AuthResponse = send(request).await.map_err(GatewayError::into_auth)?;

        let token = token_from(response)?;
        self.tokens.store(token.clone()).await;

        tracing::debug!(expiry = %token.expiry, "Obtained gateway token");
        Ok(token)
    }

    /// Submit an order for hosted checkout
    ///
    /// Authenticates first when no valid token is cached.
    ///
    /// # Errors
    ///
    /// Returns auth, timeout, network, HTTP status or parsing errors
    pub async fn submit_order(
        &self,
        order: &OrderRequest,
        credentials: &Credentials,
    ) -> Result<OrderResponse> {
        let token = self.bearer(credentials).await?;
        let request = self
            .client
            .post(self.url(SUBMIT_ORDER_ENDPOINT))
            .bearer_auth(token)
            .json(order);

        tracing::debug!(order_id = %order.id, amount = order.amount, "Submitting order");
        self.send_authenticated(request).await
    }

    /// Register the URL the provider calls on payment status changes
    ///
    /// # Errors
    ///
    /// Returns auth, timeout, network, HTTP status or parsing errors
    pub async fn register_ipn(
        &self,
        registration: &IpnRegistration,
        credentials: &Credentials,
    ) -> Result<IpnResponse> {
        let token = self.bearer(credentials).await?;
        let request = self
            .client
            .post(self.url(REGISTER_IPN_ENDPOINT))
            .bearer_auth(token)
            .json(registration);

        self.send_authenticated(request).await
    }

    /// Query the payment status of a submitted order
    ///
    /// # Errors
    ///
    /// Returns auth, timeout, network, HTTP status or parsing errors
    pub async fn get_order_status(
        &self,
        order_tracking_id: &str,
        credentials: &Credentials,
    ) -> Result<OrderStatus> {
        let token = self.bearer(credentials).await?;
        let request = self
            .client
            .get(self.url(ORDER_STATUS_ENDPOINT))
            .bearer_auth(token)
            .query(&[("orderTrackingId", order_tracking_id)]);

        self.send_authenticated(request).await
    }

    fn url(&self, endpoint: &str) -> String {
        format!("{}{endpoint}", self.base_url)
    }

    /// Cached token value, authenticating first when it is missing or stale
    async fn bearer(&self, credentials: &Credentials) -> Result<String> {
        if let Some(token) = self.tokens.current(self.clock.now()).await {
            return Ok(token.value);
        }
        Ok(self.authenticate(credentials).await?.value)
    }

    /// Like `send`, but forgets the cached token when the provider rejects it
    async fn send_authenticated<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T> {
        let result = send(request).await;
        if let Err(GatewayError::Api {
            status: 401 | 403, ..
        }) = &result
        {
            self.tokens.clear().await;
        }
        result
    }
}

async fn send<T: DeserializeOwned>(request: RequestBuilder) -> Result<T> {
    let response = request
        .send()
        .await
        .map_err(|e| GatewayError::from_transport(&e))?;

    let status = response.status();
    if !status.is_success() {
        let raw_body = response.text().await.unwrap_or_default();
        let err = api_error(status, raw_body);
        tracing::warn!(status = status.as_u16(), error = %err, "Gateway returned an error status");
        return Err(err);
    }

    let body = response
        .text()
        .await
        .map_err(|e| GatewayError::from_transport(&e))?;

    serde_json::from_str(&body).map_err(|e| GatewayError::ResponseParse(e.to_string()))
}

fn token_from(response: AuthResponse) -> Result<Token> {
    let value = response.token.filter(|t| !t.trim().is_empty());
    let expiry = response.expiry_date.as_deref().and_then(parse_expiry);

    match (value, expiry) {
        (Some(value), Some(expiry)) => Ok(Token::new(value, expiry)),
        (Some(_), None) => Err(GatewayError::Auth {
            status: None,
            message: "Token response has no valid expiry".to_string(),
        }),
        (None, _) => {
            let embedded = response.error.and_then(|e| {
                e.message
                    .filter(|m| !m.is_empty())
                    .or(e.code.filter(|c| !c.is_empty()))
            });
            Err(GatewayError::Auth {
                status: response.status.as_deref().and_then(|s| s.parse().ok()),
                message: embedded
                    .or(response.message)
                    .unwrap_or_else(|| "No token in response".to_string()),
            })
        }
    }
}

/// Build an `Api` error from a non-2xx response body
fn api_error(status: StatusCode, raw_body: String) -> GatewayError {
    let message = match serde_json::from_str::<serde_json::Value>(&raw_body) {
        Ok(body) => body["message"]
            .as_str()
            .or_else(|| body["error"]["message"].as_str())
            .or_else(|| body["error"].as_str())
            .filter(|m| !m.is_empty())
            .map(ToString::to_string)
            .or_else(|| status.canonical_reason().map(ToString::to_string))
            .unwrap_or_else(|| format!("HTTP {}", status.as_u16())),
        Err(_) => "Failed to parse error response".to_string(),
    };

    GatewayError::Api {
        status: status.as_u16(),
        message,
        raw_body,
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_client_creation() {
        let client = PesapalClient::builder().build().unwrap();
        assert_eq!(client.base_url(), LIVE_BASE_URL);

        let sandbox = PesapalClient::builder().sandbox().build().unwrap();
        assert_eq!(sandbox.base_url(), SANDBOX_BASE_URL);
    }

    #[test]
    fn test_base_url_gets_trailing_slash() {
        let client = PesapalClient::builder()
            .base_url("http://127.0.0.1:9999")
            .build()
            .unwrap();
        assert_eq!(
            client.url(AUTH_ENDPOINT),
            "http://127.0.0.1:9999/api/Auth/RequestToken"
        );
    }

    #[test]
    fn test_api_error_prefers_json_message() {
        let err = api_error(
            StatusCode::BAD_REQUEST,
            r#"{"message":"amount must be positive"}"#.to_string(),
        );
        assert_eq!(
            err,
            GatewayError::Api {
                status: 400,
                message: "amount must be positive".to_string(),
                raw_body: r#"{"message":"amount must be positive"}"#.to_string(),
            }
        );
    }

    #[test]
    fn test_api_error_nested_and_fallback_messages() {
        let nested = api_error(
            StatusCode::INTERNAL_SERVER_ERROR,
            r#"{"error":{"message":"upstream down"}}"#.to_string(),
        );
        assert!(matches!(nested, GatewayError::Api { ref message, .. } if message == "upstream down"));

        let reason_only = api_error(StatusCode::SERVICE_UNAVAILABLE, "{}".to_string());
        assert!(
            matches!(reason_only, GatewayError::Api { ref message, .. } if message == "Service Unavailable")
        );

        let html = api_error(StatusCode::BAD_GATEWAY, "<html>bad</html>".to_string());
        assert!(
            matches!(html, GatewayError::Api { ref message, .. } if message == "Failed to parse error response")
        );
    }

    #[test]
    fn test_token_from_rejected_response() {
        let err = token_from(AuthResponse {
            status: Some("500".to_string()),
            error: Some(crate::types::ProviderError {
                error_type: Some("api_error".to_string()),
                code: Some("invalid_consumer_key_or_secret_provided".to_string()),
                message: Some(String::new()),
            }),
            ..AuthResponse::default()
        })
        .unwrap_err();

        assert_eq!(
            err,
            GatewayError::Auth {
                status: Some(500),
                message: "invalid_consumer_key_or_secret_provided".to_string(),
            }
        );
    }

    #[test]
    fn test_token_from_requires_expiry() {
        let err = token_from(AuthResponse {
            token: Some("abc".to_string()),
            expiry_date: Some("garbage".to_string()),
            ..AuthResponse::default()
        })
        .unwrap_err();
        assert!(err.is_auth_failure());
    }
}
