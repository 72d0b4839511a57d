//! The API client facade.
//!
//! Composes the authenticator, the bounded transport, the retry
//! orchestrator, and the response validators into the two public request
//! operations, [`rest_request`](ApiClient::rest_request) and
//! [`rpc_request`](ApiClient::rpc_request).

use std::{
    sync::atomic::{AtomicU64, Ordering},
    time::Duration,
};

use reqwest::{
    header::{ACCEPT, CONTENT_TYPE},
    Method,
};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, instrument};

use crate::{
    auth::{Authenticator, HashAlgorithm},
    config::ClientConfig,
    error::Result,
    protocol::{is_session_error, parse_rpc_reply, validate_rest_payload, RpcReply, RpcRequest},
    reliability::{execute_with_retry, RetryPolicy},
    result::{codes, ApiResult},
    transport::HttpExecutor,
};

/// Header carrying the request signature on REST calls.
const AUTH_HEADER: &str = "X-Avangate-Authentication";

/// Client for the 2Pay payment API.
///
/// One instance per configured credential set. All methods take `&self`;
/// concurrent calls share the session cache and the call-id counter.
///
/// # Examples
///
/// ```no_run
/// use reqwest::Method;
/// use serde_json::{json, Value};
/// use twopay_client::{ApiClient, ApiResult, ClientConfig};
///
/// # async fn example() -> twopay_client::Result<()> {
/// let client = ApiClient::new(ClientConfig::new("MY_MERCHANT", "my-secret"))?;
///
/// match client.rpc_request::<Value>("getOrder", vec![json!("ORDER-REF")]).await {
///     ApiResult::Success(order) => println!("order: {order}"),
///     ApiResult::Failure(error) => eprintln!("{}: {}", error.code, error.message),
/// }
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct ApiClient {
    auth: Authenticator,
    executor: HttpExecutor,
    retry: RetryPolicy,
    request_id: AtomicU64,
}

impl ApiClient {
    /// Creates a client from the given configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::MissingCredentials`](crate::ClientError) when
    /// either credential is empty and [`ClientError::Config`](crate::ClientError)
    /// for invalid tuning values; these are startup defects and are never
    /// reported through [`ApiResult`].
    pub fn new(config: ClientConfig) -> Result<Self> {
        config.validate()?;
        let executor = HttpExecutor::new(config.timeout_ms)?;
        let auth = Authenticator::new(&config, executor.clone());
        let retry = RetryPolicy::new(config.max_retries, config.retry_delay());
        Ok(Self { auth, executor, retry, request_id: AtomicU64::new(1) })
    }

    /// Executes a signed REST request.
    ///
    /// A fresh auth header is generated for the call; the body, when given,
    /// is attached for POST and PUT only. Transient transport failures are
    /// retried with backoff; non-2xx statuses, malformed payloads, and
    /// remote rejections resolve to [`ApiResult::Failure`] without retry.
    #[instrument(skip(self, body))]
    pub async fn rest_request<T: DeserializeOwned>(
        &self,
        method: Method,
        endpoint: &str,
        body: Option<Value>,
    ) -> ApiResult<T> {
        let url = format!("{}{endpoint}", self.auth.rest_url());
        let auth_header = self.auth.header_value(HashAlgorithm::default());

        execute_with_retry(&self.retry, || {
            self.rest_attempt(&method, &url, &auth_header, body.as_ref())
        })
        .await
    }

    /// Executes a session-authenticated JSON-RPC request.
    ///
    /// The session is acquired inside the retried operation, so a token
    /// invalidated mid-retry triggers a fresh login on the next attempt.
    /// Each call consumes one envelope id from the per-client counter; ids
    /// are monotonic and never reused.
    #[instrument(skip(self, params))]
    pub async fn rpc_request<T: DeserializeOwned>(
        &self,
        method: &str,
        params: Vec<Value>,
    ) -> ApiResult<T> {
        execute_with_retry(&self.retry, || self.rpc_attempt(method, &params)).await
    }

    /// The signature/session subcomponent, exposing the active endpoints.
    #[must_use]
    pub const fn auth(&self) -> &Authenticator {
        &self.auth
    }

    /// Configured per-request time budget.
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        self.executor.timeout()
    }

    /// Configured maximum retry attempts.
    #[must_use]
    pub const fn max_retries(&self) -> u32 {
        self.retry.max_retries
    }

    async fn rest_attempt<T: DeserializeOwned>(
        &self,
        method: &Method,
        url: &str,
        auth_header: &str,
        body: Option<&Value>,
    ) -> Result<ApiResult<T>> {
        let mut request = self
            .executor
            .client()
            .request(method.clone(), url)
            .header(CONTENT_TYPE, "application/json")
            .header(ACCEPT, "application/json")
            .header(AUTH_HEADER, auth_header);

        if let Some(body) = body
            && (*method == Method::POST || *method == Method::PUT)
        {
            request = request.json(body);
        }

        let response = self.executor.execute(request).await?;
        let status = response.status();
        let bytes = response.bytes().await?;

        let payload: Value = match serde_json::from_slice(&bytes) {
            Ok(value) => value,
            Err(_) if !status.is_success() => {
                return Ok(ApiResult::failure(status.as_str(), http_reason(status)));
            }
            Err(parse_error) => {
                return Ok(ApiResult::failure(
                    codes::INVALID_RESPONSE,
                    format!("response body is not valid JSON: {parse_error}"),
                ));
            }
        };

        if !status.is_success() {
            let message = payload
                .get("message")
                .and_then(Value::as_str)
                .or_else(|| payload.get("error_message").and_then(Value::as_str))
                .map_or_else(|| http_reason(status), str::to_owned);
            return Ok(ApiResult::failure(status.as_str(), message));
        }

        if let Err(error) = validate_rest_payload(&payload) {
            return Ok(ApiResult::Failure(error));
        }

        Ok(deserialize_payload(payload))
    }

    async fn rpc_attempt<T: DeserializeOwned>(
        &self,
        method: &str,
        params: &[Value],
    ) -> Result<ApiResult<T>> {
        let token = self.auth.session().acquire().await?;

        let mut call_params = Vec::with_capacity(params.len() + 1);
        call_params.push(Value::String(token));
        call_params.extend_from_slice(params);

        let id = self.request_id.fetch_add(1, Ordering::Relaxed);
        let envelope = RpcRequest::new(id, method, call_params);

        let request = self
            .executor
            .client()
            .post(self.auth.rpc_url())
            .header(ACCEPT, "application/json")
            .json(&envelope);

        let response = self.executor.execute(request).await?;
        let status = response.status();
        if !status.is_success() {
            return Ok(ApiResult::failure(status.as_str(), http_reason(status)));
        }

        let bytes = response.bytes().await?;
        let payload: Value = match serde_json::from_slice(&bytes) {
            Ok(value) => value,
            Err(parse_error) => {
                return Ok(ApiResult::failure(
                    codes::INVALID_RESPONSE,
                    format!("response body is not valid JSON: {parse_error}"),
                ));
            }
        };

        match parse_rpc_reply(&payload) {
            Err(error) => Ok(ApiResult::Failure(error)),
            Ok(RpcReply::Error(error)) => {
                if is_session_error(&error) {
                    debug!(code = error.code, "remote rejected the session, clearing cache");
                    self.auth.session().invalidate();
                }
                Ok(ApiResult::failure(error.code.to_string(), error.message))
            }
            Ok(RpcReply::Result(result)) => Ok(deserialize_payload(result)),
        }
    }
}

fn deserialize_payload<T: DeserializeOwned>(value: Value) -> ApiResult<T> {
    match serde_json::from_value(value) {
        Ok(data) => ApiResult::Success(data),
        Err(error) => ApiResult::failure(
            codes::INVALID_RESPONSE,
            format!("response did not match the expected shape: {error}"),
        ),
    }
}

fn http_reason(status: reqwest::StatusCode) -> String {
    status.canonical_reason().unwrap_or("unknown status").to_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ClientError;

    fn config() -> ClientConfig {
        let mut config = ClientConfig::new("TEST_MERCHANT", "test_secret_key_123");
        config.sandbox = true;
        config
    }

    #[test]
    fn test_construction_with_valid_config() {
        let client = ApiClient::new(config()).unwrap();
        assert_eq!(client.auth().rest_url(), "https://api.avangate.com/rest/6.0");
    }

    #[test]
    fn test_construction_rejects_missing_credentials() {
        let result = ApiClient::new(ClientConfig::new("", ""));
        assert!(matches!(result, Err(ClientError::MissingCredentials)));
    }

    #[test]
    fn test_default_accessors() {
        let client = ApiClient::new(config()).unwrap();
        assert_eq!(client.timeout(), Duration::from_millis(30_000));
        assert_eq!(client.max_retries(), 3);
    }

    #[test]
    fn test_custom_accessors() {
        let mut custom = config();
        custom.timeout_ms = 60_000;
        custom.max_retries = 5;
        let client = ApiClient::new(custom).unwrap();
        assert_eq!(client.timeout(), Duration::from_millis(60_000));
        assert_eq!(client.max_retries(), 5);
    }

    #[test]
    fn test_deserialize_payload_shape_mismatch() {
        #[derive(Debug, serde::Deserialize)]
        struct Expected {
            #[allow(dead_code)]
            ref_no: String,
        }

        let result: ApiResult<Expected> = deserialize_payload(serde_json::json!({"other": 1}));
        let error = result.error().unwrap();
        assert_eq!(error.code, codes::INVALID_RESPONSE);
    }

    #[tokio::test]
    async fn test_rpc_against_dead_endpoint_exhausts_retries() {
        let mut custom = config();
        custom.rpc_url = Some("http://127.0.0.1:1/rpc/".to_owned());
        custom.max_retries = 1;
        custom.retry_delay_ms = 1;
        let client = ApiClient::new(custom).unwrap();

        let result: ApiResult<Value> = client.rpc_request("getOrder", vec![]).await;
        let error = result.error().unwrap();
        assert!(crate::reliability::is_retryable_code(&error.code), "code: {}", error.code);
        assert!(error.message.ends_with("(after 2 attempts)"), "message: {}", error.message);
    }
}
