//! Session token acquisition and caching.

use std::{
    sync::{Mutex, PoisonError},
    time::{Duration, Instant},
};

use reqwest::header::ACCEPT;
use serde_json::Value;
use tracing::{debug, instrument};

use crate::{
    auth::{signed_digest, utc_timestamp, Credentials, HashAlgorithm},
    error::{ClientError, Result},
    protocol::{parse_rpc_reply, RpcReply, RpcRequest},
    transport::HttpExecutor,
};

/// Fixed session lifetime advertised by the provider.
pub const SESSION_LIFETIME: Duration = Duration::from_secs(30 * 60);

/// Safety margin before expiry after which a cached token is not reused.
///
/// Prevents a token from expiring on the remote side while a call carrying
/// it is still in flight.
pub const SESSION_SAFETY_MARGIN: Duration = Duration::from_secs(5 * 60);

const LOGIN_METHOD: &str = "login";
const LOGIN_REQUEST_ID: u64 = 1;

#[derive(Debug, Clone)]
struct Session {
    token: String,
    expires_at: Instant,
}

/// Obtains and caches the short-lived session token required on every
/// JSON-RPC call.
///
/// The cache holds at most one token. A token is reused only while the
/// current time is more than [`SESSION_SAFETY_MARGIN`] before its expiry;
/// past that point the next acquire performs a fresh login. Login failures
/// are never cached and never retried here; retrying is the caller's
/// concern.
///
/// The cache lock is never held across the login await, so concurrent
/// acquires on a stale cache may each log in; the last one to finish
/// overwrites the cache, and every in-flight call keeps the token it
/// captured.
#[derive(Debug)]
pub struct SessionManager {
    credentials: Credentials,
    rpc_url: String,
    executor: HttpExecutor,
    cached: Mutex<Option<Session>>,
}

impl SessionManager {
    pub(crate) fn new(credentials: Credentials, rpc_url: String, executor: HttpExecutor) -> Self {
        Self { credentials, rpc_url, executor, cached: Mutex::new(None) }
    }

    /// Returns a valid session token, logging in when the cache is empty or
    /// about to expire.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Login`] when the remote service rejects the
    /// login or returns no token, and transport errors when the login call
    /// itself fails.
    pub async fn acquire(&self) -> Result<String> {
        if let Some(token) = self.cached_token() {
            debug!("reusing cached session token");
            return Ok(token);
        }

        let token = self.login().await?;
        self.store(Session { token: token.clone(), expires_at: Instant::now() + SESSION_LIFETIME });
        Ok(token)
    }

    /// Drops the cached token unconditionally; the next acquire logs in
    /// again. Idempotent.
    pub fn invalidate(&self) {
        *self.lock() = None;
        debug!("session cache cleared");
    }

    fn cached_token(&self) -> Option<String> {
        let guard = self.lock();
        let session = guard.as_ref()?;
        let usable_until = session.expires_at.checked_sub(SESSION_SAFETY_MARGIN)?;
        (Instant::now() < usable_until).then(|| session.token.clone())
    }

    fn store(&self, session: Session) {
        *self.lock() = Some(session);
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Option<Session>> {
        self.cached.lock().unwrap_or_else(PoisonError::into_inner)
    }

    #[instrument(skip(self))]
    async fn login(&self) -> Result<String> {
        let date = utc_timestamp();
        let hash = signed_digest(
            &self.credentials.merchant_code,
            &self.credentials.secret_key,
            &date,
            HashAlgorithm::Sha256,
        );
        let request = RpcRequest::new(
            LOGIN_REQUEST_ID,
            LOGIN_METHOD,
            vec![
                Value::String(self.credentials.merchant_code.clone()),
                Value::String(date),
                Value::String(hash),
                Value::String(HashAlgorithm::Sha256.tag().to_owned()),
            ],
        );

        let builder = self
            .executor
            .client()
            .post(&self.rpc_url)
            .header(ACCEPT, "application/json")
            .json(&request);
        let response = self.executor.execute(builder).await?;

        let status = response.status();
        if !status.is_success() {
            return Err(ClientError::Login(format!(
                "{} {}",
                status.as_u16(),
                status.canonical_reason().unwrap_or("unknown status")
            )));
        }

        let bytes = response.bytes().await?;
        let payload: Value = serde_json::from_slice(&bytes)
            .map_err(|e| ClientError::Login(format!("malformed login response: {e}")))?;

        match parse_rpc_reply(&payload).map_err(|e| ClientError::Login(e.message))? {
            RpcReply::Error(error) => Err(ClientError::Login(error.message)),
            RpcReply::Result(value) => value
                .as_str()
                .map(str::to_owned)
                .ok_or_else(|| ClientError::Login("no session token returned".to_owned())),
        }
    }
}
