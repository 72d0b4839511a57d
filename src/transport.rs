//! Single bounded HTTP exchange.
//!
//! [`HttpExecutor`] performs exactly one network attempt per call: it starts
//! a timer alongside the exchange and, if the timer fires first, drops the
//! in-flight call and raises a timeout error whose message carries the
//! configured budget. Retrying is layered outside, in
//! [`reliability`](crate::reliability).

use std::time::Duration;

use reqwest::{Client, RequestBuilder, Response};

use crate::error::{ClientError, Result};

const POOL_MAX_IDLE_PER_HOST: usize = 10;
const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Executes one HTTP exchange bounded by the configured timeout.
///
/// Wraps a pooled [`reqwest::Client`]; clones share the pool.
#[derive(Debug, Clone)]
pub struct HttpExecutor {
    client: Client,
    timeout_ms: u64,
}

impl HttpExecutor {
    /// Creates an executor with a connection-pooled client.
    ///
    /// The total-time budget is enforced per call by [`execute`](Self::execute)
    /// rather than by the client builder, so a cancelled call never leaves a
    /// live timer behind.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying client cannot be constructed.
    pub fn new(timeout_ms: u64) -> Result<Self> {
        let client = Client::builder()
            .pool_max_idle_per_host(POOL_MAX_IDLE_PER_HOST)
            .connect_timeout(CONNECT_TIMEOUT)
            .build()?;
        Ok(Self { client, timeout_ms })
    }

    /// The client used to build requests against this executor.
    #[must_use]
    pub const fn client(&self) -> &Client {
        &self.client
    }

    /// Configured per-call time budget.
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Sends the request, waiting at most the configured timeout.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Timeout`] when the budget elapses (the
    /// in-flight exchange is cancelled by dropping it) and
    /// [`ClientError::Http`] for transport failures.
    pub async fn execute(&self, request: RequestBuilder) -> Result<Response> {
        match tokio::time::timeout(self.timeout(), request.send()).await {
            Ok(outcome) => Ok(outcome?),
            Err(_elapsed) => Err(ClientError::Timeout(self.timeout_ms)),
        }
    }
}
