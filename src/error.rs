//! Error types for the 2Pay client.
//!
//! [`ClientError`] is the narrow raised-failure channel: it covers the cases
//! where an operation could not even produce a result (construction and
//! configuration problems, timeouts, transport breakdowns, login failures).
//! Expected remote failures never appear here; they travel through
//! [`ApiResult::Failure`](crate::ApiResult) instead, and callers branch on
//! that tag rather than catching errors.

use thiserror::Error;

/// Result type alias for client operations.
pub type Result<T> = std::result::Result<T, ClientError>;

/// Errors raised by the client runtime.
///
/// Configuration errors ([`MissingCredentials`](Self::MissingCredentials),
/// [`Config`](Self::Config)) are fatal at construction time and are never
/// retried or wrapped in an [`ApiResult`](crate::ApiResult). The remaining
/// variants are produced while executing a request and are classified by the
/// retry layer, which converts them into failure results.
#[must_use = "errors should be handled, propagated, or explicitly panicked"]
#[derive(Debug, Error)]
pub enum ClientError {
    /// Merchant code or secret key is missing or empty.
    ///
    /// Both credentials are required to construct a client; their absence is
    /// a startup defect, not a per-call condition.
    #[error("missing required credentials: merchant_code and secret_key must both be set")]
    MissingCredentials,

    /// A configuration value failed validation.
    #[error("invalid configuration: {0}")]
    Config(String),

    /// The request did not complete within the configured budget.
    ///
    /// The in-flight exchange is cancelled when the timer fires. The message
    /// deliberately contains the word "timeout" so content-based
    /// classification recognises it.
    #[error("request timeout after {0}ms")]
    Timeout(u64),

    /// The HTTP exchange itself failed.
    ///
    /// Wraps [`reqwest::Error`]: connection failures, DNS resolution
    /// problems, TLS errors, and malformed transfers all land here.
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The session login call was rejected or returned no token.
    #[error("login failed: {0}")]
    Login(String),
}
