//! Bounded exponential-backoff retry for transient failures.
//!
//! Wraps one logical operation and re-executes it while its failures are
//! classified as transient. Well-formed remote rejections (validation
//! failures, business rules, auth errors) terminate immediately; only
//! network and timeout conditions consume further attempts.

use std::time::Duration;

use tracing::{debug, info, warn};

use crate::{
    error::ClientError,
    result::{codes, ApiError, ApiResult},
};

/// Error codes eligible for automatic re-attempt.
///
/// A failure is retryable when its code equals one of these entries or
/// contains one as a substring.
pub const RETRYABLE_ERROR_CODES: &[&str] = &[
    codes::NETWORK_ERROR,
    codes::TIMEOUT_ERROR,
    codes::CONNECTION_RESET,
    codes::CONNECTION_REFUSED,
    codes::CONNECTION_TIMED_OUT,
    codes::HOST_NOT_FOUND,
];

/// Retry tuning for one client instance.
///
/// An operation is executed at most `max_retries + 1` times; between attempt
/// `i` and `i + 1` the orchestrator waits `base_delay * 2^i`. The delay is
/// unjittered and there is no wall-clock ceiling; attempt count is the only
/// bound.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Maximum number of re-attempts after the first try.
    pub max_retries: u32,
    /// Delay before the first re-attempt; doubles each attempt.
    pub base_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: crate::config::DEFAULT_MAX_RETRIES,
            base_delay: Duration::from_millis(crate::config::DEFAULT_RETRY_DELAY_MS),
        }
    }
}

impl RetryPolicy {
    /// Creates a policy with the given bounds.
    #[must_use]
    pub const fn new(max_retries: u32, base_delay: Duration) -> Self {
        Self { max_retries, base_delay }
    }

    fn delay_for_attempt(&self, attempt: u32) -> Duration {
        let factor = 1u64.checked_shl(attempt).unwrap_or(u64::MAX);
        let millis = u64::try_from(self.base_delay.as_millis())
            .unwrap_or(u64::MAX)
            .saturating_mul(factor);
        Duration::from_millis(millis)
    }
}

/// Whether an error code is classified as transient.
///
/// Matches exactly or by substring, so a transport-qualified code such as
/// `RPC_NETWORK_ERROR` is still recognised.
#[must_use]
pub fn is_retryable_code(code: &str) -> bool {
    RETRYABLE_ERROR_CODES.iter().any(|retryable| code == *retryable || code.contains(retryable))
}

/// Classifies a raised failure into an error descriptor.
///
/// This is the single classification point shared by the retry loop and the
/// request paths: structured information from the transport is consulted
/// first, then message content. Anything unrecognised becomes a
/// non-retryable `REQUEST_ERROR`.
#[must_use]
pub fn classify_error(error: &ClientError) -> ApiError {
    match error {
        ClientError::Timeout(_) => ApiError::new(codes::TIMEOUT_ERROR, error.to_string()),
        ClientError::Http(source) => {
            let message = error_chain(source);
            if source.is_timeout() {
                return ApiError::new(codes::TIMEOUT_ERROR, message);
            }
            let fallback =
                if source.is_connect() { codes::NETWORK_ERROR } else { codes::REQUEST_ERROR };
            let code = sniff_code(&message).unwrap_or(fallback);
            ApiError::new(code, message)
        }
        other => {
            let message = other.to_string();
            let code = sniff_code(&message).unwrap_or(codes::REQUEST_ERROR);
            ApiError::new(code, message)
        }
    }
}

/// Executes `operation` with bounded exponential-backoff retry.
///
/// The operation either resolves to an [`ApiResult`] or raises a
/// [`ClientError`]; a raised error is classified through [`classify_error`]
/// and then treated exactly like a returned failure. The first success or
/// non-retryable failure is returned as-is; after exhausting all attempts
/// the last failure is returned with its message annotated with the total
/// attempt count.
///
/// # Examples
///
/// ```
/// use std::time::Duration;
///
/// use twopay_client::{
///     reliability::{execute_with_retry, RetryPolicy},
///     ApiResult,
/// };
///
/// # async fn example() {
/// let policy = RetryPolicy::new(3, Duration::from_millis(50));
/// let result: ApiResult<u32> =
///     execute_with_retry(&policy, || async { Ok(ApiResult::Success(42)) }).await;
/// assert!(result.is_success());
/// # }
/// ```
pub async fn execute_with_retry<T, F, Fut>(policy: &RetryPolicy, mut operation: F) -> ApiResult<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = crate::error::Result<ApiResult<T>>>,
{
    let total_attempts = policy.max_retries + 1;
    let mut last_error = ApiError::new(codes::UNKNOWN_ERROR, "unknown error occurred");

    for attempt in 0..total_attempts {
        match operation().await {
            Ok(ApiResult::Success(value)) => {
                if attempt > 0 {
                    info!(attempt = attempt + 1, "request succeeded after retry");
                }
                return ApiResult::Success(value);
            }
            Ok(ApiResult::Failure(error)) => {
                if !is_retryable_code(&error.code) {
                    return ApiResult::Failure(error);
                }
                warn!(
                    attempt = attempt + 1,
                    total_attempts,
                    code = %error.code,
                    "retryable failure"
                );
                last_error = error;
            }
            Err(raised) => {
                let error = classify_error(&raised);
                if !is_retryable_code(&error.code) {
                    return ApiResult::Failure(error);
                }
                warn!(
                    attempt = attempt + 1,
                    total_attempts,
                    code = %error.code,
                    "retryable transport error"
                );
                last_error = error;
            }
        }

        // No wait after the final attempt.
        if attempt + 1 < total_attempts {
            let delay = policy.delay_for_attempt(attempt);
            debug!(delay_ms = delay.as_millis() as u64, "backing off before retry");
            tokio::time::sleep(delay).await;
        }
    }

    ApiResult::Failure(ApiError::new(
        last_error.code,
        format!("{} (after {total_attempts} attempts)", last_error.message),
    ))
}

fn sniff_code(message: &str) -> Option<&'static str> {
    let lowered = message.to_ascii_lowercase();
    if lowered.contains("timeout") {
        return Some(codes::TIMEOUT_ERROR);
    }
    if lowered.contains("connection reset") {
        return Some(codes::CONNECTION_RESET);
    }
    if lowered.contains("connection refused") {
        return Some(codes::CONNECTION_REFUSED);
    }
    if lowered.contains("timed out") {
        return Some(codes::CONNECTION_TIMED_OUT);
    }
    if lowered.contains("dns error")
        || lowered.contains("failed to lookup")
        || lowered.contains("name or service not known")
    {
        return Some(codes::HOST_NOT_FOUND);
    }
    if lowered.contains("error sending request")
        || lowered.contains("connection closed")
        || lowered.contains("incomplete message")
    {
        return Some(codes::NETWORK_ERROR);
    }
    None
}

fn error_chain(error: &dyn std::error::Error) -> String {
    let mut message = error.to_string();
    let mut source = error.source();
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    message
}

#[cfg(test)]
mod tests {
    use std::sync::{
        atomic::{AtomicU32, Ordering},
        Arc,
    };

    use super::*;

    #[tokio::test]
    async fn test_success_on_first_attempt() {
        let calls = Arc::new(AtomicU32::new(0));
        let policy = RetryPolicy::new(3, Duration::from_millis(1));

        let counter = Arc::clone(&calls);
        let result = execute_with_retry(&policy, || {
            let counter = Arc::clone(&counter);
            async move {
                counter.fetch_add(1, Ordering::SeqCst);
                Ok(ApiResult::Success(42))
            }
        })
        .await;

        assert_eq!(result, ApiResult::Success(42));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_retryable_failures_then_success() {
        let calls = Arc::new(AtomicU32::new(0));
        let policy = RetryPolicy::new(3, Duration::from_millis(1));

        let counter = Arc::clone(&calls);
        let result = execute_with_retry(&policy, || {
            let counter = Arc::clone(&counter);
            async move {
                let attempt = counter.fetch_add(1, Ordering::SeqCst);
                if attempt < 2 {
                    Ok(ApiResult::failure(codes::NETWORK_ERROR, "connection dropped"))
                } else {
                    Ok(ApiResult::Success(42))
                }
            }
        })
        .await;

        assert_eq!(result, ApiResult::Success(42));
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_non_retryable_failure_returns_immediately() {
        let calls = Arc::new(AtomicU32::new(0));
        let policy = RetryPolicy::new(3, Duration::from_millis(1));

        let counter = Arc::clone(&calls);
        let result: ApiResult<u32> = execute_with_retry(&policy, || {
            let counter = Arc::clone(&counter);
            async move {
                counter.fetch_add(1, Ordering::SeqCst);
                Ok(ApiResult::failure("INVALID_CUSTOMER", "bad email"))
            }
        })
        .await;

        let error = result.error().unwrap();
        assert_eq!(error.code, "INVALID_CUSTOMER");
        assert_eq!(error.message, "bad email");
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_exhaustion_annotates_attempt_count() {
        let calls = Arc::new(AtomicU32::new(0));
        let policy = RetryPolicy::new(2, Duration::from_millis(1));

        let counter = Arc::clone(&calls);
        let result: ApiResult<u32> = execute_with_retry(&policy, || {
            let counter = Arc::clone(&counter);
            async move {
                counter.fetch_add(1, Ordering::SeqCst);
                Ok(ApiResult::failure(codes::TIMEOUT_ERROR, "request timeout"))
            }
        })
        .await;

        let error = result.error().unwrap();
        assert_eq!(error.code, codes::TIMEOUT_ERROR);
        assert_eq!(error.message, "request timeout (after 3 attempts)");
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_raised_timeout_is_retried() {
        let calls = Arc::new(AtomicU32::new(0));
        let policy = RetryPolicy::new(1, Duration::from_millis(1));

        let counter = Arc::clone(&calls);
        let result: ApiResult<u32> = execute_with_retry(&policy, || {
            let counter = Arc::clone(&counter);
            async move {
                counter.fetch_add(1, Ordering::SeqCst);
                Err(ClientError::Timeout(100))
            }
        })
        .await;

        let error = result.error().unwrap();
        assert_eq!(error.code, codes::TIMEOUT_ERROR);
        assert!(error.message.ends_with("(after 2 attempts)"));
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_raised_non_retryable_returns_immediately() {
        let calls = Arc::new(AtomicU32::new(0));
        let policy = RetryPolicy::new(3, Duration::from_millis(1));

        let counter = Arc::clone(&calls);
        let result: ApiResult<u32> = execute_with_retry(&policy, || {
            let counter = Arc::clone(&counter);
            async move {
                counter.fetch_add(1, Ordering::SeqCst);
                Err(ClientError::Login("bad credentials".to_owned()))
            }
        })
        .await;

        assert_eq!(result.error().unwrap().code, codes::REQUEST_ERROR);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_backoff_delays_are_exponential() {
        let calls = Arc::new(AtomicU32::new(0));
        let policy = RetryPolicy::new(2, Duration::from_millis(10));

        let start = std::time::Instant::now();
        let counter = Arc::clone(&calls);
        let _result: ApiResult<u32> = execute_with_retry(&policy, || {
            let counter = Arc::clone(&counter);
            async move {
                counter.fetch_add(1, Ordering::SeqCst);
                Ok(ApiResult::failure(codes::NETWORK_ERROR, "down"))
            }
        })
        .await;
        let elapsed = start.elapsed();

        // Two waits: 10ms then 20ms.
        assert!(elapsed >= Duration::from_millis(30), "expected at least 30ms, got {elapsed:?}");
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[test]
    fn test_delay_for_attempt() {
        let policy = RetryPolicy::new(5, Duration::from_millis(100));
        assert_eq!(policy.delay_for_attempt(0), Duration::from_millis(100));
        assert_eq!(policy.delay_for_attempt(1), Duration::from_millis(200));
        assert_eq!(policy.delay_for_attempt(2), Duration::from_millis(400));
        assert_eq!(policy.delay_for_attempt(3), Duration::from_millis(800));
    }

    #[test]
    fn test_retryable_code_matching() {
        assert!(is_retryable_code(codes::NETWORK_ERROR));
        assert!(is_retryable_code(codes::CONNECTION_REFUSED));
        // Substring matches count too.
        assert!(is_retryable_code("RPC_NETWORK_ERROR"));
        assert!(!is_retryable_code("INVALID_CUSTOMER"));
        assert!(!is_retryable_code("404"));
        assert!(!is_retryable_code(""));
    }

    #[test]
    fn test_classify_timeout() {
        let error = classify_error(&ClientError::Timeout(5_000));
        assert_eq!(error.code, codes::TIMEOUT_ERROR);
        assert!(error.message.contains("timeout"));
        assert!(error.message.contains("5000ms"));
    }

    #[test]
    fn test_classify_unrecognised_message() {
        let error = classify_error(&ClientError::Login("bad credentials".to_owned()));
        assert_eq!(error.code, codes::REQUEST_ERROR);
    }

    #[test]
    fn test_sniff_code_variants() {
        assert_eq!(sniff_code("request timeout after 100ms"), Some(codes::TIMEOUT_ERROR));
        assert_eq!(sniff_code("Connection reset by peer"), Some(codes::CONNECTION_RESET));
        assert_eq!(sniff_code("connection refused"), Some(codes::CONNECTION_REFUSED));
        assert_eq!(sniff_code("operation timed out"), Some(codes::CONNECTION_TIMED_OUT));
        assert_eq!(
            sniff_code("dns error: failed to lookup address"),
            Some(codes::HOST_NOT_FOUND)
        );
        assert_eq!(sniff_code("error sending request"), Some(codes::NETWORK_ERROR));
        assert_eq!(sniff_code("something else entirely"), None);
    }

    #[test]
    fn test_default_policy_matches_config_defaults() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.max_retries, 3);
        assert_eq!(policy.base_delay, Duration::from_millis(1_000));
    }
}
