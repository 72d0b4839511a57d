//! Reliability patterns for request execution.

pub mod retry;

pub use retry::{
    classify_error, execute_with_retry, is_retryable_code, RetryPolicy, RETRYABLE_ERROR_CODES,
};
