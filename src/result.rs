//! The uniform success/failure envelope returned by every client operation.

use std::fmt;

/// Error codes produced by the client runtime itself.
///
/// Remote business errors keep whatever code the provider returned; the
/// constants here cover the conditions the client detects locally.
pub mod codes {
    /// A network-level failure (connect, TLS, transfer).
    pub const NETWORK_ERROR: &str = "NETWORK_ERROR";
    /// The request exceeded the configured time budget.
    pub const TIMEOUT_ERROR: &str = "TIMEOUT_ERROR";
    /// The peer reset the connection mid-exchange.
    pub const CONNECTION_RESET: &str = "CONNECTION_RESET";
    /// The peer refused the connection.
    pub const CONNECTION_REFUSED: &str = "CONNECTION_REFUSED";
    /// The connection attempt timed out.
    pub const CONNECTION_TIMED_OUT: &str = "CONNECTION_TIMED_OUT";
    /// Hostname resolution failed.
    pub const HOST_NOT_FOUND: &str = "HOST_NOT_FOUND";
    /// A raised failure that matched no more specific class.
    pub const REQUEST_ERROR: &str = "REQUEST_ERROR";
    /// Placeholder when no error was ever observed.
    pub const UNKNOWN_ERROR: &str = "UNKNOWN_ERROR";
    /// The response payload violated the expected envelope shape.
    pub const INVALID_RESPONSE: &str = "INVALID_RESPONSE";
}

/// Describes a failed operation: a machine-readable code plus a
/// human-readable message.
///
/// The code is either an HTTP status (`"404"`), a remote error code
/// (`"-32001"`, `"ORDER_NOT_FOUND"`), or one of the locally produced
/// [`codes`]. The tool layer maps codes through
/// [`error_message`](crate::messages::error_message) before showing text to
/// its own caller, but the code itself is never hidden.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiError {
    /// Machine-readable error code.
    pub code: String,
    /// Human-readable description.
    pub message: String,
}

impl ApiError {
    /// Creates an error descriptor.
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self { code: code.into(), message: message.into() }
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code, self.message)
    }
}

/// Tagged outcome of a client operation.
///
/// Every public request operation resolves to this type. Expected failures
/// (remote rejections, malformed responses, exhausted retries) arrive as
/// [`Failure`](Self::Failure); callers branch on the tag instead of catching
/// errors.
///
/// # Examples
///
/// ```
/// use twopay_client::{ApiError, ApiResult};
///
/// let ok: ApiResult<u32> = ApiResult::Success(7);
/// assert!(ok.is_success());
///
/// let failed: ApiResult<u32> = ApiResult::failure("ORDER_NOT_FOUND", "no such order");
/// match failed {
///     ApiResult::Success(_) => unreachable!(),
///     ApiResult::Failure(error) => assert_eq!(error.code, "ORDER_NOT_FOUND"),
/// }
/// ```
#[derive(Debug, Clone, PartialEq)]
pub enum ApiResult<T> {
    /// The operation completed and produced a payload.
    Success(T),
    /// The operation resolved to a well-formed failure.
    Failure(ApiError),
}

impl<T> ApiResult<T> {
    /// Shorthand for building a failure from a code and a message.
    pub fn failure(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Failure(ApiError::new(code, message))
    }

    /// Returns `true` for the success tag.
    #[must_use]
    pub const fn is_success(&self) -> bool {
        matches!(self, Self::Success(_))
    }

    /// Returns the error descriptor when the operation failed.
    #[must_use]
    pub const fn error(&self) -> Option<&ApiError> {
        match self {
            Self::Success(_) => None,
            Self::Failure(error) => Some(error),
        }
    }

    /// Converts into a standard [`Result`], discarding the tag.
    pub fn into_result(self) -> std::result::Result<T, ApiError> {
        match self {
            Self::Success(value) => Ok(value),
            Self::Failure(error) => Err(error),
        }
    }

    /// Maps the success payload, leaving failures untouched.
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> ApiResult<U> {
        match self {
            Self::Success(value) => ApiResult::Success(f(value)),
            Self::Failure(error) => ApiResult::Failure(error),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_success_tag() {
        let result: ApiResult<&str> = ApiResult::Success("payload");
        assert!(result.is_success());
        assert!(result.error().is_none());
    }

    #[test]
    fn test_failure_tag() {
        let result: ApiResult<()> = ApiResult::failure("404", "Not Found");
        assert!(!result.is_success());
        assert_eq!(result.error().unwrap().code, "404");
    }

    #[test]
    fn test_into_result() {
        let ok: ApiResult<u32> = ApiResult::Success(1);
        assert_eq!(ok.into_result().unwrap(), 1);

        let failed: ApiResult<u32> = ApiResult::failure("X", "boom");
        assert_eq!(failed.into_result().unwrap_err().message, "boom");
    }

    #[test]
    fn test_map_preserves_failure() {
        let failed: ApiResult<u32> = ApiResult::failure("X", "boom");
        let mapped = failed.map(|n| n + 1);
        assert_eq!(mapped.error().unwrap().code, "X");

        let ok: ApiResult<u32> = ApiResult::Success(1);
        assert_eq!(ok.map(|n| n + 1), ApiResult::Success(2));
    }

    #[test]
    fn test_api_error_display() {
        let error = ApiError::new("TIMEOUT_ERROR", "request timeout after 100ms");
        assert_eq!(error.to_string(), "TIMEOUT_ERROR: request timeout after 100ms");
    }
}
