//! Static lookup of user-friendly texts for well-known error codes.
//!
//! The tool layer passes `error.code` through [`error_message`] before
//! surfacing text to its own caller; unknown codes fall back to the
//! caller-supplied default so the underlying message is never lost.

/// Known error codes and their user-facing descriptions.
pub const ERROR_MESSAGES: &[(&str, &str)] = &[
    ("INVALID_CUSTOMER", "Customer information is invalid or missing required fields"),
    ("INVALID_PRODUCT", "Product code is invalid or product not found"),
    ("INVALID_PAYMENT", "Payment information is invalid"),
    ("TOKEN_EXPIRED", "Payment token has expired (tokens are valid for 30 minutes)"),
    ("INSUFFICIENT_FUNDS", "Payment declined due to insufficient funds"),
    ("CARD_DECLINED", "Credit card was declined by the issuing bank"),
    ("INVALID_CVV", "Card security code (CVV) is invalid"),
    ("EXPIRED_CARD", "Credit card has expired"),
    ("SUBSCRIPTION_NOT_FOUND", "Subscription reference not found"),
    ("ORDER_NOT_FOUND", "Order reference not found"),
    ("INVALID_PROMOTION", "Promotion code is invalid or expired"),
    ("FRAUD_DETECTED", "Transaction flagged for potential fraud"),
    ("DUPLICATE_ORDER", "Duplicate order detected"),
    ("CURRENCY_MISMATCH", "Payment currency does not match order currency"),
    ("NETWORK_ERROR", "Network error occurred while connecting to the API"),
    ("TIMEOUT_ERROR", "Request timed out"),
    ("INVALID_RESPONSE", "Invalid response received from API"),
];

/// Returns the friendly text for a known code, or `default` otherwise.
///
/// # Examples
///
/// ```
/// use twopay_client::messages::error_message;
///
/// assert_eq!(error_message("TIMEOUT_ERROR", "fallback"), "Request timed out");
/// assert_eq!(error_message("SOMETHING_ELSE", "fallback"), "fallback");
/// ```
#[must_use]
pub fn error_message<'a>(code: &str, default: &'a str) -> &'a str {
    ERROR_MESSAGES
        .iter()
        .find(|(known, _)| *known == code)
        .map_or(default, |(_, message)| message)
}
