//! JSON-RPC envelope types and response-shape validation.
//!
//! Both transports are validated before their payloads are treated as
//! success: REST bodies must be structured JSON, and JSON-RPC replies must
//! carry the expected protocol version, a correlation id, and exactly one of
//! a result or an error member.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::result::{codes, ApiError};

/// Protocol version literal required in every envelope.
pub const JSONRPC_VERSION: &str = "2.0";

/// Remote error code signalling an invalid or expired session.
pub const SESSION_INVALID_CODE: i64 = -32001;

/// Outbound JSON-RPC call envelope.
///
/// The parameter list always carries the current session token as its first
/// element; the facade prepends it before building the envelope.
#[derive(Debug, Clone, Serialize)]
pub struct RpcRequest {
    /// Protocol version, always [`JSONRPC_VERSION`].
    pub jsonrpc: &'static str,
    /// Correlation identifier, unique per client instance.
    pub id: u64,
    /// Remote method name.
    pub method: String,
    /// Positional parameters.
    pub params: Vec<Value>,
}

impl RpcRequest {
    /// Builds an envelope for the given call.
    pub fn new(id: u64, method: impl Into<String>, params: Vec<Value>) -> Self {
        Self { jsonrpc: JSONRPC_VERSION, id, method: method.into(), params }
    }
}

/// Error object carried in a JSON-RPC reply.
#[derive(Debug, Clone, Deserialize)]
pub struct RpcError {
    /// Numeric error code assigned by the remote service.
    pub code: i64,
    /// Remote error description.
    pub message: String,
}

/// A validated JSON-RPC reply: either a result payload or an error object.
#[derive(Debug, Clone)]
pub enum RpcReply {
    /// The call succeeded; the payload may be any JSON value, null included.
    Result(Value),
    /// The remote service rejected the call.
    Error(RpcError),
}

/// Checks that a REST payload is structured JSON (an object or an array).
///
/// # Errors
///
/// Returns an `INVALID_RESPONSE` descriptor for null and scalar payloads.
pub fn validate_rest_payload(payload: &Value) -> Result<(), ApiError> {
    match payload {
        Value::Object(_) | Value::Array(_) => Ok(()),
        Value::Null => {
            Err(ApiError::new(codes::INVALID_RESPONSE, "API returned a null response"))
        }
        other => Err(ApiError::new(
            codes::INVALID_RESPONSE,
            format!("expected a structured response, got {}", type_name(other)),
        )),
    }
}

/// Validates a JSON-RPC reply envelope and extracts its outcome.
///
/// Presence is what matters: `"result": null` is a present result, while a
/// reply with neither member is malformed rather than "no data". When both
/// members are present the error wins.
///
/// # Errors
///
/// Returns an `INVALID_RESPONSE` descriptor for non-object replies, version
/// mismatches, a missing id, a malformed error object, or a reply with
/// neither result nor error.
pub fn parse_rpc_reply(payload: &Value) -> Result<RpcReply, ApiError> {
    let Some(envelope) = payload.as_object() else {
        return Err(ApiError::new(
            codes::INVALID_RESPONSE,
            format!("expected a JSON-RPC object, got {}", type_name(payload)),
        ));
    };

    let version = envelope.get("jsonrpc").and_then(Value::as_str);
    if version != Some(JSONRPC_VERSION) {
        return Err(ApiError::new(
            codes::INVALID_RESPONSE,
            format!("invalid JSON-RPC version: {}", version.unwrap_or("missing")),
        ));
    }

    if !envelope.contains_key("id") {
        return Err(ApiError::new(
            codes::INVALID_RESPONSE,
            "JSON-RPC response missing id field",
        ));
    }

    match envelope.get("error") {
        Some(raw) if !raw.is_null() => {
            let error = serde_json::from_value::<RpcError>(raw.clone()).map_err(|e| {
                ApiError::new(
                    codes::INVALID_RESPONSE,
                    format!("malformed JSON-RPC error object: {e}"),
                )
            })?;
            Ok(RpcReply::Error(error))
        }
        _ => match envelope.get("result") {
            Some(result) => Ok(RpcReply::Result(result.clone())),
            None => Err(ApiError::new(
                codes::INVALID_RESPONSE,
                "JSON-RPC response missing both result and error",
            )),
        },
    }
}

/// Whether a remote error invalidates the cached session.
#[must_use]
pub fn is_session_error(error: &RpcError) -> bool {
    error.code == SESSION_INVALID_CODE || error.message.contains("session")
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
