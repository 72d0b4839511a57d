//! 2Pay API client runtime.
//!
//! This crate is the client runtime for the 2Pay (2Checkout/Avangate)
//! payment API: authenticated session management, request execution with
//! timeout, classified retry with exponential backoff, and response-shape
//! validation for the provider's two transport styles. Tool layers and host
//! processes call the two public operations and branch on the uniform
//! [`ApiResult`] they return.
//!
//! # Architecture
//!
//! ```text
//! caller
//!   │
//! ┌─▼──────────────────────────────────────────────┐
//! │  ApiClient                  (client)           │
//! │    rest_request / rpc_request                  │
//! │  ┌──────────────┐      ┌────────────────────┐  │
//! │  │ retry with   │──────│ bounded exchange   │  │
//! │  │ backoff      │      │ (transport)        │  │
//! │  │ (reliability)│      └────────────────────┘  │
//! │  └──────┬───────┘      ┌────────────────────┐  │
//! │         │              │ signatures and     │  │
//! │         └──────────────│ sessions (auth)    │  │
//! │                        └────────────────────┘  │
//! │  response validation (protocol)                │
//! └────────────────────────┬───────────────────────┘
//!                          │
//!                 normalized ApiResult
//! ```
//!
//! REST calls carry a per-call signed header derived from the merchant
//! credentials; JSON-RPC calls carry a cached session token obtained via a
//! signed login. Transient transport failures are retried with unjittered
//! exponential backoff; well-formed remote rejections are returned to the
//! caller unchanged.
//!
//! # Quick start
//!
//! ```no_run
//! use reqwest::Method;
//! use serde_json::{json, Value};
//! use twopay_client::{ApiClient, ApiResult, ClientConfig};
//!
//! # async fn example() -> twopay_client::Result<()> {
//! // Credentials come from the environment in a real deployment:
//! // let config = ClientConfig::from_env()?;
//! let mut config = ClientConfig::new("MY_MERCHANT", "my-secret");
//! config.sandbox = true;
//!
//! let client = ApiClient::new(config)?;
//!
//! // Session-authenticated JSON-RPC call.
//! let order: ApiResult<Value> =
//!     client.rpc_request("getOrder", vec![json!("ORDER-REF")]).await;
//!
//! // Signed REST call.
//! let products: ApiResult<Value> =
//!     client.rest_request(Method::GET, "/products/", None).await;
//!
//! if let ApiResult::Failure(error) = &order {
//!     let friendly = twopay_client::messages::error_message(&error.code, &error.message);
//!     eprintln!("{} ({})", friendly, error.code);
//! }
//! # Ok(())
//! # }
//! ```
//!
//! # Module organization
//!
//! - [`client`]: the [`ApiClient`] facade with the two public operations
//! - [`auth`]: request signatures, endpoint resolution, session cache
//! - [`transport`]: one timeout-bounded HTTP exchange
//! - [`reliability`]: error classification and retry with backoff
//! - [`protocol`]: JSON-RPC envelopes and response-shape validation
//! - [`config`]: immutable per-client configuration
//! - [`messages`]: friendly texts for well-known error codes
//! - [`error`]: the raised-failure channel for construction and transport
//!   defects

#![warn(missing_docs)]
#![warn(missing_debug_implementations)]

pub mod auth;
pub mod client;
pub mod config;
pub mod error;
pub mod messages;
pub mod protocol;
pub mod reliability;
pub mod result;
pub mod transport;

pub use client::ApiClient;
pub use config::ClientConfig;
pub use error::{ClientError, Result};
pub use result::{ApiError, ApiResult};
