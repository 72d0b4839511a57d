//! Authentication: request signatures, endpoint resolution, and session
//! management.

use std::fmt;

use crate::{config::ClientConfig, transport::HttpExecutor};

pub mod session;
pub mod signature;

pub use session::{SessionManager, SESSION_LIFETIME, SESSION_SAFETY_MARGIN};
pub use signature::{signed_digest, utc_timestamp, AuthHeader, HashAlgorithm};

/// Production REST endpoint.
pub const PRODUCTION_REST_URL: &str = "https://api.2checkout.com/rest/6.0";
/// Sandbox REST endpoint.
pub const SANDBOX_REST_URL: &str = "https://api.avangate.com/rest/6.0";
/// Production JSON-RPC endpoint.
pub const PRODUCTION_RPC_URL: &str = "https://api.2checkout.com/rpc/6.0/";
/// Sandbox JSON-RPC endpoint.
pub const SANDBOX_RPC_URL: &str = "https://api.avangate.com/rpc/6.0/";

/// Merchant credential pair.
///
/// The secret key is redacted from the `Debug` output; only digests derived
/// from it ever leave the process.
#[derive(Clone)]
pub struct Credentials {
    /// Merchant account identifier.
    pub merchant_code: String,
    /// Shared signing secret.
    pub secret_key: String,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("merchant_code", &self.merchant_code)
            .field("secret_key", &"<redacted>")
            .finish()
    }
}

/// Signature generation and endpoint resolution for one credential set.
///
/// Owns the [`SessionManager`]; one authenticator exists per client
/// instance, constructed explicitly from its configuration.
#[derive(Debug)]
pub struct Authenticator {
    credentials: Credentials,
    rest_url: String,
    rpc_url: String,
    session: SessionManager,
}

impl Authenticator {
    pub(crate) fn new(config: &ClientConfig, executor: HttpExecutor) -> Self {
        let credentials = Credentials {
            merchant_code: config.merchant_code.clone(),
            secret_key: config.secret_key.clone(),
        };
        let rest_url = config.base_url.clone().unwrap_or_else(|| {
            if config.sandbox { SANDBOX_REST_URL } else { PRODUCTION_REST_URL }.to_owned()
        });
        let rpc_url = config.rpc_url.clone().unwrap_or_else(|| {
            if config.sandbox { SANDBOX_RPC_URL } else { PRODUCTION_RPC_URL }.to_owned()
        });
        let session = SessionManager::new(credentials.clone(), rpc_url.clone(), executor);
        Self { credentials, rest_url, rpc_url, session }
    }

    /// Active REST endpoint.
    #[must_use]
    pub fn rest_url(&self) -> &str {
        &self.rest_url
    }

    /// Active JSON-RPC endpoint.
    #[must_use]
    pub fn rpc_url(&self) -> &str {
        &self.rpc_url
    }

    /// Generates a fresh auth header for a signed call.
    ///
    /// The header embeds the current timestamp, so it is generated per call
    /// and never cached.
    #[must_use]
    pub fn auth_header(&self, algo: HashAlgorithm) -> AuthHeader {
        let date = utc_timestamp();
        let hash = signed_digest(
            &self.credentials.merchant_code,
            &self.credentials.secret_key,
            &date,
            algo,
        );
        AuthHeader { code: self.credentials.merchant_code.clone(), date, hash, algo }
    }

    /// Renders a fresh auth header in its wire form.
    #[must_use]
    pub fn header_value(&self, algo: HashAlgorithm) -> String {
        self.auth_header(algo).header_value()
    }

    /// The session manager for the JSON-RPC transport.
    #[must_use]
    pub const fn session(&self) -> &SessionManager {
        &self.session
    }
}
