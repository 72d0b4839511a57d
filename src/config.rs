//! Client configuration.
//!
//! Configuration is read once at process start and is immutable for the
//! lifetime of a client instance. It can be built directly, deserialized
//! from TOML, or loaded from the `TWOPAY_*` environment variables.

use std::{env, fmt, time::Duration};

use serde::Deserialize;
use url::Url;

use crate::error::{ClientError, Result};

/// Default request timeout in milliseconds.
pub const DEFAULT_TIMEOUT_MS: u64 = 30_000;
/// Default maximum number of retry attempts for transient errors.
pub const DEFAULT_MAX_RETRIES: u32 = 3;
/// Default base delay between retries in milliseconds.
pub const DEFAULT_RETRY_DELAY_MS: u64 = 1_000;

const ENV_MERCHANT_CODE: &str = "TWOPAY_MERCHANT_CODE";
const ENV_SECRET_KEY: &str = "TWOPAY_SECRET_KEY";
const ENV_SANDBOX: &str = "TWOPAY_SANDBOX";
const ENV_BASE_URL: &str = "TWOPAY_BASE_URL";
const ENV_RPC_URL: &str = "TWOPAY_RPC_URL";
const ENV_TIMEOUT_MS: &str = "TWOPAY_TIMEOUT_MS";
const ENV_MAX_RETRIES: &str = "TWOPAY_MAX_RETRIES";
const ENV_RETRY_DELAY_MS: &str = "TWOPAY_RETRY_DELAY_MS";

/// Settings for one credential set.
///
/// # Examples
///
/// ```
/// use twopay_client::ClientConfig;
///
/// let config = ClientConfig::new("MY_MERCHANT", "my-secret");
/// assert_eq!(config.timeout_ms, 30_000);
/// assert_eq!(config.max_retries, 3);
/// ```
///
/// From TOML, unset fields take their defaults:
///
/// ```
/// # use twopay_client::ClientConfig;
/// let toml = r#"
///     merchant_code = "MY_MERCHANT"
///     secret_key = "my-secret"
///     sandbox = true
///     timeout_ms = 60000
/// "#;
/// let config: ClientConfig = toml::from_str(toml).unwrap();
/// assert!(config.sandbox);
/// assert_eq!(config.max_retries, 3);
/// ```
#[derive(Clone, Deserialize)]
pub struct ClientConfig {
    /// Merchant account identifier.
    pub merchant_code: String,

    /// Shared secret used to derive request signatures. Redacted from the
    /// `Debug` output and never serialized or transmitted.
    pub secret_key: String,

    /// Target the sandbox environment instead of production.
    #[serde(default)]
    pub sandbox: bool,

    /// Override for the REST endpoint. When unset, the endpoint is derived
    /// from the `sandbox` flag.
    #[serde(default)]
    pub base_url: Option<String>,

    /// Override for the JSON-RPC endpoint. When unset, the endpoint is
    /// derived from the `sandbox` flag.
    #[serde(default)]
    pub rpc_url: Option<String>,

    /// Per-request time budget in milliseconds.
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,

    /// Maximum retry attempts for transient errors; a request is executed at
    /// most `max_retries + 1` times.
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    /// Base backoff delay in milliseconds; attempt `i` waits `2^i` times
    /// this value before the next try.
    #[serde(default = "default_retry_delay_ms")]
    pub retry_delay_ms: u64,
}

impl ClientConfig {
    /// Creates a configuration with default tuning for the given credentials.
    pub fn new(merchant_code: impl Into<String>, secret_key: impl Into<String>) -> Self {
        Self {
            merchant_code: merchant_code.into(),
            secret_key: secret_key.into(),
            sandbox: false,
            base_url: None,
            rpc_url: None,
            timeout_ms: DEFAULT_TIMEOUT_MS,
            max_retries: DEFAULT_MAX_RETRIES,
            retry_delay_ms: DEFAULT_RETRY_DELAY_MS,
        }
    }

    /// Loads configuration from the `TWOPAY_*` environment variables.
    ///
    /// `TWOPAY_MERCHANT_CODE` and `TWOPAY_SECRET_KEY` are mandatory; the
    /// sandbox flag is enabled by the literal value `true`; the numeric
    /// tuning variables are optional overrides.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::MissingCredentials`] when either credential is
    /// unset or empty, and [`ClientError::Config`] when a numeric override
    /// does not parse.
    pub fn from_env() -> Result<Self> {
        let merchant_code = non_empty_env(ENV_MERCHANT_CODE);
        let secret_key = non_empty_env(ENV_SECRET_KEY);
        let (Some(merchant_code), Some(secret_key)) = (merchant_code, secret_key) else {
            return Err(ClientError::MissingCredentials);
        };

        let mut config = Self::new(merchant_code, secret_key);
        config.sandbox = env::var(ENV_SANDBOX).is_ok_and(|value| value == "true");
        config.base_url = non_empty_env(ENV_BASE_URL);
        config.rpc_url = non_empty_env(ENV_RPC_URL);
        if let Some(value) = non_empty_env(ENV_TIMEOUT_MS) {
            config.timeout_ms = parse_env(ENV_TIMEOUT_MS, &value)?;
        }
        if let Some(value) = non_empty_env(ENV_MAX_RETRIES) {
            config.max_retries = parse_env(ENV_MAX_RETRIES, &value)?;
        }
        if let Some(value) = non_empty_env(ENV_RETRY_DELAY_MS) {
            config.retry_delay_ms = parse_env(ENV_RETRY_DELAY_MS, &value)?;
        }
        Ok(config)
    }

    /// Validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::MissingCredentials`] when a credential is
    /// empty, and [`ClientError::Config`] when an endpoint override is not a
    /// valid http(s) URL or the timeout is zero.
    pub fn validate(&self) -> Result<()> {
        if self.merchant_code.is_empty() || self.secret_key.is_empty() {
            return Err(ClientError::MissingCredentials);
        }
        if self.timeout_ms == 0 {
            return Err(ClientError::Config("timeout_ms must be greater than zero".to_owned()));
        }
        if let Some(url) = &self.base_url {
            validate_endpoint("base_url", url)?;
        }
        if let Some(url) = &self.rpc_url {
            validate_endpoint("rpc_url", url)?;
        }
        Ok(())
    }

    /// Request timeout as a [`Duration`].
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Base retry delay as a [`Duration`].
    #[must_use]
    pub const fn retry_delay(&self) -> Duration {
        Duration::from_millis(self.retry_delay_ms)
    }
}

impl fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientConfig")
            .field("merchant_code", &self.merchant_code)
            .field("secret_key", &"<redacted>")
            .field("sandbox", &self.sandbox)
            .field("base_url", &self.base_url)
            .field("rpc_url", &self.rpc_url)
            .field("timeout_ms", &self.timeout_ms)
            .field("max_retries", &self.max_retries)
            .field("retry_delay_ms", &self.retry_delay_ms)
            .finish()
    }
}

fn validate_endpoint(name: &str, value: &str) -> Result<()> {
    let url = Url::parse(value)
        .map_err(|e| ClientError::Config(format!("invalid {name} '{value}': {e}")))?;
    if url.scheme() != "https" && url.scheme() != "http" {
        return Err(ClientError::Config(format!(
            "{name} must use http or https, got: {}",
            url.scheme()
        )));
    }
    Ok(())
}

fn non_empty_env(name: &str) -> Option<String> {
    env::var(name).ok().filter(|value| !value.is_empty())
}

fn parse_env<T: std::str::FromStr>(name: &str, value: &str) -> Result<T>
where
    T::Err: fmt::Display,
{
    value
        .parse()
        .map_err(|e| ClientError::Config(format!("invalid {name} '{value}': {e}")))
}

fn default_timeout_ms() -> u64 {
    DEFAULT_TIMEOUT_MS
}

fn default_max_retries() -> u32 {
    DEFAULT_MAX_RETRIES
}

fn default_retry_delay_ms() -> u64 {
    DEFAULT_RETRY_DELAY_MS
}
