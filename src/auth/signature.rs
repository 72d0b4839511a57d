//! Request signature generation.
//!
//! Signed calls prove possession of the shared secret by sending a keyed
//! digest of the merchant code and a current UTC timestamp; neither the
//! secret nor the raw signature input ever crosses the network.

use std::fmt;

use chrono::Utc;
use hmac::{Hmac, Mac};
use md5::Md5;
use sha2::Sha256;
use sha3::Sha3_256;

/// Keyed-hash algorithm selector for request signatures.
///
/// SHA-256 is the default and the recommended choice; SHA3-256 and MD5 are
/// accepted by the provider for compatibility.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum HashAlgorithm {
    /// HMAC-SHA256 (default).
    #[default]
    Sha256,
    /// HMAC-SHA3-256.
    Sha3_256,
    /// HMAC-MD5 (legacy).
    Md5,
}

impl HashAlgorithm {
    /// Wire tag carried in the `algo` field of the auth header.
    #[must_use]
    pub const fn tag(&self) -> &'static str {
        match self {
            Self::Sha256 => "sha256",
            Self::Sha3_256 => "sha3-256",
            Self::Md5 => "md5",
        }
    }
}

impl fmt::Display for HashAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

/// Authentication header for signed REST calls.
///
/// Generated fresh on every signed call; the timestamp must be current, so
/// headers are never cached or reused.
#[derive(Debug, Clone)]
pub struct AuthHeader {
    /// Merchant account identifier.
    pub code: String,
    /// UTC timestamp in `YYYY-MM-DD HH:MM:SS` form.
    pub date: String,
    /// Lowercase hex digest over the signature input.
    pub hash: String,
    /// Algorithm used to derive the digest.
    pub algo: HashAlgorithm,
}

impl AuthHeader {
    /// Renders the header in its wire form:
    /// `code="…" date="…" hash="…" algo="…"`.
    #[must_use]
    pub fn header_value(&self) -> String {
        format!(
            r#"code="{}" date="{}" hash="{}" algo="{}""#,
            self.code,
            self.date,
            self.hash,
            self.algo.tag()
        )
    }
}

/// Current UTC time formatted with zero-padded components,
/// `YYYY-MM-DD HH:MM:SS`.
#[must_use]
pub fn utc_timestamp() -> String {
    Utc::now().format("%Y-%m-%d %H:%M:%S").to_string()
}

/// Derives the hex-encoded keyed digest for a signed call.
///
/// The signature input is `<len(code)><code><len(date)><date>` where both
/// lengths are UTF-8 byte counts, not character counts; merchant codes with
/// multi-byte characters would otherwise produce a digest the provider
/// rejects. The digest is an HMAC over that input keyed with the shared
/// secret.
///
/// # Examples
///
/// ```
/// use twopay_client::auth::{signed_digest, HashAlgorithm};
///
/// let digest = signed_digest("MERCHANT", "secret", "2026-01-01 00:00:00", HashAlgorithm::Sha256);
/// assert_eq!(digest.len(), 64);
/// assert!(digest.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
/// ```
#[must_use]
pub fn signed_digest(
    merchant_code: &str,
    secret_key: &str,
    date: &str,
    algo: HashAlgorithm,
) -> String {
    let input =
        format!("{}{}{}{}", merchant_code.len(), merchant_code, date.len(), date);
    let key = secret_key.as_bytes();

    match algo {
        HashAlgorithm::Sha256 => {
            let mut mac =
                Hmac::<Sha256>::new_from_slice(key).expect("HMAC accepts keys of any length");
            mac.update(input.as_bytes());
            hex::encode(mac.finalize().into_bytes())
        }
        HashAlgorithm::Sha3_256 => {
            let mut mac =
                Hmac::<Sha3_256>::new_from_slice(key).expect("HMAC accepts keys of any length");
            mac.update(input.as_bytes());
            hex::encode(mac.finalize().into_bytes())
        }
        HashAlgorithm::Md5 => {
            let mut mac =
                Hmac::<Md5>::new_from_slice(key).expect("HMAC accepts keys of any length");
            mac.update(input.as_bytes());
            hex::encode(mac.finalize().into_bytes())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_lowercase_hex(digest: &str) {
        assert!(
            digest.chars().all(|c| c.is_ascii_digit() || ('a'..='f').contains(&c)),
            "not lowercase hex: {digest}"
        );
    }

    #[test]
    fn test_timestamp_shape() {
        let ts = utc_timestamp();
        // YYYY-MM-DD HH:MM:SS
        assert_eq!(ts.len(), 19);
        let bytes = ts.as_bytes();
        for (index, byte) in bytes.iter().enumerate() {
            match index {
                4 | 7 => assert_eq!(*byte, b'-', "bad separator in {ts}"),
                10 => assert_eq!(*byte, b' ', "bad separator in {ts}"),
                13 | 16 => assert_eq!(*byte, b':', "bad separator in {ts}"),
                _ => assert!(byte.is_ascii_digit(), "non-digit in {ts}"),
            }
        }
    }

    #[test]
    fn test_digest_is_deterministic() {
        let a = signed_digest("MERCHANT", "secret", "2026-01-01 00:00:00", HashAlgorithm::Sha256);
        let b = signed_digest("MERCHANT", "secret", "2026-01-01 00:00:00", HashAlgorithm::Sha256);
        assert_eq!(a, b);
    }

    #[test]
    fn test_digest_varies_with_date() {
        let a = signed_digest("MERCHANT", "secret", "2026-01-01 00:00:00", HashAlgorithm::Sha256);
        let b = signed_digest("MERCHANT", "secret", "2026-01-01 00:00:01", HashAlgorithm::Sha256);
        assert_ne!(a, b);
    }

    #[test]
    fn test_digest_lengths_per_algorithm() {
        let date = "2026-01-01 00:00:00";
        let sha256 = signed_digest("M", "k", date, HashAlgorithm::Sha256);
        let sha3 = signed_digest("M", "k", date, HashAlgorithm::Sha3_256);
        let md5 = signed_digest("M", "k", date, HashAlgorithm::Md5);
        assert_eq!(sha256.len(), 64);
        assert_eq!(sha3.len(), 64);
        assert_eq!(md5.len(), 32);
        assert_ne!(sha256, sha3);
        assert_lowercase_hex(&sha256);
        assert_lowercase_hex(&sha3);
        assert_lowercase_hex(&md5);
    }

    #[test]
    fn test_multibyte_merchant_code() {
        // "TËST" is 5 bytes but 4 characters; the length prefix must count
        // bytes.
        let digest = signed_digest("TËST", "secret", "2026-01-01 00:00:00", HashAlgorithm::Sha256);
        assert_eq!(digest.len(), 64);
        assert_lowercase_hex(&digest);
    }

    #[test]
    fn test_algorithm_tags() {
        assert_eq!(HashAlgorithm::Sha256.tag(), "sha256");
        assert_eq!(HashAlgorithm::Sha3_256.tag(), "sha3-256");
        assert_eq!(HashAlgorithm::Md5.tag(), "md5");
        assert_eq!(HashAlgorithm::default(), HashAlgorithm::Sha256);
    }

    #[test]
    fn test_header_value_format() {
        let header = AuthHeader {
            code: "MERCHANT".to_owned(),
            date: "2026-01-01 00:00:00".to_owned(),
            hash: "abc123".to_owned(),
            algo: HashAlgorithm::Sha256,
        };
        assert_eq!(
            header.header_value(),
            r#"code="MERCHANT" date="2026-01-01 00:00:00" hash="abc123" algo="sha256""#
        );
    }
}
