//! Signed request verification for inbound Slack callbacks.
//!
//! Slack signs every request with `X-Slack-Signature: v0=<hex>`, where the hex
//! value is `HMAC-SHA256(signing_secret, "v0:" + timestamp + ":" + body)` and the
//! timestamp is sent alongside in `X-Slack-Request-Timestamp`. The signature is
//! always computed over the raw body bytes as received, never over a re-serialized
//! payload.

use std::sync::Arc;

use axum::http::{HeaderMap, StatusCode};
use hmac::{Hmac, Mac};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

/// Header carrying the request signature.
pub const SIGNATURE_HEADER: &str = "x-slack-signature";

/// Header carrying the request timestamp (unix seconds).
pub const TIMESTAMP_HEADER: &str = "x-slack-request-timestamp";

/// Signature scheme version, used both as the base string prefix and the header prefix.
pub const SIGNATURE_VERSION: &str = "v0";

/// Length of a hex-encoded SHA-256 digest.
const DIGEST_HEX_LEN: usize = 64;

/// Reasons a request fails verification.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum VerifyError {
    #[error("missing signature header")]
    MissingSignature,
    #[error("malformed signature header")]
    MalformedSignature,
    #[error("missing timestamp header")]
    MissingTimestamp,
    #[error("malformed timestamp header")]
    MalformedTimestamp,
    #[error("request timestamp is {age}s away from now (replay protection)")]
    StaleTimestamp { age: u64 },
    #[error("signature does not match")]
    SignatureMismatch,
}

impl VerifyError {
    /// Whether the request was rejected for the shape of its headers, rather than their content.
    pub fn is_malformed(&self) -> bool {
        matches!(self, Self::MissingSignature | Self::MalformedSignature | Self::MissingTimestamp | Self::MalformedTimestamp)
    }

    /// Status returned by the events endpoint: bad header shape is a bad request, anything else is unauthorized.
    pub fn status(&self) -> StatusCode {
        if self.is_malformed() { StatusCode::BAD_REQUEST } else { StatusCode::UNAUTHORIZED }
    }
}

/// Verifies inbound requests against the shared signing secret.
///
/// Trivially cloneable, and read-only once constructed.
#[derive(Clone)]
pub struct RequestVerifier {
    secret: Arc<[u8]>,
    max_age_secs: u64,
}

impl std::fmt::Debug for RequestVerifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RequestVerifier").field("max_age_secs", &self.max_age_secs).finish_non_exhaustive()
    }
}

impl RequestVerifier {
    pub fn new(secret: impl AsRef<[u8]>, max_age_secs: u64) -> Self {
        Self {
            secret: Arc::from(secret.as_ref()),
            max_age_secs,
        }
    }

    /// Verify a request against the current wall clock.
    pub fn verify(&self, headers: &HeaderMap, body: &[u8]) -> Result<(), VerifyError> {
        self.verify_at(headers, body, chrono::Utc::now().timestamp())
    }

    /// Verify a request as if the current time were `now` (unix seconds).
    pub fn verify_at(&self, headers: &HeaderMap, body: &[u8], now: i64) -> Result<(), VerifyError> {
        let signature = header_str(headers, SIGNATURE_HEADER, VerifyError::MissingSignature, VerifyError::MalformedSignature)?;
        let timestamp = header_str(headers, TIMESTAMP_HEADER, VerifyError::MissingTimestamp, VerifyError::MalformedTimestamp)?;

        let digest = parse_signature(signature)?;
        let ts: i64 = timestamp.parse().map_err(|_| VerifyError::MalformedTimestamp)?;

        let age = now.abs_diff(ts);
        if age > self.max_age_secs {
            return Err(VerifyError::StaleTimestamp { age });
        }

        self.mac(timestamp, body).verify_slice(&digest).map_err(|_| VerifyError::SignatureMismatch)
    }

    /// Produce the `X-Slack-Signature` value for a body sent at `timestamp`.
    pub fn sign(&self, timestamp: i64, body: &[u8]) -> String {
        let digest = self.mac(&timestamp.to_string(), body).finalize().into_bytes();

        format!("{}={}", SIGNATURE_VERSION, hex::encode(digest))
    }

    fn mac(&self, timestamp: &str, body: &[u8]) -> HmacSha256 {
        let mut mac = HmacSha256::new_from_slice(&self.secret).expect("HMAC accepts any key length");

        mac.update(SIGNATURE_VERSION.as_bytes());
        mac.update(b":");
        mac.update(timestamp.as_bytes());
        mac.update(b":");
        mac.update(body);

        mac
    }
}

/// Fetch a header as a string, distinguishing "absent" from "not visible ASCII".
fn header_str<'a>(headers: &'a HeaderMap, name: &str, missing: VerifyError, malformed: VerifyError) -> Result<&'a str, VerifyError> {
    let value = headers.get(name).ok_or(missing.clone())?;
    let value = value.to_str().map_err(|_| malformed)?;

    if value.is_empty() {
        return Err(missing);
    }

    Ok(value)
}

/// Split `v0=<hex>` into its raw digest bytes.
fn parse_signature(signature: &str) -> Result<Vec<u8>, VerifyError> {
    let hex_digest = signature
        .strip_prefix(SIGNATURE_VERSION)
        .and_then(|rest| rest.strip_prefix('='))
        .ok_or(VerifyError::MalformedSignature)?;

    if hex_digest.len() != DIGEST_HEX_LEN {
        return Err(VerifyError::MalformedSignature);
    }

    hex::decode(hex_digest).map_err(|_| VerifyError::MalformedSignature)
}

// Tests.
