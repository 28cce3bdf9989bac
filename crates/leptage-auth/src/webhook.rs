//! Inbound Leptage webhook verification.
//!
//! Webhook deliveries are authenticated with HMAC-SHA256 over:
//!
//! ```text
//! NONCE + WEBHOOK_URL + COMPACT_BODY
//! ```
//!
//! where `NONCE` comes from the `x-hook-nonce` header, `WEBHOOK_URL` is the
//! callback URL registered with the gateway out-of-band (never derived from
//! the incoming request, to rule out host-header injection), and
//! `COMPACT_BODY` is the body text with spaces and line breaks removed —
//! the gateway computes the same compaction on its side. The received
//! `x-hook-signature` is a hex digest, compared case-insensitively in
//! constant time.
//!
//! Verification is the security boundary protecting payment state from
//! forged callbacks: every malformed, incomplete, or unconfigured case
//! resolves to a rejection, never to an error the caller could mistake for
//! "verification skipped".

use hmac::{Hmac, KeyInit, Mac};
use http::HeaderMap;
use sha2::Sha256;
use subtle::ConstantTimeEq;
use tracing::debug;

type HmacSha256 = Hmac<Sha256>;

/// Header carrying the millisecond nonce of a webhook delivery.
pub const HOOK_NONCE_HEADER: &str = "x-hook-nonce";
/// Header carrying the hex HMAC-SHA256 digest of a webhook delivery.
pub const HOOK_SIGNATURE_HEADER: &str = "x-hook-signature";

/// Verifies Leptage webhook deliveries against the shared webhook secret.
///
/// Stateless beyond the secret and the registered callback URL; construct
/// once at startup and share read-only across handlers. A verifier built
/// with an empty secret rejects every delivery (fail closed).
#[derive(Clone)]
pub struct WebhookVerifier {
    secret: String,
    callback_url: String,
}

impl std::fmt::Debug for WebhookVerifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WebhookVerifier")
            .field("secret", &"<redacted>")
            .field("callback_url", &self.callback_url)
            .finish()
    }
}

impl WebhookVerifier {
    /// Create a verifier for the given shared secret and registered URL.
    pub fn new(secret: impl Into<String>, callback_url: impl Into<String>) -> Self {
        Self {
            secret: secret.into(),
            callback_url: callback_url.into(),
        }
    }

    /// Whether a webhook secret is configured.
    ///
    /// An unconfigured verifier still answers [`Self::verify`] — with an
    /// unconditional rejection.
    #[must_use]
    pub fn is_configured(&self) -> bool {
        !self.secret.is_empty()
    }

    /// Decide whether a webhook delivery is authentic.
    ///
    /// Operates on the raw body bytes as received; the body is never
    /// re-parsed or re-serialized. Header lookup is case-insensitive.
    /// Returns `false` for any missing header, non-UTF-8 body, absent
    /// secret, or signature mismatch — this function never errors.
    #[must_use]
    pub fn verify(&self, headers: &HeaderMap, body: &[u8]) -> bool {
        if self.secret.is_empty() {
            debug!("Rejecting webhook: no webhook secret configured");
            return false;
        }

        let Some(nonce) = header_str(headers, HOOK_NONCE_HEADER) else {
            debug!("Rejecting webhook: missing {HOOK_NONCE_HEADER}");
            return false;
        };
        let Some(received) = header_str(headers, HOOK_SIGNATURE_HEADER) else {
            debug!("Rejecting webhook: missing {HOOK_SIGNATURE_HEADER}");
            return false;
        };

        let Ok(body_text) = std::str::from_utf8(body) else {
            debug!("Rejecting webhook: body is not valid UTF-8");
            return false;
        };

        let expected = self.compute_signature(nonce, body_text);
        let received = received.to_ascii_lowercase();

        if expected.as_bytes().ct_eq(received.as_bytes()).into() {
            true
        } else {
            debug!(expected = %expected, received = %received, "Webhook signature mismatch");
            false
        }
    }

    /// Compute the expected hex HMAC-SHA256 digest for a delivery.
    ///
    /// Public for tests and for simulating gateway callbacks in development.
    /// The body text is compacted (spaces, `\n`, `\r` removed) exactly as
    /// the gateway does before signing.
    #[must_use]
    pub fn compute_signature(&self, nonce: &str, body_text: &str) -> String {
        let compact_body = compact(body_text);
        let string_to_sign = format!("{nonce}{}{compact_body}", self.callback_url);

        debug!(string_to_sign, "Built webhook string to sign");

        let mut mac = HmacSha256::new_from_slice(self.secret.as_bytes())
            .expect("HMAC can accept keys of any length");
        mac.update(string_to_sign.as_bytes());
        hex::encode(mac.finalize().into_bytes())
    }
}

/// Look up a header value as a non-empty string.
///
/// Missing headers, values that are not visible ASCII, and empty values all
/// resolve to `None` — each is a rejection, not an error.
fn header_str<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    let value = headers.get(name)?.to_str().ok()?;
    if value.is_empty() { None } else { Some(value) }
}

/// Remove spaces and line breaks, matching the gateway's compaction.
fn compact(text: &str) -> String {
    text.chars()
        .filter(|c| !matches!(c, ' ' | '\n' | '\r'))
        .collect()
}
