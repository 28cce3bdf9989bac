//! Outbound Leptage API request signing.
//!
//! Every authenticated API call carries three headers derived from the key
//! material and the request itself:
//!
//! ```text
//! x-api-key       : public key (hex DER, as configured)
//! x-api-nonce     : timestamp in milliseconds
//! x-api-signature : ECDSA P-256 + SHA-256 signature, DER, hex
//! ```
//!
//! The signature covers the concatenation (no delimiters):
//!
//! ```text
//! METHOD + PREFIX + PATH + NONCE + PARAMS
//! ```
//!
//! where `METHOD` is uppercased, `PREFIX` defaults to `/openapi`, `PATH` is
//! the resource path without the prefix, and `PARAMS` is the canonical
//! parameter string (see [`crate::canonical`]). Example from the gateway
//! docs:
//!
//! ```text
//! GET/openapi/v1/balance1741240848495age=21&name=someone
//! ```

use chrono::Utc;
use http::header::CONTENT_TYPE;
use http::{HeaderMap, HeaderValue, Method};
use p256::ecdsa::signature::Signer;
use p256::ecdsa::{Signature, SigningKey};
use serde_json::{Map, Value};
use tracing::debug;

use crate::canonical::encode_params;
use crate::error::AuthError;
use crate::keys::signing_key_from_hex_der;

/// Header carrying the hex public key identifier.
pub const API_KEY_HEADER: &str = "x-api-key";
/// Header carrying the millisecond nonce as a decimal string.
pub const API_NONCE_HEADER: &str = "x-api-nonce";
/// Header carrying the hex DER ECDSA signature.
pub const API_SIGNATURE_HEADER: &str = "x-api-signature";

/// Resource prefix the gateway expects in every signed string, independent of
/// how the HTTP request URL is later assembled.
pub const DEFAULT_API_PREFIX: &str = "/openapi";

const JSON_CONTENT_TYPE: &str = "application/json";

/// The authentication header values for one outbound API call.
#[derive(Debug, Clone)]
pub struct SignedHeaders {
    /// Hex public key identifier, forwarded as configured.
    pub api_key: String,
    /// Millisecond nonce, decimal string.
    pub nonce: String,
    /// Hex-encoded DER ECDSA signature.
    pub signature: String,
    /// `application/json` for body-bearing methods, absent for GET.
    pub content_type: Option<&'static str>,
}

impl SignedHeaders {
    /// Render the header set as an [`http::HeaderMap`] ready to attach to an
    /// outgoing request.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::InvalidHeaderValue`] if a value cannot be
    /// represented as an HTTP header value (the hex and decimal values
    /// produced by the signer always can; a configured api key containing
    /// control characters cannot).
    pub fn to_header_map(&self) -> Result<HeaderMap, AuthError> {
        let mut headers = HeaderMap::with_capacity(4);

        headers.insert(
            API_KEY_HEADER,
            HeaderValue::from_str(&self.api_key)
                .map_err(|_| AuthError::InvalidHeaderValue(API_KEY_HEADER))?,
        );
        headers.insert(
            API_NONCE_HEADER,
            HeaderValue::from_str(&self.nonce)
                .map_err(|_| AuthError::InvalidHeaderValue(API_NONCE_HEADER))?,
        );
        headers.insert(
            API_SIGNATURE_HEADER,
            HeaderValue::from_str(&self.signature)
                .map_err(|_| AuthError::InvalidHeaderValue(API_SIGNATURE_HEADER))?,
        );
        if let Some(content_type) = self.content_type {
            headers.insert(CONTENT_TYPE, HeaderValue::from_static(content_type));
        }

        Ok(headers)
    }
}

/// A fully signed outbound request: headers plus the exact body to transmit.
///
/// For body-bearing methods `body` holds the canonical JSON that was signed;
/// the HTTP transport must send these bytes verbatim. Serializing the
/// parameters again on the transport side risks a byte mismatch against the
/// signed string, which the gateway rejects.
#[derive(Debug, Clone)]
pub struct SignedRequest {
    /// Authentication headers to attach.
    pub headers: SignedHeaders,
    /// Canonical JSON body for body-bearing methods with parameters.
    pub body: Option<String>,
}

/// Signs Leptage API requests with ECDSA P-256 + SHA-256.
///
/// Holds the long-lived key material; construct once at startup and share
/// read-only across request handlers. Signing is pure and CPU-bound, so
/// concurrent use needs no coordination.
pub struct RequestSigner {
    api_key_hex: String,
    signing_key: SigningKey,
    api_prefix: String,
}

impl std::fmt::Debug for RequestSigner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RequestSigner")
            .field("api_key_hex", &self.api_key_hex)
            .field("api_prefix", &self.api_prefix)
            .field("signing_key", &"<redacted>")
            .finish()
    }
}

impl RequestSigner {
    /// Create a signer from hex-encoded DER key material.
    ///
    /// `api_key_hex` is the public key identifier (forwarded opaquely in the
    /// `x-api-key` header); `api_secret_hex` is the P-256 private key as
    /// PKCS#8 or SEC1 DER.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::MissingCredentials`] if either value is empty,
    /// or [`AuthError::InvalidKeyMaterial`] if the private key cannot be
    /// decoded. An unconfigured signer must never be constructed — callers
    /// treat this as "cannot make authenticated calls", not as a reason to
    /// send unsigned requests.
    pub fn from_hex_keys(api_key_hex: &str, api_secret_hex: &str) -> Result<Self, AuthError> {
        let api_key_hex = api_key_hex.trim();
        if api_key_hex.is_empty() || api_secret_hex.trim().is_empty() {
            return Err(AuthError::MissingCredentials);
        }

        let signing_key = signing_key_from_hex_der(api_secret_hex)?;

        Ok(Self {
            api_key_hex: api_key_hex.to_owned(),
            signing_key,
            api_prefix: DEFAULT_API_PREFIX.to_owned(),
        })
    }

    /// Override the resource prefix baked into the signed string.
    ///
    /// The gateway has historically shipped the prefix both as a fixed
    /// constant and as part of the caller-supplied resource; the signed
    /// string is identical either way. Keeping the prefix here makes a
    /// future protocol revision a configuration change.
    #[must_use]
    pub fn with_api_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.api_prefix = prefix.into();
        self
    }

    /// Sign a request using the current wall clock as the nonce.
    ///
    /// `path` is the resource path without the API prefix (a leading `/` is
    /// prepended if missing), e.g. `/v1/balance`. Two calls within the same
    /// millisecond share a nonce value; the signature, not nonce uniqueness,
    /// is the security boundary.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::SigningFailed`] if the ECDSA operation fails.
    /// A failure yields no headers at all — never a partial set.
    pub fn sign(
        &self,
        method: &Method,
        path: &str,
        params: Option<&Map<String, Value>>,
    ) -> Result<SignedRequest, AuthError> {
        self.sign_with_nonce(method, path, params, Utc::now().timestamp_millis())
    }

    /// Sign a request with an injected nonce.
    ///
    /// Exists so tests and replay tooling can pin the nonce; [`Self::sign`]
    /// is the production entry point.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::SigningFailed`] if the ECDSA operation fails.
    pub fn sign_with_nonce(
        &self,
        method: &Method,
        path: &str,
        params: Option<&Map<String, Value>>,
        nonce_ms: i64,
    ) -> Result<SignedRequest, AuthError> {
        let params_str = encode_params(method, params);
        let string_to_sign = self.build_string_to_sign(method, path, nonce_ms, &params_str);

        debug!(string_to_sign, "Built Leptage string to sign");

        let signature: Signature = self
            .signing_key
            .try_sign(string_to_sign.as_bytes())
            .map_err(|e| AuthError::SigningFailed(e.to_string()))?;
        let signature_hex = hex::encode(signature.to_der().as_bytes());

        let is_body_bearing = method != Method::GET;
        let body = (is_body_bearing && !params_str.is_empty()).then(|| params_str.clone());

        Ok(SignedRequest {
            headers: SignedHeaders {
                api_key: self.api_key_hex.clone(),
                nonce: nonce_ms.to_string(),
                signature: signature_hex,
                content_type: is_body_bearing.then_some(JSON_CONTENT_TYPE),
            },
            body,
        })
    }

    /// Build the exact string the signature covers.
    ///
    /// Public verification of a produced signature reconstructs this string;
    /// any divergence between what is signed and what is sent breaks
    /// verification on the gateway side.
    #[must_use]
    pub fn build_string_to_sign(
        &self,
        method: &Method,
        path: &str,
        nonce_ms: i64,
        params_str: &str,
    ) -> String {
        let method_up = method.as_str().to_ascii_uppercase();
        let path = normalize_path(path);
        format!("{method_up}{}{path}{nonce_ms}{params_str}", self.api_prefix)
    }
}

/// Ensure the resource path starts with `/`.
fn normalize_path(path: &str) -> std::borrow::Cow<'_, str> {
    if path.starts_with('/') {
        std::borrow::Cow::Borrowed(path)
    } else {
        std::borrow::Cow::Owned(format!("/{path}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keys::verifying_key_from_hex_der;
    use p256::SecretKey;
    use p256::ecdsa::signature::Verifier;
    use p256::pkcs8::{EncodePrivateKey, EncodePublicKey};
    use rand_core::OsRng;
    use serde_json::json;

    const TEST_NONCE: i64 = 1_741_240_848_495;

    fn generate_hex_pair() -> (String, String) {
        let secret = SecretKey::random(&mut OsRng);
        let private_hex = hex::encode(secret.to_pkcs8_der().unwrap().as_bytes());
        let public_hex = hex::encode(
            secret
                .public_key()
                .to_public_key_der()
                .unwrap()
                .as_bytes(),
        );
        (public_hex, private_hex)
    }

    fn test_signer() -> (RequestSigner, String) {
        let (public_hex, private_hex) = generate_hex_pair();
        let signer = RequestSigner::from_hex_keys(&public_hex, &private_hex).unwrap();
        (signer, public_hex)
    }

    fn verifies(public_hex: &str, message: &str, signature_hex: &str) -> bool {
        let key = verifying_key_from_hex_der(public_hex).unwrap();
        let der = hex::decode(signature_hex).unwrap();
        let signature = Signature::from_der(&der).unwrap();
        key.verify(message.as_bytes(), &signature).is_ok()
    }

    #[test]
    fn test_should_build_string_to_sign_matching_gateway_docs() {
        let (signer, _) = test_signer();
        let sts = signer.build_string_to_sign(
            &Method::GET,
            "/v1/balance",
            TEST_NONCE,
            "age=21&name=someone",
        );
        assert_eq!(sts, "GET/openapi/v1/balance1741240848495age=21&name=someone");
    }

    #[test]
    fn test_should_prepend_slash_to_bare_path() {
        let (signer, _) = test_signer();
        let sts = signer.build_string_to_sign(&Method::GET, "v1/balance", TEST_NONCE, "");
        assert_eq!(sts, "GET/openapi/v1/balance1741240848495");
    }

    #[test]
    fn test_should_produce_verifiable_get_signature() {
        let (signer, public_hex) = test_signer();
        let mut params = Map::new();
        params.insert("name".to_owned(), json!("someone"));
        params.insert("age".to_owned(), json!(21));

        let signed = signer
            .sign_with_nonce(&Method::GET, "/v1/balance", Some(&params), TEST_NONCE)
            .unwrap();

        let expected = "GET/openapi/v1/balance1741240848495age=21&name=someone";
        assert!(verifies(&public_hex, expected, &signed.headers.signature));
    }

    #[test]
    fn test_should_produce_verifiable_post_signature_and_canonical_body() {
        let (signer, public_hex) = test_signer();
        let mut params = Map::new();
        params.insert("name".to_owned(), json!("someone"));
        params.insert("age".to_owned(), json!(21));

        let signed = signer
            .sign_with_nonce(&Method::POST, "/v1/balance", Some(&params), TEST_NONCE)
            .unwrap();

        let expected = r#"POST/openapi/v1/balance1741240848495{"age":21,"name":"someone"}"#;
        assert!(verifies(&public_hex, expected, &signed.headers.signature));
        assert_eq!(signed.body.as_deref(), Some(r#"{"age":21,"name":"someone"}"#));
    }

    #[test]
    fn test_should_bind_signature_to_every_component() {
        let (signer, public_hex) = test_signer();
        let mut params = Map::new();
        params.insert("amount".to_owned(), json!("10"));

        let signed = signer
            .sign_with_nonce(&Method::POST, "/v1/txns/deposit", Some(&params), TEST_NONCE)
            .unwrap();
        let signature = &signed.headers.signature;

        let original = r#"POST/openapi/v1/txns/deposit1741240848495{"amount":"10"}"#;
        assert!(verifies(&public_hex, original, signature));

        // Changing any one component invalidates the signature.
        let tampered = [
            r#"GET/openapi/v1/txns/deposit1741240848495{"amount":"10"}"#,
            r#"POST/openapi/v1/txns/withdraw1741240848495{"amount":"10"}"#,
            r#"POST/openapi/v1/txns/deposit1741240848496{"amount":"10"}"#,
            r#"POST/openapi/v1/txns/deposit1741240848495{"amount":"11"}"#,
        ];
        for message in tampered {
            assert!(
                !verifies(&public_hex, message, signature),
                "tampered message must not verify: {message}"
            );
        }
    }

    #[test]
    fn test_should_set_content_type_only_for_body_bearing_methods() {
        let (signer, _) = test_signer();

        let get = signer
            .sign_with_nonce(&Method::GET, "/v1/balance", None, TEST_NONCE)
            .unwrap();
        assert_eq!(get.headers.content_type, None);
        assert_eq!(get.body, None);

        let post = signer
            .sign_with_nonce(&Method::POST, "/v1/balance", None, TEST_NONCE)
            .unwrap();
        assert_eq!(post.headers.content_type, Some("application/json"));
        assert_eq!(post.body, None);
    }

    #[test]
    fn test_should_generate_millisecond_nonce_when_not_injected() {
        let (signer, _) = test_signer();
        let before = Utc::now().timestamp_millis();
        let signed = signer.sign(&Method::GET, "/v1/balance", None).unwrap();
        let after = Utc::now().timestamp_millis();

        let nonce: i64 = signed.headers.nonce.parse().unwrap();
        assert!(nonce >= before && nonce <= after);
    }

    #[test]
    fn test_should_render_complete_header_map() {
        let (signer, public_hex) = test_signer();
        let signed = signer
            .sign_with_nonce(&Method::POST, "/v1/balance", None, TEST_NONCE)
            .unwrap();

        let headers = signed.headers.to_header_map().unwrap();
        assert_eq!(headers.get(API_KEY_HEADER).unwrap(), public_hex.as_str());
        assert_eq!(headers.get(API_NONCE_HEADER).unwrap(), "1741240848495");
        assert!(headers.contains_key(API_SIGNATURE_HEADER));
        assert_eq!(headers.get(CONTENT_TYPE).unwrap(), "application/json");
    }

    #[test]
    fn test_should_respect_api_prefix_override() {
        let (public_hex, private_hex) = generate_hex_pair();
        let signer = RequestSigner::from_hex_keys(&public_hex, &private_hex)
            .unwrap()
            .with_api_prefix("/openapi/v2");
        let sts = signer.build_string_to_sign(&Method::GET, "/balance", TEST_NONCE, "");
        assert_eq!(sts, "GET/openapi/v2/balance1741240848495");
    }

    #[test]
    fn test_should_reject_empty_credentials() {
        let (public_hex, private_hex) = generate_hex_pair();
        assert!(matches!(
            RequestSigner::from_hex_keys("", &private_hex),
            Err(AuthError::MissingCredentials)
        ));
        assert!(matches!(
            RequestSigner::from_hex_keys(&public_hex, "  "),
            Err(AuthError::MissingCredentials)
        ));
    }

    #[test]
    fn test_should_reject_unparseable_private_key() {
        let (public_hex, _) = generate_hex_pair();
        assert!(matches!(
            RequestSigner::from_hex_keys(&public_hex, "deadbeef"),
            Err(AuthError::InvalidKeyMaterial(_))
        ));
    }
}
