//! Hex-DER key material parsing.
//!
//! Leptage issues EC keys as hex-encoded DER blobs: the API key is a P-256
//! public key (SubjectPublicKeyInfo) and the API secret is the matching
//! private key (PKCS#8, with SEC1/RFC 5915 accepted for older exports). The
//! hex strings themselves are opaque to the protocol — the public key hex is
//! sent verbatim as the `x-api-key` header value.

use p256::ecdsa::{SigningKey, VerifyingKey};
use p256::pkcs8::{DecodePrivateKey, DecodePublicKey};
use p256::{PublicKey, SecretKey};

use crate::error::AuthError;

/// Parse a hex-encoded DER private key into a P-256 signing key.
///
/// PKCS#8 is tried first, then SEC1 (RFC 5915), matching the formats the
/// gateway's key tooling has emitted across revisions.
///
/// # Errors
///
/// Returns [`AuthError::InvalidKeyMaterial`] if the input is not valid hex
/// or does not decode as either DER form.
pub fn signing_key_from_hex_der(api_secret_hex: &str) -> Result<SigningKey, AuthError> {
    let der = hex::decode(api_secret_hex.trim())
        .map_err(|e| AuthError::InvalidKeyMaterial(format!("private key is not hex: {e}")))?;

    let secret = SecretKey::from_pkcs8_der(&der)
        .or_else(|_| {
            SecretKey::from_sec1_der(&der)
                .map_err(|e| AuthError::InvalidKeyMaterial(format!("private key DER: {e}")))
        })?;

    Ok(SigningKey::from(secret))
}

/// Parse a hex-encoded SubjectPublicKeyInfo DER blob into a P-256 verifying key.
///
/// The signer never needs this — the public key hex is forwarded opaquely —
/// but it is the natural counterpart for verifying produced signatures.
///
/// # Errors
///
/// Returns [`AuthError::InvalidKeyMaterial`] if the input is not valid hex
/// or not a DER-encoded P-256 public key.
pub fn verifying_key_from_hex_der(api_key_hex: &str) -> Result<VerifyingKey, AuthError> {
    let der = hex::decode(api_key_hex.trim())
        .map_err(|e| AuthError::InvalidKeyMaterial(format!("public key is not hex: {e}")))?;

    let public = PublicKey::from_public_key_der(&der)
        .map_err(|e| AuthError::InvalidKeyMaterial(format!("public key DER: {e}")))?;

    Ok(VerifyingKey::from(public))
}
