//! Error types for Leptage request authentication.
//!
//! All signing failures are represented by [`AuthError`], which provides a
//! specific variant for each failure mode. Webhook verification never
//! surfaces these errors: the verifier folds every internal failure into a
//! rejection so a caller cannot mistake an error for "verification skipped".

/// Errors that can occur while building signed Leptage API requests.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    /// No API key / secret is configured; signed calls cannot be made.
    #[error("Leptage API credentials are not configured")]
    MissingCredentials,

    /// Key material could not be hex-decoded or parsed as DER.
    #[error("Invalid key material: {0}")]
    InvalidKeyMaterial(String),

    /// The ECDSA signing operation itself failed.
    #[error("Signing failed: {0}")]
    SigningFailed(String),

    /// A computed header value is not a valid HTTP header value.
    #[error("Invalid header value for {0}")]
    InvalidHeaderValue(&'static str),
}
