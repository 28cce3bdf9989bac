//! Leptage API request signing and webhook verification.
//!
//! This crate implements the two authentication flows of the Leptage payment
//! gateway protocol:
//!
//! - **Outbound**: every API call is signed with ECDSA P-256 + SHA-256 over a
//!   canonical string built from the HTTP method, the resource path, a
//!   millisecond nonce, and the canonicalized request parameters. The
//!   DER-encoded signature travels hex-encoded in the `x-api-signature`
//!   header alongside `x-api-key` and `x-api-nonce`.
//! - **Inbound**: webhook deliveries from the gateway carry an HMAC-SHA256
//!   signature over the nonce, the registered callback URL, and the compacted
//!   request body, keyed by a shared webhook secret. Verification is a pure
//!   accept/reject decision that fails closed on any malformed input.
//!
//! Both flows depend on byte-exact canonicalization: the remote side rebuilds
//! the same string independently, so any divergence in ordering, whitespace,
//! or numeric formatting produces a systematic signature mismatch.
//!
//! # Usage
//!
//! ```rust,no_run
//! use leptage_auth::signer::RequestSigner;
//! use leptage_auth::webhook::WebhookVerifier;
//!
//! let signer = RequestSigner::from_hex_keys("<public key hex>", "<private key hex>").unwrap();
//! let signed = signer.sign(&http::Method::GET, "/v1/balance", None).unwrap();
//! // Attach signed.headers to the outgoing request.
//!
//! let verifier = WebhookVerifier::new("<webhook secret>", "https://example.com/webhook");
//! // verifier.verify(&headers, &body_bytes) for each delivery.
//! ```
//!
//! # Modules
//!
//! - [`canonical`] - Deterministic parameter canonicalization
//! - [`error`] - Authentication error types
//! - [`keys`] - Hex-DER key material parsing
//! - [`signer`] - Outbound request signing
//! - [`webhook`] - Inbound webhook verification

pub mod canonical;
pub mod error;
pub mod keys;
pub mod signer;
pub mod webhook;

pub use canonical::{canonical_json, encode_params};
pub use error::AuthError;
pub use signer::{RequestSigner, SignedHeaders, SignedRequest};
pub use webhook::WebhookVerifier;
