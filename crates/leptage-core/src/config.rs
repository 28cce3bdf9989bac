//! Configuration for the Leptage integration.
//!
//! Credentials and the registered callback URL are driven by environment
//! variables, loaded once at process start:
//!
//! ```text
//! LEPTAGE_API_KEY        hex public key identifier
//! LEPTAGE_API_SECRET     hex DER P-256 private key
//! LEPTAGE_WEBHOOK_SECRET shared webhook HMAC secret
//! LEPTAGE_WEBHOOK_URL    callback URL registered with the gateway
//! LEPTAGE_API_PREFIX     signed resource prefix (default /openapi)
//! ```

use leptage_auth::signer::DEFAULT_API_PREFIX;
use leptage_auth::{AuthError, RequestSigner, WebhookVerifier};

/// Configuration for the Leptage signer and webhook verifier.
#[derive(Clone, serde::Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LeptageConfig {
    /// Hex public key identifier (the API key).
    pub api_key: String,
    /// Hex DER P-256 private key (the API secret).
    pub api_secret: String,
    /// Shared secret for webhook HMAC verification.
    pub webhook_secret: String,
    /// Callback URL registered with the gateway out-of-band.
    pub webhook_url: String,
    /// Resource prefix baked into every signed string.
    pub api_prefix: String,
}

impl Default for LeptageConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            api_secret: String::new(),
            webhook_secret: String::new(),
            webhook_url: String::new(),
            api_prefix: DEFAULT_API_PREFIX.to_owned(),
        }
    }
}

impl std::fmt::Debug for LeptageConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LeptageConfig")
            .field("api_key", &self.api_key)
            .field("api_secret", &"<redacted>")
            .field("webhook_secret", &"<redacted>")
            .field("webhook_url", &self.webhook_url)
            .field("api_prefix", &self.api_prefix)
            .finish()
    }
}

impl LeptageConfig {
    /// Load configuration from environment variables.
    ///
    /// Values are trimmed; unset variables leave the defaults in place.
    #[must_use]
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(v) = std::env::var("LEPTAGE_API_KEY") {
            config.api_key = v.trim().to_owned();
        }
        if let Ok(v) = std::env::var("LEPTAGE_API_SECRET") {
            config.api_secret = v.trim().to_owned();
        }
        if let Ok(v) = std::env::var("LEPTAGE_WEBHOOK_SECRET") {
            config.webhook_secret = v.trim().to_owned();
        }
        if let Ok(v) = std::env::var("LEPTAGE_WEBHOOK_URL") {
            config.webhook_url = v.trim().to_owned();
        }
        if let Ok(v) = std::env::var("LEPTAGE_API_PREFIX") {
            config.api_prefix = v.trim().to_owned();
        }

        config
    }

    /// Whether signed API calls can be made with this configuration.
    #[must_use]
    pub fn is_configured(&self) -> bool {
        !self.api_key.is_empty() && !self.api_secret.is_empty()
    }

    /// Build the long-lived request signer.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::MissingCredentials`] when the key material is
    /// absent — callers must treat this as "cannot make authenticated
    /// calls", never fall back to unsigned requests — and
    /// [`AuthError::InvalidKeyMaterial`] when the private key does not
    /// parse.
    pub fn request_signer(&self) -> Result<RequestSigner, AuthError> {
        if !self.is_configured() {
            return Err(AuthError::MissingCredentials);
        }

        Ok(RequestSigner::from_hex_keys(&self.api_key, &self.api_secret)?
            .with_api_prefix(self.api_prefix.clone()))
    }

    /// Build the long-lived webhook verifier.
    ///
    /// Always succeeds: a verifier built without a webhook secret rejects
    /// every delivery, so an unconfigured deployment fails closed instead of
    /// accepting forged callbacks.
    #[must_use]
    pub fn webhook_verifier(&self) -> WebhookVerifier {
        WebhookVerifier::new(self.webhook_secret.clone(), self.webhook_url.clone())
    }
}
