//! Configuration and component wiring for the Leptage integration.
//!
//! All secrets are driven by environment variables. The configuration is
//! loaded once at process start and turned into the long-lived
//! [`leptage_auth::RequestSigner`] and [`leptage_auth::WebhookVerifier`],
//! which are then shared read-only across request handlers.
//!
//! # Modules
//!
//! - [`config`] - Environment-driven configuration

pub mod config;

pub use config::LeptageConfig;
