//! Client configuration
//!
//! [`ClientConfig`] gathers everything the controller needs besides its
//! collaborators: where the two backend endpoints live, how long the
//! post-login warm-up and the call-ended display last, how the SDK is
//! constructed, and which address suffix inbound callers carry.
//!
//! # Usage Examples
//!
//! ```rust
//! use std::time::Duration;
//! use webphone_client_core::client::config::ClientConfig;
//!
//! let config = ClientConfig::new()
//!     .with_backend_base("https://voice.example.com/api")
//!     .with_status_reset_delay(Duration::from_secs(1));
//!
//! assert_eq!(config.token_url, "https://voice.example.com/api/public/voice/plivo/token");
//! assert_eq!(config.status_reset_delay(), Duration::from_secs(1));
//! assert!(config.validate().is_ok());
//! ```

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{ClientError, ClientResult};
use crate::phone::DEFAULT_ADDRESS_SUFFIX;
use crate::sdk::SdkOptions;

/// Path of the token endpoint relative to the backend base
pub const TOKEN_PATH: &str = "/public/voice/plivo/token";
/// Path of the call-preparation endpoint relative to the backend base
pub const PREPARE_CALL_PATH: &str = "/public/voice/plivo/prepare/call";
/// Backend base used when nothing else is configured
pub const DEFAULT_BACKEND_BASE: &str = "http://127.0.0.1:8080";

/// Delay between login success and the client being ready to dial
pub const DEFAULT_CLIENT_READY_DELAY_MS: u64 = 2_000;
/// How long `Ended` is shown before reverting to `Idle`
pub const DEFAULT_STATUS_RESET_DELAY_MS: u64 = 3_000;

/// Main controller configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Token endpoint URL
    pub token_url: String,
    /// Call-preparation endpoint URL
    pub prepare_call_url: String,
    /// Warm-up delay after login, in milliseconds
    pub client_ready_delay_ms: u64,
    /// Call-ended display time, in milliseconds
    pub status_reset_delay_ms: u64,
    /// Suffix stripped from inbound caller addresses
    pub incoming_address_suffix: String,
    /// Options passed to the SDK on construction
    pub sdk: SdkOptions,
}

impl ClientConfig {
    /// Configuration with default endpoints and delays
    pub fn new() -> Self {
        Self::default()
    }

    /// Point both endpoints at `base` using the standard paths
    pub fn with_backend_base(mut self, base: &str) -> Self {
        let base = base.trim_end_matches('/');
        self.token_url = format!("{}{}", base, TOKEN_PATH);
        self.prepare_call_url = format!("{}{}", base, PREPARE_CALL_PATH);
        self
    }

    pub fn with_token_url(mut self, url: impl Into<String>) -> Self {
        self.token_url = url.into();
        self
    }

    pub fn with_prepare_call_url(mut self, url: impl Into<String>) -> Self {
        self.prepare_call_url = url.into();
        self
    }

    pub fn with_client_ready_delay(mut self, delay: Duration) -> Self {
        self.client_ready_delay_ms = delay.as_millis() as u64;
        self
    }

    pub fn with_status_reset_delay(mut self, delay: Duration) -> Self {
        self.status_reset_delay_ms = delay.as_millis() as u64;
        self
    }

    pub fn with_incoming_address_suffix(mut self, suffix: impl Into<String>) -> Self {
        self.incoming_address_suffix = suffix.into();
        self
    }

    pub fn with_sdk_options(mut self, options: SdkOptions) -> Self {
        self.sdk = options;
        self
    }

    pub fn client_ready_delay(&self) -> Duration {
        Duration::from_millis(self.client_ready_delay_ms)
    }

    pub fn status_reset_delay(&self) -> Duration {
        Duration::from_millis(self.status_reset_delay_ms)
    }

    /// Check the configuration before a controller is built from it
    pub fn validate(&self) -> ClientResult<()> {
        validate_endpoint("token_url", &self.token_url)?;
        validate_endpoint("prepare_call_url", &self.prepare_call_url)?;

        if self.sdk.max_average_bitrate == 0 {
            return Err(ClientError::config("sdk.max_average_bitrate must be greater than zero"));
        }

        Ok(())
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            token_url: format!("{}{}", DEFAULT_BACKEND_BASE, TOKEN_PATH),
            prepare_call_url: format!("{}{}", DEFAULT_BACKEND_BASE, PREPARE_CALL_PATH),
            client_ready_delay_ms: DEFAULT_CLIENT_READY_DELAY_MS,
            status_reset_delay_ms: DEFAULT_STATUS_RESET_DELAY_MS,
            incoming_address_suffix: DEFAULT_ADDRESS_SUFFIX.to_string(),
            sdk: SdkOptions::default(),
        }
    }
}

fn validate_endpoint(field: &str, value: &str) -> ClientResult<()> {
    let url = url::Url::parse(value)
        .map_err(|e| ClientError::config(format!("{} is not a valid URL ({}): {}", field, value, e)))?;

    match url.scheme() {
        "http" | "https" => Ok(()),
        other => Err(ClientError::config(format!(
            "{} must use http or https, got {}",
            field, other
        ))),
    }
}
