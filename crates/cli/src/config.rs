//! Client configuration for the `phone` subcommand
//!
//! Layers, lowest first: built-in defaults, the TOML file, then command
//! line flags and their environment variables.
//!
//! ```toml
//! token_url = "https://api.example.com/public/voice/plivo/token"
//! prepare_call_url = "https://api.example.com/public/voice/plivo/prepare/call"
//! client_ready_delay_ms = 2000
//! status_reset_delay_ms = 3000
//!
//! [sdk]
//! debug = "INFO"
//! maxAverageBitrate = 32000
//! ```

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Args;

use webphone_client_core::ClientConfig;

/// Flags shaping the [`ClientConfig`]
#[derive(Args, Debug, Clone, Default)]
pub struct ConfigArgs {
    /// TOML configuration file (defaults to <config dir>/webphone/config.toml when present)
    #[arg(short, long, env = "WEBPHONE_CONFIG")]
    pub config: Option<PathBuf>,

    /// Base URL serving both backend endpoints
    #[arg(long, env = "WEBPHONE_BACKEND_URL")]
    pub backend: Option<String>,

    /// Token endpoint URL
    #[arg(long, env = "WEBPHONE_TOKEN_URL")]
    pub token_url: Option<String>,

    /// Call-preparation endpoint URL
    #[arg(long, env = "WEBPHONE_PREPARE_CALL_URL")]
    pub prepare_call_url: Option<String>,

    /// Delay between login and the client being ready, in milliseconds
    #[arg(long, env = "WEBPHONE_CLIENT_READY_DELAY_MS")]
    pub client_ready_delay_ms: Option<u64>,

    /// How long an ended call stays displayed, in milliseconds
    #[arg(long, env = "WEBPHONE_STATUS_RESET_DELAY_MS")]
    pub status_reset_delay_ms: Option<u64>,
}

impl ConfigArgs {
    /// Resolve the final configuration
    pub fn resolve(&self) -> Result<ClientConfig> {
        let base = match self.config_path() {
            Some(path) => load_file(&path)?,
            None => ClientConfig::default(),
        };
        let config = self.apply(base);
        config.validate().context("Invalid client configuration")?;
        Ok(config)
    }

    fn config_path(&self) -> Option<PathBuf> {
        if let Some(path) = &self.config {
            return Some(path.clone());
        }
        dirs::config_dir()
            .map(|dir| dir.join("webphone").join("config.toml"))
            .filter(|path| path.is_file())
    }

    fn apply(&self, mut config: ClientConfig) -> ClientConfig {
        if let Some(base) = &self.backend {
            config = config.with_backend_base(base);
        }
        if let Some(url) = &self.token_url {
            config = config.with_token_url(url.clone());
        }
        if let Some(url) = &self.prepare_call_url {
            config = config.with_prepare_call_url(url.clone());
        }
        if let Some(ms) = self.client_ready_delay_ms {
            config = config.with_client_ready_delay(Duration::from_millis(ms));
        }
        if let Some(ms) = self.status_reset_delay_ms {
            config = config.with_status_reset_delay(Duration::from_millis(ms));
        }
        config
    }
}

fn load_file(path: &Path) -> Result<ClientConfig> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file {}", path.display()))?;
    parse(&text).with_context(|| format!("Failed to parse config file {}", path.display()))
}

fn parse(text: &str) -> Result<ClientConfig> {
    Ok(toml::from_str(text)?)
}
