use anyhow::{bail, Context, Result};
use bybot_brokers_bybit::BybitConfig;
use bybot_core::{Credentials, Environment};
use bybot_risk::OrderLimits;
use serde::Deserialize;
use std::path::Path;

/// Contents of the optional TOML config file.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub exchange: ExchangeSettings,
    pub limits: OrderLimits,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ExchangeSettings {
    /// Talk to the paper-trading sandbox.
    pub testnet: bool,
    /// Overrides the environment's base URL.
    pub base_url: Option<String>,
    pub recv_window_ms: Option<u64>,
    pub timeout_secs: Option<u64>,
}

impl Default for ExchangeSettings {
    fn default() -> Self {
        Self {
            testnet: true,
            base_url: None,
            recv_window_ms: None,
            timeout_secs: None,
        }
    }
}

impl ExchangeSettings {
    pub fn environment(&self) -> Environment {
        if self.testnet {
            Environment::Testnet
        } else {
            Environment::Mainnet
        }
    }

    pub fn client_config(&self) -> BybitConfig {
        let mut config = BybitConfig::for_environment(self.environment());
        if let Some(url) = &self.base_url {
            config.base_url = url.clone();
        }
        config.recv_window_ms = self.recv_window_ms;
        config.timeout_secs = self.timeout_secs;
        config
    }
}

impl Settings {
    /// Load settings from `path`, or defaults when no file is given.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        Self::from_toml(&raw).with_context(|| format!("Invalid config file {}", path.display()))
    }

    pub fn from_toml(raw: &str) -> Result<Self> {
        Ok(toml::from_str(raw)?)
    }
}

/// Build credentials from the values clap collected from flags or the environment.
pub fn credentials(api_key: Option<String>, api_secret: Option<String>) -> Result<Credentials> {
    let key = api_key.map(|k| k.trim().to_string()).unwrap_or_default();
    let secret = api_secret.map(|s| s.trim().to_string()).unwrap_or_default();
    if key.is_empty() {
        bail!("API key missing: set BYBIT_API_KEY or pass --api-key");
    }
    if secret.is_empty() {
        bail!("API secret missing: set BYBIT_API_SECRET or pass --api-secret");
    }
    Ok(Credentials::new(key, secret))
}
