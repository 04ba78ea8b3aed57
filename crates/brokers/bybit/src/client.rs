use async_trait::async_trait;
use bybot_core::*;
use chrono::Utc;
use reqwest::Method;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, info};

use crate::auth::signed_params;
use crate::protocol::*;

/// Configuration for connecting to the Bybit REST API.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BybitConfig {
    /// Base URL, e.g. "https://api-testnet.bybit.com".
    pub base_url: String,
    /// How long the exchange should accept a signed request, in milliseconds.
    pub recv_window_ms: Option<u64>,
    /// Whole-request timeout in seconds. `None` keeps the HTTP client default.
    pub timeout_secs: Option<u64>,
}

impl BybitConfig {
    pub fn for_environment(environment: Environment) -> Self {
        Self {
            base_url: environment.base_url().to_string(),
            recv_window_ms: None,
            timeout_secs: None,
        }
    }
}

impl Default for BybitConfig {
    fn default() -> Self {
        Self::for_environment(Environment::Testnet)
    }
}

/// Bybit spot REST client.
///
/// Public construction never talks to the network; every call to a private
/// endpoint is one signed HTTP request with no retry.
#[derive(Clone)]
pub struct BybitClient {
    config: BybitConfig,
    http: reqwest::Client,
    credentials: Option<Credentials>,
}

impl BybitClient {
    pub fn new(config: BybitConfig) -> Result<Self, ExchangeError> {
        let mut builder = reqwest::Client::builder();
        if let Some(secs) = config.timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        let http = builder
            .build()
            .map_err(|e| ExchangeError::Transport(format!("HTTP client setup failed: {}", e)))?;

        Ok(Self {
            config,
            http,
            credentials: None,
        })
    }

    /// Client bound to the paper-trading sandbox.
    pub fn new_testnet() -> Result<Self, ExchangeError> {
        Self::new(BybitConfig::default())
    }

    /// Attach the key/secret pair used to sign private requests.
    pub fn with_auth(mut self, credentials: Credentials) -> Self {
        self.credentials = Some(credentials);
        self
    }

    pub fn config(&self) -> &BybitConfig {
        &self.config
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.config.base_url.trim_end_matches('/'), path)
    }

    /// Send one signed request and unwrap the response envelope.
    async fn send_signed<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        params: Vec<(String, String)>,
    ) -> Result<T, ExchangeError> {
        let credentials = self
            .credentials
            .as_ref()
            .ok_or_else(|| ExchangeError::Other("API credentials not set".to_string()))?;

        let query = signed_params(
            credentials,
            params,
            Utc::now().timestamp_millis(),
            self.config.recv_window_ms,
        )?;

        debug!(method = %method, path = path, "Sending signed request");

        let response = self
            .http
            .request(method, self.url(path))
            .query(&query)
            .send()
            .await
            .map_err(|e| ExchangeError::Transport(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| ExchangeError::Transport(format!("Read error: {}", e)))?;

        if !status.is_success() {
            return Err(ExchangeError::Http {
                status: status.as_u16(),
                body,
            });
        }

        let envelope: ApiResponse<T> = serde_json::from_str(&body)
            .map_err(|e| ExchangeError::Decode(format!("{}: {}", e, body)))?;
        envelope.into_result()
    }
}

#[async_trait]
impl SpotAccount for BybitClient {
    async fn spot_wallet_balance(&self) -> Result<SpotBalances, ExchangeError> {
        let result: WalletBalanceResult = self
            .send_signed(Method::GET, SPOT_WALLET_BALANCE_PATH, Vec::new())
            .await?;
        let balances = SpotBalances::from(result);
        debug!(coins = balances.len(), "Fetched spot wallet balance");
        Ok(balances)
    }

    async fn place_spot_order(&self, order: &SpotOrder) -> Result<OrderAck, ExchangeError> {
        let params = SpotOrderParams::from_order(order).to_pairs();
        let result: OrderResult = self
            .send_signed(Method::POST, SPOT_ORDER_PATH, params)
            .await?;
        let ack = OrderAck::from(result);
        info!(
            order_id = %ack.order_id,
            symbol = %ack.symbol,
            status = %ack.status,
            "Spot order accepted"
        );
        Ok(ack)
    }
}
