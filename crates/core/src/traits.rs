use crate::models::*;
use async_trait::async_trait;

// ---------------------------------------------------------------------------
// Exchange Errors
// ---------------------------------------------------------------------------

/// Errors that can occur while talking to the exchange.
#[derive(Debug, thiserror::Error)]
pub enum ExchangeError {
    #[error("Request failed: {0}")]
    Transport(String),
    #[error("HTTP {status}: {body}")]
    Http { status: u16, body: String },
    #[error("API error {code}: {message}")]
    Api { code: i64, message: String },
    #[error("Malformed response: {0}")]
    Decode(String),
    #[error("Signing failed: {0}")]
    Signing(String),
    #[error("Exchange error: {0}")]
    Other(String),
}

// ---------------------------------------------------------------------------
// Spot Account Trait
// ---------------------------------------------------------------------------

/// An authenticated view of a spot trading account.
#[async_trait]
pub trait SpotAccount: Send + Sync {
    /// Fetch the balances of the spot wallet.
    async fn spot_wallet_balance(&self) -> Result<SpotBalances, ExchangeError>;

    /// Place a spot order.
    async fn place_spot_order(&self, order: &SpotOrder) -> Result<OrderAck, ExchangeError>;
}

// ---------------------------------------------------------------------------
// Risk Manager Trait
// ---------------------------------------------------------------------------

/// Outcome of a pre-trade check.
#[derive(Debug, Clone, PartialEq)]
pub enum RiskDecision {
    /// Order is approved.
    Approved,
    /// Order is rejected with a reason.
    Rejected(String),
}

impl RiskDecision {
    pub fn is_approved(&self) -> bool {
        matches!(self, RiskDecision::Approved)
    }
}

/// Evaluates spot orders against the wallet before submission.
pub trait RiskManager: Send + Sync {
    /// Checks that need no account data; run before anything is fetched.
    fn pre_check(&self, order: &SpotOrder) -> RiskDecision;

    /// Check whether an order should be allowed given the current balances.
    fn evaluate_order(&self, order: &SpotOrder, balances: &SpotBalances) -> RiskDecision;
}
