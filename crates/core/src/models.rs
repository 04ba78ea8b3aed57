use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

// ---------------------------------------------------------------------------
// Credentials & Environment
// ---------------------------------------------------------------------------

/// API key/secret pair used to sign private requests.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub api_key: String,
    api_secret: String,
}

impl Credentials {
    pub fn new(api_key: impl Into<String>, api_secret: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            api_secret: api_secret.into(),
        }
    }

    pub fn api_secret(&self) -> &str {
        &self.api_secret
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("api_key", &self.api_key)
            .field("api_secret", &"<redacted>")
            .finish()
    }
}

/// Which exchange deployment a client talks to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Environment {
    /// Paper-trading sandbox.
    Testnet,
    Mainnet,
}

impl Environment {
    pub fn base_url(&self) -> &'static str {
        match self {
            Environment::Testnet => "https://api-testnet.bybit.com",
            Environment::Mainnet => "https://api.bybit.com",
        }
    }
}

// ---------------------------------------------------------------------------
// Balances
// ---------------------------------------------------------------------------

/// Balance of a single coin in the spot wallet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Balance {
    pub coin: String,
    pub coin_id: String,
    pub coin_name: String,
    pub total: Decimal,
    pub free: Decimal,
    pub locked: Decimal,
}

impl Balance {
    /// A balance with everything free, as a freshly funded sandbox wallet reports it.
    pub fn free(coin: &str, amount: Decimal) -> Self {
        Self {
            coin: coin.to_string(),
            coin_id: coin.to_string(),
            coin_name: coin.to_string(),
            total: amount,
            free: amount,
            locked: Decimal::ZERO,
        }
    }
}

impl fmt::Display for Balance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{{{} {} {} {} {} {}}}",
            self.coin, self.coin_id, self.coin_name, self.total, self.free, self.locked
        )
    }
}

/// The spot wallet's per-coin balances in exchange order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SpotBalances(pub Vec<Balance>);

impl SpotBalances {
    pub fn get(&self, coin: &str) -> Option<&Balance> {
        self.0.iter().find(|b| b.coin.eq_ignore_ascii_case(coin))
    }

    /// Free amount of `coin`, zero when the wallet has never held it.
    pub fn free_amount(&self, coin: &str) -> Decimal {
        self.get(coin).map(|b| b.free).unwrap_or(Decimal::ZERO)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for SpotBalances {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[")?;
        for (i, balance) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            write!(f, "{}", balance)?;
        }
        f.write_str("]")
    }
}

// ---------------------------------------------------------------------------
// Symbols
// ---------------------------------------------------------------------------

/// Quote coins recognised when splitting a spot symbol.
const QUOTE_COINS: &[&str] = &["USDT", "USDC", "BUSD", "EUR", "DAI", "BTC", "ETH"];

/// A spot pair such as `ETHUSDT`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SpotSymbol {
    pub base: String,
    pub quote: String,
}

impl SpotSymbol {
    /// Split an exchange symbol into base and quote coins.
    pub fn parse(symbol: &str) -> Option<Self> {
        let upper = symbol.trim().to_uppercase();
        QUOTE_COINS.iter().find_map(|quote| {
            let base = upper.strip_suffix(quote)?;
            if base.is_empty() {
                None
            } else {
                Some(Self {
                    base: base.to_string(),
                    quote: quote.to_string(),
                })
            }
        })
    }
}

impl fmt::Display for SpotSymbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.base, self.quote)
    }
}

// ---------------------------------------------------------------------------
// Orders
// ---------------------------------------------------------------------------

/// Order side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Side {
    Buy,
    Sell,
}

/// Spot order type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderType {
    Market,
    Limit,
}

/// A spot order to be submitted to the exchange.
///
/// For market buys `quantity` is the quote amount to spend; everywhere else
/// it is the base amount.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpotOrder {
    /// Client-assigned id, sent as the order link id.
    pub id: Uuid,
    pub symbol: SpotSymbol,
    pub side: Side,
    pub order_type: OrderType,
    pub quantity: Decimal,
    pub price: Option<Decimal>,
    pub created_at: DateTime<Utc>,
}

impl SpotOrder {
    /// Create a new market order.
    pub fn market(symbol: SpotSymbol, side: Side, quantity: Decimal) -> Self {
        Self {
            id: Uuid::new_v4(),
            symbol,
            side,
            order_type: OrderType::Market,
            quantity,
            price: None,
            created_at: Utc::now(),
        }
    }

    /// Create a new limit order.
    pub fn limit(symbol: SpotSymbol, side: Side, quantity: Decimal, price: Decimal) -> Self {
        Self {
            id: Uuid::new_v4(),
            symbol,
            side,
            order_type: OrderType::Limit,
            quantity,
            price: Some(price),
            created_at: Utc::now(),
        }
    }

    /// `price * quantity` for priced orders. `None` without a price or on overflow.
    pub fn limit_value(&self) -> Option<Decimal> {
        self.price.and_then(|p| p.checked_mul(self.quantity))
    }

    /// Quote-coin amount this order can consume if it is a buy.
    pub fn quote_cost(&self) -> Option<Decimal> {
        match (self.side, self.order_type) {
            (Side::Buy, OrderType::Market) => Some(self.quantity),
            (Side::Buy, OrderType::Limit) => self.limit_value(),
            (Side::Sell, _) => None,
        }
    }
}

/// Exchange acknowledgement of a placed order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderAck {
    pub order_id: String,
    pub order_link_id: String,
    pub symbol: String,
    pub status: String,
    pub quantity: Decimal,
    pub executed_quantity: Decimal,
    pub price: Decimal,
    pub transact_time: Option<DateTime<Utc>>,
}

impl fmt::Display for OrderAck {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{{{} {} {} {} {} {}}}",
            self.order_id,
            self.symbol,
            self.status,
            self.quantity,
            self.executed_quantity,
            self.price
        )
    }
}
