use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Operator-configured limits applied to every spot order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OrderLimits {
    /// Largest quote-coin value a single order may carry.
    pub max_order_notional: Option<Decimal>,
    /// Symbols that may be traded. Empty allows all.
    pub allowed_symbols: Vec<String>,
}

impl OrderLimits {
    pub fn allows_symbol(&self, symbol: &str) -> bool {
        self.allowed_symbols.is_empty()
            || self
                .allowed_symbols
                .iter()
                .any(|s| s.eq_ignore_ascii_case(symbol))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_limits_from_toml() {
        let limits: OrderLimits = toml::from_str(
            r#"
            max_order_notional = "250"
            allowed_symbols = ["ETHUSDT", "BTCUSDT"]
            "#,
        )
        .unwrap();
        assert_eq!(limits.max_order_notional, Some(dec!(250)));
        assert!(limits.allows_symbol("ethusdt"));
        assert!(!limits.allows_symbol("XRPUSDT"));
    }

    #[test]
    fn test_default_allows_everything() {
        let limits = OrderLimits::default();
        assert!(limits.max_order_notional.is_none());
        assert!(limits.allows_symbol("ANYTHING"));
    }
}
