use crate::profiles::OrderLimits;
use bybot_core::*;
use rust_decimal::Decimal;
use tracing::{debug, warn};

/// Rejects spot orders the wallet cannot cover or the configured limits forbid.
pub struct BalanceGuard {
    limits: OrderLimits,
}

impl BalanceGuard {
    pub fn new(limits: OrderLimits) -> Self {
        Self { limits }
    }

    /// Check the order's own fields.
    fn check_shape(&self, order: &SpotOrder) -> Option<String> {
        if order.quantity <= Decimal::ZERO {
            return Some(format!("Quantity must be positive, got {}", order.quantity));
        }
        if order.order_type == OrderType::Limit {
            match order.price {
                Some(p) if p > Decimal::ZERO => {}
                Some(p) => return Some(format!("Limit price must be positive, got {}", p)),
                None => return Some("Limit order has no price".to_string()),
            }
            if order.limit_value().is_none() {
                return Some(format!(
                    "Order value overflows: {} x {}",
                    order.quantity,
                    order.price.unwrap_or_default()
                ));
            }
        }
        None
    }

    /// Check operator limits.
    fn check_limits(&self, order: &SpotOrder) -> Option<String> {
        let symbol = order.symbol.to_string();
        if !self.limits.allows_symbol(&symbol) {
            return Some(format!("Symbol {} is not in the allowed list", symbol));
        }

        let notional = match (order.side, order.order_type) {
            (Side::Buy, _) => order.quote_cost(),
            (Side::Sell, OrderType::Limit) => order.limit_value(),
            // Market sells are sized in base coin; their value is unknown until filled.
            (Side::Sell, OrderType::Market) => None,
        };
        if let (Some(max), Some(value)) = (self.limits.max_order_notional, notional) {
            if value > max {
                return Some(format!(
                    "Order value {} {} would exceed limit of {}",
                    value, order.symbol.quote, max
                ));
            }
        }
        None
    }

    /// Check the wallet holds enough free funds.
    fn check_funds(&self, order: &SpotOrder, balances: &SpotBalances) -> Option<String> {
        match order.side {
            Side::Buy => {
                let cost = order.quote_cost()?;
                let free = balances.free_amount(&order.symbol.quote);
                if cost > free {
                    return Some(format!(
                        "Insufficient {}: buy needs {}, free balance is {}",
                        order.symbol.quote, cost, free
                    ));
                }
            }
            Side::Sell => {
                let free = balances.free_amount(&order.symbol.base);
                if order.quantity > free {
                    return Some(format!(
                        "Insufficient {}: sell of {} exceeds free balance {}",
                        order.symbol.base, order.quantity, free
                    ));
                }
            }
        }
        None
    }
}

fn decide(order: &SpotOrder, rejection: Option<String>) -> RiskDecision {
    match rejection {
        Some(reason) => {
            warn!(symbol = %order.symbol, side = ?order.side, "Order rejected: {}", reason);
            RiskDecision::Rejected(reason)
        }
        None => {
            debug!(symbol = %order.symbol, side = ?order.side, "Order approved");
            RiskDecision::Approved
        }
    }
}

impl RiskManager for BalanceGuard {
    fn pre_check(&self, order: &SpotOrder) -> RiskDecision {
        let rejection = self
            .check_shape(order)
            .or_else(|| self.check_limits(order));
        decide(order, rejection)
    }

    fn evaluate_order(&self, order: &SpotOrder, balances: &SpotBalances) -> RiskDecision {
        let rejection = self
            .check_shape(order)
            .or_else(|| self.check_limits(order))
            .or_else(|| self.check_funds(order, balances));
        decide(order, rejection)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn ethusdt() -> SpotSymbol {
        SpotSymbol::parse("ETHUSDT").unwrap()
    }

    fn wallet() -> SpotBalances {
        SpotBalances(vec![
            Balance::free("USDT", dec!(1000)),
            Balance::free("ETH", dec!(0.5)),
        ])
    }

    #[test]
    fn test_market_buy_within_balance() {
        let guard = BalanceGuard::new(OrderLimits::default());
        let order = SpotOrder::market(ethusdt(), Side::Buy, dec!(1000));
        assert!(guard.evaluate_order(&order, &wallet()).is_approved());
    }

    #[test]
    fn test_limit_buy_exceeding_quote_balance() {
        let guard = BalanceGuard::new(OrderLimits::default());
        let order = SpotOrder::limit(ethusdt(), Side::Buy, dec!(1), dec!(1500));

        match guard.evaluate_order(&order, &wallet()) {
            RiskDecision::Rejected(msg) => assert!(msg.contains("Insufficient USDT")),
            _ => panic!("Expected rejection"),
        }
    }

    #[test]
    fn test_sell_more_than_held() {
        let guard = BalanceGuard::new(OrderLimits::default());
        let order = SpotOrder::market(ethusdt(), Side::Sell, dec!(1));

        match guard.evaluate_order(&order, &wallet()) {
            RiskDecision::Rejected(msg) => assert!(msg.contains("Insufficient ETH")),
            _ => panic!("Expected rejection"),
        }
    }

    #[test]
    fn test_unheld_coin_counts_as_zero() {
        let guard = BalanceGuard::new(OrderLimits::default());
        let order = SpotOrder::market(SpotSymbol::parse("BTCUSDT").unwrap(), Side::Sell, dec!(0.1));
        assert!(!guard.evaluate_order(&order, &wallet()).is_approved());
    }

    #[test]
    fn test_non_positive_quantity() {
        let guard = BalanceGuard::new(OrderLimits::default());
        let order = SpotOrder::market(ethusdt(), Side::Buy, dec!(0));

        match guard.evaluate_order(&order, &wallet()) {
            RiskDecision::Rejected(msg) => assert!(msg.contains("positive")),
            _ => panic!("Expected rejection"),
        }
    }

    #[test]
    fn test_limit_value_overflow_rejected() {
        let guard = BalanceGuard::new(OrderLimits::default());
        let buy = SpotOrder::limit(ethusdt(), Side::Buy, Decimal::MAX, dec!(2));

        match guard.evaluate_order(&buy, &wallet()) {
            RiskDecision::Rejected(msg) => assert!(msg.contains("overflows")),
            _ => panic!("Expected rejection"),
        }

        let sell = SpotOrder::limit(ethusdt(), Side::Sell, Decimal::MAX, dec!(2));
        assert!(!guard.pre_check(&sell).is_approved());
    }

    #[test]
    fn test_pre_check_ignores_funds() {
        let guard = BalanceGuard::new(OrderLimits::default());
        // Far more than the wallet holds, but well-formed
        let order = SpotOrder::market(ethusdt(), Side::Buy, dec!(1000000));
        assert!(guard.pre_check(&order).is_approved());
        assert!(!guard.evaluate_order(&order, &wallet()).is_approved());

        let missing_qty = SpotOrder::market(ethusdt(), Side::Buy, dec!(0));
        assert!(!guard.pre_check(&missing_qty).is_approved());
    }

    #[test]
    fn test_notional_limit() {
        let guard = BalanceGuard::new(OrderLimits {
            max_order_notional: Some(dec!(100)),
            allowed_symbols: Vec::new(),
        });
        let order = SpotOrder::market(ethusdt(), Side::Buy, dec!(150));

        match guard.evaluate_order(&order, &wallet()) {
            RiskDecision::Rejected(msg) => assert!(msg.contains("exceed")),
            _ => panic!("Expected rejection"),
        }
    }

    #[test]
    fn test_symbol_not_allowed() {
        let guard = BalanceGuard::new(OrderLimits {
            max_order_notional: None,
            allowed_symbols: vec!["BTCUSDT".to_string()],
        });
        let order = SpotOrder::market(ethusdt(), Side::Buy, dec!(10));
        assert!(!guard.evaluate_order(&order, &wallet()).is_approved());
    }
}
