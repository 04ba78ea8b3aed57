use bybot_core::*;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Deserialize;

/// Spot wallet balance endpoint.
pub const SPOT_WALLET_BALANCE_PATH: &str = "/spot/v1/account";
/// Spot order placement endpoint.
pub const SPOT_ORDER_PATH: &str = "/spot/v1/order";

/// Envelope wrapping every spot v1 response.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiResponse<T> {
    pub ret_code: i64,
    #[serde(default)]
    pub ret_msg: String,
    pub result: Option<T>,
}

impl<T> ApiResponse<T> {
    /// Unwrap the result, mapping a non-zero `ret_code` to an API error.
    pub fn into_result(self) -> Result<T, ExchangeError> {
        if self.ret_code != 0 {
            return Err(ExchangeError::Api {
                code: self.ret_code,
                message: self.ret_msg,
            });
        }
        self.result
            .ok_or_else(|| ExchangeError::Decode("response has no result".to_string()))
    }
}

/// `result` of the wallet balance endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct WalletBalanceResult {
    #[serde(default)]
    pub balances: Vec<BalanceEntry>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BalanceEntry {
    pub coin: String,
    #[serde(default)]
    pub coin_id: String,
    #[serde(default)]
    pub coin_name: String,
    pub total: Decimal,
    pub free: Decimal,
    pub locked: Decimal,
}

impl From<BalanceEntry> for Balance {
    fn from(entry: BalanceEntry) -> Self {
        Balance {
            coin: entry.coin,
            coin_id: entry.coin_id,
            coin_name: entry.coin_name,
            total: entry.total,
            free: entry.free,
            locked: entry.locked,
        }
    }
}

impl From<WalletBalanceResult> for SpotBalances {
    fn from(result: WalletBalanceResult) -> Self {
        SpotBalances(result.balances.into_iter().map(Balance::from).collect())
    }
}

/// Query parameters of a spot order, before signing.
#[derive(Debug, Clone)]
pub struct SpotOrderParams {
    pub symbol: String,
    pub qty: Decimal,
    pub side: &'static str,
    pub order_type: &'static str,
    pub price: Option<Decimal>,
    pub time_in_force: Option<&'static str>,
    pub order_link_id: String,
}

impl SpotOrderParams {
    pub fn from_order(order: &SpotOrder) -> Self {
        let (order_type, time_in_force) = match order.order_type {
            OrderType::Market => ("MARKET", None),
            OrderType::Limit => ("LIMIT", Some("GTC")),
        };
        Self {
            symbol: order.symbol.to_string(),
            qty: order.quantity,
            side: match order.side {
                Side::Buy => "Buy",
                Side::Sell => "Sell",
            },
            order_type,
            price: order.price,
            time_in_force,
            order_link_id: order.id.to_string(),
        }
    }

    /// Flatten into `(name, value)` pairs using the exchange's parameter names.
    pub fn to_pairs(&self) -> Vec<(String, String)> {
        let mut pairs = vec![
            ("symbol".to_string(), self.symbol.clone()),
            ("qty".to_string(), self.qty.normalize().to_string()),
            ("side".to_string(), self.side.to_string()),
            ("type".to_string(), self.order_type.to_string()),
            ("orderLinkId".to_string(), self.order_link_id.clone()),
        ];
        if let Some(price) = self.price {
            pairs.push(("price".to_string(), price.normalize().to_string()));
        }
        if let Some(tif) = self.time_in_force {
            pairs.push(("timeInForce".to_string(), tif.to_string()));
        }
        pairs
    }
}

/// `result` of the order placement endpoint.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderResult {
    pub order_id: String,
    #[serde(default)]
    pub order_link_id: String,
    pub symbol: String,
    #[serde(default)]
    pub status: String,
    pub orig_qty: Decimal,
    #[serde(default)]
    pub executed_qty: Decimal,
    #[serde(default)]
    pub price: Decimal,
    pub transact_time: Option<String>,
}

impl From<OrderResult> for OrderAck {
    fn from(result: OrderResult) -> Self {
        let transact_time = result
            .transact_time
            .as_deref()
            .and_then(|ms| ms.parse::<i64>().ok())
            .and_then(DateTime::<Utc>::from_timestamp_millis);
        OrderAck {
            order_id: result.order_id,
            order_link_id: result.order_link_id,
            symbol: result.symbol,
            status: result.status,
            quantity: result.orig_qty,
            executed_quantity: result.executed_qty,
            price: result.price,
            transact_time,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_wallet_balance_response() {
        let body = r#"{
            "ret_code": 0,
            "ret_msg": "",
            "ext_code": null,
            "ext_info": null,
            "result": {
                "balances": [
                    {"coin": "USDT", "coinId": "USDT", "coinName": "USDT",
                     "total": "100.0", "free": "90.5", "locked": "9.5"}
                ]
            }
        }"#;
        let resp: ApiResponse<WalletBalanceResult> = serde_json::from_str(body).unwrap();
        let balances: SpotBalances = resp.into_result().unwrap().into();
        assert_eq!(balances.len(), 1);
        let usdt = balances.get("USDT").unwrap();
        assert_eq!(usdt.total, dec!(100.0));
        assert_eq!(usdt.free, dec!(90.5));
        assert_eq!(usdt.locked, dec!(9.5));
    }

    #[test]
    fn test_api_error_maps_code_and_message() {
        let body = r#"{"ret_code": 10003, "ret_msg": "Invalid api_key.", "result": null}"#;
        let resp: ApiResponse<WalletBalanceResult> = serde_json::from_str(body).unwrap();
        match resp.into_result() {
            Err(ExchangeError::Api { code, message }) => {
                assert_eq!(code, 10003);
                assert_eq!(message, "Invalid api_key.");
            }
            other => panic!("Expected API error, got {:?}", other),
        }
    }

    #[test]
    fn test_limit_order_params() {
        let symbol = SpotSymbol::parse("ETHUSDT").unwrap();
        let order = SpotOrder::limit(symbol, Side::Sell, dec!(0.50), dec!(1800.00));
        let pairs = SpotOrderParams::from_order(&order).to_pairs();

        let get = |k: &str| {
            pairs
                .iter()
                .find(|(name, _)| name == k)
                .map(|(_, v)| v.as_str())
        };
        assert_eq!(get("symbol"), Some("ETHUSDT"));
        assert_eq!(get("qty"), Some("0.5"));
        assert_eq!(get("side"), Some("Sell"));
        assert_eq!(get("type"), Some("LIMIT"));
        assert_eq!(get("price"), Some("1800"));
        assert_eq!(get("timeInForce"), Some("GTC"));
        assert_eq!(get("orderLinkId"), Some(order.id.to_string().as_str()));
    }

    #[test]
    fn test_order_result_to_ack() {
        let body = r#"{
            "ret_code": 0,
            "ret_msg": "",
            "result": {
                "accountId": "1",
                "symbol": "ETHUSDT",
                "symbolName": "ETHUSDT",
                "orderLinkId": "link-1",
                "orderId": "1153206287546",
                "transactTime": "1620811735466",
                "price": "0",
                "origQty": "1",
                "executedQty": "0",
                "status": "FILLED",
                "timeInForce": "GTC",
                "type": "MARKET",
                "side": "BUY"
            }
        }"#;
        let resp: ApiResponse<OrderResult> = serde_json::from_str(body).unwrap();
        let ack: OrderAck = resp.into_result().unwrap().into();
        assert_eq!(ack.order_id, "1153206287546");
        assert_eq!(ack.status, "FILLED");
        assert_eq!(ack.quantity, dec!(1));
        assert_eq!(
            ack.transact_time.map(|t| t.timestamp_millis()),
            Some(1620811735466)
        );
    }
}
