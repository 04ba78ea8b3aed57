use anyhow::Result;
use bybot_core::*;
use std::io::Write;
use tracing::{error, info, warn};

/// How results are written to stdout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Text,
    Json,
}

/// What happened to a command that did not fail on I/O.
#[derive(Debug)]
pub enum Outcome {
    Success,
    /// The exchange call failed; nothing was written to stdout.
    RequestFailed(ExchangeError),
    /// A pre-trade check refused the order; nothing was sent.
    Rejected(String),
}

impl Outcome {
    /// Process exit code. Request failures only count when `strict` is set.
    pub fn exit_code(&self, strict: bool) -> u8 {
        match self {
            Outcome::Success => 0,
            Outcome::RequestFailed(_) if strict => 1,
            Outcome::RequestFailed(_) => 0,
            Outcome::Rejected(_) => 1,
        }
    }
}

/// Fetch the spot wallet balance once and print it as a single line.
///
/// On a failed request nothing reaches `out`; the error is logged instead.
pub async fn print_balance<A, W>(account: &A, out: &mut W, format: OutputFormat) -> Result<Outcome>
where
    A: SpotAccount + ?Sized,
    W: Write,
{
    let balances = match account.spot_wallet_balance().await {
        Ok(balances) => balances,
        Err(e) => {
            error!(error = %e, "Spot wallet balance request failed");
            return Ok(Outcome::RequestFailed(e));
        }
    };

    match format {
        OutputFormat::Text => writeln!(out, "{}", balances)?,
        OutputFormat::Json => writeln!(out, "{}", serde_json::to_string(&balances)?)?,
    }
    out.flush()?;
    Ok(Outcome::Success)
}

/// Check `order` against the wallet, then place it and print the acknowledgement.
///
/// Orders that fail the balance-free checks are refused before any request.
pub async fn place_order<A, R, W>(
    account: &A,
    risk: &R,
    order: SpotOrder,
    out: &mut W,
    format: OutputFormat,
) -> Result<Outcome>
where
    A: SpotAccount + ?Sized,
    R: RiskManager + ?Sized,
    W: Write,
{
    info!(
        symbol = %order.symbol,
        side = ?order.side,
        order_type = ?order.order_type,
        quantity = %order.quantity,
        "Placing spot order"
    );

    if let RiskDecision::Rejected(reason) = risk.pre_check(&order) {
        warn!(reason = %reason, "Order not sent");
        return Ok(Outcome::Rejected(reason));
    }

    let balances = match account.spot_wallet_balance().await {
        Ok(balances) => balances,
        Err(e) => {
            error!(error = %e, "Could not fetch balances for pre-trade check");
            return Ok(Outcome::RequestFailed(e));
        }
    };

    if let RiskDecision::Rejected(reason) = risk.evaluate_order(&order, &balances) {
        warn!(reason = %reason, "Order not sent");
        return Ok(Outcome::Rejected(reason));
    }

    let ack = match account.place_spot_order(&order).await {
        Ok(ack) => ack,
        Err(e) => {
            error!(error = %e, "Spot order request failed");
            return Ok(Outcome::RequestFailed(e));
        }
    };

    match format {
        OutputFormat::Text => writeln!(out, "{}", ack)?,
        OutputFormat::Json => writeln!(out, "{}", serde_json::to_string(&ack)?)?,
    }
    out.flush()?;
    Ok(Outcome::Success)
}
