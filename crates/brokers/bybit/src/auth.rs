use bybot_core::{Credentials, ExchangeError};
use hmac::{Hmac, Mac};
use sha2::Sha256;
use std::collections::BTreeMap;

type HmacSha256 = Hmac<Sha256>;

/// Hex-encoded HMAC-SHA256 of `payload` keyed by `secret`.
pub fn sign(secret: &str, payload: &str) -> Result<String, ExchangeError> {
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
        .map_err(|e| ExchangeError::Signing(e.to_string()))?;
    mac.update(payload.as_bytes());
    Ok(hex::encode(mac.finalize().into_bytes()))
}

/// Join parameters as `k=v&k=v` in key order.
pub fn canonical_query(params: &BTreeMap<String, String>) -> String {
    params
        .iter()
        .map(|(k, v)| format!("{}={}", k, v))
        .collect::<Vec<_>>()
        .join("&")
}

/// Add `api_key`, `timestamp`, optional `recv_window` and the resulting `sign`
/// to a private request's parameters.
///
/// The signature covers every other parameter sorted by name, so the
/// returned list is in the same order the exchange verifies.
pub fn signed_params(
    credentials: &Credentials,
    params: Vec<(String, String)>,
    timestamp_ms: i64,
    recv_window_ms: Option<u64>,
) -> Result<Vec<(String, String)>, ExchangeError> {
    let mut sorted: BTreeMap<String, String> = params.into_iter().collect();
    sorted.insert("api_key".to_string(), credentials.api_key.clone());
    sorted.insert("timestamp".to_string(), timestamp_ms.to_string());
    if let Some(window) = recv_window_ms {
        sorted.insert("recv_window".to_string(), window.to_string());
    }

    let signature = sign(credentials.api_secret(), &canonical_query(&sorted))?;

    let mut signed: Vec<(String, String)> = sorted.into_iter().collect();
    signed.push(("sign".to_string(), signature));
    Ok(signed)
}
