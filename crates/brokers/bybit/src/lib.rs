//! Bybit spot exchange adapter.
//!
//! Signed REST calls against the spot v1 API: wallet balance and order
//! placement. Defaults to the testnet deployment.

pub mod auth;
pub mod client;
pub mod protocol;

pub use client::{BybitClient, BybitConfig};
