pub mod profiles;
pub mod rules;

pub use profiles::OrderLimits;
pub use rules::BalanceGuard;
