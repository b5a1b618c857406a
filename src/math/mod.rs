//! Fixed-point arithmetic for price and amount calculations.
//!
//! All swap math runs on `Decimal`, a U256-backed wad (10^18) value, so
//! exponent scaling and mint-decimal reconciliation never touch floating
//! point.

pub mod common;
pub mod decimal;

pub use common::{TryAdd, TryDiv, TryMul, TrySub};
pub use decimal::Decimal;
