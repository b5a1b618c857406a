#![allow(clippy::arithmetic_side_effects)]
#![cfg_attr(not(test), no_std)]

//! Custodial commodity swap pool for the Casper blockchain.
//!
//! A user converts a stable reference asset into one of four
//! commodity-tracking tokens at a price taken from an oracle feed. The pool
//! holds the deposited reference funds in its own vault and is the sole
//! mint authority of the commodity tokens, so issuance only ever happens
//! inside a swap.

pub mod error;
pub mod math;
pub mod oracle;
pub mod pool;
pub mod state;
pub mod token;

pub use error::SwapError;
pub use oracle::PriceOracle;
pub use pool::CommodityPool;
pub use token::FungibleToken;

extern crate alloc;
