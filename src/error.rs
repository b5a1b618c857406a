use odra::prelude::*;
use core::fmt;

/// Errors surfaced by the commodity pool, the price oracle and the token
/// ledger. Every error aborts the whole entry point; nothing is retried
/// inside the contracts.
#[odra::odra_error]
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SwapError {
    // 0
    AlreadyInitialized = 0,
    PoolNotInitialized = 1,
    InvalidVaultOwner = 2,
    InvalidMintAuthority = 3,
    Unauthorized = 4,

    // 5
    UnknownFeed = 5,
    FeedMismatch = 6,
    StalePrice = 7,
    InvalidPrice = 8,
    ZeroAmount = 9,

    // 10
    UnknownCommodity = 10,
    AmountTooSmall = 11,
    InsufficientFunds = 12,
    InsufficientAllowance = 13,
    MathOverflow = 14,
}

impl SwapError {
    /// Human-readable description of the error
    pub fn message(&self) -> &str {
        match self {
            SwapError::AlreadyInitialized => "Pool record is already initialized",
            SwapError::PoolNotInitialized => "Pool record has not been initialized",
            SwapError::InvalidVaultOwner => "Reference vault is not owned by the pool",
            SwapError::InvalidMintAuthority => "Commodity mint authority is not the pool",
            SwapError::Unauthorized => "Caller lacks the required signing identity",
            SwapError::UnknownFeed => "No price feed is registered under this id",
            SwapError::FeedMismatch => "Price feed does not track the requested commodity",
            SwapError::StalePrice => "Price snapshot is outside the staleness window",
            SwapError::InvalidPrice => "Price snapshot is not a usable positive price",
            SwapError::ZeroAmount => "Input amount must be greater than zero",
            SwapError::UnknownCommodity => "No mint is bound for the requested commodity",
            SwapError::AmountTooSmall => "Computed output amount rounds to zero",
            SwapError::InsufficientFunds => "Token balance is too low for the transfer",
            SwapError::InsufficientAllowance => "Token allowance is too low for the transfer",
            SwapError::MathOverflow => "Math operation overflow",
        }
    }
}

impl fmt::Display for SwapError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message())
    }
}
