//! The custodial commodity pool: one-time initialization and the swap path.
//!
//! The pool record lives in this contract's own storage, so the contract
//! address is the deterministic address of the record. A swap reads the
//! record, resolves an oracle snapshot, converts the deposited reference
//! amount into commodity units in wad arithmetic, then moves custody and
//! issues tokens in the same transaction. Any failure reverts the whole
//! operation; the fixed fields of the record are never touched after
//! initialization.

use odra::casper_types::U256;
use odra::prelude::*;
use odra::ContractRef;

use crate::error::SwapError;
use crate::math::{Decimal, TryDiv, TryMul};
use crate::oracle::PriceOracleContractRef;
use crate::state::{CommodityKind, PROGRAM_VERSION, UNINITIALIZED_VERSION};
use crate::token::FungibleTokenContractRef;

/// Commodity pool contract: reference-asset custody plus authority-gated
/// issuance of the four commodity tokens.
#[odra::module]
pub struct CommodityPool {
    version: Var<u8>,
    authority: Var<Address>,
    oracle: Var<Address>,
    reference_mint: Var<Address>,
    reference_vault: Var<Address>,
    commodity_mints: Mapping<CommodityKind, Address>,
}

#[odra::module]
impl CommodityPool {
    /// Bind the pool record to its oracle, reference asset, vault and the
    /// four commodity mints. Effective exactly once.
    ///
    /// The vault must be this contract's own address and must be empty, and
    /// every commodity token must already name the pool as its mint
    /// authority; those bindings are established before initialization and
    /// never change afterwards.
    #[allow(clippy::too_many_arguments)]
    pub fn initialize(
        &mut self,
        oracle: Address,
        reference_mint: Address,
        reference_vault: Address,
        oil_mint: Address,
        gold_mint: Address,
        silver_mint: Address,
        natural_gas_mint: Address,
    ) {
        if self.version.get_or_default() != UNINITIALIZED_VERSION {
            self.env().revert(SwapError::AlreadyInitialized);
        }

        let self_address = self.env().self_address();
        if reference_vault != self_address {
            self.env().revert(SwapError::InvalidVaultOwner);
        }
        let vault_balance =
            FungibleTokenContractRef::new(self.env(), reference_mint).balance_of(reference_vault);
        if !vault_balance.is_zero() {
            self.env().revert(SwapError::InvalidVaultOwner);
        }

        let mints = [
            (CommodityKind::Oil, oil_mint),
            (CommodityKind::Gold, gold_mint),
            (CommodityKind::Silver, silver_mint),
            (CommodityKind::NaturalGas, natural_gas_mint),
        ];
        for (kind, mint) in mints {
            let authority = FungibleTokenContractRef::new(self.env(), mint).mint_authority();
            if authority != Some(self_address) {
                self.env().revert(SwapError::InvalidMintAuthority);
            }
            self.commodity_mints.set(&kind, mint);
        }

        let authority = self.env().caller();
        self.authority.set(authority);
        self.oracle.set(oracle);
        self.reference_mint.set(reference_mint);
        self.reference_vault.set(reference_vault);
        self.version.set(PROGRAM_VERSION);

        self.env().emit_event(PoolInitialized {
            authority,
            oracle,
            reference_mint,
            reference_vault,
        });
    }

    /// Swap `amount_in` of the reference asset for the commodity tracked by
    /// `feed_id`, at the oracle's latest usable price. Returns the issued
    /// commodity amount.
    pub fn swap(&mut self, commodity: CommodityKind, amount_in: U256, feed_id: String) -> U256 {
        self.require_initialized();

        if amount_in.is_zero() {
            self.env().revert(SwapError::ZeroAmount);
        }
        let commodity_mint = match self.commodity_mints.get(&commodity) {
            Some(mint) => mint,
            None => self.env().revert(SwapError::UnknownCommodity),
        };

        let oracle = self.load_address(&self.oracle);
        let snapshot = match PriceOracleContractRef::new(self.env(), oracle).snapshot(feed_id.clone())
        {
            Some(snapshot) => snapshot,
            None => self.env().revert(SwapError::UnknownFeed),
        };
        let now = self.env().get_block_time();
        let price = match snapshot.resolve(&commodity, now) {
            Ok(price) => price,
            Err(error) => self.env().revert(error),
        };

        let reference_mint = self.load_address(&self.reference_mint);
        let reference_decimals =
            FungibleTokenContractRef::new(self.env(), reference_mint).decimals();
        let commodity_decimals =
            FungibleTokenContractRef::new(self.env(), commodity_mint).decimals();

        let amount_out =
            match convert_reference_amount(amount_in, price, reference_decimals, commodity_decimals)
            {
                Ok(amount) => amount,
                Err(error) => self.env().revert(error),
            };
        if amount_out.is_zero() {
            self.env().revert(SwapError::AmountTooSmall);
        }

        let account = self.env().caller();
        self.deposit_reference(account, amount_in);
        self.issue_commodity(commodity_mint, account, amount_out);

        self.env().emit_event(SwapExecuted {
            account,
            commodity,
            feed_id,
            amount_in,
            amount_out,
        });

        amount_out
    }

    /// Whether the pool record has been initialized
    pub fn is_initialized(&self) -> bool {
        self.version.get_or_default() == PROGRAM_VERSION
    }

    /// Pool authority set at initialization
    pub fn get_authority(&self) -> Option<Address> {
        self.authority.get()
    }

    /// Oracle contract consulted by swaps
    pub fn get_oracle(&self) -> Option<Address> {
        self.oracle.get()
    }

    /// Reference asset token contract
    pub fn get_reference_mint(&self) -> Option<Address> {
        self.reference_mint.get()
    }

    /// Custody address holding deposited reference funds
    pub fn get_reference_vault(&self) -> Option<Address> {
        self.reference_vault.get()
    }

    /// Token contract bound to a commodity kind
    pub fn get_commodity_mint(&self, commodity: CommodityKind) -> Option<Address> {
        self.commodity_mints.get(&commodity)
    }
}

// Custody mutators. These are the only paths that move reference funds or
// issue commodity tokens, and they are not entry points: issuance always
// rides on the pool being the token's mint authority.
impl CommodityPool {
    fn deposit_reference(&mut self, from: Address, amount: U256) {
        let reference_mint = self.load_address(&self.reference_mint);
        let vault = self.load_address(&self.reference_vault);
        FungibleTokenContractRef::new(self.env(), reference_mint).transfer_from(from, vault, amount);
    }

    fn issue_commodity(&mut self, mint: Address, recipient: Address, amount: U256) {
        FungibleTokenContractRef::new(self.env(), mint).mint(recipient, amount);
    }

    fn require_initialized(&self) {
        if self.version.get_or_default() != PROGRAM_VERSION {
            self.env().revert(SwapError::PoolNotInitialized);
        }
    }

    fn load_address(&self, field: &Var<Address>) -> Address {
        match field.get() {
            Some(address) => address,
            None => self.env().revert(SwapError::PoolNotInitialized),
        }
    }
}

/// Convert a reference-asset amount into commodity token units at `price`,
/// reconciling the two mints' declared decimal counts and flooring the
/// result. Wad fixed point throughout.
pub fn convert_reference_amount(
    amount_in: U256,
    price: Decimal,
    reference_decimals: u8,
    commodity_decimals: u8,
) -> Result<U256, SwapError> {
    if amount_in > U256::from(u64::MAX) {
        return Err(SwapError::MathOverflow);
    }

    let value = Decimal::from_scaled_amount(amount_in.as_u64(), reference_decimals)?;
    let units = value.try_div(price)?;
    let scale_out = 10u64
        .checked_pow(commodity_decimals as u32)
        .ok_or(SwapError::MathOverflow)?;
    let amount_out = units.try_mul(scale_out)?.try_floor_u64()?;

    Ok(U256::from(amount_out))
}

/// The pool record was created
#[odra::event]
pub struct PoolInitialized {
    /// Account that initialized the pool
    pub authority: Address,
    /// Oracle contract bound to the pool
    pub oracle: Address,
    /// Reference asset token contract
    pub reference_mint: Address,
    /// Custody address for deposited reference funds
    pub reference_vault: Address,
}

/// A swap settled
#[odra::event]
pub struct SwapExecuted {
    /// Account that swapped
    pub account: Address,
    /// Commodity issued
    pub commodity: CommodityKind,
    /// Oracle feed the price came from
    pub feed_id: String,
    /// Reference amount moved into the vault
    pub amount_in: U256,
    /// Commodity amount issued
    pub amount_out: U256,
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn converts_gold_scenario() {
        // $1850/oz, 6-decimal mints: 100 reference units buy 0.054054 oz
        let out = convert_reference_amount(
            U256::from(100_000_000u64),
            Decimal::from(1850u64),
            6,
            6,
        )
        .unwrap();
        assert_eq!(out, U256::from(54_054u64));
    }

    #[test]
    fn converts_oil_scenario_exactly() {
        let out = convert_reference_amount(
            U256::from(75_000_000u64),
            Decimal::from(75u64),
            6,
            6,
        )
        .unwrap();
        assert_eq!(out, U256::from(1_000_000u64));
    }

    #[test]
    fn reconciles_differing_decimals() {
        // 9-decimal commodity mint: same value, three more output digits
        let out = convert_reference_amount(
            U256::from(185_000_000u64),
            Decimal::from(1850u64),
            6,
            9,
        )
        .unwrap();
        assert_eq!(out, U256::from(100_000_000u64));
    }

    #[test]
    fn dust_floors_to_zero() {
        let out = convert_reference_amount(U256::from(1u64), Decimal::from(1850u64), 6, 6).unwrap();
        assert_eq!(out, U256::zero());
    }

    #[test]
    fn oversized_input_is_rejected() {
        let res = convert_reference_amount(
            U256::from(u64::MAX) + U256::one(),
            Decimal::from(75u64),
            6,
            6,
        );
        assert_eq!(res, Err(SwapError::MathOverflow));
    }
}
