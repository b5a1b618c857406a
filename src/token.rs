//! Authority-gated fungible token ledger, CEP-18-shaped.
//!
//! One instance is deployed per asset: the reference asset plus one per
//! commodity. Issuance is a capability held by the configured mint
//! authority; for commodity tokens that authority is the pool contract, so
//! new units can only ever be created through a swap.

use odra::casper_types::U256;
use odra::prelude::*;

use crate::error::SwapError;

/// Fungible token contract with balances, allowances and a single mint
/// authority fixed at deployment.
#[odra::module]
pub struct FungibleToken {
    name: Var<String>,
    symbol: Var<String>,
    decimals: Var<u8>,
    total_supply: Var<U256>,
    mint_authority: Var<Address>,
    balances: Mapping<Address, U256>,
    allowances: Mapping<(Address, Address), U256>,
}

#[odra::module]
impl FungibleToken {
    /// Initialize the token metadata and bind its mint authority
    pub fn init(&mut self, name: String, symbol: String, decimals: u8, mint_authority: Address) {
        self.name.set(name);
        self.symbol.set(symbol);
        self.decimals.set(decimals);
        self.total_supply.set(U256::zero());
        self.mint_authority.set(mint_authority);
    }

    /// Move `amount` from the caller to `recipient`
    pub fn transfer(&mut self, recipient: Address, amount: U256) {
        let owner = self.env().caller();
        self.raw_transfer(owner, recipient, amount);
    }

    /// Allow `spender` to move up to `amount` of the caller's balance
    pub fn approve(&mut self, spender: Address, amount: U256) {
        let owner = self.env().caller();
        self.allowances.set(&(owner, spender), amount);

        self.env().emit_event(Approval {
            owner,
            spender,
            amount,
        });
    }

    /// Remaining amount `spender` may move out of `owner`'s balance
    pub fn allowance(&self, owner: Address, spender: Address) -> U256 {
        self.allowances.get(&(owner, spender)).unwrap_or_default()
    }

    /// Move `amount` from `owner` to `recipient` on the strength of an
    /// earlier approval granted to the caller
    pub fn transfer_from(&mut self, owner: Address, recipient: Address, amount: U256) {
        let spender = self.env().caller();
        let approved = self.allowances.get(&(owner, spender)).unwrap_or_default();
        if approved < amount {
            self.env().revert(SwapError::InsufficientAllowance);
        }

        self.allowances.set(&(owner, spender), approved - amount);
        self.raw_transfer(owner, recipient, amount);
    }

    /// Create `amount` new units for `recipient`. Mint authority only.
    pub fn mint(&mut self, recipient: Address, amount: U256) {
        if self.mint_authority.get() != Some(self.env().caller()) {
            self.env().revert(SwapError::Unauthorized);
        }

        let supply = self.total_supply.get_or_default();
        let new_supply = match supply.checked_add(amount) {
            Some(v) => v,
            None => self.env().revert(SwapError::MathOverflow),
        };
        self.total_supply.set(new_supply);

        let balance = self.balances.get(&recipient).unwrap_or_default();
        self.balances.set(&recipient, balance + amount);

        self.env().emit_event(Mint { recipient, amount });
    }

    /// Balance held by `account`
    pub fn balance_of(&self, account: Address) -> U256 {
        self.balances.get(&account).unwrap_or_default()
    }

    /// Total units in circulation
    pub fn total_supply(&self) -> U256 {
        self.total_supply.get_or_default()
    }

    /// Declared number of fractional digits
    pub fn decimals(&self) -> u8 {
        self.decimals.get_or_default()
    }

    /// Token name
    pub fn name(&self) -> String {
        self.name.get_or_default()
    }

    /// Token symbol
    pub fn symbol(&self) -> String {
        self.symbol.get_or_default()
    }

    /// Account allowed to mint new units
    pub fn mint_authority(&self) -> Option<Address> {
        self.mint_authority.get()
    }
}

impl FungibleToken {
    fn raw_transfer(&mut self, owner: Address, recipient: Address, amount: U256) {
        let owner_balance = self.balances.get(&owner).unwrap_or_default();
        if owner_balance < amount {
            self.env().revert(SwapError::InsufficientFunds);
        }

        self.balances.set(&owner, owner_balance - amount);
        let recipient_balance = self.balances.get(&recipient).unwrap_or_default();
        self.balances.set(&recipient, recipient_balance + amount);

        self.env().emit_event(Transfer {
            from: owner,
            to: recipient,
            amount,
        });
    }
}

/// Units moved between two accounts
#[odra::event]
pub struct Transfer {
    /// Sending account
    pub from: Address,
    /// Receiving account
    pub to: Address,
    /// Amount moved
    pub amount: U256,
}

/// A spender was approved for an amount
#[odra::event]
pub struct Approval {
    /// Account granting the allowance
    pub owner: Address,
    /// Account allowed to spend
    pub spender: Address,
    /// Approved amount
    pub amount: U256,
}

/// New units were created
#[odra::event]
pub struct Mint {
    /// Receiving account
    pub recipient: Address,
    /// Amount created
    pub amount: U256,
}

#[cfg(test)]
mod test {
    use super::*;
    use odra::host::Deployer;

    fn setup() -> (odra::host::HostEnv, FungibleTokenHostRef) {
        let env = odra_test::env();
        let token = FungibleToken::deploy(
            &env,
            FungibleTokenInitArgs {
                name: String::from("USD Coin"),
                symbol: String::from("USDC"),
                decimals: 6,
                mint_authority: env.get_account(0),
            },
        );
        (env, token)
    }

    #[test]
    fn metadata_is_stored() {
        let (env, token) = setup();
        assert_eq!(token.name(), String::from("USD Coin"));
        assert_eq!(token.symbol(), String::from("USDC"));
        assert_eq!(token.decimals(), 6);
        assert_eq!(token.mint_authority(), Some(env.get_account(0)));
        assert_eq!(token.total_supply(), U256::zero());
    }

    #[test]
    fn mint_is_authority_only() {
        let (env, mut token) = setup();
        let user = env.get_account(1);

        env.set_caller(user);
        assert_eq!(
            token.try_mint(user, U256::from(1_000u64)),
            Err(SwapError::Unauthorized.into())
        );

        env.set_caller(env.get_account(0));
        token.mint(user, U256::from(1_000u64));
        assert_eq!(token.balance_of(user), U256::from(1_000u64));
        assert_eq!(token.total_supply(), U256::from(1_000u64));
        assert!(env.emitted_event(
            &token,
            &Mint {
                recipient: user,
                amount: U256::from(1_000u64)
            }
        ));
    }

    #[test]
    fn transfer_moves_balance() {
        let (env, mut token) = setup();
        let (alice, bob) = (env.get_account(1), env.get_account(2));
        token.mint(alice, U256::from(500u64));

        env.set_caller(alice);
        token.transfer(bob, U256::from(200u64));
        assert_eq!(token.balance_of(alice), U256::from(300u64));
        assert_eq!(token.balance_of(bob), U256::from(200u64));

        assert_eq!(
            token.try_transfer(bob, U256::from(301u64)),
            Err(SwapError::InsufficientFunds.into())
        );
    }

    #[test]
    fn transfer_from_consumes_allowance() {
        let (env, mut token) = setup();
        let (owner, spender, sink) = (env.get_account(1), env.get_account(2), env.get_account(3));
        token.mint(owner, U256::from(1_000u64));

        env.set_caller(spender);
        assert_eq!(
            token.try_transfer_from(owner, sink, U256::from(1u64)),
            Err(SwapError::InsufficientAllowance.into())
        );

        env.set_caller(owner);
        token.approve(spender, U256::from(600u64));
        assert_eq!(token.allowance(owner, spender), U256::from(600u64));

        env.set_caller(spender);
        token.transfer_from(owner, sink, U256::from(450u64));
        assert_eq!(token.balance_of(sink), U256::from(450u64));
        assert_eq!(token.allowance(owner, spender), U256::from(150u64));

        assert_eq!(
            token.try_transfer_from(owner, sink, U256::from(151u64)),
            Err(SwapError::InsufficientAllowance.into())
        );
    }

    #[test]
    fn allowance_outruns_balance() {
        let (env, mut token) = setup();
        let (owner, spender) = (env.get_account(1), env.get_account(2));
        token.mint(owner, U256::from(10u64));

        env.set_caller(owner);
        token.approve(spender, U256::from(1_000u64));

        env.set_caller(spender);
        assert_eq!(
            token.try_transfer_from(owner, spender, U256::from(11u64)),
            Err(SwapError::InsufficientFunds.into())
        );
        // the failed attempt must not burn allowance
        assert_eq!(token.allowance(owner, spender), U256::from(1_000u64));
    }
}
