//! Push-based price oracle and the snapshot resolution rules.
//!
//! Feeds are registered by the oracle admin under a string id (for example
//! `"XAU/USD"`) and bound to one commodity. Approved publishers push signed
//! observations; consumers read the stored snapshot and validate it with
//! [`PriceSnapshot::resolve`] at the moment they spend it, so a bad or aged
//! observation is rejected by the swap that would have consumed it.

use odra::prelude::*;

use crate::error::SwapError;
use crate::math::{Decimal, TryDiv, TryMul};
use crate::state::CommodityKind;

/// Snapshots older than this many milliseconds are rejected
pub const MAX_PRICE_AGE_MS: u64 = 60_000;

/// Maximum confidence interval relative to the mantissa, in basis points
pub const MAX_CONFIDENCE_RATIO_BPS: u64 = 1_000;

/// Market status attached to a published observation
#[odra::odra_type]
pub enum PriceStatus {
    /// The market was not priceable when the observation was made
    Unknown,
    /// The market was live and the price is usable
    Trading,
    /// Trading was halted at the source
    Halted,
}

/// One timestamped price observation for a single feed
#[odra::odra_type]
pub struct PriceSnapshot {
    /// Commodity this feed is registered against
    pub commodity: CommodityKind,
    /// Price mantissa; the price is `price * 10^exponent`
    pub price: i64,
    /// Confidence interval around the price, in mantissa units
    pub confidence: u64,
    /// Decimal exponent of the mantissa
    pub exponent: i32,
    /// Publisher-reported observation time, in millisecond block time
    pub publish_time: u64,
    /// Market status at observation time
    pub status: PriceStatus,
}

impl PriceSnapshot {
    /// Validate this snapshot against the requested commodity and the
    /// current block time, and normalize it into a wad price.
    ///
    /// The returned value is the reference-asset cost of one whole commodity
    /// unit. Scaling honors the exponent's sign in pure integer arithmetic.
    pub fn resolve(&self, commodity: &CommodityKind, now: u64) -> Result<Decimal, SwapError> {
        if self.commodity != *commodity {
            return Err(SwapError::FeedMismatch);
        }

        // A publish time in the future is as unusable as an aged one.
        let elapsed = now
            .checked_sub(self.publish_time)
            .ok_or(SwapError::StalePrice)?;
        if elapsed > MAX_PRICE_AGE_MS {
            return Err(SwapError::StalePrice);
        }

        if self.status != PriceStatus::Trading {
            return Err(SwapError::InvalidPrice);
        }
        if self.price <= 0 {
            return Err(SwapError::InvalidPrice);
        }
        let mantissa = self.price as u64;
        if (self.confidence as u128) * 10_000
            > (mantissa as u128) * (MAX_CONFIDENCE_RATIO_BPS as u128)
        {
            return Err(SwapError::InvalidPrice);
        }

        if self.exponent >= 0 {
            let factor = 10u64
                .checked_pow(self.exponent as u32)
                .ok_or(SwapError::MathOverflow)?;
            Decimal::from(mantissa).try_mul(factor)
        } else {
            let factor = 10u64
                .checked_pow(self.exponent.unsigned_abs())
                .ok_or(SwapError::MathOverflow)?;
            Decimal::from(mantissa).try_div(factor)
        }
    }
}

/// Price oracle contract: feed registry, publisher set and latest snapshots
#[odra::module]
pub struct PriceOracle {
    admin: Var<Address>,
    publishers: Mapping<Address, bool>,
    feeds: Mapping<String, CommodityKind>,
    snapshots: Mapping<String, PriceSnapshot>,
}

#[odra::module]
impl PriceOracle {
    /// Initialize the oracle with its admin
    pub fn init(&mut self, admin: Address) {
        self.admin.set(admin);
    }

    /// Bind a feed id to a commodity. Admin only.
    pub fn register_feed(&mut self, feed_id: String, commodity: CommodityKind) {
        self.require_admin();

        self.feeds.set(&feed_id, commodity.clone());

        self.env().emit_event(FeedRegistered {
            feed_id,
            commodity,
            registered_by: self.env().caller(),
        });
    }

    /// Approve a price publisher. Admin only.
    pub fn add_publisher(&mut self, publisher: Address) {
        self.require_admin();

        self.publishers.set(&publisher, true);

        self.env().emit_event(PublisherAdded {
            publisher,
            added_by: self.env().caller(),
        });
    }

    /// Revoke a price publisher. Admin only.
    pub fn remove_publisher(&mut self, publisher: Address) {
        self.require_admin();

        self.publishers.set(&publisher, false);

        self.env().emit_event(PublisherRemoved {
            publisher,
            removed_by: self.env().caller(),
        });
    }

    /// Store a new observation for a registered feed.
    ///
    /// Only the admin or an approved publisher may push. The observation is
    /// stored verbatim; consumers validate it at resolve time.
    pub fn publish(
        &mut self,
        feed_id: String,
        price: i64,
        confidence: u64,
        exponent: i32,
        publish_time: u64,
        status: PriceStatus,
    ) {
        let caller = self.env().caller();
        let is_admin = self.admin.get() == Some(caller);
        if !is_admin && !self.publishers.get(&caller).unwrap_or(false) {
            self.env().revert(SwapError::Unauthorized);
        }

        let commodity = match self.feeds.get(&feed_id) {
            Some(kind) => kind,
            None => self.env().revert(SwapError::UnknownFeed),
        };

        self.snapshots.set(
            &feed_id,
            PriceSnapshot {
                commodity: commodity.clone(),
                price,
                confidence,
                exponent,
                publish_time,
                status,
            },
        );

        self.env().emit_event(PricePublished {
            feed_id,
            commodity,
            price,
            confidence,
            exponent,
            publish_time,
            publisher: caller,
        });
    }

    /// Hand the oracle to a new admin. Admin only.
    pub fn transfer_admin(&mut self, new_admin: Address) {
        self.require_admin();
        let previous_admin = self.env().caller();

        self.admin.set(new_admin);

        self.env().emit_event(AdminTransferred {
            previous_admin,
            new_admin,
        });
    }

    /// Latest stored observation for a feed, if any
    pub fn snapshot(&self, feed_id: String) -> Option<PriceSnapshot> {
        self.snapshots.get(&feed_id)
    }

    /// Commodity a feed id is registered against, if any
    pub fn feed_commodity(&self, feed_id: String) -> Option<CommodityKind> {
        self.feeds.get(&feed_id)
    }

    /// Whether an address may publish prices
    pub fn is_approved_publisher(&self, address: Address) -> bool {
        self.publishers.get(&address).unwrap_or(false)
    }

    /// Current oracle admin
    pub fn get_admin(&self) -> Option<Address> {
        self.admin.get()
    }
}

impl PriceOracle {
    fn require_admin(&self) {
        if self.admin.get() != Some(self.env().caller()) {
            self.env().revert(SwapError::Unauthorized);
        }
    }
}

/// A feed id was bound to a commodity
#[odra::event]
pub struct FeedRegistered {
    /// Feed id
    pub feed_id: String,
    /// Commodity the feed tracks
    pub commodity: CommodityKind,
    /// Admin who registered it
    pub registered_by: Address,
}

/// A new observation was stored for a feed
#[odra::event]
pub struct PricePublished {
    /// Feed id
    pub feed_id: String,
    /// Commodity the feed tracks
    pub commodity: CommodityKind,
    /// Price mantissa
    pub price: i64,
    /// Confidence interval
    pub confidence: u64,
    /// Decimal exponent
    pub exponent: i32,
    /// Observation time
    pub publish_time: u64,
    /// Account that pushed the observation
    pub publisher: Address,
}

/// A publisher was approved
#[odra::event]
pub struct PublisherAdded {
    /// Approved publisher
    pub publisher: Address,
    /// Admin who approved it
    pub added_by: Address,
}

/// A publisher was revoked
#[odra::event]
pub struct PublisherRemoved {
    /// Revoked publisher
    pub publisher: Address,
    /// Admin who revoked it
    pub removed_by: Address,
}

/// Oracle admin changed hands
#[odra::event]
pub struct AdminTransferred {
    /// Outgoing admin
    pub previous_admin: Address,
    /// Incoming admin
    pub new_admin: Address,
}


#[cfg(test)]
mod host_test {
    use super::*;
    use odra::host::Deployer;

    fn setup() -> (odra::host::HostEnv, PriceOracleHostRef) {
        let env = odra_test::env();
        let admin = env.get_account(0);
        let oracle = PriceOracle::deploy(&env, PriceOracleInitArgs { admin });
        (env, oracle)
    }

    #[test]
    fn register_feed_is_admin_only() {
        let (env, mut oracle) = setup();
        env.set_caller(env.get_account(1));
        assert_eq!(
            oracle.try_register_feed(String::from("XAU/USD"), CommodityKind::Gold),
            Err(SwapError::Unauthorized.into())
        );
    }

    #[test]
    fn publish_requires_registration_and_approval() {
        let (env, mut oracle) = setup();
        let publisher = env.get_account(1);

        oracle.register_feed(String::from("XAU/USD"), CommodityKind::Gold);

        env.set_caller(publisher);
        assert_eq!(
            oracle.try_publish(
                String::from("XAU/USD"),
                1850_00000000,
                0,
                -8,
                0,
                PriceStatus::Trading
            ),
            Err(SwapError::Unauthorized.into())
        );

        env.set_caller(env.get_account(0));
        oracle.add_publisher(publisher);
        assert!(oracle.is_approved_publisher(publisher));

        env.set_caller(publisher);
        assert_eq!(
            oracle.try_publish(
                String::from("WTI/USD"),
                75_00000000,
                0,
                -8,
                0,
                PriceStatus::Trading
            ),
            Err(SwapError::UnknownFeed.into())
        );

        oracle.publish(
            String::from("XAU/USD"),
            1850_00000000,
            92_500_000,
            -8,
            0,
            PriceStatus::Trading,
        );

        let snapshot = oracle.snapshot(String::from("XAU/USD")).unwrap();
        assert_eq!(snapshot.price, 1850_00000000);
        assert_eq!(snapshot.commodity, CommodityKind::Gold);
        assert!(env.emitted_event(
            &oracle,
            &PricePublished {
                feed_id: String::from("XAU/USD"),
                commodity: CommodityKind::Gold,
                price: 1850_00000000,
                confidence: 92_500_000,
                exponent: -8,
                publish_time: 0,
                publisher,
            }
        ));
    }

    #[test]
    fn revoked_publisher_cannot_publish() {
        let (env, mut oracle) = setup();
        let publisher = env.get_account(1);
        oracle.register_feed(String::from("XAG/USD"), CommodityKind::Silver);
        oracle.add_publisher(publisher);
        oracle.remove_publisher(publisher);

        env.set_caller(publisher);
        assert_eq!(
            oracle.try_publish(
                String::from("XAG/USD"),
                24_00000000,
                0,
                -8,
                0,
                PriceStatus::Trading
            ),
            Err(SwapError::Unauthorized.into())
        );
    }

    #[test]
    fn admin_transfer_hands_over_control() {
        let (env, mut oracle) = setup();
        let new_admin = env.get_account(2);
        oracle.transfer_admin(new_admin);
        assert_eq!(oracle.get_admin(), Some(new_admin));

        // the old admin is locked out
        assert_eq!(
            oracle.try_register_feed(String::from("NG/USD"), CommodityKind::NaturalGas),
            Err(SwapError::Unauthorized.into())
        );

        env.set_caller(new_admin);
        oracle.register_feed(String::from("NG/USD"), CommodityKind::NaturalGas);
        assert_eq!(
            oracle.feed_commodity(String::from("NG/USD")),
            Some(CommodityKind::NaturalGas)
        );
    }
}
