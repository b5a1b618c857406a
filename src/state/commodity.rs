//! The commodity taxonomy served by the pool.

/// The commodities the pool issues tracking tokens for. Each kind maps to
/// exactly one mint in the pool record and one oracle feed registration.
#[odra::odra_type]
pub enum CommodityKind {
    /// WTI crude oil, priced per barrel
    Oil,
    /// Gold, priced per troy ounce
    Gold,
    /// Silver, priced per troy ounce
    Silver,
    /// Natural gas, priced per MMBtu
    NaturalGas,
}

impl CommodityKind {
    /// All kinds, in a fixed order
    pub fn all() -> [CommodityKind; 4] {
        [
            CommodityKind::Oil,
            CommodityKind::Gold,
            CommodityKind::Silver,
            CommodityKind::NaturalGas,
        ]
    }

    /// Short label used in logs and CLI output
    pub fn as_str(&self) -> &'static str {
        match self {
            CommodityKind::Oil => "oil",
            CommodityKind::Gold => "gold",
            CommodityKind::Silver => "silver",
            CommodityKind::NaturalGas => "natural_gas",
        }
    }
}
