//! Progressive pricing tiers for pay-as-you-go billing.
//!
//! The pricing core is pure and synchronous: a static ordered tier table,
//! a usage-cost calculator that bills usage progressively across tiers, and
//! a transition policy that decides the quota and price to apply when a key
//! exhausts its current tier. Nothing here persists state; the caller owns
//! all writes to the external key service.

mod cost;
mod table;
mod tier;

pub use table::{PricingTable, PricingTableBuilder, Tier, TierTransition};
pub use tier::{Quota, TierId, TierLimit};
