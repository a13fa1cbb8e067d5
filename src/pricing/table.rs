//! The ordered tier table and the tier transition policy.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use super::tier::{Quota, TierId, TierLimit};
use crate::{Error, Result};

/// One pricing bracket in the progression.
#[derive(Debug, Clone, PartialEq)]
pub struct Tier {
    pub display_name: String,
    pub limit: TierLimit,
    /// Cost per verification within this tier, in USD.
    pub price: Decimal,
    pub next: Option<TierId>,
}

impl Tier {
    fn new(
        display_name: impl Into<String>,
        limit: TierLimit,
        price: Decimal,
        next: Option<TierId>,
    ) -> Self {
        Self {
            display_name: display_name.into(),
            limit,
            price,
            next,
        }
    }
}

/// The static ordered chain of pricing tiers.
///
/// Tiers live in an array indexed by [`TierId`], so "next tier" is an index
/// lookup rather than a reference chain. The default table is the built-in
/// trial/basic/pro/premium progression; custom limits and prices go through
/// [`PricingTableBuilder`].
#[derive(Debug, Clone, PartialEq)]
pub struct PricingTable {
    tiers: [Tier; TierId::ALL.len()],
}

impl Default for PricingTable {
    fn default() -> Self {
        PricingTableBuilder::new().build()
    }
}

impl PricingTable {
    pub fn builder() -> PricingTableBuilder {
        PricingTableBuilder::new()
    }

    /// The tier every new key starts at.
    pub const fn first(&self) -> TierId {
        TierId::Trial
    }

    pub fn get(&self, id: TierId) -> &Tier {
        &self.tiers[id.index()]
    }

    /// Successor of `id` in the chain, `None` at the terminal tier.
    pub fn next(&self, id: TierId) -> Option<TierId> {
        self.get(id).next
    }

    /// Resolve a tier label from external metadata.
    ///
    /// Fails with [`Error::UnknownTier`] for labels outside the table; a
    /// corrupted label should surface rather than silently re-bill at some
    /// default tier.
    pub fn lookup(&self, label: &str) -> Result<(TierId, &Tier)> {
        let id: TierId = label.parse()?;
        Ok((id, self.get(id)))
    }

    /// Check the chain invariants: finite, acyclic, exactly one terminal
    /// tier, and that terminal tier unbounded.
    ///
    /// The built-in table always passes; this guards tables assembled with
    /// custom limits.
    pub fn validate(&self) -> Result<()> {
        let mut seen = [false; TierId::ALL.len()];
        let mut current = Some(self.first());
        let mut terminal = None;

        while let Some(id) = current {
            if seen[id.index()] {
                return Err(Error::config(format!("tier chain cycles at {id}")));
            }
            seen[id.index()] = true;
            let tier = self.get(id);
            match tier.next {
                Some(next) if next <= id => {
                    return Err(Error::config(format!(
                        "tier chain goes backwards: {id} -> {next}"
                    )));
                }
                Some(_) => {}
                None => terminal = Some(id),
            }
            current = tier.next;
        }

        match terminal {
            Some(id) if self.get(id).limit.is_unbounded() => {}
            Some(id) => {
                return Err(Error::config(format!("terminal tier {id} has a finite limit")));
            }
            None => return Err(Error::config("tier chain has no terminal tier")),
        }

        if let Some(unreached) = TierId::ALL.iter().find(|id| !seen[id.index()]) {
            return Err(Error::config(format!("tier {unreached} is unreachable")));
        }
        Ok(())
    }

    /// Decide the tier, quota, and price in effect after the current tier's
    /// quota is exhausted.
    ///
    /// At the terminal tier no transition occurs: the same tier and price
    /// come back with an unlimited quota, on every call. Otherwise the
    /// caller should persist the returned tier and reset remaining quota to
    /// the returned value. The policy itself mutates nothing.
    pub fn advance(&self, current: TierId) -> TierTransition {
        match self.get(current).next {
            None => TierTransition {
                tier: current,
                quota: Quota::Unlimited,
                price: self.get(current).price,
                advanced: false,
            },
            Some(next_id) => {
                let next = self.get(next_id);
                TierTransition {
                    tier: next_id,
                    quota: next.limit.as_quota(),
                    price: next.price,
                    advanced: true,
                }
            }
        }
    }
}

/// Result of the tier transition policy.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TierTransition {
    /// Tier in effect after the transition.
    pub tier: TierId,
    /// Quota the key should be reset to.
    pub quota: Quota,
    /// Per-verification price in effect.
    pub price: Decimal,
    /// False when the current tier was already terminal.
    pub advanced: bool,
}

impl TierTransition {
    pub const fn is_terminal(&self) -> bool {
        !self.advanced
    }
}

/// Builder for pricing tables with custom limits and prices.
///
/// Starts from the built-in defaults; the chain order itself is fixed by
/// [`TierId`], only each tier's capacity, price, and display name vary.
#[derive(Debug, Clone)]
pub struct PricingTableBuilder {
    tiers: [Tier; TierId::ALL.len()],
}

impl Default for PricingTableBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl PricingTableBuilder {
    pub fn new() -> Self {
        Self {
            tiers: [
                Tier::new("Trial", TierLimit::Bounded(10), dec!(0.00), Some(TierId::Basic)),
                Tier::new("Basic", TierLimit::Bounded(100), dec!(0.10), Some(TierId::Pro)),
                Tier::new("Pro", TierLimit::Bounded(1000), dec!(0.08), Some(TierId::Premium)),
                Tier::new("Premium", TierLimit::Unbounded, dec!(0.05), None),
            ],
        }
    }

    pub fn limit(mut self, id: TierId, limit: TierLimit) -> Self {
        self.tiers[id.index()].limit = limit;
        self
    }

    pub fn price(mut self, id: TierId, price: Decimal) -> Self {
        self.tiers[id.index()].price = price;
        self
    }

    pub fn display_name(mut self, id: TierId, name: impl Into<String>) -> Self {
        self.tiers[id.index()].display_name = name.into();
        self
    }

    pub fn build(self) -> PricingTable {
        PricingTable { tiers: self.tiers }
    }
}
