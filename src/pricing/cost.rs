//! Progressive usage-cost calculation.

use rust_decimal::{Decimal, RoundingStrategy};

use super::table::PricingTable;

impl PricingTable {
    /// Price a cumulative usage count progressively across the tier chain.
    ///
    /// The first `limit` verifications bill at the trial price, the next
    /// `limit` at the basic price, and so on; whatever spills past the last
    /// bounded tier bills at the terminal tier's price. The result is
    /// rounded to 2 decimal places, half away from zero.
    pub fn cost_for_usage(&self, usage: u64) -> Decimal {
        let mut total = Decimal::ZERO;
        let mut remaining = usage;
        let mut current = Some(self.first());

        while remaining > 0 {
            let Some(id) = current else { break };
            let tier = self.get(id);
            let used = tier.limit.cap(remaining);
            total += Decimal::from(used) * tier.price;
            remaining -= used;
            current = tier.next;
        }

        total.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
    }
}
