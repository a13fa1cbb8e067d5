//! Metering operations: usage tracking, billing-period cost, and tier
//! advancement.

use rust_decimal::Decimal;

use crate::client::{CreatedKey, KeyServiceClient};
use crate::interval::Interval;
use crate::pricing::{PricingTable, Quota, TierTransition};
use crate::{Error, Result};

/// Metering operations over a [`KeyServiceClient`] and a [`PricingTable`].
///
/// Obtained from [`KeyServiceClient::meter`]. The meter holds no state of
/// its own; the current tier and remaining quota live in the key service
/// and are read and written per call.
pub struct Meter<'a> {
    client: &'a KeyServiceClient,
    table: &'a PricingTable,
}

/// Result of tracking one key use.
#[derive(Debug, Clone, PartialEq)]
pub struct UsageStatus {
    pub remaining: Quota,
}

impl UsageStatus {
    /// True when the key has exhausted its current tier's quota and should
    /// be moved to the next tier.
    pub fn should_advance(&self) -> bool {
        self.remaining.is_exhausted()
    }
}

impl<'a> Meter<'a> {
    pub fn new(client: &'a KeyServiceClient, table: &'a PricingTable) -> Self {
        Self { client, table }
    }

    /// Issue a new key for `owner_id` at the table's first tier.
    pub async fn issue_key(&self, owner_id: &str) -> Result<CreatedKey> {
        self.client.create_key(owner_id, self.table).await
    }

    /// Verify a key secret, counting one usage unit, and report how much
    /// quota is left at the current tier.
    pub async fn track_usage(&self, secret: &str) -> Result<UsageStatus> {
        let verified = self.client.verify_key(secret).await?;
        Ok(UsageStatus {
            remaining: verified.remaining,
        })
    }

    /// Total cost of the key's successful verifications, priced through the
    /// progressive tier table.
    ///
    /// `since` bounds the verification window; `None` covers the service's
    /// full retention (the monthly key rotation keeps that to one billing
    /// period).
    pub async fn billing_period_cost(
        &self,
        key_id: &str,
        since: Option<Interval>,
    ) -> Result<Decimal> {
        let start_ms = since.map(|interval| interval.start_timestamp_ms(chrono::Utc::now()));
        let verifications = self.client.get_verifications(key_id, start_ms).await?;
        let usage: u64 = verifications.iter().map(|v| v.success).sum();
        let cost = self.table.cost_for_usage(usage);
        tracing::debug!(key_id, usage, cost = %cost, "priced billing period");
        Ok(cost)
    }

    /// Move a key that exhausted its quota to the next tier.
    ///
    /// Reads the current tier from key metadata, applies the transition
    /// policy, then performs two writes: the tier label first, then the
    /// quota reset. At the terminal tier nothing is written and the call is
    /// idempotent.
    ///
    /// If the tier write lands but the quota reset fails, the key is left
    /// inconsistent in the remote service and the error is
    /// [`Error::InconsistentKeyState`], carrying the tier that was applied
    /// so the caller can retry the reset or reconcile. Concurrent calls for
    /// the same key can race last-write-wins in the service; the SDK does
    /// not serialize them.
    pub async fn advance_tier(&self, key_id: &str) -> Result<TierTransition> {
        let details = self.client.get_key(key_id).await?;
        let transition = self.table.advance(details.tier);

        if transition.is_terminal() {
            tracing::debug!(key_id, tier = %details.tier, "already at terminal tier");
            return Ok(transition);
        }

        self.client.set_tier(key_id, transition.tier).await?;
        if let Err(source) = self.client.set_remaining(key_id, transition.quota).await {
            return Err(Error::InconsistentKeyState {
                key_id: key_id.to_string(),
                applied_tier: transition.tier,
                source: Box::new(source),
            });
        }

        tracing::info!(
            key_id,
            from = %details.tier,
            to = %transition.tier,
            quota = %transition.quota,
            price = %transition.price,
            "advanced key to next tier"
        );
        Ok(transition)
    }
}
