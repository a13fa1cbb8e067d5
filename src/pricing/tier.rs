//! Tier identifiers, usage limits, and the remaining-quota boundary type.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::Error;

/// Identifier of a pricing tier, ordered in chain-traversal order.
///
/// The four built-in tiers form a single progression: trial → basic → pro →
/// premium. The derived `Ord` matches that progression.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
#[serde(rename_all = "snake_case")]
pub enum TierId {
    #[default]
    Trial,
    Basic,
    Pro,
    Premium,
}

impl TierId {
    /// All tiers in chain order.
    pub const ALL: [TierId; 4] = [TierId::Trial, TierId::Basic, TierId::Pro, TierId::Premium];

    /// Position in the tier chain, usable as a table index.
    pub const fn index(self) -> usize {
        self as usize
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            TierId::Trial => "trial",
            TierId::Basic => "basic",
            TierId::Pro => "pro",
            TierId::Premium => "premium",
        }
    }
}

impl fmt::Display for TierId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TierId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "trial" => Ok(TierId::Trial),
            "basic" => Ok(TierId::Basic),
            "pro" => Ok(TierId::Pro),
            "premium" => Ok(TierId::Premium),
            other => Err(Error::unknown_tier(other)),
        }
    }
}

/// Maximum usage billed at a tier's price before overflow to the next tier.
///
/// The terminal tier is `Unbounded`; every other tier carries a finite
/// capacity. Modeled as a tagged variant rather than a numeric sentinel so
/// arithmetic and serialization never have to special-case an "infinity"
/// value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TierLimit {
    Bounded(u64),
    Unbounded,
}

impl TierLimit {
    pub const fn is_unbounded(self) -> bool {
        matches!(self, TierLimit::Unbounded)
    }

    /// Portion of `remaining` usage that fits within this tier.
    pub const fn cap(self, remaining: u64) -> u64 {
        match self {
            TierLimit::Bounded(limit) => {
                if remaining < limit {
                    remaining
                } else {
                    limit
                }
            }
            TierLimit::Unbounded => remaining,
        }
    }

    /// The quota a key starts with when entering this tier.
    pub const fn as_quota(self) -> Quota {
        match self {
            TierLimit::Bounded(limit) => Quota::Limited(limit),
            TierLimit::Unbounded => Quota::Unlimited,
        }
    }
}

/// Remaining verifications before a key must transition tiers.
///
/// This is the boundary type for the key service's `remaining` field, where
/// a `null`/absent value means unlimited. The convention is translated
/// exactly once, in this type's serde impls; everything above the wire works
/// with the explicit variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "Option<u64>", into = "Option<u64>")]
pub enum Quota {
    Limited(u64),
    #[default]
    Unlimited,
}

impl Quota {
    pub const fn is_unlimited(self) -> bool {
        matches!(self, Quota::Unlimited)
    }

    /// True once no verifications remain at the current tier.
    pub const fn is_exhausted(self) -> bool {
        matches!(self, Quota::Limited(0))
    }
}

impl From<Option<u64>> for Quota {
    fn from(value: Option<u64>) -> Self {
        match value {
            Some(n) => Quota::Limited(n),
            None => Quota::Unlimited,
        }
    }
}

impl From<Quota> for Option<u64> {
    fn from(quota: Quota) -> Self {
        match quota {
            Quota::Limited(n) => Some(n),
            Quota::Unlimited => None,
        }
    }
}

impl fmt::Display for Quota {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Quota::Limited(n) => write!(f, "{n}"),
            Quota::Unlimited => f.write_str("unlimited"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tier_id_chain_order() {
        assert!(TierId::Trial < TierId::Basic);
        assert!(TierId::Basic < TierId::Pro);
        assert!(TierId::Pro < TierId::Premium);
        assert_eq!(TierId::ALL[TierId::Pro.index()], TierId::Pro);
    }

    #[test]
    fn test_tier_id_round_trip() {
        for tier in TierId::ALL {
            assert_eq!(tier.as_str().parse::<TierId>().unwrap(), tier);
            let json = serde_json::to_string(&tier).unwrap();
            assert_eq!(json, format!("\"{tier}\""));
            assert_eq!(serde_json::from_str::<TierId>(&json).unwrap(), tier);
        }
    }

    #[test]
    fn test_tier_id_unknown() {
        let err = "gold".parse::<TierId>().unwrap_err();
        assert!(matches!(err, Error::UnknownTier { tier } if tier == "gold"));
    }

    #[test]
    fn test_limit_cap() {
        assert_eq!(TierLimit::Bounded(100).cap(40), 40);
        assert_eq!(TierLimit::Bounded(100).cap(250), 100);
        assert_eq!(TierLimit::Unbounded.cap(u64::MAX), u64::MAX);
    }

    #[test]
    fn test_quota_wire_convention() {
        // null means unlimited on the wire, translated here and only here
        assert_eq!(serde_json::from_str::<Quota>("null").unwrap(), Quota::Unlimited);
        assert_eq!(serde_json::from_str::<Quota>("42").unwrap(), Quota::Limited(42));
        assert_eq!(serde_json::to_string(&Quota::Unlimited).unwrap(), "null");
        assert_eq!(serde_json::to_string(&Quota::Limited(7)).unwrap(), "7");
    }

    #[test]
    fn test_quota_exhaustion() {
        assert!(Quota::Limited(0).is_exhausted());
        assert!(!Quota::Limited(1).is_exhausted());
        assert!(!Quota::Unlimited.is_exhausted());
    }
}
