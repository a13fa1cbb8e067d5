//! # keymeter
//!
//! Rust SDK for usage-based API key metering and pay-as-you-go tier billing.
//!
//! This crate pairs a pure pricing core (a progressive tier table with a
//! usage-cost calculator and a tier transition policy) with a typed async
//! client for an external key-management service that owns key lifecycle,
//! verification counts, and remaining-quota state.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use keymeter::{Interval, KeyServiceClient, KeyServiceConfig, PricingTable};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), keymeter::Error> {
//!     let client = KeyServiceClient::new(KeyServiceConfig::from_env()?)?;
//!     let table = PricingTable::default();
//!     let meter = client.meter(&table);
//!
//!     let status = meter.track_usage("km_live_...").await?;
//!     if status.should_advance() {
//!         let transition = meter.advance_tier("key_123").await?;
//!         println!("now on {} at ${}/call", transition.tier, transition.price);
//!     }
//!
//!     let cost = meter
//!         .billing_period_cost("key_123", Some(Interval::Last30d))
//!         .await?;
//!     println!("owed this period: ${cost}");
//!     Ok(())
//! }
//! ```
//!
//! ## Pure pricing core
//!
//! The table, cost calculator, and transition policy are synchronous and
//! stateless; all mutable state (current tier, remaining quota) lives in the
//! external service and is passed in and out as plain values.
//!
//! ```rust
//! use keymeter::PricingTable;
//! use rust_decimal_macros::dec;
//!
//! let table = PricingTable::default();
//! assert_eq!(table.cost_for_usage(15), dec!(0.50));
//! ```

#![cfg_attr(docsrs, feature(doc_cfg))]
#![allow(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

pub mod client;
pub mod interval;
pub mod meter;
pub mod pricing;

// Re-exports for convenience
pub use client::{
    CreatedKey, KeyDetails, KeyServiceClient, KeyServiceConfig, Verification, VerifiedKey,
};
pub use interval::{Interval, end_of_month_ms};
pub use meter::{Meter, UsageStatus};
pub use pricing::{
    PricingTable, PricingTableBuilder, Quota, Tier, TierId, TierLimit, TierTransition,
};

/// Error type for keymeter operations.
///
/// All errors include actionable context to help diagnose and resolve issues.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// Key service returned an error response.
    #[error("Key service error (HTTP {status}): {code}: {message}")]
    Api {
        status: u16,
        code: String,
        message: String,
    },

    /// Network connectivity or request failed.
    #[error("Network request failed: {0}")]
    Network(#[from] reqwest::Error),

    /// JSON serialization or deserialization failed.
    #[error("JSON parsing failed: {0}")]
    Json(#[from] serde_json::Error),

    /// Invalid or missing configuration.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Tier identifier is not present in the pricing table.
    ///
    /// Fatal to the calling operation; retrying without fixing the
    /// identifier cannot succeed.
    #[error("Unknown pricing tier: {tier:?}")]
    UnknownTier { tier: String },

    /// The key failed remote verification.
    #[error("API key is not valid{}", match code {
        Some(c) => format!(" ({c})"),
        None => String::new(),
    })]
    InvalidKey { code: Option<String> },

    /// A tier advance applied the tier write but failed the quota write.
    ///
    /// The remote key now carries `applied_tier` with a stale remaining
    /// quota. Retry the quota reset or reconcile; the SDK holds no
    /// transactional guarantee across the two writes because it does not
    /// own the persistence boundary.
    #[error("Key {key_id} left inconsistent: tier set to {applied_tier} but quota reset failed")]
    InconsistentKeyState {
        key_id: String,
        applied_tier: pricing::TierId,
        #[source]
        source: Box<Error>,
    },
}

/// Error category for unified error handling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Authentication or authorization failures (401, 403)
    Authorization,
    /// Configuration, parsing, or setup errors
    Configuration,
    /// Network, rate limit, or transient errors that may succeed on retry
    Transient,
    /// Remote key state errors (invalid key, partial tier update)
    KeyState,
    /// Internal errors (JSON, unexpected responses)
    Internal,
}

impl Error {
    pub fn config(message: impl Into<String>) -> Self {
        Error::Config(message.into())
    }

    pub fn unknown_tier(tier: impl Into<String>) -> Self {
        Error::UnknownTier { tier: tier.into() }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            Error::Api {
                status: 401 | 403, ..
            } => ErrorCategory::Authorization,

            Error::Config(_) | Error::UnknownTier { .. } => ErrorCategory::Configuration,

            Error::Network(_)
            | Error::Api {
                status: 429 | 500..=599,
                ..
            } => ErrorCategory::Transient,

            Error::InvalidKey { .. } | Error::InconsistentKeyState { .. } => {
                ErrorCategory::KeyState
            }

            Error::Json(_) | Error::Api { .. } => ErrorCategory::Internal,
        }
    }

    pub fn is_retryable(&self) -> bool {
        self.category() == ErrorCategory::Transient
    }

    pub fn is_unauthorized(&self) -> bool {
        self.category() == ErrorCategory::Authorization
    }
}

/// Result type alias for keymeter operations.
pub type Result<T> = std::result::Result<T, Error>;
