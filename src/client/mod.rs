//! Async client for the external key-management service.
//!
//! The service owns all mutable key state: secrets, per-key metadata (the
//! current pricing tier), remaining quota, and verification analytics. This
//! client is a typed veneer over its HTTP API; it performs no retries of
//! its own, so timeouts, backoff, and circuit breaking belong to the
//! caller.

mod config;
mod wire;

pub use config::KeyServiceConfig;
pub use wire::{CreatedKey, KeyDetails, Verification, VerifiedKey};

use std::str::FromStr;
use std::time::Duration;

use secrecy::ExposeSecret;
use serde::de::DeserializeOwned;
use url::form_urlencoded;

use crate::interval::end_of_month_ms;
use crate::meter::Meter;
use crate::pricing::{PricingTable, Quota, TierId};
use crate::{Error, Result};

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Client for the key-management service.
#[derive(Debug, Clone)]
pub struct KeyServiceClient {
    http: reqwest::Client,
    config: KeyServiceConfig,
}

impl KeyServiceClient {
    pub fn new(config: KeyServiceConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(DEFAULT_TIMEOUT)
            .build()
            .map_err(Error::Network)?;
        Ok(Self { http, config })
    }

    /// Build a client around an existing `reqwest::Client`.
    pub fn with_http(config: KeyServiceConfig, http: reqwest::Client) -> Self {
        Self { http, config }
    }

    pub fn config(&self) -> &KeyServiceConfig {
        &self.config
    }

    /// Metering operations over this client and a pricing table.
    pub fn meter<'a>(&'a self, table: &'a PricingTable) -> Meter<'a> {
        Meter::new(self, table)
    }

    fn url(&self, endpoint: &str) -> String {
        format!("{}/v1/{}", self.config.base_url(), endpoint)
    }

    fn post(&self, endpoint: &str) -> reqwest::RequestBuilder {
        self.http
            .post(self.url(endpoint))
            .bearer_auth(self.config.root_key.expose_secret())
    }

    fn get(&self, endpoint: &str, query: &[(&str, String)]) -> reqwest::RequestBuilder {
        let mut url = self.url(endpoint);
        if !query.is_empty() {
            let encoded: String = form_urlencoded::Serializer::new(String::new())
                .extend_pairs(query.iter().map(|(k, v)| (*k, v.as_str())))
                .finish();
            url = format!("{url}?{encoded}");
        }
        self.http
            .get(url)
            .bearer_auth(self.config.root_key.expose_secret())
    }

    async fn handle<T: DeserializeOwned>(&self, response: reqwest::Response) -> Result<T> {
        let status = response.status();
        if !status.is_success() {
            return Err(self.decode_error(response).await);
        }
        response.json().await.map_err(Error::Network)
    }

    async fn handle_empty(&self, response: reqwest::Response) -> Result<()> {
        if !response.status().is_success() {
            return Err(self.decode_error(response).await);
        }
        Ok(())
    }

    async fn decode_error(&self, response: reqwest::Response) -> Error {
        let status = response.status().as_u16();
        match response.json::<wire::ErrorResponse>().await {
            Ok(body) => body.into_error(status),
            Err(_) => Error::Api {
                status,
                code: "UNKNOWN".into(),
                message: "key service returned an undecodable error body".into(),
            },
        }
    }

    /// Create a new API key for `owner_id` at the table's first tier.
    ///
    /// The key starts with the first tier's full quota and expires at the
    /// end of the current month, closing the billing period.
    pub async fn create_key(&self, owner_id: &str, table: &PricingTable) -> Result<CreatedKey> {
        let first = table.first();
        let request = wire::CreateKeyRequest {
            api_id: &self.config.api_id,
            prefix: &self.config.key_prefix,
            owner_id,
            meta: wire::KeyMeta::tier(first),
            expires: end_of_month_ms(chrono::Utc::now()),
            remaining: table.get(first).limit.as_quota(),
        };
        let response = self.post("keys.createKey").json(&request).send().await?;
        let created: CreatedKey = self.handle(response).await?;
        tracing::debug!(key_id = %created.key_id, owner_id, tier = %first, "created key");
        Ok(created)
    }

    /// Fetch a key's current tier and remaining quota.
    ///
    /// A key with no tier metadata is on the first tier (it predates any
    /// transition); a tier label outside the table is surfaced as
    /// [`Error::UnknownTier`] rather than coerced.
    pub async fn get_key(&self, key_id: &str) -> Result<KeyDetails> {
        let query = [("keyId", key_id.to_string())];
        let response = self.get("keys.getKey", &query).send().await?;
        let raw: wire::GetKeyResponse = self.handle(response).await?;

        let tier = match raw.meta.and_then(|meta| meta.current_tier) {
            Some(label) => TierId::from_str(&label)?,
            None => TierId::Trial,
        };

        Ok(KeyDetails {
            key_id: raw.id,
            tier,
            remaining: raw.remaining,
            updated_at: raw.updated_at,
        })
    }

    /// Verify a key secret and report its remaining quota.
    ///
    /// Each successful verification is counted by the service as one usage
    /// unit. An invalid or expired key is [`Error::InvalidKey`].
    pub async fn verify_key(&self, secret: &str) -> Result<VerifiedKey> {
        let request = wire::VerifyKeyRequest {
            api_id: &self.config.api_id,
            key: secret,
        };
        let response = self.post("keys.verifyKey").json(&request).send().await?;
        let raw: wire::VerifyKeyResponse = self.handle(response).await?;

        if !raw.valid {
            tracing::debug!(code = raw.code.as_deref(), "key failed verification");
            return Err(Error::InvalidKey { code: raw.code });
        }
        Ok(VerifiedKey {
            remaining: raw.remaining,
        })
    }

    /// Per-bucket verification counts for a key, optionally starting at a
    /// millisecond timestamp.
    pub async fn get_verifications(
        &self,
        key_id: &str,
        start_ms: Option<i64>,
    ) -> Result<Vec<Verification>> {
        let mut query = vec![("keyId", key_id.to_string())];
        if let Some(start) = start_ms {
            query.push(("start", start.to_string()));
        }
        let response = self.get("keys.getVerifications", &query).send().await?;
        let raw: wire::VerificationsResponse = self.handle(response).await?;
        Ok(raw.verifications)
    }

    /// Write the tier label into the key's metadata.
    pub async fn set_tier(&self, key_id: &str, tier: TierId) -> Result<()> {
        let request = wire::UpdateKeyRequest {
            key_id,
            meta: wire::KeyMeta::tier(tier),
        };
        let response = self.post("keys.updateKey").json(&request).send().await?;
        self.handle_empty(response).await?;
        tracing::debug!(key_id, tier = %tier, "updated key tier");
        Ok(())
    }

    /// Set the key's remaining quota; [`Quota::Unlimited`] crosses the wire
    /// as `null`.
    pub async fn set_remaining(&self, key_id: &str, quota: Quota) -> Result<()> {
        let request = wire::UpdateRemainingRequest {
            key_id,
            op: "set",
            value: quota,
        };
        let response = self
            .post("keys.updateRemaining")
            .json(&request)
            .send()
            .await?;
        self.handle_empty(response).await?;
        tracing::debug!(key_id, remaining = %quota, "reset remaining quota");
        Ok(())
    }
}
