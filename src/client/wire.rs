//! Wire types for the key-management service API.

use serde::{Deserialize, Serialize};

use crate::pricing::{Quota, TierId};

/// A freshly created API key.
///
/// `key` is the only place the full secret is ever returned; hand it to the
/// end user (hashing it before storing a copy is recommended) and keep
/// `key_id` for management calls.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatedKey {
    pub key: String,
    pub key_id: String,
}

/// Management view of an API key.
#[derive(Debug, Clone, PartialEq)]
pub struct KeyDetails {
    pub key_id: String,
    /// Tier recorded in the key's metadata; trial when never set.
    pub tier: TierId,
    pub remaining: Quota,
    /// Millisecond timestamp of the last metadata update, if any.
    pub updated_at: Option<i64>,
}

/// Outcome of verifying a key secret.
#[derive(Debug, Clone, PartialEq)]
pub struct VerifiedKey {
    pub remaining: Quota,
}

/// Verification counts for one time bucket.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Verification {
    /// Start of the bucket, millisecond epoch.
    pub time: i64,
    pub success: u64,
    #[serde(default)]
    pub rate_limited: u64,
    #[serde(default)]
    pub usage_exceeded: u64,
}

// Request/response bodies below mirror the service's JSON exactly; the
// public types above are assembled from them in the client.

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct CreateKeyRequest<'a> {
    pub api_id: &'a str,
    pub prefix: &'a str,
    pub owner_id: &'a str,
    pub meta: KeyMeta,
    /// Expiry, millisecond epoch. Keys expire at the end of the billing
    /// month.
    pub expires: i64,
    pub remaining: Quota,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct KeyMeta {
    #[serde(rename = "currentTier", default, skip_serializing_if = "Option::is_none")]
    pub current_tier: Option<String>,
}

impl KeyMeta {
    pub(crate) fn tier(tier: TierId) -> Self {
        Self {
            current_tier: Some(tier.as_str().into()),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct GetKeyResponse {
    pub id: String,
    #[serde(default)]
    pub meta: Option<KeyMeta>,
    #[serde(default)]
    pub remaining: Quota,
    #[serde(default)]
    pub updated_at: Option<i64>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct VerifyKeyRequest<'a> {
    pub api_id: &'a str,
    pub key: &'a str,
}

#[derive(Debug, Deserialize)]
pub(crate) struct VerifyKeyResponse {
    pub valid: bool,
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default)]
    pub remaining: Quota,
}

#[derive(Debug, Deserialize)]
pub(crate) struct VerificationsResponse {
    pub verifications: Vec<Verification>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct UpdateKeyRequest<'a> {
    pub key_id: &'a str,
    pub meta: KeyMeta,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct UpdateRemainingRequest<'a> {
    pub key_id: &'a str,
    /// Always `set`; the service also supports increment/decrement but tier
    /// resets are absolute.
    pub op: &'a str,
    /// `null` means unlimited on the wire.
    pub value: Quota,
}

/// Error body in non-success responses.
#[derive(Debug, Deserialize)]
pub(crate) struct ErrorResponse {
    pub error: ErrorDetail,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ErrorDetail {
    #[serde(default)]
    pub code: Option<String>,
    pub message: String,
}

impl ErrorResponse {
    pub(crate) fn into_error(self, status: u16) -> crate::Error {
        crate::Error::Api {
            status,
            code: self.error.code.unwrap_or_else(|| "UNKNOWN".into()),
            message: self.error.message,
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_create_key_request_shape() {
        let request = CreateKeyRequest {
            api_id: "api_123",
            prefix: "km",
            owner_id: "user_1",
            meta: KeyMeta::tier(TierId::Trial),
            expires: 1_735_689_599_999,
            remaining: Quota::Limited(10),
        };
        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(
            value,
            json!({
                "apiId": "api_123",
                "prefix": "km",
                "ownerId": "user_1",
                "meta": { "currentTier": "trial" },
                "expires": 1_735_689_599_999_i64,
                "remaining": 10,
            })
        );
    }

    #[test]
    fn test_update_remaining_unlimited_is_null() {
        let request = UpdateRemainingRequest {
            key_id: "key_1",
            op: "set",
            value: Quota::Unlimited,
        };
        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(
            value,
            json!({ "keyId": "key_1", "op": "set", "value": null })
        );
    }

    #[test]
    fn test_get_key_defaults() {
        // meta and remaining may both be absent; absent remaining means unlimited
        let response: GetKeyResponse =
            serde_json::from_value(json!({ "id": "key_1" })).unwrap();
        assert!(response.meta.is_none());
        assert_eq!(response.remaining, Quota::Unlimited);
        assert_eq!(response.updated_at, None);
    }

    #[test]
    fn test_verification_optional_counts() {
        let verification: Verification =
            serde_json::from_value(json!({ "time": 1000, "success": 5 })).unwrap();
        assert_eq!(verification.success, 5);
        assert_eq!(verification.rate_limited, 0);
    }
}
