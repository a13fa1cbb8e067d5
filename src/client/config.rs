//! Key-service client configuration.

use secrecy::SecretString;

use crate::{Error, Result};

const DEFAULT_BASE_URL: &str = "https://api.unkey.dev";
const DEFAULT_KEY_PREFIX: &str = "km";

const ROOT_KEY_VAR: &str = "KEYMETER_ROOT_KEY";
const API_ID_VAR: &str = "KEYMETER_API_ID";
const BASE_URL_VAR: &str = "KEYMETER_BASE_URL";

/// Configuration for [`KeyServiceClient`](super::KeyServiceClient).
///
/// The root key authenticates the SDK against the key service; it is held
/// as a [`SecretString`] so it never leaks through `Debug` output.
#[derive(Debug, Clone)]
pub struct KeyServiceConfig {
    pub root_key: SecretString,
    /// The service-side API namespace new keys are created under.
    pub api_id: String,
    /// Prefix prepended to generated key secrets.
    pub key_prefix: String,
    base_url: Option<String>,
}

impl KeyServiceConfig {
    pub fn new(root_key: impl Into<String>, api_id: impl Into<String>) -> Self {
        Self {
            root_key: SecretString::from(root_key.into()),
            api_id: api_id.into(),
            key_prefix: DEFAULT_KEY_PREFIX.into(),
            base_url: None,
        }
    }

    /// Read configuration from `KEYMETER_ROOT_KEY` and `KEYMETER_API_ID`.
    pub fn from_env() -> Result<Self> {
        let root_key = std::env::var(ROOT_KEY_VAR)
            .map_err(|_| Error::config(format!("{ROOT_KEY_VAR} is not set")))?;
        let api_id = std::env::var(API_ID_VAR)
            .map_err(|_| Error::config(format!("{API_ID_VAR} is not set")))?;
        Ok(Self::new(root_key, api_id))
    }

    pub fn with_key_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.key_prefix = prefix.into();
        self
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    /// Effective base URL: explicit override, then `KEYMETER_BASE_URL`,
    /// then the hosted service default.
    pub fn base_url(&self) -> String {
        self.base_url
            .clone()
            .or_else(|| std::env::var(BASE_URL_VAR).ok())
            .unwrap_or_else(|| DEFAULT_BASE_URL.into())
    }
}
