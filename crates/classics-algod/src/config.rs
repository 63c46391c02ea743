use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use serde::{Deserialize, Serialize};

use crate::errors::AlgodError;

/// Environment variable overriding [`AlgodConfig::algod_url`].
pub const ENV_ALGOD_URL: &str = "ALGORAND_ALGOD_URL";
/// Environment variable overriding [`AlgodConfig::algod_token`].
pub const ENV_ALGOD_TOKEN: &str = "ALGORAND_ALGOD_TOKEN";
/// Environment variable overriding [`AlgodConfig::signing_seed_b64`].
pub const ENV_SIGNING_SEED: &str = "ALGORAND_SIGNING_SEED";
/// Environment variable overriding [`AlgodConfig::network`].
pub const ENV_NETWORK: &str = "ALGORAND_NETWORK";

/// Connection and signing settings for the algod adapter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AlgodConfig {
    /// Base URL of the algod REST API.
    pub algod_url: String,
    /// API token sent as `X-Algo-API-Token`.
    pub algod_token: String,
    /// Standard base64 of the 32-byte ed25519 seed of the custodial account.
    pub signing_seed_b64: String,
    /// Expected genesis id prefix (e.g. `testnet`); unchecked when `None`.
    pub network: Option<String>,
    /// Rounds to wait for confirmation.
    pub confirmation_rounds: u64,
    /// Rounds a transaction stays valid.
    pub validity_window: u64,
    /// Per-request timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for AlgodConfig {
    fn default() -> Self {
        Self {
            algod_url: String::new(),
            algod_token: String::new(),
            signing_seed_b64: String::new(),
            network: None,
            confirmation_rounds: 4,
            validity_window: 1000,
            timeout_secs: 30,
        }
    }
}

impl AlgodConfig {
    /// Applies overrides from a variable lookup, normally `std::env::var`.
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup(ENV_ALGOD_URL) {
            self.algod_url = url;
        }
        if let Some(token) = lookup(ENV_ALGOD_TOKEN) {
            self.algod_token = token;
        }
        if let Some(seed) = lookup(ENV_SIGNING_SEED) {
            self.signing_seed_b64 = seed;
        }
        if let Some(network) = lookup(ENV_NETWORK) {
            self.network = Some(network).filter(|n| !n.is_empty());
        }
    }

    /// Applies overrides from the process environment.
    pub fn apply_env(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    /// Checks that the adapter can be built from this configuration.
    pub fn validate(&self) -> Result<(), AlgodError> {
        if self.algod_url.trim().is_empty() {
            return Err(AlgodError::Config("algod URL is required".into()));
        }
        if self.signing_seed_b64.trim().is_empty() {
            return Err(AlgodError::Config("signing seed is required".into()));
        }
        let seed = STANDARD
            .decode(self.signing_seed_b64.trim().as_bytes())
            .map_err(|e| AlgodError::Config(format!("signing seed is not base64: {e}")))?;
        if seed.len() != 32 {
            return Err(AlgodError::Config(format!(
                "signing seed must be 32 bytes, got {}",
                seed.len()
            )));
        }
        if self.confirmation_rounds == 0 {
            return Err(AlgodError::Config("confirmation_rounds must be positive".into()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn valid() -> AlgodConfig {
        AlgodConfig {
            algod_url: "http://localhost:4001".into(),
            signing_seed_b64: STANDARD.encode([9u8; 32]),
            ..AlgodConfig::default()
        }
    }

    #[test]
    fn defaults() {
        let config = AlgodConfig::default();
        assert_eq!(config.confirmation_rounds, 4);
        assert_eq!(config.validity_window, 1000);
        assert_eq!(config.timeout_secs, 30);
    }

    #[test]
    fn validate_requires_url_and_seed() {
        assert!(valid().validate().is_ok());

        let mut missing_url = valid();
        missing_url.algod_url = " ".into();
        assert!(missing_url.validate().is_err());

        let mut short_seed = valid();
        short_seed.signing_seed_b64 = STANDARD.encode([1u8; 16]);
        assert!(short_seed.validate().is_err());

        let mut garbage = valid();
        garbage.signing_seed_b64 = "not base64!".into();
        assert!(garbage.validate().is_err());
    }

    #[test]
    fn overrides_replace_file_values() {
        let vars: HashMap<&str, &str> = [
            (ENV_ALGOD_URL, "https://testnet-api.example"),
            (ENV_NETWORK, "testnet"),
        ]
        .into_iter()
        .collect();
        let mut config = valid();
        config.apply_overrides(|key| vars.get(key).map(|v| v.to_string()));
        assert_eq!(config.algod_url, "https://testnet-api.example");
        assert_eq!(config.network.as_deref(), Some("testnet"));
        assert_eq!(config.algod_token, "");
    }
}
