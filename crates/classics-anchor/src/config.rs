use serde::{Deserialize, Serialize};

/// Default prefix of vehicle asset names.
pub const DEFAULT_ASSET_NAME_PREFIX: &str = "CC_";
/// Default unit name of vehicle assets.
pub const DEFAULT_UNIT_NAME: &str = "CCV";
/// Default base of the per-vehicle metadata URL.
pub const DEFAULT_METADATA_BASE_URL: &str = "https://vehicle.classicschain.com";

/// Naming of the assets minted at genesis.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnchorConfig {
    /// Prefix before the encoded vehicle id.
    pub asset_name_prefix: String,
    /// Asset unit name.
    pub unit_name: String,
    /// Base URL; the vehicle id is appended as a path segment.
    pub metadata_base_url: String,
}

impl Default for AnchorConfig {
    fn default() -> Self {
        Self {
            asset_name_prefix: DEFAULT_ASSET_NAME_PREFIX.to_string(),
            unit_name: DEFAULT_UNIT_NAME.to_string(),
            metadata_base_url: DEFAULT_METADATA_BASE_URL.to_string(),
        }
    }
}
