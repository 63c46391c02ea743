//! TOML configuration with environment overrides.

use classics_algod::AlgodConfig;
use classics_anchor::AnchorConfig;
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Configuration file read when `--config` is not given.
pub const DEFAULT_CONFIG_FILE: &str = "classics.toml";

/// Contents of the configuration file.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub algod: AlgodConfig,
    pub anchor: AnchorConfig,
}

impl Settings {
    /// Parses settings from TOML text.
    pub fn from_toml(text: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(text)
    }
}

/// Loads settings from `path`, or from `classics.toml` when present, then
/// applies `ALGORAND_*` environment overrides.
pub fn load(path: Option<&Path>) -> Result<Settings, Box<dyn std::error::Error>> {
    let file = match path {
        Some(explicit) => Some(explicit.to_path_buf()),
        None => Some(PathBuf::from(DEFAULT_CONFIG_FILE)).filter(|p| p.is_file()),
    };

    let mut settings = match file {
        Some(file) => {
            let text = std::fs::read_to_string(&file)
                .map_err(|e| format!("Failed to read config {}: {}", file.display(), e))?;
            Settings::from_toml(&text)
                .map_err(|e| format!("Invalid config {}: {}", file.display(), e))?
        }
        None => Settings::default(),
    };
    settings.algod.apply_env();
    Ok(settings)
}
