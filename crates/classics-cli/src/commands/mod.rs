pub mod anchor_event;
pub mod cid;
pub mod genesis;
pub mod note;
pub mod status;
pub mod verify;

use classics_algod::AlgodClient;
use std::path::Path;

use crate::config::{self, Settings};

/// Loads settings and builds the algod-backed ledger client.
pub(crate) fn ledger(
    config_path: Option<&Path>,
) -> Result<(Settings, AlgodClient), Box<dyn std::error::Error>> {
    let settings = config::load(config_path)?;
    let client = AlgodClient::from_config(&settings.algod)
        .map_err(|e| format!("Failed to configure algod client: {}", e))?;
    Ok((settings, client))
}
