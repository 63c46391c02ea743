//! Status command implementation.

use std::path::PathBuf;

pub fn run(config: Option<PathBuf>) -> Result<(), Box<dyn std::error::Error>> {
    let (settings, client) = super::ledger(config.as_deref())?;

    println!("{:<8} {}", "algod", settings.algod.algod_url);
    println!("{:<8} {}", "address", client.address());
    if !client.is_online() {
        return Err(format!("algod at {} is unreachable", settings.algod.algod_url).into());
    }

    let params = client.suggested_params()?;
    println!("{:<8} {}", "network", params.genesis_id);
    println!("{:<8} {}", "round", params.last_round);
    Ok(())
}
