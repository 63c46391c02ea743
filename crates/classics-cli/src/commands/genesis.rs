//! Genesis command implementation.

use classics_anchor::Anchorer;
use classics_core::Vehicle;
use serde_json::json;
use std::path::PathBuf;
use tracing::info;

use crate::store::JsonFile;

pub fn run(
    config: Option<PathBuf>,
    vehicle_path: PathBuf,
    json: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let file = JsonFile::new(vehicle_path);
    let mut vehicle: Vehicle = file
        .load()
        .map_err(|e| format!("Failed to load vehicle: {}", e))?;

    let (settings, client) = super::ledger(config.as_deref())?;
    info!(address = %client.address(), vehicle_id = %vehicle.id, "starting genesis");

    let anchorer = Anchorer::with_config(client, &file, &file, settings.anchor);
    let asset_id = anchorer.vehicle_genesis(&mut vehicle)?;
    let cid = vehicle.cid.as_ref().map(|c| c.as_str()).unwrap_or_default();

    if json {
        let value = json!({
            "vehicle_id": vehicle.id.to_string(),
            "asset_id": asset_id,
            "cid": cid,
        });
        println!("{}", serde_json::to_string_pretty(&value)?);
    } else {
        println!("{:<8} {}", "vehicle", vehicle.id);
        println!("{:<8} {}", "asset", asset_id);
        println!("{:<8} {}", "cid", cid);
    }
    Ok(())
}
