//! Anchor-event and anchor-vehicle command implementations.

use classics_anchor::{ensure_anchorable, AnchorReceipt, Anchorer};
use classics_core::{Event, Vehicle};
use std::path::PathBuf;

use crate::output;
use crate::store::JsonFile;

pub fn run(
    config: Option<PathBuf>,
    vehicle_path: PathBuf,
    event_path: PathBuf,
    json: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let vehicle_file = JsonFile::new(vehicle_path);
    let event_file = JsonFile::new(event_path);
    let mut vehicle: Vehicle = vehicle_file
        .load()
        .map_err(|e| format!("Failed to load vehicle: {}", e))?;
    let mut event: Event = event_file
        .load()
        .map_err(|e| format!("Failed to load event: {}", e))?;

    // Refuse before the algod config is even read.
    ensure_anchorable(&vehicle, &event)?;

    let (settings, client) = super::ledger(config.as_deref())?;
    let anchorer = Anchorer::with_config(client, &vehicle_file, &event_file, settings.anchor);
    let receipt = anchorer.anchor_event(&mut vehicle, &mut event)?;
    print(&receipt, json);
    Ok(())
}

pub fn run_vehicle_update(
    config: Option<PathBuf>,
    vehicle_path: PathBuf,
    json: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let file = JsonFile::new(vehicle_path);
    let mut vehicle: Vehicle = file
        .load()
        .map_err(|e| format!("Failed to load vehicle: {}", e))?;

    let (settings, client) = super::ledger(config.as_deref())?;
    let anchorer = Anchorer::with_config(client, &file, &file, settings.anchor);
    let receipt = anchorer.anchor_vehicle_update(&mut vehicle)?;
    print(&receipt, json);
    Ok(())
}

fn print(receipt: &AnchorReceipt, json: bool) {
    if json {
        println!("{}", output::receipt_json(receipt));
    } else {
        output::print_receipt(receipt);
    }
}
