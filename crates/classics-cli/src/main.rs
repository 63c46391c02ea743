//! Classics CLI - content identifiers and ledger anchoring for vehicle records.

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

mod commands;
mod config;
mod output;
mod store;

use commands::{anchor_event, cid, genesis, note, status, verify};

#[derive(Parser)]
#[command(name = "classics")]
#[command(about = "Vehicle record CIDs and ledger anchoring CLI")]
struct Cli {
    /// Configuration file (default: ./classics.toml when present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compute the CID and canonical forms of a JSON record
    Cid {
        /// Input JSON file (or stdin if not provided)
        input: Option<String>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Check a stored CID against its canonical binary
    Verify {
        /// CID on record
        #[arg(long)]
        cid: String,
        /// Base64 canonical binary on record
        #[arg(long)]
        binary: String,
        /// Canonical text on record, checked when given
        #[arg(long)]
        text: Option<String>,
    },
    /// Print a ledger note payload
    Note {
        /// Note kind: genesis, new_event or vehicle_update
        #[arg(long)]
        kind: String,
        /// CID carried by the note
        #[arg(long)]
        cid: String,
    },
    /// Mint the ledger asset for a vehicle
    Genesis {
        /// Vehicle JSON file, rewritten with the anchoring result
        #[arg(long)]
        vehicle: PathBuf,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Anchor an event against its vehicle's asset
    AnchorEvent {
        /// Vehicle JSON file
        #[arg(long)]
        vehicle: PathBuf,
        /// Event JSON file
        #[arg(long)]
        event: PathBuf,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Anchor a fresh snapshot of a vehicle
    AnchorVehicle {
        /// Vehicle JSON file
        #[arg(long)]
        vehicle: PathBuf,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show algod reachability and the custodial address
    Status,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = cli.config;

    let result = match cli.command {
        Commands::Cid { input, json } => cid::run(input, json),
        Commands::Verify { cid, binary, text } => verify::run(cid, binary, text),
        Commands::Note { kind, cid } => note::run(kind, cid),
        Commands::Genesis { vehicle, json } => genesis::run(config, vehicle, json),
        Commands::AnchorEvent {
            vehicle,
            event,
            json,
        } => anchor_event::run(config, vehicle, event, json),
        Commands::AnchorVehicle { vehicle, json } => {
            anchor_event::run_vehicle_update(config, vehicle, json)
        }
        Commands::Status => status::run(config),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
