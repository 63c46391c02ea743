//! Domain types for anchored vehicle provenance.
//!
//! This crate provides:
//! - `Vehicle` and `Event` entities with their stored CID forms
//! - Anchorable record projections that exclude operational fields
//! - The `type=<kind>|cid=<cid>` ledger note protocol
//!
#![deny(missing_docs)]

/// Error types for core operations.
pub mod errors;
/// Events and event types.
pub mod event;
/// Ledger note payloads.
pub mod note;
/// Anchorable record projections.
pub mod records;
/// Vehicles and their anchor state.
pub mod vehicle;

pub use errors::NoteError;
pub use event::{AnchorRecord, Event, EventType};
pub use note::{LedgerNote, NoteKind, MAX_NOTE_SIZE};
pub use records::{EventRecord, VehicleRecord};
pub use vehicle::{AnchorState, Vehicle};
