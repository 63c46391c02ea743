//! Anchoring of vehicle and event records onto a ledger.
//!
//! The [`Anchorer`] computes record CIDs, issues ledger transactions through a
//! [`LedgerClient`] and writes the resulting identifiers back through the
//! vehicle and event repositories.
//!
//! Failure ordering:
//! - event ownership, prior-anchor, canonicalization and note checks run
//!   before any ledger call
//! - ledger failures are returned as-is; nothing is retried internally
//! - a repository failure after a confirmed transaction is reported as
//!   [`AnchorError::RepositoryUpdate`] carrying the [`AnchorReceipt`]
//!
//! [`AnchorError::needs_reconciliation`] flags every outcome where the ledger
//! may hold a transaction the domain store does not know about: repository
//! failures after confirmation, confirmation timeouts, and broadcasts whose
//! outcome could not be read back.
//!
#![deny(missing_docs)]

/// Anchoring state machine.
pub mod anchorer;
/// Asset naming configuration.
pub mod config;
/// Error and receipt types.
pub mod errors;
/// Ledger backend contract.
pub mod ledger;
/// Persistence contracts.
pub mod repository;

pub use anchorer::{asset_name, ensure_anchorable, Anchorer};
pub use config::AnchorConfig;
pub use errors::{AnchorError, AnchorReceipt};
pub use ledger::{AssetParams, LedgerClient, LedgerError};
pub use repository::{EventRepository, RepositoryError, VehicleRepository};
