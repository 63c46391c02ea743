use classics_canonical::{CanonicalizationError, Cid};
use classics_core::NoteKind;
use std::fmt;
use thiserror::Error;
use uuid::Uuid;

use crate::ledger::LedgerError;
use crate::repository::RepositoryError;

/// Ledger outcome of a confirmed anchoring transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnchorReceipt {
    /// Note kind the transaction carried.
    pub kind: NoteKind,
    /// Vehicle asset the transaction touched.
    pub asset_id: u64,
    /// Confirmed transaction id.
    pub txn_id: String,
    /// CID carried in the note.
    pub cid: Cid,
}

impl fmt::Display for AnchorReceipt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} txn {} on asset {} (cid {})",
            self.kind, self.txn_id, self.asset_id, self.cid
        )
    }
}

/// Anchoring failure.
#[derive(Error, Debug)]
pub enum AnchorError {
    /// Record could not be canonicalized. Nothing was sent to the ledger.
    #[error("canonicalization failed: {0}")]
    Canonicalization(#[from] CanonicalizationError),
    /// Note payload exceeds the ledger limit. Nothing was sent to the ledger.
    #[error("note of {size} bytes exceeds ledger maximum of {max}")]
    NoteTooLarge {
        /// Payload size.
        size: usize,
        /// Ledger limit.
        max: usize,
    },
    /// Genesis requested for a vehicle that already has an asset.
    #[error("vehicle {vehicle_id} already anchored to asset {asset_id}")]
    AlreadyAnchored {
        /// Vehicle id.
        vehicle_id: Uuid,
        /// Existing asset.
        asset_id: u64,
    },
    /// Event is already bound to a ledger transaction. Nothing was sent.
    #[error("event {event_id} already anchored in {txn_id}")]
    EventAlreadyAnchored {
        /// Event id.
        event_id: Uuid,
        /// Transaction the event was anchored in.
        txn_id: String,
    },
    /// Event names a different vehicle than the one it would be anchored on.
    /// Nothing was sent.
    #[error("event {event_id} belongs to vehicle {event_vehicle_id}, not {vehicle_id}")]
    VehicleMismatch {
        /// Event id.
        event_id: Uuid,
        /// Vehicle named by the event.
        event_vehicle_id: Uuid,
        /// Vehicle passed to the anchorer.
        vehicle_id: Uuid,
    },
    /// Transaction construction, signing or broadcast failed.
    #[error("ledger submission failed: {0}")]
    LedgerSubmission(String),
    /// Transaction broadcast but unconfirmed within the round budget.
    #[error("ledger transaction {txn_id} not confirmed within {rounds} rounds")]
    LedgerConfirmationTimeout {
        /// Broadcast transaction id.
        txn_id: String,
        /// Rounds waited.
        rounds: u64,
    },
    /// Transaction broadcast but its outcome could not be read back.
    #[error("ledger transaction {txn_id} outcome unknown: {reason}")]
    LedgerOutcomeUnknown {
        /// Broadcast transaction id.
        txn_id: String,
        /// Failure after the broadcast.
        reason: String,
    },
    /// Ledger write succeeded but the repository write failed. The receipt
    /// must be reconciled into the domain store.
    #[error("{receipt} confirmed but not persisted: {source}")]
    RepositoryUpdate {
        /// Confirmed ledger outcome.
        receipt: AnchorReceipt,
        /// Repository failure.
        source: RepositoryError,
    },
}

impl From<LedgerError> for AnchorError {
    fn from(err: LedgerError) -> Self {
        match err {
            LedgerError::Submission(reason) => AnchorError::LedgerSubmission(reason),
            LedgerError::ConfirmationTimeout { txn_id, rounds } => {
                AnchorError::LedgerConfirmationTimeout { txn_id, rounds }
            }
            LedgerError::Unconfirmed { txn_id, reason } => {
                AnchorError::LedgerOutcomeUnknown { txn_id, reason }
            }
        }
    }
}

impl AnchorError {
    /// Whether the ledger may hold a transaction the domain store does not reflect.
    ///
    /// True for a confirmed write that was not persisted, and for a broadcast
    /// transaction whose confirmation was never observed.
    pub fn needs_reconciliation(&self) -> bool {
        matches!(
            self,
            AnchorError::RepositoryUpdate { .. }
                | AnchorError::LedgerConfirmationTimeout { .. }
                | AnchorError::LedgerOutcomeUnknown { .. }
        )
    }
}
