//! Contract between the anchorer and a ledger backend.
//!
//! Implementations build a transaction against current network parameters,
//! sign it with the custodial key, broadcast it and wait a bounded number of
//! rounds for confirmation before returning.

use thiserror::Error;

/// Parameters for creating a vehicle asset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetParams {
    /// Human-readable asset name.
    pub asset_name: String,
    /// Unit name.
    pub unit_name: String,
    /// Metadata URL.
    pub url: String,
    /// Total supply.
    pub total: u64,
    /// Decimal places.
    pub decimals: u32,
    /// Whether holdings start frozen.
    pub default_frozen: bool,
    /// Manager address; the signer when `None`.
    pub manager: Option<String>,
    /// Reserve address; the signer when `None`.
    pub reserve: Option<String>,
    /// Freeze address; the signer when `None`.
    pub freeze: Option<String>,
    /// Clawback address; the signer when `None`.
    pub clawback: Option<String>,
    /// Note payload attached to the creation transaction.
    pub note: Vec<u8>,
}

/// Failure reported by a ledger backend.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LedgerError {
    /// Building, signing or broadcasting failed. No ledger state changed.
    #[error("submission failed: {0}")]
    Submission(String),
    /// Broadcast succeeded but confirmation did not arrive in time. The
    /// transaction may still confirm later.
    #[error("transaction {txn_id} not confirmed after {rounds} rounds")]
    ConfirmationTimeout {
        /// Broadcast transaction id.
        txn_id: String,
        /// Rounds waited.
        rounds: u64,
    },
    /// Broadcast succeeded but the outcome could not be read back. The
    /// transaction may already be on the ledger.
    #[error("transaction {txn_id} broadcast, outcome unknown: {reason}")]
    Unconfirmed {
        /// Broadcast transaction id.
        txn_id: String,
        /// What went wrong after the broadcast.
        reason: String,
    },
}

/// Ledger operations the anchorer depends on.
pub trait LedgerClient {
    /// Creates a unique asset. Returns `(asset_id, txn_id)` once confirmed.
    fn create_asset(&self, params: &AssetParams) -> Result<(u64, String), LedgerError>;

    /// Moves an asset from the custodial account to itself with a note.
    /// Returns the confirmed transaction id.
    fn self_transfer_asset(&self, asset_id: u64, note: &[u8]) -> Result<String, LedgerError>;
}

impl<T: LedgerClient + ?Sized> LedgerClient for &T {
    fn create_asset(&self, params: &AssetParams) -> Result<(u64, String), LedgerError> {
        (**self).create_asset(params)
    }

    fn self_transfer_asset(&self, asset_id: u64, note: &[u8]) -> Result<String, LedgerError> {
        (**self).self_transfer_asset(asset_id, note)
    }
}
