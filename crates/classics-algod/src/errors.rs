use classics_anchor::LedgerError;
use thiserror::Error;

/// Errors raised by the algod adapter.
#[derive(Error, Debug)]
pub enum AlgodError {
    /// Configuration is incomplete or inconsistent.
    #[error("invalid configuration: {0}")]
    Config(String),
    /// Signing key or address could not be decoded.
    #[error("invalid key: {0}")]
    Key(String),
    /// Request failed in transport or returned a non-success status.
    #[error("algod request failed{}: {message}", status.map(|s| format!(" ({})", s)).unwrap_or_default())]
    Http {
        /// HTTP status, when the server answered.
        status: Option<u16>,
        /// Response body or transport error.
        message: String,
    },
    /// Response body did not match the expected shape.
    #[error("unexpected algod response: {0}")]
    Decode(String),
    /// Node connected to a different network than configured.
    #[error("network mismatch: expected {expected}, node reports {actual}")]
    NetworkMismatch {
        /// Configured network name.
        expected: String,
        /// Genesis id reported by the node.
        actual: String,
    },
    /// Transaction pool rejected the transaction.
    #[error("transaction {txn_id} rejected: {reason}")]
    PoolRejected {
        /// Transaction id.
        txn_id: String,
        /// Pool error reported by algod.
        reason: String,
    },
    /// Transaction not confirmed within the round budget.
    #[error("transaction {txn_id} not confirmed after {rounds} rounds")]
    ConfirmationTimeout {
        /// Transaction id.
        txn_id: String,
        /// Rounds waited.
        rounds: u64,
    },
    /// Asset creation confirmed without reporting an asset index.
    #[error("transaction {0} confirmed without an asset index")]
    MissingAssetIndex(String),
    /// Broadcast succeeded but polling for the outcome failed.
    #[error("transaction {txn_id} broadcast but not tracked: {reason}")]
    Unconfirmed {
        /// Transaction id.
        txn_id: String,
        /// Error raised while polling.
        reason: String,
    },
}

impl From<AlgodError> for LedgerError {
    fn from(err: AlgodError) -> Self {
        match err {
            AlgodError::ConfirmationTimeout { txn_id, rounds } => {
                LedgerError::ConfirmationTimeout { txn_id, rounds }
            }
            AlgodError::Unconfirmed { txn_id, reason } => {
                LedgerError::Unconfirmed { txn_id, reason }
            }
            AlgodError::MissingAssetIndex(txn_id) => LedgerError::Unconfirmed {
                txn_id,
                reason: "confirmed without an asset index".into(),
            },
            other => LedgerError::Submission(other.to_string()),
        }
    }
}
