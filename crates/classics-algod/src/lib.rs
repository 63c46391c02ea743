//! Algorand algod adapter for the anchoring ledger contract.
//!
//! Builds `acfg`/`axfer` transactions in canonical msgpack, signs them with a
//! single custodial ed25519 key, broadcasts them over the algod REST API and
//! waits a bounded number of rounds for confirmation.
//!
#![deny(missing_docs)]

/// Custodial account and addresses.
pub mod account;
/// algod REST client.
pub mod client;
/// Adapter configuration.
pub mod config;
/// Adapter errors.
pub mod errors;
/// Canonical msgpack encoder.
pub mod msgpack;
/// Transaction construction and signing.
pub mod transaction;

pub use account::{Address, Signer};
pub use client::{AlgodApi, AlgodClient, HttpApi, NodeStatus, PendingTransaction, TransactionParams};
pub use config::AlgodConfig;
pub use errors::AlgodError;
pub use transaction::{AssetDefinition, Header, Kind, SuggestedParams, Transaction};
