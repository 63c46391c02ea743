//! Asset transactions and their canonical wire form.

use classics_canonical::base32::{self, Case};
use sha2::{Digest as _, Sha512_256};

use crate::account::{Address, Signer};
use crate::msgpack::{self, Value};

/// Domain separator prepended to transaction bytes before hashing and signing.
const TX_TAG: &[u8] = b"TX";

/// Bytes a signed envelope adds around the transaction map:
/// map header, `sig` key, 64-byte bin, `txn` key.
const SIGNED_OVERHEAD: usize = 1 + 4 + 2 + 64 + 4;

/// Network parameters a transaction is built against.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SuggestedParams {
    /// Fee per byte in microalgos.
    pub fee_per_byte: u64,
    /// Minimum fee in microalgos.
    pub min_fee: u64,
    /// Latest round seen by the node.
    pub last_round: u64,
    /// Genesis id, e.g. `testnet-v1.0`.
    pub genesis_id: String,
    /// Genesis hash.
    pub genesis_hash: [u8; 32],
}

/// Fields shared by every transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Header {
    /// Sending account.
    pub sender: Address,
    /// Fee in microalgos.
    pub fee: u64,
    /// First valid round.
    pub first_valid: u64,
    /// Last valid round.
    pub last_valid: u64,
    /// Genesis id.
    pub genesis_id: String,
    /// Genesis hash.
    pub genesis_hash: [u8; 32],
    /// Note payload.
    pub note: Vec<u8>,
}

impl Header {
    /// Header valid from the round after `params.last_round` for `validity_window` rounds.
    pub fn new(sender: Address, params: &SuggestedParams, validity_window: u64, note: Vec<u8>) -> Self {
        let first_valid = params.last_round + 1;
        Self {
            sender,
            fee: 0,
            first_valid,
            last_valid: first_valid + validity_window,
            genesis_id: params.genesis_id.clone(),
            genesis_hash: params.genesis_hash,
            note,
        }
    }
}

/// Asset creation parameters as carried on chain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetDefinition {
    /// Total units.
    pub total: u64,
    /// Decimal places.
    pub decimals: u32,
    /// Whether holdings start frozen.
    pub default_frozen: bool,
    /// Unit name.
    pub unit_name: String,
    /// Asset name.
    pub asset_name: String,
    /// Metadata URL.
    pub url: String,
    /// Manager address.
    pub manager: Address,
    /// Reserve address.
    pub reserve: Address,
    /// Freeze address.
    pub freeze: Address,
    /// Clawback address.
    pub clawback: Address,
}

/// Transaction body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Kind {
    /// `acfg` creating a new asset.
    AssetCreate(AssetDefinition),
    /// `axfer` moving units of an asset.
    AssetTransfer {
        /// Asset id.
        asset_id: u64,
        /// Units moved.
        amount: u64,
        /// Receiving account.
        receiver: Address,
    },
}

/// Unsigned transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transaction {
    /// Common fields.
    pub header: Header,
    /// Type-specific fields.
    pub kind: Kind,
}

impl Transaction {
    /// Transfer of zero units from the sender to itself.
    pub fn self_transfer(header: Header, asset_id: u64) -> Self {
        let receiver = header.sender;
        Self {
            header,
            kind: Kind::AssetTransfer {
                asset_id,
                amount: 0,
                receiver,
            },
        }
    }

    /// Creation of a new asset.
    pub fn asset_create(header: Header, definition: AssetDefinition) -> Self {
        Self {
            header,
            kind: Kind::AssetCreate(definition),
        }
    }

    fn to_value(&self) -> Value {
        let h = &self.header;
        let mut fields = vec![
            ("fee", Value::Uint(h.fee)),
            ("fv", Value::Uint(h.first_valid)),
            ("gen", Value::Str(h.genesis_id.clone())),
            ("gh", Value::Bin(h.genesis_hash.to_vec())),
            ("lv", Value::Uint(h.last_valid)),
            ("note", Value::Bin(h.note.clone())),
            ("snd", Value::Addr(h.sender.0)),
        ];
        match &self.kind {
            Kind::AssetCreate(def) => {
                fields.push(("type", Value::Str("acfg".into())));
                fields.push((
                    "apar",
                    Value::Map(vec![
                        ("an", Value::Str(def.asset_name.clone())),
                        ("au", Value::Str(def.url.clone())),
                        ("c", Value::Addr(def.clawback.0)),
                        ("dc", Value::Uint(u64::from(def.decimals))),
                        ("df", Value::Bool(def.default_frozen)),
                        ("f", Value::Addr(def.freeze.0)),
                        ("m", Value::Addr(def.manager.0)),
                        ("r", Value::Addr(def.reserve.0)),
                        ("t", Value::Uint(def.total)),
                        ("un", Value::Str(def.unit_name.clone())),
                    ]),
                ));
            }
            Kind::AssetTransfer {
                asset_id,
                amount,
                receiver,
            } => {
                fields.push(("type", Value::Str("axfer".into())));
                fields.push(("xaid", Value::Uint(*asset_id)));
                fields.push(("aamt", Value::Uint(*amount)));
                fields.push(("arcv", Value::Addr(receiver.0)));
            }
        }
        Value::Map(fields)
    }

    /// Canonical msgpack of the transaction.
    pub fn encode(&self) -> Vec<u8> {
        msgpack::encode(&self.to_value())
    }

    fn tagged(&self) -> Vec<u8> {
        let mut bytes = TX_TAG.to_vec();
        bytes.extend_from_slice(&self.encode());
        bytes
    }

    /// Transaction id: base32 of SHA-512/256 over the tagged bytes.
    pub fn id(&self) -> String {
        base32::encode(&Sha512_256::digest(self.tagged()), Case::Upper)
    }

    /// Size the signed envelope will have.
    pub fn estimated_signed_size(&self) -> u64 {
        (self.encode().len() + SIGNED_OVERHEAD) as u64
    }

    /// Sets the fee from the per-byte rate, never below the network minimum.
    pub fn assign_fee(&mut self, params: &SuggestedParams) {
        self.header.fee = 0;
        let fee = params.fee_per_byte.saturating_mul(self.estimated_signed_size());
        self.header.fee = fee.max(params.min_fee);
    }

    /// Signs the transaction and returns `(txn_id, signed envelope bytes)`.
    pub fn sign(&self, signer: &Signer) -> (String, Vec<u8>) {
        let signature = signer.sign(&self.tagged());
        let envelope = Value::Map(vec![
            ("sig", Value::Bin(signature.to_vec())),
            ("txn", self.to_value()),
        ]);
        (self.id(), msgpack::encode(&envelope))
    }
}
