//! Ledger note payloads.
//!
//! Notes are ASCII `type=<kind>|cid=<cid>`. Anchored notes are permanent
//! ledger history, so the rendering here must never change shape.

use classics_canonical::Cid;
use std::fmt;
use std::str::FromStr;

use crate::errors::NoteError;

/// Largest note the ledger accepts, in bytes.
pub const MAX_NOTE_SIZE: usize = 1024;

/// Reason a note was attached to a transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NoteKind {
    /// Asset creation for a vehicle.
    Genesis,
    /// A new event anchored against the vehicle asset.
    NewEvent,
    /// A new snapshot of the vehicle itself.
    VehicleUpdate,
}

impl NoteKind {
    /// Wire name.
    pub fn as_str(self) -> &'static str {
        match self {
            NoteKind::Genesis => "genesis",
            NoteKind::NewEvent => "new_event",
            NoteKind::VehicleUpdate => "vehicle_update",
        }
    }
}

impl fmt::Display for NoteKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for NoteKind {
    type Err = NoteError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "genesis" => Ok(NoteKind::Genesis),
            "new_event" => Ok(NoteKind::NewEvent),
            "vehicle_update" => Ok(NoteKind::VehicleUpdate),
            other => Err(NoteError::UnknownKind(other.to_string())),
        }
    }
}

/// Note payload binding a transaction to a CID.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LedgerNote {
    /// Why the transaction was issued.
    pub kind: NoteKind,
    /// CID of the anchored record.
    pub cid: Cid,
}

impl LedgerNote {
    /// Creates a note.
    pub fn new(kind: NoteKind, cid: Cid) -> Self {
        Self { kind, cid }
    }

    /// Payload bytes as attached to the transaction.
    pub fn to_bytes(&self) -> Vec<u8> {
        self.to_string().into_bytes()
    }

    /// Parses a payload read back from the ledger.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, NoteError> {
        std::str::from_utf8(bytes)
            .map_err(|_| NoteError::Malformed("note is not UTF-8".into()))?
            .parse()
    }
}

impl fmt::Display for LedgerNote {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "type={}|cid={}", self.kind, self.cid)
    }
}

impl FromStr for LedgerNote {
    type Err = NoteError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (kind, cid) = s
            .split_once('|')
            .ok_or_else(|| NoteError::Malformed(s.to_string()))?;
        let kind = kind
            .strip_prefix("type=")
            .ok_or_else(|| NoteError::Malformed(s.to_string()))?;
        let cid = cid
            .strip_prefix("cid=")
            .ok_or_else(|| NoteError::Malformed(s.to_string()))?;
        Ok(LedgerNote {
            kind: kind.parse()?,
            cid: Cid::parse(cid)?,
        })
    }
}
