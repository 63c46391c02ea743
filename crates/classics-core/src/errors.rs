use thiserror::Error;

/// Error parsing a ledger note payload.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum NoteError {
    /// Payload does not have the `type=<kind>|cid=<cid>` shape.
    #[error("malformed note: {0}")]
    Malformed(String),
    /// Kind is not one of the known note kinds.
    #[error("unknown note kind: {0}")]
    UnknownKind(String),
    /// CID component is not a valid CID.
    #[error("invalid cid in note: {0}")]
    InvalidCid(#[from] classics_canonical::ValidationError),
}
