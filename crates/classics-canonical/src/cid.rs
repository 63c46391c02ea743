//! Content identifiers (CIDv1, dag-cbor, sha2-256, base32 multibase).
//!
//! Layout of the binary CID before multibase encoding:
//!
//! ```text
//! 0x01 (CIDv1) || 0x71 (dag-cbor) || 0x12 (sha2-256) || 0x20 (32 bytes) || digest
//! ```
//!
//! The text form is `b` followed by lowercase unpadded base32, 59 characters
//! in total.

use base64::Engine as _;
use regex::Regex;
use serde::{Deserialize, Serialize};
use sha2::{Digest as _, Sha256};
use std::fmt;

use crate::base32::{self, Case};
use crate::canonicalizer::{canonicalize_json, CanonicalizationError};
use crate::node::Node;
use crate::validation::ValidationError;
use crate::{dag_cbor, dag_json};

/// CID version byte.
pub const CID_VERSION: u8 = 0x01;
/// Multicodec code for DAG-CBOR, the canonical binary codec v1.
pub const DAG_CBOR_CODEC: u8 = 0x71;
/// Multihash code for SHA2-256.
pub const SHA2_256: u8 = 0x12;
/// SHA2-256 digest length.
pub const SHA2_256_LEN: u8 = 0x20;
/// Multibase prefix for lowercase unpadded base32.
pub const MULTIBASE_BASE32: char = 'b';

const CID_PREFIX: [u8; 4] = [CID_VERSION, DAG_CBOR_CODEC, SHA2_256, SHA2_256_LEN];

/// Text form of a content identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Cid(String);

impl Cid {
    /// Builds the identifier for a SHA-256 digest of canonical binary.
    pub fn from_digest(digest: &[u8; 32]) -> Self {
        let mut raw = Vec::with_capacity(CID_PREFIX.len() + digest.len());
        raw.extend_from_slice(&CID_PREFIX);
        raw.extend_from_slice(digest);
        let mut text = String::with_capacity(59);
        text.push(MULTIBASE_BASE32);
        text.push_str(&base32::encode(&raw, Case::Lower));
        Cid(text)
    }

    /// Hashes canonical binary bytes and builds their identifier.
    pub fn for_binary(canonical_binary: &[u8]) -> Self {
        let digest: [u8; 32] = Sha256::digest(canonical_binary).into();
        Cid::from_digest(&digest)
    }

    /// Parses and validates the text form.
    pub fn parse(value: impl Into<String>) -> Result<Self, ValidationError> {
        let s = value.into();
        let re = Regex::new(r"^b[a-z2-7]{58}$").expect("invalid regex");
        if !re.is_match(&s) {
            return Err(ValidationError::PatternMismatch {
                field: "cid",
                value: s,
            });
        }
        let raw = base32::decode(&s[1..], Case::Lower)?;
        if raw.len() != CID_PREFIX.len() + 32 || raw[..CID_PREFIX.len()] != CID_PREFIX {
            return Err(ValidationError::PatternMismatch {
                field: "cid",
                value: s,
            });
        }
        Ok(Cid(s))
    }

    /// SHA-256 digest of the canonical binary this identifier commits to.
    pub fn digest(&self) -> [u8; 32] {
        let mut digest = [0u8; 32];
        // Every constructor guarantees a well-formed body.
        if let Ok(raw) = base32::decode(&self.0[1..], Case::Lower) {
            digest.copy_from_slice(&raw[CID_PREFIX.len()..]);
        }
        digest
    }

    /// Borrowed text form.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Cid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Cid {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for Cid {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Cid::parse(value)
    }
}

impl From<Cid> for String {
    fn from(value: Cid) -> Self {
        value.0
    }
}

/// Identifier plus both canonical renderings of the same node tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CidResult {
    /// Content identifier derived from `canonical_binary_b64` alone.
    pub cid: Cid,
    /// DAG-JSON rendering, for inspection and storage only.
    pub canonical_text: String,
    /// Standard base64 of the DAG-CBOR bytes that were hashed.
    pub canonical_binary_b64: String,
}

/// Error raised when a stored [`CidResult`] does not hold together.
#[derive(thiserror::Error, Debug)]
pub enum CidError {
    /// Stored binary is not valid base64.
    #[error("canonical binary is not valid base64: {0}")]
    Base64(#[from] base64::DecodeError),
    /// Stored binary is not canonical DAG-CBOR.
    #[error(transparent)]
    Canonicalization(#[from] CanonicalizationError),
    /// Recomputed identifier differs from the stored one.
    #[error("cid mismatch: stored {stored}, computed {computed}")]
    CidMismatch {
        /// Identifier on record.
        stored: Cid,
        /// Identifier recomputed from the binary.
        computed: Cid,
    },
    /// Stored text is not the rendering of the stored binary.
    #[error("canonical text does not match canonical binary")]
    TextMismatch,
}

impl CidResult {
    /// Decoded canonical binary bytes.
    pub fn canonical_binary(&self) -> Result<Vec<u8>, CidError> {
        Ok(base64::engine::general_purpose::STANDARD.decode(&self.canonical_binary_b64)?)
    }

    /// Recomputes the identifier and text form from the stored binary.
    pub fn verify(&self) -> Result<(), CidError> {
        let binary = self.canonical_binary()?;
        let computed = Cid::for_binary(&binary);
        if computed != self.cid {
            return Err(CidError::CidMismatch {
                stored: self.cid.clone(),
                computed,
            });
        }
        let node = dag_cbor::decode(&binary)?;
        if dag_json::encode(&node)? != self.canonical_text {
            return Err(CidError::TextMismatch);
        }
        Ok(())
    }
}

/// Encodes a node tree into its identifier and canonical renderings.
///
/// Text and binary are produced from the same tree; only the binary is hashed.
///
/// # Errors
///
/// Returns [`CanonicalizationError`] if any value in the tree cannot be
/// encoded. Hashing itself cannot fail.
pub fn encode(node: &Node) -> Result<CidResult, CanonicalizationError> {
    let canonical_text = dag_json::encode(node)?;
    let binary = dag_cbor::encode(node)?;
    Ok(CidResult {
        cid: Cid::for_binary(&binary),
        canonical_text,
        canonical_binary_b64: base64::engine::general_purpose::STANDARD.encode(&binary),
    })
}

/// Canonicalizes a serializable record and encodes it.
///
/// Numbers follow JSON semantics (see [`canonicalize_json`]), so a record
/// hashes the same whether it arrives as a typed struct or as a parsed JSON
/// document. Use [`encode`] directly to keep integers as integers.
pub fn generate_cid<T: Serialize + ?Sized>(record: &T) -> Result<CidResult, CanonicalizationError> {
    encode(&canonicalize_json(record)?)
}
