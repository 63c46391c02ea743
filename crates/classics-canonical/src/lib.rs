//! Canonical encoding and content addressing for anchored vehicle records.
//!
//! A record is lowered into a [`Node`] tree, rendered as DAG-JSON text and
//! DAG-CBOR binary, and identified by a CIDv1 over the binary form. The same
//! logical record always yields the same identifier, regardless of field
//! order or which process produced it.
//!
#![deny(missing_docs)]

/// RFC 4648 base32 alphabet helpers.
pub mod base32;
/// Serde bridge from records to canonical nodes.
pub mod canonicalizer;
/// Content identifiers and the encode pipeline.
pub mod cid;
/// DAG-CBOR binary codec.
pub mod dag_cbor;
/// DAG-JSON text codec.
pub mod dag_json;
/// Canonical data model.
pub mod node;
/// Validation errors for textual identifiers.
pub mod validation;

pub use canonicalizer::{canonicalize, canonicalize_json, CanonicalizationError};
pub use cid::{encode, generate_cid, Cid, CidError, CidResult};
pub use node::Node;
pub use validation::ValidationError;
