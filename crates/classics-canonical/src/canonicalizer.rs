use serde::ser::{self, Serialize};
use std::collections::HashSet;
use std::fmt;

use crate::node::Node;

/// Error returned when a value cannot be mapped onto the canonical node model.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum CanonicalizationError {
    /// A value with no canonical mapping (byte strings, out-of-range integers,
    /// non-string map keys).
    #[error("unsupported value at {}: {}", display_path(.path), .kind)]
    Unsupported {
        /// Dotted location of the value; empty for the root.
        path: String,
        /// Description of the offending value.
        kind: String,
    },
    /// Non-finite number (NaN/Infinity) detected.
    #[error("non-finite number detected at {0}")]
    NonFiniteNumber(String),
    /// The same key appears twice in one map.
    #[error("duplicate key detected at {0}")]
    DuplicateKey(String),
    /// Canonical binary could not be decoded back into a node.
    #[error("malformed canonical binary: {0}")]
    Malformed(String),
    /// Error raised by a `Serialize` implementation.
    #[error("{0}")]
    Custom(String),
}

impl CanonicalizationError {
    fn unsupported(kind: impl Into<String>) -> Self {
        CanonicalizationError::Unsupported {
            path: String::new(),
            kind: kind.into(),
        }
    }

    /// Prefixes the error location with an enclosing field or index.
    fn nested(self, segment: &str) -> Self {
        match self {
            CanonicalizationError::Unsupported { path, kind } => {
                let path = if path.is_empty() {
                    segment.to_string()
                } else {
                    format!("{}.{}", segment, path)
                };
                CanonicalizationError::Unsupported { path, kind }
            }
            other => other,
        }
    }
}

fn display_path(path: &str) -> &str {
    if path.is_empty() {
        "root"
    } else {
        path
    }
}

impl ser::Error for CanonicalizationError {
    fn custom<T: fmt::Display>(msg: T) -> Self {
        CanonicalizationError::Custom(msg.to_string())
    }
}

/// Helper for building paths during validation.
#[derive(Debug, Clone)]
struct Path {
    segments: Vec<String>,
}

impl Path {
    fn root() -> Self {
        Self {
            segments: Vec::new(),
        }
    }

    fn push_field(&self, field: &str) -> Self {
        let mut segments = self.segments.clone();
        segments.push(field.to_string());
        Self { segments }
    }

    fn push_index(&self, index: usize) -> Self {
        let mut segments = self.segments.clone();
        segments.push(format!("[{}]", index));
        Self { segments }
    }
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.segments.is_empty() {
            write!(f, "root")
        } else {
            write!(f, "{}", self.segments.join("."))
        }
    }
}

/// Converts any serializable record into a canonical node tree.
///
/// Struct fields become map entries under their serialized name. Fields marked
/// `#[serde(skip)]` are never visited and `Option` fields declared with
/// `skip_serializing_if = "Option::is_none"` disappear entirely instead of
/// becoming `Null`.
///
/// # Errors
///
/// Returns [`CanonicalizationError`] for values without a canonical mapping
/// and for non-finite floats.
pub fn canonicalize<T: Serialize + ?Sized>(record: &T) -> Result<Node, CanonicalizationError> {
    let node = record.serialize(NodeSerializer)?;
    validate(&node)?;
    Ok(node)
}

/// Largest magnitude up to which every integer has an exact 64-bit float form.
const MAX_EXACT_FLOAT_INT: i64 = 1 << 53;

/// Canonicalizes a record with JSON number semantics.
///
/// A JSON document model has a single number type, so every integer in the
/// tree is lowered to a 64-bit float. `{"year": 2010}` and `{"year": 2010.0}`
/// therefore canonicalize identically.
///
/// # Errors
///
/// Everything [`canonicalize`] rejects, plus integers beyond ±2^53, which
/// would change value on the way to a float.
pub fn canonicalize_json<T: Serialize + ?Sized>(
    record: &T,
) -> Result<Node, CanonicalizationError> {
    lower_numbers(canonicalize(record)?, &Path::root())
}

fn lower_numbers(node: Node, path: &Path) -> Result<Node, CanonicalizationError> {
    match node {
        Node::Int(v) if (-MAX_EXACT_FLOAT_INT..=MAX_EXACT_FLOAT_INT).contains(&v) => {
            Ok(Node::Float(v as f64))
        }
        Node::Int(v) => Err(CanonicalizationError::Unsupported {
            path: path.segments.join("."),
            kind: format!("integer {} has no exact 64-bit float form", v),
        }),
        Node::List(items) => items
            .into_iter()
            .enumerate()
            .map(|(idx, item)| lower_numbers(item, &path.push_index(idx)))
            .collect::<Result<Vec<_>, _>>()
            .map(Node::List),
        Node::Map(entries) => entries
            .into_iter()
            .map(|(key, value)| {
                lower_numbers(value, &path.push_field(&key)).map(|value| (key, value))
            })
            .collect::<Result<Vec<_>, _>>()
            .map(Node::Map),
        other => Ok(other),
    }
}

/// Checks that a node tree can be encoded: finite floats, unique map keys.
pub fn validate(node: &Node) -> Result<(), CanonicalizationError> {
    validate_at(node, Path::root())
}

fn validate_at(node: &Node, path: Path) -> Result<(), CanonicalizationError> {
    match node {
        Node::Map(entries) => {
            let mut seen = HashSet::with_capacity(entries.len());
            for (key, child) in entries {
                let child_path = path.push_field(key);
                if !seen.insert(key.as_str()) {
                    return Err(CanonicalizationError::DuplicateKey(child_path.to_string()));
                }
                validate_at(child, child_path)?;
            }
            Ok(())
        }
        Node::List(items) => {
            for (idx, item) in items.iter().enumerate() {
                validate_at(item, path.push_index(idx))?;
            }
            Ok(())
        }
        Node::Float(f) if !f.is_finite() => {
            Err(CanonicalizationError::NonFiniteNumber(path.to_string()))
        }
        _ => Ok(()),
    }
}

/// Serde serializer whose output is a [`Node`].
pub(crate) struct NodeSerializer;

impl ser::Serializer for NodeSerializer {
    type Ok = Node;
    type Error = CanonicalizationError;

    type SerializeSeq = SeqBuilder;
    type SerializeTuple = SeqBuilder;
    type SerializeTupleStruct = SeqBuilder;
    type SerializeTupleVariant = VariantSeqBuilder;
    type SerializeMap = MapBuilder;
    type SerializeStruct = MapBuilder;
    type SerializeStructVariant = VariantMapBuilder;

    fn serialize_bool(self, v: bool) -> Result<Node, Self::Error> {
        Ok(Node::Bool(v))
    }

    fn serialize_i8(self, v: i8) -> Result<Node, Self::Error> {
        Ok(Node::Int(v.into()))
    }

    fn serialize_i16(self, v: i16) -> Result<Node, Self::Error> {
        Ok(Node::Int(v.into()))
    }

    fn serialize_i32(self, v: i32) -> Result<Node, Self::Error> {
        Ok(Node::Int(v.into()))
    }

    fn serialize_i64(self, v: i64) -> Result<Node, Self::Error> {
        Ok(Node::Int(v))
    }

    fn serialize_i128(self, v: i128) -> Result<Node, Self::Error> {
        i64::try_from(v)
            .map(Node::Int)
            .map_err(|_| CanonicalizationError::unsupported(format!("integer {} out of i64 range", v)))
    }

    fn serialize_u8(self, v: u8) -> Result<Node, Self::Error> {
        Ok(Node::Int(v.into()))
    }

    fn serialize_u16(self, v: u16) -> Result<Node, Self::Error> {
        Ok(Node::Int(v.into()))
    }

    fn serialize_u32(self, v: u32) -> Result<Node, Self::Error> {
        Ok(Node::Int(v.into()))
    }

    fn serialize_u64(self, v: u64) -> Result<Node, Self::Error> {
        i64::try_from(v)
            .map(Node::Int)
            .map_err(|_| CanonicalizationError::unsupported(format!("integer {} out of i64 range", v)))
    }

    fn serialize_u128(self, v: u128) -> Result<Node, Self::Error> {
        i64::try_from(v)
            .map(Node::Int)
            .map_err(|_| CanonicalizationError::unsupported(format!("integer {} out of i64 range", v)))
    }

    fn serialize_f32(self, v: f32) -> Result<Node, Self::Error> {
        Ok(Node::Float(v.into()))
    }

    fn serialize_f64(self, v: f64) -> Result<Node, Self::Error> {
        Ok(Node::Float(v))
    }

    fn serialize_char(self, v: char) -> Result<Node, Self::Error> {
        Ok(Node::Text(v.to_string()))
    }

    fn serialize_str(self, v: &str) -> Result<Node, Self::Error> {
        Ok(Node::Text(v.to_string()))
    }

    fn serialize_bytes(self, v: &[u8]) -> Result<Node, Self::Error> {
        Err(CanonicalizationError::unsupported(format!(
            "byte string ({} bytes)",
            v.len()
        )))
    }

    fn serialize_none(self) -> Result<Node, Self::Error> {
        Ok(Node::Null)
    }

    fn serialize_some<T: Serialize + ?Sized>(self, value: &T) -> Result<Node, Self::Error> {
        value.serialize(self)
    }

    fn serialize_unit(self) -> Result<Node, Self::Error> {
        Ok(Node::Null)
    }

    fn serialize_unit_struct(self, _name: &'static str) -> Result<Node, Self::Error> {
        Ok(Node::Null)
    }

    fn serialize_unit_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
    ) -> Result<Node, Self::Error> {
        Ok(Node::Text(variant.to_string()))
    }

    fn serialize_newtype_struct<T: Serialize + ?Sized>(
        self,
        _name: &'static str,
        value: &T,
    ) -> Result<Node, Self::Error> {
        value.serialize(self)
    }

    fn serialize_newtype_variant<T: Serialize + ?Sized>(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
        value: &T,
    ) -> Result<Node, Self::Error> {
        let inner = value
            .serialize(NodeSerializer)
            .map_err(|e| e.nested(variant))?;
        Ok(Node::Map(vec![(variant.to_string(), inner)]))
    }

    fn serialize_seq(self, len: Option<usize>) -> Result<Self::SerializeSeq, Self::Error> {
        Ok(SeqBuilder {
            items: Vec::with_capacity(len.unwrap_or(0)),
        })
    }

    fn serialize_tuple(self, len: usize) -> Result<Self::SerializeTuple, Self::Error> {
        self.serialize_seq(Some(len))
    }

    fn serialize_tuple_struct(
        self,
        _name: &'static str,
        len: usize,
    ) -> Result<Self::SerializeTupleStruct, Self::Error> {
        self.serialize_seq(Some(len))
    }

    fn serialize_tuple_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
        len: usize,
    ) -> Result<Self::SerializeTupleVariant, Self::Error> {
        Ok(VariantSeqBuilder {
            variant,
            seq: SeqBuilder {
                items: Vec::with_capacity(len),
            },
        })
    }

    fn serialize_map(self, len: Option<usize>) -> Result<Self::SerializeMap, Self::Error> {
        Ok(MapBuilder {
            entries: Vec::with_capacity(len.unwrap_or(0)),
            pending_key: None,
        })
    }

    fn serialize_struct(
        self,
        _name: &'static str,
        len: usize,
    ) -> Result<Self::SerializeStruct, Self::Error> {
        self.serialize_map(Some(len))
    }

    fn serialize_struct_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
        len: usize,
    ) -> Result<Self::SerializeStructVariant, Self::Error> {
        Ok(VariantMapBuilder {
            variant,
            map: MapBuilder {
                entries: Vec::with_capacity(len),
                pending_key: None,
            },
        })
    }
}

pub(crate) struct SeqBuilder {
    items: Vec<Node>,
}

impl SeqBuilder {
    fn push<T: Serialize + ?Sized>(&mut self, value: &T) -> Result<(), CanonicalizationError> {
        let index = self.items.len();
        let node = value
            .serialize(NodeSerializer)
            .map_err(|e| e.nested(&format!("[{}]", index)))?;
        self.items.push(node);
        Ok(())
    }
}

impl ser::SerializeSeq for SeqBuilder {
    type Ok = Node;
    type Error = CanonicalizationError;

    fn serialize_element<T: Serialize + ?Sized>(&mut self, value: &T) -> Result<(), Self::Error> {
        self.push(value)
    }

    fn end(self) -> Result<Node, Self::Error> {
        Ok(Node::List(self.items))
    }
}

impl ser::SerializeTuple for SeqBuilder {
    type Ok = Node;
    type Error = CanonicalizationError;

    fn serialize_element<T: Serialize + ?Sized>(&mut self, value: &T) -> Result<(), Self::Error> {
        self.push(value)
    }

    fn end(self) -> Result<Node, Self::Error> {
        Ok(Node::List(self.items))
    }
}

impl ser::SerializeTupleStruct for SeqBuilder {
    type Ok = Node;
    type Error = CanonicalizationError;

    fn serialize_field<T: Serialize + ?Sized>(&mut self, value: &T) -> Result<(), Self::Error> {
        self.push(value)
    }

    fn end(self) -> Result<Node, Self::Error> {
        Ok(Node::List(self.items))
    }
}

pub(crate) struct VariantSeqBuilder {
    variant: &'static str,
    seq: SeqBuilder,
}

impl ser::SerializeTupleVariant for VariantSeqBuilder {
    type Ok = Node;
    type Error = CanonicalizationError;

    fn serialize_field<T: Serialize + ?Sized>(&mut self, value: &T) -> Result<(), Self::Error> {
        let variant = self.variant;
        self.seq.push(value).map_err(|e| e.nested(variant))
    }

    fn end(self) -> Result<Node, Self::Error> {
        Ok(Node::Map(vec![(
            self.variant.to_string(),
            Node::List(self.seq.items),
        )]))
    }
}

pub(crate) struct MapBuilder {
    entries: Vec<(String, Node)>,
    pending_key: Option<String>,
}

impl MapBuilder {
    fn insert<T: Serialize + ?Sized>(
        &mut self,
        key: String,
        value: &T,
    ) -> Result<(), CanonicalizationError> {
        let node = value
            .serialize(NodeSerializer)
            .map_err(|e| e.nested(&key))?;
        self.entries.push((key, node));
        Ok(())
    }
}

impl ser::SerializeMap for MapBuilder {
    type Ok = Node;
    type Error = CanonicalizationError;

    fn serialize_key<T: Serialize + ?Sized>(&mut self, key: &T) -> Result<(), Self::Error> {
        match key.serialize(NodeSerializer)? {
            Node::Text(s) => {
                self.pending_key = Some(s);
                Ok(())
            }
            other => Err(CanonicalizationError::unsupported(format!(
                "{} map key",
                other.kind()
            ))),
        }
    }

    fn serialize_value<T: Serialize + ?Sized>(&mut self, value: &T) -> Result<(), Self::Error> {
        let key = self
            .pending_key
            .take()
            .ok_or_else(|| CanonicalizationError::Custom("map value without key".to_string()))?;
        self.insert(key, value)
    }

    fn end(self) -> Result<Node, Self::Error> {
        Ok(Node::Map(self.entries))
    }
}

impl ser::SerializeStruct for MapBuilder {
    type Ok = Node;
    type Error = CanonicalizationError;

    fn serialize_field<T: Serialize + ?Sized>(
        &mut self,
        key: &'static str,
        value: &T,
    ) -> Result<(), Self::Error> {
        self.insert(key.to_string(), value)
    }

    fn end(self) -> Result<Node, Self::Error> {
        Ok(Node::Map(self.entries))
    }
}

pub(crate) struct VariantMapBuilder {
    variant: &'static str,
    map: MapBuilder,
}

impl ser::SerializeStructVariant for VariantMapBuilder {
    type Ok = Node;
    type Error = CanonicalizationError;

    fn serialize_field<T: Serialize + ?Sized>(
        &mut self,
        key: &'static str,
        value: &T,
    ) -> Result<(), Self::Error> {
        let variant = self.variant;
        self.map
            .insert(key.to_string(), value)
            .map_err(|e| e.nested(variant))
    }

    fn end(self) -> Result<Node, Self::Error> {
        Ok(Node::Map(vec![(
            self.variant.to_string(),
            Node::Map(self.map.entries),
        )]))
    }
}
