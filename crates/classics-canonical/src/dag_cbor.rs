//! DAG-CBOR binary codec: the hash input for content identifiers.
//!
//! Encoding rules:
//! - integer, length and count heads use the shortest form
//! - every float is written as a 64-bit IEEE-754 value (`0xfb`)
//! - map keys are text, unique, sorted length-first then bytewise
//! - no tags, no byte strings, no indefinite lengths

use crate::canonicalizer::{validate, CanonicalizationError};
use crate::node::{canonical_key_order, sorted_entries, Node};
use std::cmp::Ordering;

const MAJOR_UNSIGNED: u8 = 0;
const MAJOR_NEGATIVE: u8 = 1;
const MAJOR_BYTES: u8 = 2;
const MAJOR_TEXT: u8 = 3;
const MAJOR_ARRAY: u8 = 4;
const MAJOR_MAP: u8 = 5;
const MAJOR_TAG: u8 = 6;
const MAJOR_SIMPLE: u8 = 7;

const FALSE: u8 = 0xf4;
const TRUE: u8 = 0xf5;
const NULL: u8 = 0xf6;
const FLOAT64: u8 = 0xfb;

/// Nesting limit applied when decoding untrusted bytes.
const MAX_DEPTH: usize = 128;

/// Encodes a node as canonical DAG-CBOR bytes.
///
/// # Errors
///
/// Returns [`CanonicalizationError`] when the node holds a non-finite float
/// or a map with duplicate keys.
pub fn encode(node: &Node) -> Result<Vec<u8>, CanonicalizationError> {
    validate(node)?;
    let mut out = Vec::new();
    write_node(node, &mut out);
    Ok(out)
}

fn write_head(major: u8, value: u64, out: &mut Vec<u8>) {
    let prefix = major << 5;
    if value < 24 {
        out.push(prefix | value as u8);
    } else if value <= u8::MAX as u64 {
        out.push(prefix | 24);
        out.push(value as u8);
    } else if value <= u16::MAX as u64 {
        out.push(prefix | 25);
        out.extend_from_slice(&(value as u16).to_be_bytes());
    } else if value <= u32::MAX as u64 {
        out.push(prefix | 26);
        out.extend_from_slice(&(value as u32).to_be_bytes());
    } else {
        out.push(prefix | 27);
        out.extend_from_slice(&value.to_be_bytes());
    }
}

fn write_text(s: &str, out: &mut Vec<u8>) {
    write_head(MAJOR_TEXT, s.len() as u64, out);
    out.extend_from_slice(s.as_bytes());
}

fn write_node(node: &Node, out: &mut Vec<u8>) {
    match node {
        Node::Null => out.push(NULL),
        Node::Bool(true) => out.push(TRUE),
        Node::Bool(false) => out.push(FALSE),
        Node::Int(v) if *v >= 0 => write_head(MAJOR_UNSIGNED, *v as u64, out),
        // -1 - v cannot overflow for any negative i64.
        Node::Int(v) => write_head(MAJOR_NEGATIVE, (-1 - *v) as u64, out),
        Node::Float(f) => {
            out.push(FLOAT64);
            out.extend_from_slice(&f.to_bits().to_be_bytes());
        }
        Node::Text(s) => write_text(s, out),
        Node::List(items) => {
            write_head(MAJOR_ARRAY, items.len() as u64, out);
            for item in items {
                write_node(item, out);
            }
        }
        Node::Map(entries) => {
            write_head(MAJOR_MAP, entries.len() as u64, out);
            for (key, value) in sorted_entries(entries) {
                write_text(key, out);
                write_node(value, out);
            }
        }
    }
}

/// Decodes canonical DAG-CBOR bytes back into a node.
///
/// Only the subset produced by [`encode`] is accepted; anything that could
/// not have come out of the encoder (non-minimal heads, unsorted keys,
/// trailing bytes, tags) is rejected as malformed.
pub fn decode(bytes: &[u8]) -> Result<Node, CanonicalizationError> {
    let mut reader = Reader { bytes, pos: 0 };
    let node = reader.read_node(0)?;
    if reader.pos != bytes.len() {
        return Err(malformed(format!(
            "{} trailing bytes at offset {}",
            bytes.len() - reader.pos,
            reader.pos
        )));
    }
    Ok(node)
}

fn malformed(reason: impl Into<String>) -> CanonicalizationError {
    CanonicalizationError::Malformed(reason.into())
}

struct Reader<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> Reader<'a> {
    fn take(&mut self, n: usize) -> Result<&'a [u8], CanonicalizationError> {
        let end = self
            .pos
            .checked_add(n)
            .filter(|end| *end <= self.bytes.len())
            .ok_or_else(|| malformed(format!("unexpected end of input at offset {}", self.pos)))?;
        let slice = &self.bytes[self.pos..end];
        self.pos = end;
        Ok(slice)
    }

    fn byte(&mut self) -> Result<u8, CanonicalizationError> {
        Ok(self.take(1)?[0])
    }

    /// Reads the argument of a head whose initial byte has already been consumed.
    fn argument(&mut self, info: u8) -> Result<u64, CanonicalizationError> {
        let offset = self.pos;
        let (value, minimum) = match info {
            0..=23 => return Ok(info as u64),
            24 => (self.byte()? as u64, 24),
            25 => {
                let b = self.take(2)?;
                (u16::from_be_bytes([b[0], b[1]]) as u64, u8::MAX as u64 + 1)
            }
            26 => {
                let b = self.take(4)?;
                (
                    u32::from_be_bytes([b[0], b[1], b[2], b[3]]) as u64,
                    u16::MAX as u64 + 1,
                )
            }
            27 => {
                let b = self.take(8)?;
                let mut buf = [0u8; 8];
                buf.copy_from_slice(b);
                (u64::from_be_bytes(buf), u32::MAX as u64 + 1)
            }
            _ => return Err(malformed(format!("indefinite or reserved length at offset {}", offset))),
        };
        if value < minimum {
            return Err(malformed(format!("non-minimal head at offset {}", offset)));
        }
        Ok(value)
    }

    fn length(&mut self, info: u8) -> Result<usize, CanonicalizationError> {
        let value = self.argument(info)?;
        let len = usize::try_from(value).map_err(|_| malformed("length overflows usize"))?;
        if len > self.bytes.len() - self.pos {
            return Err(malformed(format!("length {} exceeds remaining input", len)));
        }
        Ok(len)
    }

    fn text(&mut self, info: u8) -> Result<String, CanonicalizationError> {
        let len = self.length(info)?;
        let raw = self.take(len)?;
        std::str::from_utf8(raw)
            .map(str::to_string)
            .map_err(|e| malformed(format!("invalid UTF-8 text: {}", e)))
    }

    fn read_node(&mut self, depth: usize) -> Result<Node, CanonicalizationError> {
        if depth > MAX_DEPTH {
            return Err(malformed("nesting too deep"));
        }
        let offset = self.pos;
        let initial = self.byte()?;
        let major = initial >> 5;
        let info = initial & 0x1f;
        match major {
            MAJOR_UNSIGNED => {
                let v = self.argument(info)?;
                i64::try_from(v)
                    .map(Node::Int)
                    .map_err(|_| malformed(format!("integer {} out of i64 range", v)))
            }
            MAJOR_NEGATIVE => {
                let v = self.argument(info)?;
                i64::try_from(v)
                    .map(|n| Node::Int(-1 - n))
                    .map_err(|_| malformed(format!("negative integer -1-{} out of i64 range", v)))
            }
            MAJOR_TEXT => Ok(Node::Text(self.text(info)?)),
            MAJOR_ARRAY => {
                let len = self.length(info)?;
                let mut items = Vec::with_capacity(len);
                for _ in 0..len {
                    items.push(self.read_node(depth + 1)?);
                }
                Ok(Node::List(items))
            }
            MAJOR_MAP => {
                let len = self.length(info)?;
                let mut entries: Vec<(String, Node)> = Vec::with_capacity(len);
                for _ in 0..len {
                    let key_offset = self.pos;
                    let key_initial = self.byte()?;
                    if key_initial >> 5 != MAJOR_TEXT {
                        return Err(malformed(format!("non-text map key at offset {}", key_offset)));
                    }
                    let key = self.text(key_initial & 0x1f)?;
                    if let Some((prev, _)) = entries.last() {
                        if canonical_key_order(prev, &key) != Ordering::Less {
                            return Err(malformed(format!(
                                "map keys out of canonical order at offset {}",
                                key_offset
                            )));
                        }
                    }
                    let value = self.read_node(depth + 1)?;
                    entries.push((key, value));
                }
                Ok(Node::Map(entries))
            }
            MAJOR_BYTES => Err(malformed(format!("byte string at offset {}", offset))),
            MAJOR_TAG => Err(malformed(format!("tag at offset {}", offset))),
            MAJOR_SIMPLE => match initial {
                FALSE => Ok(Node::Bool(false)),
                TRUE => Ok(Node::Bool(true)),
                NULL => Ok(Node::Null),
                FLOAT64 => {
                    let b = self.take(8)?;
                    let mut buf = [0u8; 8];
                    buf.copy_from_slice(b);
                    let f = f64::from_bits(u64::from_be_bytes(buf));
                    if !f.is_finite() {
                        return Err(malformed(format!("non-finite float at offset {}", offset)));
                    }
                    Ok(Node::Float(f))
                }
                _ => Err(malformed(format!(
                    "unsupported simple value 0x{:02x} at offset {}",
                    initial, offset
                ))),
            },
            _ => Err(malformed(format!("unknown major type at offset {}", offset))),
        }
    }
}
