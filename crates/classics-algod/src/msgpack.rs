//! Canonical msgpack as accepted by algod.
//!
//! Map keys are sorted bytewise, zero values are omitted and every integer
//! takes its shortest form, so equal transactions always hash equally.

/// Msgpack value subset used by transactions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    /// Unsigned integer.
    Uint(u64),
    /// Boolean.
    Bool(bool),
    /// UTF-8 string.
    Str(String),
    /// Raw bytes.
    Bin(Vec<u8>),
    /// Public key address, encoded as 32 raw bytes.
    Addr([u8; 32]),
    /// String-keyed map.
    Map(Vec<(&'static str, Value)>),
}

impl Value {
    /// Zero values are left out of maps entirely.
    pub fn is_zero(&self) -> bool {
        match self {
            Value::Uint(v) => *v == 0,
            Value::Bool(b) => !*b,
            Value::Str(s) => s.is_empty(),
            Value::Bin(b) => b.is_empty(),
            Value::Addr(a) => a.iter().all(|&x| x == 0),
            Value::Map(entries) => entries.iter().all(|(_, v)| v.is_zero()),
        }
    }
}

/// Encodes a value canonically.
pub fn encode(value: &Value) -> Vec<u8> {
    let mut out = Vec::new();
    write_value(value, &mut out);
    out
}

fn write_value(value: &Value, out: &mut Vec<u8>) {
    match value {
        Value::Uint(v) => write_uint(*v, out),
        Value::Bool(b) => out.push(if *b { 0xc3 } else { 0xc2 }),
        Value::Str(s) => write_str(s, out),
        Value::Addr(a) => write_bin(a, out),
        Value::Bin(b) => write_bin(b, out),
        Value::Map(entries) => {
            let mut present: Vec<&(&'static str, Value)> =
                entries.iter().filter(|(_, v)| !v.is_zero()).collect();
            present.sort_by(|a, b| a.0.as_bytes().cmp(b.0.as_bytes()));
            let len = present.len();
            if len < 16 {
                out.push(0x80 | len as u8);
            } else {
                out.push(0xde);
                out.extend_from_slice(&(len as u16).to_be_bytes());
            }
            for (key, value) in present {
                write_str(key, out);
                write_value(value, out);
            }
        }
    }
}

fn write_bin(b: &[u8], out: &mut Vec<u8>) {
    let len = b.len();
    if len <= u8::MAX as usize {
        out.push(0xc4);
        out.push(len as u8);
    } else if len <= u16::MAX as usize {
        out.push(0xc5);
        out.extend_from_slice(&(len as u16).to_be_bytes());
    } else {
        out.push(0xc6);
        out.extend_from_slice(&(len as u32).to_be_bytes());
    }
    out.extend_from_slice(b);
}

fn write_uint(v: u64, out: &mut Vec<u8>) {
    if v < 0x80 {
        out.push(v as u8);
    } else if v <= u8::MAX as u64 {
        out.push(0xcc);
        out.push(v as u8);
    } else if v <= u16::MAX as u64 {
        out.push(0xcd);
        out.extend_from_slice(&(v as u16).to_be_bytes());
    } else if v <= u32::MAX as u64 {
        out.push(0xce);
        out.extend_from_slice(&(v as u32).to_be_bytes());
    } else {
        out.push(0xcf);
        out.extend_from_slice(&v.to_be_bytes());
    }
}

fn write_str(s: &str, out: &mut Vec<u8>) {
    let len = s.len();
    if len < 32 {
        out.push(0xa0 | len as u8);
    } else if len <= u8::MAX as usize {
        out.push(0xd9);
        out.push(len as u8);
    } else if len <= u16::MAX as usize {
        out.push(0xda);
        out.extend_from_slice(&(len as u16).to_be_bytes());
    } else {
        out.push(0xdb);
        out.extend_from_slice(&(len as u32).to_be_bytes());
    }
    out.extend_from_slice(s.as_bytes());
}
