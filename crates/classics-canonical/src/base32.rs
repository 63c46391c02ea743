//! RFC 4648 base32 without padding.
//!
//! CIDs use the lowercase alphabet behind the `b` multibase prefix; ledger
//! addresses and transaction ids use the uppercase one.

use crate::validation::ValidationError;

const LOWER: &[u8; 32] = b"abcdefghijklmnopqrstuvwxyz234567";
const UPPER: &[u8; 32] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ234567";

/// Alphabet case.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Case {
    /// `a-z2-7`
    Lower,
    /// `A-Z2-7`
    Upper,
}

impl Case {
    fn alphabet(self) -> &'static [u8; 32] {
        match self {
            Case::Lower => LOWER,
            Case::Upper => UPPER,
        }
    }
}

/// Encodes bytes without padding.
pub fn encode(data: &[u8], case: Case) -> String {
    let alphabet = case.alphabet();
    let mut out = String::with_capacity((data.len() * 8).div_ceil(5));
    let mut buffer: u16 = 0;
    let mut bits = 0u32;
    for &byte in data {
        buffer = (buffer << 8) | byte as u16;
        bits += 8;
        while bits >= 5 {
            bits -= 5;
            out.push(alphabet[((buffer >> bits) & 0x1f) as usize] as char);
        }
        buffer &= (1 << bits) - 1;
    }
    if bits > 0 {
        out.push(alphabet[((buffer << (5 - bits)) & 0x1f) as usize] as char);
    }
    out
}

/// Decodes unpadded input in the given case.
///
/// Rejects characters outside the alphabet and trailing bits that are not
/// zero, so every byte string has exactly one accepted encoding.
pub fn decode(text: &str, case: Case) -> Result<Vec<u8>, ValidationError> {
    let alphabet = case.alphabet();
    let mut out = Vec::with_capacity(text.len() * 5 / 8);
    let mut buffer: u32 = 0;
    let mut bits = 0u32;
    for c in text.bytes() {
        let value = alphabet
            .iter()
            .position(|&a| a == c)
            .ok_or_else(|| ValidationError::Encoding {
                field: "base32",
                reason: format!("invalid character {:?}", c as char),
            })?;
        buffer = (buffer << 5) | value as u32;
        bits += 5;
        if bits >= 8 {
            bits -= 8;
            out.push((buffer >> bits) as u8);
            buffer &= (1 << bits) - 1;
        }
    }
    if bits >= 5 || buffer != 0 {
        return Err(ValidationError::Encoding {
            field: "base32",
            reason: "non-canonical trailing bits".to_string(),
        });
    }
    Ok(out)
}
