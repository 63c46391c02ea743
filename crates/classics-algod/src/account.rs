//! Custodial signing account.

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use classics_canonical::base32::{self, Case};
use ed25519_dalek::{Keypair, PublicKey, SecretKey, Signer as _};
use sha2::{Digest as _, Sha512_256};
use std::fmt;
use std::str::FromStr;

use crate::errors::AlgodError;

const CHECKSUM_LEN: usize = 4;

/// Algorand account address: an ed25519 public key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Address(pub [u8; 32]);

impl Address {
    /// Raw public key bytes.
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    fn checksum(&self) -> [u8; CHECKSUM_LEN] {
        let digest = Sha512_256::digest(self.0);
        let mut checksum = [0u8; CHECKSUM_LEN];
        checksum.copy_from_slice(&digest[digest.len() - CHECKSUM_LEN..]);
        checksum
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut raw = Vec::with_capacity(32 + CHECKSUM_LEN);
        raw.extend_from_slice(&self.0);
        raw.extend_from_slice(&self.checksum());
        f.write_str(&base32::encode(&raw, Case::Upper))
    }
}

impl FromStr for Address {
    type Err = AlgodError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let raw = base32::decode(s, Case::Upper).map_err(|e| AlgodError::Key(e.to_string()))?;
        if raw.len() != 32 + CHECKSUM_LEN {
            return Err(AlgodError::Key(format!("address {} has wrong length", s)));
        }
        let mut key = [0u8; 32];
        key.copy_from_slice(&raw[..32]);
        let address = Address(key);
        if address.checksum()[..] != raw[32..] {
            return Err(AlgodError::Key(format!("address {} has bad checksum", s)));
        }
        Ok(address)
    }
}

/// Signing key of the single custodial account.
pub struct Signer {
    keypair: Keypair,
    address: Address,
}

impl Signer {
    /// Builds a signer from a 32-byte ed25519 seed.
    pub fn from_seed(seed: &[u8]) -> Result<Self, AlgodError> {
        let secret = SecretKey::from_bytes(seed)
            .map_err(|e| AlgodError::Key(format!("invalid signing seed: {e}")))?;
        let public = PublicKey::from(&secret);
        let address = Address(public.to_bytes());
        Ok(Self {
            keypair: Keypair { secret, public },
            address,
        })
    }

    /// Builds a signer from a standard base64 seed.
    pub fn from_seed_b64(seed_b64: &str) -> Result<Self, AlgodError> {
        let seed = STANDARD
            .decode(seed_b64.trim().as_bytes())
            .map_err(|e| AlgodError::Key(format!("invalid signing seed encoding: {e}")))?;
        Self::from_seed(&seed)
    }

    /// Account address.
    pub fn address(&self) -> Address {
        self.address
    }

    /// Signs `message` and returns the raw signature.
    pub fn sign(&self, message: &[u8]) -> [u8; 64] {
        self.keypair.sign(message).to_bytes()
    }
}

impl fmt::Debug for Signer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Signer")
            .field("address", &self.address.to_string())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_key_address() {
        assert_eq!(
            Address([0; 32]).to_string(),
            "AAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAY5HFKQ"
        );
    }

    #[test]
    fn address_parse_checks_checksum() {
        let text = "AAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAY5HFKQ";
        assert_eq!(text.parse::<Address>().unwrap(), Address([0; 32]));
        assert!("AAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAY5HFKA"
            .parse::<Address>()
            .is_err());
    }

    #[test]
    fn debug_does_not_leak_secret() {
        let signer = Signer::from_seed(&[7u8; 32]).unwrap();
        let rendered = format!("{:?}", signer);
        assert!(rendered.contains(&signer.address().to_string()));
        assert!(!rendered.contains("secret"));
    }

    #[test]
    fn rejects_short_seed() {
        assert!(Signer::from_seed(&[1u8; 16]).is_err());
    }
}
