//! Extended public key decoding (BIP-32 serialization format).
//!
//! Layout of the 78-byte payload:
//!
//! | bytes | field              |
//! |-------|--------------------|
//! | 4     | version            |
//! | 1     | depth              |
//! | 4     | parent fingerprint |
//! | 4     | child number       |
//! | 32    | chain code         |
//! | 33    | compressed key     |

use std::fmt;
use std::str::FromStr;

use crypto_utils::base58;
use k256::PublicKey;

use crate::error::XpubError;
use crate::types::Currency;

const PAYLOAD_LEN: usize = 78;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtendedPublicKey {
    pub version: [u8; 4],
    pub depth: u8,
    pub parent_fingerprint: [u8; 4],
    pub child_number: u32,
    pub chain_code: [u8; 32],
    pub public_key: [u8; 33],
}

impl ExtendedPublicKey {
    /// Decode an xpub-family string, verifying its checksum, length and key.
    pub fn decode(encoded: &str) -> Result<Self, XpubError> {
        let raw = base58::decode_check(encoded.trim())?;
        if raw.len() != PAYLOAD_LEN {
            return Err(XpubError::InvalidExtendedKey(format!(
                "expected {PAYLOAD_LEN} bytes, got {}",
                raw.len()
            )));
        }

        let mut version = [0u8; 4];
        version.copy_from_slice(&raw[0..4]);
        let depth = raw[4];
        let mut parent_fingerprint = [0u8; 4];
        parent_fingerprint.copy_from_slice(&raw[5..9]);
        let mut child_number = [0u8; 4];
        child_number.copy_from_slice(&raw[9..13]);
        let mut chain_code = [0u8; 32];
        chain_code.copy_from_slice(&raw[13..45]);
        let mut public_key = [0u8; 33];
        public_key.copy_from_slice(&raw[45..78]);

        if public_key[0] != 0x02 && public_key[0] != 0x03 {
            return Err(XpubError::InvalidExtendedKey(format!(
                "key prefix 0x{:02x} is not a compressed public key",
                public_key[0]
            )));
        }
        PublicKey::from_sec1_bytes(&public_key).map_err(|e| {
            XpubError::InvalidExtendedKey(format!("key is not on secp256k1: {e}"))
        })?;

        Ok(Self {
            version,
            depth,
            parent_fingerprint,
            child_number: u32::from_be_bytes(child_number),
            chain_code,
            public_key,
        })
    }

    /// Re-serialize to the base58check string form.
    pub fn encode(&self) -> String {
        let mut raw = Vec::with_capacity(PAYLOAD_LEN);
        raw.extend_from_slice(&self.version);
        raw.push(self.depth);
        raw.extend_from_slice(&self.parent_fingerprint);
        raw.extend_from_slice(&self.child_number.to_be_bytes());
        raw.extend_from_slice(&self.chain_code);
        raw.extend_from_slice(&self.public_key);
        base58::encode_check(&raw)
    }

    /// Currency and testnet flag implied by the version bytes, if known.
    pub fn currency(&self) -> Option<(Currency, bool)> {
        Currency::from_extended_key_version(self.version)
    }
}

impl FromStr for ExtendedPublicKey {
    type Err = XpubError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::decode(s)
    }
}

impl fmt::Display for ExtendedPublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.encode())
    }
}
