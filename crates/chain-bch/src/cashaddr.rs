use crypto_utils::hash::hash160;
use k256::PublicKey;

use crate::error::BchError;

const CHARSET: &[u8; 32] = b"qpzry9x8gf2tvdw0s3jn54khce6mua7l";

/// Hash type carried in the CashAddr version byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HashKind {
    PubKeyHash,
    ScriptHash,
}

impl HashKind {
    /// Version byte for a 160-bit hash: type bits `<< 3`, size bits 0.
    fn version_byte(self) -> u8 {
        match self {
            HashKind::PubKeyHash => 0,
            HashKind::ScriptHash => 8,
        }
    }
}

/// BCH polymod over 5-bit groups (40-bit checksum).
fn polymod(values: &[u8]) -> u64 {
    const GENERATORS: [u64; 5] = [
        0x98f2bc8e61,
        0x79b76d99e2,
        0xf33e5fb3c4,
        0xae2eabe2a8,
        0x1e4f43e470,
    ];

    let mut c: u64 = 1;
    for &d in values {
        let c0 = (c >> 35) as u8;
        c = ((c & 0x07_ffff_ffff) << 5) ^ u64::from(d);
        for (i, generator) in GENERATORS.iter().enumerate() {
            if (c0 >> i) & 1 == 1 {
                c ^= generator;
            }
        }
    }
    c ^ 1
}

/// Regroup 8-bit bytes into 5-bit groups, zero-padding the tail.
fn to_five_bit(data: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity((data.len() * 8).div_ceil(5));
    let mut acc: u32 = 0;
    let mut bits = 0;
    for &byte in data {
        acc = (acc << 8) | u32::from(byte);
        bits += 8;
        while bits >= 5 {
            bits -= 5;
            out.push(((acc >> bits) & 0x1f) as u8);
        }
    }
    if bits > 0 {
        out.push(((acc << (5 - bits)) & 0x1f) as u8);
    }
    out
}

fn validate_prefix(prefix: &str) -> Result<(), BchError> {
    let valid = !prefix.is_empty()
        && prefix
            .bytes()
            .all(|b| b.is_ascii_lowercase() || b.is_ascii_digit());
    if valid {
        Ok(())
    } else {
        Err(BchError::InvalidPrefix(prefix.to_string()))
    }
}

/// Encode a 20-byte hash as `prefix:payload`.
pub fn encode(prefix: &str, kind: HashKind, hash: &[u8; 20]) -> Result<String, BchError> {
    validate_prefix(prefix)?;

    let mut versioned = [0u8; 21];
    versioned[0] = kind.version_byte();
    versioned[1..].copy_from_slice(hash);
    let payload = to_five_bit(&versioned);

    let mut checksum_input: Vec<u8> = prefix.bytes().map(|b| b & 0x1f).collect();
    checksum_input.push(0);
    checksum_input.extend_from_slice(&payload);
    checksum_input.extend_from_slice(&[0u8; 8]);
    let checksum = polymod(&checksum_input);

    let mut out = String::with_capacity(prefix.len() + 1 + payload.len() + 8);
    out.push_str(prefix);
    out.push(':');
    for &group in &payload {
        out.push(CHARSET[group as usize] as char);
    }
    for i in 0..8 {
        let group = (checksum >> (5 * (7 - i))) & 0x1f;
        out.push(CHARSET[group as usize] as char);
    }
    Ok(out)
}

/// Derive a P2PKH CashAddr from a 33-byte compressed public key.
pub fn pubkey_to_cashaddr(pubkey_bytes: &[u8; 33], prefix: &str) -> Result<String, BchError> {
    if pubkey_bytes[0] != 0x02 && pubkey_bytes[0] != 0x03 {
        return Err(BchError::InvalidPublicKey(
            "compressed key must start with 0x02 or 0x03".into(),
        ));
    }
    PublicKey::from_sec1_bytes(pubkey_bytes)
        .map_err(|e| BchError::InvalidPublicKey(e.to_string()))?;

    encode(prefix, HashKind::PubKeyHash, &hash160(pubkey_bytes))
}
