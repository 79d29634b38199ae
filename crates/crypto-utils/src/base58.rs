use crate::error::CryptoError;

/// Base58check-encode `payload` (a 4-byte double-SHA-256 checksum is appended).
pub fn encode_check(payload: &[u8]) -> String {
    bs58::encode(payload).with_check().into_string()
}

/// Decode a base58check string, verify its checksum and return the payload
/// without the checksum.
pub fn decode_check(encoded: &str) -> Result<Vec<u8>, CryptoError> {
    bs58::decode(encoded)
        .with_check(None)
        .into_vec()
        .map_err(|e| CryptoError::Base58(e.to_string()))
}

/// Encode a one-byte version prefix followed by a 20-byte hash, the layout of
/// every legacy P2PKH / P2SH address.
pub fn encode_versioned_hash(version: u8, hash: &[u8; 20]) -> String {
    let mut payload = [0u8; 21];
    payload[0] = version;
    payload[1..].copy_from_slice(hash);
    encode_check(&payload)
}
