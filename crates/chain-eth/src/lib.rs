//! Ethereum address derivation from secp256k1 public keys.
//!
//! Addresses are emitted in lowercase hex without an EIP-55 checksum so they
//! compare byte-for-byte with what block explorers return.

pub mod address;
pub mod error;
