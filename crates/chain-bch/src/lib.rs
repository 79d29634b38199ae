//! Bitcoin Cash support.
//!
//! Provides CashAddr encoding of P2PKH/P2SH hashes, the form Bitcoin Cash
//! explorers report next to the legacy base58 address.

pub mod cashaddr;
pub mod error;
