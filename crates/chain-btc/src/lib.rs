//! UTXO address encoders for Bitcoin and its derivatives.
//!
//! Provides P2PKH, P2SH-P2WPKH, P2WPKH and key-path P2TR encoders
//! parameterised by a [`network::NetworkParams`] set, which is enough to
//! cover Bitcoin, Litecoin, Dogecoin and the legacy Bitcoin Cash format.

pub mod address;
pub mod error;
pub mod network;
pub mod taproot;
