//! # crypto-utils
//!
//! Hash primitives and base58check encoding shared by the address encoders
//! and the extended-key codec.

pub mod base58;
pub mod error;
pub mod hash;

pub use error::CryptoError;
