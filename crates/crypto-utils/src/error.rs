use thiserror::Error;

/// Hashing and encoding errors.
#[derive(Debug, Error)]
pub enum CryptoError {
    #[error("base58 decoding failed: {0}")]
    Base58(String),

    #[error("invalid mac key: {0}")]
    InvalidMacKey(String),
}
