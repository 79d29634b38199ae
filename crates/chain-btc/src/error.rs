use thiserror::Error;

/// Address encoding errors.
#[derive(Debug, Error)]
pub enum BtcError {
    #[error("invalid public key: {0}")]
    InvalidPublicKey(String),

    #[error("missing network parameter: {0}")]
    MissingNetworkParameter(String),

    #[error("encoding error: {0}")]
    EncodingError(String),

    #[error("taproot tweak out of range")]
    TweakOutOfRange,
}
