use thiserror::Error;

/// CashAddr encoding errors.
#[derive(Debug, Error)]
pub enum BchError {
    #[error("invalid public key: {0}")]
    InvalidPublicKey(String),

    #[error("invalid prefix: {0}")]
    InvalidPrefix(String),
}
