use thiserror::Error;

use crate::provider::ProviderError;

#[derive(Debug, Error)]
pub enum XpubError {
    #[error("Invalid extended key: {0}")]
    InvalidExtendedKey(String),

    #[error("Unsupported address: {0}")]
    UnsupportedAddress(String),

    #[error("Key derivation failed: {0}")]
    DerivationFailed(String),

    #[error("Address encoding failed: {0}")]
    AddressEncoding(String),

    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

impl From<crypto_utils::error::CryptoError> for XpubError {
    fn from(e: crypto_utils::error::CryptoError) -> Self {
        use crypto_utils::error::CryptoError;
        match e {
            CryptoError::InvalidMacKey(_) => XpubError::DerivationFailed(e.to_string()),
            CryptoError::Base58(_) => XpubError::InvalidExtendedKey(e.to_string()),
        }
    }
}

impl From<chain_btc::error::BtcError> for XpubError {
    fn from(e: chain_btc::error::BtcError) -> Self {
        use chain_btc::error::BtcError;
        match e {
            // Only reachable with a derived key whose tweaked point is invalid.
            BtcError::TweakOutOfRange => XpubError::DerivationFailed(format!("BTC: {e}")),
            _ => XpubError::AddressEncoding(format!("BTC: {e}")),
        }
    }
}

impl From<chain_bch::error::BchError> for XpubError {
    fn from(e: chain_bch::error::BchError) -> Self {
        XpubError::AddressEncoding(format!("BCH: {e}"))
    }
}

impl From<chain_eth::error::EthError> for XpubError {
    fn from(e: chain_eth::error::EthError) -> Self {
        XpubError::AddressEncoding(format!("ETH: {e}"))
    }
}
