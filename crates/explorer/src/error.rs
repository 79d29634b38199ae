use thiserror::Error;
use xpub_core::Currency;

#[derive(Debug, Error)]
pub enum ExplorerError {
    #[error("No default explorer for {0}")]
    NoDefaultBase(Currency),

    #[error("Invalid base URL: {0}")]
    InvalidBaseUrl(String),

    #[error("HTTP client error: {0}")]
    Client(#[from] reqwest::Error),
}
