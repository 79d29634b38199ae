use serde::{Deserialize, Serialize};
use xpub_core::Currency;

use crate::error::ExplorerError;

/// Confirmed transactions Esplora returns per page.
pub const DEFAULT_PAGE_SIZE: usize = 25;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExplorerConfig {
    /// API root, without trailing slash, e.g. `https://blockstream.info/api`.
    pub base_url: String,
    #[serde(default = "default_page_size")]
    pub page_size: usize,
    /// Stop paging an address after this many transactions.
    #[serde(default)]
    pub max_transactions: Option<usize>,
}

fn default_page_size() -> usize {
    DEFAULT_PAGE_SIZE
}

impl ExplorerConfig {
    pub fn new(base_url: impl Into<String>) -> Result<Self, ExplorerError> {
        let base_url = base_url.into().trim().trim_end_matches('/').to_string();
        if !(base_url.starts_with("https://") || base_url.starts_with("http://")) {
            return Err(ExplorerError::InvalidBaseUrl(base_url));
        }
        Ok(Self {
            base_url,
            page_size: DEFAULT_PAGE_SIZE,
            max_transactions: None,
        })
    }

    /// Public Esplora instance for a currency, if one exists.
    pub fn default_base(currency: Currency, testnet: bool) -> Option<&'static str> {
        match (currency, testnet) {
            (Currency::Bitcoin, false) => Some("https://blockstream.info/api"),
            (Currency::Bitcoin, true) => Some("https://blockstream.info/testnet/api"),
            (Currency::Litecoin, false) => Some("https://litecoinspace.org/api"),
            (Currency::Litecoin, true) => Some("https://litecoinspace.org/testnet/api"),
            _ => None,
        }
    }

    pub fn for_currency(currency: Currency, testnet: bool) -> Result<Self, ExplorerError> {
        let base = Self::default_base(currency, testnet)
            .ok_or(ExplorerError::NoDefaultBase(currency))?;
        Self::new(base)
    }

    pub fn address_url(&self, address: &str) -> String {
        format!("{}/address/{}", self.base_url, address)
    }

    pub fn transactions_url(&self, address: &str, after_txid: Option<&str>) -> String {
        match after_txid {
            Some(txid) => format!("{}/address/{}/txs/chain/{}", self.base_url, address, txid),
            None => format!("{}/address/{}/txs", self.base_url, address),
        }
    }
}
