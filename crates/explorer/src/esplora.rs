//! Esplora REST client (Blockstream / litecoinspace compatible).
//!
//! - `GET /address/{a}` for chain stats
//! - `GET /address/{a}/txs` for mempool plus the first confirmed page
//! - `GET /address/{a}/txs/chain/{last_txid}` for the following pages

use std::time::{SystemTime, UNIX_EPOCH};

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::{debug, trace};
use xpub_core::{AddressStats, Provider, ProviderError, Transaction, TxIo};

use crate::config::ExplorerConfig;
use crate::error::ExplorerError;

// ============================================================================
// Response types
// ============================================================================

#[derive(Debug, Clone, Deserialize)]
pub struct AddressInfo {
    pub chain_stats: ChainStats,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ChainStats {
    pub funded_txo_sum: u64,
    pub spent_txo_sum: u64,
    pub tx_count: u64,
}

impl AddressInfo {
    pub fn to_stats(&self) -> AddressStats {
        let funded = u128::from(self.chain_stats.funded_txo_sum);
        let spent = u128::from(self.chain_stats.spent_txo_sum);
        AddressStats {
            tx_count: self.chain_stats.tx_count,
            funded_sum: funded,
            spent_sum: spent,
            balance: funded.saturating_sub(spent),
            raw_transactions: None,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct EsploraTx {
    pub txid: String,
    pub vin: Vec<Vin>,
    pub vout: Vec<Output>,
    #[serde(default)]
    pub status: TxStatus,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Vin {
    /// `None` for coinbase inputs.
    #[serde(default)]
    pub prevout: Option<Output>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Output {
    /// Absent for OP_RETURN and non-standard scripts.
    #[serde(default)]
    pub scriptpubkey_address: Option<String>,
    pub value: u64,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct TxStatus {
    pub confirmed: bool,
    #[serde(default)]
    pub block_height: Option<u64>,
    #[serde(default)]
    pub block_time: Option<u64>,
}

impl Output {
    fn to_io(&self) -> Option<TxIo> {
        self.scriptpubkey_address.as_ref().map(|address| TxIo {
            address: address.clone(),
            value: u128::from(self.value),
        })
    }
}

impl EsploraTx {
    /// Normalize into a provider transaction. Mempool entries carry `seen_at`.
    pub fn into_transaction(self, seen_at: u64) -> Transaction {
        let ins = self
            .vin
            .iter()
            .filter_map(|vin| vin.prevout.as_ref().and_then(Output::to_io))
            .collect();
        let outs = self.vout.iter().filter_map(Output::to_io).collect();
        let (block_height, time) = if self.status.confirmed {
            (self.status.block_height, self.status.block_time.unwrap_or(seen_at))
        } else {
            (None, seen_at)
        };
        Transaction {
            txid: self.txid,
            block_height,
            time,
            ins,
            outs,
        }
    }
}

fn parse<T: DeserializeOwned>(body: &str) -> Result<T, ProviderError> {
    serde_json::from_str(body).map_err(|e| ProviderError::InvalidResponse(e.to_string()))
}

fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or_default()
}

// ============================================================================
// Provider
// ============================================================================

/// Esplora-backed [`Provider`]. Stats of an active address come back with
/// its transactions, so the scanner does not request them a second time.
pub struct EsploraProvider {
    config: ExplorerConfig,
    client: reqwest::Client,
}

impl EsploraProvider {
    pub fn new(config: ExplorerConfig) -> Result<Self, ExplorerError> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("xpub-scan/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self { config, client })
    }

    pub fn config(&self) -> &ExplorerConfig {
        &self.config
    }

    async fn get_text(&self, url: &str) -> Result<String, ProviderError> {
        trace!(%url, "GET");
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| ProviderError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(ProviderError::Http {
                status: status.as_u16(),
                message,
            });
        }

        response
            .text()
            .await
            .map_err(|e| ProviderError::Transport(e.to_string()))
    }

    async fn fetch_address_info(&self, address: &str) -> Result<AddressInfo, ProviderError> {
        let body = self.get_text(&self.config.address_url(address)).await?;
        parse(&body)
    }

    async fn fetch_all_transactions(
        &self,
        address: &str,
    ) -> Result<Vec<Transaction>, ProviderError> {
        let seen_at = unix_now();
        let limit = self.config.max_transactions.unwrap_or(usize::MAX);
        let page_size = self.config.page_size.max(1);

        let body = self.get_text(&self.config.transactions_url(address, None)).await?;
        let first: Vec<EsploraTx> = parse(&body)?;
        let mut confirmed_in_page = first.iter().filter(|tx| tx.status.confirmed).count();
        let mut last_confirmed = first
            .iter()
            .rev()
            .find(|tx| tx.status.confirmed)
            .map(|tx| tx.txid.clone());
        let mut transactions: Vec<Transaction> =
            first.into_iter().map(|tx| tx.into_transaction(seen_at)).collect();

        while confirmed_in_page >= page_size && transactions.len() < limit {
            let Some(after) = last_confirmed.take() else {
                break;
            };
            let url = self.config.transactions_url(address, Some(&after));
            let page: Vec<EsploraTx> = parse(&self.get_text(&url).await?)?;
            confirmed_in_page = page.len();
            last_confirmed = page.last().map(|tx| tx.txid.clone());
            transactions.extend(page.into_iter().map(|tx| tx.into_transaction(seen_at)));
        }

        transactions.truncate(limit);
        debug!(address, count = transactions.len(), "fetched transactions");
        Ok(transactions)
    }
}

#[async_trait]
impl Provider for EsploraProvider {
    async fn get_stats(&self, address: &str) -> Result<AddressStats, ProviderError> {
        let mut stats = self.fetch_address_info(address).await?.to_stats();
        if stats.is_active() {
            stats.raw_transactions = Some(self.fetch_all_transactions(address).await?);
        }
        Ok(stats)
    }

    async fn get_transactions(&self, address: &str) -> Result<Vec<Transaction>, ProviderError> {
        self.fetch_all_transactions(address).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ADDRESS_JSON: &str = r#"{
        "address": "1AC4EypEKiobnZfDv1pSEt28g3D4MwY5WB",
        "chain_stats": {
            "funded_txo_count": 2,
            "funded_txo_sum": 150000,
            "spent_txo_count": 1,
            "spent_txo_sum": 100000,
            "tx_count": 3
        },
        "mempool_stats": {
            "funded_txo_count": 0,
            "funded_txo_sum": 0,
            "spent_txo_count": 0,
            "spent_txo_sum": 0,
            "tx_count": 0
        }
    }"#;

    const TXS_JSON: &str = r#"[
        {
            "txid": "aa11",
            "version": 2,
            "locktime": 0,
            "vin": [
                {
                    "txid": "ff00",
                    "vout": 0,
                    "prevout": {
                        "scriptpubkey": "76a914",
                        "scriptpubkey_type": "p2pkh",
                        "scriptpubkey_address": "1AC4EypEKiobnZfDv1pSEt28g3D4MwY5WB",
                        "value": 100000
                    },
                    "is_coinbase": false,
                    "sequence": 4294967295
                }
            ],
            "vout": [
                {
                    "scriptpubkey": "0014",
                    "scriptpubkey_type": "v0_p2wpkh",
                    "scriptpubkey_address": "bc1qvngxns2mvj00uptukvnh63apg6mg4ac3wan0xz",
                    "value": 60000
                },
                {
                    "scriptpubkey": "6a",
                    "scriptpubkey_type": "op_return",
                    "value": 0
                }
            ],
            "size": 200,
            "weight": 800,
            "fee": 40000,
            "status": {
                "confirmed": true,
                "block_height": 800000,
                "block_hash": "0000",
                "block_time": 1690168629
            }
        },
        {
            "txid": "bb22",
            "vin": [
                {
                    "txid": "0000",
                    "vout": 4294967295,
                    "prevout": null,
                    "is_coinbase": true,
                    "sequence": 4294967295
                }
            ],
            "vout": [
                {
                    "scriptpubkey_address": "1AC4EypEKiobnZfDv1pSEt28g3D4MwY5WB",
                    "value": 50000
                }
            ],
            "status": { "confirmed": false }
        }
    ]"#;

    #[test]
    fn test_address_stats_from_chain_stats() {
        let info: AddressInfo = parse(ADDRESS_JSON).unwrap();
        let stats = info.to_stats();
        assert_eq!(stats.tx_count, 3);
        assert_eq!(stats.funded_sum, 150_000);
        assert_eq!(stats.spent_sum, 100_000);
        assert_eq!(stats.balance, 50_000);
        assert!(stats.raw_transactions.is_none());
    }

    #[test]
    fn test_unused_address_stats() {
        let info: AddressInfo = parse(
            r#"{"chain_stats": {"funded_txo_sum": 0, "spent_txo_sum": 0, "tx_count": 0}}"#,
        )
        .unwrap();
        assert!(!info.to_stats().is_active());
    }

    #[test]
    fn test_confirmed_transaction_normalized() {
        let txs: Vec<EsploraTx> = parse(TXS_JSON).unwrap();
        let tx = txs[0].clone().into_transaction(42);

        assert_eq!(tx.txid, "aa11");
        assert_eq!(tx.block_height, Some(800_000));
        assert_eq!(tx.time, 1_690_168_629);
        assert_eq!(
            tx.ins,
            vec![TxIo {
                address: "1AC4EypEKiobnZfDv1pSEt28g3D4MwY5WB".into(),
                value: 100_000,
            }]
        );
        // OP_RETURN output has no address and is dropped.
        assert_eq!(tx.outs.len(), 1);
        assert_eq!(tx.outs[0].value, 60_000);
    }

    #[test]
    fn test_mempool_coinbase_transaction_normalized() {
        let txs: Vec<EsploraTx> = parse(TXS_JSON).unwrap();
        let tx = txs[1].clone().into_transaction(1_700_000_000);

        assert!(tx.ins.is_empty());
        assert_eq!(tx.block_height, None);
        assert_eq!(tx.time, 1_700_000_000);
        assert_eq!(tx.outs[0].address, "1AC4EypEKiobnZfDv1pSEt28g3D4MwY5WB");
    }

    #[test]
    fn test_malformed_body_is_invalid_response() {
        let result: Result<AddressInfo, _> = parse(r#"{"chain_stats": 5}"#);
        let err = result.unwrap_err();
        assert!(matches!(err, ProviderError::InvalidResponse(_)));
        assert!(!err.is_transient());
    }

    #[test]
    fn test_provider_builds_from_default_config() {
        let config = ExplorerConfig::for_currency(xpub_core::Currency::Bitcoin, false).unwrap();
        let provider = EsploraProvider::new(config).unwrap();
        assert_eq!(provider.config().base_url, "https://blockstream.info/api");
    }

    #[tokio::test]
    async fn test_unreachable_host_is_transient() {
        // Port 9 (discard) on localhost is expected to refuse connections.
        let config = ExplorerConfig::new("http://127.0.0.1:9").unwrap();
        let provider = EsploraProvider::new(config).unwrap();
        let err = provider.get_stats("1AC4EypEKiobnZfDv1pSEt28g3D4MwY5WB").await.unwrap_err();
        assert!(matches!(err, ProviderError::Transport(_)));
        assert!(err.is_transient());
    }
}
