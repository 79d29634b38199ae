use serde::{Deserialize, Serialize};

use crate::types::{AddressFamily, DerivedAddress};

/// Per-address totals reported by a provider, in base units.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddressStats {
    pub tx_count: u64,
    pub funded_sum: u128,
    pub spent_sum: u128,
    pub balance: u128,
    /// Transactions returned alongside the stats, when the provider fetches
    /// them in the same call.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub raw_transactions: Option<Vec<Transaction>>,
}

impl AddressStats {
    /// Stats of an address that never appeared on chain.
    pub fn unused() -> Self {
        Self::default()
    }

    pub fn is_active(&self) -> bool {
        self.tx_count > 0
    }
}

/// One input or output of a transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TxIo {
    pub address: String,
    pub value: u128,
}

/// Transaction as normalized by a provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    pub txid: String,
    pub block_height: Option<u64>,
    /// Unix time in seconds (block time, or first-seen for mempool).
    pub time: u64,
    pub ins: Vec<TxIo>,
    pub outs: Vec<TxIo>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OperationKind {
    /// Received on an external address.
    In,
    /// Change address funded by a transaction with no own input.
    InChange,
    /// Sent to a foreign address.
    Out,
    /// Sent back to the spending address.
    OutSelf,
    /// Sent to another external address of the same key.
    OutSibling,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Operation {
    pub kind: OperationKind,
    pub txid: String,
    pub time: u64,
    pub block_height: Option<u64>,
    /// Own address the operation was recorded on.
    pub address: String,
    pub amount: u128,
}

/// An active derived address and everything learnt about it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddressRecord {
    pub address: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cash_address: Option<String>,
    pub family: AddressFamily,
    pub account: u32,
    pub index: u32,
    pub stats: AddressStats,
    pub transactions: Vec<Transaction>,
    pub funded_ops: Vec<Operation>,
    pub sent_ops: Vec<Operation>,
}

impl AddressRecord {
    pub fn new(derived: DerivedAddress, stats: AddressStats) -> Self {
        Self {
            address: derived.address,
            cash_address: derived.cash_address,
            family: derived.family,
            account: derived.account,
            index: derived.index,
            stats,
            transactions: Vec::new(),
            funded_ops: Vec::new(),
            sent_ops: Vec::new(),
        }
    }

    pub fn derivation_path(&self) -> String {
        format!("m/{}/{}", self.account, self.index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unused_stats_are_inactive() {
        assert!(!AddressStats::unused().is_active());
        let active = AddressStats {
            tx_count: 2,
            ..AddressStats::default()
        };
        assert!(active.is_active());
    }

    #[test]
    fn record_from_derived_address() {
        let derived = DerivedAddress {
            family: AddressFamily::BitcoinCash,
            address: "195D2Q9NPSpZxkD2gmEtNFzK8s65FS7QZB".into(),
            cash_address: Some("bitcoincash:qpvgedg5e92ut08ksxrw0w9l9xevecfwg5dg503vfy".into()),
            account: 0,
            index: 4,
        };
        let record = AddressRecord::new(derived, AddressStats::unused());
        assert_eq!(record.derivation_path(), "m/0/4");
        assert_eq!(record.family, AddressFamily::BitcoinCash);
        assert!(record.cash_address.is_some());
        assert!(record.transactions.is_empty());
    }

    #[test]
    fn stats_deserialize_without_transactions() {
        let stats: AddressStats = serde_json::from_str(
            r#"{"tx_count":3,"funded_sum":1000,"spent_sum":400,"balance":600}"#,
        )
        .unwrap();
        assert_eq!(stats.balance, 600);
        assert!(stats.raw_transactions.is_none());
    }
}
