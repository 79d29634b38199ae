use chain_btc::network::{self, NetworkParams};
use serde::{Deserialize, Serialize};

/// Currencies whose addresses can be derived from an xpub-family key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Currency {
    #[serde(rename = "BTC")]
    Bitcoin,
    #[serde(rename = "LTC")]
    Litecoin,
    #[serde(rename = "BCH")]
    BitcoinCash,
    #[serde(rename = "DOGE")]
    Dogecoin,
    #[serde(rename = "ETH")]
    Ethereum,
}

impl Currency {
    pub const ALL: [Currency; 5] = [
        Currency::Bitcoin,
        Currency::Litecoin,
        Currency::BitcoinCash,
        Currency::Dogecoin,
        Currency::Ethereum,
    ];

    /// Ticker symbol
    pub fn symbol(&self) -> &'static str {
        match self {
            Currency::Bitcoin => "BTC",
            Currency::Litecoin => "LTC",
            Currency::BitcoinCash => "BCH",
            Currency::Dogecoin => "DOGE",
            Currency::Ethereum => "ETH",
        }
    }

    /// Display name
    pub fn display_name(&self) -> &'static str {
        match self {
            Currency::Bitcoin => "Bitcoin",
            Currency::Litecoin => "Litecoin",
            Currency::BitcoinCash => "Bitcoin Cash",
            Currency::Dogecoin => "Dogecoin",
            Currency::Ethereum => "Ethereum",
        }
    }

    /// Address families scanned for this currency, in scan order.
    pub fn families(&self) -> &'static [AddressFamily] {
        match self {
            Currency::Bitcoin => &[
                AddressFamily::Legacy,
                AddressFamily::WrappedSegwit,
                AddressFamily::NativeSegwit,
                AddressFamily::Taproot,
            ],
            Currency::Litecoin => &[
                AddressFamily::Legacy,
                AddressFamily::WrappedSegwit,
                AddressFamily::NativeSegwit,
            ],
            Currency::BitcoinCash => &[AddressFamily::BitcoinCash],
            Currency::Dogecoin => &[AddressFamily::Dogecoin],
            Currency::Ethereum => &[AddressFamily::Ethereum],
        }
    }

    /// Whether balances are tracked per account rather than per UTXO.
    pub fn is_account_based(&self) -> bool {
        matches!(self, Currency::Ethereum)
    }

    /// Version bytes and hrps, `None` for account-based currencies.
    pub fn network_params(&self, testnet: bool) -> Option<&'static NetworkParams> {
        let params = match (self, testnet) {
            (Currency::Bitcoin, false) => &network::BITCOIN,
            (Currency::Bitcoin, true) => &network::BITCOIN_TESTNET,
            (Currency::Litecoin, false) => &network::LITECOIN,
            (Currency::Litecoin, true) => &network::LITECOIN_TESTNET,
            (Currency::BitcoinCash, false) => &network::BITCOIN_CASH,
            (Currency::BitcoinCash, true) => &network::BITCOIN_CASH_TESTNET,
            (Currency::Dogecoin, false) => &network::DOGECOIN,
            (Currency::Dogecoin, true) => &network::DOGECOIN_TESTNET,
            (Currency::Ethereum, _) => return None,
        };
        Some(params)
    }

    /// Currency and testnet flag announced by an extended key's version bytes.
    ///
    /// `xpub`/`tpub` are shared by Bitcoin, Bitcoin Cash and Ethereum and
    /// resolve to Bitcoin.
    pub fn from_extended_key_version(version: [u8; 4]) -> Option<(Currency, bool)> {
        match version {
            [0x04, 0x88, 0xb2, 0x1e] => Some((Currency::Bitcoin, false)),
            [0x04, 0x35, 0x87, 0xcf] => Some((Currency::Bitcoin, true)),
            [0x01, 0x9d, 0xa4, 0x62] => Some((Currency::Litecoin, false)),
            [0x04, 0x36, 0xf6, 0xe1] => Some((Currency::Litecoin, true)),
            [0x02, 0xfa, 0xca, 0xfd] => Some((Currency::Dogecoin, false)),
            [0x04, 0x32, 0xa9, 0xa8] => Some((Currency::Dogecoin, true)),
            _ => None,
        }
    }
}

impl std::fmt::Display for Currency {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.symbol())
    }
}

impl std::str::FromStr for Currency {
    type Err = crate::error::XpubError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Currency::ALL
            .into_iter()
            .find(|c| c.symbol().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| {
                crate::error::XpubError::InvalidConfig(format!("unknown currency: {s}"))
            })
    }
}

/// Address encodings ("derivation modes").
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum AddressFamily {
    Legacy,
    #[serde(rename = "SegWit")]
    WrappedSegwit,
    #[serde(rename = "Native SegWit")]
    NativeSegwit,
    Taproot,
    #[serde(rename = "Bitcoin Cash")]
    BitcoinCash,
    Dogecoin,
    Ethereum,
}

impl AddressFamily {
    pub fn display_name(&self) -> &'static str {
        match self {
            AddressFamily::Legacy => "Legacy",
            AddressFamily::WrappedSegwit => "SegWit",
            AddressFamily::NativeSegwit => "Native SegWit",
            AddressFamily::Taproot => "Taproot",
            AddressFamily::BitcoinCash => "Bitcoin Cash",
            AddressFamily::Dogecoin => "Dogecoin",
            AddressFamily::Ethereum => "Ethereum",
        }
    }

    /// Account-based families only use the external account.
    pub fn is_account_based(&self) -> bool {
        matches!(self, AddressFamily::Ethereum)
    }
}

impl std::fmt::Display for AddressFamily {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.display_name())
    }
}

/// An address derived at `m/account/index`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DerivedAddress {
    pub family: AddressFamily,
    pub address: String,
    /// CashAddr form, Bitcoin Cash only.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cash_address: Option<String>,
    pub account: u32,
    pub index: u32,
}

impl DerivedAddress {
    pub fn derivation_path(&self) -> String {
        format!("m/{}/{}", self.account, self.index)
    }
}
