/// Version bytes and human-readable parts of a UTXO network.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NetworkParams {
    pub name: &'static str,
    /// Version byte of P2PKH addresses.
    pub pub_key_hash: u8,
    /// Version byte of P2SH addresses.
    pub script_hash: u8,
    /// Bech32 human-readable part, `None` for networks without SegWit.
    pub bech32_hrp: Option<&'static str>,
    /// CashAddr prefix, Bitcoin Cash only.
    pub cashaddr_prefix: Option<&'static str>,
}

pub const BITCOIN: NetworkParams = NetworkParams {
    name: "bitcoin",
    pub_key_hash: 0x00,
    script_hash: 0x05,
    bech32_hrp: Some("bc"),
    cashaddr_prefix: None,
};

pub const BITCOIN_TESTNET: NetworkParams = NetworkParams {
    name: "bitcoin-testnet",
    pub_key_hash: 0x6f,
    script_hash: 0xc4,
    bech32_hrp: Some("tb"),
    cashaddr_prefix: None,
};

pub const LITECOIN: NetworkParams = NetworkParams {
    name: "litecoin",
    pub_key_hash: 0x30,
    script_hash: 0x32,
    bech32_hrp: Some("ltc"),
    cashaddr_prefix: None,
};

pub const LITECOIN_TESTNET: NetworkParams = NetworkParams {
    name: "litecoin-testnet",
    pub_key_hash: 0x6f,
    script_hash: 0x3a,
    bech32_hrp: Some("tltc"),
    cashaddr_prefix: None,
};

pub const DOGECOIN: NetworkParams = NetworkParams {
    name: "dogecoin",
    pub_key_hash: 0x1e,
    script_hash: 0x16,
    bech32_hrp: None,
    cashaddr_prefix: None,
};

pub const DOGECOIN_TESTNET: NetworkParams = NetworkParams {
    name: "dogecoin-testnet",
    pub_key_hash: 0x71,
    script_hash: 0xc4,
    bech32_hrp: None,
    cashaddr_prefix: None,
};

/// Bitcoin Cash shares Bitcoin's legacy version bytes but has no SegWit.
pub const BITCOIN_CASH: NetworkParams = NetworkParams {
    name: "bitcoincash",
    pub_key_hash: 0x00,
    script_hash: 0x05,
    bech32_hrp: None,
    cashaddr_prefix: Some("bitcoincash"),
};

pub const BITCOIN_CASH_TESTNET: NetworkParams = NetworkParams {
    name: "bitcoincash-testnet",
    pub_key_hash: 0x6f,
    script_hash: 0xc4,
    bech32_hrp: None,
    cashaddr_prefix: Some("bchtest"),
};

impl NetworkParams {
    /// Bech32 hrp, or an error naming the network that lacks one.
    pub fn require_hrp(&self) -> Result<&'static str, crate::error::BtcError> {
        self.bech32_hrp.ok_or_else(|| {
            crate::error::BtcError::MissingNetworkParameter(format!(
                "{} has no bech32 human-readable part",
                self.name
            ))
        })
    }
}

impl std::fmt::Display for NetworkParams {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name)
    }
}
