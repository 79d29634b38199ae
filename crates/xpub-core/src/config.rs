use std::ops::Range;

use serde::{Deserialize, Serialize};

use crate::error::XpubError;
use crate::extended_key::ExtendedPublicKey;
use crate::provider::RetryPolicy;
use crate::types::{AddressFamily, Currency};

/// Accounts and indices enumerated by an address search.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchRange {
    pub accounts: Range<u32>,
    pub indices: Range<u32>,
}

impl SearchRange {
    pub fn quick() -> Self {
        Self {
            accounts: 0..4,
            indices: 0..1_000,
        }
    }

    pub fn deep() -> Self {
        Self {
            accounts: 0..1_000,
            indices: 0..100_000,
        }
    }
}

/// Restricts a scan to one account and an index window.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanLimits {
    pub account: u32,
    pub index_from: u32,
    /// Inclusive upper bound. When set the whole window is scanned and the
    /// gap limit does not apply.
    pub index_to: Option<u32>,
    pub pre_derivation_size: Option<u32>,
}

impl ScanLimits {
    pub fn validate(&self) -> Result<(), XpubError> {
        match self.index_to {
            Some(to) if to < self.index_from => Err(XpubError::InvalidConfig(format!(
                "index_to {to} is below index_from {}",
                self.index_from
            ))),
            _ => Ok(()),
        }
    }
}

/// Scan settings, fixed for the duration of a scan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanConfig {
    pub currency: Currency,
    pub testnet: bool,
    /// Consecutive unused addresses that end an external branch.
    pub gap_limit: u32,
    /// Only scan these families, `None` for every family of the currency.
    pub families: Option<Vec<AddressFamily>>,
    /// Skip transaction fetching and operation classification.
    pub balance_only: bool,
    /// Addresses whose stats are requested concurrently.
    pub prefetch: usize,
    /// Addresses of accounts 0 and 1 registered as own before scanning.
    pub pre_derivation_size: u32,
    pub retry: RetryPolicy,
    pub quick_search: SearchRange,
    pub deep_search: SearchRange,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            currency: Currency::Bitcoin,
            testnet: false,
            gap_limit: 20,
            families: None,
            balance_only: false,
            prefetch: 1,
            pre_derivation_size: 0,
            retry: RetryPolicy::default(),
            quick_search: SearchRange::quick(),
            deep_search: SearchRange::deep(),
        }
    }
}

impl ScanConfig {
    pub fn new(currency: Currency, testnet: bool) -> Self {
        Self {
            currency,
            testnet,
            ..Self::default()
        }
    }

    /// Defaults for the currency and network announced by the key's version.
    pub fn for_extended_key(xpub: &ExtendedPublicKey) -> Result<Self, XpubError> {
        let (currency, testnet) = xpub.currency().ok_or_else(|| {
            XpubError::InvalidExtendedKey(format!(
                "unknown version bytes {}",
                hex::encode(xpub.version)
            ))
        })?;
        Ok(Self::new(currency, testnet))
    }

    /// Families to scan, in scan order.
    pub fn scan_families(&self) -> Vec<AddressFamily> {
        let all = self.currency.families();
        match &self.families {
            Some(only) => all.iter().copied().filter(|f| only.contains(f)).collect(),
            None => all.to_vec(),
        }
    }

    pub fn validate(&self) -> Result<(), XpubError> {
        if self.gap_limit == 0 {
            return Err(XpubError::InvalidConfig("gap_limit must be at least 1".into()));
        }
        if self.prefetch == 0 {
            return Err(XpubError::InvalidConfig("prefetch must be at least 1".into()));
        }
        if let Some(only) = &self.families {
            if only.is_empty() {
                return Err(XpubError::InvalidConfig("families must not be empty".into()));
            }
            if let Some(foreign) = only
                .iter()
                .find(|f| !self.currency.families().contains(*f))
            {
                return Err(XpubError::InvalidConfig(format!(
                    "{foreign} addresses are not derived for {}",
                    self.currency
                )));
            }
        }
        Ok(())
    }
}
