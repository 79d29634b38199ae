pub mod address;
pub mod config;
pub mod error;
pub mod extended_key;
pub mod hd_derivation;
pub mod operations;
pub mod own_addresses;
pub mod provider;
pub mod record;
pub mod scanner;
pub mod search;
pub mod types;

pub use config::{ScanConfig, ScanLimits, SearchRange};
pub use error::XpubError;
pub use extended_key::ExtendedPublicKey;
pub use own_addresses::OwnAddresses;
pub use provider::{Provider, ProviderError, RetryPolicy, RetryingProvider};
pub use record::{AddressRecord, AddressStats, Operation, OperationKind, Transaction, TxIo};
pub use scanner::{GapLimitScanner, ScanMode, ScanOutcome};
pub use search::SearchMatch;
pub use types::{AddressFamily, Currency, DerivedAddress};

// ─── Entry points taking the key as a string ────────────────────────

/// Derive the `family` address at `m/account/index` of an xpub-family key.
pub fn derive_address(
    xpub: &str,
    family: AddressFamily,
    config: &ScanConfig,
    account: u32,
    index: u32,
) -> Result<DerivedAddress, XpubError> {
    let key = ExtendedPublicKey::decode(xpub)?;
    address::derive_address(&key, family, config.currency, config.testnet, account, index)
}

/// Find the derivation path of `provided` (which may contain `?` wildcards).
pub fn check_address(
    xpub: &str,
    provided: &str,
    config: &ScanConfig,
) -> Result<Option<SearchMatch>, XpubError> {
    let key = ExtendedPublicKey::decode(xpub)?;
    search::check_address(&key, config, provided)
}

/// Scan an xpub-family key through `provider`, wrapped in the configured
/// retry policy.
pub async fn scan<P: Provider>(
    xpub: &str,
    provider: P,
    config: ScanConfig,
    limits: Option<&ScanLimits>,
) -> Result<ScanOutcome, XpubError> {
    let key = ExtendedPublicKey::decode(xpub)?;
    let provider = RetryingProvider::new(provider, config.retry.clone());
    GapLimitScanner::new(provider, config)?
        .scan(&key, limits)
        .await
}
