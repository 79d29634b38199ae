//! Locating the derivation path of a given address.

use serde::{Deserialize, Serialize};
use tracing::{debug, info, trace};

use crate::address::{branch_for, derive_address, derive_from_branch, resolve_family};
use crate::config::{ScanConfig, SearchRange};
use crate::error::XpubError;
use crate::extended_key::ExtendedPublicKey;

/// Where a provided address was found.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchMatch {
    pub account: u32,
    pub index: u32,
    /// The derived address, when it only matched through `?` wildcards.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub partial: Option<String>,
}

impl SearchMatch {
    pub fn derivation_path(&self) -> String {
        format!("m/{}/{}", self.account, self.index)
    }

    pub fn is_partial(&self) -> bool {
        self.partial.is_some()
    }
}

/// `?` in `provided` matches any single character; comparison covers the
/// length of `derived`.
fn wildcard_match(derived: &str, provided: &str) -> bool {
    let mut provided = provided.chars();
    derived.chars().all(|d| match provided.next() {
        Some('?') => true,
        Some(p) => p.eq_ignore_ascii_case(&d),
        None => false,
    })
}

/// Enumerate `range` (accounts outer, indices inner) for an address equal to
/// `provided` (case-insensitive) or, if it contains `?`, matching it.
pub fn search(
    xpub: &ExtendedPublicKey,
    config: &ScanConfig,
    provided: &str,
    range: &SearchRange,
) -> Result<Option<SearchMatch>, XpubError> {
    let provided = provided.trim();
    let family = resolve_family(provided, config.currency)?;
    let wildcards = provided.contains('?');

    for account in range.accounts.clone() {
        let branch = branch_for(xpub, family, account)?;
        for index in range.indices.clone() {
            let derived =
                derive_from_branch(&branch, family, config.currency, config.testnet, index)?;
            trace!(path = %derived.derivation_path(), address = %derived.address, "derived");

            if derived.address.eq_ignore_ascii_case(provided) {
                return Ok(Some(SearchMatch {
                    account,
                    index,
                    partial: None,
                }));
            }
            if wildcards && wildcard_match(&derived.address, provided) {
                return Ok(Some(SearchMatch {
                    account,
                    index,
                    partial: Some(derived.address),
                }));
            }
        }
    }
    Ok(None)
}

/// Look for `provided` among the key's addresses: sanity check against
/// `m/0/0`, then the quick range, then the deep range.
pub fn check_address(
    xpub: &ExtendedPublicKey,
    config: &ScanConfig,
    provided: &str,
) -> Result<Option<SearchMatch>, XpubError> {
    let provided = provided.trim();
    let family = resolve_family(provided, config.currency)?;
    let first = derive_address(xpub, family, config.currency, config.testnet, 0, 0)?;

    if first.address.chars().count() != provided.chars().count() {
        return Err(XpubError::UnsupportedAddress(format!(
            "{provided}: length differs from derived address {}",
            first.address
        )));
    }
    let same_prefix = match (first.address.chars().next(), provided.chars().next()) {
        (Some(a), Some(b)) => a.eq_ignore_ascii_case(&b),
        _ => false,
    };
    if !same_prefix {
        return Err(XpubError::UnsupportedAddress(format!(
            "{provided}: prefix differs from derived address {}",
            first.address
        )));
    }

    info!(%family, "quick search");
    if let Some(found) = search(xpub, config, provided, &config.quick_search)? {
        debug!(path = %found.derivation_path(), "found by quick search");
        return Ok(Some(found));
    }

    info!(%family, "deep search");
    let found = search(xpub, config, provided, &config.deep_search)?;
    if let Some(found) = &found {
        debug!(path = %found.derivation_path(), "found by deep search");
    }
    Ok(found)
}
