use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

/// Account holding change addresses.
pub const INTERNAL_ACCOUNT: u32 = 1;

/// Addresses known to belong to the scanned key, split into change
/// (internal, account 1) and everything else (external).
///
/// Append-only: adding an address twice has no further effect.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OwnAddresses {
    internal: BTreeSet<String>,
    external: BTreeSet<String>,
}

impl OwnAddresses {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `address` as derived under `account`. Returns `false` if it
    /// was already registered.
    pub fn add(&mut self, address: &str, account: u32) -> bool {
        let set = if account == INTERNAL_ACCOUNT {
            &mut self.internal
        } else {
            &mut self.external
        };
        set.insert(address.to_string())
    }

    pub fn is_internal(&self, address: &str) -> bool {
        self.internal.contains(address)
    }

    pub fn is_external(&self, address: &str) -> bool {
        self.external.contains(address)
    }

    pub fn contains(&self, address: &str) -> bool {
        self.is_internal(address) || self.is_external(address)
    }

    pub fn internal(&self) -> impl Iterator<Item = &str> {
        self.internal.iter().map(String::as_str)
    }

    pub fn external(&self) -> impl Iterator<Item = &str> {
        self.external.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.internal.len() + self.external.len()
    }

    pub fn is_empty(&self) -> bool {
        self.internal.is_empty() && self.external.is_empty()
    }
}
