//! Gap-limited discovery of the active addresses of an extended key.
//!
//! For every family of the configured currency the scanner walks the
//! external (0) and internal (1) accounts index by index, asking the provider
//! for each address's stats. An external branch ends after `gap_limit`
//! consecutive unused addresses; the internal branch ends at its first unused
//! address.

use futures::future::try_join_all;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::address::{branch_for, derive_from_branch};
use crate::config::{ScanConfig, ScanLimits};
use crate::error::XpubError;
use crate::extended_key::ExtendedPublicKey;
use crate::hd_derivation::BranchKey;
use crate::operations::{classify, sorted_operations};
use crate::own_addresses::{OwnAddresses, INTERNAL_ACCOUNT};
use crate::provider::Provider;
use crate::record::{AddressRecord, Operation};
use crate::types::AddressFamily;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ScanMode {
    Full,
    Partial {
        account: u32,
        index_from: u32,
        index_to: Option<u32>,
    },
}

/// What was scanned on one (family, account) branch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BranchSummary {
    pub family: AddressFamily,
    pub account: u32,
    /// Addresses whose stats were requested and considered.
    pub scanned: u32,
    pub active: u32,
    pub last_scanned_index: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FamilySummary {
    pub family: AddressFamily,
    pub balance: u128,
    pub active: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanOutcome {
    pub mode: ScanMode,
    /// Active addresses in scan order: family, account, index.
    pub records: Vec<AddressRecord>,
    pub own_addresses: OwnAddresses,
    pub summary: Vec<FamilySummary>,
    pub branches: Vec<BranchSummary>,
    /// Empty when scanning with `balance_only`.
    pub operations: Vec<Operation>,
}

impl ScanOutcome {
    pub fn total_balance(&self) -> u128 {
        self.summary.iter().map(|s| s.balance).sum()
    }
}

pub struct GapLimitScanner<P> {
    provider: P,
    config: ScanConfig,
}

impl<P: Provider> GapLimitScanner<P> {
    pub fn new(provider: P, config: ScanConfig) -> Result<Self, XpubError> {
        config.validate()?;
        Ok(Self { provider, config })
    }

    pub fn config(&self) -> &ScanConfig {
        &self.config
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    /// Scan `xpub`, optionally restricted to `limits`.
    ///
    /// A provider error (after the provider's own retries) aborts the scan.
    pub async fn scan(
        &self,
        xpub: &ExtendedPublicKey,
        limits: Option<&ScanLimits>,
    ) -> Result<ScanOutcome, XpubError> {
        if let Some(l) = limits {
            l.validate()?;
        }
        let families = self.config.scan_families();
        let mode = match limits {
            Some(l) => ScanMode::Partial {
                account: l.account,
                index_from: l.index_from,
                index_to: l.index_to,
            },
            None => ScanMode::Full,
        };
        info!(currency = %self.config.currency, ?mode, "starting scan");

        let mut own = OwnAddresses::new();
        let pre_derivation_size = limits
            .and_then(|l| l.pre_derivation_size)
            .unwrap_or(self.config.pre_derivation_size);
        if pre_derivation_size > 0 {
            self.pre_derive(xpub, &families, pre_derivation_size, &mut own)?;
        }

        let index_from = limits.map_or(0, |l| l.index_from);
        let index_to = limits.and_then(|l| l.index_to);

        let mut records = Vec::new();
        let mut branches = Vec::new();
        let mut summary = Vec::new();

        for &family in &families {
            let first_record = records.len();
            for account in scan_accounts(family, limits) {
                info!(%family, account, "scanning branch");
                let branch = branch_for(xpub, family, account)?;
                let report = self
                    .scan_branch(
                        &branch,
                        family,
                        account,
                        index_from,
                        index_to,
                        &mut own,
                        &mut records,
                    )
                    .await?;
                info!(
                    %family,
                    account,
                    scanned = report.scanned,
                    active = report.active,
                    "branch done"
                );
                branches.push(report);
            }

            let family_records = &records[first_record..];
            summary.push(FamilySummary {
                family,
                balance: family_records.iter().map(|r| r.stats.balance).sum(),
                active: family_records.len() as u32,
            });
        }

        let operations = if self.config.balance_only {
            Vec::new()
        } else {
            for record in records.iter_mut() {
                record.transactions = match record.stats.raw_transactions.take() {
                    Some(transactions) => transactions,
                    None => self.provider.get_transactions(&record.address).await?,
                };
            }
            for record in records.iter_mut() {
                classify(record, &own);
            }
            sorted_operations(&records)
        };

        Ok(ScanOutcome {
            mode,
            records,
            own_addresses: own,
            summary,
            branches,
            operations,
        })
    }

    /// Register the first `size` addresses of both accounts as own, so that
    /// transfers to not-yet-active addresses classify correctly.
    fn pre_derive(
        &self,
        xpub: &ExtendedPublicKey,
        families: &[AddressFamily],
        size: u32,
        own: &mut OwnAddresses,
    ) -> Result<(), XpubError> {
        for &family in families {
            for account in scan_accounts(family, None) {
                let branch = branch_for(xpub, family, account)?;
                for index in 0..size {
                    let derived = derive_from_branch(
                        &branch,
                        family,
                        self.config.currency,
                        self.config.testnet,
                        index,
                    )?;
                    own.add(&derived.address, account);
                }
            }
        }
        debug!(size, registered = own.len(), "pre-derived addresses");
        Ok(())
    }

    #[allow(clippy::too_many_arguments)]
    async fn scan_branch(
        &self,
        branch: &BranchKey,
        family: AddressFamily,
        account: u32,
        index_from: u32,
        index_to: Option<u32>,
        own: &mut OwnAddresses,
        records: &mut Vec<AddressRecord>,
    ) -> Result<BranchSummary, XpubError> {
        let prefetch = u32::try_from(self.config.prefetch.max(1)).unwrap_or(u32::MAX);
        let mut report = BranchSummary {
            family,
            account,
            scanned: 0,
            active: 0,
            last_scanned_index: None,
        };

        let mut index = index_from;
        let mut unused_in_a_row = 0u32;

        'scan: loop {
            let mut end = index.saturating_add(prefetch);
            if let Some(to) = index_to {
                if index > to {
                    break;
                }
                end = end.min(to.saturating_add(1));
            }

            let batch = (index..end)
                .map(|i| {
                    derive_from_branch(branch, family, self.config.currency, self.config.testnet, i)
                })
                .collect::<Result<Vec<_>, _>>()?;
            let stats =
                try_join_all(batch.iter().map(|d| self.provider.get_stats(&d.address))).await?;

            for (derived, stats) in batch.into_iter().zip(stats) {
                report.scanned += 1;
                report.last_scanned_index = Some(derived.index);

                if stats.is_active() {
                    unused_in_a_row = 0;
                    debug!(
                        path = %derived.derivation_path(),
                        address = %derived.address,
                        tx_count = stats.tx_count,
                        balance = %stats.balance,
                        "active address"
                    );
                    own.add(&derived.address, account);
                    records.push(AddressRecord::new(derived, stats));
                    report.active += 1;
                } else {
                    unused_in_a_row += 1;
                    let gap_reached =
                        unused_in_a_row >= self.config.gap_limit || account == INTERNAL_ACCOUNT;
                    if index_to.is_none() && gap_reached {
                        break 'scan;
                    }
                }
            }

            if end == index {
                break;
            }
            index = end;
        }

        Ok(report)
    }
}

/// Accounts scanned for `family`: the limited account, or external then
/// internal. Account-based families only have account 0.
fn scan_accounts(family: AddressFamily, limits: Option<&ScanLimits>) -> Vec<u32> {
    if family.is_account_based() {
        return vec![0];
    }
    match limits {
        Some(l) => vec![l.account],
        None => vec![0, INTERNAL_ACCOUNT],
    }
}
