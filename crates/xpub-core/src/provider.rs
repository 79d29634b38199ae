//! Blockchain data source abstraction and its retry/timeout wrapper.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::time::{sleep, timeout};
use tracing::{debug, warn};

use crate::record::{AddressStats, Transaction};

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ProviderError {
    #[error("request timed out after {0} ms")]
    Timeout(u64),

    #[error("transport error: {0}")]
    Transport(String),

    #[error("HTTP {status}: {message}")]
    Http { status: u16, message: String },

    #[error("invalid response: {0}")]
    InvalidResponse(String),
}

impl ProviderError {
    /// Whether retrying the same request may succeed.
    pub fn is_transient(&self) -> bool {
        match self {
            ProviderError::Timeout(_) | ProviderError::Transport(_) => true,
            ProviderError::Http { status, .. } => *status == 429 || (500..=599).contains(status),
            ProviderError::InvalidResponse(_) => false,
        }
    }
}

/// Source of per-address chain data.
#[async_trait]
pub trait Provider: Send + Sync {
    async fn get_stats(&self, address: &str) -> Result<AddressStats, ProviderError>;

    async fn get_transactions(&self, address: &str) -> Result<Vec<Transaction>, ProviderError>;
}

#[async_trait]
impl<P: Provider + ?Sized> Provider for Arc<P> {
    async fn get_stats(&self, address: &str) -> Result<AddressStats, ProviderError> {
        (**self).get_stats(address).await
    }

    async fn get_transactions(&self, address: &str) -> Result<Vec<Transaction>, ProviderError> {
        (**self).get_transactions(address).await
    }
}

/// Per-call timeout and bounded exponential backoff.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryPolicy {
    /// Total attempts, including the first one.
    pub max_attempts: u32,
    pub initial_backoff_ms: u64,
    pub timeout_ms: u64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            initial_backoff_ms: 500,
            timeout_ms: 30_000,
        }
    }
}

impl RetryPolicy {
    /// Delay before attempt `attempt + 1`, doubling from the initial backoff.
    pub fn backoff(&self, attempt: u32) -> Duration {
        let factor = 1u64 << attempt.saturating_sub(1).min(16);
        Duration::from_millis(self.initial_backoff_ms.saturating_mul(factor))
    }
}

/// Wraps a provider so that transient failures are retried.
pub struct RetryingProvider<P> {
    inner: P,
    policy: RetryPolicy,
}

impl<P: Provider> RetryingProvider<P> {
    pub fn new(inner: P, policy: RetryPolicy) -> Self {
        Self { inner, policy }
    }

    pub fn inner(&self) -> &P {
        &self.inner
    }

    async fn call<T, F, Fut>(&self, context: &str, address: &str, f: F) -> Result<T, ProviderError>
    where
        F: Fn() -> Fut + Send + Sync,
        Fut: Future<Output = Result<T, ProviderError>> + Send,
        T: Send,
    {
        let max_attempts = self.policy.max_attempts.max(1);
        let limit = Duration::from_millis(self.policy.timeout_ms);
        let mut attempt = 1;

        loop {
            let result = match timeout(limit, f()).await {
                Ok(result) => result,
                Err(_) => Err(ProviderError::Timeout(self.policy.timeout_ms)),
            };

            match result {
                Ok(value) => return Ok(value),
                Err(e) if e.is_transient() && attempt < max_attempts => {
                    let delay = self.policy.backoff(attempt);
                    warn!(
                        %address,
                        attempt,
                        max_attempts,
                        error = %e,
                        "{context} failed, retrying in {delay:?}"
                    );
                    sleep(delay).await;
                    attempt += 1;
                }
                Err(e) => {
                    debug!(%address, attempt, error = %e, "{context} failed");
                    return Err(e);
                }
            }
        }
    }
}

#[async_trait]
impl<P: Provider> Provider for RetryingProvider<P> {
    async fn get_stats(&self, address: &str) -> Result<AddressStats, ProviderError> {
        self.call("get_stats", address, || self.inner.get_stats(address))
            .await
    }

    async fn get_transactions(&self, address: &str) -> Result<Vec<Transaction>, ProviderError> {
        self.call("get_transactions", address, || {
            self.inner.get_transactions(address)
        })
        .await
    }
}
