use std::time::Duration;

use serde::Deserialize;

use crate::domain::entities::platform::Platform;

/// Entitlement key gating the premium feature set.
pub const PREMIUM_ENTITLEMENT: &str = "premium";

/// Service configuration, built once at application startup by the host.
#[derive(Debug, Clone, Deserialize)]
pub struct BillingConfig {
    /// Execution environment, detected by the host.
    pub platform: Platform,
    /// Platform-specific billing SDK API keys. Only the key matching
    /// `platform` is ever used.
    #[serde(default)]
    pub ios_api_key: String,
    #[serde(default)]
    pub android_api_key: String,
    /// Entitlement key checked for premium gating.
    #[serde(default = "default_entitlement_key")]
    pub entitlement_key: String,
    pub ledger: LedgerConfig,
    #[serde(default)]
    pub retry: RetryPolicy,
}

impl BillingConfig {
    /// The SDK API key for the configured platform, if it has one.
    pub fn sdk_api_key(&self) -> Option<&str> {
        match self.platform {
            Platform::Ios => Some(self.ios_api_key.as_str()),
            Platform::Android => Some(self.android_api_key.as_str()),
            Platform::Web => None,
        }
    }
}

/// Backend subscription ledger endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct LedgerConfig {
    /// Base URL of the ledger's REST surface (no trailing slash).
    pub base_url: String,
    pub api_key: String,
}

/// Bounded exponential backoff for idempotent reads (catalog fetch,
/// entitlement check, ledger row read). Purchase initiation and the ledger
/// upgrade RPC are never retried, to avoid duplicate charges.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct RetryPolicy {
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
    #[serde(default = "default_base_delay_ms")]
    pub base_delay_ms: u64,
}

impl RetryPolicy {
    /// Delay before the given retry (1-based attempt that just failed):
    /// base, 2x base, 4x base, ...
    pub fn delay(&self, failed_attempt: u32) -> Duration {
        let factor = 1u64 << failed_attempt.saturating_sub(1).min(16);
        Duration::from_millis(self.base_delay_ms.saturating_mul(factor))
    }

    /// Policy that never retries, for tests and non-idempotent paths.
    pub fn none() -> RetryPolicy {
        RetryPolicy {
            max_attempts: 1,
            base_delay_ms: 0,
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        RetryPolicy {
            max_attempts: default_max_attempts(),
            base_delay_ms: default_base_delay_ms(),
        }
    }
}

fn default_entitlement_key() -> String {
    PREMIUM_ENTITLEMENT.to_string()
}

fn default_max_attempts() -> u32 {
    3
}

fn default_base_delay_ms() -> u64 {
    100
}
