use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::platform::StorePlatform;

/// Prefixes distinguishing the provenance of a locally generated
/// transaction id.
pub const MOCK_TRANSACTION_PREFIX: &str = "mock";
pub const NATIVE_TRANSACTION_PREFIX: &str = "native";
pub const RESTORED_TRANSACTION_PREFIX: &str = "restored";

/// A normalized purchase record.
///
/// A `Purchase` is a client-side assertion that a purchase flow completed,
/// not proof of entitlement: entitlement is only established by a
/// `VerificationResult` or an entitlement snapshot. Once created a purchase
/// is never mutated; renewals and restorations produce fresh records.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Purchase {
    pub product_id: String,
    /// Locally generated (`<prefix>-<uuid>`); the underlying store's own
    /// transaction id is not exposed at this layer.
    pub transaction_id: String,
    /// Purchase-attempt time as observed on this device, not the billing
    /// system's authoritative time.
    pub timestamp: DateTime<Utc>,
    /// Raw receipt token, when the purchase path produced one.
    pub receipt: Option<String>,
    /// Store the purchase originated from; `None` for the web fallback
    /// path. Set at creation, immutable, and decides which verification
    /// path applies for the lifetime of this record.
    pub platform: Option<StorePlatform>,
}

impl Purchase {
    /// Synthesizes the development/testing purchase used on hosts with no
    /// real billing capability.
    pub fn mock(product_id: &str) -> Purchase {
        let now = Utc::now();
        Purchase {
            product_id: product_id.to_string(),
            transaction_id: new_transaction_id(MOCK_TRANSACTION_PREFIX),
            timestamp: now,
            receipt: Some(BASE64.encode(format!("mock:{}:{}", product_id, now.timestamp_millis()))),
            platform: None,
        }
    }

    /// Normalizes a confirmed native store purchase.
    pub fn native(product_id: &str, store: StorePlatform) -> Purchase {
        Purchase {
            product_id: product_id.to_string(),
            transaction_id: new_transaction_id(NATIVE_TRANSACTION_PREFIX),
            timestamp: Utc::now(),
            receipt: None,
            platform: Some(store),
        }
    }

    /// Purchase synthesized from an SDK account-change event, one per
    /// active subscription reported.
    pub fn native_event(product_id: &str, store: Option<StorePlatform>) -> Purchase {
        Purchase {
            product_id: product_id.to_string(),
            transaction_id: new_transaction_id(NATIVE_TRANSACTION_PREFIX),
            timestamp: Utc::now(),
            receipt: None,
            platform: store,
        }
    }

    /// Re-synthesizes a purchase from a restoration source, which does not
    /// expose the original transaction id.
    pub fn restored(
        product_id: &str,
        store: Option<StorePlatform>,
        timestamp: DateTime<Utc>,
    ) -> Purchase {
        Purchase {
            product_id: product_id.to_string(),
            transaction_id: new_transaction_id(RESTORED_TRANSACTION_PREFIX),
            timestamp,
            receipt: None,
            platform: store,
        }
    }

    pub fn is_mock(&self) -> bool {
        self.transaction_id
            .starts_with(&format!("{}-", MOCK_TRANSACTION_PREFIX))
    }
}

fn new_transaction_id(prefix: &str) -> String {
    format!("{}-{}", prefix, Uuid::new_v4())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mock_purchase_is_distinguishable_and_web_originated() {
        let p = Purchase::mock("premium_monthly");
        assert!(p.is_mock());
        assert!(p.transaction_id.starts_with("mock-"));
        assert!(p.receipt.is_some());
        assert_eq!(p.platform, None);
    }

    #[test]
    fn native_purchase_carries_store_platform() {
        let p = Purchase::native("premium_yearly", StorePlatform::Ios);
        assert!(!p.is_mock());
        assert!(p.transaction_id.starts_with("native-"));
        assert_eq!(p.platform, Some(StorePlatform::Ios));
    }

    #[test]
    fn transaction_ids_are_unique_per_record() {
        let a = Purchase::mock("premium_monthly");
        let b = Purchase::mock("premium_monthly");
        assert_ne!(a.transaction_id, b.transaction_id);
    }
}
