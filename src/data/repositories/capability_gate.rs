use std::sync::Arc;

use tokio::sync::OnceCell;
use tracing::{info, warn};

use crate::config::BillingConfig;
use crate::data::datasources::billing_sdk_datasource::BillingSdkDatasource;
use crate::domain::entities::platform::Platform;
use crate::domain::entities::purchase::Purchase;
use crate::events::PurchaseEventHub;

/// Outcome of the one-per-process capability probe.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum GateStatus {
    /// Native billing SDK configured and usable.
    Ready,
    /// Browser host, or SDK configuration failed; all components behave as
    /// though running on web.
    WebFallback,
}

/// Detects whether the native billing SDK is actually usable and caches
/// the answer for the process lifetime.
///
/// Initialization is single-flight: concurrent callers from independent
/// purchase/verify/restore entry points converge on one underlying SDK
/// configure attempt (double configuration is undefined behavior in most
/// billing SDKs). Configuration failure is logged and degrades to
/// [`GateStatus::WebFallback`]; it never propagates to callers.
pub(crate) struct CapabilityGate<B: BillingSdkDatasource> {
    platform: Platform,
    api_key: Option<String>,
    billing: Arc<B>,
    hub: Arc<PurchaseEventHub>,
    state: OnceCell<GateStatus>,
}

impl<B: BillingSdkDatasource + 'static> CapabilityGate<B> {
    pub(crate) fn new(
        config: &BillingConfig,
        billing: Arc<B>,
        hub: Arc<PurchaseEventHub>,
    ) -> CapabilityGate<B> {
        CapabilityGate {
            platform: config.platform,
            api_key: config.sdk_api_key().map(str::to_string),
            billing,
            hub,
            state: OnceCell::new(),
        }
    }

    pub(crate) fn platform(&self) -> Platform {
        self.platform
    }

    pub(crate) fn is_native_environment(&self) -> bool {
        self.platform.is_native()
    }

    /// Idempotent, single-flight initialization. Concurrent callers await
    /// the same in-flight attempt.
    pub(crate) async fn initialize(&self) -> GateStatus {
        *self
            .state
            .get_or_init(|| async { self.attempt_configure().await })
            .await
    }

    async fn attempt_configure(&self) -> GateStatus {
        if !self.platform.is_native() {
            return GateStatus::WebFallback;
        }
        let api_key = self.api_key.as_deref().unwrap_or_default();
        match self.billing.configure(api_key, None).await {
            Ok(()) => {
                self.install_account_listener();
                info!(platform = ?self.platform, "billing SDK configured");
                GateStatus::Ready
            }
            Err(error) => {
                warn!(
                    platform = ?self.platform,
                    error = %error,
                    "billing SDK configuration failed, degrading to web fallback"
                );
                GateStatus::WebFallback
            }
        }
    }

    /// Translates each native account-change event into the canonical
    /// entitlement shape and forwards one purchase per active subscription
    /// to the event hub. Undecodable events are logged and dropped.
    fn install_account_listener(&self) {
        let hub = Arc::clone(&self.hub);
        let store = self.platform.store();
        self.billing.set_customer_info_listener(Box::new(move |info| {
            let snapshot = match info.to_snapshot() {
                Ok(snapshot) => snapshot,
                Err(error) => {
                    warn!(error = %error, "dropping undecodable account-change event");
                    return;
                }
            };
            for product_id in &snapshot.active_product_ids {
                hub.publish(&Purchase::native_event(product_id, store));
            }
        }));
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::config::{LedgerConfig, RetryPolicy};
    use crate::data::datasources::mocks::MockBillingSdk;
    use crate::data::models::billing_sdk::customer_info_model::testing::{
        customer_info_with_entitlement, empty_customer_info,
    };
    use crate::events::testing::RecordingListener;

    fn config(platform: Platform) -> BillingConfig {
        BillingConfig {
            platform,
            ios_api_key: "ios_key".to_string(),
            android_api_key: "android_key".to_string(),
            entitlement_key: "premium".to_string(),
            ledger: LedgerConfig {
                base_url: "https://ledger.test".to_string(),
                api_key: "test".to_string(),
            },
            retry: RetryPolicy::none(),
        }
    }

    fn gate(
        platform: Platform,
        sdk: MockBillingSdk,
    ) -> (Arc<CapabilityGate<MockBillingSdk>>, Arc<MockBillingSdk>, Arc<PurchaseEventHub>) {
        let sdk = Arc::new(sdk);
        let hub = Arc::new(PurchaseEventHub::new());
        let gate = Arc::new(CapabilityGate::new(
            &config(platform),
            Arc::clone(&sdk),
            Arc::clone(&hub),
        ));
        (gate, sdk, hub)
    }

    #[tokio::test]
    async fn concurrent_initialize_configures_exactly_once() {
        let mut sdk = MockBillingSdk::healthy();
        sdk.configure_delay = Duration::from_millis(20);
        let (gate, sdk, _hub) = gate(Platform::Ios, sdk);

        let (a, b, c) = tokio::join!(gate.initialize(), gate.initialize(), gate.initialize());

        assert_eq!(a, GateStatus::Ready);
        assert_eq!(b, GateStatus::Ready);
        assert_eq!(c, GateStatus::Ready);
        assert_eq!(sdk.configure_calls.load(std::sync::atomic::Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn web_host_never_attempts_native_configuration() {
        let (gate, sdk, _hub) = gate(Platform::Web, MockBillingSdk::healthy());
        assert_eq!(gate.initialize().await, GateStatus::WebFallback);
        assert_eq!(sdk.configure_calls.load(std::sync::atomic::Ordering::SeqCst), 0);
        assert!(!gate.is_native_environment());
    }

    #[tokio::test]
    async fn configuration_failure_degrades_without_raising() {
        let (gate, sdk, _hub) = gate(Platform::Android, MockBillingSdk::unconfigurable());
        assert_eq!(gate.initialize().await, GateStatus::WebFallback);
        assert!(!sdk.has_listener());
        // Re-initializing shares the cached outcome instead of retrying.
        assert_eq!(gate.initialize().await, GateStatus::WebFallback);
        assert_eq!(sdk.configure_calls.load(std::sync::atomic::Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn account_change_events_fan_out_per_active_subscription() {
        let (gate, sdk, hub) = gate(Platform::Ios, MockBillingSdk::healthy());
        gate.initialize().await;
        assert!(sdk.has_listener());

        let listener = RecordingListener::new();
        hub.subscribe(listener.clone());

        sdk.fire_account_change(customer_info_with_entitlement(
            "premium",
            "normal_annual",
            Some("2027-01-01T00:00:00Z"),
            &["premium_yearly", "premium_monthly"],
        ));

        assert_eq!(listener.count(), 2);
        assert_eq!(
            listener.product_ids(),
            vec!["premium_yearly", "premium_monthly"]
        );
    }

    #[tokio::test]
    async fn undecodable_account_change_event_is_dropped() {
        let (gate, sdk, hub) = gate(Platform::Ios, MockBillingSdk::healthy());
        gate.initialize().await;
        let listener = RecordingListener::new();
        hub.subscribe(listener.clone());

        sdk.fire_account_change(customer_info_with_entitlement(
            "premium",
            "normal",
            Some("not a timestamp"),
            &["premium_monthly"],
        ));
        sdk.fire_account_change(empty_customer_info());

        assert_eq!(listener.count(), 0);
    }
}
