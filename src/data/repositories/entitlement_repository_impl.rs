use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Months, Utc};
use tracing::{debug, info, warn};

use crate::config::BillingConfig;
use crate::data::datasources::billing_sdk_datasource::BillingSdkDatasource;
use crate::data::datasources::identity_datasource::IdentityProvider;
use crate::data::datasources::ledger_datasource::LedgerDatasource;
use crate::data::datasources::utils::with_retry;
use crate::data::repositories::capability_gate::{CapabilityGate, GateStatus};
use crate::data::repositories::catalog_resolver::CatalogResolver;
use crate::domain::entities::product::{PlanType, Product};
use crate::domain::entities::purchase::Purchase;
use crate::domain::entities::verification::VerificationResult;
use crate::domain::repositories::entitlement_repository::EntitlementRepository;
use crate::errors::BillingError;
use crate::events::PurchaseEventHub;

/// Default implementation of the purchase/entitlement lifecycle over a
/// native billing SDK, the backend ledger, and the host's identity
/// provider.
pub struct EntitlementRepositoryImpl<B, L, I>
where
    B: BillingSdkDatasource + 'static,
    L: LedgerDatasource,
    I: IdentityProvider,
{
    config: BillingConfig,
    billing: Arc<B>,
    ledger: L,
    identity: I,
    gate: Arc<CapabilityGate<B>>,
    catalog: CatalogResolver<B>,
    hub: Arc<PurchaseEventHub>,
}

impl<B, L, I> EntitlementRepositoryImpl<B, L, I>
where
    B: BillingSdkDatasource + 'static,
    L: LedgerDatasource,
    I: IdentityProvider,
{
    pub fn new(
        config: BillingConfig,
        billing: B,
        ledger: L,
        identity: I,
        hub: Arc<PurchaseEventHub>,
    ) -> EntitlementRepositoryImpl<B, L, I> {
        let billing = Arc::new(billing);
        let gate = Arc::new(CapabilityGate::new(
            &config,
            Arc::clone(&billing),
            Arc::clone(&hub),
        ));
        let catalog = CatalogResolver::new(Arc::clone(&billing), Arc::clone(&gate), config.retry);
        EntitlementRepositoryImpl {
            config,
            billing,
            ledger,
            identity,
            gate,
            catalog,
            hub,
        }
    }

    /// Web fallback purchase: synthesizes a mock purchase so development
    /// and testing can proceed without a real billing backend.
    fn purchase_mock(&self, product_id: &str) -> Purchase {
        info!(product_id, "purchase attempted in non-native environment, synthesizing mock");
        let purchase = Purchase::mock(product_id);
        self.hub.publish(&purchase);
        purchase
    }

    async fn purchase_native(&self, product_id: &str) -> Result<Purchase, BillingError> {
        let offerings = with_retry(&self.config.retry, "getOfferings", || {
            self.billing.get_offerings()
        })
        .await?;
        let current = offerings
            .current
            .ok_or_else(|| BillingError::Sdk("no current offering available".to_string()))?;
        let package = current
            .available_packages
            .iter()
            .find(|package| package.product.identifier == product_id)
            .ok_or_else(|| BillingError::PackageNotFound(product_id.to_string()))?;
        // Purchase initiation itself is never retried.
        let result = self
            .billing
            .purchase_package(package, &current.identifier)
            .await?;
        let store = self
            .gate
            .platform()
            .store()
            .ok_or(BillingError::SdkUnavailable)?;
        Ok(Purchase::native(&result.product_identifier, store))
    }

    /// Ledger-path verification: upgrades the backend row and computes a
    /// client-side expiration estimate. The backend's own stored value
    /// remains the source of truth for server-side gating.
    async fn verify_via_ledger(
        &self,
        purchase: &Purchase,
        user_id: &str,
    ) -> VerificationResult {
        let plan_type = PlanType::infer_from_identifier(&purchase.product_id);
        match self.ledger.upgrade_to_premium(user_id, plan_type).await {
            Ok(()) => VerificationResult::verified(plan_type, estimated_expiration(plan_type)),
            Err(error) => {
                warn!(user_id, error = %error, "ledger upgrade failed during verification");
                VerificationResult::failed(error.to_string())
            }
        }
    }

    /// Native-path verification: the SDK's account snapshot is the source
    /// of truth; on success the ledger is additionally updated
    /// (write-through) so server-side checks stay consistent.
    async fn verify_native(&self, user_id: &str) -> VerificationResult {
        self.gate.initialize().await;
        let outcome: Result<VerificationResult, BillingError> = async {
            let info = with_retry(&self.config.retry, "getCustomerInfo", || {
                self.billing.get_customer_info()
            })
            .await?;
            let snapshot = info.to_snapshot()?;
            let Some(entitlement) = snapshot.entitlement(&self.config.entitlement_key) else {
                // A completed purchase call does not guarantee verified
                // entitlement (e.g. pending payment).
                return Ok(VerificationResult::failed("no active entitlement"));
            };
            let plan_type = entitlement.plan_type();
            let expires_at = entitlement
                .expiration_date
                .unwrap_or_else(|| estimated_expiration(PlanType::Yearly));
            self.ledger.upgrade_to_premium(user_id, plan_type).await?;
            Ok(VerificationResult::verified(plan_type, expires_at))
        }
        .await;
        outcome.unwrap_or_else(|error| {
            warn!(user_id, error = %error, "native verification failed");
            VerificationResult::failed(error.to_string())
        })
    }

    async fn restore_from_ledger(&self) -> Vec<Purchase> {
        let Some(user_id) = self.identity.current_user_id().await else {
            debug!("restore requested without an authenticated user");
            return Vec::new();
        };
        match with_retry(&self.config.retry, "ledger.active_subscription", || {
            self.ledger.active_subscription(&user_id)
        })
        .await
        {
            Ok(Some(row)) => {
                vec![Purchase::restored(row.product_id(), None, row.created_at)]
            }
            Ok(None) => {
                debug!(user_id, "no active subscription to restore");
                Vec::new()
            }
            Err(error) => {
                warn!(user_id, error = %error, "ledger restore query failed");
                Vec::new()
            }
        }
    }

    async fn restore_native(&self) -> Vec<Purchase> {
        let info = match self.billing.restore_purchases().await {
            Ok(info) => info,
            Err(error) => {
                warn!(error = %error, "native restore failed");
                return Vec::new();
            }
        };
        let snapshot = match info.to_snapshot() {
            Ok(snapshot) => snapshot,
            Err(error) => {
                warn!(error = %error, "restored account snapshot did not decode");
                return Vec::new();
            }
        };
        let store = self.gate.platform().store();
        let purchases: Vec<Purchase> = snapshot
            .active_product_ids
            .iter()
            .map(|product_id| Purchase::restored(product_id, store, Utc::now()))
            .collect();
        for purchase in &purchases {
            self.hub.publish(purchase);
        }
        purchases
    }
}

#[async_trait]
impl<B, L, I> EntitlementRepository for EntitlementRepositoryImpl<B, L, I>
where
    B: BillingSdkDatasource + 'static,
    L: LedgerDatasource,
    I: IdentityProvider,
{
    async fn initialize(&self) {
        self.gate.initialize().await;
    }

    async fn get_products(&self) -> Vec<Product> {
        self.catalog.get_products().await
    }

    async fn clear_product_cache(&self) {
        self.catalog.clear_cache().await;
    }

    async fn purchase(&self, product_id: &str) -> Option<Purchase> {
        match self.gate.initialize().await {
            GateStatus::Ready => match self.purchase_native(product_id).await {
                Ok(purchase) => {
                    self.hub.publish(&purchase);
                    Some(purchase)
                }
                Err(BillingError::PurchaseCancelled) => {
                    info!(product_id, "purchase cancelled by user");
                    None
                }
                Err(error) => {
                    warn!(product_id, error = %error, "purchase failed");
                    None
                }
            },
            GateStatus::WebFallback => {
                if self.gate.is_native_environment() {
                    // Never synthesize mock purchases on a native device
                    // whose SDK failed to come up.
                    warn!(product_id, "billing SDK not ready, purchase aborted");
                    None
                } else {
                    Some(self.purchase_mock(product_id))
                }
            }
        }
    }

    async fn verify(&self, purchase: &Purchase, user_id: &str) -> VerificationResult {
        // The purchase's platform field, fixed at creation, selects the
        // source of truth for its whole lifetime.
        match purchase.platform {
            None => self.verify_via_ledger(purchase, user_id).await,
            Some(_) => self.verify_native(user_id).await,
        }
    }

    async fn restore(&self) -> Vec<Purchase> {
        match self.gate.initialize().await {
            GateStatus::Ready => self.restore_native().await,
            GateStatus::WebFallback => self.restore_from_ledger().await,
        }
    }

    async fn is_entitled(&self) -> bool {
        match self.gate.initialize().await {
            // Read-only check against the SDK snapshot, intentionally
            // cheaper than full verification (no ledger write-through).
            GateStatus::Ready => {
                let snapshot = with_retry(&self.config.retry, "getCustomerInfo", || {
                    self.billing.get_customer_info()
                })
                .await
                .and_then(|info| info.to_snapshot());
                match snapshot {
                    Ok(snapshot) => snapshot.is_entitled(&self.config.entitlement_key),
                    Err(error) => {
                        warn!(error = %error, "entitlement check failed");
                        false
                    }
                }
            }
            // Reuses the ledger restore query rather than a separate
            // cache: a small latency cost for a single source of truth.
            GateStatus::WebFallback => !self.restore_from_ledger().await.is_empty(),
        }
    }

    async fn set_user_id(&self, user_id: &str) {
        if self.gate.initialize().await != GateStatus::Ready {
            return;
        }
        if let Err(error) = self.billing.log_in(user_id).await {
            warn!(user_id, error = %error, "billing SDK log-in failed");
        }
    }
}

/// Client-side expiration estimate for ledger-path verification, and the
/// default when a native snapshot carries no expiration.
fn estimated_expiration(plan_type: PlanType) -> DateTime<Utc> {
    let now = Utc::now();
    let months = match plan_type {
        PlanType::Monthly => Months::new(1),
        PlanType::Yearly => Months::new(12),
    };
    now.checked_add_months(months).unwrap_or(now)
}
