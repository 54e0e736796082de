use std::sync::Arc;

use once_cell::sync::Lazy;
use tokio::sync::RwLock;
use tracing::{debug, warn};

use crate::config::RetryPolicy;
use crate::data::datasources::billing_sdk_datasource::BillingSdkDatasource;
use crate::data::datasources::utils::with_retry;
use crate::data::repositories::capability_gate::{CapabilityGate, GateStatus};
use crate::domain::entities::product::{
    PlanType, Product, PREMIUM_MONTHLY_ID, PREMIUM_YEARLY_ID,
};

/// Static fallback catalog: the application must remain purchasable-looking
/// even when the live catalog is unreachable (actual purchase against these
/// will fail later with "package not found" if no live package exists).
static FALLBACK_CATALOG: Lazy<Vec<Product>> = Lazy::new(|| {
    vec![
        Product {
            id: PREMIUM_MONTHLY_ID.to_string(),
            title: "Premium Monthly".to_string(),
            description: "Unlock all premium features, billed monthly".to_string(),
            price: "$7.99".to_string(),
            price_as_number: 7.99,
            currency: "USD".to_string(),
            plan_type: PlanType::Monthly,
        },
        Product {
            id: PREMIUM_YEARLY_ID.to_string(),
            title: "Premium Yearly".to_string(),
            description: "Unlock all premium features, billed yearly".to_string(),
            price: "$59.99".to_string(),
            price_as_number: 59.99,
            currency: "USD".to_string(),
            plan_type: PlanType::Yearly,
        },
    ]
});

pub(crate) fn fallback_catalog() -> Vec<Product> {
    FALLBACK_CATALOG.clone()
}

/// Fetches purchasable product definitions from the live catalog source,
/// caching the first successful fetch for the process lifetime.
///
/// Only live catalogs are cached; the fallback catalog is returned
/// uncached so a later call can recover the live source. The cache is
/// independent of the entitlement snapshot: stale pricing never blocks an
/// entitlement check.
pub(crate) struct CatalogResolver<B: BillingSdkDatasource> {
    billing: Arc<B>,
    gate: Arc<CapabilityGate<B>>,
    retry: RetryPolicy,
    cache: RwLock<Option<Vec<Product>>>,
}

impl<B: BillingSdkDatasource + 'static> CatalogResolver<B> {
    pub(crate) fn new(
        billing: Arc<B>,
        gate: Arc<CapabilityGate<B>>,
        retry: RetryPolicy,
    ) -> CatalogResolver<B> {
        CatalogResolver {
            billing,
            gate,
            retry,
            cache: RwLock::new(None),
        }
    }

    pub(crate) async fn get_products(&self) -> Vec<Product> {
        if self.gate.initialize().await != GateStatus::Ready {
            return fallback_catalog();
        }
        if let Some(cached) = self.cache.read().await.as_ref() {
            return cached.clone();
        }
        let offerings = match with_retry(&self.retry, "getOfferings", || {
            self.billing.get_offerings()
        })
        .await
        {
            Ok(offerings) => offerings,
            Err(error) => {
                warn!(error = %error, "live catalog unreachable, serving fallback catalog");
                return fallback_catalog();
            }
        };
        let Some(current) = offerings.current else {
            warn!("no current offering configured, serving fallback catalog");
            return fallback_catalog();
        };
        let products: Vec<Product> = current
            .available_packages
            .iter()
            .map(|package| package.to_product())
            .collect();
        if products.is_empty() {
            warn!(
                offering = %current.identifier,
                "current offering has no packages, serving fallback catalog"
            );
            return fallback_catalog();
        }
        debug!(count = products.len(), "live catalog fetched and cached");
        *self.cache.write().await = Some(products.clone());
        products
    }

    pub(crate) async fn clear_cache(&self) {
        *self.cache.write().await = None;
    }
}
