use std::sync::Arc;

use crate::config::BillingConfig;
use crate::data::datasources::billing_sdk_datasource::BillingSdkDatasource;
use crate::data::datasources::identity_datasource::IdentityProvider;
use crate::data::datasources::ledger_datasource::LedgerDatasourceImpl;
use crate::data::repositories::entitlement_repository_impl::EntitlementRepositoryImpl;
use crate::domain::entities::product::Product;
use crate::domain::entities::purchase::Purchase;
use crate::domain::entities::verification::VerificationResult;
use crate::domain::repositories::entitlement_repository::EntitlementRepository;
use crate::events::{ListenerId, PurchaseEventHub, PurchaseListener};

/// The surface exposed to the premium-gating UI.
///
/// Constructed once at application startup and passed by reference to
/// consumers; tests instantiate isolated instances with mock
/// collaborators.
pub struct InAppPurchaseService<R: EntitlementRepository> {
    repository: R,
    hub: Arc<PurchaseEventHub>,
}

impl<R: EntitlementRepository> InAppPurchaseService<R> {
    pub async fn get_products(&self) -> Vec<Product> {
        self.repository.get_products().await
    }

    pub async fn clear_product_cache(&self) {
        self.repository.clear_product_cache().await
    }

    /// `None` means no purchase occurred and no partial state was created.
    pub async fn purchase(&self, product_id: &str) -> Option<Purchase> {
        self.repository.purchase(product_id).await
    }

    pub async fn verify(&self, purchase: &Purchase, user_id: &str) -> VerificationResult {
        self.repository.verify(purchase, user_id).await
    }

    pub async fn restore(&self) -> Vec<Purchase> {
        self.repository.restore().await
    }

    pub async fn is_entitled(&self) -> bool {
        self.repository.is_entitled().await
    }

    pub async fn set_user_id(&self, user_id: &str) {
        self.repository.set_user_id(user_id).await
    }

    pub fn subscribe(&self, listener: Arc<dyn PurchaseListener>) -> ListenerId {
        self.hub.subscribe(listener)
    }

    pub fn unsubscribe(&self, id: ListenerId) {
        self.hub.unsubscribe(id)
    }
}

impl<B, I> InAppPurchaseService<EntitlementRepositoryImpl<B, LedgerDatasourceImpl, I>>
where
    B: BillingSdkDatasource + 'static,
    I: IdentityProvider,
{
    /// Wires the default repository over the host-supplied billing SDK
    /// bridge and identity provider, and eagerly runs the capability
    /// gate's single-flight initialization.
    pub async fn new(config: BillingConfig, billing: B, identity: I) -> Self {
        let hub = Arc::new(PurchaseEventHub::new());
        let ledger = LedgerDatasourceImpl::new(&config.ledger);
        let repository =
            EntitlementRepositoryImpl::new(config, billing, ledger, identity, Arc::clone(&hub));
        repository.initialize().await;
        InAppPurchaseService { repository, hub }
    }
}
