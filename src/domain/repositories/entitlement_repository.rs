use async_trait::async_trait;

use crate::domain::entities::{
    product::Product, purchase::Purchase, verification::VerificationResult,
};

/// Purchase/entitlement lifecycle operations exposed to the premium-gating
/// UI.
///
/// Every operation catches collaborator failures at the boundary and
/// degrades into its structured result; none throws past this interface.
#[async_trait]
pub trait EntitlementRepository: Send + Sync {
    /// Initializes the platform capability gate (idempotent,
    /// single-flight). Failure degrades to web-fallback behavior, it is
    /// never surfaced.
    async fn initialize(&self);

    /// Purchasable products, from the live catalog when reachable, else
    /// the static fallback catalog.
    async fn get_products(&self) -> Vec<Product>;

    /// Drops the cached live catalog.
    async fn clear_product_cache(&self);

    /// Drives one purchase attempt end to end. `None` means no purchase
    /// occurred (cancellation, decline, connectivity, unknown product) and
    /// no partial state was created.
    async fn purchase(&self, product_id: &str) -> Option<Purchase>;

    /// Independently confirms entitlement for a purchase against the
    /// source of truth selected by the purchase's platform field.
    async fn verify(&self, purchase: &Purchase, user_id: &str) -> VerificationResult;

    /// Reconciles all purchases tied to the current user identity.
    /// Nothing to restore is an empty list, not an error.
    async fn restore(&self) -> Vec<Purchase>;

    /// Fast-path entitlement check, without a full purchase round trip.
    async fn is_entitled(&self) -> bool;

    /// Forwards the authenticated identity to the billing SDK. Errors are
    /// logged and swallowed.
    async fn set_user_id(&self, user_id: &str);
}
