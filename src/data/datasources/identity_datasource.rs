use async_trait::async_trait;

/// Source of the current authenticated user id, supplied by the host's
/// auth layer. Consulted by restoration, the fast-path entitlement check,
/// and the SDK log-in forwarding.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// `None` while no user is signed in.
    async fn current_user_id(&self) -> Option<String>;
}
