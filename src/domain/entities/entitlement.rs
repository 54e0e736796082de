use std::collections::HashMap;

use chrono::{DateTime, Utc};

use super::product::PlanType;

/// One entitlement in an account snapshot, keyed by entitlement identifier
/// in [`EntitlementSnapshot::active`].
#[derive(Debug, Clone, PartialEq)]
pub struct Entitlement {
    pub will_renew: bool,
    /// Period-type string as reported by the billing system (e.g.
    /// `"normal_annual"`); mapped onto a [`PlanType`] via
    /// [`Entitlement::plan_type`].
    pub period_type: String,
    pub expiration_date: Option<DateTime<Utc>>,
}

impl Entitlement {
    pub fn plan_type(&self) -> PlanType {
        PlanType::from_period_type(&self.period_type)
    }
}

/// Canonical account-scoped entitlement state, decoded from the native
/// SDK's customer info (or, conceptually, a ledger row).
///
/// This snapshot is authoritative: when it disagrees with a locally held
/// `Purchase`, the snapshot wins.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EntitlementSnapshot {
    /// Currently *active* entitlements only, keyed by entitlement id.
    pub active: HashMap<String, Entitlement>,
    /// Product identifiers of currently active subscriptions.
    pub active_product_ids: Vec<String>,
}

impl EntitlementSnapshot {
    pub fn is_entitled(&self, entitlement_key: &str) -> bool {
        self.active.contains_key(entitlement_key)
    }

    pub fn entitlement(&self, entitlement_key: &str) -> Option<&Entitlement> {
        self.active.get(entitlement_key)
    }
}
