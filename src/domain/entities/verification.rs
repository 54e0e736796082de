use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::product::PlanType;

/// Canonical outcome of reconciling a `Purchase` against a source of truth.
///
/// This is the only structure the premium-gating UI may trust for
/// entitlement decisions; a `Purchase` alone is never sufficient. Computed
/// fresh on every verification call and never cached.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VerificationResult {
    pub success: bool,
    pub plan_type: PlanType,
    pub expires_at: DateTime<Utc>,
    /// Diagnostic detail for logging; user-visible behavior on failure is
    /// always just "no entitlement change occurred".
    pub error: Option<String>,
}

impl VerificationResult {
    pub fn verified(plan_type: PlanType, expires_at: DateTime<Utc>) -> VerificationResult {
        VerificationResult {
            success: true,
            plan_type,
            expires_at,
            error: None,
        }
    }

    pub fn failed(error: impl Into<String>) -> VerificationResult {
        VerificationResult {
            success: false,
            plan_type: PlanType::Monthly,
            expires_at: Utc::now(),
            error: Some(error.into()),
        }
    }
}
