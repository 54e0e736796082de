use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::entities::product::{PlanType, PREMIUM_MONTHLY_ID, PREMIUM_YEARLY_ID};

/// One row of the backend ledger's subscription table, as returned by the
/// filtered read for the current user.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubscriptionRowModel {
    pub plan_type: PlanType,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub expires_at: Option<DateTime<Utc>>,
    pub is_active: bool,
}

impl SubscriptionRowModel {
    /// Product identifier the stored plan maps back onto when
    /// re-synthesizing a purchase from this row.
    pub fn product_id(&self) -> &'static str {
        match self.plan_type {
            PlanType::Yearly => PREMIUM_YEARLY_ID,
            PlanType::Monthly => PREMIUM_MONTHLY_ID,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_ledger_row_and_maps_plan_to_product_id() {
        let row: SubscriptionRowModel = serde_json::from_str(
            r#"{
                "plan_type": "yearly",
                "created_at": "2026-01-01T00:00:00Z",
                "expires_at": "2027-01-01T00:00:00Z",
                "is_active": true
            }"#,
        )
        .unwrap();
        assert_eq!(row.plan_type, PlanType::Yearly);
        assert_eq!(row.product_id(), PREMIUM_YEARLY_ID);
    }

    #[test]
    fn unknown_plan_type_fails_to_decode() {
        let result: Result<SubscriptionRowModel, _> = serde_json::from_str(
            r#"{
                "plan_type": "lifetime",
                "created_at": "2026-01-01T00:00:00Z",
                "is_active": true
            }"#,
        );
        assert!(result.is_err());
    }
}
