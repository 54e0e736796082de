use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::entities::entitlement::{Entitlement, EntitlementSnapshot};
use crate::errors::BillingError;

/// Raw account snapshot returned by the native billing SDK's
/// `getCustomerInfo()` / `restorePurchases()` and pushed through its
/// account-change listener.
///
/// Dates arrive as RFC 3339 strings; they are only parsed by the validated
/// mapping into [`EntitlementSnapshot`], so a malformed date surfaces as a
/// typed decode error instead of being trusted blindly.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomerInfoModel {
    pub entitlements: EntitlementsModel,
    #[serde(default)]
    pub active_subscriptions: Vec<String>,
    #[serde(default)]
    pub all_purchased_product_identifiers: Vec<String>,
    #[serde(default)]
    pub latest_expiration_date: Option<String>,
    #[serde(default)]
    pub original_app_user_id: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EntitlementsModel {
    #[serde(default)]
    pub all: HashMap<String, EntitlementModel>,
    #[serde(default)]
    pub active: HashMap<String, EntitlementModel>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntitlementModel {
    pub identifier: String,
    pub is_active: bool,
    #[serde(default)]
    pub will_renew: bool,
    #[serde(default)]
    pub period_type: String,
    #[serde(default)]
    pub expiration_date: Option<String>,
}

/// Result of the native `purchasePackage` call.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PurchaseResultModel {
    pub customer_info: CustomerInfoModel,
    pub product_identifier: String,
}

impl CustomerInfoModel {
    /// Validated mapping into the canonical entitlement snapshot.
    pub fn to_snapshot(&self) -> Result<EntitlementSnapshot, BillingError> {
        let mut active = HashMap::new();
        for (key, entitlement) in &self.entitlements.active {
            active.insert(key.clone(), entitlement.to_entitlement()?);
        }
        Ok(EntitlementSnapshot {
            active,
            active_product_ids: self.active_subscriptions.clone(),
        })
    }
}

impl EntitlementModel {
    fn to_entitlement(&self) -> Result<Entitlement, BillingError> {
        Ok(Entitlement {
            will_renew: self.will_renew,
            period_type: self.period_type.clone(),
            expiration_date: self
                .expiration_date
                .as_deref()
                .map(parse_sdk_date)
                .transpose()?,
        })
    }
}

pub(crate) fn parse_sdk_date(raw: &str) -> Result<DateTime<Utc>, BillingError> {
    DateTime::parse_from_rfc3339(raw)
        .map(|d| d.with_timezone(&Utc))
        .map_err(|e| BillingError::Decode(format!("invalid SDK date '{}': {}", raw, e)))
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;

    /// Snapshot with one active entitlement under `key`.
    pub(crate) fn customer_info_with_entitlement(
        key: &str,
        period_type: &str,
        expiration_date: Option<&str>,
        active_subscriptions: &[&str],
    ) -> CustomerInfoModel {
        let mut active = HashMap::new();
        active.insert(
            key.to_string(),
            EntitlementModel {
                identifier: key.to_string(),
                is_active: true,
                will_renew: true,
                period_type: period_type.to_string(),
                expiration_date: expiration_date.map(str::to_string),
            },
        );
        CustomerInfoModel {
            entitlements: EntitlementsModel {
                all: active.clone(),
                active,
            },
            active_subscriptions: active_subscriptions.iter().map(|s| s.to_string()).collect(),
            all_purchased_product_identifiers: vec![],
            latest_expiration_date: expiration_date.map(str::to_string),
            original_app_user_id: None,
        }
    }

    /// Snapshot with no entitlements at all.
    pub(crate) fn empty_customer_info() -> CustomerInfoModel {
        CustomerInfoModel {
            entitlements: EntitlementsModel::default(),
            active_subscriptions: vec![],
            all_purchased_product_identifiers: vec![],
            latest_expiration_date: None,
            original_app_user_id: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::testing::*;
    use super::*;
    use crate::domain::entities::product::PlanType;

    #[test]
    fn maps_active_entitlements_into_snapshot() {
        let info = customer_info_with_entitlement(
            "premium",
            "normal_annual",
            Some("2027-01-15T00:00:00Z"),
            &["premium_yearly"],
        );
        let snapshot = info.to_snapshot().unwrap();
        assert!(snapshot.is_entitled("premium"));
        let entitlement = snapshot.entitlement("premium").unwrap();
        assert_eq!(entitlement.plan_type(), PlanType::Yearly);
        assert_eq!(
            entitlement.expiration_date.unwrap().to_rfc3339(),
            "2027-01-15T00:00:00+00:00"
        );
        assert_eq!(snapshot.active_product_ids, vec!["premium_yearly"]);
    }

    #[test]
    fn malformed_expiration_date_is_a_typed_decode_error() {
        let info =
            customer_info_with_entitlement("premium", "normal", Some("next tuesday"), &[]);
        match info.to_snapshot() {
            Err(BillingError::Decode(msg)) => assert!(msg.contains("next tuesday")),
            other => panic!("expected decode error, got {:?}", other),
        }
    }

    #[test]
    fn decodes_sdk_wire_shape() {
        let info: CustomerInfoModel = serde_json::from_str(
            r#"{
                "entitlements": {
                    "all": {},
                    "active": {
                        "premium": {
                            "identifier": "premium",
                            "isActive": true,
                            "willRenew": true,
                            "periodType": "normal",
                            "expirationDate": "2026-09-26T12:00:00Z"
                        }
                    }
                },
                "activeSubscriptions": ["premium_monthly"],
                "latestExpirationDate": "2026-09-26T12:00:00Z"
            }"#,
        )
        .unwrap();
        let snapshot = info.to_snapshot().unwrap();
        assert!(snapshot.is_entitled("premium"));
        assert_eq!(
            snapshot.entitlement("premium").unwrap().plan_type(),
            PlanType::Monthly
        );
    }
}
