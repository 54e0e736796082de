use serde::{Deserialize, Serialize};

/// Product identifiers of the static fallback catalog. The live catalog may
/// use store-specific identifiers; these are what the ledger's `plan_type`
/// column maps back onto when restoring on the web path.
pub const PREMIUM_MONTHLY_ID: &str = "premium_monthly";
pub const PREMIUM_YEARLY_ID: &str = "premium_yearly";

/// Billing-period classification, shared between products and verified
/// subscriptions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlanType {
    Monthly,
    Yearly,
}

impl PlanType {
    pub fn as_str(&self) -> &'static str {
        match self {
            PlanType::Monthly => "monthly",
            PlanType::Yearly => "yearly",
        }
    }

    /// Naming-convention fallback: infers the billing period from the
    /// product identifier. Only used when the catalog source does not carry
    /// an explicit period field; callers log when they take this path.
    pub fn infer_from_identifier(product_id: &str) -> PlanType {
        if product_id.contains("yearly") {
            PlanType::Yearly
        } else {
            PlanType::Monthly
        }
    }

    /// Derives the plan from an entitlement snapshot's period-type string
    /// (e.g. `"normal_annual"`).
    pub fn from_period_type(period_type: &str) -> PlanType {
        if period_type.to_ascii_lowercase().contains("annual") {
            PlanType::Yearly
        } else {
            PlanType::Monthly
        }
    }
}

impl std::fmt::Display for PlanType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A purchasable offering as shown to the user. Immutable once fetched;
/// cached per process lifetime by the catalog resolver.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: String,
    pub title: String,
    pub description: String,
    /// Localized, store-formatted price string (e.g. `"$7.99"`).
    pub price: String,
    pub price_as_number: f64,
    /// ISO 4217 currency code.
    pub currency: String,
    pub plan_type: PlanType,
}
