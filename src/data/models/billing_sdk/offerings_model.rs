use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::domain::entities::product::{PlanType, Product};

/// Raw offerings shape returned by the native billing SDK's
/// `getOfferings()`.
///
/// Field names follow the SDK's JSON bridge payload. Whether fields are
/// nullable is not documented explicitly, so reasonable assumptions are
/// made.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OfferingsModel {
    /// The offering configured as current for this user, if any.
    pub current: Option<OfferingModel>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OfferingModel {
    pub identifier: String,
    #[serde(default)]
    pub server_description: Option<String>,
    #[serde(default)]
    pub available_packages: Vec<PackageModel>,
}

/// A store-defined bundle wrapping one purchasable product.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PackageModel {
    pub identifier: String,
    /// Store package-type tag (`"ANNUAL"`, `"MONTHLY"`, ...). Optional:
    /// some catalog sources omit it, in which case the billing period is
    /// inferred from the product identifier.
    #[serde(default)]
    pub package_type: Option<String>,
    pub product: StoreProductModel,
    #[serde(default)]
    pub offering_identifier: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoreProductModel {
    pub identifier: String,
    pub title: String,
    pub description: String,
    pub price: f64,
    /// Localized, store-formatted price string.
    pub price_string: String,
    /// ISO 4217.
    pub currency_code: String,
}

impl PackageModel {
    /// Maps a store package 1:1 onto the canonical [`Product`].
    ///
    /// The billing period comes from the explicit `packageType` field when
    /// it is present and recognized; otherwise the identifier
    /// naming-convention fallback applies and is flagged in the logs.
    pub fn to_product(&self) -> Product {
        let plan_type = match self.package_type.as_deref() {
            Some(tag) if tag.eq_ignore_ascii_case("ANNUAL") => PlanType::Yearly,
            Some(tag) if tag.eq_ignore_ascii_case("MONTHLY") => PlanType::Monthly,
            other => {
                warn!(
                    product_id = %self.product.identifier,
                    package_type = ?other,
                    "package has no recognized period tag, inferring billing \
                     period from product identifier"
                );
                PlanType::infer_from_identifier(&self.product.identifier)
            }
        };
        Product {
            id: self.product.identifier.clone(),
            title: self.product.title.clone(),
            description: self.product.description.clone(),
            price: self.product.price_string.clone(),
            price_as_number: self.product.price,
            currency: self.product.currency_code.clone(),
            plan_type,
        }
    }
}
