use async_trait::async_trait;

use crate::data::models::billing_sdk::customer_info_model::{
    CustomerInfoModel, PurchaseResultModel,
};
use crate::data::models::billing_sdk::offerings_model::{OfferingsModel, PackageModel};
use crate::errors::BillingError;

/// Callback invoked by the SDK bridge whenever the account's purchase
/// state changes out-of-band (renewal, cross-device purchase).
pub type CustomerInfoCallback = Box<dyn Fn(CustomerInfoModel) + Send + Sync>;

/// Interface to the on-device billing SDK, treated as a black box.
///
/// The concrete implementation lives in the host application's native
/// bridge; this crate only defines the call surface and the raw models it
/// exchanges. All methods may suspend for arbitrarily long and may fail;
/// callers catch every error at the component boundary.
#[async_trait]
pub trait BillingSdkDatasource: Send + Sync {
    /// Configures the SDK with a platform-specific key. Calling this twice
    /// is undefined behavior in most billing SDKs, so the capability gate
    /// single-flights it.
    async fn configure(&self, api_key: &str, app_user_id: Option<&str>)
        -> Result<(), BillingError>;

    async fn get_offerings(&self) -> Result<OfferingsModel, BillingError>;

    async fn purchase_package(
        &self,
        package: &PackageModel,
        presented_offering_id: &str,
    ) -> Result<PurchaseResultModel, BillingError>;

    async fn get_customer_info(&self) -> Result<CustomerInfoModel, BillingError>;

    async fn restore_purchases(&self) -> Result<CustomerInfoModel, BillingError>;

    async fn log_in(&self, app_user_id: &str) -> Result<(), BillingError>;

    /// Registers the account-change listener. The SDK does not support
    /// removing a listener once attached, so this is install-once.
    fn set_customer_info_listener(&self, callback: CustomerInfoCallback);
}

/// Stand-in for hosts with no billing capability (browser environment).
/// Every call reports the SDK as unavailable.
pub struct UnavailableBillingSdk;

#[async_trait]
impl BillingSdkDatasource for UnavailableBillingSdk {
    async fn configure(
        &self,
        _api_key: &str,
        _app_user_id: Option<&str>,
    ) -> Result<(), BillingError> {
        Err(BillingError::SdkUnavailable)
    }

    async fn get_offerings(&self) -> Result<OfferingsModel, BillingError> {
        Err(BillingError::SdkUnavailable)
    }

    async fn purchase_package(
        &self,
        _package: &PackageModel,
        _presented_offering_id: &str,
    ) -> Result<PurchaseResultModel, BillingError> {
        Err(BillingError::SdkUnavailable)
    }

    async fn get_customer_info(&self) -> Result<CustomerInfoModel, BillingError> {
        Err(BillingError::SdkUnavailable)
    }

    async fn restore_purchases(&self) -> Result<CustomerInfoModel, BillingError> {
        Err(BillingError::SdkUnavailable)
    }

    async fn log_in(&self, _app_user_id: &str) -> Result<(), BillingError> {
        Err(BillingError::SdkUnavailable)
    }

    fn set_customer_info_listener(&self, _callback: CustomerInfoCallback) {}
}
