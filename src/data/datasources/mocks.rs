//! Programmable collaborator doubles shared by the repository-layer unit
//! tests.

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;

use crate::data::datasources::billing_sdk_datasource::{
    BillingSdkDatasource, CustomerInfoCallback,
};
use crate::data::datasources::identity_datasource::IdentityProvider;
use crate::data::datasources::ledger_datasource::LedgerDatasource;
use crate::data::models::billing_sdk::customer_info_model::{
    testing::empty_customer_info, CustomerInfoModel, PurchaseResultModel,
};
use crate::data::models::billing_sdk::offerings_model::OfferingsModel;
use crate::data::models::ledger::subscription_row_model::SubscriptionRowModel;
use crate::domain::entities::product::PlanType;
use crate::errors::BillingError;

#[derive(Clone, Copy)]
pub(crate) enum MockPurchaseOutcome {
    Success,
    Cancelled,
    StoreError,
}

pub(crate) struct MockBillingSdk {
    pub(crate) configure_ok: bool,
    /// Widened to overlap concurrent initialize callers in the
    /// single-flight test.
    pub(crate) configure_delay: Duration,
    pub(crate) configure_calls: AtomicU32,
    /// `None` makes `get_offerings` fail.
    pub(crate) offerings: Mutex<Option<OfferingsModel>>,
    pub(crate) purchase_outcome: Mutex<MockPurchaseOutcome>,
    pub(crate) purchase_calls: AtomicU32,
    /// `None` makes `get_customer_info`/`restore_purchases` fail.
    pub(crate) customer_info: Mutex<Option<CustomerInfoModel>>,
    pub(crate) restore_calls: AtomicU32,
    pub(crate) logged_in_users: Mutex<Vec<String>>,
    listener: Mutex<Option<CustomerInfoCallback>>,
}

impl MockBillingSdk {
    pub(crate) fn healthy() -> MockBillingSdk {
        MockBillingSdk {
            configure_ok: true,
            configure_delay: Duration::ZERO,
            configure_calls: AtomicU32::new(0),
            offerings: Mutex::new(None),
            purchase_outcome: Mutex::new(MockPurchaseOutcome::Success),
            purchase_calls: AtomicU32::new(0),
            customer_info: Mutex::new(Some(empty_customer_info())),
            restore_calls: AtomicU32::new(0),
            logged_in_users: Mutex::new(Vec::new()),
            listener: Mutex::new(None),
        }
    }

    pub(crate) fn unconfigurable() -> MockBillingSdk {
        MockBillingSdk {
            configure_ok: false,
            ..MockBillingSdk::healthy()
        }
    }

    pub(crate) fn set_offerings(&self, offerings: OfferingsModel) {
        *self.offerings.lock().unwrap() = Some(offerings);
    }

    pub(crate) fn set_customer_info(&self, info: Option<CustomerInfoModel>) {
        *self.customer_info.lock().unwrap() = info;
    }

    pub(crate) fn set_purchase_outcome(&self, outcome: MockPurchaseOutcome) {
        *self.purchase_outcome.lock().unwrap() = outcome;
    }

    /// Simulates an out-of-band account change pushed by the SDK.
    pub(crate) fn fire_account_change(&self, info: CustomerInfoModel) {
        if let Some(callback) = self.listener.lock().unwrap().as_ref() {
            callback(info);
        }
    }

    pub(crate) fn has_listener(&self) -> bool {
        self.listener.lock().unwrap().is_some()
    }
}

#[async_trait]
impl BillingSdkDatasource for MockBillingSdk {
    async fn configure(
        &self,
        _api_key: &str,
        _app_user_id: Option<&str>,
    ) -> Result<(), BillingError> {
        if !self.configure_delay.is_zero() {
            tokio::time::sleep(self.configure_delay).await;
        }
        self.configure_calls.fetch_add(1, Ordering::SeqCst);
        if self.configure_ok {
            Ok(())
        } else {
            Err(BillingError::Sdk("configure failed".to_string()))
        }
    }

    async fn get_offerings(&self) -> Result<OfferingsModel, BillingError> {
        self.offerings
            .lock()
            .unwrap()
            .clone()
            .ok_or_else(|| BillingError::Sdk("offerings unavailable".to_string()))
    }

    async fn purchase_package(
        &self,
        package: &crate::data::models::billing_sdk::offerings_model::PackageModel,
        _presented_offering_id: &str,
    ) -> Result<PurchaseResultModel, BillingError> {
        self.purchase_calls.fetch_add(1, Ordering::SeqCst);
        match *self.purchase_outcome.lock().unwrap() {
            MockPurchaseOutcome::Success => Ok(PurchaseResultModel {
                customer_info: self
                    .customer_info
                    .lock()
                    .unwrap()
                    .clone()
                    .unwrap_or_else(empty_customer_info),
                product_identifier: package.product.identifier.clone(),
            }),
            MockPurchaseOutcome::Cancelled => Err(BillingError::PurchaseCancelled),
            MockPurchaseOutcome::StoreError => {
                Err(BillingError::Sdk("payment declined".to_string()))
            }
        }
    }

    async fn get_customer_info(&self) -> Result<CustomerInfoModel, BillingError> {
        self.customer_info
            .lock()
            .unwrap()
            .clone()
            .ok_or_else(|| BillingError::Sdk("customer info unavailable".to_string()))
    }

    async fn restore_purchases(&self) -> Result<CustomerInfoModel, BillingError> {
        self.restore_calls.fetch_add(1, Ordering::SeqCst);
        self.customer_info
            .lock()
            .unwrap()
            .clone()
            .ok_or_else(|| BillingError::Sdk("restore failed".to_string()))
    }

    async fn log_in(&self, app_user_id: &str) -> Result<(), BillingError> {
        self.logged_in_users
            .lock()
            .unwrap()
            .push(app_user_id.to_string());
        Ok(())
    }

    fn set_customer_info_listener(&self, callback: CustomerInfoCallback) {
        *self.listener.lock().unwrap() = Some(callback);
    }
}

pub(crate) struct MockLedger {
    pub(crate) upgrade_ok: bool,
    pub(crate) upgrades: Mutex<Vec<(String, PlanType)>>,
    /// `Err` state makes the row read fail.
    pub(crate) row: Mutex<Result<Option<SubscriptionRowModel>, ()>>,
}

impl MockLedger {
    pub(crate) fn empty() -> MockLedger {
        MockLedger {
            upgrade_ok: true,
            upgrades: Mutex::new(Vec::new()),
            row: Mutex::new(Ok(None)),
        }
    }

    pub(crate) fn with_row(row: SubscriptionRowModel) -> MockLedger {
        MockLedger {
            upgrade_ok: true,
            upgrades: Mutex::new(Vec::new()),
            row: Mutex::new(Ok(Some(row))),
        }
    }

    pub(crate) fn failing_upgrade() -> MockLedger {
        MockLedger {
            upgrade_ok: false,
            ..MockLedger::empty()
        }
    }

    pub(crate) fn upgrade_count(&self) -> usize {
        self.upgrades.lock().unwrap().len()
    }
}

#[async_trait]
impl LedgerDatasource for MockLedger {
    async fn upgrade_to_premium(
        &self,
        user_id: &str,
        plan_type: PlanType,
    ) -> Result<(), BillingError> {
        if !self.upgrade_ok {
            return Err(BillingError::LedgerStatus {
                status: 500,
                body: "rpc failed".to_string(),
            });
        }
        self.upgrades
            .lock()
            .unwrap()
            .push((user_id.to_string(), plan_type));
        Ok(())
    }

    async fn active_subscription(
        &self,
        _user_id: &str,
    ) -> Result<Option<SubscriptionRowModel>, BillingError> {
        self.row
            .lock()
            .unwrap()
            .clone()
            .map_err(|_| BillingError::Ledger("row read failed".to_string()))
    }
}

pub(crate) struct FixedIdentity(pub(crate) Option<String>);

impl FixedIdentity {
    pub(crate) fn user(id: &str) -> FixedIdentity {
        FixedIdentity(Some(id.to_string()))
    }

    pub(crate) fn anonymous() -> FixedIdentity {
        FixedIdentity(None)
    }
}

#[async_trait]
impl IdentityProvider for FixedIdentity {
    async fn current_user_id(&self) -> Option<String> {
        self.0.clone()
    }
}
