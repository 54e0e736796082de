use async_trait::async_trait;
use chrono::Utc;
use reqwest::header::AUTHORIZATION;
use serde_json::json;

use crate::config::LedgerConfig;
use crate::data::models::ledger::subscription_row_model::SubscriptionRowModel;
use crate::domain::entities::product::PlanType;
use crate::errors::BillingError;

/// Interface to the application's own backend subscription ledger: one
/// upgrade RPC plus one filtered read of the subscription table.
#[async_trait]
pub trait LedgerDatasource: Send + Sync {
    /// `upgrade_to_premium` RPC. Not idempotent from the caller's point of
    /// view, so never retried automatically.
    async fn upgrade_to_premium(&self, user_id: &str, plan_type: PlanType)
        -> Result<(), BillingError>;

    /// Most recent active, non-expired subscription row for the user, if
    /// one exists.
    async fn active_subscription(
        &self,
        user_id: &str,
    ) -> Result<Option<SubscriptionRowModel>, BillingError>;
}

/// HTTP client against the ledger's REST surface.
pub struct LedgerDatasourceImpl {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl LedgerDatasourceImpl {
    pub fn new(config: &LedgerConfig) -> LedgerDatasourceImpl {
        LedgerDatasourceImpl {
            client: reqwest::Client::new(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
        }
    }

    async fn error_for_status(
        status: reqwest::StatusCode,
        response: reqwest::Response,
    ) -> BillingError {
        BillingError::LedgerStatus {
            status: status.as_u16(),
            body: response.text().await.unwrap_or_default(),
        }
    }
}

#[async_trait]
impl LedgerDatasource for LedgerDatasourceImpl {
    async fn upgrade_to_premium(
        &self,
        user_id: &str,
        plan_type: PlanType,
    ) -> Result<(), BillingError> {
        let url = format!("{}/rest/v1/rpc/upgrade_to_premium", self.base_url);
        let response = self
            .client
            .post(&url)
            .header("apikey", &self.api_key)
            .header(AUTHORIZATION, format!("Bearer {}", self.api_key))
            .json(&json!({
                "user_id": user_id,
                "plan_type": plan_type.as_str(),
            }))
            .send()
            .await?;
        let status = response.status();
        if !status.is_success() {
            return Err(Self::error_for_status(status, response).await);
        }
        Ok(())
    }

    async fn active_subscription(
        &self,
        user_id: &str,
    ) -> Result<Option<SubscriptionRowModel>, BillingError> {
        let url = format!("{}/rest/v1/premium_subscriptions", self.base_url);
        let response = self
            .client
            .get(&url)
            .header("apikey", &self.api_key)
            .header(AUTHORIZATION, format!("Bearer {}", self.api_key))
            .query(&[
                ("select", "plan_type,created_at,expires_at,is_active".to_string()),
                ("user_id", format!("eq.{}", user_id)),
                ("is_active", "eq.true".to_string()),
                ("expires_at", format!("gt.{}", Utc::now().to_rfc3339())),
                ("order", "created_at.desc".to_string()),
                ("limit", "1".to_string()),
            ])
            .send()
            .await?;
        let status = response.status();
        if !status.is_success() {
            return Err(Self::error_for_status(status, response).await);
        }
        let mut rows: Vec<SubscriptionRowModel> = response
            .json()
            .await
            .map_err(|e| BillingError::Decode(format!("ledger row did not decode: {}", e)))?;
        Ok(if rows.is_empty() {
            None
        } else {
            Some(rows.remove(0))
        })
    }
}
