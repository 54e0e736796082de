use std::future::Future;

use tracing::warn;

use crate::config::RetryPolicy;
use crate::errors::BillingError;

/// Whether a failed call may succeed on a retry. Decode failures are
/// deterministic and an unavailable SDK stays unavailable for the process
/// lifetime, so neither is worth re-attempting.
fn is_transient(error: &BillingError) -> bool {
    matches!(
        error,
        BillingError::Sdk(_) | BillingError::Ledger(_) | BillingError::LedgerStatus { .. }
    )
}

/// Runs an idempotent read with bounded exponential backoff.
///
/// Must only be used for reads (catalog fetch, entitlement check, ledger
/// row read), never for purchase initiation or the ledger upgrade RPC.
pub(crate) async fn with_retry<T, F, Fut>(
    policy: &RetryPolicy,
    operation: &str,
    mut call: F,
) -> Result<T, BillingError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, BillingError>>,
{
    let mut attempt: u32 = 1;
    loop {
        match call().await {
            Ok(value) => return Ok(value),
            Err(error) if attempt < policy.max_attempts.max(1) && is_transient(&error) => {
                let delay = policy.delay(attempt);
                warn!(
                    operation,
                    attempt,
                    delay_ms = delay.as_millis() as u64,
                    error = %error,
                    "idempotent read failed, retrying"
                );
                tokio::time::sleep(delay).await;
                attempt += 1;
            }
            Err(error) => return Err(error),
        }
    }
}
