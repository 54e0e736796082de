use thiserror::Error;

/// Errors raised at the boundary to the two external collaborators (native
/// billing SDK, backend ledger) and by the decoding layer in between.
///
/// None of these ever cross into the premium-gating UI: every repository
/// operation catches them and degrades into its structured result type
/// (`None`, an empty list, `false`, or a failed `VerificationResult`).
#[derive(Debug, Error)]
pub enum BillingError {
    /// The native billing SDK is not usable on this host (browser
    /// environment, or SDK configuration failed at startup).
    #[error("billing SDK is not available on this platform")]
    SdkUnavailable,

    /// A call into the native billing SDK failed (connectivity, store
    /// outage, misconfiguration).
    #[error("billing SDK call failed: {0}")]
    Sdk(String),

    /// The user backed out of the store's payment sheet. Distinguished from
    /// `Sdk` so the orchestrator can log it at a lower severity.
    #[error("purchase cancelled by user")]
    PurchaseCancelled,

    /// No package in the current offering wraps the requested product.
    #[error("no package found for product id: {0}")]
    PackageNotFound(String),

    /// A collaborator response did not decode into the canonical shape
    /// (missing field, malformed timestamp).
    #[error("malformed collaborator response: {0}")]
    Decode(String),

    /// The backend ledger RPC or row read failed.
    #[error("ledger request failed: {0}")]
    Ledger(String),

    /// The ledger answered with a non-success HTTP status.
    #[error("ledger returned status {status}: {body}")]
    LedgerStatus { status: u16, body: String },
}

impl From<reqwest::Error> for BillingError {
    fn from(e: reqwest::Error) -> Self {
        BillingError::Ledger(e.to_string())
    }
}
