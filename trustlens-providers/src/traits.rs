//! Common interface for signal providers

use async_trait::async_trait;
use reqwest::StatusCode;
use std::sync::Arc;

use trustlens_core::{ProviderError, Signal, SignalSource};

/// One external source of trust signals.
///
/// `fetch` performs a single outbound call: no retries, no caching, no
/// side effects beyond the network. `NotFound` is an expected outcome
/// and stays silent; outages are logged by the implementation.
#[async_trait]
pub trait SignalProvider: Send + Sync {
    /// Which source this provider serves
    fn source(&self) -> SignalSource;

    /// False when a required credential is absent; the source is then
    /// treated as permanently unavailable rather than erroring per call
    fn is_configured(&self) -> bool;

    /// Fetch one normalized signal for one subject
    async fn fetch(&self, subject_key: &str) -> Result<Signal, ProviderError>;
}

/// Shared handle the aggregator fans out over
pub type SharedProvider = Arc<dyn SignalProvider>;

/// Map a non-success HTTP status to the provider error taxonomy
pub fn status_error(status: StatusCode) -> ProviderError {
    match status {
        StatusCode::NOT_FOUND => ProviderError::NotFound,
        StatusCode::TOO_MANY_REQUESTS => ProviderError::RateLimited,
        other => ProviderError::Unavailable(format!("status {}", other)),
    }
}

/// Map a transport-level reqwest error
pub fn transport_error(err: reqwest::Error) -> ProviderError {
    ProviderError::Unavailable(err.to_string())
}
