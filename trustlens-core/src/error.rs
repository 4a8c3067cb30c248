//! Provider failure taxonomy
//!
//! No provider failure ever propagates as a failure of a scoring query;
//! it only shrinks the set of contributing sources. The taxonomy exists
//! so tests and operators can assert on *why* a signal is absent.

use thiserror::Error;

use crate::SignalSource;

/// Errors from one provider fetch
#[derive(Debug, Error)]
pub enum ProviderError {
    /// Network or provider outage; logged and surfaced to operators
    #[error("provider unavailable: {0}")]
    Unavailable(String),

    /// Subject has no record with this provider; expected, silent
    #[error("subject not found")]
    NotFound,

    /// Provider asked us to back off; no retry within this call
    #[error("rate limited")]
    RateLimited,

    /// Response failed to parse; treated as Unavailable for scoring
    #[error("malformed provider response: {0}")]
    Malformed(String),

    /// Missing credential; source treated as permanently disabled
    #[error("provider misconfigured: {0}")]
    Misconfigured(String),
}

impl ProviderError {
    /// Whether operators should be alerted (expected absences are not
    /// alarm conditions)
    pub fn is_operational(&self) -> bool {
        !matches!(self, ProviderError::NotFound)
    }
}

/// Errors from the scoring engine itself (configuration, not queries -
/// query surfaces never fail, they degrade)
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("no provider registered for source {0}")]
    UnknownSource(SignalSource),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("failed to read config file: {0}")]
    ConfigIo(#[from] std::io::Error),
}
