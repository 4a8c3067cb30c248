//! Reputation score clients
//!
//! Two independent reputation services contribute signals:
//! - **Karma** scores accounts 0-100; normalized as `raw / 100`
//! - **Aura** scores accounts 0-1000; normalized as `raw / 1000`
//!
//! Both key on a numeric account id and also resolve wallet addresses.
//! Documented scale endpoints normalize to exactly 0.0 and 1.0.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use tracing::warn;

use trustlens_core::{is_numeric_id, is_wallet_address, ProviderError, Signal, SignalSource};

use crate::traits::{status_error, transport_error, SignalProvider};

const KARMA_MAX_SCORE: f64 = 100.0;
const AURA_MAX_SCORE: f64 = 1000.0;

/// Default TTLs; reputation services refresh on different cadences
const KARMA_TTL_SECS: i64 = 3600;
const AURA_TTL_SECS: i64 = 7200;

/// Configuration shared by both reputation clients
#[derive(Debug, Clone)]
pub struct ReputationConfig {
    pub base_url: String,
    pub api_key: Option<String>,
    pub request_timeout: Duration,
}

impl ReputationConfig {
    /// Karma defaults, credential from `KARMA_API_KEY`
    pub fn karma() -> Self {
        Self {
            base_url: "https://api.karmahq.xyz".to_string(),
            api_key: std::env::var("KARMA_API_KEY").ok(),
            request_timeout: Duration::from_secs(10),
        }
    }

    /// Aura defaults, credential from `AURA_API_KEY`
    pub fn aura() -> Self {
        Self {
            base_url: "https://api.aurascore.io".to_string(),
            api_key: std::env::var("AURA_API_KEY").ok(),
            request_timeout: Duration::from_secs(10),
        }
    }
}

/// Shared request/parse path for both services
struct ReputationInner {
    config: ReputationConfig,
    client: Client,
    service: &'static str,
}

impl ReputationInner {
    fn new(config: ReputationConfig, service: &'static str) -> Self {
        if config.api_key.is_none() {
            warn!("{} API key missing; source disabled", service);
        }
        let client = Client::builder()
            .timeout(config.request_timeout)
            .user_agent("trustlens/0.1")
            .build()
            .unwrap_or_default();
        Self {
            config,
            client,
            service,
        }
    }

    /// Fetch a raw score for a numeric account id or wallet address
    async fn fetch_raw(&self, subject_key: &str) -> Result<f64, ProviderError> {
        let key = self.config.api_key.as_deref().ok_or_else(|| {
            ProviderError::Misconfigured(format!("{} API key not set", self.service))
        })?;

        // Subjects the service cannot key on have no record by definition
        let path = if is_numeric_id(subject_key) {
            format!("/v1/accounts/{}/score", subject_key)
        } else if is_wallet_address(subject_key) {
            format!("/v1/addresses/{}/score", subject_key)
        } else {
            return Err(ProviderError::NotFound);
        };

        let url = format!("{}{}", self.config.base_url, path);
        let response = self
            .client
            .get(&url)
            .bearer_auth(key)
            .send()
            .await
            .map_err(transport_error)?;

        if !response.status().is_success() {
            let err = status_error(response.status());
            if err.is_operational() {
                warn!("{} fetch failed for {}: {}", self.service, subject_key, err);
            }
            return Err(err);
        }

        let body: ScoreResponse = response.json().await.map_err(|e| {
            warn!("{} response unparsable: {}", self.service, e);
            ProviderError::Malformed(e.to_string())
        })?;

        Ok(body.score)
    }
}

/// Karma reputation client (0-100 scale)
pub struct KarmaClient {
    inner: ReputationInner,
}

impl KarmaClient {
    pub fn new(config: ReputationConfig) -> Self {
        Self {
            inner: ReputationInner::new(config, "karma"),
        }
    }

    /// Linear transform from the documented 0-100 scale
    pub fn normalize(raw: f64) -> f64 {
        (raw / KARMA_MAX_SCORE).clamp(0.0, 1.0)
    }
}

#[async_trait]
impl SignalProvider for KarmaClient {
    fn source(&self) -> SignalSource {
        SignalSource::ReputationKarma
    }

    fn is_configured(&self) -> bool {
        self.inner.config.api_key.is_some()
    }

    async fn fetch(&self, subject_key: &str) -> Result<Signal, ProviderError> {
        let raw = self.inner.fetch_raw(subject_key).await?;
        Ok(Signal::builder(SignalSource::ReputationKarma, subject_key)
            .raw_value(raw)
            .normalized(Self::normalize(raw))
            .confidence(1.0)
            .ttl_secs(KARMA_TTL_SECS)
            .build())
    }
}

/// Aura reputation client (0-1000 scale)
pub struct AuraClient {
    inner: ReputationInner,
}

impl AuraClient {
    pub fn new(config: ReputationConfig) -> Self {
        Self {
            inner: ReputationInner::new(config, "aura"),
        }
    }

    /// Linear transform from the documented 0-1000 scale
    pub fn normalize(raw: f64) -> f64 {
        (raw / AURA_MAX_SCORE).clamp(0.0, 1.0)
    }
}

#[async_trait]
impl SignalProvider for AuraClient {
    fn source(&self) -> SignalSource {
        SignalSource::ReputationAura
    }

    fn is_configured(&self) -> bool {
        self.inner.config.api_key.is_some()
    }

    async fn fetch(&self, subject_key: &str) -> Result<Signal, ProviderError> {
        let raw = self.inner.fetch_raw(subject_key).await?;
        Ok(Signal::builder(SignalSource::ReputationAura, subject_key)
            .raw_value(raw)
            .normalized(Self::normalize(raw))
            .confidence(1.0)
            .ttl_secs(AURA_TTL_SECS)
            .build())
    }
}

// Both services return the same score envelope
#[derive(Debug, Deserialize)]
struct ScoreResponse {
    score: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_karma_normalizes_exact_bounds() {
        assert_eq!(KarmaClient::normalize(0.0), 0.0);
        assert_eq!(KarmaClient::normalize(100.0), 1.0);
        assert_eq!(KarmaClient::normalize(50.0), 0.5);
        // Out-of-range provider values clamp instead of drifting
        assert_eq!(KarmaClient::normalize(120.0), 1.0);
        assert_eq!(KarmaClient::normalize(-5.0), 0.0);
    }

    #[test]
    fn test_aura_normalizes_exact_bounds() {
        assert_eq!(AuraClient::normalize(0.0), 0.0);
        assert_eq!(AuraClient::normalize(1000.0), 1.0);
        assert_eq!(AuraClient::normalize(250.0), 0.25);
    }

    #[tokio::test]
    async fn test_unresolvable_key_is_not_found() {
        let client = KarmaClient::new(ReputationConfig {
            base_url: "http://localhost:1".to_string(),
            api_key: Some("k".to_string()),
            request_timeout: Duration::from_secs(1),
        });
        let err = client.inner.fetch_raw("lens:someone").await.unwrap_err();
        assert!(matches!(err, ProviderError::NotFound));
    }

    #[test]
    fn test_score_response_parses() {
        let parsed: ScoreResponse = serde_json::from_str(r#"{"score": 87.5}"#).unwrap();
        assert_eq!(parsed.score, 87.5);
    }
}
