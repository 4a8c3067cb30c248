//! Social graph client
//!
//! Fetches follow lists and per-account quality from the social graph
//! provider, keyed by wallet address or handle. The graph-presence
//! signal saturates at FOLLOW_SATURATION follows; quality scores feed
//! the proximity calculator's mutual-connection weights.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, warn};

use trustlens_core::{FollowGraph, ProviderError, Signal, SignalSource};

use crate::traits::{status_error, transport_error, SignalProvider};

/// Follow count at which the graph-presence signal normalizes to 1.0
const FOLLOW_SATURATION: f64 = 200.0;

/// Default signal TTL; the engine config may override at cache time
const DEFAULT_TTL_SECS: i64 = 1800;

/// Configuration for the social graph provider
#[derive(Debug, Clone)]
pub struct SocialGraphConfig {
    /// API base URL (override for staging/self-hosted deployments)
    pub base_url: String,
    /// API key; absent means the source is disabled
    pub api_key: Option<String>,
    /// Per-request timeout
    pub request_timeout: Duration,
}

impl Default for SocialGraphConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.lensgraph.io".to_string(),
            api_key: std::env::var("SOCIAL_GRAPH_API_KEY").ok(),
            request_timeout: Duration::from_secs(10),
        }
    }
}

/// Client for the follow-graph provider
pub struct SocialGraphClient {
    config: SocialGraphConfig,
    client: Client,
}

impl SocialGraphClient {
    pub fn new(config: SocialGraphConfig) -> Self {
        if config.api_key.is_none() {
            warn!("social graph API key missing; source disabled");
        }
        let client = Client::builder()
            .timeout(config.request_timeout)
            .user_agent("trustlens/0.1")
            .build()
            .unwrap_or_default();
        Self { config, client }
    }

    fn api_key(&self) -> Result<&str, ProviderError> {
        self.config
            .api_key
            .as_deref()
            .ok_or_else(|| ProviderError::Misconfigured("SOCIAL_GRAPH_API_KEY not set".to_string()))
    }

    /// Fetch one participant's follow graph
    pub async fn fetch_graph(&self, subject_key: &str) -> Result<FollowGraph, ProviderError> {
        let key = self.api_key()?;
        let url = format!(
            "{}/v1/profiles/{}/follows",
            self.config.base_url,
            urlencoding::encode(subject_key)
        );

        let response = self
            .client
            .get(&url)
            .header("X-Api-Key", key)
            .send()
            .await
            .map_err(transport_error)?;

        if !response.status().is_success() {
            let err = status_error(response.status());
            if err.is_operational() {
                warn!("social graph fetch failed for {}: {}", subject_key, err);
            }
            return Err(err);
        }

        let body: FollowsResponse = response.json().await.map_err(|e| {
            warn!("social graph response unparsable for {}: {}", subject_key, e);
            ProviderError::Malformed(e.to_string())
        })?;

        Ok(FollowGraph {
            handle: body.handle,
            follows: body.follows.into_iter().collect(),
            follower_count: body.follower_count,
        })
    }

    /// Fetch an account's quality score in [0,1].
    ///
    /// Used to weight mutual connections; callers fall back to a neutral
    /// 0.5 when this returns an error.
    pub async fn fetch_account_quality(&self, handle: &str) -> Result<f64, ProviderError> {
        let key = self.api_key()?;
        let url = format!(
            "{}/v1/profiles/{}/quality",
            self.config.base_url,
            urlencoding::encode(handle)
        );

        let response = self
            .client
            .get(&url)
            .header("X-Api-Key", key)
            .send()
            .await
            .map_err(transport_error)?;

        if !response.status().is_success() {
            return Err(status_error(response.status()));
        }

        let body: QualityResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::Malformed(e.to_string()))?;

        Ok(body.quality.clamp(0.0, 1.0))
    }

    /// Graph presence/size mapped to [0,1]: `min(follows / 200, 1)`
    pub fn normalize_follow_count(follows: usize) -> f64 {
        (follows as f64 / FOLLOW_SATURATION).min(1.0)
    }
}

#[async_trait]
impl SignalProvider for SocialGraphClient {
    fn source(&self) -> SignalSource {
        SignalSource::SocialGraph
    }

    fn is_configured(&self) -> bool {
        self.config.api_key.is_some()
    }

    async fn fetch(&self, subject_key: &str) -> Result<Signal, ProviderError> {
        let graph = self.fetch_graph(subject_key).await?;
        debug!(
            "social graph: {} follows {} accounts",
            graph.handle,
            graph.follow_count()
        );

        Ok(Signal::builder(SignalSource::SocialGraph, subject_key)
            .raw_value(graph.follow_count() as f64)
            .normalized(Self::normalize_follow_count(graph.follow_count()))
            .confidence(1.0)
            .ttl_secs(DEFAULT_TTL_SECS)
            .build())
    }
}

// Wire types for the social graph API
#[derive(Debug, Deserialize)]
struct FollowsResponse {
    handle: String,
    follows: Vec<String>,
    follower_count: u64,
}

#[derive(Debug, Deserialize)]
struct QualityResponse {
    quality: f64,
}
