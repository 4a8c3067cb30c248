//! Commerce platform client
//!
//! Reads a merchant's revenue/order history and the connected account's
//! owner profile. Both calls key on an access token exchanged earlier by
//! the OAuth layer (out of scope here); the token arriving at all is the
//! subject's link to the commerce account.

use chrono::{DateTime, Utc};
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use tracing::warn;

use trustlens_core::{OwnerProfile, ProviderError, RevenuePeriod};

use crate::traits::{status_error, transport_error};

/// Configuration for the commerce platform client
#[derive(Debug, Clone)]
pub struct CommerceConfig {
    pub base_url: String,
    /// Access token from the subject's connected account
    pub access_token: Option<String>,
    pub request_timeout: Duration,
    /// Months of revenue history to request
    pub history_months: u32,
}

impl Default for CommerceConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.shopconnect.io".to_string(),
            access_token: std::env::var("COMMERCE_ACCESS_TOKEN").ok(),
            request_timeout: Duration::from_secs(15),
            history_months: 12,
        }
    }
}

/// Client for the commerce revenue/profile feed
pub struct CommerceClient {
    config: CommerceConfig,
    client: Client,
}

impl CommerceClient {
    pub fn new(config: CommerceConfig) -> Self {
        if config.access_token.is_none() {
            warn!("commerce access token missing; source disabled");
        }
        let client = Client::builder()
            .timeout(config.request_timeout)
            .user_agent("trustlens/0.1")
            .build()
            .unwrap_or_default();
        Self { config, client }
    }

    pub fn is_configured(&self) -> bool {
        self.config.access_token.is_some()
    }

    fn token(&self) -> Result<&str, ProviderError> {
        self.config
            .access_token
            .as_deref()
            .ok_or_else(|| ProviderError::Misconfigured("COMMERCE_ACCESS_TOKEN not set".to_string()))
    }

    /// Fetch monthly revenue history for the connected merchant
    pub async fn fetch_revenue_history(&self) -> Result<Vec<RevenuePeriod>, ProviderError> {
        let token = self.token()?;
        let url = format!(
            "{}/v1/merchant/revenue?months={}",
            self.config.base_url, self.config.history_months
        );

        let response = self
            .client
            .get(&url)
            .bearer_auth(token)
            .send()
            .await
            .map_err(transport_error)?;

        if !response.status().is_success() {
            let err = status_error(response.status());
            if err.is_operational() {
                warn!("commerce revenue fetch failed: {}", err);
            }
            return Err(err);
        }

        let body: RevenueResponse = response.json().await.map_err(|e| {
            warn!("commerce revenue response unparsable: {}", e);
            ProviderError::Malformed(e.to_string())
        })?;

        Ok(body
            .periods
            .into_iter()
            .map(|p| RevenuePeriod {
                period_start: p.period_start,
                revenue_minor: p.revenue_minor,
                order_count: p.order_count,
            })
            .collect())
    }

    /// Fetch the connected account's owner name and email
    pub async fn fetch_owner_profile(&self) -> Result<OwnerProfile, ProviderError> {
        let token = self.token()?;
        let url = format!("{}/v1/merchant/owner", self.config.base_url);

        let response = self
            .client
            .get(&url)
            .bearer_auth(token)
            .send()
            .await
            .map_err(transport_error)?;

        if !response.status().is_success() {
            let err = status_error(response.status());
            if err.is_operational() {
                warn!("commerce owner fetch failed: {}", err);
            }
            return Err(err);
        }

        let body: OwnerResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::Malformed(e.to_string()))?;

        Ok(OwnerProfile {
            name: body.name,
            email: body.email,
        })
    }
}

// Wire types for the commerce API
#[derive(Debug, Deserialize)]
struct RevenueResponse {
    periods: Vec<WirePeriod>,
}

#[derive(Debug, Deserialize)]
struct WirePeriod {
    period_start: DateTime<Utc>,
    revenue_minor: u64,
    order_count: u32,
}

#[derive(Debug, Deserialize)]
struct OwnerResponse {
    name: Option<String>,
    email: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokenless() -> CommerceClient {
        CommerceClient::new(CommerceConfig {
            base_url: "http://localhost:1".to_string(),
            access_token: None,
            request_timeout: Duration::from_secs(1),
            history_months: 12,
        })
    }

    #[tokio::test]
    async fn test_missing_token_is_misconfigured() {
        let client = tokenless();
        assert!(!client.is_configured());
        let err = client.fetch_revenue_history().await.unwrap_err();
        assert!(matches!(err, ProviderError::Misconfigured(_)));
        let err = client.fetch_owner_profile().await.unwrap_err();
        assert!(matches!(err, ProviderError::Misconfigured(_)));
    }

    #[test]
    fn test_revenue_response_parses() {
        let json = r#"{
            "periods": [
                {"period_start": "2026-07-01T00:00:00Z", "revenue_minor": 185000, "order_count": 42}
            ]
        }"#;
        let parsed: RevenueResponse = serde_json::from_str(json).unwrap();
        assert_eq!(parsed.periods.len(), 1);
        assert_eq!(parsed.periods[0].revenue_minor, 185_000);
    }

    #[test]
    fn test_owner_response_tolerates_missing_fields() {
        let parsed: OwnerResponse = serde_json::from_str(r#"{"name": "Maria Sanchez"}"#).unwrap();
        assert_eq!(parsed.name.as_deref(), Some("Maria Sanchez"));
        assert!(parsed.email.is_none());
    }
}
