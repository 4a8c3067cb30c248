//! Business health scoring
//!
//! Converts a merchant's monthly revenue history into a qualitative
//! tier. Thresholds are on trailing-average monthly revenue in minor
//! units; a merchant with no recent activity is Dormant regardless of
//! past volume, and spotty order history demotes one tier.

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use std::sync::Arc;
use tracing::debug;

use trustlens_core::{BusinessTier, ProviderError, RevenuePeriod, Signal, SignalSource};
use trustlens_providers::{CommerceClient, SignalProvider};

use crate::clock::Clock;

/// Trailing window used for the revenue average
const TRAILING_PERIODS: usize = 6;

/// Average monthly revenue (minor units) for the Thriving tier
const THRIVING_MINOR: u64 = 1_000_000;

/// Average monthly revenue (minor units) for the Healthy tier
const HEALTHY_MINOR: u64 = 250_000;

/// No activity within this window means Dormant
const DORMANCY_DAYS: i64 = 90;

/// Fraction of periods that must have orders to avoid a demotion
const ORDER_CONSISTENCY_FLOOR: f64 = 0.5;

/// Classify a revenue history into a business tier
pub fn business_tier(history: &[RevenuePeriod], now: DateTime<Utc>) -> BusinessTier {
    if history.is_empty() {
        return BusinessTier::Unknown;
    }

    let mut periods: Vec<&RevenuePeriod> = history.iter().collect();
    periods.sort_by_key(|p| p.period_start);

    let latest_active = periods
        .iter()
        .rev()
        .find(|p| p.revenue_minor > 0 || p.order_count > 0);
    match latest_active {
        Some(p) if now - p.period_start <= Duration::days(DORMANCY_DAYS) => {}
        _ => return BusinessTier::Dormant,
    }

    let trailing: Vec<&&RevenuePeriod> = periods.iter().rev().take(TRAILING_PERIODS).collect();
    let avg_minor =
        trailing.iter().map(|p| p.revenue_minor).sum::<u64>() / trailing.len() as u64;

    let with_orders = trailing.iter().filter(|p| p.order_count > 0).count();
    let consistent = with_orders as f64 / trailing.len() as f64 >= ORDER_CONSISTENCY_FLOOR;

    let tier = if avg_minor >= THRIVING_MINOR {
        BusinessTier::Thriving
    } else if avg_minor >= HEALTHY_MINOR {
        BusinessTier::Healthy
    } else if avg_minor > 0 {
        BusinessTier::Emerging
    } else {
        BusinessTier::Dormant
    };

    if consistent {
        tier
    } else {
        demote(tier)
    }
}

fn demote(tier: BusinessTier) -> BusinessTier {
    match tier {
        BusinessTier::Thriving => BusinessTier::Healthy,
        BusinessTier::Healthy => BusinessTier::Emerging,
        other => other,
    }
}

/// Signal provider wrapping the commerce revenue feed
pub struct CommerceRevenueProvider {
    client: Arc<CommerceClient>,
    clock: Arc<dyn Clock>,
}

impl CommerceRevenueProvider {
    pub fn new(client: Arc<CommerceClient>, clock: Arc<dyn Clock>) -> Self {
        Self { client, clock }
    }
}

#[async_trait]
impl SignalProvider for CommerceRevenueProvider {
    fn source(&self) -> SignalSource {
        SignalSource::CommerceRevenue
    }

    fn is_configured(&self) -> bool {
        self.client.is_configured()
    }

    async fn fetch(&self, subject_key: &str) -> Result<Signal, ProviderError> {
        let history = self.client.fetch_revenue_history().await?;
        let tier = business_tier(&history, self.clock.now());
        debug!("commerce history: {} periods, tier {:?}", history.len(), tier);

        let avg_minor = if history.is_empty() {
            0.0
        } else {
            history.iter().map(|p| p.revenue_minor).sum::<u64>() as f64 / history.len() as f64
        };

        // Tier and signal share one mapping so they can never disagree
        let signal = match tier.normalized_value() {
            Some(value) => Signal::builder(SignalSource::CommerceRevenue, subject_key)
                .raw_value(avg_minor)
                .normalized(value)
                .confidence(1.0)
                .ttl_secs(21_600)
                .build(),
            None => Signal::unknown(SignalSource::CommerceRevenue, subject_key, self.clock.now()),
        };
        Ok(signal)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn period(months_ago: i64, revenue_minor: u64, order_count: u32) -> RevenuePeriod {
        RevenuePeriod {
            period_start: Utc::now() - Duration::days(months_ago * 30),
            revenue_minor,
            order_count,
        }
    }

    #[test]
    fn test_empty_history_is_unknown() {
        assert_eq!(business_tier(&[], Utc::now()), BusinessTier::Unknown);
    }

    #[test]
    fn test_high_steady_revenue_is_thriving() {
        let history: Vec<_> = (0..6).map(|i| period(i, 1_500_000, 40)).collect();
        assert_eq!(business_tier(&history, Utc::now()), BusinessTier::Thriving);
    }

    #[test]
    fn test_moderate_revenue_is_healthy() {
        let history: Vec<_> = (0..6).map(|i| period(i, 400_000, 12)).collect();
        assert_eq!(business_tier(&history, Utc::now()), BusinessTier::Healthy);
    }

    #[test]
    fn test_small_revenue_is_emerging() {
        let history: Vec<_> = (0..4).map(|i| period(i, 30_000, 3)).collect();
        assert_eq!(business_tier(&history, Utc::now()), BusinessTier::Emerging);
    }

    #[test]
    fn test_stale_activity_is_dormant() {
        // Strong revenue, but nothing in the last six months
        let history: Vec<_> = (6..12).map(|i| period(i, 2_000_000, 50)).collect();
        assert_eq!(business_tier(&history, Utc::now()), BusinessTier::Dormant);
    }

    #[test]
    fn test_spotty_orders_demote_one_tier() {
        let mut history = vec![period(0, 6_000_000, 40)];
        history.extend((1..6).map(|i| period(i, 0, 0)));
        // Average clears the Thriving bar but only 1 of 6 periods
        // had orders
        assert_eq!(business_tier(&history, Utc::now()), BusinessTier::Healthy);
    }
}
