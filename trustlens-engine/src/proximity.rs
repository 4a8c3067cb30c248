//! Social proximity calculation
//!
//! Estimates borrower/viewer trust via the social graph: how many
//! connections two participants share, weighted by the quality of each
//! shared account. If either participant's graph is unavailable the
//! result is null (tier NONE) - callers must not display proximity
//! data they cannot support.

use chrono::Duration;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, warn};

use trustlens_core::{
    FollowGraph, ProximityResult, ProximityTier, NEUTRAL_QUALITY, PROXIMITY_LOW_BOUND,
    PROXIMITY_MEDIUM_BOUND,
};
use trustlens_providers::SocialGraphClient;

use crate::cache::TtlCache;
use crate::clock::Clock;

/// Tuning for the proximity calculator
#[derive(Debug, Clone)]
pub struct ProximityConfig {
    /// Follow-graph cache TTL
    pub graph_ttl_secs: i64,
    /// Per-account quality cache TTL
    pub quality_ttl_secs: i64,
    /// Cap on quality lookups per query; mutuals beyond it stay neutral
    pub max_quality_lookups: usize,
}

impl Default for ProximityConfig {
    fn default() -> Self {
        Self {
            graph_ttl_secs: 1800,
            quality_ttl_secs: 3600,
            max_quality_lookups: 25,
        }
    }
}

/// Pure reduction from two graphs and per-account quality weights.
///
/// Distance is the linear complement of quality-weighted mutuals over
/// the smaller follow set: 100 at zero mutuals, approaching 0 as the
/// weighted mutuals approach the smaller network's size.
pub fn compute_proximity(
    a: &FollowGraph,
    b: &FollowGraph,
    quality: &HashMap<String, f64>,
) -> ProximityResult {
    let mutuals: Vec<&String> = a.follows.intersection(&b.follows).collect();
    let mutual_count = mutuals.len();

    if mutual_count == 0 {
        return ProximityResult {
            mutual_connections: 0,
            quality_weighted_mutuals: 0.0,
            social_distance: 100.0,
            overlap_percent: 0.0,
            risk_tier: ProximityTier::High,
        };
    }

    // Non-zero: the intersection is a subset of both follow sets
    let min_follows = a.follow_count().min(b.follow_count()) as f64;

    let weighted: f64 = mutuals
        .iter()
        .map(|m| {
            quality
                .get(*m)
                .copied()
                .unwrap_or(NEUTRAL_QUALITY)
                .clamp(0.0, 1.0)
        })
        .sum();

    let social_distance = (100.0 * (1.0 - weighted / min_follows)).clamp(0.0, 100.0);
    let overlap_percent = mutual_count as f64 / min_follows * 100.0;

    let risk_tier = if social_distance <= PROXIMITY_LOW_BOUND {
        ProximityTier::Low
    } else if social_distance <= PROXIMITY_MEDIUM_BOUND {
        ProximityTier::Medium
    } else {
        ProximityTier::High
    };

    ProximityResult {
        mutual_connections: mutual_count,
        quality_weighted_mutuals: weighted,
        social_distance,
        overlap_percent,
        risk_tier,
    }
}

/// Mutual-connection distance between two social-graph participants,
/// fed by the (cached) social graph provider
pub struct SocialProximityCalculator {
    client: Arc<SocialGraphClient>,
    graphs: TtlCache<String, FollowGraph>,
    quality: TtlCache<String, f64>,
    config: ProximityConfig,
}

impl SocialProximityCalculator {
    pub fn new(client: Arc<SocialGraphClient>, clock: Arc<dyn Clock>, config: ProximityConfig) -> Self {
        Self {
            client,
            graphs: TtlCache::new(clock.clone()),
            quality: TtlCache::new(clock),
            config,
        }
    }

    /// Proximity between two participants. Null result when either
    /// graph cannot be fetched.
    pub async fn proximity(&self, key_a: &str, key_b: &str) -> ProximityResult {
        let graph_ttl = Duration::seconds(self.config.graph_ttl_secs);

        let (graph_a, graph_b) = tokio::join!(
            self.graphs.get_or_fetch(key_a.to_string(), graph_ttl, || self
                .client
                .fetch_graph(key_a)),
            self.graphs.get_or_fetch(key_b.to_string(), graph_ttl, || self
                .client
                .fetch_graph(key_b)),
        );

        let (graph_a, graph_b) = match (graph_a, graph_b) {
            (Ok(a), Ok(b)) => (a, b),
            (Err(e), _) | (_, Err(e)) => {
                warn!("proximity unavailable ({} / {}): {}", key_a, key_b, e);
                return ProximityResult::unavailable();
            }
        };

        let mut mutuals: Vec<String> = graph_a
            .follows
            .intersection(&graph_b.follows)
            .cloned()
            .collect();
        mutuals.sort_unstable();

        let quality = self.quality_weights(&mutuals).await;
        let result = compute_proximity(&graph_a, &graph_b, &quality);
        debug!(
            "proximity {} <-> {}: {} mutuals, distance {:.1}",
            key_a, key_b, result.mutual_connections, result.social_distance
        );
        result
    }

    /// Look up quality for each mutual, bounded by the lookup cap.
    /// Unknown or failed lookups fall back to the neutral weight.
    async fn quality_weights(&self, mutuals: &[String]) -> HashMap<String, f64> {
        let quality_ttl = Duration::seconds(self.config.quality_ttl_secs);
        let capped = &mutuals[..mutuals.len().min(self.config.max_quality_lookups)];

        let lookups = capped.iter().map(|handle| async move {
            let quality = self
                .quality
                .get_or_fetch(handle.clone(), quality_ttl, || {
                    self.client.fetch_account_quality(handle)
                })
                .await
                .unwrap_or(NEUTRAL_QUALITY);
            (handle.clone(), quality)
        });

        futures::future::join_all(lookups).await.into_iter().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn graph(handle: &str, follows: &[&str]) -> FollowGraph {
        FollowGraph {
            handle: handle.to_string(),
            follows: follows.iter().map(|s| s.to_string()).collect(),
            follower_count: follows.len() as u64,
        }
    }

    #[test]
    fn test_zero_mutuals_is_max_distance_high_risk() {
        let a = graph("a", &["x", "y"]);
        let b = graph("b", &["p", "q"]);
        let result = compute_proximity(&a, &b, &HashMap::new());

        assert_eq!(result.mutual_connections, 0);
        assert_eq!(result.social_distance, 100.0);
        assert_eq!(result.risk_tier, ProximityTier::High);
        assert_eq!(result.overlap_percent, 0.0);
    }

    #[test]
    fn test_full_overlap_approaches_zero_distance() {
        let follows = ["m1", "m2", "m3", "m4"];
        let a = graph("a", &follows);
        let b = graph("b", &follows);
        let quality: HashMap<String, f64> =
            follows.iter().map(|m| (m.to_string(), 1.0)).collect();

        let result = compute_proximity(&a, &b, &quality);
        assert_eq!(result.mutual_connections, 4);
        assert_eq!(result.social_distance, 0.0);
        assert_eq!(result.overlap_percent, 100.0);
        assert_eq!(result.risk_tier, ProximityTier::Low);
    }

    #[test]
    fn test_unknown_quality_defaults_neutral() {
        let a = graph("a", &["m1", "m2", "x1", "x2"]);
        let b = graph("b", &["m1", "m2", "y1", "y2"]);
        // No quality data: both mutuals weigh 0.5, min follows = 4
        let result = compute_proximity(&a, &b, &HashMap::new());

        assert_eq!(result.mutual_connections, 2);
        assert_eq!(result.quality_weighted_mutuals, 1.0);
        // 100 * (1 - 1/4) = 75 -> HIGH
        assert_eq!(result.social_distance, 75.0);
        assert_eq!(result.risk_tier, ProximityTier::High);
        assert_eq!(result.overlap_percent, 50.0);
    }

    #[test]
    fn test_distance_is_monotone_in_quality() {
        let a = graph("a", &["m1", "m2", "x"]);
        let b = graph("b", &["m1", "m2", "y"]);

        let low: HashMap<String, f64> =
            [("m1", 0.2), ("m2", 0.2)].map(|(k, v)| (k.to_string(), v)).into();
        let high: HashMap<String, f64> =
            [("m1", 0.9), ("m2", 0.9)].map(|(k, v)| (k.to_string(), v)).into();

        let d_low = compute_proximity(&a, &b, &low).social_distance;
        let d_high = compute_proximity(&a, &b, &high).social_distance;
        assert!(d_high < d_low);
    }

    #[test]
    fn test_tier_boundaries() {
        // distance = 100 * (1 - weighted/min). min = 10.
        let follows_a: Vec<String> = (0..10).map(|i| format!("f{}", i)).collect();
        let a = FollowGraph {
            handle: "a".to_string(),
            follows: follows_a.iter().cloned().collect::<HashSet<_>>(),
            follower_count: 10,
        };
        let b = a.clone();

        // weighted = 7.0 -> distance 30 -> LOW (boundary inclusive)
        let quality: HashMap<String, f64> =
            follows_a.iter().take(7).map(|m| (m.clone(), 1.0)).collect();
        let quality: HashMap<String, f64> = {
            let mut q = quality;
            for m in follows_a.iter().skip(7) {
                q.insert(m.clone(), 0.0);
            }
            q
        };
        let result = compute_proximity(&a, &b, &quality);
        assert_eq!(result.social_distance, 30.0);
        assert_eq!(result.risk_tier, ProximityTier::Low);
    }
}
