//! Composite risk aggregation
//!
//! The query entry point. Fans out one cached fetch per enabled source
//! concurrently, each bounded by its own deadline, then reduces whatever
//! arrived into a single trust result. Never fails: a source that
//! errors, times out, or lacks credentials only shrinks the contributing
//! set. The reduction is commutative over sources, so arrival order
//! never affects the result.

use chrono::Duration;
use futures::future::join_all;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info, warn};
use uuid::Uuid;

use trustlens_core::{
    ProviderError, Signal, SignalKey, SignalSource, Subject, TrustResult, TrustTier,
};
use trustlens_providers::SharedProvider;

use crate::cache::TtlCache;
use crate::clock::Clock;
use crate::config::EngineConfig;

/// The composite scoring engine
pub struct ScoringEngine {
    providers: HashMap<SignalSource, SharedProvider>,
    cache: TtlCache<SignalKey, Signal>,
    clock: Arc<dyn Clock>,
    config: EngineConfig,
}

impl ScoringEngine {
    pub fn new(config: EngineConfig, providers: Vec<SharedProvider>, clock: Arc<dyn Clock>) -> Self {
        let providers = providers.into_iter().map(|p| (p.source(), p)).collect();
        Self {
            providers,
            cache: TtlCache::new(clock.clone()),
            clock,
            config,
        }
    }

    /// Score a subject. Always returns a result; absence of data shows
    /// up as missing signals and a lower confidence, never an error.
    pub async fn score(&self, subject: &Subject) -> TrustResult {
        let subject_key = subject.subject_key();
        let enabled = self.config.enabled_sources();

        let fetches = enabled.iter().filter_map(|source| {
            let provider = self.providers.get(source)?;
            let cfg = self.config.source(*source)?;
            Some(self.fetch_one(*source, provider, cfg.ttl_secs, cfg.timeout_secs, &subject_key))
        });

        let fetched: Vec<Option<(SignalSource, Signal)>> = join_all(fetches).await;
        let signals: HashMap<SignalSource, Signal> = fetched.into_iter().flatten().collect();

        let result = self.reduce(subject.clone(), signals, enabled.len());
        info!(
            "scored {}: composite={:?} tier={} confidence={:.2}",
            subject_key, result.composite, result.tier, result.confidence
        );

        if let Some(max) = self.config.max_cache_entries {
            self.cache.sweep(max);
        }
        result
    }

    /// One source's cached fetch under its own deadline
    async fn fetch_one(
        &self,
        source: SignalSource,
        provider: &SharedProvider,
        ttl_secs: i64,
        timeout_secs: u64,
        subject_key: &str,
    ) -> Option<(SignalSource, Signal)> {
        let key = SignalKey::new(source, subject_key);
        let ttl = Duration::seconds(ttl_secs);
        let deadline = std::time::Duration::from_secs(timeout_secs);

        let outcome = tokio::time::timeout(
            deadline,
            self.cache
                .get_or_fetch(key, ttl, || provider.fetch(subject_key)),
        )
        .await;

        match outcome {
            Ok(Ok(signal)) => Some((source, signal)),
            Ok(Err(e)) => {
                match e {
                    // Expected absences; providers already logged the
                    // missing credential once at construction
                    ProviderError::NotFound | ProviderError::Misconfigured(_) => {
                        debug!("{} produced no signal for {}", source, subject_key)
                    }
                    other => warn!("{} signal unavailable for {}: {}", source, subject_key, other),
                }
                None
            }
            Err(_) => {
                warn!("{} timed out after {:?} for {}", source, deadline, subject_key);
                None
            }
        }
    }

    /// Weighted reduction over contributing (confidence > 0) sources
    fn reduce(
        &self,
        subject: Subject,
        signals: HashMap<SignalSource, Signal>,
        configured_count: usize,
    ) -> TrustResult {
        let mut numerator = 0.0;
        let mut denominator = 0.0;
        let mut contributing = 0usize;

        for (source, signal) in &signals {
            if !signal.is_known() {
                continue;
            }
            let weight = self
                .config
                .source(*source)
                .map(|c| c.weight)
                .unwrap_or(0.0);
            numerator += signal.normalized * weight * signal.confidence;
            denominator += weight * signal.confidence;
            contributing += 1;
        }

        let composite = (denominator > 0.0).then(|| numerator / denominator);
        let tier = match composite {
            Some(score) if score >= self.config.strong_threshold => TrustTier::Strong,
            Some(score) if score >= self.config.moderate_threshold => TrustTier::Moderate,
            Some(score) if score >= self.config.weak_threshold => TrustTier::Weak,
            _ => TrustTier::None,
        };

        let confidence = if configured_count == 0 {
            0.0
        } else {
            contributing as f64 / configured_count as f64
        };

        TrustResult {
            id: Uuid::new_v4(),
            subject,
            signals,
            composite,
            tier,
            confidence,
            computed_at: self.clock.now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::config::SourceConfig;
    use async_trait::async_trait;
    use chrono::Utc;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use trustlens_core::{ProviderError, SignalBuilder};
    use trustlens_providers::SignalProvider;

    enum Behavior {
        Value { normalized: f64, confidence: f64 },
        Fail,
        Hang,
    }

    struct MockProvider {
        source: SignalSource,
        behavior: Behavior,
        calls: AtomicUsize,
    }

    impl MockProvider {
        fn new(source: SignalSource, behavior: Behavior) -> Arc<Self> {
            Arc::new(Self {
                source,
                behavior,
                calls: AtomicUsize::new(0),
            })
        }
    }

    #[async_trait]
    impl SignalProvider for MockProvider {
        fn source(&self) -> SignalSource {
            self.source
        }

        fn is_configured(&self) -> bool {
            true
        }

        async fn fetch(&self, subject_key: &str) -> Result<Signal, ProviderError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            match &self.behavior {
                Behavior::Value {
                    normalized,
                    confidence,
                } => Ok(SignalBuilder::new(self.source, subject_key)
                    .raw_value(*normalized)
                    .normalized(*normalized)
                    .confidence(*confidence)
                    .ttl_secs(600)
                    .build()),
                Behavior::Fail => Err(ProviderError::Unavailable("mock outage".to_string())),
                Behavior::Hang => {
                    tokio::time::sleep(std::time::Duration::from_secs(3600)).await;
                    unreachable!("hang provider should be timed out")
                }
            }
        }
    }

    fn two_source_config() -> EngineConfig {
        let mut sources = HashMap::new();
        sources.insert(
            SignalSource::ReputationKarma,
            SourceConfig {
                enabled: true,
                weight: 0.5,
                ttl_secs: 600,
                timeout_secs: 2,
            },
        );
        sources.insert(
            SignalSource::ReputationAura,
            SourceConfig {
                enabled: true,
                weight: 0.5,
                ttl_secs: 600,
                timeout_secs: 2,
            },
        );
        EngineConfig {
            sources,
            ..EngineConfig::default()
        }
    }

    fn subject() -> Subject {
        Subject::parse("0x00000000000000000000000000000000000000aa").unwrap()
    }

    fn engine(providers: Vec<Arc<MockProvider>>) -> (ScoringEngine, ManualClock) {
        let clock = ManualClock::new(Utc::now());
        let providers: Vec<SharedProvider> =
            providers.into_iter().map(|p| p as SharedProvider).collect();
        let engine = ScoringEngine::new(two_source_config(), providers, Arc::new(clock.clone()));
        (engine, clock)
    }

    #[tokio::test]
    async fn test_partial_failure_degrades_not_fails() {
        // Weights 0.5/0.5; A reports 0.8, B is down:
        // composite = 0.8, confidence = 1 of 2 sources
        let a = MockProvider::new(
            SignalSource::ReputationKarma,
            Behavior::Value {
                normalized: 0.8,
                confidence: 1.0,
            },
        );
        let b = MockProvider::new(SignalSource::ReputationAura, Behavior::Fail);
        let (engine, _clock) = engine(vec![a, b]);

        let result = engine.score(&subject()).await;
        assert_eq!(result.composite, Some(0.8));
        assert_eq!(result.confidence, 0.5);
        assert_eq!(result.tier, TrustTier::Strong);
        assert!(!result.signals.contains_key(&SignalSource::ReputationAura));
    }

    #[tokio::test]
    async fn test_zero_confidence_source_is_excluded_like_absent() {
        let known = || {
            MockProvider::new(
                SignalSource::ReputationAura,
                Behavior::Value {
                    normalized: 0.6,
                    confidence: 1.0,
                },
            )
        };
        let unknown = MockProvider::new(
            SignalSource::ReputationKarma,
            Behavior::Value {
                normalized: 0.9,
                confidence: 0.0,
            },
        );

        let (engine_both, _) = engine(vec![unknown, known()]);
        let (engine_one, _) = engine(vec![known()]);

        let with_zero_conf = engine_both.score(&subject()).await;
        let without = engine_one.score(&subject()).await;

        assert_eq!(with_zero_conf.composite, without.composite);
        assert_eq!(with_zero_conf.composite, Some(0.6));
        // The zero-confidence fetch still appears in the breakdown
        assert!(with_zero_conf
            .signals
            .contains_key(&SignalSource::ReputationKarma));
    }

    #[tokio::test]
    async fn test_all_sources_down_yields_none_tier() {
        let a = MockProvider::new(SignalSource::ReputationKarma, Behavior::Fail);
        let b = MockProvider::new(SignalSource::ReputationAura, Behavior::Fail);
        let (engine, _clock) = engine(vec![a, b]);

        let result = engine.score(&subject()).await;
        assert_eq!(result.composite, None);
        assert_eq!(result.tier, TrustTier::None);
        assert_eq!(result.confidence, 0.0);
        assert!(result.signals.is_empty());
    }

    #[tokio::test]
    async fn test_cache_hit_within_ttl_but_fresh_reduction() {
        let a = MockProvider::new(
            SignalSource::ReputationKarma,
            Behavior::Value {
                normalized: 0.7,
                confidence: 1.0,
            },
        );
        let b = MockProvider::new(
            SignalSource::ReputationAura,
            Behavior::Value {
                normalized: 0.5,
                confidence: 1.0,
            },
        );
        let (engine, clock) = engine(vec![a.clone(), b.clone()]);

        let first = engine.score(&subject()).await;
        clock.advance(Duration::seconds(30));
        let second = engine.score(&subject()).await;

        // Within TTL: one provider call each, identical signals
        assert_eq!(a.calls.load(Ordering::SeqCst), 1);
        assert_eq!(b.calls.load(Ordering::SeqCst), 1);
        assert_eq!(first.signals, second.signals);

        // But the result itself is recomputed fresh
        assert_ne!(first.id, second.id);
        assert_eq!(second.computed_at, first.computed_at + Duration::seconds(30));

        // Past TTL: exactly one refetch per source
        clock.advance(Duration::seconds(600));
        engine.score(&subject()).await;
        assert_eq!(a.calls.load(Ordering::SeqCst), 2);
        assert_eq!(b.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_slow_source_times_out_without_blocking_others() {
        let a = MockProvider::new(
            SignalSource::ReputationKarma,
            Behavior::Value {
                normalized: 0.4,
                confidence: 1.0,
            },
        );
        let b = MockProvider::new(SignalSource::ReputationAura, Behavior::Hang);
        let (engine, _clock) = engine(vec![a, b]);

        let result = engine.score(&subject()).await;
        assert_eq!(result.composite, Some(0.4));
        assert_eq!(result.confidence, 0.5);
        assert!(!result.signals.contains_key(&SignalSource::ReputationAura));
    }

    #[tokio::test]
    async fn test_missing_provider_counts_against_confidence() {
        // Aura is enabled in config but no provider is registered
        let a = MockProvider::new(
            SignalSource::ReputationKarma,
            Behavior::Value {
                normalized: 1.0,
                confidence: 1.0,
            },
        );
        let (engine, _clock) = engine(vec![a]);

        let result = engine.score(&subject()).await;
        assert_eq!(result.composite, Some(1.0));
        assert_eq!(result.confidence, 0.5);
    }
}
