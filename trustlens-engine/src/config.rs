//! Engine configuration
//!
//! Weights, TTLs, timeouts and tier thresholds are deployment
//! configuration, not runtime-derived values. Credentials live with the
//! provider configs (env vars); everything here deserializes from TOML.

use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;

use trustlens_core::{
    EngineError, SignalSource, MODERATE_THRESHOLD, STRONG_THRESHOLD, WEAK_THRESHOLD,
};

/// Per-source scoring configuration
#[derive(Debug, Clone, Deserialize)]
pub struct SourceConfig {
    /// Disabled sources are excluded entirely, denominator included
    #[serde(default = "default_enabled")]
    pub enabled: bool,

    /// Fixed weight in the composite mean
    pub weight: f64,

    /// Cache TTL for this source's signals
    pub ttl_secs: i64,

    /// Per-fetch deadline; a slower source degrades to unknown
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_enabled() -> bool {
    true
}

fn default_timeout_secs() -> u64 {
    10
}

/// Aggregator configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub sources: HashMap<SignalSource, SourceConfig>,

    /// Composite score at or above this is STRONG
    pub strong_threshold: f64,
    /// ... MODERATE
    pub moderate_threshold: f64,
    /// ... WEAK; below is NONE
    pub weak_threshold: f64,

    /// Optional capacity bound for the signal cache
    pub max_cache_entries: Option<usize>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        let mut sources = HashMap::new();
        sources.insert(
            SignalSource::SocialGraph,
            SourceConfig {
                enabled: true,
                weight: 0.2,
                ttl_secs: 1800,
                timeout_secs: 10,
            },
        );
        sources.insert(
            SignalSource::ReputationKarma,
            SourceConfig {
                enabled: true,
                weight: 0.25,
                ttl_secs: 3600,
                timeout_secs: 10,
            },
        );
        sources.insert(
            SignalSource::ReputationAura,
            SourceConfig {
                enabled: true,
                weight: 0.25,
                ttl_secs: 7200,
                timeout_secs: 10,
            },
        );
        sources.insert(
            SignalSource::CommerceRevenue,
            SourceConfig {
                enabled: true,
                weight: 0.2,
                ttl_secs: 21_600,
                timeout_secs: 15,
            },
        );
        sources.insert(
            SignalSource::IdentityCrossCheck,
            SourceConfig {
                enabled: true,
                weight: 0.1,
                ttl_secs: 21_600,
                timeout_secs: 15,
            },
        );

        Self {
            sources,
            strong_threshold: STRONG_THRESHOLD,
            moderate_threshold: MODERATE_THRESHOLD,
            weak_threshold: WEAK_THRESHOLD,
            max_cache_entries: None,
        }
    }
}

impl EngineConfig {
    /// Load and validate configuration from a TOML file
    pub fn from_toml_file(path: &Path) -> Result<Self, EngineError> {
        let raw = std::fs::read_to_string(path)?;
        let config: EngineConfig =
            toml::from_str(&raw).map_err(|e| EngineError::InvalidConfig(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Enabled sources, in dispatch order
    pub fn enabled_sources(&self) -> Vec<SignalSource> {
        SignalSource::ALL
            .into_iter()
            .filter(|s| self.sources.get(s).map(|c| c.enabled).unwrap_or(false))
            .collect()
    }

    pub fn source(&self, source: SignalSource) -> Option<&SourceConfig> {
        self.sources.get(&source)
    }

    pub fn validate(&self) -> Result<(), EngineError> {
        for (source, cfg) in &self.sources {
            if cfg.weight < 0.0 {
                return Err(EngineError::InvalidConfig(format!(
                    "negative weight for {}",
                    source
                )));
            }
            if cfg.ttl_secs < 0 {
                return Err(EngineError::InvalidConfig(format!(
                    "negative ttl for {}",
                    source
                )));
            }
        }
        if !(self.weak_threshold <= self.moderate_threshold
            && self.moderate_threshold <= self.strong_threshold)
        {
            return Err(EngineError::InvalidConfig(
                "tier thresholds must be ordered weak <= moderate <= strong".to_string(),
            ));
        }
        Ok(())
    }
}
