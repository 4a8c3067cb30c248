//! Trust signals from external providers
//!
//! A signal is one normalized observation about one subject from one
//! provider. All providers report on the same [0,1] scale so signals are
//! directly comparable:
//! - `normalized` carries the provider's score mapped to [0,1]
//! - `confidence` of 0 means "unknown", distinct from a known-bad value
//! - each signal carries the TTL its provider's cache policy assigns

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// External providers that contribute trust signals
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SignalSource {
    /// Mutual-connection social graph
    SocialGraph,
    /// Karma reputation service (0-100 scale)
    ReputationKarma,
    /// Aura reputation service (0-1000 scale)
    ReputationAura,
    /// Commerce platform revenue feed
    CommerceRevenue,
    /// Self-reported identity cross-checked against the commerce account
    IdentityCrossCheck,
}

impl SignalSource {
    /// All sources, in fan-out dispatch order
    pub const ALL: [SignalSource; 5] = [
        SignalSource::SocialGraph,
        SignalSource::ReputationKarma,
        SignalSource::ReputationAura,
        SignalSource::CommerceRevenue,
        SignalSource::IdentityCrossCheck,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SignalSource::SocialGraph => "social_graph",
            SignalSource::ReputationKarma => "reputation_karma",
            SignalSource::ReputationAura => "reputation_aura",
            SignalSource::CommerceRevenue => "commerce_revenue",
            SignalSource::IdentityCrossCheck => "identity_cross_check",
        }
    }
}

impl std::fmt::Display for SignalSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Cache key for one provider's view of one subject
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SignalKey {
    pub source: SignalSource,
    pub subject_key: String,
}

impl SignalKey {
    pub fn new(source: SignalSource, subject_key: &str) -> Self {
        Self {
            source,
            subject_key: subject_key.to_string(),
        }
    }
}

/// One normalized observation from one provider about one subject
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Signal {
    /// Provider that produced this signal
    pub source: SignalSource,

    /// Canonical key of the subject observed
    pub subject_key: String,

    /// Raw value on the provider's own scale
    pub raw_value: f64,

    /// Value mapped to [0,1], comparable across providers
    pub normalized: f64,

    /// How much to trust this observation (0.0 = unknown)
    pub confidence: f64,

    /// When the provider was queried
    pub fetched_at: DateTime<Utc>,

    /// How long this observation stays fresh, in seconds
    pub ttl_secs: i64,
}

impl Signal {
    /// Create a new signal builder
    pub fn builder(source: SignalSource, subject_key: &str) -> SignalBuilder {
        SignalBuilder::new(source, subject_key)
    }

    /// A confidence-zero signal: the provider had nothing to say.
    ///
    /// Distinct from a known-bad score; aggregation excludes these from
    /// the weighted mean instead of counting them as zeros.
    pub fn unknown(source: SignalSource, subject_key: &str, now: DateTime<Utc>) -> Self {
        Self {
            source,
            subject_key: subject_key.to_string(),
            raw_value: 0.0,
            normalized: 0.0,
            confidence: 0.0,
            fetched_at: now,
            ttl_secs: 0,
        }
    }

    /// True when the signal carries usable information
    pub fn is_known(&self) -> bool {
        self.confidence > 0.0
    }

    /// Expiry instant: strictly `fetched_at + ttl`, never extended
    pub fn expires_at(&self) -> DateTime<Utc> {
        self.fetched_at + Duration::seconds(self.ttl_secs)
    }

    /// Check whether the signal is stale at `now`
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at()
    }
}

/// Builder for signals; clamps normalized value and confidence to [0,1]
pub struct SignalBuilder {
    source: SignalSource,
    subject_key: String,
    raw_value: f64,
    normalized: f64,
    confidence: f64,
    fetched_at: Option<DateTime<Utc>>,
    ttl_secs: i64,
}

impl SignalBuilder {
    pub fn new(source: SignalSource, subject_key: &str) -> Self {
        Self {
            source,
            subject_key: subject_key.to_string(),
            raw_value: 0.0,
            normalized: 0.0,
            confidence: 1.0,
            fetched_at: None,
            ttl_secs: 0,
        }
    }

    pub fn raw_value(mut self, raw: f64) -> Self {
        self.raw_value = raw;
        self
    }

    pub fn normalized(mut self, value: f64) -> Self {
        self.normalized = value.clamp(0.0, 1.0);
        self
    }

    pub fn confidence(mut self, confidence: f64) -> Self {
        self.confidence = confidence.clamp(0.0, 1.0);
        self
    }

    pub fn fetched_at(mut self, at: DateTime<Utc>) -> Self {
        self.fetched_at = Some(at);
        self
    }

    pub fn ttl_secs(mut self, secs: i64) -> Self {
        self.ttl_secs = secs.max(0);
        self
    }

    pub fn build(self) -> Signal {
        Signal {
            source: self.source,
            subject_key: self.subject_key,
            raw_value: self.raw_value,
            normalized: self.normalized,
            confidence: self.confidence,
            fetched_at: self.fetched_at.unwrap_or_else(Utc::now),
            ttl_secs: self.ttl_secs,
        }
    }
}
