//! Result types exposed by the scoring engine
//!
//! Three query surfaces, three result shapes:
//! - `TrustResult`: the composite score with per-source breakdown
//! - `ProximityResult`: mutual-connection social distance
//! - `VerificationResult`: identity cross-check with explicit flags

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use uuid::Uuid;

use crate::{Signal, SignalSource, Subject};

/// Coarse human-facing trust bucket
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrustTier {
    Strong,
    Moderate,
    Weak,
    /// No source contributed; not a score of zero
    None,
}

impl std::fmt::Display for TrustTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            TrustTier::Strong => "STRONG",
            TrustTier::Moderate => "MODERATE",
            TrustTier::Weak => "WEAK",
            TrustTier::None => "NONE",
        };
        f.write_str(s)
    }
}

/// Final artifact of a composite scoring query
///
/// Constructed fresh per query from whatever signals are available at
/// that instant; the core never persists it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrustResult {
    /// Per-query id for caller-side correlation
    pub id: Uuid,

    /// Who was scored
    pub subject: Subject,

    /// Per-source breakdown; a source that produced nothing is absent
    pub signals: HashMap<SignalSource, Signal>,

    /// Weighted mean over contributing sources; `None` when nothing
    /// contributed - never a fabricated number
    pub composite: Option<f64>,

    /// Tier derived from the composite score
    pub tier: TrustTier,

    /// Fraction of configured sources that actually contributed
    pub confidence: f64,

    /// When this result was assembled
    pub computed_at: DateTime<Utc>,
}

impl TrustResult {
    /// Signals that carry information (`confidence > 0`)
    pub fn contributing(&self) -> impl Iterator<Item = &Signal> {
        self.signals.values().filter(|s| s.is_known())
    }
}

/// Proximity risk bucket derived from social distance
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProximityTier {
    Low,
    Medium,
    High,
    /// Either participant's graph was unavailable
    None,
}

/// Mutual-connection distance between two social-graph participants
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProximityResult {
    /// Size of the follow-set intersection
    pub mutual_connections: usize,

    /// Sum of per-connection quality weights over the mutuals
    pub quality_weighted_mutuals: f64,

    /// 0 = closest, 100 = farthest
    pub social_distance: f64,

    /// Mutuals as a percentage of the smaller follow set
    pub overlap_percent: f64,

    pub risk_tier: ProximityTier,
}

impl ProximityResult {
    /// The null result: one or both graphs were unavailable.
    ///
    /// Callers must not display proximity data they cannot support, so
    /// this carries no default distance.
    pub fn unavailable() -> Self {
        Self {
            mutual_connections: 0,
            quality_weighted_mutuals: 0.0,
            social_distance: 100.0,
            overlap_percent: 0.0,
            risk_tier: ProximityTier::None,
        }
    }
}

/// Outcome of comparing one identity field across sources
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchOutcome {
    /// Normalized forms equal across all reporting sources
    Match,
    /// Word sets share some but not all words
    Partial,
    /// No overlap
    Mismatch,
    /// Fewer than two sources reported the field
    Insufficient,
}

/// Explicit reasons behind an identity verification adjustment
///
/// Every contributing mismatch surfaces as a flag so a human reviewer
/// can see why the confidence moved, not just the final number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VerificationFlag {
    NameMismatch,
    NameVariation,
    EmailMismatch,
}

impl std::fmt::Display for VerificationFlag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            VerificationFlag::NameMismatch => "name_mismatch",
            VerificationFlag::NameVariation => "name_variation",
            VerificationFlag::EmailMismatch => "email_mismatch",
        };
        f.write_str(s)
    }
}

/// Advisory identity cross-check result (heuristic, not cryptographic)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerificationResult {
    pub name_match: MatchOutcome,
    pub email_match: MatchOutcome,

    /// 0-100; starts neutral at 50 and moves with each comparison
    pub confidence: u8,

    pub flags: Vec<VerificationFlag>,
}

/// Qualitative tier for a merchant's commerce revenue history
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BusinessTier {
    Thriving,
    Healthy,
    Emerging,
    Dormant,
    Unknown,
}

impl BusinessTier {
    /// Fixed mapping from tier to normalized signal value.
    ///
    /// `Unknown` yields `None`; the commerce signal then reports
    /// confidence 0 instead of a fabricated value.
    pub fn normalized_value(&self) -> Option<f64> {
        match self {
            BusinessTier::Thriving => Some(1.0),
            BusinessTier::Healthy => Some(0.75),
            BusinessTier::Emerging => Some(0.45),
            BusinessTier::Dormant => Some(0.15),
            BusinessTier::Unknown => None,
        }
    }
}
