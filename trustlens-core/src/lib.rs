//! trustlens Core - Signal types and domain model for borrower trust scoring
//!
//! This crate provides the foundational primitives:
//! - Subjects (wallet addresses, platform handles) being scored
//! - Normalized, confidence-weighted signals from external providers
//! - Trust/proximity/verification result types
//! - The provider error taxonomy

pub mod error;
pub mod profile;
pub mod score;
pub mod signal;
pub mod subject;

pub use error::*;
pub use profile::*;
pub use score::*;
pub use signal::*;
pub use subject::*;

/// Quality weight assigned to a mutual connection with no reputation record
pub const NEUTRAL_QUALITY: f64 = 0.5;

/// Minimum normalized signal value
pub const MIN_SCORE: f64 = 0.0;

/// Maximum normalized signal value
pub const MAX_SCORE: f64 = 1.0;

/// Default composite score threshold for the STRONG tier
pub const STRONG_THRESHOLD: f64 = 0.75;

/// Default composite score threshold for the MODERATE tier
pub const MODERATE_THRESHOLD: f64 = 0.5;

/// Default composite score threshold for the WEAK tier
pub const WEAK_THRESHOLD: f64 = 0.25;

/// Social distance at or below this is LOW proximity risk
pub const PROXIMITY_LOW_BOUND: f64 = 30.0;

/// Social distance at or below this (and above LOW) is MEDIUM proximity risk
pub const PROXIMITY_MEDIUM_BOUND: f64 = 70.0;
