//! trustlens Engine
//!
//! Signal acquisition, caching, and aggregation:
//! - **TtlCache**: read-through cache, one freshness policy per source
//! - **ScoringEngine**: concurrent fan-out over providers, weighted
//!   reduction into a tiered trust result
//! - **SocialProximityCalculator**: mutual-connection distance
//! - **verify_identity**: cross-source identity consistency check
//! - **business_tier**: revenue history to qualitative tier
//!
//! Query surfaces never fail; missing data degrades confidence instead.

pub mod aggregator;
pub mod business;
pub mod cache;
pub mod clock;
pub mod config;
pub mod identity;
pub mod proximity;

pub use aggregator::*;
pub use business::*;
pub use cache::*;
pub use clock::*;
pub use config::*;
pub use identity::*;
pub use proximity::*;
