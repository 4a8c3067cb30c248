//! trustlens Providers
//!
//! One async HTTP client per external signal source:
//! - **Social graph**: follow lists and account quality
//! - **Karma / Aura**: two independent reputation-score services
//! - **Commerce**: revenue history and account-owner profile, keyed by a
//!   previously exchanged access token
//!
//! Clients do not retry and never cache; retry/freshness policy belongs
//! to the engine's cache layer. A missing credential makes a client
//! unconfigured (logged once at construction), never a hard failure.

pub mod commerce;
pub mod reputation;
pub mod social_graph;
pub mod traits;

pub use commerce::*;
pub use reputation::*;
pub use social_graph::*;
pub use traits::*;
