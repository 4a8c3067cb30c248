//! Provider-domain payloads shared between providers and the engine

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// One participant's follow graph as reported by the social provider
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FollowGraph {
    /// Resolved handle of the participant
    pub handle: String,

    /// Accounts this participant follows
    pub follows: HashSet<String>,

    /// Accounts following this participant
    pub follower_count: u64,
}

impl FollowGraph {
    pub fn follow_count(&self) -> usize {
        self.follows.len()
    }
}

/// One month of merchant revenue from the commerce feed
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RevenuePeriod {
    /// First day of the period
    pub period_start: DateTime<Utc>,

    /// Gross revenue in minor currency units (cents)
    pub revenue_minor: u64,

    /// Orders completed in the period
    pub order_count: u32,
}

/// Account-owner fields from a connected platform
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OwnerProfile {
    pub name: Option<String>,
    pub email: Option<String>,
}

/// One source's report of identity fields, labeled for review
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IdentitySource {
    /// Where the fields came from ("self_reported", "commerce_account")
    pub label: String,
    pub name: Option<String>,
    pub email: Option<String>,
}

impl IdentitySource {
    pub fn new(label: &str, name: Option<String>, email: Option<String>) -> Self {
        Self {
            label: label.to_string(),
            name,
            email,
        }
    }
}
