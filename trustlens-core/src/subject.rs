//! Subjects - the entities being scored
//!
//! A subject is either a wallet-style address or a (platform, handle)
//! pair. Identity is fixed for the lifetime of a scoring request; the
//! canonical `subject_key` is what providers and the cache key on.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;

static WALLET_ADDRESS_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^0x[0-9a-fA-F]{40}$").unwrap());

static NUMERIC_ID_REGEX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^[0-9]{1,19}$").unwrap());

/// The entity being scored
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Subject {
    /// A wallet-style address (0x + 40 hex chars)
    Address { address: String },
    /// An account on a named platform
    Platform { platform: String, handle: String },
}

impl Subject {
    /// Parse a CLI-style subject string: a wallet address, or `platform:handle`
    pub fn parse(input: &str) -> Option<Self> {
        if is_wallet_address(input) {
            return Some(Subject::Address {
                address: input.to_lowercase(),
            });
        }
        let (platform, handle) = input.split_once(':')?;
        if platform.is_empty() || handle.is_empty() {
            return None;
        }
        Some(Subject::Platform {
            platform: platform.to_lowercase(),
            handle: handle.to_string(),
        })
    }

    /// Canonical key used by providers and the signal cache
    pub fn subject_key(&self) -> String {
        match self {
            Subject::Address { address } => address.to_lowercase(),
            Subject::Platform { platform, handle } => format!("{}:{}", platform, handle),
        }
    }
}

impl std::fmt::Display for Subject {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.subject_key())
    }
}

/// True for a 0x-prefixed 20-byte hex address
pub fn is_wallet_address(s: &str) -> bool {
    WALLET_ADDRESS_REGEX.is_match(s)
}

/// True for the numeric account ids the reputation services key on
pub fn is_numeric_id(s: &str) -> bool {
    NUMERIC_ID_REGEX.is_match(s)
}
