//! Identity cross-verification
//!
//! Compares self-reported identity fields against the connected commerce
//! account's owner fields. This is a heuristic consistency check, not
//! cryptographic verification: the result is advisory, and every
//! contributing mismatch surfaces as an explicit flag so a reviewer can
//! see why the confidence moved.

use async_trait::async_trait;
use std::collections::HashSet;
use std::sync::Arc;
use tracing::debug;

use trustlens_core::{
    IdentitySource, MatchOutcome, ProviderError, Signal, SignalSource, VerificationFlag,
    VerificationResult,
};
use trustlens_providers::{CommerceClient, SignalProvider};

/// Neutral starting confidence before any comparison
const BASE_CONFIDENCE: i32 = 50;

const NAME_MATCH_BONUS: i32 = 25;
const NAME_PARTIAL_BONUS: i32 = 10;
const NAME_MISMATCH_PENALTY: i32 = -20;
const EMAIL_MATCH_BONUS: i32 = 25;
const EMAIL_MISMATCH_PENALTY: i32 = -15;

/// Normalize a name for order- and punctuation-insensitive comparison:
/// lowercase, strip non-letters, split into words, sort, rejoin.
pub fn normalize_name(raw: &str) -> String {
    let cleaned: String = raw
        .to_lowercase()
        .chars()
        .map(|c| if c.is_alphabetic() { c } else { ' ' })
        .collect();
    let mut words: Vec<&str> = cleaned.split_whitespace().collect();
    words.sort_unstable();
    words.join(" ")
}

fn name_words(raw: &str) -> HashSet<String> {
    normalize_name(raw)
        .split_whitespace()
        .map(str::to_string)
        .collect()
}

/// Compare names across all reporting sources
fn compare_names(sources: &[IdentitySource]) -> MatchOutcome {
    let word_sets: Vec<HashSet<String>> = sources
        .iter()
        .filter_map(|s| s.name.as_deref())
        .filter(|n| !n.trim().is_empty())
        .map(name_words)
        .collect();

    if word_sets.len() < 2 {
        return MatchOutcome::Insufficient;
    }

    let first = &word_sets[0];
    let all_equal = word_sets.iter().all(|set| set == first);
    if all_equal {
        return MatchOutcome::Match;
    }

    let mut intersection = word_sets[0].clone();
    for set in &word_sets[1..] {
        intersection = intersection.intersection(set).cloned().collect();
    }

    if intersection.is_empty() {
        MatchOutcome::Mismatch
    } else {
        MatchOutcome::Partial
    }
}

/// Case-insensitive exact email comparison across all reporting sources
fn compare_emails(sources: &[IdentitySource]) -> MatchOutcome {
    let emails: Vec<String> = sources
        .iter()
        .filter_map(|s| s.email.as_deref())
        .filter(|e| !e.trim().is_empty())
        .map(|e| e.trim().to_lowercase())
        .collect();

    if emails.len() < 2 {
        return MatchOutcome::Insufficient;
    }

    if emails.iter().all(|e| e == &emails[0]) {
        MatchOutcome::Match
    } else {
        MatchOutcome::Mismatch
    }
}

/// Cross-check identity fields reported by two or more sources.
///
/// Confidence starts neutral at 50 and moves with each field
/// comparison, clamped to [0,100]. `Insufficient` comparisons move
/// nothing: unknown is not evidence either way.
pub fn verify_identity(sources: &[IdentitySource]) -> VerificationResult {
    let name_match = compare_names(sources);
    let email_match = compare_emails(sources);

    let mut confidence = BASE_CONFIDENCE;
    let mut flags = Vec::new();

    match name_match {
        MatchOutcome::Match => confidence += NAME_MATCH_BONUS,
        MatchOutcome::Partial => {
            confidence += NAME_PARTIAL_BONUS;
            flags.push(VerificationFlag::NameVariation);
        }
        MatchOutcome::Mismatch => {
            confidence += NAME_MISMATCH_PENALTY;
            flags.push(VerificationFlag::NameMismatch);
        }
        MatchOutcome::Insufficient => {}
    }

    match email_match {
        MatchOutcome::Match => confidence += EMAIL_MATCH_BONUS,
        MatchOutcome::Mismatch => {
            confidence += EMAIL_MISMATCH_PENALTY;
            flags.push(VerificationFlag::EmailMismatch);
        }
        MatchOutcome::Partial | MatchOutcome::Insufficient => {}
    }

    VerificationResult {
        name_match,
        email_match,
        confidence: confidence.clamp(0, 100) as u8,
        flags,
    }
}

/// Signal provider wrapping the cross-check: self-reported fields
/// against the connected commerce account's owner profile.
pub struct IdentityCrossCheckProvider {
    client: Arc<CommerceClient>,
    self_reported: IdentitySource,
}

impl IdentityCrossCheckProvider {
    pub fn new(client: Arc<CommerceClient>, self_reported: IdentitySource) -> Self {
        Self {
            client,
            self_reported,
        }
    }
}

#[async_trait]
impl SignalProvider for IdentityCrossCheckProvider {
    fn source(&self) -> SignalSource {
        SignalSource::IdentityCrossCheck
    }

    fn is_configured(&self) -> bool {
        self.client.is_configured()
    }

    async fn fetch(&self, subject_key: &str) -> Result<Signal, ProviderError> {
        let owner = self.client.fetch_owner_profile().await?;
        let sources = [
            self.self_reported.clone(),
            IdentitySource::new("commerce_account", owner.name, owner.email),
        ];

        let verification = verify_identity(&sources);
        debug!(
            "identity cross-check for {}: name={:?} email={:?} confidence={}",
            subject_key, verification.name_match, verification.email_match, verification.confidence
        );

        // With nothing to compare on either field the signal is unknown,
        // not a neutral 50
        let comparable = verification.name_match != MatchOutcome::Insufficient
            || verification.email_match != MatchOutcome::Insufficient;
        let confidence = if comparable { 1.0 } else { 0.0 };

        Ok(
            Signal::builder(SignalSource::IdentityCrossCheck, subject_key)
                .raw_value(verification.confidence as f64)
                .normalized(verification.confidence as f64 / 100.0)
                .confidence(confidence)
                .ttl_secs(21_600)
                .build(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn source(label: &str, name: Option<&str>, email: Option<&str>) -> IdentitySource {
        IdentitySource::new(label, name.map(str::to_string), email.map(str::to_string))
    }

    #[test]
    fn test_normalize_name_order_and_punctuation() {
        assert_eq!(
            normalize_name("Maria T. Sanchez"),
            normalize_name("sanchez, maria t")
        );
        assert_eq!(normalize_name("  Jane   DOE "), "doe jane");
    }

    #[test]
    fn test_word_order_is_a_match() {
        let result = verify_identity(&[
            source("self_reported", Some("Jane Doe"), None),
            source("commerce_account", Some("Doe Jane"), None),
        ]);
        assert_eq!(result.name_match, MatchOutcome::Match);
        assert_eq!(result.confidence, 75);
        assert!(result.flags.is_empty());
    }

    #[test]
    fn test_partial_overlap_flags_variation() {
        let result = verify_identity(&[
            source("self_reported", Some("Jane Doe"), None),
            source("commerce_account", Some("Jane Smith"), None),
        ]);
        assert_eq!(result.name_match, MatchOutcome::Partial);
        assert_eq!(result.confidence, 60);
        assert_eq!(result.flags, vec![VerificationFlag::NameVariation]);
    }

    #[test]
    fn test_name_match_email_mismatch_scenario() {
        // Name match (+25) then email mismatch (-15): 50 + 25 - 15 = 60
        let result = verify_identity(&[
            source("self_reported", Some("Jane Doe"), Some("jane@doe.com")),
            source("commerce_account", Some("Doe Jane"), Some("other@shop.com")),
        ]);
        assert_eq!(result.name_match, MatchOutcome::Match);
        assert_eq!(result.email_match, MatchOutcome::Mismatch);
        assert_eq!(result.confidence, 60);
        assert!(result.flags.contains(&VerificationFlag::EmailMismatch));
    }

    #[test]
    fn test_full_mismatch_flags_everything() {
        let result = verify_identity(&[
            source("self_reported", Some("Jane Doe"), Some("jane@doe.com")),
            source("commerce_account", Some("Bob Smith"), Some("bob@smith.com")),
        ]);
        assert_eq!(result.name_match, MatchOutcome::Mismatch);
        assert_eq!(result.email_match, MatchOutcome::Mismatch);
        // 50 - 20 - 15
        assert_eq!(result.confidence, 15);
        assert!(result.flags.contains(&VerificationFlag::NameMismatch));
        assert!(result.flags.contains(&VerificationFlag::EmailMismatch));
    }

    #[test]
    fn test_single_source_is_insufficient() {
        let result = verify_identity(&[source(
            "self_reported",
            Some("Jane Doe"),
            Some("jane@doe.com"),
        )]);
        assert_eq!(result.name_match, MatchOutcome::Insufficient);
        assert_eq!(result.email_match, MatchOutcome::Insufficient);
        assert_eq!(result.confidence, 50);
        assert!(result.flags.is_empty());
    }

    #[test]
    fn test_email_comparison_is_case_insensitive() {
        let result = verify_identity(&[
            source("self_reported", None, Some("Jane@Doe.com")),
            source("commerce_account", None, Some("jane@doe.com")),
        ]);
        assert_eq!(result.email_match, MatchOutcome::Match);
        assert_eq!(result.confidence, 75);
    }
}
