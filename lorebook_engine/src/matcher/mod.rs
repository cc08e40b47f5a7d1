//! Keyword matching - decides whether an entry's trigger condition is
//! satisfied against a text window.
//!
//! Matching is a pure function of the window and the entry. Timing windows
//! (sticky/cooldown/delay) are the engine's concern, not the matcher's.

use lorebook::{LorebookEntry, SecondaryKeyLogic};
use regex::RegexBuilder;
use tracing::warn;

/// Check whether an entry's full trigger condition holds for a window.
///
/// Disabled entries never match. The primary keys must match and the
/// secondary key filter (if configured) must pass.
pub fn entry_matches(window: &str, entry: &LorebookEntry) -> bool {
    if !entry.enabled {
        return false;
    }
    matches_primary_keys(window, entry) && passes_secondary_filter(window, entry)
}

/// Check whether ANY of the entry's primary keys is found in the window.
///
/// With `use_regex`, each key is compiled as a regular expression; a
/// malformed pattern is a recoverable configuration defect - it is logged
/// and that single key treated as non-matching.
pub fn matches_primary_keys(window: &str, entry: &LorebookEntry) -> bool {
    for key in &entry.keys {
        if entry.use_regex {
            match RegexBuilder::new(key)
                .case_insensitive(!entry.case_sensitive)
                .build()
            {
                Ok(pattern) => {
                    if pattern.is_match(window) {
                        return true;
                    }
                }
                Err(err) => {
                    warn!(entry = %entry.id, %key, %err, "invalid regex key, treating as non-matching");
                }
            }
        } else if contains_key(window, key, entry.case_sensitive) {
            return true;
        }
    }

    false
}

/// Apply the secondary key filter.
///
/// Passes automatically when no secondary keys or no logic are configured.
/// Secondary keys are always plain substrings, even for regex entries.
pub fn passes_secondary_filter(window: &str, entry: &LorebookEntry) -> bool {
    let Some(logic) = entry.secondary_keys_logic else {
        return true;
    };
    if entry.secondary_keys.is_empty() {
        return true;
    }

    let found = entry
        .secondary_keys
        .iter()
        .filter(|key| contains_key(window, key, entry.case_sensitive))
        .count();
    let total = entry.secondary_keys.len();

    match logic {
        SecondaryKeyLogic::AndAny => found > 0,
        SecondaryKeyLogic::AndAll => found == total,
        SecondaryKeyLogic::NotAny => found == 0,
        SecondaryKeyLogic::NotAll => found < total,
    }
}

/// Substring search with optional lowercase folding of both sides.
fn contains_key(window: &str, key: &str, case_sensitive: bool) -> bool {
    if case_sensitive {
        window.contains(key)
    } else {
        window.to_lowercase().contains(&key.to_lowercase())
    }
}
