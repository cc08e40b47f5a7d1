//! Activation Engine - selects lorebook content for LLM prompts.
//!
//! Each call works through the same pipeline:
//! 1. **Window**: Concatenate the most recent messages up to `scan_depth`
//! 2. **Gate**: Skip entries whose delay or cooldown window blocks them
//! 3. **Match**: Test primary keys and the secondary filter per entry,
//!    plus force-include entries whose sticky window is still open
//! 4. **Resolve**: Collapse each inclusion group to a single winner
//! 5. **Sort**: Order by `insertion_order`, ascending and stable
//! 6. **Record**: Fix sticky/cooldown windows for fresh activations
//! 7. **Recurse**: Scan activated content itself for more triggers,
//!    bounded by a depth cap

mod state;

pub use state::*;

use std::collections::{HashMap, HashSet};
use tracing::debug;

use lorebook::{EntryId, Lorebook, LorebookEntry};

use crate::matcher;

/// Configuration for the activation engine.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Maximum number of recursive scan passes over activated content.
    pub max_recursion_depth: u32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_recursion_depth: 3,
        }
    }
}

/// The activation engine decides which entries to inject each turn.
///
/// The engine itself holds only configuration. All cross-turn memory lives
/// in the [`ActivationState`] the caller owns per conversation session, so
/// one engine can serve any number of sessions without leaking timing
/// windows between them.
pub struct ActivationEngine {
    config: EngineConfig,
}

impl ActivationEngine {
    /// Create a new engine with the given configuration.
    pub fn new(config: EngineConfig) -> Self {
        Self { config }
    }

    /// Create an engine with default configuration.
    pub fn with_defaults() -> Self {
        Self::new(EngineConfig::default())
    }

    /// Activate entries for the current turn.
    ///
    /// `recent_messages` is ordered newest first; only the first
    /// `scan_depth` messages form the matching window. `current_turn` is
    /// the session's absolute message index. Returns the activated
    /// entries' content, ordered by `insertion_order` with recursively
    /// discovered entries appended in discovery order.
    ///
    /// A lorebook without entries yields an empty result and leaves the
    /// state untouched.
    pub fn activate(
        &self,
        lorebook: &Lorebook,
        recent_messages: &[String],
        current_turn: u64,
        state: &mut ActivationState,
    ) -> Vec<String> {
        if lorebook.entries.is_empty() {
            return Vec::new();
        }

        let window = build_window(recent_messages, lorebook.scan_depth);

        // Match pass: gate each entry, then test its trigger condition.
        // Sticky entries ride along independently of gating and matching.
        let mut matched: Vec<&LorebookEntry> = Vec::new();
        let mut fresh: HashSet<EntryId> = HashSet::new();

        for entry in &lorebook.entries {
            if !entry.enabled {
                continue;
            }

            let gated = (entry.delay > 0 && current_turn < entry.delay)
                || state.is_on_cooldown(entry.id, current_turn);

            if !gated && matcher::entry_matches(&window, entry) {
                matched.push(entry);
                fresh.insert(entry.id);
            } else if state.is_sticky(entry.id, current_turn) {
                matched.push(entry);
            }
        }

        let mut resolved = resolve_inclusion_groups(matched);
        resolved.sort_by_key(|e| e.insertion_order);

        // Timing windows are fixed at match time. Sticky carryovers keep
        // the record they activated with, otherwise a sticky window would
        // renew itself every turn and never close.
        for entry in &resolved {
            if fresh.contains(&entry.id) {
                state.record_activation(entry, current_turn);
            }
        }

        let active = if lorebook.recursive_scanning {
            self.expand_recursively(resolved, lorebook)
        } else {
            resolved
        };

        debug!(
            turn = current_turn,
            activated = active.len(),
            "lorebook activation complete"
        );

        active.iter().map(|e| e.content.clone()).collect()
    }

    /// Scan activated content itself for further triggers.
    ///
    /// Each pass joins the active entries' content into a synthetic window
    /// and matches every enabled entry not yet active, secondary filter
    /// included. Delay and cooldown are not re-checked during discovery,
    /// and discovered entries do not record timing state. Termination is
    /// guaranteed by the depth cap, not by convergence.
    fn expand_recursively<'a>(
        &self,
        mut active: Vec<&'a LorebookEntry>,
        lorebook: &'a Lorebook,
    ) -> Vec<&'a LorebookEntry> {
        for depth in 0..self.config.max_recursion_depth {
            let window = active
                .iter()
                .map(|e| e.content.as_str())
                .collect::<Vec<_>>()
                .join(" ");

            let discovered: Vec<&LorebookEntry> = lorebook
                .entries
                .iter()
                .filter(|entry| entry.enabled)
                .filter(|entry| !active.iter().any(|a| a.id == entry.id))
                .filter(|entry| matcher::entry_matches(&window, entry))
                .collect();

            if discovered.is_empty() {
                break;
            }

            debug!(depth, discovered = discovered.len(), "recursive scan pass");
            active.extend(discovered);
        }

        active
    }
}

/// Concatenate the newest `scan_depth` messages into the matching window.
fn build_window(recent_messages: &[String], scan_depth: usize) -> String {
    recent_messages
        .iter()
        .take(scan_depth)
        .map(String::as_str)
        .collect::<Vec<_>>()
        .join(" ")
}

/// Collapse mutually exclusive entries down to one winner per group.
///
/// Ungrouped entries pass through. Within a group the entry with the
/// highest `insertion_order` wins; on a tie the earliest-matched entry is
/// kept. Output preserves matching order.
fn resolve_inclusion_groups(matched: Vec<&LorebookEntry>) -> Vec<&LorebookEntry> {
    let mut winners: HashMap<&str, &LorebookEntry> = HashMap::new();

    for &entry in &matched {
        if let Some(group) = entry.inclusion_group.as_deref() {
            winners
                .entry(group)
                .and_modify(|best| {
                    if entry.insertion_order > best.insertion_order {
                        *best = entry;
                    }
                })
                .or_insert(entry);
        }
    }

    matched
        .into_iter()
        .filter(|entry| match entry.inclusion_group.as_deref() {
            Some(group) => winners.get(group).is_some_and(|w| w.id == entry.id),
            None => true,
        })
        .collect()
}
