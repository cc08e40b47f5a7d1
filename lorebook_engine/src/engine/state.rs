//! Per-session activation history - the temporal gate's memory.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use lorebook::{EntryId, LorebookEntry};

/// Timing record for one entry, in absolute turn indices.
///
/// Windows are fixed at activation time and never recomputed: an entry
/// activated at turn `t` is sticky over `[t, t + sticky)` and blocked over
/// `[t, t + cooldown)`, whatever happens in between.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntryActivation {
    /// Turn at which the entry last match-activated.
    pub last_activated_at: u64,

    /// Turn at which the sticky window closes, if sticky is configured.
    pub sticky_until: Option<u64>,

    /// Turn at which the cooldown window closes, if cooldown is configured.
    pub cooldown_until: Option<u64>,
}

/// Activation history for one conversation session.
///
/// This is the engine's only cross-call memory. Each session owns exactly
/// one value; sharing a state across sessions leaks sticky and cooldown
/// windows between unrelated conversations. The engine takes it by
/// `&mut`, so same-session calls are serialized by ownership.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ActivationState {
    entries: HashMap<EntryId, EntryActivation>,
}

impl ActivationState {
    /// Create a new empty activation state.
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the timing record for an entry.
    pub fn get(&self, id: EntryId) -> Option<&EntryActivation> {
        self.entries.get(&id)
    }

    /// Seed a timing record directly (session restore, deterministic tests).
    pub fn insert(&mut self, id: EntryId, activation: EntryActivation) {
        self.entries.insert(id, activation);
    }

    /// Record a match-activation at `turn`, replacing any previous record.
    pub fn record_activation(&mut self, entry: &LorebookEntry, turn: u64) {
        let activation = EntryActivation {
            last_activated_at: turn,
            sticky_until: (entry.sticky > 0).then(|| turn + entry.sticky),
            cooldown_until: (entry.cooldown > 0).then(|| turn + entry.cooldown),
        };
        self.entries.insert(entry.id, activation);
    }

    /// Whether the entry's sticky window is still open at `turn`.
    pub fn is_sticky(&self, id: EntryId, turn: u64) -> bool {
        self.entries
            .get(&id)
            .and_then(|a| a.sticky_until)
            .is_some_and(|until| turn < until)
    }

    /// Whether the entry's cooldown window is still open at `turn`.
    pub fn is_on_cooldown(&self, id: EntryId, turn: u64) -> bool {
        self.entries
            .get(&id)
            .and_then(|a| a.cooldown_until)
            .is_some_and(|until| turn < until)
    }

    /// Number of entries with a timing record.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no entry has a timing record.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate over all timing records.
    pub fn iter(&self) -> impl Iterator<Item = (&EntryId, &EntryActivation)> {
        self.entries.iter()
    }

    /// Clear all history. Call when a new conversation session begins.
    pub fn reset(&mut self) {
        self.entries.clear();
    }
}
