//! Lorebook documents - ordered entry collections plus scan configuration.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashSet;
use thiserror::Error;
use uuid::Uuid;

use crate::entry::{EntryId, LorebookEntry};

/// Unique identifier for lorebooks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LorebookId(pub Uuid);

impl LorebookId {
    /// Create a new random lorebook ID.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Create a lorebook ID from a specific UUID.
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Create a nil/empty lorebook ID (useful for defaults).
    pub fn nil() -> Self {
        Self(Uuid::nil())
    }
}

impl Default for LorebookId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for LorebookId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// How the context budget would be distributed, were it enforced.
///
/// Carried through from the document format; the activation engine does not
/// count tokens.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BudgetPriority {
    /// Spend budget in insertion order.
    Order,
    /// Spend budget in activation order.
    Activation,
}

/// Errors raised while loading or validating a lorebook document.
#[derive(Debug, Error)]
pub enum LorebookError {
    /// The document has no `entries` member at all.
    #[error("lorebook document is missing its entries collection")]
    MissingEntries,

    /// The document has an `entries` member that is not an array.
    #[error("lorebook entries collection is not an array")]
    MalformedEntries,

    /// Two entries share the same ID.
    #[error("duplicate entry id {0}")]
    DuplicateEntryId(EntryId),

    /// An enabled entry has no trigger keys and can never activate.
    #[error("enabled entry {0} has no trigger keys")]
    EnabledEntryWithoutKeys(EntryId),

    /// The document failed to deserialize.
    #[error("failed to parse lorebook document: {0}")]
    Parse(#[from] serde_json::Error),
}

/// A lorebook: an ordered collection of entries plus scan configuration.
///
/// Produced by the persistence layer from a JSON document; the budget
/// fields are carried but never enforced here.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Lorebook {
    pub id: LorebookId,
    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Entries in document order. IDs must be unique.
    pub entries: Vec<LorebookEntry>,

    /// How many trailing messages form the matching window.
    /// 0 means only sticky or recursively reachable entries can activate.
    #[serde(default = "default_scan_depth")]
    pub scan_depth: usize,

    /// Whether activated content is itself scanned for more triggers.
    #[serde(default = "default_recursive_scanning")]
    pub recursive_scanning: bool,

    #[serde(default)]
    pub budget_enabled: bool,

    /// Maximum token budget; stored, not enforced.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub budget_cap: Option<u32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub budget_priority: Option<BudgetPriority>,
}

fn default_scan_depth() -> usize {
    10
}

fn default_recursive_scanning() -> bool {
    true
}

impl Lorebook {
    /// Create a new empty lorebook with default scan configuration.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: LorebookId::new(),
            name: name.into(),
            description: None,
            entries: Vec::new(),
            scan_depth: default_scan_depth(),
            recursive_scanning: default_recursive_scanning(),
            budget_enabled: false,
            budget_cap: None,
            budget_priority: None,
        }
    }

    /// Set the description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Set the scan depth.
    pub fn with_scan_depth(mut self, depth: usize) -> Self {
        self.scan_depth = depth;
        self
    }

    /// Enable or disable recursive scanning.
    pub fn with_recursive_scanning(mut self, enabled: bool) -> Self {
        self.recursive_scanning = enabled;
        self
    }

    /// Append an entry.
    pub fn with_entry(mut self, entry: LorebookEntry) -> Self {
        self.entries.push(entry);
        self
    }

    /// Append an entry in place.
    pub fn add_entry(&mut self, entry: LorebookEntry) -> EntryId {
        let id = entry.id;
        self.entries.push(entry);
        id
    }

    /// Remove an entry by ID.
    pub fn remove_entry(&mut self, id: EntryId) -> Option<LorebookEntry> {
        let index = self.entries.iter().position(|e| e.id == id)?;
        Some(self.entries.remove(index))
    }

    /// Get an entry by ID.
    pub fn get_entry(&self, id: EntryId) -> Option<&LorebookEntry> {
        self.entries.iter().find(|e| e.id == id)
    }

    /// Get a mutable entry by ID.
    pub fn get_entry_mut(&mut self, id: EntryId) -> Option<&mut LorebookEntry> {
        self.entries.iter_mut().find(|e| e.id == id)
    }

    /// Number of entries, enabled or not.
    pub fn entry_count(&self) -> usize {
        self.entries.len()
    }

    /// Iterate over enabled entries only.
    pub fn enabled_entries(&self) -> impl Iterator<Item = &LorebookEntry> {
        self.entries.iter().filter(|e| e.enabled)
    }

    /// Load a lorebook from a JSON document value.
    ///
    /// A document whose `entries` collection is missing or not an array is
    /// rejected before deserialization; an absent lorebook is the caller's
    /// `Option`, not an error here.
    pub fn from_json_value(value: Value) -> Result<Self, LorebookError> {
        match value.get("entries") {
            Some(Value::Array(_)) => {}
            Some(_) => return Err(LorebookError::MalformedEntries),
            None => return Err(LorebookError::MissingEntries),
        }
        Ok(serde_json::from_value(value)?)
    }

    /// Load a lorebook from a JSON document string.
    pub fn from_json_str(document: &str) -> Result<Self, LorebookError> {
        let value: Value = serde_json::from_str(document)?;
        Self::from_json_value(value)
    }

    /// Serialize the lorebook back to its JSON document form.
    pub fn to_json_value(&self) -> Result<Value, LorebookError> {
        Ok(serde_json::to_value(self)?)
    }

    /// Check structural invariants: unique entry IDs, and trigger keys
    /// present on every enabled entry.
    pub fn validate(&self) -> Result<(), LorebookError> {
        let mut seen = HashSet::with_capacity(self.entries.len());
        for entry in &self.entries {
            if !seen.insert(entry.id) {
                return Err(LorebookError::DuplicateEntryId(entry.id));
            }
            if entry.enabled && entry.keys.iter().all(|k| k.is_empty()) {
                return Err(LorebookError::EnabledEntryWithoutKeys(entry.id));
            }
        }
        Ok(())
    }
}
