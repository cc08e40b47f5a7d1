//! Entry definitions - triggerable knowledge snippets.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for lorebook entries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EntryId(pub Uuid);

impl EntryId {
    /// Create a new random entry ID.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Create an entry ID from a specific UUID.
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Create a nil/empty entry ID (useful for defaults).
    pub fn nil() -> Self {
        Self(Uuid::nil())
    }
}

impl Default for EntryId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for EntryId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// How the secondary key filter combines its matches.
///
/// Only consulted when an entry has secondary keys configured; the variant
/// names mirror the spellings used by the JSON document format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SecondaryKeyLogic {
    /// At least one secondary key must be present.
    AndAny,
    /// Every secondary key must be present.
    AndAll,
    /// No secondary key may be present.
    NotAny,
    /// At least one secondary key must be absent.
    NotAll,
}

/// A single triggerable knowledge snippet.
///
/// When any of `keys` is found in the scan window (and the secondary filter
/// passes), `content` is injected into the LLM prompt. The timing fields
/// (`sticky`, `cooldown`, `delay`) are counted in conversation turns, not
/// wall-clock time; 0 means disabled.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LorebookEntry {
    pub id: EntryId,

    /// Title for management UIs; never matched against.
    pub title: String,

    /// Trigger keywords. Must be non-empty while the entry is enabled.
    pub keys: Vec<String>,

    /// Text injected into the prompt on activation.
    pub content: String,

    /// Disabled entries never activate, whatever their state.
    pub enabled: bool,

    /// Lower values are inserted first; higher values land closer to the
    /// end of the prompt and carry more weight with the model.
    pub insertion_order: i32,

    /// Free-form note carried by the document format; inert to the engine.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub memo: Option<String>,

    /// Match keys with exact case instead of folding to lowercase.
    #[serde(default)]
    pub case_sensitive: bool,

    /// Compile each key as a regular expression instead of a substring.
    #[serde(default)]
    pub use_regex: bool,

    /// Refinement keywords applied after a primary match.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub secondary_keys: Vec<String>,

    /// How the secondary keys combine; no logic means the filter passes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub secondary_keys_logic: Option<SecondaryKeyLogic>,

    /// Keep the entry active for this many turns after a real match.
    #[serde(default)]
    pub sticky: u64,

    /// Block re-activation for this many turns after an activation.
    #[serde(default)]
    pub cooldown: u64,

    /// Suppress any activation before this turn index is reached.
    #[serde(default)]
    pub delay: u64,

    /// Entries sharing a group are mutually exclusive per activation call.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inclusion_group: Option<String>,

    /// Tie-break weight inside an inclusion group.
    #[serde(default = "default_group_weight")]
    pub group_weight: u32,
}

fn default_group_weight() -> u32 {
    100
}

impl LorebookEntry {
    /// Create a new enabled entry with the given trigger keys and content.
    pub fn new(
        title: impl Into<String>,
        keys: Vec<String>,
        content: impl Into<String>,
    ) -> Self {
        Self {
            id: EntryId::new(),
            title: title.into(),
            keys,
            content: content.into(),
            enabled: true,
            insertion_order: 100,
            memo: None,
            case_sensitive: false,
            use_regex: false,
            secondary_keys: Vec::new(),
            secondary_keys_logic: None,
            sticky: 0,
            cooldown: 0,
            delay: 0,
            inclusion_group: None,
            group_weight: default_group_weight(),
        }
    }

    /// Set the insertion order.
    pub fn with_insertion_order(mut self, order: i32) -> Self {
        self.insertion_order = order;
        self
    }

    /// Enable or disable the entry.
    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    /// Match keys with exact case.
    pub fn with_case_sensitive(mut self, case_sensitive: bool) -> Self {
        self.case_sensitive = case_sensitive;
        self
    }

    /// Treat each key as a regular expression.
    pub fn with_regex(mut self, use_regex: bool) -> Self {
        self.use_regex = use_regex;
        self
    }

    /// Set the secondary key filter.
    pub fn with_secondary_keys(
        mut self,
        keys: Vec<String>,
        logic: SecondaryKeyLogic,
    ) -> Self {
        self.secondary_keys = keys;
        self.secondary_keys_logic = Some(logic);
        self
    }

    /// Keep the entry active for `turns` turns after a match.
    pub fn with_sticky(mut self, turns: u64) -> Self {
        self.sticky = turns;
        self
    }

    /// Block re-activation for `turns` turns after an activation.
    pub fn with_cooldown(mut self, turns: u64) -> Self {
        self.cooldown = turns;
        self
    }

    /// Suppress activation before turn `turns`.
    pub fn with_delay(mut self, turns: u64) -> Self {
        self.delay = turns;
        self
    }

    /// Put the entry in a mutual-exclusion group.
    pub fn with_inclusion_group(mut self, group: impl Into<String>) -> Self {
        self.inclusion_group = Some(group.into());
        self
    }

    /// Set the inclusion-group tie-break weight.
    pub fn with_group_weight(mut self, weight: u32) -> Self {
        self.group_weight = weight;
        self
    }

    /// Attach a free-form note.
    pub fn with_memo(mut self, memo: impl Into<String>) -> Self {
        self.memo = Some(memo.into());
        self
    }

    /// Whether any timing field is configured.
    pub fn has_timing(&self) -> bool {
        self.sticky > 0 || self.cooldown > 0 || self.delay > 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entry_creation() {
        let entry = LorebookEntry::new(
            "The Blessed Blade",
            vec!["sword".to_string()],
            "A blade blessed by the dawn priests",
        );

        assert!(entry.enabled);
        assert_eq!(entry.insertion_order, 100);
        assert!(!entry.case_sensitive);
        assert!(!entry.use_regex);
        assert_eq!(entry.sticky, 0);
        assert_eq!(entry.group_weight, 100);
    }

    #[test]
    fn test_entry_builder() {
        let entry = LorebookEntry::new("Cult", vec!["cult".to_string()], "...")
            .with_insertion_order(50)
            .with_secondary_keys(
                vec!["ritual".to_string(), "mask".to_string()],
                SecondaryKeyLogic::AndAll,
            )
            .with_sticky(3)
            .with_cooldown(5)
            .with_inclusion_group("factions")
            .with_group_weight(80);

        assert_eq!(entry.insertion_order, 50);
        assert_eq!(entry.secondary_keys.len(), 2);
        assert_eq!(entry.secondary_keys_logic, Some(SecondaryKeyLogic::AndAll));
        assert_eq!(entry.sticky, 3);
        assert_eq!(entry.cooldown, 5);
        assert_eq!(entry.inclusion_group.as_deref(), Some("factions"));
        assert_eq!(entry.group_weight, 80);
        assert!(entry.has_timing());
    }

    #[test]
    fn test_entry_document_field_names() {
        let entry = LorebookEntry::new("Test", vec!["key".to_string()], "text")
            .with_secondary_keys(vec!["other".to_string()], SecondaryKeyLogic::NotAny);

        let json = serde_json::to_value(&entry).expect("serialize entry");

        assert!(json.get("insertionOrder").is_some());
        assert_eq!(json["secondaryKeysLogic"], "NOT_ANY");
        assert!(json.get("caseSensitive").is_some());
        assert!(json.get("useRegex").is_some());
    }

    #[test]
    fn test_entry_defaults_from_sparse_document() {
        let doc = serde_json::json!({
            "id": Uuid::nil(),
            "title": "Sparse",
            "keys": ["dragon"],
            "content": "Dragons rule the peaks",
            "enabled": true,
            "insertionOrder": 10
        });

        let entry: LorebookEntry = serde_json::from_value(doc).expect("parse entry");

        assert!(!entry.case_sensitive);
        assert!(!entry.use_regex);
        assert!(entry.secondary_keys.is_empty());
        assert!(entry.secondary_keys_logic.is_none());
        assert_eq!(entry.sticky, 0);
        assert_eq!(entry.cooldown, 0);
        assert_eq!(entry.delay, 0);
        assert_eq!(entry.group_weight, 100);
    }

    #[test]
    fn test_entry_id_uniqueness() {
        let a = EntryId::new();
        let b = EntryId::new();
        assert_ne!(a, b);
        assert_eq!(EntryId::nil(), EntryId::nil());
    }
}
