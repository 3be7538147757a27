//! Filter entries and the per-request filter set

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One complete (field, operator, value) triple within a filter type
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct FilterEntry {
    /// The filter type (namespace) this entry belongs to
    pub type_name: String,

    /// Position within the type's ordered entry list
    pub index: u32,

    /// Qualified field key (e.g. "Post.title")
    pub field: String,

    /// Operator id (e.g. "contains")
    pub operator: String,

    /// Raw filter value as it appeared in the URL
    pub value: String,
}

/// A possibly-incomplete entry as decoded from URL tokens
///
/// Entries accumulate one param at a time while tokens are matched, so
/// any of the three slots may still be missing before validation.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct RawEntry {
    pub field: Option<String>,
    pub operator: Option<String>,
    pub value: Option<String>,
}

impl RawEntry {
    /// Whether all three params are present and non-empty
    pub fn is_complete(&self) -> bool {
        fn filled(v: &Option<String>) -> bool {
            v.as_deref().is_some_and(|s| !s.is_empty())
        }
        filled(&self.field) && filled(&self.operator) && filled(&self.value)
    }

    /// Whether no param is present at all (a blank slot, e.g. one
    /// appended by an add-filter directive)
    pub fn is_blank(&self) -> bool {
        self.field.is_none() && self.operator.is_none() && self.value.is_none()
    }
}

/// Why an entry was dropped during validation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DropReason {
    /// Fewer than three non-empty params
    Incomplete,

    /// Field key not in the type's resolved field options
    UnknownField,

    /// Operator id outside the type's allowed set or not registered
    DisallowedOperator,
}

/// All decoded filter state for one request
///
/// Maps type name to its entries, ordered by index. Built fresh from
/// the URL on every request and discarded afterward.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterSet {
    types: BTreeMap<String, BTreeMap<u32, RawEntry>>,
}

impl FilterSet {
    /// Create an empty filter set
    pub fn new() -> Self {
        Self::default()
    }

    /// Mutable access to an entry, creating it (and its type bucket)
    /// on first touch
    pub fn entry_mut(&mut self, type_name: &str, index: u32) -> &mut RawEntry {
        self.types
            .entry(type_name.to_string())
            .or_default()
            .entry(index)
            .or_default()
    }

    /// Entries of one type in index order
    pub fn entries(&self, type_name: &str) -> impl Iterator<Item = (u32, &RawEntry)> {
        self.types
            .get(type_name)
            .into_iter()
            .flat_map(|m| m.iter().map(|(i, e)| (*i, e)))
    }

    /// Highest index present for a type
    pub fn max_index(&self, type_name: &str) -> Option<u32> {
        self.types
            .get(type_name)
            .and_then(|m| m.keys().next_back())
            .copied()
    }

    /// Type names with at least one entry, in name order
    pub fn type_names(&self) -> impl Iterator<Item = &str> {
        self.types.keys().map(|s| s.as_str())
    }

    /// Total number of entries across all types
    pub fn len(&self) -> usize {
        self.types.values().map(BTreeMap::len).sum()
    }

    /// Whether no entries were decoded
    pub fn is_empty(&self) -> bool {
        self.types.values().all(BTreeMap::is_empty)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_raw_entry_completeness() {
        let mut entry = RawEntry::default();
        assert!(entry.is_blank());
        assert!(!entry.is_complete());

        entry.field = Some("Post.title".to_string());
        entry.operator = Some("contains".to_string());
        assert!(!entry.is_blank());
        assert!(!entry.is_complete());

        entry.value = Some("cake".to_string());
        assert!(entry.is_complete());

        // Empty strings count as unset
        entry.value = Some(String::new());
        assert!(!entry.is_complete());
    }

    #[test]
    fn test_filter_set_ordering() {
        let mut set = FilterSet::new();
        set.entry_mut("F", 2).field = Some("b".to_string());
        set.entry_mut("F", 0).field = Some("a".to_string());
        set.entry_mut("F", 5).field = Some("c".to_string());

        let indices: Vec<u32> = set.entries("F").map(|(i, _)| i).collect();
        assert_eq!(indices, vec![0, 2, 5]);
        assert_eq!(set.max_index("F"), Some(5));
        assert_eq!(set.max_index("G"), None);
    }

    #[test]
    fn test_filter_set_len() {
        let mut set = FilterSet::new();
        assert!(set.is_empty());
        set.entry_mut("F", 0);
        set.entry_mut("G", 0);
        set.entry_mut("G", 1);
        assert_eq!(set.len(), 3);
        assert_eq!(set.type_names().collect::<Vec<_>>(), vec!["F", "G"]);
    }
}
