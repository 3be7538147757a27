//! Posted filter-form data
//!
//! The nested structure a filter form submits: type name, then entry
//! index (or the ADD marker), then one value per param code plus an
//! optional REMOVE marker. Ingestion from JSON is lenient — anything
//! that does not fit the shape is skipped, never an error.

use serde_json::Value;
use std::collections::{BTreeMap, HashMap};

/// Marker key requesting a new blank entry for a type
pub const ADD_MARKER: &str = "ADD";

/// Marker key requesting removal of one entry
pub const REMOVE_MARKER: &str = "REMOVE";

/// One posted entry: param-code keyed values plus the remove marker
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PostedEntry {
    /// Values keyed by the type's param codes (e.g. "f", "o", "v")
    pub values: HashMap<String, String>,

    /// Whether the REMOVE marker was set for this entry
    pub remove: bool,
}

/// All posted entries for one filter type
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PostedType {
    /// Entries keyed by their posted index, in index order
    pub entries: BTreeMap<u32, PostedEntry>,

    /// Whether the ADD marker was set for this type
    pub add: bool,
}

/// The complete posted filter structure, keyed by type name
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PostedFilters {
    types: BTreeMap<String, PostedType>,
}

impl PostedFilters {
    /// Create an empty structure
    pub fn new() -> Self {
        Self::default()
    }

    /// Mutable access to a type's posted data, created on first touch
    pub fn type_mut(&mut self, type_name: &str) -> &mut PostedType {
        self.types.entry(type_name.to_string()).or_default()
    }

    /// Posted data for one type
    pub fn get(&self, type_name: &str) -> Option<&PostedType> {
        self.types.get(type_name)
    }

    /// Posted types in name order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &PostedType)> {
        self.types.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Whether nothing was posted
    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    /// Build from a JSON form payload.
    ///
    /// Expected shape:
    ///
    /// ```json
    /// {
    ///   "Product": {
    ///     "ADD": "1",
    ///     "0": { "f": "Product.name", "o": "contains", "v": "shoe" },
    ///     "1": { "f": "...", "o": "...", "v": "...", "REMOVE": "1" }
    ///   }
    /// }
    /// ```
    ///
    /// Non-object levels, non-numeric entry keys and non-scalar values
    /// are skipped. A marker counts as set unless its value is null,
    /// `false` or the empty string.
    pub fn from_json(payload: &Value) -> Self {
        let mut posted = Self::new();
        let Some(types) = payload.as_object() else {
            return posted;
        };

        for (type_name, type_value) in types {
            let Some(type_obj) = type_value.as_object() else {
                continue;
            };
            let slot = posted.type_mut(type_name);

            for (key, entry_value) in type_obj {
                if key == ADD_MARKER {
                    if marker_set(entry_value) {
                        slot.add = true;
                    }
                    continue;
                }
                let Ok(index) = key.parse::<u32>() else {
                    continue;
                };
                let Some(entry_obj) = entry_value.as_object() else {
                    continue;
                };

                let entry = slot.entries.entry(index).or_default();
                for (code, value) in entry_obj {
                    if code == REMOVE_MARKER {
                        if marker_set(value) {
                            entry.remove = true;
                        }
                        continue;
                    }
                    if let Some(s) = scalar_to_string(value) {
                        entry.values.insert(code.clone(), s);
                    }
                }
            }
        }

        posted
    }
}

fn marker_set(value: &Value) -> bool {
    match value {
        Value::Null | Value::Bool(false) => false,
        Value::String(s) => !s.is_empty(),
        _ => true,
    }
}

fn scalar_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}
