//! Comparison operators and their value formatting

use crate::core::error::RegistryError;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// How a filter value is expanded before being handed to the query layer
///
/// A closed set of strategies instead of free-form templates, so a
/// configured operator can never smuggle arbitrary format strings into
/// a condition value. Exactly one substitution of the raw value occurs.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ValueFormat {
    /// The value as-is
    #[default]
    Identity,

    /// Wildcard before the value (`%value`) — "ends with" matching
    PrefixWildcard,

    /// Wildcard after the value (`value%`) — "starts with" matching
    SuffixWildcard,

    /// Wildcard on both sides (`%value%`) — "contains" matching
    BothWildcard,
}

impl ValueFormat {
    /// Expand a raw filter value with this strategy
    pub fn apply(&self, raw: &str) -> String {
        match self {
            ValueFormat::Identity => raw.to_string(),
            ValueFormat::PrefixWildcard => format!("%{}", raw),
            ValueFormat::SuffixWildcard => format!("{}%", raw),
            ValueFormat::BothWildcard => format!("%{}%", raw),
        }
    }
}

/// Definition of one comparison operator
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct OperatorDef {
    /// Stable identifier used in URLs and configuration (e.g. "contains")
    pub id: String,

    /// Human-readable label for option lists (e.g. "contains")
    pub label: String,

    /// Suffix appended to the condition key (e.g. " LIKE", " >=").
    /// Empty for plain equality: the key is then just "Entity.field".
    pub condition_operator: String,

    /// Value expansion strategy
    pub value_format: ValueFormat,
}

impl OperatorDef {
    /// Create a new operator definition
    pub fn new(
        id: impl Into<String>,
        label: impl Into<String>,
        condition_operator: impl Into<String>,
        value_format: ValueFormat,
    ) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            condition_operator: condition_operator.into(),
            value_format,
        }
    }

    /// Whether this is the identity/equality operator.
    ///
    /// Equality entries on the primary entity feed the defaults map
    /// used to pre-populate creation forms.
    pub fn is_equality(&self) -> bool {
        self.condition_operator.is_empty() && self.value_format == ValueFormat::Identity
    }
}

/// Immutable catalog of supported operators, in declaration order
///
/// Built once at startup and shared read-only across requests. The
/// declaration order is stable so rendered option lists do not jump
/// around between deployments.
#[derive(Debug, Clone)]
pub struct OperatorRegistry {
    operators: IndexMap<String, OperatorDef>,
}

impl OperatorRegistry {
    /// Create an empty registry
    pub fn empty() -> Self {
        Self {
            operators: IndexMap::new(),
        }
    }

    /// Add an operator. Re-registering an id replaces its definition.
    pub fn register(&mut self, def: OperatorDef) {
        self.operators.insert(def.id.clone(), def);
    }

    /// Look up an operator by id
    pub fn lookup(&self, id: &str) -> Result<&OperatorDef, RegistryError> {
        self.operators
            .get(id)
            .ok_or_else(|| RegistryError::UnknownOperator { id: id.to_string() })
    }

    /// Whether an operator id is registered
    pub fn contains(&self, id: &str) -> bool {
        self.operators.contains_key(id)
    }

    /// All operators in declaration order
    pub fn all(&self) -> impl Iterator<Item = &OperatorDef> {
        self.operators.values()
    }

    /// All operator ids in declaration order
    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.operators.keys().map(|s| s.as_str())
    }

    /// Number of registered operators
    pub fn len(&self) -> usize {
        self.operators.len()
    }

    /// Whether the registry is empty
    pub fn is_empty(&self) -> bool {
        self.operators.is_empty()
    }
}

impl Default for OperatorRegistry {
    /// The built-in operator catalog
    fn default() -> Self {
        let mut registry = Self::empty();
        registry.register(OperatorDef::new("equals", "=", "", ValueFormat::Identity));
        registry.register(OperatorDef::new(
            "not_equals",
            "!=",
            " !=",
            ValueFormat::Identity,
        ));
        registry.register(OperatorDef::new(
            "contains",
            "contains",
            " LIKE",
            ValueFormat::BothWildcard,
        ));
        registry.register(OperatorDef::new(
            "starts_with",
            "starts with",
            " LIKE",
            ValueFormat::SuffixWildcard,
        ));
        registry.register(OperatorDef::new(
            "ends_with",
            "ends with",
            " LIKE",
            ValueFormat::PrefixWildcard,
        ));
        registry.register(OperatorDef::new(
            "greater_than",
            ">",
            " >",
            ValueFormat::Identity,
        ));
        registry.register(OperatorDef::new(
            "greater_or_equal",
            ">=",
            " >=",
            ValueFormat::Identity,
        ));
        registry.register(OperatorDef::new(
            "less_than",
            "<",
            " <",
            ValueFormat::Identity,
        ));
        registry.register(OperatorDef::new(
            "less_or_equal",
            "<=",
            " <=",
            ValueFormat::Identity,
        ));
        registry
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_value_format_apply() {
        assert_eq!(ValueFormat::Identity.apply("cake"), "cake");
        assert_eq!(ValueFormat::PrefixWildcard.apply("cake"), "%cake");
        assert_eq!(ValueFormat::SuffixWildcard.apply("cake"), "cake%");
        assert_eq!(ValueFormat::BothWildcard.apply("cake"), "%cake%");
    }

    #[test]
    fn test_default_catalog_order() {
        let registry = OperatorRegistry::default();
        let ids: Vec<&str> = registry.ids().collect();
        assert_eq!(ids[0], "equals");
        assert_eq!(ids[1], "not_equals");
        assert_eq!(ids[2], "contains");
        assert_eq!(registry.len(), 9);
    }

    #[test]
    fn test_lookup_known() {
        let registry = OperatorRegistry::default();
        let op = registry.lookup("contains").unwrap();
        assert_eq!(op.condition_operator, " LIKE");
        assert_eq!(op.value_format, ValueFormat::BothWildcard);
    }

    #[test]
    fn test_lookup_unknown() {
        let registry = OperatorRegistry::default();
        let err = registry.lookup("regex").unwrap_err();
        assert_eq!(
            err,
            RegistryError::UnknownOperator {
                id: "regex".to_string()
            }
        );
    }

    #[test]
    fn test_is_equality() {
        let registry = OperatorRegistry::default();
        assert!(registry.lookup("equals").unwrap().is_equality());
        assert!(!registry.lookup("not_equals").unwrap().is_equality());
        assert!(!registry.lookup("contains").unwrap().is_equality());
    }

    #[test]
    fn test_reregister_replaces() {
        let mut registry = OperatorRegistry::default();
        let before = registry.len();
        registry.register(OperatorDef::new(
            "contains",
            "has",
            " ILIKE",
            ValueFormat::BothWildcard,
        ));
        assert_eq!(registry.len(), before);
        assert_eq!(registry.lookup("contains").unwrap().label, "has");
    }
}
