//! Query condition builder
//!
//! Turns validated filter entries into structured condition
//! descriptors, grouped by target entity, plus the equality-defaults
//! map used to pre-populate creation forms. Descriptors carry no SQL:
//! the query layer binds `value` as an opaque parameter.

use crate::core::entry::FilterEntry;
use crate::core::operator::OperatorRegistry;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// One condition for the query layer
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ConditionDescriptor {
    /// Entity the condition targets
    pub entity: String,

    /// Condition key: qualified field plus operator suffix,
    /// e.g. "Post.title LIKE" or "Post.id"
    pub key: String,

    /// Formatted value, e.g. "%cake%"
    pub value: String,
}

/// Everything the condition builder produces for one request
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BuildOutput {
    /// Conditions grouped by target entity, in encounter order
    pub conditions: IndexMap<String, Vec<ConditionDescriptor>>,

    /// Field -> raw value for equality entries on the primary entity.
    /// Last write wins when several equality entries share a field.
    pub defaults: IndexMap<String, String>,
}

/// Compile validated entries into condition descriptors.
///
/// A field key without an entity qualifier is attributed to
/// `primary_entity`. Entries whose operator id is unknown are skipped;
/// on input that went through `validate` this does not happen.
pub fn build(
    entries: &[FilterEntry],
    operators: &OperatorRegistry,
    primary_entity: &str,
) -> BuildOutput {
    let mut output = BuildOutput::default();

    for entry in entries {
        let Ok(operator) = operators.lookup(&entry.operator) else {
            debug!(operator = %entry.operator, "unknown operator in build, entry skipped");
            continue;
        };

        let (entity, field) = match entry.field.split_once('.') {
            Some((entity, field)) => (entity, field),
            None => (primary_entity, entry.field.as_str()),
        };

        let descriptor = ConditionDescriptor {
            entity: entity.to_string(),
            key: format!("{}.{}{}", entity, field, operator.condition_operator),
            value: operator.value_format.apply(&entry.value),
        };
        output
            .conditions
            .entry(entity.to_string())
            .or_default()
            .push(descriptor);

        if entity == primary_entity && operator.is_equality() {
            output
                .defaults
                .insert(field.to_string(), entry.value.clone());
        }
    }

    output
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(index: u32, field: &str, operator: &str, value: &str) -> FilterEntry {
        FilterEntry {
            type_name: "F".to_string(),
            index,
            field: field.to_string(),
            operator: operator.to_string(),
            value: value.to_string(),
        }
    }

    #[test]
    fn test_build_contains_condition() {
        let operators = OperatorRegistry::default();
        let output = build(
            &[entry(0, "Post.title", "contains", "cake")],
            &operators,
            "Post",
        );

        let conditions = &output.conditions["Post"];
        assert_eq!(conditions.len(), 1);
        assert_eq!(conditions[0].key, "Post.title LIKE");
        assert_eq!(conditions[0].value, "%cake%");
    }

    #[test]
    fn test_build_groups_by_entity() {
        let operators = OperatorRegistry::default();
        let output = build(
            &[
                entry(0, "Post.title", "contains", "a"),
                entry(1, "Author.name", "equals", "bob"),
                entry(2, "Post.views", "greater_than", "10"),
            ],
            &operators,
            "Post",
        );

        assert_eq!(output.conditions["Post"].len(), 2);
        assert_eq!(output.conditions["Author"].len(), 1);
        assert_eq!(output.conditions["Post"][1].key, "Post.views >");
        assert_eq!(output.conditions["Post"][1].value, "10");
    }

    #[test]
    fn test_build_equality_defaults() {
        let operators = OperatorRegistry::default();
        let output = build(
            &[
                entry(0, "Post.category", "equals", "news"),
                entry(1, "Author.name", "equals", "bob"),
                entry(2, "Post.title", "contains", "x"),
            ],
            &operators,
            "Post",
        );

        // Only primary-entity equality entries feed the defaults
        assert_eq!(output.defaults.len(), 1);
        assert_eq!(output.defaults["category"], "news");
    }

    #[test]
    fn test_build_defaults_last_write_wins() {
        let operators = OperatorRegistry::default();
        let output = build(
            &[
                entry(0, "Post.category", "equals", "news"),
                entry(1, "Post.category", "equals", "sport"),
            ],
            &operators,
            "Post",
        );
        assert_eq!(output.defaults["category"], "sport");
    }

    #[test]
    fn test_build_unqualified_field_uses_primary() {
        let operators = OperatorRegistry::default();
        let output = build(&[entry(0, "title", "equals", "x")], &operators, "Post");
        assert_eq!(output.conditions["Post"][0].key, "Post.title");
        assert_eq!(output.defaults["title"], "x");
    }

    #[test]
    fn test_build_skips_unknown_operator() {
        let operators = OperatorRegistry::default();
        let output = build(&[entry(0, "Post.title", "regex", "x")], &operators, "Post");
        assert!(output.conditions.is_empty());
        assert!(output.defaults.is_empty());
    }

    #[test]
    fn test_build_raw_value_in_defaults_formatted_in_condition() {
        let operators = OperatorRegistry::default();
        let output = build(
            &[entry(0, "Post.title", "starts_with", "ca")],
            &operators,
            "Post",
        );
        assert_eq!(output.conditions["Post"][0].value, "ca%");
        assert!(output.defaults.is_empty());
    }
}
