//! Schema discovery seam
//!
//! The codec never introspects an ORM itself. When a filter type does
//! not declare its fields explicitly, the type registry asks a
//! [`SchemaProvider`] — assumed to be a synchronous, already-cached
//! lookup — which fields and related entities exist.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Data type of a schema field, used to render the matching input widget
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum FieldType {
    String,
    Text,
    Integer,
    Float,
    Boolean,
    Date,
    DateTime,
}

/// Kind of relation followed during field discovery
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelationKind {
    BelongsTo,
    HasOne,
}

/// Read-only schema lookup implemented by the surrounding application
pub trait SchemaProvider {
    /// Fields of an entity in declaration order. Empty for unknown
    /// entities.
    fn fields_of(&self, entity: &str) -> IndexMap<String, FieldType>;

    /// Entities directly related to `entity` through the given relation
    /// kinds, in declaration order
    fn related_entities(&self, entity: &str, kinds: &[RelationKind]) -> Vec<String>;

    /// The field shown when an entity is listed as a single value.
    ///
    /// Defaults to `name`, then `title`, then the first string field.
    fn display_field(&self, entity: &str) -> Option<String> {
        let fields = self.fields_of(entity);
        for candidate in ["name", "title"] {
            if fields.contains_key(candidate) {
                return Some(candidate.to_string());
            }
        }
        fields
            .iter()
            .find(|(_, ty)| matches!(ty, FieldType::String | FieldType::Text))
            .map(|(name, _)| name.clone())
    }
}

/// In-memory schema, built up-front
///
/// The natural provider for applications with a static model layer, and
/// the one the test suites use.
#[derive(Debug, Clone, Default)]
pub struct StaticSchema {
    entities: IndexMap<String, IndexMap<String, FieldType>>,
    relations: Vec<(String, RelationKind, String)>,
}

impl StaticSchema {
    /// Create an empty schema
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare an entity with its fields, in order
    pub fn entity<'a>(
        mut self,
        name: &str,
        fields: impl IntoIterator<Item = (&'a str, FieldType)>,
    ) -> Self {
        let map = fields
            .into_iter()
            .map(|(f, ty)| (f.to_string(), ty))
            .collect();
        self.entities.insert(name.to_string(), map);
        self
    }

    /// Declare a relation from `source` to `target`
    pub fn relation(mut self, source: &str, kind: RelationKind, target: &str) -> Self {
        self.relations
            .push((source.to_string(), kind, target.to_string()));
        self
    }
}

impl SchemaProvider for StaticSchema {
    fn fields_of(&self, entity: &str) -> IndexMap<String, FieldType> {
        self.entities.get(entity).cloned().unwrap_or_default()
    }

    fn related_entities(&self, entity: &str, kinds: &[RelationKind]) -> Vec<String> {
        self.relations
            .iter()
            .filter(|(source, kind, _)| source == entity && kinds.contains(kind))
            .map(|(_, _, target)| target.clone())
            .collect()
    }
}
