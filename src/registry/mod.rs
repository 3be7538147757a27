//! Filter type registry
//!
//! A filter *type* is a namespace of criteria with its own URL param
//! codes, allowed fields and allowed operators. Types are registered
//! once at startup; registration compiles the anchored token matchers
//! used by the codec and rejects any configuration whose URL tokens
//! could be ambiguous.

use crate::core::error::{ConfigError, RegistryError};
use crate::core::operator::{OperatorDef, OperatorRegistry};
use crate::schema::{FieldType, RelationKind, SchemaProvider};
use indexmap::IndexMap;
use regex::Regex;
use serde::{Deserialize, Serialize};

/// Field names never offered as filter fields, whatever the schema says
const SENSITIVE_FIELDS: &[&str] = &[
    "password",
    "password_hash",
    "passwd",
    "secret",
    "token",
    "api_key",
];

/// Which of the three params a URL token carries
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamRole {
    Field,
    Operator,
    Value,
}

impl ParamRole {
    /// All roles in canonical order
    pub const ALL: [ParamRole; 3] = [ParamRole::Field, ParamRole::Operator, ParamRole::Value];

    /// Role name for error messages
    pub fn name(&self) -> &'static str {
        match self {
            ParamRole::Field => "field",
            ParamRole::Operator => "operator",
            ParamRole::Value => "value",
        }
    }
}

/// The three short tokens identifying a type's params in URLs
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ParamCodes {
    pub field: String,
    pub operator: String,
    pub value: String,
}

impl ParamCodes {
    /// Create codes from the three tokens
    pub fn new(
        field: impl Into<String>,
        operator: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        Self {
            field: field.into(),
            operator: operator.into(),
            value: value.into(),
        }
    }

    /// The code for a role
    pub fn get(&self, role: ParamRole) -> &str {
        match role {
            ParamRole::Field => &self.field,
            ParamRole::Operator => &self.operator,
            ParamRole::Value => &self.value,
        }
    }
}

impl Default for ParamCodes {
    fn default() -> Self {
        Self::new("f", "o", "v")
    }
}

/// A labelled, typed field offered for filtering
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct FieldDef {
    pub label: String,
    pub data_type: FieldType,
}

/// How a type's allowed fields are determined
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldDiscovery {
    /// Fields listed explicitly in configuration, keyed "Entity.field"
    Explicit(IndexMap<String, FieldDef>),

    /// Primary entity plus entities it belongs-to or has-one of
    Related,

    /// Primary entity's own fields only
    PrimaryOnly,

    /// Only the primary entity's display field
    DisplayOnly,
}

/// Canonical configuration of one filter type
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeConfig {
    /// Stable namespace identifier, also the URL token prefix
    pub name: String,

    /// Human-readable label
    pub label: String,

    /// The three URL param codes
    pub codes: ParamCodes,

    /// The primary entity this type filters
    pub entity: String,

    /// Allowed field determination
    pub fields: FieldDiscovery,

    /// Allowed operator ids; `None` means every registered operator
    pub operators: Option<Vec<String>>,
}

impl TypeConfig {
    /// A type with all defaults: label and entity equal to the name,
    /// `f`/`o`/`v` codes, related-entity field discovery, all operators
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            label: name.clone(),
            entity: name.clone(),
            name,
            codes: ParamCodes::default(),
            fields: FieldDiscovery::Related,
            operators: None,
        }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    pub fn with_codes(mut self, codes: ParamCodes) -> Self {
        self.codes = codes;
        self
    }

    pub fn with_entity(mut self, entity: impl Into<String>) -> Self {
        self.entity = entity.into();
        self
    }

    pub fn with_fields(mut self, fields: FieldDiscovery) -> Self {
        self.fields = fields;
        self
    }

    pub fn with_operators(mut self, ids: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.operators = Some(ids.into_iter().map(Into::into).collect());
        self
    }
}

/// A successful token match: which type, role and index a URL key names
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenMatch<'a> {
    pub type_name: &'a str,
    pub role: ParamRole,
    pub index: u32,
}

#[derive(Debug)]
struct RegisteredType {
    config: TypeConfig,
    // One anchored matcher per role, compiled at registration
    matchers: [(ParamRole, Regex); 3],
}

/// Registry of all filter types, immutable once configuration is done
#[derive(Debug, Default)]
pub struct TypeRegistry {
    types: IndexMap<String, RegisteredType>,
}

impl TypeRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a filter type.
    ///
    /// Fails if a param code is empty or reused within the type, if the
    /// name is taken, if any `name + code` combination would make URL
    /// tokens ambiguous with an already-registered one, or if the
    /// operator list names an id `operators` does not know.
    pub fn register(
        &mut self,
        config: TypeConfig,
        operators: &OperatorRegistry,
    ) -> Result<(), ConfigError> {
        for role in ParamRole::ALL {
            if config.codes.get(role).is_empty() {
                return Err(ConfigError::EmptyParamCode {
                    type_name: config.name.clone(),
                    role: role.name(),
                });
            }
        }
        for (i, a) in ParamRole::ALL.iter().enumerate() {
            for b in &ParamRole::ALL[i + 1..] {
                if config.codes.get(*a) == config.codes.get(*b) {
                    return Err(ConfigError::DuplicateParamCode {
                        type_name: config.name.clone(),
                        code: config.codes.get(*a).to_string(),
                    });
                }
            }
        }
        if self.types.contains_key(&config.name) {
            return Err(ConfigError::DuplicateTypeName {
                type_name: config.name.clone(),
            });
        }

        // Token prefixes must stay unambiguous: a prefix equal to, or a
        // digit-extensible extension of, another prefix would let one
        // URL token parse two ways. Checked against every registered
        // type and within the new type itself.
        let mut prefixes: Vec<(String, String, String)> = Vec::new();
        for registered in self.types.values() {
            for role in ParamRole::ALL {
                let code = registered.config.codes.get(role);
                prefixes.push((
                    registered.config.name.clone(),
                    code.to_string(),
                    format!("{}{}", registered.config.name, code),
                ));
            }
        }
        for (i, a) in ParamRole::ALL.iter().enumerate() {
            let code = config.codes.get(*a);
            let prefix = format!("{}{}", config.name, code);
            for (other_type, other_code, other_prefix) in &prefixes {
                if tokens_collide(&prefix, other_prefix) {
                    return Err(ConfigError::AmbiguousToken {
                        type_name: config.name.clone(),
                        code: code.to_string(),
                        other_type: other_type.clone(),
                        other_code: other_code.clone(),
                    });
                }
            }
            for b in &ParamRole::ALL[i + 1..] {
                let other = format!("{}{}", config.name, config.codes.get(*b));
                if tokens_collide(&prefix, &other) {
                    return Err(ConfigError::AmbiguousToken {
                        type_name: config.name.clone(),
                        code: code.to_string(),
                        other_type: config.name.clone(),
                        other_code: config.codes.get(*b).to_string(),
                    });
                }
            }
        }

        if let Some(ids) = &config.operators {
            for id in ids {
                if !operators.contains(id) {
                    return Err(ConfigError::UnknownOperator {
                        type_name: config.name.clone(),
                        id: id.clone(),
                    });
                }
            }
        }

        let matchers = ParamRole::ALL.map(|role| {
            let pattern = format!(
                "^{}{}([0-9]+)$",
                regex::escape(&config.name),
                regex::escape(config.codes.get(role))
            );
            // The pattern is built from escaped literals, so it always compiles
            (role, Regex::new(&pattern).unwrap())
        });

        self.types
            .insert(config.name.clone(), RegisteredType { config, matchers });
        Ok(())
    }

    /// Configuration of a type
    pub fn get(&self, name: &str) -> Result<&TypeConfig, RegistryError> {
        self.types
            .get(name)
            .map(|t| &t.config)
            .ok_or_else(|| RegistryError::UnknownType {
                name: name.to_string(),
            })
    }

    /// Whether a type name is registered
    pub fn contains(&self, name: &str) -> bool {
        self.types.contains_key(name)
    }

    /// All type configurations in registration order
    pub fn iter(&self) -> impl Iterator<Item = &TypeConfig> {
        self.types.values().map(|t| &t.config)
    }

    /// Number of registered types
    pub fn len(&self) -> usize {
        self.types.len()
    }

    /// Whether no types are registered
    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    /// Match a URL parameter key against every registered type's own
    /// matchers. Registration guarantees at most one type can match.
    pub fn match_token(&self, key: &str) -> Option<TokenMatch<'_>> {
        for registered in self.types.values() {
            for (role, matcher) in &registered.matchers {
                if let Some(captures) = matcher.captures(key) {
                    let index: u32 = captures[1].parse().ok()?;
                    return Some(TokenMatch {
                        type_name: &registered.config.name,
                        role: *role,
                        index,
                    });
                }
            }
        }
        None
    }

    /// Whether a URL parameter key is a filter token of any type
    pub fn is_filter_token(&self, key: &str) -> bool {
        self.match_token(key).is_some()
    }

    /// Build the URL token for (type, role, index)
    pub fn token(
        &self,
        type_name: &str,
        role: ParamRole,
        index: u32,
    ) -> Result<String, RegistryError> {
        let config = self.get(type_name)?;
        Ok(format!("{}{}{}", config.name, config.codes.get(role), index))
    }

    /// Effective field options of a type, keyed "Entity.field".
    ///
    /// Explicit configuration wins; otherwise fields are discovered
    /// through `schema` per the type's discovery mode. Credential-named
    /// fields are excluded unconditionally.
    pub fn resolve_field_options(
        &self,
        type_name: &str,
        schema: &dyn SchemaProvider,
    ) -> Result<IndexMap<String, FieldDef>, RegistryError> {
        let config = self.get(type_name)?;
        let mut options = IndexMap::new();

        match &config.fields {
            FieldDiscovery::Explicit(fields) => {
                options = fields.clone();
            }
            FieldDiscovery::Related => {
                collect_entity_fields(&mut options, schema, &config.entity, true);
                let related = schema.related_entities(
                    &config.entity,
                    &[RelationKind::BelongsTo, RelationKind::HasOne],
                );
                for entity in related {
                    collect_entity_fields(&mut options, schema, &entity, false);
                }
            }
            FieldDiscovery::PrimaryOnly => {
                collect_entity_fields(&mut options, schema, &config.entity, true);
            }
            FieldDiscovery::DisplayOnly => {
                if let Some(field) = schema.display_field(&config.entity) {
                    let data_type = schema
                        .fields_of(&config.entity)
                        .get(&field)
                        .copied()
                        .unwrap_or(FieldType::String);
                    options.insert(
                        format!("{}.{}", config.entity, field),
                        FieldDef {
                            label: humanize(&field),
                            data_type,
                        },
                    );
                }
            }
        }

        options.retain(|key, _| {
            let field = key.rsplit('.').next().unwrap_or(key);
            !SENSITIVE_FIELDS.contains(&field)
        });
        Ok(options)
    }

    /// Effective operator options of a type, in catalog order for the
    /// default and configuration order otherwise
    pub fn resolve_operator_options(
        &self,
        type_name: &str,
        operators: &OperatorRegistry,
    ) -> Result<Vec<OperatorDef>, RegistryError> {
        let config = self.get(type_name)?;
        match &config.operators {
            None => Ok(operators.all().cloned().collect()),
            Some(ids) => Ok(ids
                .iter()
                .filter_map(|id| operators.lookup(id).ok())
                .cloned()
                .collect()),
        }
    }

    /// Whether an operator id is allowed for a type
    pub fn operator_allowed(
        &self,
        type_name: &str,
        operator_id: &str,
        operators: &OperatorRegistry,
    ) -> bool {
        let Ok(config) = self.get(type_name) else {
            return false;
        };
        if !operators.contains(operator_id) {
            return false;
        }
        match &config.operators {
            None => true,
            Some(ids) => ids.iter().any(|id| id == operator_id),
        }
    }
}

fn collect_entity_fields(
    options: &mut IndexMap<String, FieldDef>,
    schema: &dyn SchemaProvider,
    entity: &str,
    primary: bool,
) {
    for (field, data_type) in schema.fields_of(entity) {
        let label = if primary {
            humanize(&field)
        } else {
            format!("{} {}", entity, humanize(&field))
        };
        options.insert(format!("{}.{}", entity, field), FieldDef { label, data_type });
    }
}

// "created_at" -> "Created At"
fn humanize(field: &str) -> String {
    field
        .split('_')
        .filter(|w| !w.is_empty())
        .map(|w| {
            let mut chars = w.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

fn tokens_collide(a: &str, b: &str) -> bool {
    fn digit_extension(longer: &str, shorter: &str) -> bool {
        longer.len() > shorter.len()
            && longer.starts_with(shorter)
            && longer[shorter.len()..].bytes().all(|b| b.is_ascii_digit())
    }
    a == b || digit_extension(a, b) || digit_extension(b, a)
}
