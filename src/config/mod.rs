//! Filter configuration loading and normalization
//!
//! Filter types can be declared in YAML either as a bare name (all
//! defaults) or as a full mapping. Normalization happens once, here,
//! producing canonical [`TypeConfig`] values; the codec never sees the
//! shorthand forms.
//!
//! ```yaml
//! types:
//!   - Product
//!   - name: Order
//!     label: Orders
//!     codes: { field: a, operator: b, value: c }
//!     entity: Order
//!     discover: primary
//!     operators: [equals, contains]
//!   - name: Invoice
//!     fields:
//!       Invoice.number: Number
//!       Invoice.total: { label: Total, type: float }
//! ```

use crate::core::error::ConfigError;
use crate::core::operator::OperatorRegistry;
use crate::registry::{FieldDef, FieldDiscovery, ParamCodes, TypeConfig, TypeRegistry};
use crate::schema::FieldType;
use anyhow::Result;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// A field declaration: bare label shorthand or label plus type
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(untagged)]
pub enum FieldDecl {
    /// Just a label; the data type defaults to string
    Label(String),

    /// Label and data type
    Full {
        label: String,
        #[serde(rename = "type")]
        data_type: FieldType,
    },
}

impl FieldDecl {
    fn normalize(&self) -> FieldDef {
        match self {
            FieldDecl::Label(label) => FieldDef {
                label: label.clone(),
                data_type: FieldType::String,
            },
            FieldDecl::Full { label, data_type } => FieldDef {
                label: label.clone(),
                data_type: *data_type,
            },
        }
    }
}

/// Operator declaration: a single id or a list
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(untagged)]
pub enum OperatorsDecl {
    One(String),
    Many(Vec<String>),
}

/// Schema discovery mode named in configuration
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum DiscoverMode {
    /// Primary entity plus directly related entities
    Related,

    /// Primary entity only
    Primary,

    /// Display field only
    Display,
}

/// Full form of a type declaration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TypeDeclFull {
    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub codes: Option<ParamCodes>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub entity: Option<String>,

    /// Explicit field list; wins over `discover` when present
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fields: Option<IndexMap<String, FieldDecl>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub discover: Option<DiscoverMode>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub operators: Option<OperatorsDecl>,
}

/// One type declaration: bare name shorthand or full mapping
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(untagged)]
pub enum TypeDecl {
    Name(String),
    Full(TypeDeclFull),
}

impl TypeDecl {
    /// Produce the canonical configuration for this declaration
    pub fn normalize(&self) -> TypeConfig {
        match self {
            TypeDecl::Name(name) => TypeConfig::new(name.clone()),
            TypeDecl::Full(decl) => {
                let mut config = TypeConfig::new(decl.name.clone());
                if let Some(label) = &decl.label {
                    config = config.with_label(label.clone());
                }
                if let Some(codes) = &decl.codes {
                    config = config.with_codes(codes.clone());
                }
                if let Some(entity) = &decl.entity {
                    config = config.with_entity(entity.clone());
                }
                if let Some(fields) = &decl.fields {
                    let map = fields
                        .iter()
                        .map(|(key, decl)| (key.clone(), decl.normalize()))
                        .collect();
                    config = config.with_fields(FieldDiscovery::Explicit(map));
                } else if let Some(mode) = decl.discover {
                    config = config.with_fields(match mode {
                        DiscoverMode::Related => FieldDiscovery::Related,
                        DiscoverMode::Primary => FieldDiscovery::PrimaryOnly,
                        DiscoverMode::Display => FieldDiscovery::DisplayOnly,
                    });
                }
                match &decl.operators {
                    Some(OperatorsDecl::One(id)) => {
                        config = config.with_operators([id.clone()]);
                    }
                    Some(OperatorsDecl::Many(ids)) => {
                        config = config.with_operators(ids.clone());
                    }
                    None => {}
                }
                config
            }
        }
    }
}

/// Complete filter configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct FiltersConfig {
    #[serde(default)]
    pub types: Vec<TypeDecl>,
}

impl FiltersConfig {
    /// Load configuration from a YAML file
    pub fn from_yaml_file(path: &str) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = serde_yaml::from_str(&content)?;
        Ok(config)
    }

    /// Load configuration from a YAML string
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        let config: Self = serde_yaml::from_str(yaml)?;
        Ok(config)
    }

    /// Merge configurations from several modules.
    ///
    /// Declarations are concatenated; a duplicate type name surfaces
    /// as a hard error when the registry is built.
    pub fn merge(configs: Vec<Self>) -> Self {
        let mut merged = Self::default();
        for config in configs {
            merged.types.extend(config.types);
        }
        merged
    }

    /// Canonical configurations for all declared types
    pub fn normalize(&self) -> Vec<TypeConfig> {
        self.types.iter().map(TypeDecl::normalize).collect()
    }

    /// Build a type registry from this configuration.
    ///
    /// The first invalid declaration aborts with its error; filter
    /// misconfiguration is fatal to startup, never silently patched.
    pub fn build_registry(&self, operators: &OperatorRegistry) -> Result<TypeRegistry, ConfigError> {
        let mut registry = TypeRegistry::new();
        for config in self.normalize() {
            registry.register(config, operators)?;
        }
        Ok(registry)
    }
}
