//! Rendering metadata for filter forms
//!
//! The view layer is external; this module only resolves, per filter
//! type, the option lists a form needs and whether a param collapses
//! to a single fixed value (rendered hidden instead of as a select).

use crate::core::error::RegistryError;
use crate::core::operator::OperatorRegistry;
use crate::registry::TypeRegistry;
use crate::schema::SchemaProvider;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// One entry of a select list
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SelectOption {
    pub value: String,
    pub label: String,
}

/// Form metadata for one filter type
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TypeFormModel {
    pub name: String,
    pub label: String,

    /// Field options in resolution order
    pub field_options: Vec<SelectOption>,

    /// Operator options in resolution order
    pub operator_options: Vec<SelectOption>,

    /// Set when exactly one field resolved: render it hidden
    pub fixed_field: Option<String>,

    /// Set when exactly one operator resolved: render it hidden
    pub fixed_operator: Option<String>,
}

/// Form metadata for every registered type, in registration order
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct FormModel {
    pub types: IndexMap<String, TypeFormModel>,
}

impl FormModel {
    /// Resolve metadata for all registered types
    pub fn for_registry(
        registry: &TypeRegistry,
        schema: &dyn SchemaProvider,
        operators: &OperatorRegistry,
    ) -> Result<Self, RegistryError> {
        let mut model = Self::default();
        for config in registry.iter() {
            let fields = registry.resolve_field_options(&config.name, schema)?;
            let operator_defs = registry.resolve_operator_options(&config.name, operators)?;

            let field_options: Vec<SelectOption> = fields
                .iter()
                .map(|(key, def)| SelectOption {
                    value: key.clone(),
                    label: def.label.clone(),
                })
                .collect();
            let operator_options: Vec<SelectOption> = operator_defs
                .iter()
                .map(|def| SelectOption {
                    value: def.id.clone(),
                    label: def.label.clone(),
                })
                .collect();

            let fixed_field = single_value(&field_options);
            let fixed_operator = single_value(&operator_options);

            model.types.insert(
                config.name.clone(),
                TypeFormModel {
                    name: config.name.clone(),
                    label: config.label.clone(),
                    field_options,
                    operator_options,
                    fixed_field,
                    fixed_operator,
                },
            );
        }
        Ok(model)
    }
}

fn single_value(options: &[SelectOption]) -> Option<String> {
    match options {
        [only] => Some(only.value.clone()),
        _ => None,
    }
}
