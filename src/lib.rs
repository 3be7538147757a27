//! # Sift
//!
//! URL-addressable filter state for record listings.
//!
//! Each filter criterion is a (field, operator, value) triple, criteria
//! are grouped into named *types* with their own allowed fields and
//! operators, and the whole filter state lives in the URL as
//! `key:value` path segments, so result pages stay deep-linkable with
//! no server-side session.
//!
//! ## Features
//!
//! - **Bidirectional codec**: posted form data encodes to a canonical,
//!   gap-free token representation; any URL decodes back
//! - **Degrades gracefully**: tampered or stale URLs silently lose the
//!   offending filter, never the page
//! - **Registry-validated**: only configured fields and operators ever
//!   reach a query condition
//! - **Schema discovery**: field options derived from a schema provider
//!   when not configured explicitly
//! - **Configuration-based**: declare filter types in YAML, shorthand
//!   or full form
//!
//! ## Quick Start
//!
//! ```rust
//! use sift::prelude::*;
//!
//! let operators = OperatorRegistry::default();
//! let mut registry = TypeRegistry::new();
//! registry
//!     .register(TypeConfig::new("F").with_entity("Post"), &operators)
//!     .unwrap();
//! let schema = StaticSchema::new().entity("Post", [("title", FieldType::String)]);
//!
//! let url = NamedUrl::parse("/posts/Ff0:Post.title/Fo0:contains/Fv0:cake");
//! let set = decode(&url, &registry);
//! let (valid, _rejected) = validate(&set, &registry, &operators, &schema);
//! let output = build(&valid, &operators, "Post");
//!
//! assert_eq!(output.conditions["Post"][0].key, "Post.title LIKE");
//! assert_eq!(output.conditions["Post"][0].value, "%cake%");
//! ```

pub mod codec;
pub mod conditions;
pub mod config;
pub mod core;
pub mod form;
pub mod registry;
pub mod schema;

/// Re-exports of commonly used types and functions
pub mod prelude {
    // === Core ===
    pub use crate::core::{
        entry::{DropReason, FilterEntry, FilterSet, RawEntry},
        error::{ConfigError, RegistryError, SiftError},
        operator::{OperatorDef, OperatorRegistry, ValueFormat},
        posted::{PostedEntry, PostedFilters, PostedType},
        url::NamedUrl,
    };

    // === Registries ===
    pub use crate::registry::{
        FieldDef, FieldDiscovery, ParamCodes, ParamRole, TypeConfig, TypeRegistry,
    };

    // === Codec ===
    pub use crate::codec::{
        decode, encode,
        links::{addition_tokens, removal_rewrite, TokenRewrite},
        validate, RejectedEntry, ADD_FILTER_PARAM, PAGE_PARAM,
    };

    // === Conditions ===
    pub use crate::conditions::{build, BuildOutput, ConditionDescriptor};

    // === Schema ===
    pub use crate::schema::{FieldType, RelationKind, SchemaProvider, StaticSchema};

    // === Form metadata ===
    pub use crate::form::{FormModel, SelectOption, TypeFormModel};

    // === Config ===
    pub use crate::config::{DiscoverMode, FiltersConfig, TypeDecl};
}
