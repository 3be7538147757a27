//! Core types shared across the codec, registries and builders

pub mod entry;
pub mod error;
pub mod operator;
pub mod posted;
pub mod url;

pub use entry::{DropReason, FilterEntry, FilterSet, RawEntry};
pub use error::{ConfigError, RegistryError, SiftError};
pub use operator::{OperatorDef, OperatorRegistry, ValueFormat};
pub use posted::{PostedEntry, PostedFilters, PostedType};
pub use url::NamedUrl;
