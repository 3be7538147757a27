//! Typed error handling for the sift library
//!
//! Errors only occur at configuration/registration time or on direct
//! registry lookups. Decoding and validating URL state never errors:
//! malformed tokens and disallowed entries are silently dropped so a
//! stale or hand-edited URL degrades to "that filter is gone" instead
//! of failing the whole listing.
//!
//! # Error Categories
//!
//! - [`ConfigError`]: invalid filter-type configuration (startup-fatal)
//! - [`RegistryError`]: direct lookups of unknown operators or types

use std::fmt;

/// The main error type for the sift library
#[derive(Debug)]
pub enum SiftError {
    /// Configuration errors (registry build time)
    Config(ConfigError),

    /// Registry lookup errors
    Registry(RegistryError),
}

impl fmt::Display for SiftError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SiftError::Config(e) => write!(f, "{}", e),
            SiftError::Registry(e) => write!(f, "{}", e),
        }
    }
}

impl std::error::Error for SiftError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SiftError::Config(e) => Some(e),
            SiftError::Registry(e) => Some(e),
        }
    }
}

impl From<ConfigError> for SiftError {
    fn from(e: ConfigError) -> Self {
        SiftError::Config(e)
    }
}

impl From<RegistryError> for SiftError {
    fn from(e: RegistryError) -> Self {
        SiftError::Registry(e)
    }
}

/// Errors raised while building the type registry from configuration
///
/// All of these are fatal to startup: a misconfigured filter type must
/// never be silently accepted (or silently overwrite a previous one).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// A param code is empty
    EmptyParamCode {
        type_name: String,
        role: &'static str,
    },

    /// The same code was used for more than one of the three roles
    DuplicateParamCode { type_name: String, code: String },

    /// A type with this name is already registered
    DuplicateTypeName { type_name: String },

    /// A type-name + param-code combination collides with (or is a
    /// digit-extensible prefix of) another type's combination, making
    /// URL tokens ambiguous
    AmbiguousToken {
        type_name: String,
        code: String,
        other_type: String,
        other_code: String,
    },

    /// The type's operator list names an operator id that is not in
    /// the operator registry
    UnknownOperator { type_name: String, id: String },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::EmptyParamCode { type_name, role } => {
                write!(f, "Filter type '{}': empty {} param code", type_name, role)
            }
            ConfigError::DuplicateParamCode { type_name, code } => {
                write!(
                    f,
                    "Filter type '{}': param code '{}' used for more than one role",
                    type_name, code
                )
            }
            ConfigError::DuplicateTypeName { type_name } => {
                write!(f, "Filter type '{}' is already registered", type_name)
            }
            ConfigError::AmbiguousToken {
                type_name,
                code,
                other_type,
                other_code,
            } => {
                write!(
                    f,
                    "Filter type '{}' code '{}' produces URL tokens ambiguous with type '{}' code '{}'",
                    type_name, code, other_type, other_code
                )
            }
            ConfigError::UnknownOperator { type_name, id } => {
                write!(
                    f,
                    "Filter type '{}' allows unknown operator '{}'",
                    type_name, id
                )
            }
        }
    }
}

impl std::error::Error for ConfigError {}

/// Errors raised by direct registry lookups
///
/// These never occur during URL decoding, which drops unknown ids
/// instead of erroring.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegistryError {
    /// No operator registered under this id
    UnknownOperator { id: String },

    /// No filter type registered under this name
    UnknownType { name: String },
}

impl fmt::Display for RegistryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RegistryError::UnknownOperator { id } => {
                write!(f, "Unknown operator: {}", id)
            }
            RegistryError::UnknownType { name } => {
                write!(f, "Unknown filter type: {}", name)
            }
        }
    }
}

impl std::error::Error for RegistryError {}
