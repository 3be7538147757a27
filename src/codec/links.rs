//! URL rewrite rules for "remove this filter" and "add another" links
//!
//! Listing pages render per-entry remove links and an add link without
//! going through a form post. These helpers produce the token-level
//! rewrite rules for a single entry, so the view layer can derive the
//! target URL straight from the current one.

use crate::core::error::RegistryError;
use crate::core::url::NamedUrl;
use crate::registry::{ParamRole, TypeRegistry};

/// Token-level URL rewrite: keys to drop, then keys to rename
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TokenRewrite {
    pub drop: Vec<String>,
    pub rename: Vec<(String, String)>,
}

impl TokenRewrite {
    /// Apply the rules to a URL. Missing keys are skipped.
    pub fn apply_to(&self, url: &mut NamedUrl) {
        for key in &self.drop {
            url.remove(key);
        }
        for (old, new) in &self.rename {
            url.rename(old, new.clone());
        }
    }
}

/// Rewrite rules that remove one entry and renumber the rest.
///
/// Drops the three tokens at `index_to_remove` and shifts every later
/// index down by one, up to and including `max_index`, so the remaining
/// entries stay contiguous from 0.
pub fn removal_rewrite(
    registry: &TypeRegistry,
    type_name: &str,
    index_to_remove: u32,
    max_index: u32,
) -> Result<TokenRewrite, RegistryError> {
    let mut rewrite = TokenRewrite::default();
    for role in ParamRole::ALL {
        rewrite
            .drop
            .push(registry.token(type_name, role, index_to_remove)?);
    }
    for index in (index_to_remove + 1)..=max_index {
        for role in ParamRole::ALL {
            rewrite.rename.push((
                registry.token(type_name, role, index)?,
                registry.token(type_name, role, index - 1)?,
            ));
        }
    }
    Ok(rewrite)
}

/// Three empty-valued placeholder tokens extending a URL with a brand
/// new entry at `next_index`
pub fn addition_tokens(
    registry: &TypeRegistry,
    type_name: &str,
    next_index: u32,
) -> Result<Vec<(String, String)>, RegistryError> {
    let mut tokens = Vec::with_capacity(3);
    for role in ParamRole::ALL {
        tokens.push((registry.token(type_name, role, next_index)?, String::new()));
    }
    Ok(tokens)
}
