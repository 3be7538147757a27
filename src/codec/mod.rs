//! Filter parameter codec
//!
//! Three transforms make filter state URL-addressable:
//!
//! - [`encode`]: posted form data + current URL -> canonical URL with
//!   compacted, gap-free filter tokens
//! - [`decode`]: URL named parameters -> raw [`FilterSet`]
//! - [`validate`]: raw filter set -> entries safe to hand to the
//!   condition builder
//!
//! None of these can fail. A tampered or stale URL must never break the
//! listing, so anything malformed is dropped (with a debug log) and
//! processing continues.

pub mod links;

use crate::core::entry::{DropReason, FilterEntry, FilterSet};
use crate::core::posted::PostedFilters;
use crate::core::url::NamedUrl;
use crate::core::OperatorRegistry;
use crate::registry::{ParamRole, TypeRegistry};
use crate::schema::SchemaProvider;
use std::collections::HashSet;
use tracing::debug;

/// Pagination parameter stripped when re-encoding filter state
pub const PAGE_PARAM: &str = "page";

/// Directive parameter requesting one new blank entry for a type.
///
/// Encoded as `add_filter:<type>` when a single type adds; when several
/// types carry the ADD marker in one post the keys are
/// `add_filter.<type>` so the parameter map stays single-valued. The
/// concrete index is only assigned on the next decode, once existing
/// entries are known.
pub const ADD_FILTER_PARAM: &str = "add_filter";

/// An entry dropped during validation, for callers that want to know
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RejectedEntry {
    pub type_name: String,
    pub index: u32,
    pub reason: DropReason,
}

/// Turn posted filter data into the canonical URL representation.
///
/// Pagination, stale filter tokens and stale add directives are
/// stripped from `current_url`; unrelated named parameters survive.
/// Posted entries are re-indexed per type to `0..n` in their posted
/// order: removed entries and entries with fewer than three non-empty
/// params leave no gap.
pub fn encode(
    posted: &PostedFilters,
    current_url: &NamedUrl,
    registry: &TypeRegistry,
) -> NamedUrl {
    let mut url = current_url.clone();
    url.retain(|key, _| {
        key != PAGE_PARAM && !is_add_directive(key) && !registry.is_filter_token(key)
    });

    let mut adds: Vec<&str> = Vec::new();

    for (type_name, posted_type) in posted.iter() {
        let Ok(config) = registry.get(type_name) else {
            debug!(type_name, "posted filter type not registered, skipped");
            continue;
        };

        let mut out_index: u32 = 0;
        for (index, entry) in &posted_type.entries {
            if entry.remove {
                continue;
            }
            let field = non_empty(entry.values.get(&config.codes.field));
            let operator = non_empty(entry.values.get(&config.codes.operator));
            let value = non_empty(entry.values.get(&config.codes.value));
            let (Some(field), Some(operator), Some(value)) = (field, operator, value) else {
                debug!(type_name, index, "partial filter entry not encoded");
                continue;
            };

            for (role, value) in [
                (ParamRole::Field, field),
                (ParamRole::Operator, operator),
                (ParamRole::Value, value),
            ] {
                // The type was just resolved, so token building cannot fail
                if let Ok(token) = registry.token(type_name, role, out_index) {
                    url.set(token, value);
                }
            }
            out_index += 1;
        }

        if posted_type.add {
            adds.push(type_name);
        }
    }

    if let [single] = adds.as_slice() {
        url.set(ADD_FILTER_PARAM, *single);
    } else {
        for type_name in adds {
            url.set(format!("{}.{}", ADD_FILTER_PARAM, type_name), "1");
        }
    }

    url
}

/// Parse the filter tokens of a URL into a raw filter set.
///
/// Every named parameter is matched against the anchored token matchers
/// of each registered type only, so a code registered for one type can
/// never populate another. Unmatched parameters are ignored. An add
/// directive appends one blank entry after the type's highest index.
/// No field or operator validation happens here.
pub fn decode(url: &NamedUrl, registry: &TypeRegistry) -> FilterSet {
    let mut set = FilterSet::new();
    let mut granted: HashSet<&str> = HashSet::new();

    for (key, value) in url.params() {
        let Some(m) = registry.match_token(key) else {
            continue;
        };
        let entry = set.entry_mut(m.type_name, m.index);
        let slot = match m.role {
            ParamRole::Field => &mut entry.field,
            ParamRole::Operator => &mut entry.operator,
            ParamRole::Value => &mut entry.value,
        };
        *slot = Some(value.to_string());
    }

    for (key, value) in url.params() {
        let type_name = match key.strip_prefix(ADD_FILTER_PARAM) {
            Some("") => value,
            Some(rest) => match rest.strip_prefix('.') {
                Some(name) => name,
                None => continue,
            },
            None => continue,
        };
        if !registry.contains(type_name) {
            debug!(type_name, "add directive for unregistered type ignored");
            continue;
        }
        // A hand-edited URL can carry both directive shapes for the
        // same type; one blank row per type is enough
        if !granted.insert(type_name) {
            continue;
        }
        let next = set.max_index(type_name).map_or(0, |max| max + 1);
        set.entry_mut(type_name, next);
    }

    set
}

/// Check a raw filter set against the registries and schema.
///
/// Returns the entries safe to build conditions from, in type then
/// index order, plus the dropped ones with their reasons. Fully blank
/// entries (the placeholder an add directive creates) are neither —
/// they exist only so the form renders an empty row.
pub fn validate(
    set: &FilterSet,
    registry: &TypeRegistry,
    operators: &OperatorRegistry,
    schema: &dyn SchemaProvider,
) -> (Vec<FilterEntry>, Vec<RejectedEntry>) {
    let mut valid = Vec::new();
    let mut rejected = Vec::new();

    for type_name in set.type_names() {
        let Ok(fields) = registry.resolve_field_options(type_name, schema) else {
            // Decode only produces registered types; nothing to do
            continue;
        };

        for (index, raw) in set.entries(type_name) {
            if raw.is_blank() {
                continue;
            }

            let mut reject = |reason: DropReason| {
                debug!(type_name, index, ?reason, "filter entry dropped");
                rejected.push(RejectedEntry {
                    type_name: type_name.to_string(),
                    index,
                    reason,
                });
            };

            if !raw.is_complete() {
                reject(DropReason::Incomplete);
                continue;
            }
            let field = raw.field.clone().unwrap_or_default();
            let operator = raw.operator.clone().unwrap_or_default();
            let value = raw.value.clone().unwrap_or_default();

            if !fields.contains_key(&field) {
                reject(DropReason::UnknownField);
                continue;
            }
            if !registry.operator_allowed(type_name, &operator, operators) {
                reject(DropReason::DisallowedOperator);
                continue;
            }

            valid.push(FilterEntry {
                type_name: type_name.to_string(),
                index,
                field,
                operator,
                value,
            });
        }
    }

    (valid, rejected)
}

fn is_add_directive(key: &str) -> bool {
    key == ADD_FILTER_PARAM
        || key
            .strip_prefix(ADD_FILTER_PARAM)
            .is_some_and(|rest| rest.starts_with('.'))
}

fn non_empty(value: Option<&String>) -> Option<&str> {
    value.map(String::as_str).filter(|s| !s.is_empty())
}
