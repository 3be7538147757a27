//! Named-parameter URL model
//!
//! Filter state travels in path-segment named parameters of the form
//! `key:value`, e.g. `/posts/page:2/Ff0:Post.title`. This module owns
//! parsing and rebuilding of that shape; the surrounding request layer
//! is responsible for raw HTTP and segment escaping.

use indexmap::IndexMap;
use std::fmt;

/// A URL split into plain path segments and ordered named parameters
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NamedUrl {
    base: Vec<String>,
    params: IndexMap<String, String>,
}

impl NamedUrl {
    /// Parse a path string.
    ///
    /// Segments containing `:` become named parameters (split on the
    /// first `:`, so values may themselves contain colons); all other
    /// segments form the base path. A repeated key keeps the last value.
    pub fn parse(path: &str) -> Self {
        let mut url = Self::default();
        for segment in path.split('/').filter(|s| !s.is_empty()) {
            match segment.split_once(':') {
                Some((key, value)) => {
                    url.params.insert(key.to_string(), value.to_string());
                }
                None => url.base.push(segment.to_string()),
            }
        }
        url
    }

    /// The plain path segments
    pub fn base(&self) -> &[String] {
        &self.base
    }

    /// Named parameters in order
    pub fn params(&self) -> impl Iterator<Item = (&str, &str)> {
        self.params.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Value of one named parameter
    pub fn get(&self, key: &str) -> Option<&str> {
        self.params.get(key).map(String::as_str)
    }

    /// Set a named parameter (appended if new, updated in place if not)
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.params.insert(key.into(), value.into());
    }

    /// Remove a named parameter, preserving the order of the rest
    pub fn remove(&mut self, key: &str) -> Option<String> {
        self.params.shift_remove(key)
    }

    /// Rename a named parameter in place, keeping its position.
    ///
    /// Returns false if `old` is absent; an existing `new` key is
    /// overwritten.
    pub fn rename(&mut self, old: &str, new: impl Into<String>) -> bool {
        let new = new.into();
        let Some(mut position) = self.params.get_index_of(old) else {
            return false;
        };
        let Some((_, value)) = self.params.shift_remove_index(position) else {
            return false;
        };
        if let Some(existing) = self.params.get_index_of(&new) {
            self.params.shift_remove_index(existing);
            if existing < position {
                position -= 1;
            }
        }
        self.params.shift_insert(position, new, value);
        true
    }

    /// Keep only the named parameters matching the predicate
    pub fn retain(&mut self, mut keep: impl FnMut(&str, &str) -> bool) {
        self.params.retain(|k, v| keep(k, v));
    }

    /// Number of named parameters
    pub fn param_count(&self) -> usize {
        self.params.len()
    }
}

impl fmt::Display for NamedUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.base.is_empty() && self.params.is_empty() {
            return write!(f, "/");
        }
        for segment in &self.base {
            write!(f, "/{}", segment)?;
        }
        for (key, value) in &self.params {
            write!(f, "/{}:{}", key, value)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_mixed_segments() {
        let url = NamedUrl::parse("/posts/index/page:2/sort:title");
        assert_eq!(url.base(), &["posts".to_string(), "index".to_string()]);
        assert_eq!(url.get("page"), Some("2"));
        assert_eq!(url.get("sort"), Some("title"));
        assert_eq!(url.param_count(), 2);
    }

    #[test]
    fn test_display_round_trip() {
        let original = "/posts/page:2/Ff0:Post.title";
        let url = NamedUrl::parse(original);
        assert_eq!(url.to_string(), original);
    }

    #[test]
    fn test_value_with_colon() {
        let url = NamedUrl::parse("/posts/Fv0:10:30");
        assert_eq!(url.get("Fv0"), Some("10:30"));
    }

    #[test]
    fn test_empty_and_root() {
        assert_eq!(NamedUrl::parse("").to_string(), "/");
        assert_eq!(NamedUrl::parse("/").to_string(), "/");
        assert_eq!(NamedUrl::parse("/posts").to_string(), "/posts");
    }

    #[test]
    fn test_colon_in_leading_segment_is_a_param() {
        // No segment with a colon ever lands in the base, so Display
        // output always reads back identically
        let url = NamedUrl::parse("/a:b/posts");
        assert_eq!(url.base(), &["posts".to_string()]);
        assert_eq!(url.get("a"), Some("b"));
        assert_eq!(NamedUrl::parse(&url.to_string()), url);
    }

    #[test]
    fn test_remove_preserves_order() {
        let mut url = NamedUrl::parse("/a:1/b:2/c:3");
        url.remove("b");
        let keys: Vec<&str> = url.params().map(|(k, _)| k).collect();
        assert_eq!(keys, vec!["a", "c"]);
    }

    #[test]
    fn test_retain() {
        let mut url = NamedUrl::parse("/posts/page:2/sort:title/Ff0:x");
        url.retain(|k, _| k != "page");
        assert_eq!(url.to_string(), "/posts/sort:title/Ff0:x");
    }

    #[test]
    fn test_rename_keeps_position() {
        let mut url = NamedUrl::parse("/a:1/b:2/c:3");
        assert!(url.rename("b", "x"));
        assert_eq!(url.to_string(), "/a:1/x:2/c:3");
        assert!(!url.rename("missing", "y"));
    }

    #[test]
    fn test_rename_overwrites_existing_target() {
        let mut url = NamedUrl::parse("/a:1/b:2/c:3");
        assert!(url.rename("c", "a"));
        assert_eq!(url.to_string(), "/b:2/a:3");
    }

    #[test]
    fn test_set_updates_in_place() {
        let mut url = NamedUrl::parse("/a:1/b:2");
        url.set("a", "9");
        assert_eq!(url.to_string(), "/a:9/b:2");
    }
}
