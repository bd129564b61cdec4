//! Attributes of NWB nodes.
//!
//! Attributes are stored as ordered key-value pairs of strings and carry
//! the descriptive part of a node (description, namespace, comments, ...).

use smallvec::SmallVec;
use std::fmt;

/// Attribute storage - key-value pairs of strings.
///
/// Uses SmallVec optimization for common case of few entries.
#[derive(Clone, Default, PartialEq)]
pub struct Attributes {
    entries: SmallVec<[(String, String); 4]>,
}

impl Attributes {
    /// Create empty attributes.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set an attribute value, replacing an existing one in place.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let value = value.into();

        for (k, v) in &mut self.entries {
            if k == &key {
                *v = value;
                return;
            }
        }
        self.entries.push((key, value));
    }

    /// Get an attribute value by key.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Get the number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate over key-value pairs in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    // === Common attribute keys ===

    /// Free-text description key.
    pub const DESCRIPTION_KEY: &'static str = "description";

    /// Namespace of the declared type (e.g. "core").
    pub const NAMESPACE_KEY: &'static str = "namespace";

    /// Free-text comments key.
    pub const COMMENTS_KEY: &'static str = "comments";

    /// Get description.
    pub fn description(&self) -> Option<&str> {
        self.get(Self::DESCRIPTION_KEY)
    }

    /// Get namespace.
    pub fn namespace(&self) -> Option<&str> {
        self.get(Self::NAMESPACE_KEY)
    }

    /// Get comments.
    pub fn comments(&self) -> Option<&str> {
        self.get(Self::COMMENTS_KEY)
    }
}

impl fmt::Debug for Attributes {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map()
            .entries(self.entries.iter().map(|(k, v)| (k, v)))
            .finish()
    }
}
