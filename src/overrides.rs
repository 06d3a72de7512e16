//! Programmatic overrides as a [`Source`].
//!
//! Each `("database.pool_size", "10")` pair is keyed by its normalized path so
//! it answers the field `["database", "pool", "size"]`, whichever spelling the
//! caller used for the segments.

use std::collections::HashMap;

use crate::fields::Field;
use crate::names;
use crate::source::Source;

/// Dotted-key overrides. If multiple entries target the same key, the last
/// one wins.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MapSource {
    entries: HashMap<String, String>,
}

impl MapSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_pairs<K, V>(pairs: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: AsRef<str>,
        V: Into<String>,
    {
        let mut source = Self::new();
        for (key, value) in pairs {
            source.insert(key.as_ref(), value);
        }
        source
    }

    pub fn insert(&mut self, dotted_key: &str, value: impl Into<String>) {
        self.entries.insert(normalize(dotted_key), value.into());
    }

    /// Keys that match none of `fields`, in no particular order.
    pub fn unknown_keys(&self, fields: &[Field<'_>]) -> Vec<String> {
        self.entries
            .keys()
            .filter(|key| !fields.iter().any(|f| f.flag_name() == key.as_str()))
            .cloned()
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

fn normalize(dotted_key: &str) -> String {
    let segments: Vec<&str> = dotted_key.split('.').collect();
    names::normalize_path(&segments)
}

impl Source for MapSource {
    fn get(&self, key: &[String]) -> Option<String> {
        self.entries.get(&names::flag_name(key)).cloned()
    }

    fn name(&self) -> &str {
        "overrides"
    }
}
