//! Named preset tables.
//!
//! A preset is a partial option record that callers select by name at
//! construction time, either as the whole input (`"wide"`) or through the
//! embedded `$preset` field of an override object.

use std::collections::BTreeMap;

use serde_json::Value;

use super::Options;

/// Name -> partial options table declared by a component class.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Presets(BTreeMap<String, Options>);

impl Presets {
    /// Empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a table from a JSON object of objects.
    ///
    /// ```rust
    /// use serde_json::json;
    /// use spark_components::Presets;
    ///
    /// let presets = Presets::from_value(json!({
    ///     "wide": { "perScreen": 4 },
    ///     "compact": { "perScreen": 1 },
    /// }));
    /// assert_eq!(presets.names(), vec!["compact", "wide"]);
    /// ```
    ///
    /// Entries whose value is not an object become empty presets.
    pub fn from_value(value: Value) -> Self {
        let Value::Object(entries) = value else {
            return Self::default();
        };
        Self(
            entries
                .into_iter()
                .map(|(name, options)| (name, Options::from_value(options)))
                .collect(),
        )
    }

    /// Builder-style insert.
    pub fn with(mut self, name: impl Into<String>, options: impl Into<Options>) -> Self {
        self.insert(name, options);
        self
    }

    /// Add or replace a preset.
    pub fn insert(&mut self, name: impl Into<String>, options: impl Into<Options>) -> Option<Options> {
        self.0.insert(name.into(), options.into())
    }

    /// Look up a preset by exact name.
    pub fn get(&self, name: &str) -> Option<&Options> {
        self.0.get(name)
    }

    /// Check if a preset exists.
    pub fn contains(&self, name: &str) -> bool {
        self.0.contains_key(name)
    }

    /// All preset names, sorted.
    pub fn names(&self) -> Vec<&str> {
        self.0.keys().map(String::as_str).collect()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Options)> {
        self.0.iter().map(|(name, options)| (name.as_str(), options))
    }
}
