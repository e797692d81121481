//! Option Resolver - Layered, deeply merged component options.
//!
//! Construction input comes in three shapes:
//! - nothing: class defaults only
//! - a string: the name of a class preset
//! - an override object, optionally carrying a `$preset` field
//!
//! The result is always built into a fresh record by layering, lowest
//! precedence first:
//!
//! ```text
//! class defaults → named preset → caller overrides
//! ```
//!
//! # Example
//!
//! ```rust
//! use serde_json::json;
//! use spark_components::options::{resolve, Options, Presets};
//!
//! let defaults = Options::from_value(json!({ "a": 1, "b": { "x": 1 } }));
//! let presets = Presets::from_value(json!({ "p": { "b": { "x": 2 } } }));
//!
//! let options = resolve(&defaults, &presets, "p").unwrap();
//! assert_eq!(options.into_value(), json!({ "a": 1, "b": { "x": 2 } }));
//! ```

mod merge;
mod presets;

pub use presets::Presets;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{ComponentError, Result};
use merge::{merge_into, FrozenPaths};

/// Field of an override object that selects a preset.
pub const PRESET_FIELD: &str = "$preset";

// =============================================================================
// Options
// =============================================================================

/// A resolved (or partial) option record.
///
/// JSON-shaped so class defaults and presets can be written with
/// `serde_json::json!` and read back into typed structs.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Options(Map<String, Value>);

impl Options {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wrap a JSON value. Non-object values yield empty options.
    pub fn from_value(value: Value) -> Self {
        match value {
            Value::Object(map) => Self(map),
            _ => Self::default(),
        }
    }

    /// Serialize a typed record into options.
    pub fn from_serialize<T: Serialize>(value: &T) -> serde_json::Result<Self> {
        serde_json::to_value(value).map(Self::from_value)
    }

    /// Top-level value.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// Top-level value converted to `T`. `None` if missing or mistyped.
    pub fn get_as<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        self.0
            .get(key)
            .and_then(|value| T::deserialize(value).ok())
    }

    /// Nested value addressed by a JSON pointer (`/b/x`).
    pub fn pointer(&self, pointer: &str) -> Option<&Value> {
        let (head, rest) = split_pointer(pointer)?;
        let value = self.0.get(&head)?;
        if rest.is_empty() {
            Some(value)
        } else {
            value.pointer(rest)
        }
    }

    /// Mutable nested value addressed by a JSON pointer.
    pub fn pointer_mut(&mut self, pointer: &str) -> Option<&mut Value> {
        let (head, rest) = split_pointer(pointer)?;
        let value = self.0.get_mut(&head)?;
        if rest.is_empty() {
            Some(value)
        } else {
            value.pointer_mut(rest)
        }
    }

    pub fn insert(&mut self, key: impl Into<String>, value: Value) -> Option<Value> {
        self.0.insert(key.into(), value)
    }

    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.0.remove(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Convert the whole record into a typed struct.
    pub fn deserialize<T: DeserializeOwned>(&self) -> serde_json::Result<T> {
        T::deserialize(&Value::Object(self.0.clone()))
    }

    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }

    pub fn into_map(self) -> Map<String, Value> {
        self.0
    }

    pub fn into_value(self) -> Value {
        Value::Object(self.0)
    }
}

impl From<Map<String, Value>> for Options {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

impl From<Options> for Value {
    fn from(options: Options) -> Self {
        options.into_value()
    }
}

/// Split `/head/rest...` into the unescaped head key and the remaining pointer.
fn split_pointer(pointer: &str) -> Option<(String, &str)> {
    let body = pointer.strip_prefix('/')?;
    let (head, rest) = match body.find('/') {
        Some(at) => (&body[..at], &body[at..]),
        None => (body, ""),
    };
    Some((head.replace("~1", "/").replace("~0", "~"), rest))
}

// =============================================================================
// OptionsInput
// =============================================================================

/// Raw construction input before resolution.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum OptionsInput {
    /// Class defaults only.
    #[default]
    Defaults,
    /// A preset name.
    Preset(String),
    /// Literal overrides, possibly carrying a `$preset` field.
    Overrides(Map<String, Value>),
}

impl From<()> for OptionsInput {
    fn from(_: ()) -> Self {
        Self::Defaults
    }
}

impl From<&str> for OptionsInput {
    fn from(name: &str) -> Self {
        Self::Preset(name.to_string())
    }
}

impl From<String> for OptionsInput {
    fn from(name: String) -> Self {
        Self::Preset(name)
    }
}

impl From<Map<String, Value>> for OptionsInput {
    fn from(map: Map<String, Value>) -> Self {
        Self::Overrides(map)
    }
}

impl From<Options> for OptionsInput {
    fn from(options: Options) -> Self {
        Self::Overrides(options.into_map())
    }
}

/// Objects are overrides, strings are preset names, anything else means defaults.
impl From<Value> for OptionsInput {
    fn from(value: Value) -> Self {
        match value {
            Value::Object(map) => Self::Overrides(map),
            Value::String(name) => Self::Preset(name),
            Value::Null => Self::Defaults,
            other => {
                tracing::debug!(input = %other, "ignoring non-object options input");
                Self::Defaults
            }
        }
    }
}

impl<T: Into<OptionsInput>> From<Option<T>> for OptionsInput {
    fn from(input: Option<T>) -> Self {
        input.map_or(Self::Defaults, Into::into)
    }
}

// =============================================================================
// OptionSchema
// =============================================================================

/// Class-level option declaration: defaults, presets and frozen paths.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OptionSchema {
    defaults: Options,
    presets: Presets,
    frozen: Vec<String>,
}

impl OptionSchema {
    pub fn new(defaults: Options, presets: Presets) -> Self {
        Self {
            defaults,
            presets,
            frozen: Vec::new(),
        }
    }

    /// Mark option paths (JSON pointers) as read-only once set.
    pub fn with_frozen<I, S>(mut self, paths: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.frozen.extend(paths.into_iter().map(Into::into));
        self
    }

    pub fn defaults(&self) -> &Options {
        &self.defaults
    }

    pub fn presets(&self) -> &Presets {
        &self.presets
    }

    pub fn frozen(&self) -> &[String] {
        &self.frozen
    }

    /// Resolve construction input against this schema.
    pub fn resolve(&self, input: impl Into<OptionsInput>) -> Result<Options> {
        resolve_layers(
            &self.defaults,
            &self.presets,
            FrozenPaths::new(&self.frozen),
            input.into(),
        )
    }
}

// =============================================================================
// Resolution
// =============================================================================

/// Resolve construction input: defaults, then preset, then overrides.
///
/// Errors with [`ComponentError::UnknownPreset`] when a named preset is not
/// in `presets`. An empty preset name selects no preset.
pub fn resolve(
    defaults: &Options,
    presets: &Presets,
    input: impl Into<OptionsInput>,
) -> Result<Options> {
    resolve_layers(defaults, presets, FrozenPaths::default(), input.into())
}

fn resolve_layers(
    defaults: &Options,
    presets: &Presets,
    frozen: FrozenPaths<'_>,
    input: OptionsInput,
) -> Result<Options> {
    let (preset_name, overrides) = match input {
        OptionsInput::Defaults => (None, None),
        OptionsInput::Preset(name) => (Some(name), None),
        OptionsInput::Overrides(mut map) => {
            let name = match map.remove(PRESET_FIELD) {
                None | Some(Value::Null) => None,
                Some(Value::String(name)) => Some(name),
                Some(_) => return Err(ComponentError::InvalidPresetField),
            };
            (name, Some(map))
        }
    };

    let preset = match preset_name.filter(|name| !name.is_empty()) {
        Some(name) => match presets.get(&name) {
            Some(preset) => Some(preset),
            None => return Err(ComponentError::UnknownPreset { preset: name }),
        },
        None => None,
    };

    let mut target = Map::new();
    merge_into(&mut target, defaults.as_map(), frozen);
    if let Some(preset) = preset {
        merge_into(&mut target, preset.as_map(), frozen);
    }
    if let Some(overrides) = &overrides {
        merge_into(&mut target, overrides, frozen);
    }

    Ok(Options(target))
}
