//! Deep merge of option records.
//!
//! Objects merge key-by-key recursively. Everything else (arrays, scalars,
//! null) replaces the target value outright. Sources are only read; values
//! are cloned into the target.

use serde_json::{Map, Value};

// =============================================================================
// Frozen Paths
// =============================================================================

/// Option paths (JSON pointers, e.g. `/physics/overdrag`) that become
/// read-only once the target holds a value there.
///
/// A frozen path also locks everything below it: adding or replacing keys
/// inside a frozen object is rejected the same way.
#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct FrozenPaths<'a>(&'a [String]);

impl<'a> FrozenPaths<'a> {
    pub(crate) fn new(paths: &'a [String]) -> Self {
        Self(paths)
    }

    /// Whether a write at `path` must be dropped.
    ///
    /// `exists` tells whether the target already holds a value at `path`.
    fn locks(&self, path: &str, exists: bool) -> bool {
        self.0.iter().any(|frozen| {
            if path == frozen {
                exists
            } else {
                path.strip_prefix(frozen.as_str())
                    .is_some_and(|rest| rest.starts_with('/'))
            }
        })
    }
}

// =============================================================================
// Merge
// =============================================================================

/// Merge `source` into `target`, honoring frozen paths.
pub(crate) fn merge_into(
    target: &mut Map<String, Value>,
    source: &Map<String, Value>,
    frozen: FrozenPaths<'_>,
) {
    let mut path = String::new();
    merge_at(target, source, frozen, &mut path);
}

fn merge_at(
    target: &mut Map<String, Value>,
    source: &Map<String, Value>,
    frozen: FrozenPaths<'_>,
    path: &mut String,
) {
    for (key, incoming) in source {
        let depth = path.len();
        path.push('/');
        push_escaped(path, key);

        if frozen.locks(path, target.contains_key(key)) {
            tracing::warn!(path = %path, "ignoring write to frozen option");
        } else {
            match (target.get_mut(key), incoming) {
                (Some(Value::Object(existing)), Value::Object(incoming)) => {
                    merge_at(existing, incoming, frozen, path);
                }
                _ => {
                    target.insert(key.clone(), incoming.clone());
                }
            }
        }

        path.truncate(depth);
    }
}

/// Append `key` to a JSON pointer, escaping `~` and `/`.
fn push_escaped(path: &mut String, key: &str) {
    for ch in key.chars() {
        match ch {
            '~' => path.push_str("~0"),
            '/' => path.push_str("~1"),
            _ => path.push(ch),
        }
    }
}
