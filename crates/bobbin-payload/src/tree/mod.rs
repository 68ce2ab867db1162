//! Nested key-path container underlying every payload.
//!
//! A [`PayloadTree`] is a mapping addressed by ordered path segments. Paths are
//! written either as `/`-separated strings (`"command/name"`) or as segment
//! slices (`&["data", service, version, action]`); the slice form is used when
//! a segment comes from user data and may itself contain a `/`.
//!
//! Reads never fail: a missing segment, or a segment that lands on something
//! other than a mapping, yields `None`. Writes create intermediate mappings
//! and replace any non-mapping value in the way. Every segment passes through
//! the tree's [`FieldNames`] mode on both paths.

use serde_json::{Map, Value};

use crate::error::PayloadError;
use crate::kind::ValueKind;
use crate::names::FieldNames;

/// Separator between segments in string paths.
pub const PATH_SEPARATOR: char = '/';

/// Generic nested payload with path-based access.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PayloadTree {
    root: Map<String, Value>,
    names: FieldNames,
}

impl PayloadTree {
    /// Creates an empty tree using the given naming mode.
    #[must_use]
    pub fn new(names: FieldNames) -> Self {
        Self {
            root: Map::new(),
            names,
        }
    }

    /// Wraps an existing value, which must be a mapping.
    ///
    /// # Errors
    ///
    /// Returns [`PayloadError::NotAMapping`] for any other kind of value.
    pub fn from_value(value: Value, names: FieldNames) -> Result<Self, PayloadError> {
        match value {
            Value::Object(root) => Ok(Self { root, names }),
            other => Err(PayloadError::NotAMapping {
                found: ValueKind::of(&other),
            }),
        }
    }

    /// Naming mode of this tree.
    #[must_use]
    pub const fn names(&self) -> FieldNames {
        self.names
    }

    /// Borrows the root mapping.
    #[must_use]
    pub const fn as_map(&self) -> &Map<String, Value> {
        &self.root
    }

    /// Clones the tree into a plain value.
    #[must_use]
    pub fn to_value(&self) -> Value {
        Value::Object(self.root.clone())
    }

    /// Consumes the tree into a plain value.
    #[must_use]
    pub fn into_value(self) -> Value {
        Value::Object(self.root)
    }

    /// Returns `true` when the tree holds no keys.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.root.is_empty()
    }

    /// Looks up a `/`-separated path.
    #[must_use]
    pub fn get(&self, path: &str) -> Option<&Value> {
        self.get_in(&split_path(path))
    }

    /// Looks up a path given as segments.
    #[must_use]
    pub fn get_in(&self, path: &[&str]) -> Option<&Value> {
        let (last, parents) = path.split_last()?;
        let mut current = &self.root;
        for segment in parents {
            current = current.get(self.names.key(segment))?.as_object()?;
        }
        current.get(self.names.key(last))
    }

    /// Looks up a path, falling back to `default` when it is missing.
    #[must_use]
    pub fn get_or<'a>(&'a self, path: &str, default: &'a Value) -> &'a Value {
        self.get(path).unwrap_or(default)
    }

    /// Returns `true` when the path resolves, including to an explicit null.
    #[must_use]
    pub fn exists(&self, path: &str) -> bool {
        self.get(path).is_some()
    }

    /// String value at a path.
    #[must_use]
    pub fn get_str(&self, path: &str) -> Option<&str> {
        self.get(path).and_then(Value::as_str)
    }

    /// Integer value at a path.
    #[must_use]
    pub fn get_i64(&self, path: &str) -> Option<i64> {
        self.get(path).and_then(Value::as_i64)
    }

    /// Sequence at a path.
    #[must_use]
    pub fn get_array(&self, path: &str) -> Option<&Vec<Value>> {
        self.get(path).and_then(Value::as_array)
    }

    /// Mapping at a path.
    #[must_use]
    pub fn get_object(&self, path: &str) -> Option<&Map<String, Value>> {
        self.get(path).and_then(Value::as_object)
    }

    /// Writes a value at a `/`-separated path.
    pub fn set(&mut self, path: &str, value: Value) {
        self.set_in(&split_path(path), value);
    }

    /// Writes a value at a segment path, creating intermediate mappings.
    ///
    /// An empty path is ignored; the root is always a mapping.
    pub fn set_in(&mut self, path: &[&str], value: Value) {
        let names = self.names;
        let Some((last, parents)) = path.split_last() else {
            return;
        };
        if let Some(parent) = nest(&mut self.root, parents, names) {
            parent.insert(names.key(last).to_owned(), value);
        }
    }

    /// Unions a value into the tree at a `/`-separated path.
    pub fn merge(&mut self, path: &str, value: Value) {
        self.merge_in(&split_path(path), value);
    }

    /// Unions a value into the tree at a segment path.
    ///
    /// Mappings merge key by key; every other value replaces what was there.
    /// Merging a mapping at the empty path merges into the root.
    pub fn merge_in(&mut self, path: &[&str], value: Value) {
        let names = self.names;
        let Some((last, parents)) = path.split_last() else {
            if let Value::Object(incoming) = value {
                merge_maps(&mut self.root, incoming);
            }
            return;
        };
        let Some(parent) = nest(&mut self.root, parents, names) else {
            return;
        };
        let key = names.key(last).to_owned();
        match parent.get_mut(&key) {
            Some(existing) => merge_values(existing, value),
            None => {
                parent.insert(key, value);
            }
        }
    }

    /// Appends to the sequence at a `/`-separated path.
    pub fn push(&mut self, path: &str, value: Value) {
        self.push_in(&split_path(path), value);
    }

    /// Appends to the sequence at a segment path.
    ///
    /// A missing slot, or one holding something other than a sequence, is
    /// replaced by a new sequence first.
    pub fn push_in(&mut self, path: &[&str], value: Value) {
        let names = self.names;
        let Some((last, parents)) = path.split_last() else {
            return;
        };
        let Some(parent) = nest(&mut self.root, parents, names) else {
            return;
        };
        let slot = parent
            .entry(names.key(last).to_owned())
            .or_insert_with(|| Value::Array(Vec::new()));
        if !slot.is_array() {
            *slot = Value::Array(Vec::new());
        }
        if let Some(items) = slot.as_array_mut() {
            items.push(value);
        }
    }

    /// Removes and returns the value at a `/`-separated path.
    pub fn delete(&mut self, path: &str) -> Option<Value> {
        self.delete_in(&split_path(path))
    }

    /// Removes and returns the value at a segment path.
    pub fn delete_in(&mut self, path: &[&str]) -> Option<Value> {
        let names = self.names;
        let (last, parents) = path.split_last()?;
        let mut current = &mut self.root;
        for segment in parents {
            current = current.get_mut(names.key(segment))?.as_object_mut()?;
        }
        current.remove(names.key(last))
    }
}

/// Splits a string path into segments, ignoring empty segments.
#[must_use]
pub fn split_path(path: &str) -> Vec<&str> {
    path.split(PATH_SEPARATOR)
        .filter(|segment| !segment.is_empty())
        .collect()
}

fn nest<'a>(
    root: &'a mut Map<String, Value>,
    path: &[&str],
    names: FieldNames,
) -> Option<&'a mut Map<String, Value>> {
    let mut current = root;
    for segment in path {
        let slot = current
            .entry(names.key(segment).to_owned())
            .or_insert_with(|| Value::Object(Map::new()));
        if !slot.is_object() {
            *slot = Value::Object(Map::new());
        }
        current = slot.as_object_mut()?;
    }
    Some(current)
}

fn merge_maps(target: &mut Map<String, Value>, incoming: Map<String, Value>) {
    for (key, value) in incoming {
        match target.get_mut(&key) {
            Some(existing) => merge_values(existing, value),
            None => {
                target.insert(key, value);
            }
        }
    }
}

fn merge_values(target: &mut Value, incoming: Value) {
    match (target, incoming) {
        (Value::Object(existing), Value::Object(map)) => merge_maps(existing, map),
        (slot, other) => *slot = other,
    }
}
