//! Per-surface data model.
//!
//! The model is a single JSON value addressed by slash-delimited paths.
//! Writes create missing intermediate objects (mkdir-p semantics); reads of
//! missing locations return `None`.
//!
//! Path-less `dataModelUpdate` contents may arrive as a key-value array:
//!
//! ```text
//! [ { "key": "title", "value_string": "My Title" },
//!   { "key": "items", "value_string": "[{\"id\":1}]" } ]
//!   ──► { "title": "My Title", "items": [{ "id": 1 }] }
//! ```
//!
//! String values are parsed as JSON when possible and kept verbatim otherwise.

use crate::path::path_segments;
use serde_json::{Map, Value};
use tracing::{debug, warn};

/// JSON-like data model of one surface.
#[derive(Debug, Clone, PartialEq)]
pub struct DataStore {
    root: Value,
}

impl Default for DataStore {
    fn default() -> Self {
        Self::new()
    }
}

impl DataStore {
    /// Create an empty model (`{}`).
    pub fn new() -> Self {
        Self {
            root: Value::Object(Map::new()),
        }
    }

    /// Create a model holding `root`.
    pub fn from_value(root: Value) -> Self {
        Self { root }
    }

    /// The whole model.
    pub fn root(&self) -> &Value {
        &self.root
    }

    /// Read the value at `path`.
    ///
    /// Objects are traversed by key and arrays by numeric index; any other
    /// step yields `None`.
    pub fn get(&self, path: &str) -> Option<&Value> {
        let mut current = &self.root;
        for segment in path_segments(path) {
            current = match current {
                Value::Object(map) => map.get(segment)?,
                Value::Array(items) => items.get(segment.parse::<usize>().ok()?)?,
                _ => return None,
            };
        }
        Some(current)
    }

    /// Write `value` at `path`, creating intermediate objects as needed.
    ///
    /// Writing to the root path replaces the whole model. Numeric segments
    /// index into existing arrays; writing past the end pads with `null`, up
    /// to [`MAX_ARRAY_GAP`] slots. A write needing more padding is skipped.
    pub fn set(&mut self, path: &str, value: Value) {
        let segments = path_segments(path);
        let Some((last, parents)) = segments.split_last() else {
            self.root = value;
            return;
        };

        let mut current = &mut self.root;
        for segment in parents {
            let Some(next) = descend(current, segment) else {
                warn!("Skipping write to {}: array index {} is out of range", path, segment);
                return;
            };
            current = next;
        }

        match (current, last.parse::<usize>()) {
            (Value::Array(items), Ok(index)) => match array_slot(items, index) {
                Some(slot) => *slot = value,
                None => warn!("Skipping write to {}: array index {} is out of range", path, last),
            },
            (other, _) => {
                ensure_object(other).insert((*last).to_string(), value);
            }
        }
    }

    /// Replace the whole model with the contents of a path-less update.
    ///
    /// A non-empty array of key-value entries is folded into an object first;
    /// any other value is stored as-is.
    pub fn replace_root(&mut self, contents: Value) {
        self.root = match normalize_key_value_array(&contents) {
            Some(folded) => {
                debug!("Folded key-value array into data model root");
                folded
            }
            None => contents,
        };
    }
}

/// Most `null` slots a single write may append to an array.
pub const MAX_ARRAY_GAP: usize = 1024;

/// Step into `segment`, turning scalars and missing slots into objects.
fn descend<'a>(current: &'a mut Value, segment: &str) -> Option<&'a mut Value> {
    let slot = match (current, segment.parse::<usize>()) {
        (Value::Array(items), Ok(index)) => array_slot(items, index)?,
        (other, _) => ensure_object(other)
            .entry(segment.to_string())
            .or_insert(Value::Null),
    };
    if !(slot.is_object() || slot.is_array()) {
        *slot = Value::Object(Map::new());
    }
    Some(slot)
}

fn array_slot(items: &mut Vec<Value>, index: usize) -> Option<&mut Value> {
    if index >= items.len() {
        if index - items.len() > MAX_ARRAY_GAP {
            return None;
        }
        items.resize(index + 1, Value::Null);
    }
    items.get_mut(index)
}

fn ensure_object(value: &mut Value) -> &mut Map<String, Value> {
    if !value.is_object() {
        *value = Value::Object(Map::new());
    }
    match value {
        Value::Object(map) => map,
        _ => unreachable!("non-object values are replaced above"),
    }
}

/// Fold a key-value entry array into an object.
///
/// Returns `None` unless `contents` is a non-empty array whose every element
/// is an entry: an object with a string `key` and one of `value_string` /
/// `valueString` (parsed as JSON when possible), `valueNumber`,
/// `valueBoolean` or `valueMap` (a nested entry array).
pub fn normalize_key_value_array(contents: &Value) -> Option<Value> {
    match contents {
        Value::Array(items) if !items.is_empty() => fold_entries(items),
        _ => None,
    }
}

/// Entry keys are paths, so `user.name` nests as `{ "user": { "name": .. } }`.
fn fold_entries(items: &[Value]) -> Option<Value> {
    let mut folded = DataStore::new();
    for item in items {
        let entry = item.as_object()?;
        let key = entry.get("key")?.as_str()?;
        let value = entry_value(entry)?;
        folded.set(key, value);
    }
    Some(folded.root)
}

fn entry_value(entry: &Map<String, Value>) -> Option<Value> {
    if let Some(raw) = entry.get("value_string").or_else(|| entry.get("valueString")) {
        return raw.as_str().map(parse_json_or_raw);
    }
    if let Some(number) = entry.get("valueNumber") {
        return number.is_number().then(|| number.clone());
    }
    if let Some(flag) = entry.get("valueBoolean") {
        return flag.as_bool().map(Value::Bool);
    }
    match entry.get("valueMap")? {
        Value::Array(nested) => fold_entries(nested),
        _ => None,
    }
}

/// Parse `raw` as JSON, falling back to the raw string.
pub fn parse_json_or_raw(raw: &str) -> Value {
    match serde_json::from_str(raw) {
        Ok(parsed) => parsed,
        Err(err) => {
            let trimmed = raw.trim_start();
            if trimmed.starts_with('{') || trimmed.starts_with('[') {
                warn!(
                    "Failed to parse JSON-looking value, keeping raw string ({}): {:.50}",
                    err, raw
                );
            }
            Value::String(raw.to_string())
        }
    }
}
