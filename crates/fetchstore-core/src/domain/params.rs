//! Request parameters and their canonical tracking key.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::errors::InvariantError;

/// A key/value parameter mapping, used both as the control's input and as
/// the in-flight tracking key.
///
/// Construction rejects anything that is not a JSON object, so every
/// `Params` that reaches a control, reducer or selector is object-like.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Params(Map<String, Value>);

impl Params {
    /// The empty parameter set, the default when a slice has no
    /// `args_to_params`.
    pub fn empty() -> Self {
        Self(Map::new())
    }

    pub fn from_value(value: Value) -> Result<Self, InvariantError> {
        match value {
            Value::Object(map) => Ok(Self(map)),
            _ => Err(InvariantError::NonObjectParams),
        }
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn to_value(&self) -> Value {
        Value::Object(self.0.clone())
    }

    /// The canonical tracking key for this parameter set.
    ///
    /// Object keys are sorted recursively at every nesting level before
    /// serializing, so two logically-equal sets produce the same key
    /// regardless of insertion order. Array element order is meaningful
    /// and preserved.
    pub fn key(&self) -> ParamsKey {
        let canonical = canonicalize(&Value::Object(self.0.clone()));
        // Serializing a plain Value cannot fail.
        ParamsKey(serde_json::to_string(&canonical).unwrap_or_default())
    }
}

fn canonicalize(value: &Value) -> Value {
    match value {
        Value::Object(map) => {
            let mut entries: Vec<(&String, &Value)> = map.iter().collect();
            entries.sort_by(|a, b| a.0.cmp(b.0));
            let mut sorted = Map::new();
            for (key, value) in entries {
                sorted.insert(key.clone(), canonicalize(value));
            }
            Value::Object(sorted)
        }
        Value::Array(items) => Value::Array(items.iter().map(canonicalize).collect()),
        other => other.clone(),
    }
}

/// Canonical serialized form of a `Params`, the key of the in-flight flag
/// map.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ParamsKey(String);

impl ParamsKey {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ParamsKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}
