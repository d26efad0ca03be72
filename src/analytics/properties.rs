//! Builder for tracking custom data and ready summaries.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Ordered bag of JSON values.
///
/// ```
/// use fragment_host::analytics::Properties;
///
/// let props = Properties::new()
///     .insert("has_image", true)
///     .insert("layout", "horizontal");
/// assert_eq!(props.len(), 2);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Properties {
    inner: Map<String, Value>,
}

impl Properties {
    pub fn new() -> Self {
        Self { inner: Map::new() }
    }

    /// Insert a key-value pair. The value can be anything that converts into
    /// a `serde_json::Value`.
    pub fn insert<K, V>(mut self, key: K, value: V) -> Self
    where
        K: Into<String>,
        V: Into<Value>,
    {
        self.inner.insert(key.into(), value.into());
        self
    }

    /// Values from `other` win on key collisions.
    pub fn merge(mut self, other: Properties) -> Self {
        for (k, v) in other.inner {
            self.inner.insert(k, v);
        }
        self
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.inner.get(key)
    }

    pub fn get_bool(&self, key: &str) -> Option<bool> {
        self.get(key).and_then(Value::as_bool)
    }

    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(Value::as_str)
    }

    pub fn into_value(self) -> Value {
        Value::Object(self.inner)
    }
}

impl From<Properties> for Value {
    fn from(props: Properties) -> Self {
        props.into_value()
    }
}

impl From<Value> for Properties {
    fn from(value: Value) -> Self {
        match value {
            Value::Object(map) => Self { inner: map },
            _ => Self::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn merge_prefers_other() {
        let base = Properties::new().insert("a", 1).insert("b", 2);
        let merged = base.merge(Properties::new().insert("b", 3));
        assert_eq!(merged.get("a"), Some(&Value::from(1)));
        assert_eq!(merged.get("b"), Some(&Value::from(3)));
    }

    #[test]
    fn non_object_value_converts_to_empty() {
        assert!(Properties::from(Value::from("nope")).is_empty());
    }

    #[test]
    fn typed_getters() {
        let props = Properties::new().insert("live", true).insert("layout", "grid");
        assert_eq!(props.get_bool("live"), Some(true));
        assert_eq!(props.get_str("layout"), Some("grid"));
        assert_eq!(props.get_str("live"), None);
    }
}
