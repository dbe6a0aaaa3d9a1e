//! Name bindings for one rendering pass

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Mapping from names to JSON-like values
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RenderContext(Map<String, Value>);

impl RenderContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind a value, replacing any previous binding
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<Value>) {
        self.0.insert(name.into(), value.into());
    }

    /// Builder form of [`RenderContext::insert`]
    pub fn with(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(name, value);
        self
    }

    /// Build a context from any value that serializes to a mapping
    pub fn from_serialize<T: Serialize>(value: &T) -> Result<Self, serde_json::Error> {
        match serde_json::to_value(value)? {
            Value::Object(map) => Ok(Self(map)),
            other => Err(<serde_json::Error as serde::ser::Error>::custom(format!(
                "render context must be a mapping, got {}",
                kind_of(&other)
            ))),
        }
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.0.get(name)
    }

    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }
}

impl From<Map<String, Value>> for RenderContext {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

impl TryFrom<Value> for RenderContext {
    /// The rejected, non-mapping value
    type Error = Value;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        match value {
            Value::Object(map) => Ok(Self(map)),
            other => Err(other),
        }
    }
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "a sequence",
        Value::Object(_) => "a mapping",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[derive(Serialize)]
    struct Page {
        title: String,
        count: u32,
    }

    #[test]
    fn test_from_serialize_struct() {
        let ctx = RenderContext::from_serialize(&Page {
            title: "Home".to_string(),
            count: 2,
        })
        .unwrap();
        assert_eq!(ctx.get("title"), Some(&json!("Home")));
        assert_eq!(ctx.get("count"), Some(&json!(2)));
    }

    #[test]
    fn test_from_serialize_rejects_sequences() {
        let err = RenderContext::from_serialize(&vec![1, 2]).unwrap_err();
        assert!(err.to_string().contains("a sequence"));
    }

    #[test]
    fn test_builder_and_try_from() {
        let built = RenderContext::new().with("a", 1).with("b", "x");
        let converted = RenderContext::try_from(json!({"a": 1, "b": "x"})).unwrap();
        assert_eq!(built, converted);
        assert!(RenderContext::try_from(json!(3)).is_err());
    }
}
