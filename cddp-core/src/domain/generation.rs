//! Generation request

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Named template parameters for one generation call
///
/// Built once per call and not mutated afterwards: the builder methods
/// consume `self`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GenerationRequest {
    params: BTreeMap<String, Value>,
}

impl GenerationRequest {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds (or replaces) a parameter
    pub fn param(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.params.insert(name.into(), value.into());
        self
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.params.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.params.contains_key(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.params.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.params.len()
    }

    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }
}

impl<K: Into<String>> FromIterator<(K, Value)> for GenerationRequest {
    fn from_iter<I: IntoIterator<Item = (K, Value)>>(iter: I) -> Self {
        Self {
            params: iter.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        }
    }
}

/// Text substituted for a parameter value
///
/// Strings go in verbatim; nested JSON is written back as compact JSON text.
pub fn render_value(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_builder_and_lookup() {
        let request = GenerationRequest::new()
            .param("industry_name", "Airline")
            .param("number_of_lines", 20);

        assert_eq!(request.len(), 2);
        assert!(request.contains("industry_name"));
        assert_eq!(request.get("number_of_lines"), Some(&json!(20)));
        assert_eq!(
            request.names().collect::<Vec<_>>(),
            vec!["industry_name", "number_of_lines"]
        );
    }

    #[test]
    fn test_deserializes_from_plain_object() {
        let request: GenerationRequest =
            serde_json::from_value(json!({ "industry_name": "Retail", "n": 3 })).unwrap();
        assert_eq!(request.get("industry_name"), Some(&json!("Retail")));
    }

    #[test]
    fn test_render_value() {
        assert_eq!(render_value(&json!("plain")), "plain");
        assert_eq!(render_value(&json!(7)), "7");
        assert_eq!(render_value(&json!(true)), "true");
        assert_eq!(render_value(&Value::Null), "");
        assert_eq!(
            render_value(&json!({ "table_name": "flights" })),
            r#"{"table_name":"flights"}"#
        );
    }
}
