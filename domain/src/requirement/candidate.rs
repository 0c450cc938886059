//! Raw requirement candidates returned by extraction.

use crate::core::error::ValidationError;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Fields every candidate must carry to survive extraction.
pub const REQUIRED_FIELDS: [&str; 2] = ["requirement_text", "data_fields"];

/// An unvalidated field map for one requirement, tagged with the chunk it
/// came from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawCandidate {
    pub chunk_ordinal: usize,
    pub fields: Map<String, Value>,
}

impl RawCandidate {
    pub fn new(chunk_ordinal: usize, fields: Map<String, Value>) -> Self {
        Self {
            chunk_ordinal,
            fields,
        }
    }

    /// Wrap a JSON value; `None` unless it is an object.
    pub fn from_value(chunk_ordinal: usize, value: Value) -> Option<Self> {
        match value {
            Value::Object(fields) => Some(Self::new(chunk_ordinal, fields)),
            _ => None,
        }
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.get(key).filter(|v| !v.is_null())
    }

    /// Trimmed, non-blank string field.
    pub fn text(&self, key: &str) -> Option<&str> {
        self.get(key)
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }

    pub fn requirement_text(&self) -> Option<&str> {
        self.text("requirement_text")
    }

    /// First required field this candidate lacks, if any.
    pub fn missing_required(&self) -> Option<&'static str> {
        if self.requirement_text().is_none() {
            return Some(REQUIRED_FIELDS[0]);
        }
        if self.get("data_fields").is_none() {
            return Some(REQUIRED_FIELDS[1]);
        }
        None
    }

    /// Numeric field; numeric strings ("650", "43%") are accepted.
    pub fn number(&self, key: &'static str) -> Result<Option<f64>, ValidationError> {
        match self.get(key) {
            None => Ok(None),
            Some(Value::Number(n)) => n
                .as_f64()
                .map(Some)
                .ok_or_else(|| ValidationError::invalid(key, "not a finite number")),
            Some(Value::String(s)) => {
                let cleaned: String = s
                    .chars()
                    .filter(|c| c.is_ascii_digit() || matches!(c, '.' | '-'))
                    .collect();
                cleaned
                    .parse::<f64>()
                    .map(Some)
                    .map_err(|_| ValidationError::invalid(key, format!("'{}' is not a number", s)))
            }
            Some(other) => Err(ValidationError::invalid(
                key,
                format!("expected a number, got {}", json_kind(other)),
            )),
        }
    }

    /// List of strings. A comma-separated string is split into a list.
    pub fn string_list(&self, key: &'static str) -> Result<Option<Vec<String>>, ValidationError> {
        let items = match self.get(key) {
            None => return Ok(None),
            Some(Value::String(s)) => s
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(String::from)
                .collect(),
            Some(Value::Array(values)) => {
                let mut items = Vec::with_capacity(values.len());
                for value in values {
                    match value {
                        Value::String(s) if !s.trim().is_empty() => {
                            items.push(s.trim().to_string())
                        }
                        Value::String(_) => {}
                        other => {
                            return Err(ValidationError::invalid(
                                key,
                                format!("list items must be strings, got {}", json_kind(other)),
                            ));
                        }
                    }
                }
                items
            }
            Some(other) => {
                return Err(ValidationError::invalid(
                    key,
                    format!("expected a list, got {}", json_kind(other)),
                ));
            }
        };
        Ok(Some(items))
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn candidate(value: Value) -> RawCandidate {
        RawCandidate::from_value(0, value).unwrap()
    }

    #[test]
    fn test_from_value_requires_object() {
        assert!(RawCandidate::from_value(0, json!("text")).is_none());
        assert!(RawCandidate::from_value(0, json!({})).is_some());
    }

    #[test]
    fn test_missing_required() {
        assert_eq!(
            candidate(json!({"data_fields": ["x"]})).missing_required(),
            Some("requirement_text")
        );
        assert_eq!(
            candidate(json!({"requirement_text": "   ", "data_fields": ["x"]})).missing_required(),
            Some("requirement_text")
        );
        assert_eq!(
            candidate(json!({"requirement_text": "LTV <= 80%", "data_fields": null}))
                .missing_required(),
            Some("data_fields")
        );
        assert_eq!(
            candidate(json!({"requirement_text": "LTV <= 80%", "data_fields": []}))
                .missing_required(),
            None
        );
    }

    #[test]
    fn test_string_list_accepts_csv() {
        let c = candidate(json!({"data_fields": "credit_score, dti ,"}));
        assert_eq!(
            c.string_list("data_fields").unwrap(),
            Some(vec!["credit_score".to_string(), "dti".to_string()])
        );
    }

    #[test]
    fn test_string_list_rejects_non_strings() {
        let c = candidate(json!({"data_fields": ["a", 3]}));
        let err = c.string_list("data_fields").unwrap_err();
        assert_eq!(err.field(), "data_fields");

        let c = candidate(json!({"data_fields": {"a": 1}}));
        assert!(c.string_list("data_fields").is_err());
    }

    #[test]
    fn test_number_accepts_numeric_strings() {
        let c = candidate(json!({"a": 650, "b": "43%", "c": "n/a", "d": true}));
        assert_eq!(c.number("a").unwrap(), Some(650.0));
        assert_eq!(c.number("b").unwrap(), Some(43.0));
        assert!(c.number("c").is_err());
        assert!(c.number("d").is_err());
        assert_eq!(c.number("missing").unwrap(), None);
    }
}
