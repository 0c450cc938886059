//! Data extracted from the assessment document.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// One extracted value with provenance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldValue {
    pub value: Value,
    /// Extraction confidence in [0, 1]
    #[serde(default = "full_confidence")]
    pub confidence: f64,
    /// Where the value was found ("page 3, table 2"), if known
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_location: Option<String>,
}

fn full_confidence() -> f64 {
    1.0
}

impl FieldValue {
    pub fn new(value: Value) -> Self {
        Self {
            value,
            confidence: 1.0,
            source_location: None,
        }
    }

    pub fn with_confidence(mut self, confidence: f64) -> Self {
        self.confidence = if confidence.is_nan() {
            0.0
        } else {
            confidence.clamp(0.0, 1.0)
        };
        self
    }

    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.source_location = Some(location.into());
        self
    }

    /// Numeric reading of the value. Strings such as `"43%"` or
    /// `"$1,200.50"` are accepted.
    pub fn as_number(&self) -> Option<f64> {
        match &self.value {
            Value::Number(n) => n.as_f64(),
            Value::String(s) => parse_numeric(s),
            _ => None,
        }
    }

    /// Whether the value carries information (not null, not blank).
    pub fn is_present(&self) -> bool {
        match &self.value {
            Value::Null => false,
            Value::String(s) => !s.trim().is_empty(),
            _ => true,
        }
    }
}

fn parse_numeric(s: &str) -> Option<f64> {
    let trimmed = s.trim().trim_start_matches('$').trim_end_matches('%').trim();
    let cleaned: String = trimmed.chars().filter(|c| *c != ',').collect();
    cleaned.parse().ok()
}

/// Field name -> extracted value. Read-only to the pipeline.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ExtractedData {
    fields: BTreeMap<String, FieldValue>,
}

impl ExtractedData {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, field: impl Into<String>, value: FieldValue) {
        self.fields.insert(field.into(), value);
    }

    /// Builder-style insert of a plain value with full confidence.
    pub fn with(mut self, field: impl Into<String>, value: Value) -> Self {
        self.insert(field, FieldValue::new(value));
        self
    }

    pub fn get(&self, field: &str) -> Option<&FieldValue> {
        self.fields.get(field).filter(|v| v.is_present())
    }

    pub fn number(&self, field: &str) -> Option<f64> {
        self.get(field).and_then(FieldValue::as_number)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &FieldValue)> {
        self.fields.iter()
    }

    /// Requested fields that are absent or blank, in request order.
    pub fn missing<'a>(&self, fields: impl IntoIterator<Item = &'a String>) -> Vec<String> {
        fields
            .into_iter()
            .filter(|f| self.get(f).is_none())
            .cloned()
            .collect()
    }

    /// JSON object of the requested fields that are present, with their
    /// confidence and location, for inclusion in prompts.
    pub fn subset<'a>(&self, fields: impl IntoIterator<Item = &'a String>) -> Value {
        let mut out = Map::new();
        for field in fields {
            if let Some(v) = self.get(field) {
                out.insert(
                    field.clone(),
                    serde_json::json!({
                        "value": v.value,
                        "confidence": v.confidence,
                        "source_location": v.source_location,
                    }),
                );
            }
        }
        Value::Object(out)
    }

    /// Build from JSON. Each entry is either a full `{value, confidence,
    /// source_location}` record or a bare value (full confidence).
    pub fn from_json(value: Value) -> Option<Self> {
        let Value::Object(map) = value else {
            return None;
        };
        let mut data = Self::new();
        for (field, entry) in map {
            let record = match entry {
                Value::Object(ref obj) if obj.contains_key("value") => {
                    serde_json::from_value::<FieldValue>(entry.clone())
                        .unwrap_or_else(|_| FieldValue::new(entry))
                }
                other => FieldValue::new(other),
            };
            data.insert(field, record);
        }
        Some(data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_numbers_from_strings() {
        let data = ExtractedData::new()
            .with("credit_score", json!(720))
            .with("dti", json!("43%"))
            .with("loan_amount", json!("$1,200.50"))
            .with("name", json!("ACME"));
        assert_eq!(data.number("credit_score"), Some(720.0));
        assert_eq!(data.number("dti"), Some(43.0));
        assert_eq!(data.number("loan_amount"), Some(1200.5));
        assert_eq!(data.number("name"), None);
        assert_eq!(data.number("absent"), None);
    }

    #[test]
    fn test_missing_treats_blank_as_absent() {
        let data = ExtractedData::new()
            .with("a", json!(1))
            .with("b", json!(" "))
            .with("c", Value::Null);
        let wanted = ["a", "b", "c", "d"].map(String::from);
        assert_eq!(data.missing(wanted.iter()), vec!["b", "c", "d"]);
    }

    #[test]
    fn test_from_json_accepts_both_shapes() {
        let data = ExtractedData::from_json(json!({
            "credit_score": {"value": 720, "confidence": 0.9, "source_location": "page 2"},
            "dti": 38.5
        }))
        .unwrap();
        let score = data.get("credit_score").unwrap();
        assert_eq!(score.confidence, 0.9);
        assert_eq!(score.source_location.as_deref(), Some("page 2"));
        assert_eq!(data.get("dti").unwrap().confidence, 1.0);
        assert!(ExtractedData::from_json(json!([1, 2])).is_none());
    }

    #[test]
    fn test_subset_only_includes_present_fields() {
        let data = ExtractedData::new().with("a", json!(1));
        let wanted = ["a", "b"].map(String::from);
        let subset = data.subset(wanted.iter());
        assert_eq!(subset["a"]["value"], 1);
        assert!(subset.get("b").is_none());
    }

    #[test]
    fn test_confidence_is_clamped() {
        let v = FieldValue::new(json!(1)).with_confidence(3.0);
        assert_eq!(v.confidence, 1.0);
    }
}
