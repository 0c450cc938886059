//! Verdict parsing from reasoning output.
//!
//! Evaluators ask the reasoning service for a JSON object of the form
//! `{"passed": true|false|null, "confidence": 0.0-1.0, "reason": "..."}`
//! plus archetype-specific extras. Anything else is malformed output.

use serde_json::{Map, Value};

/// Keys consumed into [`ReasonedVerdict`] fields; everything else goes to
/// `details`.
const VERDICT_KEYS: [&str; 3] = ["passed", "confidence", "reason"];

/// Verdict as reported by the reasoning service.
#[derive(Debug, Clone, PartialEq)]
pub struct ReasonedVerdict {
    pub passed: Option<bool>,
    pub confidence: f64,
    pub reason: String,
    pub details: Value,
}

/// Parse a verdict object. Returns `None` when `passed` is absent or not a
/// tri-state value.
pub fn parse_verdict(value: &Value) -> Option<ReasonedVerdict> {
    let obj = value.as_object()?;

    let passed = match obj.get("passed")? {
        Value::Bool(b) => Some(*b),
        Value::Null => None,
        Value::String(s) => match s.trim().to_lowercase().as_str() {
            "true" | "pass" | "passed" | "yes" => Some(true),
            "false" | "fail" | "failed" | "no" => Some(false),
            "null" | "n/a" | "not_applicable" | "inconclusive" | "unknown" => None,
            _ => return None,
        },
        _ => return None,
    };

    let confidence = match obj.get("confidence") {
        Some(Value::Number(n)) => n.as_f64().unwrap_or(0.0),
        Some(Value::String(s)) => s.trim().parse().unwrap_or(0.0),
        _ => 0.0,
    };

    let reason = obj
        .get("reason")
        .or_else(|| obj.get("overall_assessment"))
        .and_then(Value::as_str)
        .unwrap_or_default()
        .trim()
        .to_string();

    let details: Map<String, Value> = obj
        .iter()
        .filter(|(k, _)| !VERDICT_KEYS.contains(&k.as_str()))
        .map(|(k, v)| (k.clone(), v.clone()))
        .collect();

    Some(ReasonedVerdict {
        passed,
        confidence,
        reason,
        details: if details.is_empty() {
            Value::Null
        } else {
            Value::Object(details)
        },
    })
}
