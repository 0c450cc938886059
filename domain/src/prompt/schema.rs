//! Expected output shapes for reasoning calls.

use serde::Serialize;
use serde_json::{Value, json};

/// JSON schema the reasoning service is asked to conform to.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OutputSchema {
    pub name: &'static str,
    pub schema: Value,
}

impl OutputSchema {
    /// `{"requirements": [...]}` returned by requirement extraction.
    pub fn requirements() -> Self {
        Self {
            name: "requirements",
            schema: json!({
                "type": "object",
                "required": ["requirements"],
                "properties": {
                    "requirements": {
                        "type": "array",
                        "items": {
                            "type": "object",
                            "required": ["requirement_text", "data_fields"],
                            "properties": {
                                "requirement_text": {"type": "string"},
                                "data_fields": {"type": "array", "items": {"type": "string"}},
                                "agent_name": {"type": "string"},
                                "description": {"type": "string"},
                                "priority": {"enum": ["critical", "high", "medium", "low"]},
                                "threshold_value": {"type": ["number", "string"]},
                                "threshold_type": {"enum": ["min", "max", "exact", "range"]},
                                "upper_value": {"type": "number"},
                                "unit": {"type": "string"},
                                "expected_value": {"type": ["string", "boolean"]},
                                "verification_method": {"type": "string"},
                                "scoring_factors": {"type": "object", "additionalProperties": {"type": "number"}},
                                "score_range": {"type": "array", "items": {"type": "number"}},
                                "assessment_criteria": {"type": "array", "items": {"type": "string"}},
                                "applicable_products": {"type": "array", "items": {"type": "string"}},
                                "exceptions": {"type": "array", "items": {"type": "string"}}
                            }
                        }
                    }
                }
            }),
        }
    }

    /// Tri-state verdict returned by evaluators.
    pub fn verdict() -> Self {
        Self {
            name: "verdict",
            schema: json!({
                "type": "object",
                "required": ["passed", "confidence", "reason"],
                "properties": {
                    "passed": {"type": ["boolean", "null"]},
                    "confidence": {"type": "number", "minimum": 0, "maximum": 1},
                    "reason": {"type": "string"}
                }
            }),
        }
    }

    /// Ordered analysis steps for multi-step evaluation.
    pub fn analysis_steps() -> Self {
        Self {
            name: "analysis_steps",
            schema: json!({
                "type": "object",
                "required": ["steps"],
                "properties": {
                    "steps": {"type": "array", "items": {"type": "string"}}
                }
            }),
        }
    }

    /// Whether a check applies to the document at all.
    pub fn applicability() -> Self {
        Self {
            name: "applicability",
            schema: json!({
                "type": "object",
                "required": ["applicable", "reason"],
                "properties": {
                    "applicable": {"type": "boolean"},
                    "reason": {"type": "string"}
                }
            }),
        }
    }

    /// Field values extracted from an assessment document.
    pub fn extracted_fields() -> Self {
        Self {
            name: "extracted_fields",
            schema: json!({
                "type": "object",
                "required": ["fields"],
                "properties": {
                    "fields": {
                        "type": "object",
                        "additionalProperties": {
                            "type": "object",
                            "properties": {
                                "value": {},
                                "confidence": {"type": "number"},
                                "source_location": {"type": "string"}
                            }
                        }
                    }
                }
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_schemas_are_objects() {
        for schema in [
            OutputSchema::requirements(),
            OutputSchema::verdict(),
            OutputSchema::analysis_steps(),
            OutputSchema::applicability(),
            OutputSchema::extracted_fields(),
        ] {
            assert_eq!(schema.schema["type"], "object", "{}", schema.name);
        }
    }
}
