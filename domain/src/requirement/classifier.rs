//! Classifier: raw candidate -> [`AgentSpec`].
//!
//! Pure and deterministic. Classifying the same candidate twice yields an
//! identical spec (same id, archetype, domain and complexity).

use super::candidate::RawCandidate;
use super::keywords::{Indicator, score_domain};
use super::threshold::parse_threshold;
use crate::agent::spec::{
    AgentSpec, ArchetypeParams, CriteriaParams, QualitativeParams, ScoreParams, ThresholdParams,
};
use crate::agent::value_objects::{Complexity, PolicyDomain, Priority, ThresholdType};
use crate::core::error::ValidationError;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Number of words kept when an agent name has to be derived from the text.
const DERIVED_NAME_WORDS: usize = 8;

/// Score range used when the candidate does not state one.
const DEFAULT_SCORE_RANGE: (f64, f64) = (0.0, 100.0);

const DEFAULT_VERIFICATION_METHOD: &str = "document review";

/// A candidate the classifier rejected, kept for reporting.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RejectedCandidate {
    pub chunk_ordinal: usize,
    pub requirement_text: Option<String>,
    pub reason: String,
}

/// Classify one candidate.
pub fn classify(candidate: &RawCandidate) -> Result<AgentSpec, ValidationError> {
    let requirement_text = candidate
        .requirement_text()
        .ok_or(ValidationError::MissingField("requirement_text"))?;
    let data_fields = candidate
        .string_list("data_fields")?
        .ok_or(ValidationError::MissingField("data_fields"))?;

    let agent_name = candidate
        .text("agent_name")
        .map(String::from)
        .unwrap_or_else(|| derive_name(requirement_text));
    let description = candidate
        .text("description")
        .unwrap_or(requirement_text)
        .to_string();

    let all_text = format!("{} {} {}", agent_name, description, requirement_text);

    let params = archetype_params(candidate, requirement_text)?;
    let complexity = complexity(candidate, &params, data_fields.len(), &all_text);
    let domain: PolicyDomain = score_domain(&all_text);
    let priority = candidate
        .text("priority")
        .and_then(|p| p.parse::<Priority>().ok())
        .unwrap_or_default();

    let mut spec = AgentSpec::new(agent_name, requirement_text, params)
        .with_description(description)
        .with_domain(domain)
        .with_complexity(complexity)
        .with_priority(priority)
        .with_data_fields(data_fields)
        .with_source_chunk(candidate.chunk_ordinal);
    // informational; malformed lists are ignored
    spec.applicable_products = candidate
        .string_list("applicable_products")
        .ok()
        .flatten()
        .unwrap_or_default();
    spec.exceptions = candidate
        .string_list("exceptions")
        .ok()
        .flatten()
        .unwrap_or_default();

    Ok(spec)
}

/// Classify a batch, splitting it into specs and rejections.
pub fn classify_all<'a>(
    candidates: impl IntoIterator<Item = &'a RawCandidate>,
) -> (Vec<AgentSpec>, Vec<RejectedCandidate>) {
    let mut specs = Vec::new();
    let mut rejected = Vec::new();
    for candidate in candidates {
        match classify(candidate) {
            Ok(spec) => specs.push(spec),
            Err(e) => rejected.push(RejectedCandidate {
                chunk_ordinal: candidate.chunk_ordinal,
                requirement_text: candidate.requirement_text().map(String::from),
                reason: e.to_string(),
            }),
        }
    }
    (specs, rejected)
}

fn derive_name(requirement_text: &str) -> String {
    let words: Vec<&str> = requirement_text.split_whitespace().collect();
    let mut name = words
        .iter()
        .take(DERIVED_NAME_WORDS)
        .copied()
        .collect::<Vec<_>>()
        .join(" ");
    if words.len() > DERIVED_NAME_WORDS {
        name.push_str("...");
    }
    name
}

/// Archetype cues in order: threshold, criteria, score, qualitative.
fn archetype_params(
    candidate: &RawCandidate,
    requirement_text: &str,
) -> Result<ArchetypeParams, ValidationError> {
    if let Some(params) = threshold_params(candidate, requirement_text)? {
        return Ok(ArchetypeParams::Threshold(params));
    }

    let prohibition = Indicator::Prohibition.found_in(requirement_text);
    if candidate.get("expected_value").is_some()
        || prohibition
        || Indicator::Binary.found_in(requirement_text)
    {
        let expected_value = match candidate.get("expected_value") {
            Some(Value::String(s)) if !s.trim().is_empty() => s.trim().to_string(),
            Some(Value::Bool(b)) => (if *b { "yes" } else { "no" }).to_string(),
            Some(Value::Number(n)) => n.to_string(),
            _ if prohibition => "no".to_string(),
            _ => "yes".to_string(),
        };
        let verification_method = candidate
            .text("verification_method")
            .unwrap_or(DEFAULT_VERIFICATION_METHOD)
            .to_string();
        return Ok(ArchetypeParams::Criteria(CriteriaParams {
            expected_value,
            verification_method,
        }));
    }

    if let Some(params) = score_params(candidate)? {
        return Ok(ArchetypeParams::Score(params));
    }

    let assessment_criteria = candidate
        .string_list("assessment_criteria")?
        .filter(|c| !c.is_empty())
        .unwrap_or_else(|| vec![requirement_text.to_string()]);
    Ok(ArchetypeParams::Qualitative(QualitativeParams {
        assessment_criteria,
    }))
}

/// Threshold from the requirement text, else from explicit candidate fields.
fn threshold_params(
    candidate: &RawCandidate,
    requirement_text: &str,
) -> Result<Option<ThresholdParams>, ValidationError> {
    let stated_unit = candidate.text("unit").map(String::from);

    if let Some(parsed) = parse_threshold(requirement_text) {
        let mut params = parsed.into_params();
        if params.unit.is_none() {
            params.unit = stated_unit;
        }
        return Ok(Some(params));
    }

    let Some(value) = candidate.number("threshold_value")? else {
        return Ok(None);
    };
    let threshold_type: ThresholdType = candidate
        .text("threshold_type")
        .ok_or(ValidationError::MissingField("threshold_type"))?
        .parse()
        .map_err(|e: String| ValidationError::invalid("threshold_type", e))?;

    let mut params = match threshold_type {
        ThresholdType::Range => {
            let upper = candidate
                .number("upper_value")?
                .ok_or(ValidationError::MissingField("upper_value"))?;
            ThresholdParams::range(value, upper)
        }
        kind => ThresholdParams::new(kind, value),
    };
    params.unit = stated_unit;
    Ok(Some(params))
}

/// Score model when the candidate names at least two weighted factors.
fn score_params(candidate: &RawCandidate) -> Result<Option<ScoreParams>, ValidationError> {
    let Some(factors) = candidate.get("scoring_factors") else {
        return Ok(None);
    };
    let Value::Object(map) = factors else {
        return Err(ValidationError::invalid(
            "scoring_factors",
            "expected a factor -> weight object",
        ));
    };
    let mut scoring_factors = BTreeMap::new();
    for (factor, weight) in map {
        let weight = weight.as_f64().ok_or_else(|| {
            ValidationError::invalid(
                "scoring_factors",
                format!("weight of '{}' is not a number", factor),
            )
        })?;
        scoring_factors.insert(factor.clone(), weight);
    }
    if scoring_factors.len() < 2 {
        return Ok(None);
    }

    let score_range = match candidate.get("score_range") {
        None => DEFAULT_SCORE_RANGE,
        Some(Value::Array(bounds)) if bounds.len() == 2 => {
            match (bounds[0].as_f64(), bounds[1].as_f64()) {
                (Some(lo), Some(hi)) if lo < hi => (lo, hi),
                _ => {
                    return Err(ValidationError::invalid(
                        "score_range",
                        "expected two increasing numbers",
                    ));
                }
            }
        }
        Some(_) => {
            return Err(ValidationError::invalid(
                "score_range",
                "expected [min, max]",
            ));
        }
    };

    Ok(Some(ScoreParams {
        scoring_factors,
        score_range,
    }))
}

/// multi_step > comparative > quantitative > simple.
fn complexity(
    candidate: &RawCandidate,
    params: &ArchetypeParams,
    field_count: usize,
    text: &str,
) -> Complexity {
    let has_steps = candidate
        .get("steps")
        .and_then(Value::as_array)
        .is_some_and(|steps| steps.len() >= 2);
    if has_steps || Indicator::MultiStep.found_in(text) {
        return Complexity::MultiStep;
    }
    if Indicator::Comparative.found_in(text) {
        return Complexity::Comparative;
    }
    let derived_threshold = matches!(params, ArchetypeParams::Threshold(_)) && field_count >= 2;
    if derived_threshold
        || candidate.text("formula").is_some()
        || Indicator::Quantitative.found_in(text)
    {
        return Complexity::Quantitative;
    }
    Complexity::Simple
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::value_objects::Archetype;
    use serde_json::json;

    fn candidate(value: Value) -> RawCandidate {
        RawCandidate::from_value(3, value).unwrap()
    }

    #[test]
    fn test_credit_score_threshold() {
        let spec = classify(&candidate(json!({
            "requirement_text": "Credit score must be at least 650",
            "data_fields": ["credit_score"],
            "priority": "critical"
        })))
        .unwrap();

        assert_eq!(spec.archetype, Archetype::Threshold);
        let params = spec.archetype_params.as_threshold().unwrap();
        assert_eq!(params.threshold_type, ThresholdType::Min);
        assert_eq!(params.threshold_value, 650.0);
        assert_eq!(spec.domain, PolicyDomain::Financial);
        assert_eq!(spec.complexity, Complexity::Simple);
        assert_eq!(spec.priority, Priority::Critical);
        assert_eq!(spec.source_chunk, Some(3));
        assert!(spec.agent_id.starts_with("TH-"));
    }

    #[test]
    fn test_classify_is_idempotent() {
        let c = candidate(json!({
            "requirement_text": "Debt-to-income ratio must not exceed 43%",
            "data_fields": ["monthly_debt", "monthly_income"],
            "agent_name": "DTI Limit"
        }));
        let a = classify(&c).unwrap();
        let b = classify(&c).unwrap();
        assert_eq!(a, b);
        assert_eq!(a.complexity, Complexity::Quantitative);
    }

    #[test]
    fn test_criteria_from_binary_cue() {
        let spec = classify(&candidate(json!({
            "requirement_text": "Applicant must provide two years of tax returns",
            "data_fields": ["tax_returns"]
        })))
        .unwrap();
        assert_eq!(spec.archetype, Archetype::Criteria);
        match &spec.archetype_params {
            ArchetypeParams::Criteria(p) => {
                assert_eq!(p.expected_value, "yes");
                assert_eq!(p.verification_method, DEFAULT_VERIFICATION_METHOD);
            }
            other => panic!("unexpected params {:?}", other),
        }
    }

    #[test]
    fn test_prohibition_expects_no() {
        let spec = classify(&candidate(json!({
            "requirement_text": "Cash-out refinancing is prohibited for investment properties",
            "data_fields": ["loan_purpose"]
        })))
        .unwrap();
        match &spec.archetype_params {
            ArchetypeParams::Criteria(p) => assert_eq!(p.expected_value, "no"),
            other => panic!("unexpected params {:?}", other),
        }
    }

    #[test]
    fn test_score_needs_two_weighted_factors() {
        let spec = classify(&candidate(json!({
            "requirement_text": "Compute the borrower risk rating",
            "data_fields": ["payment_history", "utilization"],
            "scoring_factors": {"payment_history": 0.6, "utilization": 0.4},
            "score_range": [0, 10]
        })))
        .unwrap();
        assert_eq!(spec.archetype, Archetype::Score);

        let single = classify(&candidate(json!({
            "requirement_text": "Compute the borrower risk rating",
            "data_fields": ["payment_history"],
            "scoring_factors": {"payment_history": 1.0}
        })))
        .unwrap();
        assert_eq!(single.archetype, Archetype::Qualitative);
    }

    #[test]
    fn test_qualitative_fallback() {
        let spec = classify(&candidate(json!({
            "requirement_text": "Management should demonstrate sound judgment",
            "data_fields": ["management_assessment"]
        })))
        .unwrap();
        assert_eq!(spec.archetype, Archetype::Qualitative);
        assert_eq!(spec.priority, Priority::Medium);
        assert_eq!(spec.agent_name, "Management should demonstrate sound judgment");
    }

    #[test]
    fn test_complexity_tiers() {
        let multi = classify(&candidate(json!({
            "requirement_text": "First check income, followed by verification of employment",
            "data_fields": ["income"]
        })))
        .unwrap();
        assert_eq!(multi.complexity, Complexity::MultiStep);

        let comparative = classify(&candidate(json!({
            "requirement_text": "Operating margin is assessed relative to the industry average",
            "data_fields": ["operating_margin"]
        })))
        .unwrap();
        assert_eq!(comparative.complexity, Complexity::Comparative);
    }

    #[test]
    fn test_explicit_threshold_fields() {
        let spec = classify(&candidate(json!({
            "requirement_text": "Reserve requirement per the program matrix",
            "data_fields": ["reserves_months"],
            "threshold_value": "6",
            "threshold_type": "minimum",
            "unit": "months"
        })))
        .unwrap();
        let params = spec.archetype_params.as_threshold().unwrap();
        assert_eq!(params.threshold_type, ThresholdType::Min);
        assert_eq!(params.unit.as_deref(), Some("months"));
    }

    #[test]
    fn test_validation_errors() {
        let err = classify(&candidate(json!({"data_fields": ["x"]}))).unwrap_err();
        assert_eq!(err, ValidationError::MissingField("requirement_text"));

        let err = classify(&candidate(json!({"requirement_text": "LTV <= 80%"}))).unwrap_err();
        assert_eq!(err, ValidationError::MissingField("data_fields"));

        let err = classify(&candidate(json!({
            "requirement_text": "LTV <= 80%",
            "data_fields": 42
        })))
        .unwrap_err();
        assert_eq!(err.field(), "data_fields");

        let err = classify(&candidate(json!({
            "requirement_text": "Program matrix limit",
            "data_fields": ["x"],
            "threshold_value": 5,
            "threshold_type": "sideways"
        })))
        .unwrap_err();
        assert_eq!(err.field(), "threshold_type");
    }

    #[test]
    fn test_invalid_priority_defaults_to_medium() {
        let spec = classify(&candidate(json!({
            "requirement_text": "LTV must not exceed 80%",
            "data_fields": ["ltv"],
            "priority": "urgent"
        })))
        .unwrap();
        assert_eq!(spec.priority, Priority::Medium);
    }

    #[test]
    fn test_classify_all_splits_rejections() {
        let good = candidate(json!({"requirement_text": "LTV <= 80%", "data_fields": ["ltv"]}));
        let bad = candidate(json!({"requirement_text": "No fields"}));
        let (specs, rejected) = classify_all([&good, &bad]);
        assert_eq!(specs.len(), 1);
        assert_eq!(rejected.len(), 1);
        assert_eq!(rejected[0].requirement_text.as_deref(), Some("No fields"));
        assert!(rejected[0].reason.contains("data_fields"));
    }
}
