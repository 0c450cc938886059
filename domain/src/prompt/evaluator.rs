//! Prompt templates for agent evaluation

use crate::agent::spec::{
    AgentSpec, CriteriaParams, QualitativeParams, ScoreParams, ThresholdParams,
};
use crate::rule::AuthoritativeRule;
use serde_json::Value;

const VERDICT_INSTRUCTIONS: &str = r#"Return JSON:
{
  "passed": true | false | null,
  "confidence": 0.0-1.0,
  "reason": "specific explanation referencing the data"
}
Use "passed": null only when the data is insufficient to decide.
Return only JSON, no other text."#;

/// Templates for evaluator prompts
pub struct EvaluatorPromptTemplate;

impl EvaluatorPromptTemplate {
    /// System prompt shared by all evaluators
    pub fn evaluator_system() -> &'static str {
        r#"You are a compliance checker evaluating one policy requirement against extracted document data.
Base your verdict strictly on the data provided. Be precise about calculations.
Never assume values that are not in the data."#
    }

    fn header(spec: &AgentSpec) -> String {
        let fields = spec
            .data_fields
            .iter()
            .cloned()
            .collect::<Vec<_>>()
            .join(", ");
        let mut header = format!(
            "Agent ID: {}\nName: {}\nRequirement: {}\nDomain: {}\nPriority: {}\nData Fields Needed: {}",
            spec.agent_id,
            spec.agent_name,
            spec.requirement_text,
            spec.domain,
            spec.priority,
            fields
        );
        if !spec.exceptions.is_empty() {
            header.push_str(&format!("\nExceptions: {}", spec.exceptions.join("; ")));
        }
        header
    }

    fn data_block(data: &Value) -> String {
        serde_json::to_string_pretty(data).unwrap_or_else(|_| data.to_string())
    }

    /// Threshold evaluation (multi-field or derived values)
    pub fn threshold_prompt(spec: &AgentSpec, params: &ThresholdParams, data: &Value) -> String {
        format!(
            r#"THRESHOLD REQUIREMENT:
{header}
Threshold: {threshold}

DATA:
{data}

INSTRUCTIONS:
1. Extract the required values from the data
2. Perform any calculation the requirement implies (ratios, sums)
3. Compare the result against the threshold
4. Account for the unit and any stated exceptions
5. Include "calculated_value" in your answer

{verdict}"#,
            header = Self::header(spec),
            threshold = params.describe(),
            data = Self::data_block(data),
            verdict = VERDICT_INSTRUCTIONS,
        )
    }

    /// Binary criteria evaluation
    pub fn criteria_prompt(spec: &AgentSpec, params: &CriteriaParams, data: &Value) -> String {
        format!(
            r#"CRITERIA REQUIREMENT:
{header}
Expected Value: {expected}
Verification Method: {method}

DATA:
{data}

INSTRUCTIONS:
1. Determine whether the condition is met by the data
2. Check the value against the expected value
3. List any documentation that is missing in "missing_documentation"

{verdict}"#,
            header = Self::header(spec),
            expected = params.expected_value,
            method = params.verification_method,
            data = Self::data_block(data),
            verdict = VERDICT_INSTRUCTIONS,
        )
    }

    /// Weighted scoring evaluation
    pub fn score_prompt(spec: &AgentSpec, params: &ScoreParams, data: &Value) -> String {
        let factors = params
            .scoring_factors
            .iter()
            .map(|(factor, weight)| format!("- {}: weight {}", factor, weight))
            .collect::<Vec<_>>()
            .join("\n");
        format!(
            r#"SCORING MODEL:
{header}
Scoring Factors:
{factors}
Score Range: {lo} to {hi}

DATA:
{data}

INSTRUCTIONS:
1. Extract a value for each scoring factor
2. Normalize values where needed and apply the weights
3. Compute the overall score within the score range
4. Include "calculated_score" and a per-factor "score_breakdown"
5. The requirement passes when the score meets what the requirement asks for
6. Lower the confidence when factors are missing

{verdict}"#,
            header = Self::header(spec),
            factors = factors,
            lo = params.score_range.0,
            hi = params.score_range.1,
            data = Self::data_block(data),
            verdict = VERDICT_INSTRUCTIONS,
        )
    }

    /// Judgment-based evaluation
    pub fn qualitative_prompt(
        spec: &AgentSpec,
        params: &QualitativeParams,
        data: &Value,
    ) -> String {
        let criteria = params
            .assessment_criteria
            .iter()
            .map(|c| format!("- {}", c))
            .collect::<Vec<_>>()
            .join("\n");
        format!(
            r#"QUALITATIVE ASSESSMENT:
{header}
Assessment Criteria:
{criteria}

DATA:
{data}

INSTRUCTIONS:
1. Assess the data against each criterion
2. Note strengths and concerns in "findings"
3. Give an overall judgment

{verdict}"#,
            header = Self::header(spec),
            criteria = criteria,
            data = Self::data_block(data),
            verdict = VERDICT_INSTRUCTIONS,
        )
    }

    /// Universal evaluator, simple mode
    pub fn simple_prompt(spec: &AgentSpec, data: &Value) -> String {
        format!(
            r#"You are a policy compliance specialist in: {domain}

{header}

DATA:
{data}

Check whether the data satisfies the requirement.

{verdict}"#,
            domain = spec.domain.description(),
            header = Self::header(spec),
            data = Self::data_block(data),
            verdict = VERDICT_INSTRUCTIONS,
        )
    }

    /// Universal evaluator, quantitative mode
    pub fn quantitative_prompt(spec: &AgentSpec, data: &Value) -> String {
        format!(
            r#"You are a quantitative analyst specializing in: {domain}

{header}

DATA:
{data}

Perform the calculations the requirement needs. Show the formula and the
inputs used in "calculation", and the result in "calculated_value".

{verdict}"#,
            domain = spec.domain.description(),
            header = Self::header(spec),
            data = Self::data_block(data),
            verdict = VERDICT_INSTRUCTIONS,
        )
    }

    /// Universal evaluator, comparative mode
    pub fn comparative_prompt(spec: &AgentSpec, data: &Value) -> String {
        format!(
            r#"You are a comparative analyst specializing in: {domain}

{header}

DATA:
{data}

Compare the data against the benchmark, industry standard or peer group the
requirement references. Report "performance" as above, below or at the benchmark.

{verdict}"#,
            domain = spec.domain.description(),
            header = Self::header(spec),
            data = Self::data_block(data),
            verdict = VERDICT_INSTRUCTIONS,
        )
    }

    /// Universal evaluator, multi-step mode: plan the steps
    pub fn plan_steps_prompt(spec: &AgentSpec) -> String {
        format!(
            r#"Break down this compliance analysis into logical steps.

{header}

Return JSON: {{"steps": ["step 1 description", "step 2 description", ...]}}
Use 3 to 7 steps in the order they should be performed."#,
            header = Self::header(spec),
        )
    }

    /// Universal evaluator, multi-step mode: one step
    pub fn step_prompt(
        spec: &AgentSpec,
        step_number: usize,
        step: &str,
        data: &Value,
        previous: &[Value],
    ) -> String {
        let previous = if previous.is_empty() {
            "None".to_string()
        } else {
            Self::data_block(&Value::Array(previous.to_vec()))
        };
        format!(
            r#"You are conducting step {step_number} of a multi-step analysis.

{header}
Current Step: {step}

DATA:
{data}

Previous Step Results:
{previous}

Focus only on this step. Put this step's observations in "findings".

{verdict}"#,
            step_number = step_number,
            header = Self::header(spec),
            step = step,
            data = Self::data_block(data),
            previous = previous,
            verdict = VERDICT_INSTRUCTIONS,
        )
    }

    /// Universal evaluator, multi-step mode: final synthesis
    pub fn synthesis_prompt(spec: &AgentSpec, step_results: &[Value]) -> String {
        format!(
            r#"Synthesize the multi-step analysis results into a final verdict.

{header}

All Step Results:
{steps}

{verdict}"#,
            header = Self::header(spec),
            steps = Self::data_block(&Value::Array(step_results.to_vec())),
            verdict = VERDICT_INSTRUCTIONS,
        )
    }

    /// Whether missing fields mean "not extracted" or "not applicable"
    pub fn applicability_prompt(spec: &AgentSpec, missing: &[String], data: &Value) -> String {
        format!(
            r#"You are deciding whether a policy check applies to a document.

{header}
Missing Fields: {missing}

AVAILABLE DATA:
{data}

Decide whether the missing fields are:
1. simply not extracted from the document (the check applies), or
2. not applicable to this type of document or application.

Return JSON: {{"applicable": true | false, "reason": "explanation"}}"#,
            header = Self::header(spec),
            missing = missing.join(", "),
            data = Self::data_block(data),
        )
    }

    /// Hybrid evaluation with an authoritative rule
    pub fn hybrid_prompt(spec: &AgentSpec, rule: &AuthoritativeRule, data: &Value) -> String {
        format!(
            r#"You are checking policy compliance using an authoritative rule and your own reasoning.

{header}

AUTHORITATIVE RULE:
{rule}

DATA:
{data}

INSTRUCTIONS:
1. Treat the authoritative rule as binding
2. Consider linked requirements for a complete evaluation
3. Use your own reasoning only for edge cases the rule does not cover
4. List the rule ids you relied on in "requirements_evaluated"

{verdict}"#,
            header = Self::header(spec),
            rule = rule.context(),
            data = Self::data_block(data),
            verdict = VERDICT_INSTRUCTIONS,
        )
    }
}
