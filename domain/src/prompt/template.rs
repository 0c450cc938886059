//! Prompt templates for requirement and data extraction

use crate::agent::value_objects::PolicyDomain;
use crate::document::entities::DocumentChunk;

/// Templates for the extraction stages
pub struct PromptTemplate;

impl PromptTemplate {
    /// System prompt for requirement extraction
    pub fn extraction_system() -> &'static str {
        r#"You are a policy analyst who turns policy documents into executable compliance checks.
Extract every concrete, checkable requirement from the text you are given.
Each requirement must name the data fields an assessor needs to verify it.
Only extract requirements stated in the text. Do not invent limits or conditions.
Respond with JSON only."#
    }

    /// User prompt for extracting requirements from one chunk
    pub fn extraction_prompt(chunk: &DocumentChunk, domain_hint: Option<PolicyDomain>) -> String {
        let hint = match domain_hint {
            Some(domain) if domain != PolicyDomain::General => format!(
                "\nThe policy is expected to be mostly about: {} ({}).\n",
                domain,
                domain.description()
            ),
            _ => String::new(),
        };

        format!(
            r#"Policy excerpt (section {ordinal}):
{hint}
---
{text}
---

For each requirement in the excerpt, return an object with:
- "requirement_text": the requirement as stated (required)
- "data_fields": snake_case names of the data needed to check it (required)
- "agent_name": short name for the check
- "description": one sentence describing what is checked
- "priority": "critical" for must/shall/mandatory, "high" for should/important, otherwise "medium" or "low"

Add when applicable:
- numeric limits: "threshold_value", "threshold_type" (min/max/exact/range), "upper_value" (range only), "unit"
- yes/no conditions: "expected_value", "verification_method"
- weighted scoring models: "scoring_factors" (factor -> weight), "score_range" ([min, max])
- judgment calls: "assessment_criteria" (list)
- "applicable_products" and "exceptions" if the text names them

Return: {{"requirements": [ ... ]}}
Return {{"requirements": []}} if the excerpt contains no requirements."#,
            ordinal = chunk.ordinal,
            hint = hint,
            text = chunk.text,
        )
    }

    /// System prompt for assessment data extraction
    pub fn data_extraction_system() -> &'static str {
        r#"You are a meticulous document reviewer extracting data points for a compliance assessment.
Report only values that appear in the document. Never guess.
When a value is not present, omit the field.
Respond with JSON only."#
    }

    /// User prompt for extracting the given fields from an assessment document
    pub fn data_extraction_prompt(document_text: &str, fields: &[String]) -> String {
        let field_list = fields
            .iter()
            .map(|f| format!("- {}", f))
            .collect::<Vec<_>>()
            .join("\n");

        format!(
            r#"Extract the following data fields from the document below:
{field_list}

Document:
---
{document_text}
---

Return: {{"fields": {{"field_name": {{"value": <number|string|boolean>, "confidence": 0.0-1.0, "source_location": "where it was found"}}}}}}
Use plain numbers for numeric values (43.5 rather than "43.5%")."#,
            field_list = field_list,
            document_text = document_text,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::entities::SourceSpan;

    fn chunk() -> DocumentChunk {
        DocumentChunk {
            id: "chunk-0002".to_string(),
            ordinal: 2,
            text: "Credit score must be at least 650.".to_string(),
            approx_token_count: 9,
            source_span: SourceSpan { start: 0, end: 34 },
        }
    }

    #[test]
    fn test_extraction_prompt_contains_chunk() {
        let prompt = PromptTemplate::extraction_prompt(&chunk(), None);
        assert!(prompt.contains("section 2"));
        assert!(prompt.contains("Credit score must be at least 650."));
        assert!(prompt.contains("\"requirements\""));
        assert!(!prompt.contains("expected to be mostly about"));
    }

    #[test]
    fn test_extraction_prompt_with_hint() {
        let prompt = PromptTemplate::extraction_prompt(&chunk(), Some(PolicyDomain::Financial));
        assert!(prompt.contains("mostly about: financial"));

        let general = PromptTemplate::extraction_prompt(&chunk(), Some(PolicyDomain::General));
        assert!(!general.contains("mostly about"));
    }

    #[test]
    fn test_data_extraction_prompt_lists_fields() {
        let fields = vec!["credit_score".to_string(), "dti".to_string()];
        let prompt = PromptTemplate::data_extraction_prompt("FICO: 720", &fields);
        assert!(prompt.contains("- credit_score\n- dti"));
        assert!(prompt.contains("FICO: 720"));
    }
}
