//! Agent specifications (compliance checks).
//!
//! An [`AgentSpec`] is produced once by the classifier and is read-only
//! afterwards: the agent factory and the orchestrator only borrow it.

use super::value_objects::{Archetype, Complexity, PolicyDomain, Priority, ThresholdType};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::{BTreeMap, BTreeSet};

/// Number of hex characters of the content hash kept in an agent id.
const AGENT_ID_HASH_LEN: usize = 12;

/// Relative tolerance used for `exact` threshold comparisons.
const EXACT_TOLERANCE: f64 = 1e-9;

/// Parameters for a numeric threshold check.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThresholdParams {
    pub threshold_type: ThresholdType,
    /// Limit value; the lower bound for `range`
    pub threshold_value: f64,
    /// Upper bound, only for `range`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub upper_value: Option<f64>,
    /// Unit as written in the policy ("%", "$", "years"); `None` for plain numbers
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
}

impl ThresholdParams {
    pub fn new(threshold_type: ThresholdType, threshold_value: f64) -> Self {
        Self {
            threshold_type,
            threshold_value,
            upper_value: None,
            unit: None,
        }
    }

    pub fn range(lower: f64, upper: f64) -> Self {
        Self {
            threshold_type: ThresholdType::Range,
            threshold_value: lower.min(upper),
            upper_value: Some(lower.max(upper)),
            unit: None,
        }
    }

    pub fn with_unit(mut self, unit: impl Into<String>) -> Self {
        self.unit = Some(unit.into());
        self
    }

    /// Whether `value` satisfies this threshold.
    pub fn is_satisfied_by(&self, value: f64) -> bool {
        match self.threshold_type {
            ThresholdType::Min => value >= self.threshold_value,
            ThresholdType::Max => value <= self.threshold_value,
            ThresholdType::Exact => {
                let scale = self.threshold_value.abs().max(1.0);
                (value - self.threshold_value).abs() <= EXACT_TOLERANCE * scale
            }
            ThresholdType::Range => {
                let upper = self.upper_value.unwrap_or(self.threshold_value);
                value >= self.threshold_value && value <= upper
            }
        }
    }

    /// Human-readable comparison, e.g. `>= 650` or `between 2 and 5 years`.
    pub fn describe(&self) -> String {
        let unit = self
            .unit
            .as_deref()
            .map(|u| format!(" {}", u))
            .unwrap_or_default();
        match self.threshold_type {
            ThresholdType::Min => format!(">= {}{}", self.threshold_value, unit),
            ThresholdType::Max => format!("<= {}{}", self.threshold_value, unit),
            ThresholdType::Exact => format!("== {}{}", self.threshold_value, unit),
            ThresholdType::Range => format!(
                "between {} and {}{}",
                self.threshold_value,
                self.upper_value.unwrap_or(self.threshold_value),
                unit
            ),
        }
    }
}

/// Parameters for a binary criteria check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CriteriaParams {
    pub expected_value: String,
    pub verification_method: String,
}

/// Parameters for a weighted scoring model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreParams {
    /// factor name -> weight
    pub scoring_factors: BTreeMap<String, f64>,
    /// (min, max) of the produced score
    pub score_range: (f64, f64),
}

impl ScoreParams {
    pub fn total_weight(&self) -> f64 {
        self.scoring_factors.values().sum()
    }
}

/// Parameters for a judgment-based assessment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QualitativeParams {
    pub assessment_criteria: Vec<String>,
}

/// Archetype-specific parameters; the variant determines the archetype.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "archetype", rename_all = "snake_case")]
pub enum ArchetypeParams {
    Threshold(ThresholdParams),
    Criteria(CriteriaParams),
    Score(ScoreParams),
    Qualitative(QualitativeParams),
}

impl ArchetypeParams {
    pub fn archetype(&self) -> Archetype {
        match self {
            ArchetypeParams::Threshold(_) => Archetype::Threshold,
            ArchetypeParams::Criteria(_) => Archetype::Criteria,
            ArchetypeParams::Score(_) => Archetype::Score,
            ArchetypeParams::Qualitative(_) => Archetype::Qualitative,
        }
    }

    pub fn as_threshold(&self) -> Option<&ThresholdParams> {
        match self {
            ArchetypeParams::Threshold(p) => Some(p),
            _ => None,
        }
    }
}

/// A compliance check extracted from a policy document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentSpec {
    pub agent_id: String,
    pub agent_name: String,
    pub archetype: Archetype,
    pub domain: PolicyDomain,
    pub complexity: Complexity,
    pub description: String,
    pub requirement_text: String,
    pub data_fields: BTreeSet<String>,
    pub priority: Priority,
    pub archetype_params: ArchetypeParams,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub applicable_products: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub exceptions: Vec<String>,
    /// Ordinal of the chunk this requirement was extracted from
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_chunk: Option<usize>,
}

impl AgentSpec {
    /// Create a spec with a content-derived id and neutral labels.
    ///
    /// The classifier overrides domain, complexity and priority; tests and
    /// hand-written catalogs use the builder methods.
    pub fn new(
        agent_name: impl Into<String>,
        requirement_text: impl Into<String>,
        archetype_params: ArchetypeParams,
    ) -> Self {
        let agent_name = agent_name.into();
        let requirement_text = requirement_text.into();
        let archetype = archetype_params.archetype();
        Self {
            agent_id: Self::derive_id(&requirement_text, archetype),
            description: agent_name.clone(),
            agent_name,
            archetype,
            domain: PolicyDomain::General,
            complexity: Complexity::Simple,
            requirement_text,
            data_fields: BTreeSet::new(),
            priority: Priority::Medium,
            archetype_params,
            applicable_products: Vec::new(),
            exceptions: Vec::new(),
            source_chunk: None,
        }
    }

    /// Deterministic id: archetype prefix + truncated SHA-256 of the
    /// requirement text and archetype.
    ///
    /// Identical text classified to the same archetype always yields the
    /// same id.
    pub fn derive_id(requirement_text: &str, archetype: Archetype) -> String {
        let mut hasher = Sha256::new();
        hasher.update(requirement_text.trim().as_bytes());
        hasher.update([0u8]);
        hasher.update(archetype.as_str().as_bytes());
        let digest = hex::encode(hasher.finalize());
        format!("{}-{}", archetype.id_prefix(), &digest[..AGENT_ID_HASH_LEN])
    }

    // ==================== Builder Methods ====================

    pub fn with_id(mut self, agent_id: impl Into<String>) -> Self {
        self.agent_id = agent_id.into();
        self
    }

    pub fn with_domain(mut self, domain: PolicyDomain) -> Self {
        self.domain = domain;
        self
    }

    pub fn with_complexity(mut self, complexity: Complexity) -> Self {
        self.complexity = complexity;
        self
    }

    pub fn with_priority(mut self, priority: Priority) -> Self {
        self.priority = priority;
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_data_fields<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.data_fields = fields.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_source_chunk(mut self, ordinal: usize) -> Self {
        self.source_chunk = Some(ordinal);
        self
    }

    /// `archetype` agrees with the `archetype_params` variant.
    pub fn is_consistent(&self) -> bool {
        self.archetype == self.archetype_params.archetype()
    }

    /// Key used to look the requirement up in the rule graph.
    pub fn requirement_key(&self) -> String {
        self.requirement_text
            .split_whitespace()
            .collect::<Vec<_>>()
            .join(" ")
            .to_lowercase()
    }
}
