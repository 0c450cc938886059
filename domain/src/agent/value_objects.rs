//! Value objects for compliance agents.
//!
//! Small closed enums that label an [`AgentSpec`](super::spec::AgentSpec):
//! which evaluator archetype applies, which policy domain it belongs to,
//! how complex the analysis is, and how much a failure matters.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Structural category of a compliance check.
///
/// Determines which archetype evaluator the agent factory selects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Archetype {
    /// Numeric limit: minimums, maximums, exact values, ranges
    Threshold,
    /// Binary condition: documentation present, status equals, yes/no
    Criteria,
    /// Weighted multi-factor scoring model
    Score,
    /// Judgment-based assessment
    Qualitative,
}

impl Archetype {
    /// All archetypes in catalog display order.
    pub const ALL: [Archetype; 4] = [
        Archetype::Threshold,
        Archetype::Criteria,
        Archetype::Score,
        Archetype::Qualitative,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Archetype::Threshold => "threshold",
            Archetype::Criteria => "criteria",
            Archetype::Score => "score",
            Archetype::Qualitative => "qualitative",
        }
    }

    /// Two-letter prefix used in agent ids (`TH-…`, `CR-…`).
    pub fn id_prefix(&self) -> &'static str {
        match self {
            Archetype::Threshold => "TH",
            Archetype::Criteria => "CR",
            Archetype::Score => "SC",
            Archetype::Qualitative => "QL",
        }
    }
}

impl fmt::Display for Archetype {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for Archetype {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "threshold" | "th" => Ok(Archetype::Threshold),
            "criteria" | "cr" => Ok(Archetype::Criteria),
            "score" | "sc" => Ok(Archetype::Score),
            "qualitative" | "ql" => Ok(Archetype::Qualitative),
            _ => Err(format!("Invalid archetype: {}", s)),
        }
    }
}

/// Analysis mode a requirement needs.
///
/// Drives the universal evaluator's prompt selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Complexity {
    #[default]
    Simple,
    /// Needs a calculation beyond a single comparison
    Quantitative,
    /// References a benchmark or peer comparison
    Comparative,
    /// References sequential analysis steps
    MultiStep,
}

impl Complexity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Complexity::Simple => "simple",
            Complexity::Quantitative => "quantitative",
            Complexity::Comparative => "comparative",
            Complexity::MultiStep => "multi_step",
        }
    }
}

impl fmt::Display for Complexity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for Complexity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace('-', "_").as_str() {
            "simple" => Ok(Complexity::Simple),
            "quantitative" => Ok(Complexity::Quantitative),
            "comparative" => Ok(Complexity::Comparative),
            "multi_step" | "multistep" => Ok(Complexity::MultiStep),
            _ => Err(format!("Invalid complexity: {}", s)),
        }
    }
}

/// How much a failed check matters.
///
/// Ordering is ascending by severity, so `Critical` is the maximum.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    Low,
    #[default]
    Medium,
    High,
    Critical,
}

impl Priority {
    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::Low => "low",
            Priority::Medium => "medium",
            Priority::High => "high",
            Priority::Critical => "critical",
        }
    }

    /// Whether failures at this priority produce recommendations.
    pub fn is_actionable(&self) -> bool {
        matches!(self, Priority::Critical | Priority::High)
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for Priority {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "low" => Ok(Priority::Low),
            "medium" | "med" => Ok(Priority::Medium),
            "high" => Ok(Priority::High),
            "critical" | "crit" => Ok(Priority::Critical),
            _ => Err(format!("Invalid priority: {}", s)),
        }
    }
}

/// Expertise area a requirement belongs to.
///
/// Declaration order matters: the classifier breaks keyword-score ties
/// in favour of the domain declared first (see [`PolicyDomain::DECLARED`]).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PolicyDomain {
    Financial,
    Esg,
    Regulatory,
    Risk,
    Operational,
    Market,
    Strategic,
    Hr,
    Technology,
    SupplyChain,
    #[default]
    General,
}

impl PolicyDomain {
    /// Keyword-scored domains in tie-break order. `General` is the fallback
    /// and never scored.
    pub const DECLARED: [PolicyDomain; 10] = [
        PolicyDomain::Financial,
        PolicyDomain::Esg,
        PolicyDomain::Regulatory,
        PolicyDomain::Risk,
        PolicyDomain::Operational,
        PolicyDomain::Market,
        PolicyDomain::Strategic,
        PolicyDomain::Hr,
        PolicyDomain::Technology,
        PolicyDomain::SupplyChain,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            PolicyDomain::Financial => "financial",
            PolicyDomain::Esg => "esg",
            PolicyDomain::Regulatory => "regulatory",
            PolicyDomain::Risk => "risk",
            PolicyDomain::Operational => "operational",
            PolicyDomain::Market => "market",
            PolicyDomain::Strategic => "strategic",
            PolicyDomain::Hr => "hr",
            PolicyDomain::Technology => "technology",
            PolicyDomain::SupplyChain => "supply_chain",
            PolicyDomain::General => "general",
        }
    }

    /// Short capability blurb, shown when listing supported domains.
    pub fn description(&self) -> &'static str {
        match self {
            PolicyDomain::Financial => "Financial analysis, ratios, credit assessment, valuation",
            PolicyDomain::Esg => "Environmental, Social, Governance compliance and assessment",
            PolicyDomain::Regulatory => "Legal compliance, regulatory requirements, audit checks",
            PolicyDomain::Risk => "Risk assessment, exposure analysis, stress testing",
            PolicyDomain::Operational => "Process efficiency, performance metrics, operational KPIs",
            PolicyDomain::Market => "Market analysis, competitive positioning, benchmarking",
            PolicyDomain::Strategic => "Strategic planning, business analysis, investment assessment",
            PolicyDomain::Hr => "Human resources, talent management, compensation analysis",
            PolicyDomain::Technology => "Technology assessment, cybersecurity, digital transformation",
            PolicyDomain::SupplyChain => "Supply chain analysis, vendor assessment, procurement",
            PolicyDomain::General => "General purpose analysis for any domain",
        }
    }
}

impl fmt::Display for PolicyDomain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for PolicyDomain {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase().replace(['-', ' '], "_");
        if normalized == "general" {
            return Ok(PolicyDomain::General);
        }
        PolicyDomain::DECLARED
            .into_iter()
            .find(|d| d.as_str() == normalized)
            .ok_or_else(|| format!("Invalid domain: {}", s))
    }
}

/// Direction of a numeric threshold comparison.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ThresholdType {
    /// value >= threshold
    Min,
    /// value <= threshold
    Max,
    /// value == threshold
    Exact,
    /// threshold <= value <= upper
    Range,
}

impl ThresholdType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ThresholdType::Min => "min",
            ThresholdType::Max => "max",
            ThresholdType::Exact => "exact",
            ThresholdType::Range => "range",
        }
    }
}

impl fmt::Display for ThresholdType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for ThresholdType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "min" | "minimum" | ">=" | "≥" => Ok(ThresholdType::Min),
            "max" | "maximum" | "<=" | "≤" => Ok(ThresholdType::Max),
            "exact" | "equal" | "=" | "==" => Ok(ThresholdType::Exact),
            "range" | "between" => Ok(ThresholdType::Range),
            _ => Err(format!("Invalid threshold type: {}", s)),
        }
    }
}

/// Provenance of an agent verdict.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Origin {
    /// The evaluator obtained matching authoritative data from the rule graph
    RuleGraph,
    /// The verdict rests on deterministic checks and/or the reasoning service only
    ReasoningOnly,
}

impl Origin {
    pub fn as_str(&self) -> &'static str {
        match self {
            Origin::RuleGraph => "rule_graph",
            Origin::ReasoningOnly => "reasoning_only",
        }
    }
}

impl fmt::Display for Origin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Which evaluator variant produced a result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EvaluatorKind {
    Threshold,
    Criteria,
    Score,
    Qualitative,
    Universal,
    Hybrid,
}

impl EvaluatorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EvaluatorKind::Threshold => "threshold",
            EvaluatorKind::Criteria => "criteria",
            EvaluatorKind::Score => "score",
            EvaluatorKind::Qualitative => "qualitative",
            EvaluatorKind::Universal => "universal",
            EvaluatorKind::Hybrid => "hybrid",
        }
    }
}

impl From<Archetype> for EvaluatorKind {
    fn from(archetype: Archetype) -> Self {
        match archetype {
            Archetype::Threshold => EvaluatorKind::Threshold,
            Archetype::Criteria => EvaluatorKind::Criteria,
            Archetype::Score => EvaluatorKind::Score,
            Archetype::Qualitative => EvaluatorKind::Qualitative,
        }
    }
}

impl fmt::Display for EvaluatorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
