//! Keyword tables and whole-word matching used by the classifier.

use crate::agent::value_objects::PolicyDomain;
use regex::Regex;
use std::sync::LazyLock;

/// Per-domain keyword table, in [`PolicyDomain::DECLARED`] order.
pub const DOMAIN_KEYWORDS: [(PolicyDomain, &[&str]); 10] = [
    (
        PolicyDomain::Financial,
        &[
            "financial", "ratio", "revenue", "profit", "cash", "debt", "equity", "balance",
            "income", "credit", "loan",
        ],
    ),
    (
        PolicyDomain::Esg,
        &[
            "esg", "environmental", "social", "governance", "sustainability", "carbon",
            "emission", "diversity", "ethics",
        ],
    ),
    (
        PolicyDomain::Regulatory,
        &[
            "regulatory", "compliance", "legal", "law", "regulation", "audit", "requirement",
            "standard",
        ],
    ),
    (
        PolicyDomain::Risk,
        &[
            "risk", "volatility", "exposure", "hedge", "var", "stress", "scenario", "probability",
        ],
    ),
    (
        PolicyDomain::Operational,
        &[
            "operational", "process", "efficiency", "productivity", "quality", "performance",
            "kpi",
        ],
    ),
    (
        PolicyDomain::Market,
        &[
            "market", "competitive", "industry", "peer", "benchmark", "analysis", "comparison",
        ],
    ),
    (
        PolicyDomain::Strategic,
        &[
            "strategic", "business", "growth", "investment", "merger", "acquisition",
            "partnership",
        ],
    ),
    (
        PolicyDomain::Hr,
        &[
            "hr", "human", "employee", "staff", "training", "talent", "compensation", "benefits",
        ],
    ),
    (
        PolicyDomain::Technology,
        &[
            "technology", "tech", "it", "digital", "cyber", "security", "data", "system",
        ],
    ),
    (
        PolicyDomain::SupplyChain,
        &[
            "supply", "chain", "vendor", "supplier", "procurement", "logistics", "inventory",
        ],
    ),
];

/// Phrases indicating sequential analysis steps.
pub const MULTI_STEP_INDICATORS: &[&str] = &[
    "analyze and then",
    "first check",
    "step by step",
    "multiple criteria",
    "workflow",
    "sequential",
    "followed by",
    "then verify",
    "then confirm",
    "prior to approval",
];

/// Phrases indicating a benchmark or peer comparison.
pub const COMPARATIVE_INDICATORS: &[&str] = &[
    "compare",
    "compared",
    "benchmark",
    "peer",
    "industry average",
    "relative to",
    "versus",
    "quartile",
    "percentile",
    "above average",
    "below average",
];

/// Phrases indicating a calculation beyond a single comparison.
pub const QUANTITATIVE_INDICATORS: &[&str] = &[
    "calculate",
    "calculated",
    "ratio",
    "percentage",
    "statistical",
    "variance",
    "correlation",
    "regression",
    "formula",
    "equation",
    "divided by",
    "sum of",
    "average",
];

/// Phrases indicating a yes/no expected outcome.
pub const BINARY_INDICATORS: &[&str] = &[
    "yes no",
    "must have",
    "must provide",
    "must submit",
    "must obtain",
    "must maintain",
    "must be documented",
    "must be verified",
    "is required",
    "are required",
    "required to",
    "mandatory",
    "must include",
];

/// Phrases that make the expected outcome negative ("no").
pub const PROHIBITION_INDICATORS: &[&str] = &[
    "prohibited",
    "not permitted",
    "not allowed",
    "must not have",
    "may not",
    "ineligible",
];

/// Anything that is not a letter or digit separates words, so
/// `debt-to-income` and `credit_score` both split.
const SEPARATOR: &str = r"[^\p{Alphabetic}\p{N}]";

/// Indicator phrase families the classifier looks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Indicator {
    MultiStep,
    Comparative,
    Quantitative,
    Binary,
    Prohibition,
}

impl Indicator {
    pub const ALL: [Indicator; 5] = [
        Indicator::MultiStep,
        Indicator::Comparative,
        Indicator::Quantitative,
        Indicator::Binary,
        Indicator::Prohibition,
    ];

    pub fn phrases(self) -> &'static [&'static str] {
        match self {
            Indicator::MultiStep => MULTI_STEP_INDICATORS,
            Indicator::Comparative => COMPARATIVE_INDICATORS,
            Indicator::Quantitative => QUANTITATIVE_INDICATORS,
            Indicator::Binary => BINARY_INDICATORS,
            Indicator::Prohibition => PROHIBITION_INDICATORS,
        }
    }

    /// Whether any phrase of this family occurs in `text` as whole words.
    pub fn found_in(self, text: &str) -> bool {
        INDICATOR_PATTERNS[self as usize].is_match(text)
    }
}

static INDICATOR_PATTERNS: LazyLock<[Regex; 5]> =
    LazyLock::new(|| Indicator::ALL.map(|indicator| phrase_set(indicator.phrases())));

/// One pattern per keyword, so a domain scores distinct keywords.
static DOMAIN_PATTERNS: LazyLock<Vec<(PolicyDomain, Vec<Regex>)>> = LazyLock::new(|| {
    DOMAIN_KEYWORDS
        .iter()
        .map(|(domain, keywords)| {
            let patterns: Vec<Regex> = keywords.iter().map(|kw| phrase_set(&[*kw])).collect();
            (*domain, patterns)
        })
        .collect()
});

/// Case-insensitive whole-word matcher for any of `phrases`. Each word
/// also matches its plural (`word + "s"`).
fn phrase_set(phrases: &[&str]) -> Regex {
    let alternation = phrases
        .iter()
        .map(|phrase| {
            phrase
                .split_whitespace()
                .map(|word| format!("{}s?", regex::escape(word)))
                .collect::<Vec<_>>()
                .join(&format!("{SEPARATOR}+"))
        })
        .collect::<Vec<_>>()
        .join("|");
    Regex::new(&format!("(?i)(?:^|{SEPARATOR})(?:{alternation})(?:{SEPARATOR}|$)"))
        .expect("Invalid keyword pattern")
}

/// Number of `patterns` that match `text`.
pub fn keyword_score(text: &str, patterns: &[Regex]) -> usize {
    patterns.iter().filter(|re| re.is_match(text)).count()
}

/// Highest-scoring domain; ties go to the domain declared first.
/// Returns [`PolicyDomain::General`] when no keyword matches.
pub fn score_domain(text: &str) -> PolicyDomain {
    let mut best = PolicyDomain::General;
    let mut best_score = 0;
    for (domain, patterns) in DOMAIN_PATTERNS.iter() {
        let score = keyword_score(text, patterns);
        if score > best_score {
            best = *domain;
            best_score = score;
        }
    }
    best
}
