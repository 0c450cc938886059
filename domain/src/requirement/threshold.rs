//! Numeric comparator detection for threshold requirements.
//!
//! Recognizes a comparator phrase followed by a number ("at least 650",
//! "must not exceed 43%", "DSCR >= 1.25x", "minimum credit score of 620"),
//! a trailing comparator ("18 years or older") and ranges
//! ("between 2 and 5 years"). The unit is optional.

use crate::agent::spec::ThresholdParams;
use crate::agent::value_objects::ThresholdType;
use regex::{Captures, Regex};
use std::sync::LazyLock;

/// Words allowed between a comparator and its number
/// ("minimum credit score of 620").
const MAX_SKIPPED_WORDS: usize = 4;

/// A word skipped on the way to a number. Words holding digits or ending a
/// sentence stop the search.
const SKIPPED_WORD: &str = r"[^\s0-9]*[^\s0-9.;!?]";

/// Unit words read after a number; the last three are multipliers.
const UNIT_WORDS: &str = "percent|years?|months?|days?|times|bps|points|thousand|million|billion";

/// Prefix comparators. The earliest match wins, then the longest phrase.
const PREFIX_COMPARATORS: &[(&str, ThresholdType)] = &[
    ("greater than or equal to", ThresholdType::Min),
    ("less than or equal to", ThresholdType::Max),
    ("no less than", ThresholdType::Min),
    ("not less than", ThresholdType::Min),
    ("no fewer than", ThresholdType::Min),
    ("at least", ThresholdType::Min),
    ("minimum", ThresholdType::Min),
    ("more than", ThresholdType::Min),
    ("greater than", ThresholdType::Min),
    ("above", ThresholdType::Min),
    ("exceed", ThresholdType::Min),
    ("exceeds", ThresholdType::Min),
    (">=", ThresholdType::Min),
    ("≥", ThresholdType::Min),
    (">", ThresholdType::Min),
    ("no more than", ThresholdType::Max),
    ("not more than", ThresholdType::Max),
    ("no greater than", ThresholdType::Max),
    ("not to exceed", ThresholdType::Max),
    ("cannot exceed", ThresholdType::Max),
    ("not exceed", ThresholdType::Max),
    ("at most", ThresholdType::Max),
    ("maximum", ThresholdType::Max),
    ("less than", ThresholdType::Max),
    ("fewer than", ThresholdType::Max),
    ("below", ThresholdType::Max),
    ("under", ThresholdType::Max),
    ("up to", ThresholdType::Max),
    ("within", ThresholdType::Max),
    ("<=", ThresholdType::Max),
    ("≤", ThresholdType::Max),
    ("<", ThresholdType::Max),
    ("exactly", ThresholdType::Exact),
    ("equal to", ThresholdType::Exact),
    ("equals", ThresholdType::Exact),
    ("=", ThresholdType::Exact),
];

/// Comparators written after the number ("650 or higher").
const SUFFIX_COMPARATORS: &[(&str, ThresholdType)] = &[
    ("or more", ThresholdType::Min),
    ("or greater", ThresholdType::Min),
    ("or higher", ThresholdType::Min),
    ("or older", ThresholdType::Min),
    ("or above", ThresholdType::Min),
    ("or less", ThresholdType::Max),
    ("or fewer", ThresholdType::Max),
    ("or lower", ThresholdType::Max),
    ("or below", ThresholdType::Max),
];

static PREFIX_RE: LazyLock<Regex> = LazyLock::new(|| {
    let pattern = format!(
        r"(?P<cmp>{})[\s:]*(?:{SKIPPED_WORD}[\s:]+){{0,{MAX_SKIPPED_WORDS}}}?{}",
        comparator_alternation(PREFIX_COMPARATORS),
        number_pattern("n"),
    );
    Regex::new(&pattern).expect("Invalid prefix comparator pattern")
});

static SUFFIX_RE: LazyLock<Regex> = LazyLock::new(|| {
    let pattern = format!(
        r"{}(?:[\s:]+{SKIPPED_WORD}){{0,{MAX_SKIPPED_WORDS}}}?\s+(?P<cmp>{})",
        number_pattern("n"),
        comparator_alternation(SUFFIX_COMPARATORS),
    );
    Regex::new(&pattern).expect("Invalid suffix comparator pattern")
});

static RANGE_RE: LazyLock<Regex> = LazyLock::new(|| {
    let pattern = format!(
        r"\bbetween\b[\s:]*(?:{SKIPPED_WORD}[\s:]+){{0,2}}?{}\s*(?:and|to|-)[\s:]*{}",
        number_pattern("lo"),
        number_pattern("hi"),
    );
    Regex::new(&pattern).expect("Invalid range pattern")
});

/// A threshold found in requirement text.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedThreshold {
    pub threshold_type: ThresholdType,
    pub value: f64,
    pub upper_value: Option<f64>,
    pub unit: Option<String>,
}

impl ParsedThreshold {
    pub fn into_params(self) -> ThresholdParams {
        let mut params = match (self.threshold_type, self.upper_value) {
            (ThresholdType::Range, Some(upper)) => ThresholdParams::range(self.value, upper),
            (kind, _) => ThresholdParams::new(kind, self.value),
        };
        params.unit = self.unit;
        params
    }
}

/// A number read from text.
#[derive(Debug, Clone, PartialEq)]
struct Quantity {
    value: f64,
    unit: Option<String>,
}

/// Find the first threshold in `text`.
pub fn parse_threshold(text: &str) -> Option<ParsedThreshold> {
    let lower = text.to_lowercase();
    parse_range(&lower)
        .or_else(|| parse_comparator(&PREFIX_RE, PREFIX_COMPARATORS, &lower))
        .or_else(|| parse_comparator(&SUFFIX_RE, SUFFIX_COMPARATORS, &lower))
}

fn parse_comparator(
    re: &Regex,
    table: &[(&str, ThresholdType)],
    lower: &str,
) -> Option<ParsedThreshold> {
    let caps = re.captures(lower)?;
    let kind = comparator_kind(table, caps.name("cmp")?.as_str())?;
    let quantity = quantity(&caps, "n")?;
    Some(ParsedThreshold {
        threshold_type: kind,
        value: quantity.value,
        upper_value: None,
        unit: quantity.unit,
    })
}

fn parse_range(lower: &str) -> Option<ParsedThreshold> {
    let caps = RANGE_RE.captures(lower)?;
    let low = quantity(&caps, "lo")?;
    let high = quantity(&caps, "hi")?;
    Some(ParsedThreshold {
        threshold_type: ThresholdType::Range,
        value: low.value.min(high.value),
        upper_value: Some(low.value.max(high.value)),
        unit: high.unit.or(low.unit),
    })
}

/// Alternation over `table`, longest phrase first. Alphabetic phrases
/// must sit on word boundaries; symbols match anywhere.
fn comparator_alternation(table: &[(&str, ThresholdType)]) -> String {
    let mut phrases: Vec<&str> = table.iter().map(|(phrase, _)| *phrase).collect();
    phrases.sort_by_key(|phrase| std::cmp::Reverse(phrase.len()));
    phrases
        .into_iter()
        .map(|phrase| {
            if phrase.starts_with(char::is_alphabetic) {
                let words: Vec<String> = phrase.split_whitespace().map(regex::escape).collect();
                format!(r"\b{}\b", words.join(r"\s+"))
            } else {
                regex::escape(phrase)
            }
        })
        .collect::<Vec<_>>()
        .join("|")
}

fn comparator_kind(table: &[(&str, ThresholdType)], matched: &str) -> Option<ThresholdType> {
    let normalized = matched.split_whitespace().collect::<Vec<_>>().join(" ");
    table
        .iter()
        .find(|(phrase, _)| *phrase == normalized)
        .map(|(_, kind)| *kind)
}

/// A number with optional currency, attached suffix, and unit word. Group
/// names carry `tag` so one pattern can hold two numbers.
fn number_pattern(tag: &str) -> String {
    format!(
        concat!(
            r"(?P<{t}_cur>\$)?",
            r"(?P<{t}_num>[0-9]+(?:,[0-9]+)*(?:\.[0-9]+)?)",
            r"(?P<{t}_suffix>%|[xkm]\b)?",
            r"(?:\s*(?P<{t}_word>{units})\b)?",
        ),
        t = tag,
        units = UNIT_WORDS,
    )
}

fn group<'h>(caps: &Captures<'h>, tag: &str, name: &str) -> Option<&'h str> {
    caps.name(&format!("{tag}_{name}")).map(|m| m.as_str())
}

fn quantity(caps: &Captures<'_>, tag: &str) -> Option<Quantity> {
    let mut value: f64 = group(caps, tag, "num")?.replace(',', "").parse().ok()?;
    let mut unit = group(caps, tag, "cur").map(|_| "$".to_string());

    match group(caps, tag, "suffix") {
        Some("%") => unit = Some("%".to_string()),
        Some("x") => unit = Some("x".to_string()),
        Some("k") => value *= 1_000.0,
        Some("m") => value *= 1_000_000.0,
        _ => {}
    }

    let unit_word = match group(caps, tag, "word") {
        Some("percent") => Some("%"),
        Some("year" | "years") => Some("years"),
        Some("month" | "months") => Some("months"),
        Some("day" | "days") => Some("days"),
        Some("times") => Some("x"),
        Some("bps") => Some("bps"),
        Some("points") => Some("points"),
        Some("thousand") => {
            value *= 1_000.0;
            None
        }
        Some("million") => {
            value *= 1_000_000.0;
            None
        }
        Some("billion") => {
            value *= 1_000_000_000.0;
            None
        }
        _ => None,
    };
    // "%" from the number itself wins over a unit word
    if let Some(u) = unit_word
        && unit.as_deref() != Some("%")
    {
        unit = Some(u.to_string());
    }
    Some(Quantity { value, unit })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(text: &str) -> ParsedThreshold {
        parse_threshold(text).unwrap_or_else(|| panic!("no threshold in {:?}", text))
    }

    #[test]
    fn test_at_least_without_unit() {
        let t = parse("Credit score must be at least 650");
        assert_eq!(t.threshold_type, ThresholdType::Min);
        assert_eq!(t.value, 650.0);
        assert_eq!(t.unit, None);
    }

    #[test]
    fn test_not_exceed_percent() {
        let t = parse("Debt-to-income ratio must not exceed 43%.");
        assert_eq!(t.threshold_type, ThresholdType::Max);
        assert_eq!(t.value, 43.0);
        assert_eq!(t.unit.as_deref(), Some("%"));
    }

    #[test]
    fn test_cannot_exceed_is_max() {
        let t = parse("LTV cannot exceed 80.5 percent");
        assert_eq!(t.threshold_type, ThresholdType::Max);
        assert_eq!(t.value, 80.5);
        assert_eq!(t.unit.as_deref(), Some("%"));
    }

    #[test]
    fn test_symbol_comparators() {
        let t = parse("DSCR >= 1.25x");
        assert_eq!(t.threshold_type, ThresholdType::Min);
        assert_eq!(t.value, 1.25);
        assert_eq!(t.unit.as_deref(), Some("x"));

        let t = parse("LTV ≤ 80%");
        assert_eq!(t.threshold_type, ThresholdType::Max);
    }

    #[test]
    fn test_comparator_with_skipped_words() {
        let t = parse("Minimum credit score of 620 for FHA loans");
        assert_eq!(t.threshold_type, ThresholdType::Min);
        assert_eq!(t.value, 620.0);
    }

    #[test]
    fn test_no_less_than_beats_less_than() {
        let t = parse("Reserves of no less than 6 months");
        assert_eq!(t.threshold_type, ThresholdType::Min);
        assert_eq!(t.value, 6.0);
        assert_eq!(t.unit.as_deref(), Some("months"));
    }

    #[test]
    fn test_currency_and_multiplier() {
        let t = parse("Net worth must be at least $1,500,000");
        assert_eq!(t.value, 1_500_000.0);
        assert_eq!(t.unit.as_deref(), Some("$"));

        let t = parse("Loan amount up to $2 million");
        assert_eq!(t.threshold_type, ThresholdType::Max);
        assert_eq!(t.value, 2_000_000.0);
    }

    #[test]
    fn test_range() {
        let t = parse("Term must be between 5 and 30 years");
        assert_eq!(t.threshold_type, ThresholdType::Range);
        assert_eq!(t.value, 5.0);
        assert_eq!(t.upper_value, Some(30.0));
        assert_eq!(t.unit.as_deref(), Some("years"));
    }

    #[test]
    fn test_suffix_comparator() {
        let t = parse("Borrowers must be 18 years or older");
        assert_eq!(t.threshold_type, ThresholdType::Min);
        assert_eq!(t.value, 18.0);
    }

    #[test]
    fn test_suffix_after_unit_word_and_no_spacing() {
        let t = parse("Credit score of 680 points or higher");
        assert_eq!(t.threshold_type, ThresholdType::Min);
        assert_eq!(t.value, 680.0);
        assert_eq!(t.unit.as_deref(), Some("points"));

        let t = parse("DSCR>=1.25");
        assert_eq!(t.threshold_type, ThresholdType::Min);
        assert_eq!(t.value, 1.25);
    }

    #[test]
    fn test_no_threshold() {
        assert!(parse_threshold("Applicant must provide two years of tax returns").is_none());
        assert!(parse_threshold("At least one guarantor is required").is_none());
        assert!(parse_threshold("Credit score must be reviewed").is_none());
    }

    #[test]
    fn test_comparator_inside_word_is_ignored() {
        // "under" inside "underwriting", "above" inside nothing
        assert!(parse_threshold("Underwriting 2024 guidelines apply").is_none());
    }

    #[test]
    fn test_into_params() {
        let params = parse("between 30 and 10 days").into_params();
        assert_eq!(params.threshold_value, 10.0);
        assert_eq!(params.upper_value, Some(30.0));
        assert_eq!(params.unit.as_deref(), Some("days"));
    }
}
