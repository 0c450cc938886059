//! Aggregation of agent results into a compliance summary.

use super::status::{Decision, OverallStatus};
use crate::agent::result::AgentResult;
use crate::agent::value_objects::Priority;
use serde::{Deserialize, Serialize};
use std::cmp::Reverse;

/// Default cap on the number of recommendations.
pub const DEFAULT_MAX_RECOMMENDATIONS: usize = 10;

/// Exact counts by verdict.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Statistics {
    pub passed_agents: usize,
    pub failed_agents: usize,
    pub inconclusive_agents: usize,
    /// passed / (passed + failed); 1.0 when nothing passed or failed
    pub pass_rate: f64,
}

impl Default for Statistics {
    fn default() -> Self {
        Self {
            passed_agents: 0,
            failed_agents: 0,
            inconclusive_agents: 0,
            pass_rate: 1.0,
        }
    }
}

/// Summary of one run's results.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComplianceSummary {
    pub total_agents: usize,
    pub statistics: Statistics,
    /// Mean confidence over all results; 0 when there are none
    pub average_confidence: f64,
    pub overall_status: OverallStatus,
    pub decision: Decision,
    pub recommendations: Vec<String>,
}

/// Reduce results to a summary. Pure; depends only on `results`.
pub fn summarize(results: &[AgentResult], max_recommendations: usize) -> ComplianceSummary {
    let mut stats = Statistics::default();
    let (mut critical, mut high, mut other) = (0, 0, 0);

    for result in results {
        match result.passed {
            Some(true) => stats.passed_agents += 1,
            Some(false) => {
                stats.failed_agents += 1;
                match result.agent_config.priority {
                    Priority::Critical => critical += 1,
                    Priority::High => high += 1,
                    _ => other += 1,
                }
            }
            None => stats.inconclusive_agents += 1,
        }
    }

    let decided = stats.passed_agents + stats.failed_agents;
    if decided > 0 {
        stats.pass_rate = stats.passed_agents as f64 / decided as f64;
    }

    let average_confidence = if results.is_empty() {
        0.0
    } else {
        results.iter().map(|r| r.confidence).sum::<f64>() / results.len() as f64
    };

    let overall_status = OverallStatus::from_failures(critical, high, other);

    ComplianceSummary {
        total_agents: results.len(),
        statistics: stats,
        average_confidence,
        overall_status,
        decision: overall_status.decision(),
        recommendations: recommendations(results, max_recommendations),
    }
}

/// Failed critical/high agents and every inconclusive agent, ordered by
/// priority (critical first) then agent id. Whole items beyond the cap are
/// dropped.
fn recommendations(results: &[AgentResult], max: usize) -> Vec<String> {
    let mut actionable: Vec<&AgentResult> = results
        .iter()
        .filter(|r| match r.passed {
            Some(false) => r.agent_config.priority.is_actionable(),
            None => true,
            Some(true) => false,
        })
        .collect();

    actionable.sort_by(|a, b| {
        (Reverse(a.agent_config.priority), &a.agent_id)
            .cmp(&(Reverse(b.agent_config.priority), &b.agent_id))
    });

    actionable
        .into_iter()
        .take(max)
        .map(recommendation_message)
        .collect()
}

fn recommendation_message(result: &AgentResult) -> String {
    let tag = result.agent_config.priority.as_str().to_uppercase();
    let name = &result.agent_config.agent_name;
    if result.is_inconclusive() {
        format!(
            "[{}] Provide data to evaluate {} ({}): {}",
            tag, name, result.agent_id, result.reason
        )
    } else {
        format!("[{}] {} ({}): {}", tag, name, result.agent_id, result.reason)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::spec::{AgentSpec, ArchetypeParams, CriteriaParams};
    use crate::agent::value_objects::EvaluatorKind;

    fn spec(id: &str, priority: Priority) -> AgentSpec {
        AgentSpec::new(
            format!("Agent {}", id),
            format!("Requirement {}", id),
            ArchetypeParams::Criteria(CriteriaParams {
                expected_value: "yes".to_string(),
                verification_method: "document review".to_string(),
            }),
        )
        .with_id(id)
        .with_priority(priority)
    }

    fn result(id: &str, priority: Priority, passed: Option<bool>) -> AgentResult {
        AgentResult::verdict(
            &spec(id, priority),
            passed,
            if passed.is_some() { 0.8 } else { 0.0 },
            format!("reason {}", id),
            EvaluatorKind::Criteria,
        )
    }

    #[test]
    fn test_empty_summary() {
        let summary = summarize(&[], DEFAULT_MAX_RECOMMENDATIONS);
        assert_eq!(summary.total_agents, 0);
        assert_eq!(summary.statistics.passed_agents, 0);
        assert_eq!(summary.statistics.failed_agents, 0);
        assert_eq!(summary.statistics.inconclusive_agents, 0);
        assert_eq!(summary.statistics.pass_rate, 1.0);
        assert_eq!(summary.average_confidence, 0.0);
        assert!(summary.recommendations.is_empty());
        assert_eq!(summary.overall_status, OverallStatus::Pass);
    }

    #[test]
    fn test_all_inconclusive_keeps_pass_rate_convention() {
        let results = vec![result("A", Priority::Low, None)];
        let summary = summarize(&results, DEFAULT_MAX_RECOMMENDATIONS);
        assert_eq!(summary.statistics.inconclusive_agents, 1);
        assert_eq!(summary.statistics.pass_rate, 1.0);
    }

    #[test]
    fn test_three_agent_scenario() {
        let results = vec![
            result("TH-aaa", Priority::High, Some(true)),
            result("CR-bbb", Priority::Critical, Some(false)),
            result("QL-ccc", Priority::Medium, None),
        ];
        let summary = summarize(&results, DEFAULT_MAX_RECOMMENDATIONS);

        assert_eq!(summary.statistics.passed_agents, 1);
        assert_eq!(summary.statistics.failed_agents, 1);
        assert_eq!(summary.statistics.inconclusive_agents, 1);
        assert_eq!(summary.statistics.pass_rate, 0.5);
        assert_eq!(summary.overall_status, OverallStatus::FailCritical);
        assert_eq!(summary.decision, Decision::Deny);

        assert_eq!(summary.recommendations.len(), 2);
        assert_eq!(
            summary.recommendations[0],
            "[CRITICAL] Agent CR-bbb (CR-bbb): reason CR-bbb"
        );
        assert_eq!(
            summary.recommendations[1],
            "[MEDIUM] Provide data to evaluate Agent QL-ccc (QL-ccc): reason QL-ccc"
        );
    }

    #[test]
    fn test_inconclusive_recommendation_carries_agent_priority() {
        let results = vec![
            result("CR-hi", Priority::High, None),
            result("QL-lo", Priority::Low, None),
        ];
        let summary = summarize(&results, DEFAULT_MAX_RECOMMENDATIONS);
        assert_eq!(
            summary.recommendations,
            vec![
                "[HIGH] Provide data to evaluate Agent CR-hi (CR-hi): reason CR-hi".to_string(),
                "[LOW] Provide data to evaluate Agent QL-lo (QL-lo): reason QL-lo".to_string(),
            ]
        );
    }

    #[test]
    fn test_low_priority_failures_are_not_recommended() {
        let results = vec![
            result("A", Priority::Low, Some(false)),
            result("B", Priority::Medium, Some(false)),
        ];
        let summary = summarize(&results, DEFAULT_MAX_RECOMMENDATIONS);
        assert!(summary.recommendations.is_empty());
        assert_eq!(summary.overall_status, OverallStatus::PassWithConditions);
    }

    #[test]
    fn test_recommendation_order_and_cap() {
        let results = vec![
            result("TH-2", Priority::High, Some(false)),
            result("TH-1", Priority::High, Some(false)),
            result("CR-9", Priority::Critical, None),
            result("CR-3", Priority::Critical, Some(false)),
        ];
        let summary = summarize(&results, 3);
        assert_eq!(summary.recommendations.len(), 3);
        assert!(summary.recommendations[0].contains("(CR-3)"));
        assert!(summary.recommendations[1].contains("(CR-9)"));
        assert!(summary.recommendations[2].contains("(TH-1)"));
    }

    #[test]
    fn test_average_confidence() {
        let results = vec![
            result("A", Priority::Low, Some(true)),
            result("B", Priority::Low, None),
        ];
        let summary = summarize(&results, DEFAULT_MAX_RECOMMENDATIONS);
        assert!((summary.average_confidence - 0.4).abs() < 1e-9);
    }

    #[test]
    fn test_summarize_is_deterministic() {
        let results = vec![
            result("B", Priority::High, Some(false)),
            result("A", Priority::High, Some(false)),
        ];
        let mut reversed = results.clone();
        reversed.reverse();
        assert_eq!(
            summarize(&results, 10).recommendations,
            summarize(&reversed, 10).recommendations
        );
    }
}
