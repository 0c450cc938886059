//! Agent factory
//!
//! Maps an [`AgentSpec`] to the evaluator that runs it:
//!
//! 1. hybrid, when a hybrid evaluator is registered for the spec's domain
//!    and the rule graph returns a rule for its requirement key
//! 2. the archetype evaluator registered for the spec's archetype
//! 3. the universal evaluator
//!
//! Creation never calls the reasoning service.

use super::{
    CriteriaEvaluator, Evaluator, HybridEvaluator, QualitativeEvaluator, ReasoningClient,
    ScoreEvaluator, ThresholdEvaluator, UniversalEvaluator,
};
use crate::config::{PipelineConfig, RetryPolicy};
use crate::ports::reasoning_service::ReasoningService;
use crate::ports::rule_graph::RuleGraph;
use async_trait::async_trait;
use policy_domain::{AgentSpec, Archetype, PolicyDomain};
use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;
use tracing::{debug, warn};

/// Source of evaluators for the orchestrator.
#[async_trait]
pub trait EvaluatorProvider: Send + Sync {
    async fn create(&self, spec: &AgentSpec) -> Arc<dyn Evaluator>;
}

pub struct AgentFactory {
    reasoning: ReasoningClient,
    rule_graph: Arc<dyn RuleGraph>,
    archetype_evaluators: BTreeMap<Archetype, Arc<dyn Evaluator>>,
    hybrid_domains: BTreeSet<PolicyDomain>,
    universal: Arc<dyn Evaluator>,
}

impl AgentFactory {
    /// Factory with every archetype evaluator registered and no hybrid domains.
    pub fn new(
        reasoning: Arc<dyn ReasoningService>,
        rule_graph: Arc<dyn RuleGraph>,
        retry: RetryPolicy,
    ) -> Self {
        let reasoning = ReasoningClient::new(reasoning, retry);
        let mut factory = Self {
            universal: Arc::new(UniversalEvaluator::new(reasoning.clone())),
            reasoning,
            rule_graph,
            archetype_evaluators: BTreeMap::new(),
            hybrid_domains: BTreeSet::new(),
        };
        factory.register_archetypes(Archetype::ALL);
        factory
    }

    pub fn from_config(
        reasoning: Arc<dyn ReasoningService>,
        rule_graph: Arc<dyn RuleGraph>,
        config: &PipelineConfig,
    ) -> Self {
        Self::new(reasoning, rule_graph, config.retry.clone())
            .with_archetypes(config.archetype_evaluators.iter().copied())
            .with_hybrid_domains(config.hybrid_domains.iter().copied())
    }

    /// Replace the archetype registry.
    pub fn with_archetypes(mut self, archetypes: impl IntoIterator<Item = Archetype>) -> Self {
        self.archetype_evaluators.clear();
        self.register_archetypes(archetypes);
        self
    }

    pub fn with_hybrid_domains(mut self, domains: impl IntoIterator<Item = PolicyDomain>) -> Self {
        self.hybrid_domains = domains.into_iter().collect();
        self
    }

    fn register_archetypes(&mut self, archetypes: impl IntoIterator<Item = Archetype>) {
        for archetype in archetypes {
            let evaluator: Arc<dyn Evaluator> = match archetype {
                Archetype::Threshold => Arc::new(ThresholdEvaluator::new(self.reasoning.clone())),
                Archetype::Criteria => Arc::new(CriteriaEvaluator::new(self.reasoning.clone())),
                Archetype::Score => Arc::new(ScoreEvaluator::new(self.reasoning.clone())),
                Archetype::Qualitative => {
                    Arc::new(QualitativeEvaluator::new(self.reasoning.clone()))
                }
            };
            self.archetype_evaluators.insert(archetype, evaluator);
        }
    }
}

#[async_trait]
impl EvaluatorProvider for AgentFactory {
    async fn create(&self, spec: &AgentSpec) -> Arc<dyn Evaluator> {
        if self.hybrid_domains.contains(&spec.domain) {
            match self
                .rule_graph
                .lookup(spec.domain, &spec.requirement_key())
                .await
            {
                Ok(Some(rule)) => {
                    debug!("{}: hybrid evaluator with rule {}", spec.agent_id, rule.rule_id);
                    return Arc::new(HybridEvaluator::new(self.reasoning.clone(), rule));
                }
                Ok(None) => debug!("{}: no authoritative rule", spec.agent_id),
                Err(e) => warn!("Rule graph lookup failed for {}: {}", spec.agent_id, e),
            }
        }

        if let Some(evaluator) = self.archetype_evaluators.get(&spec.archetype) {
            return Arc::clone(evaluator);
        }

        debug!("{}: universal evaluator ({})", spec.agent_id, spec.complexity);
        Arc::clone(&self.universal)
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::ScriptedReasoning;
    use super::*;
    use crate::ports::rule_graph::{NoRuleGraph, RuleGraphError};
    use policy_domain::{
        ArchetypeParams, AuthoritativeRule, EvaluatorKind, ThresholdParams, ThresholdType,
    };
    use std::sync::Mutex;

    struct MockRuleGraph {
        rule: Option<AuthoritativeRule>,
        fail: bool,
        lookups: Mutex<Vec<String>>,
    }

    impl MockRuleGraph {
        fn new(rule: Option<AuthoritativeRule>, fail: bool) -> Self {
            Self {
                rule,
                fail,
                lookups: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl RuleGraph for MockRuleGraph {
        async fn lookup(
            &self,
            _domain: PolicyDomain,
            requirement_key: &str,
        ) -> Result<Option<AuthoritativeRule>, RuleGraphError> {
            self.lookups.lock().unwrap().push(requirement_key.to_string());
            if self.fail {
                return Err(RuleGraphError::Unavailable("connection refused".into()));
            }
            Ok(self.rule.clone())
        }
    }

    fn rule() -> AuthoritativeRule {
        AuthoritativeRule {
            rule_id: "FIN-1".into(),
            name: "Credit".into(),
            description: String::new(),
            threshold: None,
            conditions: vec![],
            linked: vec![],
        }
    }

    fn spec() -> AgentSpec {
        AgentSpec::new(
            "Credit Score Minimum",
            "Credit score must be at least 650",
            ArchetypeParams::Threshold(ThresholdParams::new(ThresholdType::Min, 650.0)),
        )
        .with_domain(PolicyDomain::Financial)
        .with_data_fields(["credit_score"])
    }

    fn reasoning() -> Arc<ScriptedReasoning> {
        Arc::new(ScriptedReasoning::new(vec![]))
    }

    #[tokio::test]
    async fn test_archetype_evaluator_selected() {
        let service = reasoning();
        let factory =
            AgentFactory::new(service.clone(), Arc::new(NoRuleGraph), RetryPolicy::none());
        let evaluator = factory.create(&spec()).await;
        assert_eq!(evaluator.kind(), EvaluatorKind::Threshold);
        assert_eq!(service.calls(), 0);
    }

    #[tokio::test]
    async fn test_universal_fallback() {
        let factory = AgentFactory::new(reasoning(), Arc::new(NoRuleGraph), RetryPolicy::none())
            .with_archetypes([Archetype::Criteria]);
        let evaluator = factory.create(&spec()).await;
        assert_eq!(evaluator.kind(), EvaluatorKind::Universal);
    }

    #[tokio::test]
    async fn test_hybrid_when_rule_found() {
        let graph = Arc::new(MockRuleGraph::new(Some(rule()), false));
        let factory = AgentFactory::new(reasoning(), graph.clone(), RetryPolicy::none())
            .with_hybrid_domains([PolicyDomain::Financial]);

        let evaluator = factory.create(&spec()).await;

        assert_eq!(evaluator.kind(), EvaluatorKind::Hybrid);
        assert_eq!(
            graph.lookups.lock().unwrap().as_slice(),
            ["credit score must be at least 650"]
        );
    }

    #[tokio::test]
    async fn test_hybrid_domain_without_rule_falls_through() {
        let graph = Arc::new(MockRuleGraph::new(None, false));
        let factory = AgentFactory::new(reasoning(), graph, RetryPolicy::none())
            .with_hybrid_domains([PolicyDomain::Financial]);
        assert_eq!(factory.create(&spec()).await.kind(), EvaluatorKind::Threshold);
    }

    #[tokio::test]
    async fn test_rule_graph_error_treated_as_not_found() {
        let graph = Arc::new(MockRuleGraph::new(Some(rule()), true));
        let factory = AgentFactory::new(reasoning(), graph, RetryPolicy::none())
            .with_hybrid_domains([PolicyDomain::Financial]);
        assert_eq!(factory.create(&spec()).await.kind(), EvaluatorKind::Threshold);
    }

    #[tokio::test]
    async fn test_no_lookup_outside_hybrid_domains() {
        let graph = Arc::new(MockRuleGraph::new(Some(rule()), false));
        let factory = AgentFactory::new(reasoning(), graph.clone(), RetryPolicy::none())
            .with_hybrid_domains([PolicyDomain::Esg]);
        assert_eq!(factory.create(&spec()).await.kind(), EvaluatorKind::Threshold);
        assert!(graph.lookups.lock().unwrap().is_empty());
    }
}
