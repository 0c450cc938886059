//! Agent catalogs: the full set of specs extracted from one policy.

use super::spec::AgentSpec;
use super::value_objects::{Archetype, Priority};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};

/// Catalogs smaller than this get a "low agent count" suggestion.
const LOW_AGENT_COUNT: usize = 8;
/// Catalogs larger than this get a "consolidate" suggestion.
const HIGH_AGENT_COUNT: usize = 50;

/// All specs of a policy, grouped by archetype.
///
/// Within each group specs keep extraction order (chunk ordinal order).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AgentCatalog {
    pub groups: BTreeMap<Archetype, Vec<AgentSpec>>,
}

impl AgentCatalog {
    /// Build from specs in extraction order, dropping duplicate ids
    /// (first occurrence wins).
    ///
    /// Returns the catalog and the ids that were dropped.
    pub fn from_specs(specs: impl IntoIterator<Item = AgentSpec>) -> (Self, Vec<String>) {
        let mut seen = HashSet::new();
        let mut duplicates = Vec::new();
        let mut groups: BTreeMap<Archetype, Vec<AgentSpec>> = BTreeMap::new();

        for spec in specs {
            if !seen.insert(spec.agent_id.clone()) {
                duplicates.push(spec.agent_id);
                continue;
            }
            groups.entry(spec.archetype).or_default().push(spec);
        }

        (Self { groups }, duplicates)
    }

    pub fn len(&self) -> usize {
        self.groups.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Specs of one archetype.
    pub fn group(&self, archetype: Archetype) -> &[AgentSpec] {
        self.groups.get(&archetype).map(Vec::as_slice).unwrap_or(&[])
    }

    /// All specs in archetype order, then extraction order.
    pub fn iter(&self) -> impl Iterator<Item = &AgentSpec> {
        self.groups.values().flatten()
    }

    pub fn get(&self, agent_id: &str) -> Option<&AgentSpec> {
        self.iter().find(|s| s.agent_id == agent_id)
    }

    /// Resolve a selection of ids into specs, preserving selection order.
    ///
    /// Returns `Err` with the unknown ids if any id is not in the catalog.
    pub fn select(&self, agent_ids: &[String]) -> Result<Vec<AgentSpec>, Vec<String>> {
        let mut selected = Vec::with_capacity(agent_ids.len());
        let mut unknown = Vec::new();
        for id in agent_ids {
            match self.get(id) {
                Some(spec) => selected.push(spec.clone()),
                None => unknown.push(id.clone()),
            }
        }
        if unknown.is_empty() {
            Ok(selected)
        } else {
            Err(unknown)
        }
    }

    /// Per-archetype and per-priority counts.
    pub fn overview(&self) -> CatalogOverview {
        let mut overview = CatalogOverview {
            total_agents: self.len(),
            ..Default::default()
        };
        for spec in self.iter() {
            *overview.by_archetype.entry(spec.archetype).or_default() += 1;
            *overview.by_priority.entry(spec.priority).or_default() += 1;
            overview.data_requirements.extend(spec.data_fields.iter().cloned());
        }
        overview
    }

    /// Completeness checks over the catalog.
    pub fn validate(&self) -> CatalogValidation {
        let overview = self.overview();
        let mut validation = CatalogValidation::default();

        for spec in self.iter() {
            if spec.data_fields.is_empty() {
                validation
                    .warnings
                    .push(format!("Agent {} has empty data_fields", spec.agent_id));
            }
            if !spec.is_consistent() {
                validation.errors.push(format!(
                    "Agent {} archetype '{}' does not match its parameters",
                    spec.agent_id, spec.archetype
                ));
            }
        }

        let count = |a: Archetype| overview.by_archetype.get(&a).copied().unwrap_or(0);
        if overview.total_agents < LOW_AGENT_COUNT {
            validation.suggestions.push(
                "Low agent count - consider extracting more policy requirements".to_string(),
            );
        }
        if overview.total_agents > HIGH_AGENT_COUNT {
            validation.suggestions.push(
                "High agent count - consider consolidating similar requirements".to_string(),
            );
        }
        if count(Archetype::Threshold) == 0 {
            validation.suggestions.push(
                "No threshold agents found - check for numeric limits, percentages, or ratios"
                    .to_string(),
            );
        }
        if count(Archetype::Criteria) == 0 {
            validation.suggestions.push(
                "No criteria agents found - check for yes/no conditions or categorical requirements"
                    .to_string(),
            );
        }

        validation
    }
}

/// Counts used for display.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CatalogOverview {
    pub total_agents: usize,
    pub by_archetype: BTreeMap<Archetype, usize>,
    pub by_priority: BTreeMap<Priority, usize>,
    pub data_requirements: std::collections::BTreeSet<String>,
}

/// Result of [`AgentCatalog::validate`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CatalogValidation {
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
    pub suggestions: Vec<String>,
}

impl CatalogValidation {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }
}
