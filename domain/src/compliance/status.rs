//! Overall compliance status and decision.

use serde::{Deserialize, Serialize};
use std::fmt;

/// More than this many high-priority failures is treated like a critical one.
const HIGH_FAILURE_LIMIT: usize = 2;

/// Overall status derived from failed agents' priorities.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OverallStatus {
    #[default]
    Pass,
    PassWithConditions,
    ReviewRequired,
    FailHighPriority,
    FailCritical,
}

/// Recommended decision for the assessed document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Decision {
    #[default]
    Approve,
    ApproveWithConditions,
    ManualReview,
    Deny,
}

impl OverallStatus {
    /// Status from failure counts by priority. Inconclusive results are not
    /// failures and do not enter here.
    pub fn from_failures(critical: usize, high: usize, other: usize) -> Self {
        if critical > 0 {
            OverallStatus::FailCritical
        } else if high > HIGH_FAILURE_LIMIT {
            OverallStatus::FailHighPriority
        } else if high > 0 {
            OverallStatus::ReviewRequired
        } else if other > 0 {
            OverallStatus::PassWithConditions
        } else {
            OverallStatus::Pass
        }
    }

    pub fn decision(&self) -> Decision {
        match self {
            OverallStatus::FailCritical | OverallStatus::FailHighPriority => Decision::Deny,
            OverallStatus::ReviewRequired => Decision::ManualReview,
            OverallStatus::PassWithConditions => Decision::ApproveWithConditions,
            OverallStatus::Pass => Decision::Approve,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            OverallStatus::Pass => "PASS",
            OverallStatus::PassWithConditions => "PASS_WITH_CONDITIONS",
            OverallStatus::ReviewRequired => "REVIEW_REQUIRED",
            OverallStatus::FailHighPriority => "FAIL_HIGH_PRIORITY",
            OverallStatus::FailCritical => "FAIL_CRITICAL",
        }
    }

    pub fn is_passing(&self) -> bool {
        matches!(self, OverallStatus::Pass | OverallStatus::PassWithConditions)
    }
}

impl Decision {
    pub fn as_str(&self) -> &'static str {
        match self {
            Decision::Approve => "APPROVE",
            Decision::ApproveWithConditions => "APPROVE_WITH_CONDITIONS",
            Decision::ManualReview => "MANUAL_REVIEW",
            Decision::Deny => "DENY",
        }
    }
}

impl fmt::Display for OverallStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl fmt::Display for Decision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
