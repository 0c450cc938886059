//! Report and output configuration from TOML (`[report]` and `[output]` sections)

use policy_domain::{DEFAULT_MAX_RECOMMENDATIONS, OutputFormat};
use serde::{Deserialize, Serialize};

/// Raw report configuration from TOML
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileReportConfig {
    /// Recommendations kept in the compliance summary
    pub max_recommendations: usize,
}

impl Default for FileReportConfig {
    fn default() -> Self {
        Self {
            max_recommendations: DEFAULT_MAX_RECOMMENDATIONS,
        }
    }
}

/// Raw output configuration from TOML
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileOutputConfig {
    /// Report format (uses domain type); `None` lets the CLI decide
    pub format: Option<OutputFormat>,
    /// Enable colored terminal output
    pub color: bool,
    /// Show progress bars while the pipeline runs
    pub show_progress: bool,
}

impl Default for FileOutputConfig {
    fn default() -> Self {
        Self {
            format: None,
            color: true,
            show_progress: true,
        }
    }
}
