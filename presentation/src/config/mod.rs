//! Presentation-level configuration
//!
//! Output settings resolved from command-line flags and the config file.
//! Flags win over the file; the file wins over built-in defaults.

use crate::cli::commands::ReportFormat;
use policy_domain::OutputFormat;

/// Output configuration for the presentation layer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputConfig {
    pub format: OutputFormat,
    /// Enable colored terminal output
    pub color: bool,
    /// Show progress indicators
    pub show_progress: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            format: OutputFormat::default(),
            color: true,
            show_progress: true,
        }
    }
}

impl OutputConfig {
    /// Start from the config file's `[output]` values.
    pub fn from_file(format: Option<OutputFormat>, color: bool, show_progress: bool) -> Self {
        Self {
            format: format.unwrap_or_default(),
            color,
            show_progress,
        }
    }

    /// Apply command-line overrides.
    pub fn with_cli(mut self, format: Option<ReportFormat>, quiet: bool) -> Self {
        if let Some(format) = format {
            self.format = format.into();
        }
        if quiet {
            self.show_progress = false;
        }
        // Progress bars would interleave with JSON on a shared terminal
        if self.format == OutputFormat::Json {
            self.show_progress = false;
        }
        self
    }

    /// Apply process-wide terminal settings.
    pub fn apply(&self) {
        if !self.color {
            colored::control::set_override(false);
        }
    }
}
