//! CLI command definitions

use clap::{Args, Parser, Subcommand, ValueEnum};
use policy_domain::OutputFormat;
use std::path::PathBuf;

/// Report format on the command line
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ReportFormat {
    /// Every agent with its reason, then the summary
    Full,
    /// Status, decision, statistics and recommendations only
    Summary,
    /// JSON output
    Json,
}

impl From<ReportFormat> for OutputFormat {
    fn from(format: ReportFormat) -> Self {
        match format {
            ReportFormat::Full => OutputFormat::Full,
            ReportFormat::Summary => OutputFormat::Summary,
            ReportFormat::Json => OutputFormat::Json,
        }
    }
}

/// CLI arguments for policy-agents
#[derive(Parser, Debug)]
#[command(name = "policy-agents")]
#[command(author, version, about = "Turn policy documents into compliance agents and run them")]
#[command(long_about = r#"
policy-agents reads a policy document, extracts every checkable requirement,
and turns each one into a compliance agent. The agents are then evaluated
concurrently against data extracted from a second document.

Commands:
  catalog   Build the agent catalog from a policy document
  check     Evaluate selected agents against assessment data

Configuration is loaded from (in priority order):
1. POLICY_AGENTS_* environment variables (e.g. POLICY_AGENTS_EVALUATION__TASK_TIMEOUT_SECS=60)
2. --config <path>           Explicit config file
3. ./policy-agents.toml      Project-level config
4. ~/.config/policy-agents/config.toml   Global config

Example:
  policy-agents catalog credit-policy.md -o catalog.json
  policy-agents check --catalog catalog.json --data applicant.json --all
  policy-agents check --policy credit-policy.md --document application.md --agents TH-1a2b3c4d5e6f
"#)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,

    /// Verbosity level (-v = info, -vv = debug, -vvv = trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress progress indicators
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Report format (defaults to the config file, then "summary")
    #[arg(long, global = true, value_enum)]
    pub format: Option<ReportFormat>,

    /// Path to configuration file
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Disable loading of configuration files
    #[arg(long, global = true)]
    pub no_config: bool,

    /// Show configuration file locations and exit
    #[arg(long)]
    pub show_config: bool,

    /// Write daily-rolling diagnostic logs into this directory
    #[arg(long, global = true, value_name = "DIR")]
    pub log_dir: Option<PathBuf>,

    /// Write structured pipeline events (JSONL) to this file
    #[arg(long, global = true, value_name = "PATH")]
    pub run_log: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Build the agent catalog from a policy document
    Catalog(CatalogArgs),
    /// Evaluate selected agents against assessment data
    Check(CheckArgs),
}

#[derive(Args, Debug)]
pub struct CatalogArgs {
    /// Policy document (plain text or markdown)
    #[arg(value_name = "POLICY")]
    pub policy: PathBuf,

    /// Expected policy domain, passed to requirement extraction
    #[arg(long, value_name = "DOMAIN")]
    pub domain_hint: Option<String>,

    /// Write the catalog JSON to this file
    #[arg(short, long, value_name = "PATH")]
    pub output: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub struct CheckArgs {
    /// Agent catalog JSON produced by `catalog`
    #[arg(
        long,
        value_name = "PATH",
        conflicts_with = "policy",
        required_unless_present = "policy"
    )]
    pub catalog: Option<PathBuf>,

    /// Policy document to build the catalog from first
    #[arg(long, value_name = "PATH")]
    pub policy: Option<PathBuf>,

    /// Expected policy domain, used with --policy
    #[arg(long, value_name = "DOMAIN", requires = "policy")]
    pub domain_hint: Option<String>,

    /// Assessment data JSON (`{"fields": {...}}` or a bare field map)
    #[arg(
        long,
        value_name = "PATH",
        conflicts_with = "document",
        required_unless_present = "document"
    )]
    pub data: Option<PathBuf>,

    /// Assessment document to extract the data from
    #[arg(long, value_name = "PATH")]
    pub document: Option<PathBuf>,

    /// Agent ids to run (comma separated or repeated)
    #[arg(
        short,
        long,
        value_name = "ID",
        value_delimiter = ',',
        conflicts_with = "all",
        required_unless_present = "all"
    )]
    pub agents: Vec<String>,

    /// Run every agent in the catalog
    #[arg(long)]
    pub all: bool,

    /// Write the report JSON to this file
    #[arg(short, long, value_name = "PATH")]
    pub output: Option<PathBuf>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_catalog() {
        let cli = Cli::parse_from([
            "policy-agents",
            "-vv",
            "catalog",
            "policy.md",
            "--domain-hint",
            "financial",
            "-o",
            "catalog.json",
        ]);
        assert_eq!(cli.verbose, 2);
        let Some(Command::Catalog(args)) = cli.command else {
            panic!("expected catalog command");
        };
        assert_eq!(args.policy, PathBuf::from("policy.md"));
        assert_eq!(args.domain_hint.as_deref(), Some("financial"));
    }

    #[test]
    fn test_parse_check_with_agent_list() {
        let cli = Cli::parse_from([
            "policy-agents",
            "check",
            "--catalog",
            "catalog.json",
            "--data",
            "data.json",
            "--agents",
            "TH-1,CR-2",
            "--format",
            "json",
        ]);
        assert_eq!(cli.format, Some(ReportFormat::Json));
        let Some(Command::Check(args)) = cli.command else {
            panic!("expected check command");
        };
        assert_eq!(args.agents, vec!["TH-1", "CR-2"]);
        assert!(!args.all);
    }

    #[test]
    fn test_check_requires_selection() {
        let result = Cli::try_parse_from([
            "policy-agents",
            "check",
            "--catalog",
            "catalog.json",
            "--data",
            "data.json",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_check_rejects_two_data_sources() {
        let result = Cli::try_parse_from([
            "policy-agents",
            "check",
            "--catalog",
            "c.json",
            "--data",
            "d.json",
            "--document",
            "app.md",
            "--all",
        ]);
        assert!(result.is_err());
    }
}
