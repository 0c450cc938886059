//! Console output formatter for catalogs and compliance reports

use colored::{ColoredString, Colorize};
use policy_application::{BuildCatalogOutput, ComplianceReport};
use policy_domain::{AgentResult, Archetype, OutputFormat, OverallStatus, util::truncate_str};

/// Reasons longer than this are cut in the agent table
const MAX_REASON_WIDTH: usize = 200;

/// Formats pipeline outputs for console display
pub struct ConsoleFormatter;

impl ConsoleFormatter {
    /// Render a report in the requested format
    pub fn format_report(report: &ComplianceReport, format: OutputFormat) -> String {
        match format {
            OutputFormat::Full => Self::format_report_full(report),
            OutputFormat::Summary => Self::format_report_summary(report),
            OutputFormat::Json => Self::format_json(report),
        }
    }

    /// Render a catalog in the requested format (`full` and `summary` both list agents)
    pub fn format_catalog(output: &BuildCatalogOutput, format: OutputFormat) -> String {
        match format {
            OutputFormat::Json => Self::format_json(output),
            OutputFormat::Full | OutputFormat::Summary => Self::format_catalog_text(output),
        }
    }

    /// Format as JSON
    pub fn format_json<T: serde::Serialize>(value: &T) -> String {
        serde_json::to_string_pretty(value).unwrap_or_else(|_| "{}".to_string())
    }

    /// Every agent result, then the summary
    pub fn format_report_full(report: &ComplianceReport) -> String {
        let mut output = String::new();

        output.push_str(&Self::header("Compliance Report"));
        output.push('\n');
        output.push_str(&Self::run_info(report));

        output.push_str(&Self::section_header("Agent Results"));
        for result in &report.results {
            output.push_str(&Self::result_line(result));
        }

        output.push_str(&Self::summary_block(report));
        output.push_str(&Self::footer());
        output
    }

    /// Status, decision, statistics and recommendations only
    pub fn format_report_summary(report: &ComplianceReport) -> String {
        let mut output = String::new();
        output.push_str(&format!("{}\n\n", "=== Compliance Summary ===".cyan().bold()));
        output.push_str(&Self::run_info(report));
        output.push_str(&Self::summary_block(report));
        output
    }

    fn format_catalog_text(output: &BuildCatalogOutput) -> String {
        let mut text = String::new();
        let overview = output.catalog.overview();

        text.push_str(&Self::header("Agent Catalog"));
        text.push('\n');
        text.push_str(&format!(
            "{} {} agents from {} chunks\n",
            "Built:".cyan().bold(),
            overview.total_agents,
            output.chunk_count
        ));

        for archetype in Archetype::ALL {
            let specs = output.catalog.group(archetype);
            if specs.is_empty() {
                continue;
            }
            text.push_str(&Self::section_header(&format!(
                "{} ({})",
                archetype.as_str().to_uppercase(),
                specs.len()
            )));
            for spec in specs {
                text.push_str(&format!(
                    "  {} {} [{}, {}, {}]\n      {}\n",
                    spec.agent_id.yellow(),
                    spec.agent_name.bold(),
                    spec.priority,
                    spec.domain,
                    spec.complexity,
                    spec.requirement_text.dimmed()
                ));
            }
        }

        if !overview.data_requirements.is_empty() {
            text.push_str(&format!("\n{}\n", "Data fields needed:".cyan().bold()));
            for field in &overview.data_requirements {
                text.push_str(&format!("  * {}\n", field));
            }
        }

        if !output.extraction_failures.is_empty() {
            text.push_str(&format!("\n{}\n", "Extraction failures:".red().bold()));
            for failure in &output.extraction_failures {
                text.push_str(&format!(
                    "  * chunk {}: {}\n",
                    failure.chunk_ordinal, failure.reason
                ));
            }
        }

        if !output.rejected.is_empty() {
            text.push_str(&format!("\n{}\n", "Rejected candidates:".yellow().bold()));
            for rejected in &output.rejected {
                text.push_str(&format!(
                    "  * chunk {}: {} ({})\n",
                    rejected.chunk_ordinal,
                    rejected.requirement_text.as_deref().unwrap_or("<no text>"),
                    rejected.reason
                ));
            }
        }

        for warning in &output.validation.warnings {
            text.push_str(&format!("{} {}\n", "warning:".yellow(), warning));
        }
        for suggestion in &output.validation.suggestions {
            text.push_str(&format!("{} {}\n", "suggestion:".dimmed(), suggestion));
        }

        text.push_str(&Self::footer());
        text
    }

    fn run_info(report: &ComplianceReport) -> String {
        let elapsed = report.completed_at - report.started_at;
        format!(
            "{} {}\n{} {}\n{} {} agents in {:.1}s\n",
            "Run:".cyan().bold(),
            report.context.run_id,
            "Document:".cyan().bold(),
            report.context.document_id,
            "Evaluated:".cyan().bold(),
            report.results.len(),
            elapsed.num_milliseconds() as f64 / 1000.0
        )
    }

    fn result_line(result: &AgentResult) -> String {
        let verdict = match result.passed {
            Some(true) => "PASS".green().bold(),
            Some(false) => "FAIL".red().bold(),
            None => "N/A ".yellow().bold(),
        };
        format!(
            "  {} {} {} [{}] {:.0}%\n      {}\n",
            verdict,
            result.agent_id.yellow(),
            result.agent_config.agent_name,
            result.agent_config.priority,
            result.confidence * 100.0,
            truncate_str(&result.reason, MAX_REASON_WIDTH)
        )
    }

    fn summary_block(report: &ComplianceReport) -> String {
        let summary = &report.summary;
        let stats = &summary.statistics;
        let mut output = Self::section_header("Summary");

        output.push_str(&format!(
            "{} {}\n{} {}\n",
            "Status:".bold(),
            Self::status_label(summary.overall_status),
            "Decision:".bold(),
            summary.decision.as_str().bold()
        ));
        output.push_str(&format!(
            "Passed: {}  Failed: {}  Inconclusive: {}  Pass rate: {:.1}%  Avg confidence: {:.0}%\n",
            stats.passed_agents.to_string().green(),
            stats.failed_agents.to_string().red(),
            stats.inconclusive_agents.to_string().yellow(),
            stats.pass_rate * 100.0,
            summary.average_confidence * 100.0
        ));

        if !summary.recommendations.is_empty() {
            output.push_str(&format!("\n{}\n", "Recommendations:".cyan().bold()));
            for recommendation in &summary.recommendations {
                output.push_str(&format!("  * {}\n", recommendation));
            }
        }
        output
    }

    fn status_label(status: OverallStatus) -> ColoredString {
        match status {
            OverallStatus::Pass => status.as_str().green().bold(),
            OverallStatus::PassWithConditions => status.as_str().green(),
            OverallStatus::ReviewRequired => status.as_str().yellow().bold(),
            OverallStatus::FailHighPriority | OverallStatus::FailCritical => {
                status.as_str().red().bold()
            }
        }
    }

    fn header(title: &str) -> String {
        let line = "=".repeat(60);
        format!("{}\n{:^60}\n{}", line.cyan(), title.bold(), line.cyan())
    }

    fn section_header(title: &str) -> String {
        format!("\n{}\n{}\n", title.cyan().bold(), "-".repeat(40))
    }

    fn footer() -> String {
        format!("\n{}\n", "=".repeat(60).cyan())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use policy_application::RunContext;
    use policy_domain::{
        AgentCatalog, AgentSpec, ArchetypeParams, CatalogValidation, EvaluatorKind, Priority,
        ThresholdParams, ThresholdType, summarize,
    };

    fn spec(name: &str, priority: Priority) -> AgentSpec {
        AgentSpec::new(
            name,
            format!("{} must be at least 650", name),
            ArchetypeParams::Threshold(ThresholdParams::new(ThresholdType::Min, 650.0)),
        )
        .with_priority(priority)
        .with_data_fields(["credit_score"])
    }

    fn report() -> ComplianceReport {
        let results = vec![
            AgentResult::pass(
                &spec("Credit Score", Priority::High),
                1.0,
                "credit_score = 720 meets threshold",
                EvaluatorKind::Threshold,
            ),
            AgentResult::fail(
                &spec("DTI", Priority::Critical),
                0.9,
                "DTI 47% exceeds 43%",
                EvaluatorKind::Threshold,
            ),
        ];
        let summary = summarize(&results, 10);
        ComplianceReport {
            context: RunContext::new(
                "application.md",
                results.iter().map(|r| r.agent_id.clone()).collect(),
            ),
            results,
            summary,
            started_at: Utc::now(),
            completed_at: Utc::now(),
        }
    }

    #[test]
    fn test_full_report_lists_every_agent() {
        colored::control::set_override(false);
        let text = ConsoleFormatter::format_report(&report(), OutputFormat::Full);
        assert!(text.contains("PASS"));
        assert!(text.contains("FAIL"));
        assert!(text.contains("DTI 47% exceeds 43%"));
        assert!(text.contains("FAIL_CRITICAL"));
        assert!(text.contains("DENY"));
    }

    #[test]
    fn test_summary_report_omits_agent_lines() {
        colored::control::set_override(false);
        let text = ConsoleFormatter::format_report(&report(), OutputFormat::Summary);
        assert!(!text.contains("Agent Results"));
        assert!(text.contains("Recommendations:"));
        assert!(text.contains("[CRITICAL] DTI"));
    }

    #[test]
    fn test_json_report_round_trips() {
        let report = report();
        let json = ConsoleFormatter::format_report(&report, OutputFormat::Json);
        let back: ComplianceReport = serde_json::from_str(&json).unwrap();
        assert_eq!(back.results, report.results);
        assert_eq!(back.context.run_id, report.context.run_id);
    }

    #[test]
    fn test_catalog_text_groups_by_archetype() {
        colored::control::set_override(false);
        let (catalog, _) = AgentCatalog::from_specs(vec![spec("Credit Score", Priority::High)]);
        let output = BuildCatalogOutput {
            validation: CatalogValidation::default(),
            catalog,
            chunk_count: 1,
            extraction_failures: vec![],
            rejected: vec![],
            duplicates: vec![],
        };
        let text = ConsoleFormatter::format_catalog(&output, OutputFormat::Summary);
        assert!(text.contains("THRESHOLD (1)"));
        assert!(text.contains("credit_score"));
    }
}
