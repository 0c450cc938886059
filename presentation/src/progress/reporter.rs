//! Progress reporting for pipeline runs

use colored::Colorize;
use indicatif::{MultiProgress, ProgressBar, ProgressStyle};
use policy_application::PipelineProgress;
use policy_domain::{AgentResult, AgentSpec};
use std::sync::Mutex;

/// Reports progress with one bar per pipeline stage
pub struct ProgressReporter {
    multi: MultiProgress,
    stage_bar: Mutex<Option<ProgressBar>>,
}

impl ProgressReporter {
    pub fn new() -> Self {
        Self {
            multi: MultiProgress::new(),
            stage_bar: Mutex::new(None),
        }
    }

    fn stage_style() -> ProgressStyle {
        ProgressStyle::default_bar()
            .template("{spinner:.green} {prefix:.bold.cyan} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("=>-")
    }

    fn start_stage(&self, name: &str, total: usize) {
        let pb = self.multi.add(ProgressBar::new(total as u64));
        pb.set_style(Self::stage_style());
        pb.set_prefix(name.to_string());
        pb.set_message("Starting...");
        if let Ok(mut bar) = self.stage_bar.lock() {
            *bar = Some(pb);
        }
    }

    fn with_bar(&self, f: impl FnOnce(&ProgressBar)) {
        if let Ok(bar) = self.stage_bar.lock()
            && let Some(pb) = bar.as_ref()
        {
            f(pb);
        }
    }

    fn finish_stage(&self, done: &str) {
        if let Ok(mut bar) = self.stage_bar.lock()
            && let Some(pb) = bar.take()
        {
            pb.finish_with_message(done.green().to_string());
        }
    }
}

impl Default for ProgressReporter {
    fn default() -> Self {
        Self::new()
    }
}

impl PipelineProgress for ProgressReporter {
    fn on_extraction_start(&self, total_chunks: usize) {
        self.start_stage("Extracting requirements", total_chunks);
    }

    fn on_chunk_extracted(&self, ordinal: usize, success: bool) {
        self.with_bar(|pb| {
            let status = if success {
                format!("{} chunk {}", "v".green(), ordinal)
            } else {
                format!("{} chunk {}", "x".red(), ordinal)
            };
            pb.set_message(status);
            pb.inc(1);
        });
    }

    fn on_extraction_complete(&self) {
        self.finish_stage("extraction complete");
    }

    fn on_evaluation_start(&self, total_agents: usize) {
        self.start_stage("Evaluating agents", total_agents);
    }

    fn on_agent_start(&self, spec: &AgentSpec) {
        self.with_bar(|pb| pb.set_message(format!("running {}", spec.agent_id)));
    }

    fn on_agent_complete(&self, result: &AgentResult) {
        self.with_bar(|pb| {
            let mark = match result.passed {
                Some(true) => "v".green(),
                Some(false) => "x".red(),
                None => "?".yellow(),
            };
            pb.set_message(format!("{} {}", mark, result.agent_id));
            pb.inc(1);
        });
    }

    fn on_evaluation_complete(&self) {
        self.finish_stage("evaluation complete");
    }
}

/// Simple text-based progress (no fancy UI), written to stderr
pub struct SimpleProgress;

impl PipelineProgress for SimpleProgress {
    fn on_extraction_start(&self, total_chunks: usize) {
        eprintln!(
            "{} {} ({} chunks)",
            "->".cyan(),
            "Extracting requirements".bold(),
            total_chunks
        );
    }

    fn on_chunk_extracted(&self, ordinal: usize, success: bool) {
        if !success {
            eprintln!("  {} chunk {} (failed)", "x".red(), ordinal);
        }
    }

    fn on_evaluation_start(&self, total_agents: usize) {
        eprintln!(
            "{} {} ({} agents)",
            "->".cyan(),
            "Evaluating agents".bold(),
            total_agents
        );
    }

    fn on_agent_complete(&self, result: &AgentResult) {
        let mark = match result.passed {
            Some(true) => "v".green(),
            Some(false) => "x".red(),
            None => "?".yellow(),
        };
        eprintln!("  {} {}", mark, result.agent_id);
    }
}
