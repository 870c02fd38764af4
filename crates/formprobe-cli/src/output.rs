//! Step and summary output

use console::{style, Term};
use formprobe::{ScenarioReport, StepReport, StrategyOutcome};

/// Writes scenario progress to stderr and results to stdout
#[derive(Debug)]
pub struct Reporter {
    err: Term,
    out: Term,
    /// Whether to use colors
    pub use_color: bool,
    /// Quiet mode
    pub quiet: bool,
}

impl Default for Reporter {
    fn default() -> Self {
        Self::new(true, false)
    }
}

impl Reporter {
    /// Create a reporter
    #[must_use]
    pub fn new(use_color: bool, quiet: bool) -> Self {
        Self {
            err: Term::stderr(),
            out: Term::stdout(),
            use_color,
            quiet,
        }
    }

    /// Announce a scenario run
    pub fn start(&self, scenario: &str, url: &str, steps: usize) {
        if self.quiet {
            return;
        }
        let name = if self.use_color {
            style(scenario).bold().to_string()
        } else {
            scenario.to_string()
        };
        let _ = self
            .err
            .write_line(&format!("Running {name} ({steps} steps) against {url}"));
    }

    /// Print one completed step
    pub fn step(&self, report: &StepReport) {
        if self.quiet {
            return;
        }
        let _ = self.err.write_line(&format_step(report, self.use_color));
    }

    /// Print a failure; shown even in quiet mode
    pub fn failure(&self, message: &str) {
        let prefix = if self.use_color {
            style("✗").red().bold().to_string()
        } else {
            "FAIL".to_string()
        };
        let _ = self.err.write_line(&format!("{prefix} {message}"));
    }

    /// Print the final summary line
    pub fn summary(&self, report: &ScenarioReport) {
        if self.quiet {
            return;
        }
        let prefix = if self.use_color {
            style("✓").green().bold().to_string()
        } else {
            "PASS".to_string()
        };
        let _ = self.out.write_line(&format!(
            "{prefix} {} completed {} steps in {:.2}s",
            report.scenario,
            report.step_count(),
            report.duration.as_secs_f64()
        ));
    }

    /// Print raw text to stdout
    pub fn print(&self, text: &str) {
        let _ = self.out.write_str(text);
    }
}

/// One line per step: number, description, winning strategy and read-back
#[must_use]
pub fn format_step(report: &StepReport, use_color: bool) -> String {
    let applied: Vec<String> = report
        .outcomes
        .iter()
        .filter_map(|outcome| match outcome {
            StrategyOutcome::Applied { strategy, observed } => Some(format!("{strategy} → {observed}")),
            StrategyOutcome::Failed(_) => None,
        })
        .collect();
    let detail = if applied.is_empty() {
        String::new()
    } else {
        format!(" [{}]", applied.join(", "))
    };
    let ms = report.duration.as_millis();
    if use_color {
        format!(
            "{} {:>2}. {}{} {}",
            style("✓").green(),
            report.index,
            report.step,
            style(detail).dim(),
            style(format!("({ms}ms)")).dim()
        )
    } else {
        format!("PASS {:>2}. {}{detail} ({ms}ms)", report.index, report.step)
    }
}
