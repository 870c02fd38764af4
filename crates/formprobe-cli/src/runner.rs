//! Browser-backed scenario execution

use crate::commands::BrowserArgs;
use crate::error::{CliError, CliResult};
use crate::output::Reporter;
use formprobe::{BrowserConfig, ProbeConfig, ProbeError, Scenario, ScenarioReport};

/// CSS selector that must be present before the first step runs
pub const READY_SELECTOR: &str = "form";

/// Everything a run needs besides the scenario
#[derive(Debug, Clone)]
pub struct RunOptions {
    /// Page to open
    pub url: String,
    /// Browser launch settings
    pub browser: BrowserConfig,
    /// Interaction settings
    pub probe: ProbeConfig,
}

impl RunOptions {
    /// Combine the browser flags with an optional probe configuration file
    pub fn from_args(url: impl Into<String>, args: &BrowserArgs) -> CliResult<Self> {
        let mut probe = match &args.config {
            Some(path) => ProbeConfig::load(path)?,
            None => ProbeConfig::default(),
        };
        if let Some(ms) = args.timeout_ms {
            if ms == 0 {
                return Err(CliError::config("--timeout-ms must be greater than zero"));
            }
            probe.wait.timeout_ms = ms;
        }

        let mut browser = BrowserConfig::default().with_headless(!args.headed);
        if args.no_sandbox {
            browser = browser.with_no_sandbox();
        }
        if let Some(path) = &args.chromium {
            browser = browser.with_chromium_path(path.to_string_lossy());
        }

        Ok(Self {
            url: url.into(),
            browser,
            probe,
        })
    }
}

/// Launch a browser, open the page and run `scenario` to completion
#[cfg(feature = "browser")]
pub fn run_scenario(
    scenario: &Scenario,
    options: &RunOptions,
    reporter: &Reporter,
) -> CliResult<ScenarioReport> {
    use formprobe::Browser;

    let rt = tokio::runtime::Runtime::new()?;
    rt.block_on(async {
        let browser = Browser::launch(options.browser.clone()).await?;
        let outcome = drive(&browser, scenario, options, reporter).await;
        if let Err(e) = browser.close().await {
            tracing::warn!(error = %e, "browser did not close cleanly");
        }
        outcome
    })
}

#[cfg(feature = "browser")]
async fn drive(
    browser: &formprobe::Browser,
    scenario: &Scenario,
    options: &RunOptions,
    reporter: &Reporter,
) -> CliResult<ScenarioReport> {
    use formprobe::{ScenarioRunner, Widgets};

    let page = browser.open(&options.url).await?;
    page.wait_for(READY_SELECTOR, &options.probe.wait).await?;

    let runner = ScenarioRunner::new(Widgets::new(&page).with_config(options.probe.clone()));
    let mut completed = 0;
    let result = runner
        .run_with(scenario, |step| {
            completed = step.index;
            reporter.step(step);
        })
        .await;
    result.map_err(|source| step_failure(scenario, completed, source))
}

/// Wrap the error of the step after the `completed` ones
#[cfg_attr(not(feature = "browser"), allow(dead_code))]
fn step_failure(scenario: &Scenario, completed: usize, source: ProbeError) -> CliError {
    CliError::ScenarioFailed {
        scenario: scenario.name.clone(),
        step: completed + 1,
        action: scenario
            .steps
            .get(completed)
            .map_or_else(|| "after last step".to_string(), ToString::to_string),
        source,
    }
}

/// Without browser support every run fails up front
#[cfg(not(feature = "browser"))]
pub fn run_scenario(
    _scenario: &Scenario,
    _options: &RunOptions,
    _reporter: &Reporter,
) -> CliResult<ScenarioReport> {
    Err(CliError::BrowserUnavailable)
}
