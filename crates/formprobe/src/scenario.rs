//! Declarative form-fill scenarios
//!
//! A scenario is an ordered list of [`Step`]s, each one generic operation
//! from [`Widgets`]. Scenarios load from YAML:
//!
//! ```yaml
//! name: quick apply
//! steps:
//!   - type: type
//!     label: Full Name
//!     text: John Doe
//!   - type: select
//!     label: Department
//!     option: Engineering
//!   - type: submit
//!     button: Submit Application
//!   - type: expect_alert
//!     text: Application submitted successfully
//! ```
//!
//! [`ScenarioRunner`] executes steps strictly in order and aborts on the
//! first failure.

use std::fmt;
use std::path::Path;
use std::str::FromStr;
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};

use crate::driver::DomDriver;
use crate::result::{ProbeError, ProbeResult};
use crate::strategy::{format_number, StrategyOutcome};
use crate::widgets::Widgets;

/// Success text shown by every form variant after submission
pub const SUCCESS_TEXT: &str = "Application submitted successfully";

/// Default base URL of the form application
pub const DEFAULT_BASE_URL: &str = "http://localhost:5173";

// =============================================================================
// FORM VARIANTS
// =============================================================================

/// The three renderings of the job application form
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FormVariant {
    /// Material UI
    Material,
    /// Chakra UI
    Chakra,
    /// React-Bootstrap
    Bootstrap,
}

impl FormVariant {
    /// Every variant, in route order
    pub const ALL: [Self; 3] = [Self::Material, Self::Chakra, Self::Bootstrap];

    /// Route path of this variant
    #[must_use]
    pub const fn path(&self) -> &'static str {
        match self {
            Self::Material => "/material",
            Self::Chakra => "/chakra",
            Self::Bootstrap => "/bootstrap",
        }
    }

    /// Full URL of this variant under `base`
    #[must_use]
    pub fn url(&self, base: &str) -> String {
        format!("{}{}", base.trim_end_matches('/'), self.path())
    }
}

impl fmt::Display for FormVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path().trim_start_matches('/'))
    }
}

impl FromStr for FormVariant {
    type Err = ProbeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "material" | "mui" => Ok(Self::Material),
            "chakra" => Ok(Self::Chakra),
            "bootstrap" => Ok(Self::Bootstrap),
            other => Err(ProbeError::Config {
                message: format!("unknown form variant '{other}'"),
            }),
        }
    }
}

// =============================================================================
// STEPS
// =============================================================================

/// One generic operation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Step {
    /// Type into a text entry
    #[serde(rename = "type")]
    Type {
        /// Label text or field name
        label: String,
        /// Text to enter
        text: String,
    },
    /// Select one option
    #[serde(rename = "select")]
    Select {
        /// Label text
        label: String,
        /// Visible option text
        option: String,
    },
    /// Select several options
    #[serde(rename = "select_many")]
    SelectMany {
        /// Label text
        label: String,
        /// Visible option texts, in pick order
        options: Vec<String>,
    },
    /// Add typeahead entries; `field` is a label or a `name`
    #[serde(rename = "pick")]
    Pick {
        /// Label text or field name
        field: String,
        /// Entries to add
        options: Vec<String>,
    },
    /// Set a rating
    #[serde(rename = "rating")]
    Rating {
        /// Label text
        label: String,
        /// 1-based rating
        value: u32,
    },
    /// Set a slider
    #[serde(rename = "range")]
    Range {
        /// Label text
        label: String,
        /// Target slider value
        value: f64,
    },
    /// Flip a switch
    #[serde(rename = "toggle")]
    Toggle {
        /// Text next to the switch
        label: String,
    },
    /// Press a radio or checkbox label
    #[serde(rename = "click_label")]
    ClickLabel {
        /// Visible label text
        label: String,
    },
    /// Press a button
    #[serde(rename = "submit")]
    Submit {
        /// Button text
        button: String,
    },
    /// Wait for an alert
    #[serde(rename = "expect_alert")]
    ExpectAlert {
        /// Text the alert must contain
        text: String,
    },
}

impl Step {
    fn typed(label: &str, text: &str) -> Self {
        Self::Type {
            label: label.to_string(),
            text: text.to_string(),
        }
    }

    fn select(label: &str, option: &str) -> Self {
        Self::Select {
            label: label.to_string(),
            option: option.to_string(),
        }
    }

    fn click(label: &str) -> Self {
        Self::ClickLabel {
            label: label.to_string(),
        }
    }

    fn toggle(label: &str) -> Self {
        Self::Toggle {
            label: label.to_string(),
        }
    }

    /// Short operation name
    #[must_use]
    pub const fn action(&self) -> &'static str {
        match self {
            Self::Type { .. } => "type",
            Self::Select { .. } => "select",
            Self::SelectMany { .. } => "select_many",
            Self::Pick { .. } => "pick",
            Self::Rating { .. } => "rating",
            Self::Range { .. } => "range",
            Self::Toggle { .. } => "toggle",
            Self::ClickLabel { .. } => "click_label",
            Self::Submit { .. } => "submit",
            Self::ExpectAlert { .. } => "expect_alert",
        }
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Type { label, text } => write!(f, "type '{text}' into '{label}'"),
            Self::Select { label, option } => write!(f, "select '{option}' in '{label}'"),
            Self::SelectMany { label, options } => {
                write!(f, "select {} in '{label}'", options.join(" + "))
            }
            Self::Pick { field, options } => write!(f, "pick {} in '{field}'", options.join(" + ")),
            Self::Rating { label, value } => write!(f, "rate '{label}' {value}"),
            Self::Range { label, value } => {
                write!(f, "set '{label}' to {}", format_number(*value))
            }
            Self::Toggle { label } => write!(f, "toggle '{label}'"),
            Self::ClickLabel { label } => write!(f, "click '{label}'"),
            Self::Submit { button } => write!(f, "press '{button}'"),
            Self::ExpectAlert { text } => write!(f, "expect alert '{text}'"),
        }
    }
}

// =============================================================================
// SCENARIO
// =============================================================================

/// An ordered fill script
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scenario {
    /// Scenario name
    pub name: String,
    /// Optional description
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,
    /// Steps, run in order
    pub steps: Vec<Step>,
}

impl Scenario {
    /// Create an empty scenario
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: String::new(),
            steps: Vec::new(),
        }
    }

    /// Append a step
    #[must_use]
    pub fn with_step(mut self, step: Step) -> Self {
        self.steps.push(step);
        self
    }

    /// Parse from YAML
    pub fn from_yaml_str(yaml: &str) -> ProbeResult<Self> {
        let scenario: Self = serde_yaml_ng::from_str(yaml)?;
        scenario.validate()?;
        Ok(scenario)
    }

    /// Load from a YAML file
    pub fn load(path: impl AsRef<Path>) -> ProbeResult<Self> {
        let text = std::fs::read_to_string(path.as_ref())?;
        Self::from_yaml_str(&text)
    }

    /// Serialize to YAML
    pub fn to_yaml(&self) -> ProbeResult<String> {
        Ok(serde_yaml_ng::to_string(self)?)
    }

    fn validate(&self) -> ProbeResult<()> {
        if self.steps.is_empty() {
            return Err(ProbeError::Config {
                message: format!("scenario '{}' has no steps", self.name),
            });
        }
        for (index, step) in self.steps.iter().enumerate() {
            let empty = match step {
                Step::SelectMany { options, .. } | Step::Pick { options, .. } => options.is_empty(),
                Step::Rating { value, .. } => *value == 0,
                _ => false,
            };
            if empty {
                return Err(ProbeError::Config {
                    message: format!("step {} ({}) has no target value", index + 1, step.action()),
                });
            }
        }
        Ok(())
    }

    /// The full job application fill, identical for every form variant
    #[must_use]
    pub fn job_application() -> Self {
        let steps = vec![
            Step::typed("Full Name", "John Doe"),
            Step::typed("Email Address", "john-doe@example.com"),
            Step::typed("Phone Number", "+5511987654321"),
            Step::typed("LinkedIn Profile", "johndoe"),
            Step::typed("Portfolio Website", "https://johndoe.com.br"),
            Step::select("Position Applying For", "Frontend Engineer"),
            Step::select("Department", "Engineering"),
            Step::select("Experience Level", "Junior (0-2 years)"),
            Step::SelectMany {
                label: "Technical Skills".to_string(),
                options: vec!["JavaScript".to_string(), "React".to_string()],
            },
            Step::Pick {
                field: "preferredLocations".to_string(),
                options: vec!["New York".to_string(), "Los Angeles".to_string()],
            },
            Step::Range {
                label: "Years of Experience".to_string(),
                value: 10.0,
            },
            Step::Rating {
                label: "Rate Your Overall Technical Proficiency".to_string(),
                value: 5,
            },
            Step::click("Full-Time"),
            Step::click("Remote Work"),
            Step::click("Hybrid"),
            Step::click("Health Insurance"),
            Step::click("Dental Insurance"),
            Step::click("Maybe, depends on location"),
            Step::toggle("Available for Immediate Start"),
            Step::toggle("Were you referred by an employee?"),
            Step::typed("Available Start Date", "2025-12-01"),
            Step::Range {
                label: "Salary Expectation".to_string(),
                value: 150_000.0,
            },
            Step::typed("Cover Letter", "Nothing to say"),
            Step::typed("Key Achievements", "Nothing to say"),
            Step::Submit {
                button: "Submit Application".to_string(),
            },
            Step::ExpectAlert {
                text: SUCCESS_TEXT.to_string(),
            },
        ];
        Self {
            name: "job application".to_string(),
            description: "Fill every field of the job application form and submit".to_string(),
            steps,
        }
    }
}

// =============================================================================
// REPORTS
// =============================================================================

/// Result of one completed step
#[derive(Debug, Clone, PartialEq)]
pub struct StepReport {
    /// 1-based step number
    pub index: usize,
    /// Human-readable step
    pub step: String,
    /// Strategy outcomes, for operations that run strategies
    pub outcomes: Vec<StrategyOutcome>,
    /// Time spent
    pub duration: Duration,
}

impl StepReport {
    /// Observed values reported by the step's strategies
    #[must_use]
    pub fn observed(&self) -> Vec<&str> {
        self.outcomes.iter().filter_map(StrategyOutcome::observed).collect()
    }
}

/// Result of a completed scenario
#[derive(Debug, Clone, PartialEq)]
pub struct ScenarioReport {
    /// Scenario name
    pub scenario: String,
    /// Completed steps
    pub steps: Vec<StepReport>,
    /// Total time
    pub duration: Duration,
}

impl ScenarioReport {
    /// Number of completed steps
    #[must_use]
    pub fn step_count(&self) -> usize {
        self.steps.len()
    }
}

// =============================================================================
// RUNNER
// =============================================================================

/// Sequential scenario executor
#[derive(Debug)]
pub struct ScenarioRunner<'a, D: DomDriver + ?Sized> {
    widgets: Widgets<'a, D>,
}

impl<'a, D: DomDriver + ?Sized> ScenarioRunner<'a, D> {
    /// Run scenarios through `widgets`
    #[must_use]
    pub const fn new(widgets: Widgets<'a, D>) -> Self {
        Self { widgets }
    }

    /// Operations used by the runner
    #[must_use]
    pub const fn widgets(&self) -> &Widgets<'a, D> {
        &self.widgets
    }

    /// Run every step; the first failing step aborts with its error
    pub async fn run(&self, scenario: &Scenario) -> ProbeResult<ScenarioReport> {
        self.run_with(scenario, |_| {}).await
    }

    /// Like [`Self::run`], reporting each completed step to `on_step`
    pub async fn run_with<F>(&self, scenario: &Scenario, mut on_step: F) -> ProbeResult<ScenarioReport>
    where
        F: FnMut(&StepReport),
    {
        let started = Instant::now();
        let mut steps = Vec::with_capacity(scenario.steps.len());
        tracing::info!(scenario = %scenario.name, steps = scenario.steps.len(), "scenario started");
        for (offset, step) in scenario.steps.iter().enumerate() {
            let index = offset + 1;
            let step_started = Instant::now();
            let outcomes = match self.execute(step).await {
                Ok(outcomes) => outcomes,
                Err(err) => {
                    tracing::error!(index, step = %step, error = %err, "scenario aborted");
                    return Err(err);
                }
            };
            let report = StepReport {
                index,
                step: step.to_string(),
                outcomes,
                duration: step_started.elapsed(),
            };
            tracing::info!(index, step = %report.step, "step done");
            on_step(&report);
            steps.push(report);
        }
        Ok(ScenarioReport {
            scenario: scenario.name.clone(),
            steps,
            duration: started.elapsed(),
        })
    }

    async fn execute(&self, step: &Step) -> ProbeResult<Vec<StrategyOutcome>> {
        let w = &self.widgets;
        match step {
            Step::Type { label, text } => w.type_into(label, text).await.map(|()| Vec::new()),
            Step::Select { label, option } => Ok(vec![w.select(label, option).await?]),
            Step::SelectMany { label, options } => {
                let options: Vec<&str> = options.iter().map(String::as_str).collect();
                w.select_many(label, &options).await
            }
            Step::Pick { field, options } => {
                let options: Vec<&str> = options.iter().map(String::as_str).collect();
                w.pick_options(field, &options).await
            }
            Step::Rating { label, value } => Ok(vec![w.set_rating(label, *value).await?]),
            Step::Range { label, value } => Ok(vec![w.set_range(label, *value).await?]),
            Step::Toggle { label } => Ok(vec![w.toggle_switch(label).await?]),
            Step::ClickLabel { label } => w.click_label(label).await.map(|()| Vec::new()),
            Step::Submit { button } => w.submit(button).await.map(|()| Vec::new()),
            Step::ExpectAlert { text } => w.expect_alert(text).await.map(|_| Vec::new()),
        }
    }
}
