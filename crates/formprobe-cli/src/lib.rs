//! Formprobe CLI Library
//!
//! Command-line interface for the formprobe interaction layer: run a YAML
//! scenario against any page, or fill one of the job application variants
//! with the built-in scenario.

#![warn(missing_docs)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]

mod commands;
mod config;
mod error;
pub mod logging;
mod output;
mod runner;

pub use commands::{
    BrowserArgs, Cli, ColorArg, Commands, FillArgs, RunArgs, ScenarioArgs, VariantArg,
};
pub use config::{CliConfig, ColorChoice, Verbosity};
pub use error::{CliError, CliResult};
pub use output::{format_step, Reporter};
pub use runner::{run_scenario, RunOptions, READY_SELECTOR};
