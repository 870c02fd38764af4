//! CLI command definitions using clap

use clap::{Parser, Subcommand, ValueEnum};
use formprobe::{FormVariant, DEFAULT_BASE_URL};
use std::path::PathBuf;

/// Formprobe: fill Material, Chakra and Bootstrap forms through one interaction layer
#[derive(Parser, Debug)]
#[command(name = "formprobe")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Verbosity level (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Quiet mode (suppress non-error output)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Color output (auto, always, never)
    #[arg(long, default_value = "auto", global = true)]
    pub color: ColorArg,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    pub log_json: bool,

    /// Subcommand to run
    #[command(subcommand)]
    pub command: Commands,
}

/// CLI subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run a scenario file against a page
    Run(RunArgs),

    /// Fill and submit the job application form of one variant
    Fill(FillArgs),

    /// Print a scenario as YAML (the built-in one unless a file is given)
    Scenario(ScenarioArgs),
}

/// Browser options shared by commands that open a page
#[derive(Parser, Debug, Clone)]
pub struct BrowserArgs {
    /// Show the browser window
    #[arg(long)]
    pub headed: bool,

    /// Disable the Chromium sandbox (containers, CI)
    #[arg(long)]
    pub no_sandbox: bool,

    /// Path to the Chromium executable
    #[arg(long, env = "FORMPROBE_CHROMIUM")]
    pub chromium: Option<PathBuf>,

    /// Wait window for menus, lists and alerts, in milliseconds
    #[arg(long)]
    pub timeout_ms: Option<u64>,

    /// Probe configuration file (YAML)
    #[arg(long)]
    pub config: Option<PathBuf>,
}

/// Arguments for the run command
#[derive(Parser, Debug)]
pub struct RunArgs {
    /// Scenario file (YAML)
    #[arg(short, long)]
    pub scenario: PathBuf,

    /// Page to open
    #[arg(short, long)]
    pub url: String,

    /// Browser options
    #[command(flatten)]
    pub browser: BrowserArgs,
}

/// Arguments for the fill command
#[derive(Parser, Debug)]
pub struct FillArgs {
    /// Form variant to fill
    #[arg(long, value_enum)]
    pub variant: VariantArg,

    /// Base URL of the form application
    #[arg(long, default_value = DEFAULT_BASE_URL)]
    pub base_url: String,

    /// Browser options
    #[command(flatten)]
    pub browser: BrowserArgs,
}

/// Arguments for the scenario command
#[derive(Parser, Debug)]
pub struct ScenarioArgs {
    /// Validate and print this scenario file instead of the built-in one
    #[arg(short, long)]
    pub file: Option<PathBuf>,
}

/// Color argument
#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ColorArg {
    /// Automatic color detection
    #[default]
    Auto,
    /// Always use colors
    Always,
    /// Never use colors
    Never,
}

impl From<ColorArg> for crate::config::ColorChoice {
    fn from(arg: ColorArg) -> Self {
        match arg {
            ColorArg::Auto => Self::Auto,
            ColorArg::Always => Self::Always,
            ColorArg::Never => Self::Never,
        }
    }
}

/// Form variant argument
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum VariantArg {
    /// Material UI
    #[value(alias = "mui")]
    Material,
    /// Chakra UI
    Chakra,
    /// React-Bootstrap
    Bootstrap,
}

impl From<VariantArg> for FormVariant {
    fn from(arg: VariantArg) -> Self {
        match arg {
            VariantArg::Material => Self::Material,
            VariantArg::Chakra => Self::Chakra,
            VariantArg::Bootstrap => Self::Bootstrap,
        }
    }
}
