//! Formprobe CLI: fill cross-library forms in a real browser
//!
//! ## Usage
//!
//! ```bash
//! formprobe fill --variant chakra                          # Built-in scenario
//! formprobe run --scenario fill.yaml --url http://host/x   # Scenario file
//! formprobe scenario > fill.yaml                           # Start from the built-in one
//! ```

use clap::Parser;
use formprobe::{FormVariant, Scenario};
use formprobe_cli::{
    logging, run_scenario, Cli, CliConfig, CliResult, ColorChoice, Commands, FillArgs, Reporter,
    RunArgs, RunOptions, ScenarioArgs, Verbosity,
};
use std::process::ExitCode;

fn main() -> ExitCode {
    let cli = Cli::parse();
    let config = build_config(&cli);
    logging::init(&config);
    let reporter = Reporter::new(config.color.should_color(), config.verbosity.is_quiet());

    match run(cli.command, &reporter) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            reporter.failure(&e.to_string());
            ExitCode::FAILURE
        }
    }
}

fn build_config(cli: &Cli) -> CliConfig {
    let color: ColorChoice = cli.color.into();
    CliConfig::new()
        .with_verbosity(Verbosity::from_flags(cli.quiet, cli.verbose))
        .with_color(color)
        .with_json_logs(cli.log_json)
}

fn run(command: Commands, reporter: &Reporter) -> CliResult<()> {
    match command {
        Commands::Run(args) => run_file(&args, reporter),
        Commands::Fill(args) => run_fill(&args, reporter),
        Commands::Scenario(args) => print_scenario(&args, reporter),
    }
}

fn run_file(args: &RunArgs, reporter: &Reporter) -> CliResult<()> {
    let scenario = Scenario::load(&args.scenario)?;
    let options = RunOptions::from_args(args.url.clone(), &args.browser)?;
    execute(&scenario, &options, reporter)
}

fn run_fill(args: &FillArgs, reporter: &Reporter) -> CliResult<()> {
    let variant = FormVariant::from(args.variant);
    let options = RunOptions::from_args(variant.url(&args.base_url), &args.browser)?;
    tracing::info!(%variant, url = %options.url, "filling job application");
    execute(&Scenario::job_application(), &options, reporter)
}

fn execute(scenario: &Scenario, options: &RunOptions, reporter: &Reporter) -> CliResult<()> {
    reporter.start(&scenario.name, &options.url, scenario.steps.len());
    let report = run_scenario(scenario, options, reporter)?;
    reporter.summary(&report);
    Ok(())
}

fn print_scenario(args: &ScenarioArgs, reporter: &Reporter) -> CliResult<()> {
    let scenario = match &args.file {
        Some(path) => Scenario::load(path)?,
        None => Scenario::job_application(),
    };
    reporter.print(&scenario.to_yaml()?);
    Ok(())
}
