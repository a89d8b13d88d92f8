//! CLI surface for printhall.
//!
//! Thin parsing layer over [`crate::sim::run`]: resolve the scenario and
//! tuning from flags and files, then hand off.

use std::ffi::OsString;
use std::path::{Path, PathBuf};

use clap::{ArgAction, Args, Parser, Subcommand, builder::BoolishValueParser};

use crate::Result;
use crate::config::{ConfigError, Scenario, Tuning, load_tuning};
use crate::sim::{EventFormat, RunOptions};

#[derive(Parser, Debug)]
#[command(
    name = "printhall",
    version,
    about = "Printing hall simulation",
    arg_required_else_help = true
)]
pub struct Cli {
    /// Machine-readable JSON output (default: false; use `--json` for scripting).
    #[arg(
        long,
        global = true,
        default_value_t = false,
        num_args = 0..=1,
        value_parser = BoolishValueParser::new()
    )]
    pub json: bool,

    /// Tuning file (default: built-in defaults).
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Errors only.
    #[arg(
        short = 'q',
        long,
        global = true,
        default_value_t = false,
        num_args = 0..=1,
        value_parser = BoolishValueParser::new()
    )]
    pub quiet: bool,

    /// Debug output (repeat for more).
    #[arg(short = 'v', long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run a scenario to completion, streaming events to stdout.
    Run(ScenarioArgs),
    /// Check a scenario and print its resolved shape without running it.
    Validate(ScenarioArgs),
}

#[derive(Args, Debug)]
pub struct ScenarioArgs {
    /// Scenario parameters: N M w x y.
    #[arg(value_name = "PARAM", num_args = 0..=5)]
    pub params: Vec<u64>,

    /// Read "N M w x y" from a file instead.
    #[arg(short = 'i', long, value_name = "PATH", conflicts_with = "params")]
    pub input: Option<PathBuf>,

    /// Staff reader count.
    #[arg(long, value_name = "COUNT")]
    pub staff: Option<u32>,

    /// Binding station count.
    #[arg(long = "bind-stations", value_name = "COUNT")]
    pub bind_stations: Option<usize>,

    /// Mean random delay, in time units.
    #[arg(long, value_name = "MEAN")]
    pub mean: Option<f64>,

    /// Seed for reproducible delays.
    #[arg(long, value_name = "SEED")]
    pub seed: Option<u64>,

    /// Wall-clock milliseconds per time unit (0 runs as fast as possible).
    #[arg(long = "time-unit-ms", value_name = "MS")]
    pub time_unit_ms: Option<u64>,
}

/// Parse argv (used by bin and tests).
pub fn parse_from<I, T>(args: I) -> Cli
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    Cli::parse_from(args)
}

/// Run the CLI (used by bin).
pub fn run(cli: Cli) -> Result<()> {
    let format = if cli.json {
        EventFormat::Json
    } else {
        EventFormat::Text
    };

    match cli.command {
        Commands::Run(args) => {
            let scenario = resolve_scenario(&args)?;
            let tuning = resolve_tuning(cli.config.as_deref(), &args)?;
            let options = RunOptions {
                scenario,
                tuning,
                format,
            };
            let report = crate::sim::run(&options, Box::new(std::io::stdout()))?;
            tracing::info!(
                events = report.events.len(),
                submissions = report.submissions,
                "run finished"
            );
            Ok(())
        }
        Commands::Validate(args) => {
            let scenario = resolve_scenario(&args)?;
            let tuning = resolve_tuning(cli.config.as_deref(), &args)?;
            if cli.json {
                println!(
                    "{}",
                    serde_json::json!({
                        "scenario": scenario,
                        "groups": scenario.groups(),
                        "tuning": tuning,
                    })
                );
            } else {
                println!(
                    "scenario: {} students in {} groups of {}",
                    scenario.students,
                    scenario.groups(),
                    scenario.group_size
                );
                println!(
                    "durations: print {}, bind {}, entry {} time units",
                    scenario.print_units, scenario.bind_units, scenario.entry_units
                );
                println!(
                    "tuning: {} staff, {} binding stations, mean delay {}",
                    tuning.staff, tuning.bind_stations, tuning.delay_mean
                );
            }
            Ok(())
        }
    }
}

fn resolve_scenario(args: &ScenarioArgs) -> Result<Scenario> {
    let scenario = match (&args.input, args.params.as_slice()) {
        (Some(path), _) => Scenario::load(path)?,
        (None, []) => return Err(ConfigError::MissingScenario.into()),
        (None, params) => Scenario::from_params(params)?,
    };
    scenario.validate()?;
    Ok(scenario)
}

fn resolve_tuning(config: Option<&Path>, args: &ScenarioArgs) -> Result<Tuning> {
    let mut tuning = match config {
        Some(path) => load_tuning(path)?,
        None => Tuning::default(),
    };
    if let Some(staff) = args.staff {
        tuning.staff = staff;
    }
    if let Some(stations) = args.bind_stations {
        tuning.bind_stations = stations;
    }
    if let Some(mean) = args.mean {
        tuning.delay_mean = mean;
    }
    if let Some(seed) = args.seed {
        tuning.seed = Some(seed);
    }
    if let Some(ms) = args.time_unit_ms {
        tuning.time_unit_ms = ms;
    }
    tuning.validate()?;
    Ok(tuning)
}
