//! The command line interface for the program.
use crate::log;
use crate::output::{
    DataWriter, SOLVER_LOG_FILE_NAME, create_output_directory, get_output_dir, write_metadata,
};
use crate::pipeline::{PipelineConfig, build, load_input, run_pipeline};
use crate::settings::Settings;
use crate::solver::HighsSolver;
use ::log::{info, warn};
use anyhow::{Context, Result};
use clap::{Args, CommandFactory, Parser, Subcommand};
use std::path::{Path, PathBuf};

pub mod example;
use example::ExampleSubcommands;
pub mod settings;
use settings::SettingsSubcommands;

/// The command line interface for the program.
#[derive(Parser)]
#[command(version, about)]
struct Cli {
    /// The available commands.
    #[command(subcommand)]
    command: Option<Commands>,
    /// Flag to provide the CLI docs as markdown
    #[arg(long, hide = true)]
    markdown_help: bool,
}

/// Options for the run command
#[derive(Args, Default)]
pub struct RunOpts {
    /// Directory for output files
    #[arg(short, long)]
    pub output_dir: Option<PathBuf>,
    /// Whether to overwrite the output directory if it already exists
    #[arg(long)]
    pub overwrite: bool,
    /// Whether to write the raw value of every decision variable to a CSV file
    #[arg(long)]
    pub debug_model: bool,
}

/// The available commands.
#[derive(Subcommand)]
enum Commands {
    /// Solve a unit commitment model.
    Run {
        /// Path to the model directory.
        model_dir: PathBuf,
        /// Other run options
        #[command(flatten)]
        opts: RunOpts,
    },
    /// Manage example models.
    Example {
        /// The available subcommands for managing example models.
        #[command(subcommand)]
        subcommand: ExampleSubcommands,
    },
    /// Validate a model without solving it.
    Validate {
        /// The path to the model directory.
        model_dir: PathBuf,
    },
    /// Manage settings file.
    Settings {
        /// The subcommands for managing the settings file.
        #[command(subcommand)]
        subcommand: SettingsSubcommands,
    },
}

impl Commands {
    /// Execute the supplied CLI command
    fn execute(self) -> Result<()> {
        match self {
            Self::Run { model_dir, opts } => handle_run_command(&model_dir, &opts, None),
            Self::Example { subcommand } => subcommand.execute(),
            Self::Validate { model_dir } => handle_validate_command(&model_dir, None),
            Self::Settings { subcommand } => subcommand.execute(),
        }
    }
}

/// Parse CLI arguments and run the requested command
pub fn run_cli() -> Result<()> {
    let cli = Cli::parse();

    // Invoked as: `$ unit-commitment --markdown-help`
    if cli.markdown_help {
        clap_markdown::print_help_markdown::<Cli>();
        return Ok(());
    }

    let Some(command) = cli.command else {
        // Output program help
        let help_str = Cli::command().render_long_help().to_string();
        println!("{help_str}");
        return Ok(());
    };

    command.execute()
}

/// Use the settings passed in by the caller or else read them from the settings file
fn settings_or_load(settings: Option<Settings>) -> Result<Settings> {
    match settings {
        Some(settings) => Ok(settings),
        None => Settings::load().context("Failed to load settings."),
    }
}

/// Initialise the program logger, unless this has already happened in this process
fn init_logger(settings: &Settings, output_dir: Option<&Path>) -> Result<()> {
    if log::is_logger_initialised() {
        return Ok(());
    }

    log::init(Some(&settings.log_level), output_dir).context("Failed to initialise logging.")
}

impl RunOpts {
    /// Command-line flags take priority over the settings file
    fn override_settings(&self, settings: &mut Settings) {
        settings.debug_model |= self.debug_model;
        settings.overwrite |= self.overwrite;
    }

    /// The folder to write results to for the model in `model_path`
    fn resolve_output_dir(&self, model_path: &Path) -> Result<PathBuf> {
        match &self.output_dir {
            Some(output_dir) => Ok(output_dir.clone()),
            None => get_output_dir(model_path),
        }
    }
}

/// Handle the `run` command.
///
/// Loads the model in `model_path`, solves it with HiGHS and writes the schedules and summaries
/// to the output folder.
pub fn handle_run_command(
    model_path: &Path,
    opts: &RunOpts,
    settings: Option<Settings>,
) -> Result<()> {
    let mut settings = settings_or_load(settings)?;
    opts.override_settings(&mut settings);

    let output_path = opts.resolve_output_dir(model_path)?;
    let overwritten = create_output_directory(&output_path, settings.overwrite)
        .with_context(|| format!("Failed to create output directory: {}", output_path.display()))?;

    init_logger(&settings, Some(&output_path))?;
    if overwritten {
        warn!("Overwriting previous results in {}", output_path.display());
    }
    info!("Output folder: {}", output_path.display());

    let (parameters, input) = load_input(model_path)?;
    write_metadata(&output_path, model_path, &parameters, &input)
        .context("Failed to save metadata.")?;

    let solver_log_file = settings
        .write_solver_log
        .then(|| output_path.join(SOLVER_LOG_FILE_NAME));
    let config = PipelineConfig::new(&parameters, solver_log_file);
    let output = run_pipeline(&input, &config, &HighsSolver)?;

    let mut writer = DataWriter::create(&output_path, settings.debug_model)
        .context("Failed to create output files.")?;
    writer.write_results(&output.results)?;
    if settings.debug_model {
        writer.write_debug_info(&input, &output.model.variables, &output.solution)?;
    }
    writer.flush()?;

    let fleet = &output.results.fleet_summary;
    info!(
        "Run complete! Total cost: {}; total output: {}; starts: {}; stops: {}",
        fleet.overall_cost, fleet.overall_output, fleet.overall_start_days, fleet.overall_stop_days
    );

    Ok(())
}

/// Handle the `validate` command.
///
/// Reads and validates the input files, then builds (but does not solve) the model. No log files
/// are written.
pub fn handle_validate_command(model_path: &Path, settings: Option<Settings>) -> Result<()> {
    let settings = settings_or_load(settings)?;
    init_logger(&settings, None)?;

    let (parameters, input) = load_input(model_path)?;
    let model = build(&input, &PipelineConfig::new(&parameters, None))?;
    info!(
        "Model validation successful! {} periods, {} generators, {} variables, {} constraints",
        input.num_periods(),
        input.num_generators(),
        model.problem.num_columns(),
        model.problem.num_rows()
    );

    Ok(())
}
