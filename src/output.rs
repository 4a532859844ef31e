//! The module responsible for writing output data to disk.
use crate::generator::GeneratorID;
use crate::input::InputData;
use crate::optimisation::VariableMap;
use crate::postprocess::{CommitmentResults, DailySchedule, FleetSummary, GeneratorSummary};
use crate::solver::{Solution, SolveStatus};
use anyhow::{Context, Result, ensure};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fs;
use std::fs::File;
use std::path::{Path, PathBuf};

pub mod metadata;
pub use metadata::write_metadata;

/// The root folder in which model-specific output folders will be created
const OUTPUT_DIRECTORY_ROOT: &str = "uc_results";

/// The output file name for daily schedules
const SCHEDULES_FILE_NAME: &str = "schedules.csv";

/// The output file name for per-generator summaries
const GENERATOR_SUMMARIES_FILE_NAME: &str = "generator_summaries.csv";

/// The output file name for the fleet summary
const FLEET_SUMMARY_FILE_NAME: &str = "fleet_summary.csv";

/// The output file name for raw variable values
const DEBUG_VARIABLES_FILE_NAME: &str = "debug_variables.csv";

/// The output file name for the solver's log
pub const SOLVER_LOG_FILE_NAME: &str = "solver.log";

/// Get the default output directory for the model specified at `model_dir`
pub fn get_output_dir(model_dir: &Path) -> Result<PathBuf> {
    // Get the model name from the dir path. We canonicalise in case the user has specified ".".
    let model_dir = model_dir
        .canonicalize()
        .context("Could not resolve path to model")?;

    let model_name = model_dir
        .file_name()
        .context("Model cannot be in root folder")?
        .to_str()
        .context("Invalid chars in model dir name")?;

    Ok([OUTPUT_DIRECTORY_ROOT, model_name].iter().collect())
}

/// Create a new output directory, with parents.
///
/// A directory which already exists and is not empty is only reused if `allow_overwrite` is set,
/// in which case its contents are deleted.
///
/// # Returns
///
/// Whether an existing directory with contents was overwritten.
pub fn create_output_directory(output_dir: &Path, allow_overwrite: bool) -> Result<bool> {
    let overwrite = if let Ok(mut it) = fs::read_dir(output_dir) {
        if it.next().is_none() {
            // Directory exists and is empty: nothing to do
            return Ok(false);
        }

        ensure!(
            allow_overwrite,
            "Output folder already exists and is not empty. Use --overwrite to replace it."
        );

        fs::remove_dir_all(output_dir)?;
        true
    } else {
        false
    };

    fs::create_dir_all(output_dir)?;

    Ok(overwrite)
}

/// Represents a row in the schedules CSV file
#[derive(Serialize, Deserialize, Debug, PartialEq)]
struct ScheduleRow {
    date: NaiveDate,
    generator_id: GeneratorID,
    start: u8,
    stop: u8,
    operation: u8,
    output: f64,
    cost: f64,
}

impl ScheduleRow {
    fn new(schedule: &DailySchedule) -> Self {
        Self {
            date: schedule.date,
            generator_id: schedule.generator_id.clone(),
            start: schedule.start.into(),
            stop: schedule.stop.into(),
            operation: schedule.operation.into(),
            output: schedule.output.value(),
            cost: schedule.cost.value(),
        }
    }
}

/// Represents a row in the generator summaries CSV file
#[derive(Serialize, Deserialize, Debug, PartialEq)]
struct GeneratorSummaryRow {
    generator_id: GeneratorID,
    generator_cost: f64,
    generator_output: f64,
    generator_operation_days: u32,
    generator_start_days: u32,
    generator_stop_days: u32,
}

impl GeneratorSummaryRow {
    fn new(summary: &GeneratorSummary) -> Self {
        Self {
            generator_id: summary.generator_id.clone(),
            generator_cost: summary.generator_cost.value(),
            generator_output: summary.generator_output.value(),
            generator_operation_days: summary.generator_operation_days,
            generator_start_days: summary.generator_start_days,
            generator_stop_days: summary.generator_stop_days,
        }
    }
}

/// Represents the row of the fleet summary CSV file
#[derive(Serialize, Deserialize, Debug, PartialEq)]
struct FleetSummaryRow {
    solve_status: String,
    overall_cost: f64,
    overall_output: f64,
    overall_operation_days: u32,
    overall_start_days: u32,
    overall_stop_days: u32,
}

impl FleetSummaryRow {
    fn new(status: SolveStatus, summary: &FleetSummary) -> Self {
        Self {
            solve_status: status.to_string(),
            overall_cost: summary.overall_cost.value(),
            overall_output: summary.overall_output.value(),
            overall_operation_days: summary.overall_operation_days,
            overall_start_days: summary.overall_start_days,
            overall_stop_days: summary.overall_stop_days,
        }
    }
}

/// Represents a row in the debug variables CSV file
#[derive(Serialize, Deserialize, Debug, PartialEq)]
struct DebugVariableRow {
    variable: String,
    date: NaiveDate,
    generator_id: GeneratorID,
    value: f64,
}

/// For writing extra debug information about the model
struct DebugDataWriter {
    variables_writer: csv::Writer<File>,
}

impl DebugDataWriter {
    /// Open CSV files to write debug info to
    ///
    /// # Arguments
    ///
    /// * `output_path` - Folder where files will be saved
    fn create(output_path: &Path) -> Result<Self> {
        Ok(Self {
            variables_writer: csv::Writer::from_path(output_path.join(DEBUG_VARIABLES_FILE_NAME))?,
        })
    }

    /// Write the raw value of every decision variable
    fn write_variables(
        &mut self,
        input: &InputData,
        variables: &VariableMap,
        solution: &Solution,
    ) -> Result<()> {
        for (kind, period, generator, var) in variables.iter() {
            let row = DebugVariableRow {
                variable: kind.to_string(),
                date: input.time_series()[period].date,
                generator_id: input.generators()[generator].id.clone(),
                value: solution.values[var.index()],
            };
            self.variables_writer.serialize(row)?;
        }

        Ok(())
    }

    /// Flush the underlying streams
    fn flush(&mut self) -> Result<()> {
        self.variables_writer.flush()?;

        Ok(())
    }
}

/// An object for writing schedules and summaries to file
pub struct DataWriter {
    schedules_writer: csv::Writer<File>,
    generator_summaries_writer: csv::Writer<File>,
    fleet_summary_writer: csv::Writer<File>,
    debug_writer: Option<DebugDataWriter>,
}

impl DataWriter {
    /// Open CSV files to write output data to
    ///
    /// # Arguments
    ///
    /// * `output_path` - Folder where files will be saved
    /// * `save_debug_info` - Whether to include extra CSV files for debugging model
    pub fn create(output_path: &Path, save_debug_info: bool) -> Result<Self> {
        let new_writer = |file_name| {
            let file_path = output_path.join(file_name);
            csv::Writer::from_path(file_path)
        };

        let debug_writer = if save_debug_info {
            // Create debug CSV files
            Some(DebugDataWriter::create(output_path)?)
        } else {
            None
        };

        Ok(Self {
            schedules_writer: new_writer(SCHEDULES_FILE_NAME)?,
            generator_summaries_writer: new_writer(GENERATOR_SUMMARIES_FILE_NAME)?,
            fleet_summary_writer: new_writer(FLEET_SUMMARY_FILE_NAME)?,
            debug_writer,
        })
    }

    /// Write schedules and summaries to CSV files
    pub fn write_results(&mut self, results: &CommitmentResults) -> Result<()> {
        for schedule in &results.schedules {
            self.schedules_writer.serialize(ScheduleRow::new(schedule))?;
        }

        for summary in &results.generator_summaries {
            self.generator_summaries_writer
                .serialize(GeneratorSummaryRow::new(summary))?;
        }

        self.fleet_summary_writer
            .serialize(FleetSummaryRow::new(results.status, &results.fleet_summary))?;

        Ok(())
    }

    /// Write debug information to CSV files
    pub fn write_debug_info(
        &mut self,
        input: &InputData,
        variables: &VariableMap,
        solution: &Solution,
    ) -> Result<()> {
        if let Some(ref mut wtr) = self.debug_writer {
            wtr.write_variables(input, variables, solution)?;
        }

        Ok(())
    }

    /// Flush the underlying streams
    pub fn flush(&mut self) -> Result<()> {
        self.schedules_writer.flush()?;
        self.generator_summaries_writer.flush()?;
        self.fleet_summary_writer.flush()?;
        if let Some(ref mut wtr) = self.debug_writer {
            wtr.flush()?;
        }

        Ok(())
    }
}
