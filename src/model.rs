//! Defines the `ModelParameters` struct, which represents the contents of `model.toml`.
use crate::input::{input_err_msg, read_toml};
use crate::solver::SolveOptions;
use anyhow::{Context, Result, ensure};
use log::info;
use serde::Deserialize;
use serde_string_enum::{DeserializeLabeledStringEnum, SerializeLabeledStringEnum};
use std::path::{Path, PathBuf};

const MODEL_PARAMETERS_FILE_NAME: &str = "model.toml";

/// How generators are treated before the first period of the horizon
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[derive(SerializeLabeledStringEnum, DeserializeLabeledStringEnum)]
pub enum InitialState {
    /// All generators are off before the first period, so running in the first period counts as
    /// a start
    #[default]
    #[string = "off"]
    Off,
    /// The state in the first period is unconstrained and no start is implied by it
    #[string = "free"]
    Free,
}

/// Represents the contents of the entire model file.
///
/// Every field is optional and the file itself may be omitted. Unknown fields are rejected.
#[derive(Debug, Deserialize, PartialEq, Default)]
#[serde(deny_unknown_fields)]
pub struct ModelParameters {
    /// The state of generators before the first period
    #[serde(default)]
    pub initial_state: InitialState,
    /// Wall-clock budget for the solver, in seconds
    #[serde(default)]
    pub time_limit: Option<f64>,
    /// Relative gap between the best solution and the best bound at which the solver may stop
    #[serde(default)]
    pub mip_rel_gap: Option<f64>,
}

/// Check that the `time_limit` parameter is valid
fn check_time_limit(value: Option<f64>) -> Result<()> {
    if let Some(value) = value {
        ensure!(
            value.is_finite() && value > 0.0,
            "time_limit must be a finite number greater than zero"
        );
    }

    Ok(())
}

/// Check that the `mip_rel_gap` parameter is valid
fn check_mip_rel_gap(value: Option<f64>) -> Result<()> {
    if let Some(value) = value {
        ensure!(
            (0.0..=1.0).contains(&value),
            "mip_rel_gap must be between 0 and 1"
        );
    }

    Ok(())
}

impl ModelParameters {
    /// Read a model file from the specified directory.
    ///
    /// If the file is not present, default values are used.
    ///
    /// # Arguments
    ///
    /// * `model_dir` - Folder containing model configuration files
    ///
    /// # Returns
    ///
    /// The model file contents as a [`ModelParameters`] struct or an error if the file is invalid
    pub fn from_path<P: AsRef<Path>>(model_dir: P) -> Result<ModelParameters> {
        let file_path = model_dir.as_ref().join(MODEL_PARAMETERS_FILE_NAME);
        if !file_path.is_file() {
            info!("No {MODEL_PARAMETERS_FILE_NAME} found; using default model parameters");
            return Ok(ModelParameters::default());
        }

        let model_params: ModelParameters = read_toml(&file_path)?;
        model_params
            .validate()
            .with_context(|| input_err_msg(file_path))?;

        Ok(model_params)
    }

    /// Validate parameters after reading in file
    fn validate(&self) -> Result<()> {
        check_time_limit(self.time_limit)?;
        check_mip_rel_gap(self.mip_rel_gap)?;

        Ok(())
    }

    /// Options to pass to the solving engine
    ///
    /// # Arguments
    ///
    /// * `log_file` - Where the engine should write its log, if anywhere
    pub fn solve_options(&self, log_file: Option<PathBuf>) -> SolveOptions {
        SolveOptions {
            time_limit: self.time_limit,
            mip_rel_gap: self.mip_rel_gap,
            log_file,
        }
    }
}
