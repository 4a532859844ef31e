//! Code for reading generator parameters from a CSV file.
use super::{check_unique_ids, input_err_msg, read_csv};
use crate::generator::GeneratorParameters;
use crate::units::{Money, MoneyPerPower, Power};
use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;

const GENERATOR_PARAMETERS_FILE_NAME: &str = "generator_parameters.csv";

/// Default for `min_operation_time` and `min_down_time` when not given (periods)
const DEFAULT_MIN_TIME: u32 = 0;

/// Represents a single row of the generator parameters CSV file.
///
/// Optional columns may be omitted entirely or left empty for individual generators.
#[derive(Debug, Clone, Deserialize, PartialEq)]
struct GeneratorParametersRaw {
    generator_id: String,
    #[serde(rename = "Pmin")]
    pmin: f64,
    #[serde(rename = "Pmax")]
    pmax: f64,
    cost_run: f64,
    cost_start: f64,
    cost_stop: f64,
    #[serde(default)]
    min_operation_time: Option<u32>,
    #[serde(default, alias = "max_operation_time")]
    min_down_time: Option<u32>,
    #[serde(default)]
    ramp_up: Option<f64>,
    #[serde(default)]
    ramp_down: Option<f64>,
}

impl GeneratorParametersRaw {
    /// Convert into [`GeneratorParameters`], filling in defaults for missing optional values.
    ///
    /// Minimum run and down times default to zero. Ramp limits default to `Pmax`, which never
    /// binds because output can't change by more than `Pmax` between periods.
    fn into_parameters(self) -> GeneratorParameters {
        GeneratorParameters {
            id: self.generator_id.into(),
            pmin: Power(self.pmin),
            pmax: Power(self.pmax),
            cost_run: MoneyPerPower(self.cost_run),
            cost_start: Money(self.cost_start),
            cost_stop: Money(self.cost_stop),
            min_operation_time: self.min_operation_time.unwrap_or(DEFAULT_MIN_TIME),
            min_down_time: self.min_down_time.unwrap_or(DEFAULT_MIN_TIME),
            ramp_up: Power(self.ramp_up.unwrap_or(self.pmax)),
            ramp_down: Power(self.ramp_down.unwrap_or(self.pmax)),
        }
    }
}

/// Read generator parameters from the model directory.
///
/// # Arguments
///
/// * `model_dir` - Folder containing model configuration files
///
/// # Returns
///
/// The generators in file order.
pub fn read_generator_parameters(model_dir: &Path) -> Result<Vec<GeneratorParameters>> {
    let file_path = model_dir.join(GENERATOR_PARAMETERS_FILE_NAME);
    let generators = read_csv(&file_path)?;
    read_generator_parameters_from_iter(generators.into_iter())
        .with_context(|| input_err_msg(&file_path))
}

fn read_generator_parameters_from_iter<I>(iter: I) -> Result<Vec<GeneratorParameters>>
where
    I: Iterator<Item = GeneratorParametersRaw>,
{
    let mut generators = Vec::new();
    for raw in iter {
        let generator = raw.into_parameters();
        generator.validate()?;
        generators.push(generator);
    }
    check_unique_ids(&generators)?;

    Ok(generators)
}
