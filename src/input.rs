//! Common routines for handling input data.
use crate::demand::{TimeSeriesPoint, check_time_series};
use crate::error::ValidationError;
use crate::generator::GeneratorParameters;
use crate::model::ModelParameters;
use anyhow::{Context, Result, ensure};
use indexmap::IndexSet;
use serde::de::DeserializeOwned;
use std::fs;
use std::path::Path;

pub mod demand;
use demand::read_time_series;
pub mod generator;
use generator::read_generator_parameters;

/// The validated inputs to a unit commitment problem.
///
/// Holds the demand time series (T periods, in chronological order) and the generator fleet (P
/// generators with unique IDs). Once constructed, it cannot be modified.
#[derive(Debug, Clone, PartialEq)]
pub struct InputData {
    time_series: Vec<TimeSeriesPoint>,
    generators: Vec<GeneratorParameters>,
}

impl InputData {
    /// Create a new [`InputData`], validating every record.
    ///
    /// # Arguments
    ///
    /// * `time_series` - Demand for each period, in chronological order
    /// * `generators` - Parameters for each generator in the fleet
    pub fn new(
        time_series: Vec<TimeSeriesPoint>,
        generators: Vec<GeneratorParameters>,
    ) -> Result<Self, ValidationError> {
        check_time_series(&time_series)?;
        for generator in &generators {
            generator.validate()?;
        }
        check_unique_ids(&generators)?;

        Ok(Self {
            time_series,
            generators,
        })
    }

    /// The demand time series
    pub fn time_series(&self) -> &[TimeSeriesPoint] {
        &self.time_series
    }

    /// The generator fleet
    pub fn generators(&self) -> &[GeneratorParameters] {
        &self.generators
    }

    /// The number of periods in the horizon (T)
    pub fn num_periods(&self) -> usize {
        self.time_series.len()
    }

    /// The number of generators in the fleet (P)
    pub fn num_generators(&self) -> usize {
        self.generators.len()
    }
}

/// Check that no two generators share an ID
pub fn check_unique_ids(generators: &[GeneratorParameters]) -> Result<(), ValidationError> {
    let mut ids = IndexSet::new();
    for generator in generators {
        let id = &generator.id;
        if !ids.insert(id) {
            return Err(ValidationError::DuplicateGenerator(id.to_string()));
        }
    }

    Ok(())
}

/// Read a series of type `T`s from a CSV file.
///
/// Leading and trailing whitespace is trimmed from every field. An empty file is an error.
///
/// # Arguments
///
/// * `file_path` - Path to the CSV file
pub fn read_csv<T: DeserializeOwned>(file_path: &Path) -> Result<Vec<T>> {
    let vec = read_csv_records(file_path).with_context(|| input_err_msg(file_path))?;
    ensure!(!vec.is_empty(), "{}: CSV file cannot be empty", input_err_msg(file_path));

    Ok(vec)
}

fn read_csv_records<T: DeserializeOwned>(file_path: &Path) -> Result<Vec<T>> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_path(file_path)?;

    let mut vec = Vec::new();
    for result in reader.deserialize() {
        vec.push(result?);
    }

    Ok(vec)
}

/// Parse a TOML file at the specified path.
///
/// # Arguments
///
/// * `file_path` - Path to the TOML file
///
/// # Returns
///
/// * The deserialised TOML data or an error if the file could not be read or parsed.
pub fn read_toml<T: DeserializeOwned>(file_path: &Path) -> Result<T> {
    let toml_str = fs::read_to_string(file_path).with_context(|| input_err_msg(file_path))?;
    let toml_data = toml::from_str(&toml_str).with_context(|| input_err_msg(file_path))?;
    Ok(toml_data)
}

/// Format an error message to include the file path.
pub fn input_err_msg<P: AsRef<Path>>(file_path: P) -> String {
    format!("Error reading {}", file_path.as_ref().display())
}

/// Load the inputs for a unit commitment model from the specified directory.
///
/// # Arguments
///
/// * `model_dir` - Folder containing the input files
///
/// # Returns
///
/// The model parameters and the validated input data.
pub fn load_model<P: AsRef<Path>>(model_dir: P) -> Result<(ModelParameters, InputData)> {
    let model_dir = model_dir.as_ref();
    let parameters = ModelParameters::from_path(model_dir)?;
    let time_series = read_time_series(model_dir)?;
    let generators = read_generator_parameters(model_dir)?;

    let input = InputData::new(time_series, generators)?;

    Ok((parameters, input))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixture::{generator, time_series};
    use rstest::rstest;
    use serde::Deserialize;
    use std::fs::File;
    use std::io::Write;
    use tempfile::tempdir;

    #[derive(Debug, PartialEq, Deserialize)]
    struct Record {
        id: String,
        value: u32,
    }

    /// Create an example CSV file in dir_path
    fn create_csv_file(dir_path: &Path, contents: &str) -> std::path::PathBuf {
        let file_path = dir_path.join("test.csv");
        let mut file = File::create(&file_path).unwrap();
        writeln!(file, "{contents}").unwrap();
        file_path
    }

    #[test]
    fn test_read_csv() {
        let dir = tempdir().unwrap();
        let file_path = create_csv_file(dir.path(), "id,value\nhello, 1\n  world  ,2\n");
        let records: Vec<Record> = read_csv(&file_path).unwrap();
        assert_eq!(
            records,
            &[
                Record {
                    id: "hello".to_string(),
                    value: 1,
                },
                Record {
                    id: "world".to_string(),
                    value: 2,
                }
            ]
        );

        // File with no data rows
        let file_path = create_csv_file(dir.path(), "id,value\n");
        assert!(read_csv::<Record>(&file_path).is_err());

        // Missing file
        assert!(read_csv::<Record>(&dir.path().join("missing.csv")).is_err());
    }

    #[test]
    fn test_read_toml() {
        #[derive(Debug, PartialEq, Deserialize)]
        struct Value {
            value: u32,
        }

        let dir = tempdir().unwrap();
        let file_path = dir.path().join("test.toml");
        {
            let mut file = File::create(&file_path).unwrap();
            writeln!(file, "value = 1").unwrap();
        }
        assert_eq!(read_toml::<Value>(&file_path).unwrap(), Value { value: 1 });

        {
            let mut file = File::create(&file_path).unwrap();
            writeln!(file, "bad toml syntax").unwrap();
        }
        assert!(read_toml::<Value>(&file_path).is_err());
    }

    #[rstest]
    fn test_input_data_new(time_series: Vec<TimeSeriesPoint>, generator: GeneratorParameters) {
        let input = InputData::new(time_series.clone(), vec![generator.clone()]).unwrap();
        assert_eq!(input.num_periods(), 3);
        assert_eq!(input.num_generators(), 1);
        assert_eq!(input.time_series(), time_series.as_slice());
        assert_eq!(input.generators(), &[generator]);
    }

    #[rstest]
    fn test_input_data_new_duplicate_id(
        time_series: Vec<TimeSeriesPoint>,
        generator: GeneratorParameters,
    ) {
        assert_eq!(
            InputData::new(time_series, vec![generator.clone(), generator]),
            Err(ValidationError::DuplicateGenerator("G1".into()))
        );
    }

    #[rstest]
    fn test_input_data_new_invalid_generator(
        time_series: Vec<TimeSeriesPoint>,
        generator: GeneratorParameters,
    ) {
        let generator = GeneratorParameters {
            pmin: crate::units::Power(300.0),
            ..generator
        };
        assert!(matches!(
            InputData::new(time_series, vec![generator]),
            Err(ValidationError::PmaxBelowPmin { .. })
        ));
    }
}
