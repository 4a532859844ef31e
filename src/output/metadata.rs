//! The `metadata.toml` record written alongside the results of each run.
use crate::input::InputData;
use crate::model::{InitialState, ModelParameters};
use anyhow::{Result, anyhow};
use chrono::{Local, NaiveDate};
use platform_info::{PlatformInfo, PlatformInfoAPI, UNameAPI};
use serde::Serialize;
use std::fs;
use std::path::Path;

/// The output file name for metadata
const METADATA_FILE_NAME: &str = "metadata.toml";

/// Build details generated by the `built` crate
mod built_info {
    include!(concat!(env!("OUT_DIR"), "/built.rs"));
}

/// Short commit hash of the build, marked if the working tree had changes
fn git_commit_hash() -> String {
    match (built_info::GIT_COMMIT_HASH_SHORT, built_info::GIT_DIRTY) {
        (Some(hash), Some(true)) => format!("{hash}-dirty"),
        (Some(hash), _) => hash.to_string(),
        (None, _) => "unknown".to_string(),
    }
}

#[derive(Serialize)]
struct Metadata<'a> {
    run: RunMetadata<'a>,
    model: ModelMetadata,
    program: ProgramMetadata,
    platform: PlatformMetadata,
}

/// When and from where the run was started
#[derive(Serialize)]
struct RunMetadata<'a> {
    model_path: &'a Path,
    datetime: String,
}

/// The size of the problem and how it is to be solved
#[derive(Serialize)]
struct ModelMetadata {
    first_date: NaiveDate,
    last_date: NaiveDate,
    num_periods: usize,
    num_generators: usize,
    initial_state: InitialState,
    #[serde(skip_serializing_if = "Option::is_none")]
    time_limit: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    mip_rel_gap: Option<f64>,
}

impl ModelMetadata {
    fn new(parameters: &ModelParameters, input: &InputData) -> Result<Self> {
        let time_series = input.time_series();
        let (Some(first), Some(last)) = (time_series.first(), time_series.last()) else {
            return Err(anyhow!("Demand time series is empty"));
        };

        Ok(Self {
            first_date: first.date,
            last_date: last.date,
            num_periods: input.num_periods(),
            num_generators: input.num_generators(),
            initial_state: parameters.initial_state,
            time_limit: parameters.time_limit,
            mip_rel_gap: parameters.mip_rel_gap,
        })
    }
}

/// The build of the program which produced the results
#[derive(Serialize)]
struct ProgramMetadata {
    name: &'static str,
    version: &'static str,
    target: &'static str,
    is_debug: bool,
    rustc_version: &'static str,
    build_time_utc: &'static str,
    git_commit_hash: String,
}

impl ProgramMetadata {
    fn current() -> Self {
        Self {
            name: built_info::PKG_NAME,
            version: built_info::PKG_VERSION,
            target: built_info::TARGET,
            is_debug: built_info::DEBUG,
            rustc_version: built_info::RUSTC_VERSION,
            build_time_utc: built_info::BUILT_TIME_UTC,
            git_commit_hash: git_commit_hash(),
        }
    }
}

/// The machine the program is running on, as reported by `uname`
#[derive(Serialize)]
struct PlatformMetadata {
    sysname: String,
    release: String,
    machine: String,
    osname: String,
}

impl PlatformMetadata {
    fn current() -> Result<Self> {
        let info = PlatformInfo::new()
            .map_err(|err| anyhow!("Unable to determine platform info: {err}"))?;

        Ok(Self {
            sysname: info.sysname().to_string_lossy().into(),
            release: info.release().to_string_lossy().into(),
            machine: info.machine().to_string_lossy().into(),
            osname: info.osname().to_string_lossy().into(),
        })
    }
}

/// Write `metadata.toml` to `output_path`.
///
/// # Arguments
///
/// * `output_path` - Folder for the run's results
/// * `model_path` - Folder the model was loaded from
/// * `parameters` - The model's parameters
/// * `input` - The model's demand and fleet
pub fn write_metadata(
    output_path: &Path,
    model_path: &Path,
    parameters: &ModelParameters,
    input: &InputData,
) -> Result<()> {
    let metadata = Metadata {
        run: RunMetadata {
            model_path,
            datetime: Local::now().to_rfc2822(),
        },
        model: ModelMetadata::new(parameters, input)?,
        program: ProgramMetadata::current(),
        platform: PlatformMetadata::current()?,
    };
    fs::write(output_path.join(METADATA_FILE_NAME), toml::to_string(&metadata)?)?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixture::input_data;
    use rstest::rstest;
    use tempfile::tempdir;

    #[rstest]
    fn test_write_metadata(input_data: InputData) {
        let dir = tempdir().unwrap();
        let parameters = ModelParameters {
            time_limit: Some(60.0),
            ..ModelParameters::default()
        };
        write_metadata(dir.path(), Path::new("demos/simple"), &parameters, &input_data).unwrap();

        let contents = fs::read_to_string(dir.path().join(METADATA_FILE_NAME)).unwrap();
        let value: toml::Table = toml::from_str(&contents).unwrap();
        assert_eq!(value["run"]["model_path"].as_str(), Some("demos/simple"));
        assert_eq!(value["model"]["first_date"].as_str(), Some("2024-04-01"));
        assert_eq!(value["model"]["last_date"].as_str(), Some("2024-04-03"));
        assert_eq!(value["model"]["num_periods"].as_integer(), Some(3));
        assert_eq!(value["model"]["initial_state"].as_str(), Some("off"));
        assert_eq!(value["model"]["time_limit"].as_float(), Some(60.0));
        assert!(!value["model"].as_table().unwrap().contains_key("mip_rel_gap"));
        assert_eq!(value["program"]["name"].as_str(), Some("unit-commitment"));
        assert!(value.contains_key("platform"));
    }
}
