//! Code for reading the demand time series from a CSV file.
use super::{input_err_msg, read_csv};
use crate::demand::{TimeSeriesPoint, check_time_series};
use crate::units::Power;
use anyhow::{Context, Result};
use chrono::NaiveDate;
use serde::Deserialize;
use std::path::Path;

const DEMAND_FILE_NAME: &str = "demand.csv";

/// Represents a single row of the demand CSV file.
#[derive(Debug, Clone, Deserialize, PartialEq)]
struct DemandRaw {
    /// The date in ISO format (YYYY-MM-DD)
    date: NaiveDate,
    /// Forecast demand for the day
    demand: f64,
}

/// Read the demand time series from the model directory.
///
/// # Arguments
///
/// * `model_dir` - Folder containing model configuration files
///
/// # Returns
///
/// One [`TimeSeriesPoint`] per row of the file, with 1-based indices in file order.
pub fn read_time_series(model_dir: &Path) -> Result<Vec<TimeSeriesPoint>> {
    let file_path = model_dir.join(DEMAND_FILE_NAME);
    let demand = read_csv(&file_path)?;
    read_time_series_from_iter(demand.into_iter()).with_context(|| input_err_msg(&file_path))
}

fn read_time_series_from_iter<I>(iter: I) -> Result<Vec<TimeSeriesPoint>>
where
    I: Iterator<Item = DemandRaw>,
{
    let mut time_series = Vec::new();
    for (index, raw) in (1..).zip(iter) {
        time_series.push(TimeSeriesPoint::new(raw.date, index, Power(raw.demand))?);
    }
    check_time_series(&time_series)?;

    Ok(time_series)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ValidationError;
    use crate::fixture::assert_error;
    use std::fs::File;
    use std::io::Write;
    use tempfile::tempdir;

    fn date(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 4, day).unwrap()
    }

    fn raw(day: u32, demand: f64) -> DemandRaw {
        DemandRaw {
            date: date(day),
            demand,
        }
    }

    #[test]
    fn test_read_time_series_from_iter() {
        let time_series =
            read_time_series_from_iter([raw(1, 300.0), raw(2, 0.0)].into_iter()).unwrap();
        assert_eq!(
            time_series,
            [
                TimeSeriesPoint::new(date(1), 1, Power(300.0)).unwrap(),
                TimeSeriesPoint::new(date(2), 2, Power(0.0)).unwrap()
            ]
        );
    }

    #[test]
    fn test_read_time_series_from_iter_negative_demand() {
        assert_error!(
            read_time_series_from_iter([raw(1, 300.0), raw(2, -1.0)].into_iter()),
            "Period 2 (2024-04-02): demand must be a finite number greater than or equal to zero \
            (got -1)"
        );
    }

    #[test]
    fn test_read_time_series_from_iter_unordered() {
        let err = read_time_series_from_iter([raw(2, 300.0), raw(1, 200.0)].into_iter())
            .unwrap_err();
        assert_eq!(
            err.downcast_ref::<ValidationError>(),
            Some(&ValidationError::NonMonotonicDates {
                previous: date(2),
                next: date(1)
            })
        );
    }

    #[test]
    fn test_read_time_series() {
        let dir = tempdir().unwrap();
        {
            let mut file = File::create(dir.path().join(DEMAND_FILE_NAME)).unwrap();
            writeln!(file, "date,demand\n2024-04-01,350.5\n2024-04-02,410").unwrap();
        }

        let time_series = read_time_series(dir.path()).unwrap();
        assert_eq!(time_series.len(), 2);
        assert_eq!(time_series[1].index, 2);
        assert_eq!(time_series[1].demand, Power(410.0));
    }

    #[test]
    fn test_read_time_series_bad_date() {
        let dir = tempdir().unwrap();
        {
            let mut file = File::create(dir.path().join(DEMAND_FILE_NAME)).unwrap();
            writeln!(file, "date,demand\n01/04/2024,350.5").unwrap();
        }

        assert!(read_time_series(dir.path()).is_err());
    }
}
