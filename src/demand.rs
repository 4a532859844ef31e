//! Demand for electricity over the planning horizon.
use crate::error::ValidationError;
use crate::units::Power;
use chrono::NaiveDate;

/// The forecast demand for a single period of the horizon.
///
/// The position of a point in the time series is significant: index order is chronological order.
#[derive(Debug, Clone, PartialEq)]
pub struct TimeSeriesPoint {
    /// The date the period falls on
    pub date: NaiveDate,
    /// 1-based position of the period in the horizon
    pub index: u32,
    /// Forecast demand
    pub demand: Power,
}

impl TimeSeriesPoint {
    /// Create a new [`TimeSeriesPoint`], checking that demand is a finite, non-negative number.
    pub fn new(date: NaiveDate, index: u32, demand: Power) -> Result<Self, ValidationError> {
        if !(demand.is_finite() && demand >= Power(0.0)) {
            return Err(ValidationError::InvalidValue {
                owner: format!("Period {index} ({date})"),
                field: "demand",
                value: demand.value(),
            });
        }

        Ok(Self {
            date,
            index,
            demand,
        })
    }
}

/// Check that a time series is in chronological order with indices 1, 2, 3, ...
pub fn check_time_series(time_series: &[TimeSeriesPoint]) -> Result<(), ValidationError> {
    for (expected, point) in (1..).zip(time_series) {
        if point.index != expected {
            return Err(ValidationError::NonContiguousIndex {
                expected,
                found: point.index,
            });
        }
    }

    for pair in time_series.windows(2) {
        let (previous, next) = (&pair[0], &pair[1]);
        if next.date <= previous.date {
            return Err(ValidationError::NonMonotonicDates {
                previous: previous.date,
                next: next.date,
            });
        }
    }

    Ok(())
}
