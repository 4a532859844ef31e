//! Fixtures for tests
use crate::demand::TimeSeriesPoint;
use crate::error::SolveFailure;
use crate::generator::GeneratorParameters;
use crate::input::InputData;
use crate::optimisation::{CommitmentModel, Problem};
use crate::solver::{Solution, SolveOptions, SolverEngine};
use crate::units::{Money, MoneyPerPower, Power};
use chrono::NaiveDate;
use rstest::fixture;
use std::cell::Cell;

/// Assert that an error with the given message occurs
macro_rules! assert_error {
    ($result:expr, $msg:expr) => {
        assert_eq!(
            $result.unwrap_err().chain().next().unwrap().to_string(),
            $msg
        );
    };
}
pub(crate) use assert_error;

/// Build a time series with consecutive dates starting on 1 April 2024
pub fn time_series_from_demand(demand: &[f64]) -> Vec<TimeSeriesPoint> {
    let first = NaiveDate::from_ymd_opt(2024, 4, 1).unwrap();
    (1..)
        .zip(first.iter_days())
        .zip(demand)
        .map(|((index, date), &demand)| TimeSeriesPoint::new(date, index, Power(demand)).unwrap())
        .collect()
}

#[fixture]
pub fn time_series() -> Vec<TimeSeriesPoint> {
    time_series_from_demand(&[100.0, 100.0, 100.0])
}

#[fixture]
pub fn generator() -> GeneratorParameters {
    GeneratorParameters {
        id: "G1".into(),
        pmin: Power(50.0),
        pmax: Power(200.0),
        cost_run: MoneyPerPower(5.0),
        cost_start: Money(100.0),
        cost_stop: Money(50.0),
        min_operation_time: 0,
        min_down_time: 0,
        ramp_up: Power(200.0),
        ramp_down: Power(200.0),
    }
}

#[fixture]
pub fn input_data(
    time_series: Vec<TimeSeriesPoint>,
    generator: GeneratorParameters,
) -> InputData {
    InputData::new(time_series, vec![generator]).unwrap()
}

/// Variable values for a schedule given as operating states and outputs, indexed by
/// `[period][generator]`.
///
/// Starts and stops are derived from changes in state, with every generator off beforehand.
pub fn schedule_values(
    model: &CommitmentModel,
    operation: &[&[u8]],
    output: &[&[f64]],
) -> Vec<f64> {
    let variables = &model.variables;
    let mut values = vec![0.0; model.problem.num_columns()];
    for generator in 0..variables.num_generators() {
        let mut previous = 0;
        for period in 0..variables.num_periods() {
            let state = operation[period][generator];
            values[variables.operation(period, generator).index()] = f64::from(state);
            values[variables.start(period, generator).index()] = f64::from(state > previous);
            values[variables.stop(period, generator).index()] = f64::from(state < previous);
            values[variables.output(period, generator).index()] = output[period][generator];
            previous = state;
        }
    }

    values
}

/// A solver engine which returns a fixed result, counting how often it is called
pub struct CannedSolver {
    result: Result<Solution, SolveFailure>,
    calls: Cell<usize>,
}

impl CannedSolver {
    /// Create a [`CannedSolver`] which always returns `result`
    pub fn new(result: Result<Solution, SolveFailure>) -> Self {
        Self {
            result,
            calls: Cell::new(0),
        }
    }

    /// How many times `solve` has been called
    pub fn calls(&self) -> usize {
        self.calls.get()
    }
}

impl SolverEngine for CannedSolver {
    fn solve(&self, _problem: &Problem, _options: &SolveOptions) -> Result<Solution, SolveFailure> {
        self.calls.set(self.calls.get() + 1);
        self.result.clone()
    }
}
