//! Unit commitment scenarios solved end to end with HiGHS.
use chrono::NaiveDate;
use float_cmp::assert_approx_eq;
use std::fs;
use tempfile::tempdir;
use unit_commitment::demand::TimeSeriesPoint;
use unit_commitment::error::{MalformedSolutionError, SolveFailure};
use unit_commitment::generator::GeneratorParameters;
use unit_commitment::input::InputData;
use unit_commitment::model::InitialState;
use unit_commitment::output::DataWriter;
use unit_commitment::pipeline::{PipelineConfig, PipelineOutput, run_pipeline};
use unit_commitment::postprocess::DailySchedule;
use unit_commitment::solver::{HighsSolver, SolveOptions, SolveStatus};
use unit_commitment::units::{Money, MoneyPerPower, Power};

fn time_series(demand: &[f64]) -> Vec<TimeSeriesPoint> {
    let first = NaiveDate::from_ymd_opt(2024, 4, 1).unwrap();
    (1..)
        .zip(first.iter_days())
        .zip(demand)
        .map(|((index, date), &demand)| TimeSeriesPoint::new(date, index, Power(demand)).unwrap())
        .collect()
}

/// A generator with no minimum times and ramp limits which never bind
fn generator(
    id: &str,
    pmin: f64,
    pmax: f64,
    cost_run: f64,
    cost_start: f64,
) -> GeneratorParameters {
    GeneratorParameters {
        id: id.into(),
        pmin: Power(pmin),
        pmax: Power(pmax),
        cost_run: MoneyPerPower(cost_run),
        cost_start: Money(cost_start),
        cost_stop: Money(0.0),
        min_operation_time: 0,
        min_down_time: 0,
        ramp_up: Power(pmax),
        ramp_down: Power(pmax),
    }
}

/// Solve with the default configuration and check the properties every schedule must have
fn solve(input: &InputData) -> PipelineOutput {
    let output = run_pipeline(input, &PipelineConfig::default(), &HighsSolver).unwrap();
    assert_eq!(output.results.status, SolveStatus::Optimal);
    check_schedules(input, &output.results.schedules);
    check_summaries(&output);

    output
}

/// The schedule for `generator` in `period`
fn schedule<'a>(
    output: &'a PipelineOutput,
    input: &InputData,
    period: usize,
    generator: usize,
) -> &'a DailySchedule {
    &output.results.schedules[period * input.num_generators() + generator]
}

fn check_schedules(input: &InputData, schedules: &[DailySchedule]) {
    let num_generators = input.num_generators();
    assert_eq!(schedules.len(), input.num_periods() * num_generators);

    for (period, point) in input.time_series().iter().enumerate() {
        let day = &schedules[period * num_generators..(period + 1) * num_generators];

        // Output is within the generator's limits while running and zero otherwise
        for (schedule, params) in day.iter().zip(input.generators()) {
            assert_eq!(schedule.date, point.date);
            if schedule.operation {
                assert!(schedule.output.value() >= params.pmin.value() - 1e-6);
                assert!(schedule.output.value() <= params.pmax.value() + 1e-6);
            } else {
                assert!(schedule.output.value().abs() <= 1e-6);
            }
        }

        // Demand is covered
        let total: f64 = day.iter().map(|schedule| schedule.output.value()).sum();
        assert!(total >= point.demand.value() - 1e-6);

        // Starts and stops match changes in operating state
        if period > 0 {
            let previous = &schedules[(period - 1) * num_generators..period * num_generators];
            for (schedule, before) in day.iter().zip(previous) {
                assert_eq!(
                    i8::from(schedule.start) - i8::from(schedule.stop),
                    i8::from(schedule.operation) - i8::from(before.operation)
                );
            }
        }
    }
}

fn check_summaries(output: &PipelineOutput) {
    let results = &output.results;
    let from_schedules: f64 = results.schedules.iter().map(|s| s.cost.value()).sum();
    let from_generators: f64 = results
        .generator_summaries
        .iter()
        .map(|s| s.generator_cost.value())
        .sum();
    let overall_cost = results.fleet_summary.overall_cost.value();
    assert_approx_eq!(f64, overall_cost, from_schedules, epsilon = 1e-6);
    assert_approx_eq!(f64, overall_cost, from_generators, epsilon = 1e-6);
}

#[test]
fn test_single_generator() {
    let generator = GeneratorParameters {
        cost_stop: Money(50.0),
        ..generator("G1", 50.0, 200.0, 5.0, 100.0)
    };
    let input = InputData::new(time_series(&[100.0, 100.0, 100.0]), vec![generator]).unwrap();
    let output = solve(&input);

    for period in 0..3 {
        let schedule = schedule(&output, &input, period, 0);
        assert!(schedule.operation);
        assert_eq!(schedule.start, period == 0);
        assert!(!schedule.stop);
        assert_approx_eq!(f64, schedule.output.value(), 100.0, epsilon = 1e-6);
    }

    let fleet = &output.results.fleet_summary;
    assert_approx_eq!(f64, fleet.overall_cost.value(), 1600.0, epsilon = 1e-6);
    assert_eq!(fleet.overall_start_days, 1);
    assert_eq!(fleet.overall_stop_days, 0);
    assert_eq!(fleet.overall_operation_days, 3);
}

#[test]
fn test_expensive_generator_covers_shortfall() {
    let cheap = generator("cheap", 10.0, 80.0, 2.0, 10.0);
    let expensive = GeneratorParameters {
        cost_stop: Money(10.0),
        ..generator("expensive", 20.0, 200.0, 10.0, 10.0)
    };
    let input =
        InputData::new(time_series(&[60.0, 150.0, 60.0]), vec![cheap, expensive]).unwrap();
    let output = solve(&input);

    // The cheap generator serves demand on its own where it can
    for period in [0, 2] {
        assert!(!schedule(&output, &input, period, 1).operation);
        assert_approx_eq!(
            f64,
            schedule(&output, &input, period, 0).output.value(),
            60.0,
            epsilon = 1e-6
        );
    }

    // It runs at full output when the expensive generator is needed
    assert!(schedule(&output, &input, 1, 1).operation);
    let output_in_peak = |generator| schedule(&output, &input, 1, generator).output.value();
    assert_approx_eq!(f64, output_in_peak(0), 80.0, epsilon = 1e-6);
    assert_approx_eq!(f64, output_in_peak(1), 70.0, epsilon = 1e-6);
}

#[test]
fn test_zero_demand() {
    let generators = vec![
        generator("G1", 50.0, 200.0, 5.0, 100.0),
        generator("G2", 0.0, 100.0, 1.0, 10.0),
    ];
    let input = InputData::new(time_series(&[0.0, 0.0, 0.0]), generators).unwrap();
    let output = solve(&input);

    let fleet = &output.results.fleet_summary;
    assert_approx_eq!(f64, fleet.overall_cost.value(), 0.0, epsilon = 1e-6);
    assert_approx_eq!(f64, fleet.overall_output.value(), 0.0, epsilon = 1e-6);
    assert_eq!(fleet.overall_operation_days, 0);
    assert_eq!(fleet.overall_start_days, 0);
    assert_eq!(fleet.overall_stop_days, 0);
}

#[test]
fn test_min_operation_time_keeps_generator_on() {
    let generator = GeneratorParameters {
        min_operation_time: 2,
        ..generator("G1", 50.0, 200.0, 5.0, 100.0)
    };
    let input = InputData::new(time_series(&[0.0, 100.0, 0.0, 0.0]), vec![generator]).unwrap();
    let output = solve(&input);

    assert!(!schedule(&output, &input, 0, 0).operation);
    assert!(schedule(&output, &input, 1, 0).start);
    assert!(schedule(&output, &input, 2, 0).operation);
    assert_approx_eq!(
        f64,
        schedule(&output, &input, 2, 0).output.value(),
        50.0,
        epsilon = 1e-6
    );
}

#[test]
fn test_min_down_time_longer_than_horizon() {
    // Staying on through the quiet days costs more than letting the backup serve the last day,
    // which in turn costs more than restarting G1
    let baseload = GeneratorParameters {
        min_down_time: 10,
        ..generator("G1", 100.0, 200.0, 5.0, 0.0)
    };
    let backup = generator("G2", 0.0, 200.0, 8.0, 0.0);
    let input = InputData::new(
        time_series(&[100.0, 0.0, 0.0, 0.0, 0.0, 100.0]),
        vec![baseload, backup],
    )
    .unwrap();
    let output = solve(&input);

    assert!(schedule(&output, &input, 0, 0).operation);
    assert!(schedule(&output, &input, 1, 0).stop);
    for period in 1..6 {
        assert!(!schedule(&output, &input, period, 0).operation);
    }
    assert!(schedule(&output, &input, 5, 1).operation);
    assert_approx_eq!(
        f64,
        output.results.fleet_summary.overall_cost.value(),
        1300.0,
        epsilon = 1e-6
    );
}

#[test]
fn test_ramp_limit_brings_output_forward() {
    // G1 can only add 50 per day, so it runs above demand on the first day to avoid starting G2
    let baseload = GeneratorParameters {
        ramp_up: Power(50.0),
        ..generator("G1", 0.0, 200.0, 1.0, 0.0)
    };
    let peaker = generator("G2", 0.0, 200.0, 10.0, 10.0);
    let input = InputData::new(time_series(&[50.0, 150.0]), vec![baseload, peaker]).unwrap();
    let output = solve(&input);

    let baseload_output = |period| schedule(&output, &input, period, 0).output.value();
    assert_approx_eq!(f64, baseload_output(0), 100.0, epsilon = 1e-6);
    assert_approx_eq!(f64, baseload_output(1), 150.0, epsilon = 1e-6);
    assert!(!schedule(&output, &input, 1, 1).operation);
    assert_approx_eq!(
        f64,
        output.results.fleet_summary.overall_cost.value(),
        250.0,
        epsilon = 1e-6
    );
}

#[test]
fn test_free_initial_state() {
    let generator = generator("G1", 50.0, 200.0, 5.0, 100.0);
    let input = InputData::new(time_series(&[100.0, 100.0, 100.0]), vec![generator]).unwrap();
    let config = PipelineConfig {
        initial_state: InitialState::Free,
        ..PipelineConfig::default()
    };
    let output = run_pipeline(&input, &config, &HighsSolver).unwrap();
    check_schedules(&input, &output.results.schedules);

    // Running from the first period needs no start
    assert_eq!(output.results.fleet_summary.overall_start_days, 0);
    assert_approx_eq!(
        f64,
        output.results.fleet_summary.overall_cost.value(),
        1500.0,
        epsilon = 1e-6
    );
}

#[test]
fn test_infeasible_demand() {
    let generator = generator("G1", 0.0, 100.0, 1.0, 0.0);
    let input = InputData::new(time_series(&[50.0, 150.0]), vec![generator]).unwrap();
    let err = run_pipeline(&input, &PipelineConfig::default(), &HighsSolver).unwrap_err();

    assert_eq!(err.to_string(), "Failed to solve model.");
    assert!(matches!(
        err.downcast_ref::<SolveFailure>(),
        Some(SolveFailure::Infeasible | SolveFailure::InfeasibleOrUnbounded)
    ));
}

#[test]
fn test_time_limited_solve() {
    let generators = (1..=8_u32)
        .map(|i| GeneratorParameters {
            min_operation_time: 2,
            min_down_time: 2,
            ..generator(
                &format!("G{i}"),
                20.0 * f64::from(i),
                60.0 * f64::from(i),
                10.0 - f64::from(i),
                50.0 * f64::from(i),
            )
        })
        .collect();
    let demand: Vec<_> = (0..30_u32).map(|day| 300.0 + 150.0 * f64::from(day % 7)).collect();
    let input = InputData::new(time_series(&demand), generators).unwrap();
    let config = PipelineConfig {
        solve_options: SolveOptions {
            time_limit: Some(1e-3),
            ..SolveOptions::default()
        },
        ..PipelineConfig::default()
    };

    // HiGHS may or may not finish within the limit, but must never abort the run
    match run_pipeline(&input, &config, &HighsSolver) {
        Ok(output) => {
            let status = output.results.status;
            assert!(matches!(
                status,
                SolveStatus::Optimal | SolveStatus::TimeLimitReached
            ));
            check_schedules(&input, &output.results.schedules);
            check_summaries(&output);

            let dir = tempdir().unwrap();
            let mut writer = DataWriter::create(dir.path(), false).unwrap();
            writer.write_results(&output.results).unwrap();
            writer.flush().unwrap();
            let fleet = fs::read_to_string(dir.path().join("fleet_summary.csv")).unwrap();
            let row = fleet.lines().nth(1).unwrap();
            assert!(row.starts_with(&format!("{status},")));
        }
        Err(err) => {
            // Stopped before an incumbent was found
            assert_eq!(err.to_string(), "Failed to process solution.");
            assert!(err.downcast_ref::<MalformedSolutionError>().is_some());
        }
    }
}
