//! Code for adding constraints to the unit commitment problem.
use super::{Problem, VariableMap};
use crate::input::InputData;
use crate::model::InitialState;
use std::ops::Range;

/// The family a constraint belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display)]
pub enum ConstraintKind {
    /// A generator can only start in a period where it runs
    #[strum(to_string = "start bound")]
    StartBound,
    /// Start and stop events match changes in operating state
    #[strum(to_string = "state transition")]
    Transition,
    /// A generator stays on for a minimum number of periods after starting
    #[strum(to_string = "minimum operation time")]
    MinOperationTime,
    /// A generator stays off for a minimum number of periods after stopping
    #[strum(to_string = "minimum down time")]
    MinDownTime,
    /// Output is at least `Pmin` while running
    #[strum(to_string = "minimum output")]
    MinOutput,
    /// Output is at most `Pmax` while running and zero otherwise
    #[strum(to_string = "maximum output")]
    MaxOutput,
    /// Fleet output covers demand
    #[strum(to_string = "demand coverage")]
    Demand,
    /// Output rises by at most `ramp_up` between periods
    #[strum(to_string = "ramp up")]
    RampUp,
    /// Output falls by at most `ramp_down` between periods
    #[strum(to_string = "ramp down")]
    RampDown,
}

/// Identifies the constraint represented by a row of the problem
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConstraintKey {
    /// The constraint family
    pub kind: ConstraintKind,
    /// Index of the period (0-based)
    pub period: usize,
    /// Index of the generator (0-based), if the constraint applies to a single generator
    pub generator: Option<usize>,
}

impl ConstraintKey {
    fn for_generator(kind: ConstraintKind, period: usize, generator: usize) -> Self {
        Self {
            kind,
            period,
            generator: Some(generator),
        }
    }
}

/// Add all constraints of the unit commitment problem.
///
/// # Arguments
///
/// * `problem` - The optimisation problem
/// * `variables` - The variables in the problem
/// * `input` - Demand time series and generator fleet
/// * `initial_state` - How generators are treated before the first period
///
/// # Returns
///
/// A key for every row added, in row order.
pub fn add_commitment_constraints(
    problem: &mut Problem,
    variables: &VariableMap,
    input: &InputData,
    initial_state: InitialState,
) -> Vec<ConstraintKey> {
    let mut keys = Vec::new();
    add_start_bound_constraints(problem, variables, &mut keys);
    add_transition_constraints(problem, variables, initial_state, &mut keys);
    add_min_time_constraints(problem, variables, input, &mut keys);
    add_output_bound_constraints(problem, variables, input, &mut keys);
    add_demand_constraints(problem, variables, input, &mut keys);
    add_ramp_constraints(problem, variables, input, &mut keys);

    assert_eq!(keys.len(), problem.num_rows(), "Every row must have a key");
    keys
}

/// A generator can only start in a period in which it runs: `start - operation <= 0`
fn add_start_bound_constraints(
    problem: &mut Problem,
    variables: &VariableMap,
    keys: &mut Vec<ConstraintKey>,
) {
    for period in 0..variables.num_periods() {
        for generator in 0..variables.num_generators() {
            problem.add_row(
                ..=0.0,
                [
                    (variables.start(period, generator), 1.0),
                    (variables.operation(period, generator), -1.0),
                ],
            );
            keys.push(ConstraintKey::for_generator(
                ConstraintKind::StartBound,
                period,
                generator,
            ));
        }
    }
}

/// Link start and stop events to changes in state:
/// `start[t] - stop[t] - operation[t] + operation[t-1] = 0`.
///
/// In the first period, generators are either taken to be off beforehand (so the constraint is
/// imposed with `operation[-1] = 0`) or their state is left free (no constraint).
fn add_transition_constraints(
    problem: &mut Problem,
    variables: &VariableMap,
    initial_state: InitialState,
    keys: &mut Vec<ConstraintKey>,
) {
    for period in 0..variables.num_periods() {
        if period == 0 && initial_state == InitialState::Free {
            continue;
        }

        for generator in 0..variables.num_generators() {
            let mut terms = vec![
                (variables.start(period, generator), 1.0),
                (variables.stop(period, generator), -1.0),
                (variables.operation(period, generator), -1.0),
            ];
            if period > 0 {
                terms.push((variables.operation(period - 1, generator), 1.0));
            }

            problem.add_row(0.0..=0.0, terms);
            keys.push(ConstraintKey::for_generator(
                ConstraintKind::Transition,
                period,
                generator,
            ));
        }
    }
}

/// The periods preceding `period` which fall within a minimum run or down time of `length`.
///
/// Windows are clamped at the start of the horizon.
fn lockout_window(period: usize, length: u32) -> Range<usize> {
    period.saturating_sub(length as usize)..period
}

/// Add minimum operation time and minimum down time constraints.
///
/// A start in any of the last `min_operation_time` periods forces the generator on:
/// `sum(start[s]) - operation[t] <= 0`. Likewise a stop in any of the last `min_down_time`
/// periods forces it off: `sum(stop[s]) + operation[t] <= 1`.
fn add_min_time_constraints(
    problem: &mut Problem,
    variables: &VariableMap,
    input: &InputData,
    keys: &mut Vec<ConstraintKey>,
) {
    for (generator, params) in input.generators().iter().enumerate() {
        if params.min_operation_time == 0 {
            continue;
        }

        for period in 1..variables.num_periods() {
            let window = lockout_window(period, params.min_operation_time);
            let terms = window
                .map(|s| (variables.start(s, generator), 1.0))
                .chain([(variables.operation(period, generator), -1.0)]);
            problem.add_row(..=0.0, terms);
            keys.push(ConstraintKey::for_generator(
                ConstraintKind::MinOperationTime,
                period,
                generator,
            ));
        }
    }

    for (generator, params) in input.generators().iter().enumerate() {
        if params.min_down_time == 0 {
            continue;
        }

        for period in 1..variables.num_periods() {
            let window = lockout_window(period, params.min_down_time);
            let terms = window
                .map(|s| (variables.stop(s, generator), 1.0))
                .chain([(variables.operation(period, generator), 1.0)]);
            problem.add_row(..=1.0, terms);
            keys.push(ConstraintKey::for_generator(
                ConstraintKind::MinDownTime,
                period,
                generator,
            ));
        }
    }
}

/// Keep output within `[Pmin, Pmax]` while running and at zero otherwise
fn add_output_bound_constraints(
    problem: &mut Problem,
    variables: &VariableMap,
    input: &InputData,
    keys: &mut Vec<ConstraintKey>,
) {
    for period in 0..variables.num_periods() {
        for (generator, params) in input.generators().iter().enumerate() {
            let output = variables.output(period, generator);
            let operation = variables.operation(period, generator);

            // output - Pmin * operation >= 0
            problem.add_row(0.0.., [(output, 1.0), (operation, -params.pmin.value())]);
            keys.push(ConstraintKey::for_generator(
                ConstraintKind::MinOutput,
                period,
                generator,
            ));

            // output - Pmax * operation <= 0
            problem.add_row(..=0.0, [(output, 1.0), (operation, -params.pmax.value())]);
            keys.push(ConstraintKey::for_generator(
                ConstraintKind::MaxOutput,
                period,
                generator,
            ));
        }
    }
}

/// Fleet output must meet or exceed demand in every period
fn add_demand_constraints(
    problem: &mut Problem,
    variables: &VariableMap,
    input: &InputData,
    keys: &mut Vec<ConstraintKey>,
) {
    for (period, point) in input.time_series().iter().enumerate() {
        let terms = (0..variables.num_generators())
            .map(|generator| (variables.output(period, generator), 1.0));
        problem.add_row(point.demand.value().., terms);
        keys.push(ConstraintKey {
            kind: ConstraintKind::Demand,
            period,
            generator: None,
        });
    }
}

/// Limit the change in output between consecutive periods
fn add_ramp_constraints(
    problem: &mut Problem,
    variables: &VariableMap,
    input: &InputData,
    keys: &mut Vec<ConstraintKey>,
) {
    for period in 1..variables.num_periods() {
        for (generator, params) in input.generators().iter().enumerate() {
            let current = variables.output(period, generator);
            let previous = variables.output(period - 1, generator);

            problem.add_row(..=params.ramp_up.value(), [(current, 1.0), (previous, -1.0)]);
            keys.push(ConstraintKey::for_generator(
                ConstraintKind::RampUp,
                period,
                generator,
            ));

            problem.add_row(..=params.ramp_down.value(), [(previous, 1.0), (current, -1.0)]);
            keys.push(ConstraintKey::for_generator(
                ConstraintKind::RampDown,
                period,
                generator,
            ));
        }
    }
}
