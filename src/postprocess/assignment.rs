//! Extracting and checking the decisions from a solved model.
use crate::error::MalformedSolutionError;
use crate::input::InputData;
use crate::optimisation::constraints::ConstraintKey;
use crate::optimisation::{CommitmentModel, DecisionKind, VariableKind};
use crate::solver::{Solution, SolveStatus};
use crate::units::Power;
use strum::IntoEnumIterator;

/// How far a binary variable may be from 0 or 1 and still be accepted
pub const BINARY_TOLERANCE: f64 = 1e-6;

/// Absolute tolerance for constraint and bound checks, scaled up for large bounds
const FEASIBILITY_TOLERANCE: f64 = 1e-6;

/// The decisions for a single generator in a single period
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Decision {
    /// Whether the generator runs
    pub operation: bool,
    /// Whether the generator starts up
    pub start: bool,
    /// Whether the generator shuts down
    pub stop: bool,
    /// Power produced
    pub output: Power,
}

/// The solved values of all decision variables, indexed by (period, generator)
#[derive(Debug, Clone, PartialEq)]
pub struct DecisionAssignment {
    num_generators: usize,
    decisions: Vec<Decision>,
}

impl DecisionAssignment {
    /// Read the decisions out of a solution, checking that it can be trusted.
    ///
    /// The model must have been built from `input`. The solution must have a finite value for
    /// every variable, binary variables must be within [`BINARY_TOLERANCE`] of 0 or 1 and every
    /// constraint of the model must be satisfied once binary values are rounded.
    pub fn from_solution(
        model: &CommitmentModel,
        input: &InputData,
        solution: &Solution,
    ) -> Result<Self, MalformedSolutionError> {
        let variables = &model.variables;
        if variables.num_periods() != input.num_periods()
            || variables.num_generators() != input.num_generators()
        {
            return Err(MalformedSolutionError::Incomplete {
                expected: DecisionKind::iter().count()
                    * input.num_periods()
                    * input.num_generators(),
                found: model.problem.num_columns(),
            });
        }

        let values = &solution.values;
        if values.len() != model.problem.num_columns() {
            return Err(MalformedSolutionError::Incomplete {
                expected: model.problem.num_columns(),
                found: values.len(),
            });
        }

        let num_generators = variables.num_generators();
        let mut rounded = values.clone();
        let mut decisions = vec![
            Decision {
                operation: false,
                start: false,
                stop: false,
                output: Power(0.0),
            };
            variables.num_periods() * num_generators
        ];

        for (kind, period, generator, var) in variables.iter() {
            let value = values[var.index()];
            let column = &model.problem.columns()[var.index()];
            if !value.is_finite() {
                return Err(MalformedSolutionError::NonFinite {
                    variable: describe_variable(input, kind, period, generator),
                    value,
                });
            }
            if !within_bounds(value, column.min, column.max) {
                return Err(MalformedSolutionError::ConstraintViolated {
                    status: solution.status,
                    constraint: format!(
                        "bounds of {}",
                        describe_variable(input, kind, period, generator)
                    ),
                    value,
                    min: column.min,
                    max: column.max,
                });
            }

            let decision = &mut decisions[period * num_generators + generator];
            if column.kind == VariableKind::Binary {
                let flag = to_binary(value).ok_or_else(|| MalformedSolutionError::NonIntegral {
                    variable: describe_variable(input, kind, period, generator),
                    value,
                })?;
                rounded[var.index()] = f64::from(u8::from(flag));
                match kind {
                    DecisionKind::Operation => decision.operation = flag,
                    DecisionKind::Start => decision.start = flag,
                    DecisionKind::Stop => decision.stop = flag,
                    DecisionKind::Output => unreachable!("Output is a continuous variable"),
                }
            } else {
                decision.output = Power(value);
            }
        }

        check_constraints(model, input, solution.status, &rounded)?;

        Ok(Self {
            num_generators,
            decisions,
        })
    }

    /// The decisions for a generator in a period
    pub fn get(&self, period: usize, generator: usize) -> &Decision {
        assert!(generator < self.num_generators, "Generator index out of range");
        &self.decisions[period * self.num_generators + generator]
    }

    /// Number of periods covered
    pub fn num_periods(&self) -> usize {
        self.decisions.len() / self.num_generators
    }

    /// Number of generators covered
    pub fn num_generators(&self) -> usize {
        self.num_generators
    }
}

/// Convert a solved value of a binary variable to a flag, if it is close enough to 0 or 1
fn to_binary(value: f64) -> Option<bool> {
    if value.abs() <= BINARY_TOLERANCE {
        Some(false)
    } else if (value - 1.0).abs() <= BINARY_TOLERANCE {
        Some(true)
    } else {
        None
    }
}

/// Check a value against bounds, allowing for a tolerance proportional to their magnitude
fn within_bounds(value: f64, min: f64, max: f64) -> bool {
    let tolerance = |bound: f64| FEASIBILITY_TOLERANCE * bound.abs().max(1.0);
    (min == f64::NEG_INFINITY || value >= min - tolerance(min))
        && (max == f64::INFINITY || value <= max + tolerance(max))
}

/// Check that every row of the model is satisfied by `values`
fn check_constraints(
    model: &CommitmentModel,
    input: &InputData,
    status: SolveStatus,
    values: &[f64],
) -> Result<(), MalformedSolutionError> {
    for (row, key) in model.problem.rows().iter().zip(&model.constraint_keys) {
        let value = row.activity(values);
        if !within_bounds(value, row.min, row.max) {
            return Err(MalformedSolutionError::ConstraintViolated {
                status,
                constraint: describe_constraint(input, key),
                value,
                min: row.min,
                max: row.max,
            });
        }
    }

    Ok(())
}

/// Describe a period for error messages
fn describe_period(input: &InputData, period: usize) -> String {
    let point = &input.time_series()[period];
    format!("period {} ({})", point.index, point.date)
}

fn describe_variable(
    input: &InputData,
    kind: DecisionKind,
    period: usize,
    generator: usize,
) -> String {
    format!(
        "{kind} of generator {} in {}",
        input.generators()[generator].id,
        describe_period(input, period)
    )
}

fn describe_constraint(input: &InputData, key: &ConstraintKey) -> String {
    match key.generator {
        Some(generator) => format!(
            "{} constraint for generator {} in {}",
            key.kind,
            input.generators()[generator].id,
            describe_period(input, key.period)
        ),
        None => format!(
            "{} constraint in {}",
            key.kind,
            describe_period(input, key.period)
        ),
    }
}
