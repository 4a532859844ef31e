//! Code for formulating the unit commitment problem as a mixed-integer linear program.
//!
//! The problem is built in an engine-neutral form ([`Problem`]) so that any MILP-capable engine
//! implementing [`SolverEngine`](crate::solver::SolverEngine) can solve it.
use crate::error::InvalidInputError;
use crate::input::InputData;
use crate::model::InitialState;
use log::debug;
use std::fmt;
use std::ops::{Bound, RangeBounds};
use strum::{EnumIter, IntoEnumIterator};

pub mod constraints;
use constraints::{ConstraintKey, add_commitment_constraints};

/// A decision variable in the optimisation
///
/// Note that this type does **not** include the value of the variable; it just refers to a
/// particular column of the problem.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Variable(usize);

impl Variable {
    /// The position of this variable's column in the problem
    pub fn index(self) -> usize {
        self.0
    }
}

/// Whether a variable may take any value in its bounds or only 0 and 1
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VariableKind {
    /// A real-valued variable
    Continuous,
    /// An integer variable restricted to 0 or 1
    Binary,
}

/// A column of the problem: one decision variable with its objective coefficient and bounds
#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    /// Coefficient in the objective function
    pub cost: f64,
    /// Lower bound (may be `-inf`)
    pub min: f64,
    /// Upper bound (may be `inf`)
    pub max: f64,
    /// Whether the variable is integral
    pub kind: VariableKind,
}

/// A row of the problem: a linear expression with lower and upper bounds
#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    /// Lower bound (may be `-inf`)
    pub min: f64,
    /// Upper bound (may be `inf`)
    pub max: f64,
    /// Nonzero coefficients of the expression
    pub terms: Vec<(Variable, f64)>,
}

impl Row {
    /// Evaluate the row's expression for the given variable values
    pub fn activity(&self, values: &[f64]) -> f64 {
        self.terms
            .iter()
            .map(|(var, coeff)| coeff * values[var.index()])
            .sum()
    }
}

/// Convert a range into a pair of (inclusive) bounds
fn to_bounds<B: RangeBounds<f64>>(bounds: &B) -> (f64, f64) {
    let min = match bounds.start_bound() {
        Bound::Included(&value) | Bound::Excluded(&value) => value,
        Bound::Unbounded => f64::NEG_INFINITY,
    };
    let max = match bounds.end_bound() {
        Bound::Included(&value) | Bound::Excluded(&value) => value,
        Bound::Unbounded => f64::INFINITY,
    };

    (min, max)
}

/// A minimisation problem with linear constraints and a linear objective.
///
/// Variables are added as columns and constraints as rows, in the same manner as for the
/// `highs` crate's `RowProblem`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Problem {
    columns: Vec<Column>,
    rows: Vec<Row>,
}

impl Problem {
    /// Add a continuous variable with the given objective coefficient and bounds
    pub fn add_column<B: RangeBounds<f64>>(&mut self, cost: f64, bounds: B) -> Variable {
        let (min, max) = to_bounds(&bounds);
        self.push_column(Column {
            cost,
            min,
            max,
            kind: VariableKind::Continuous,
        })
    }

    /// Add a binary variable with the given objective coefficient
    pub fn add_binary_column(&mut self, cost: f64) -> Variable {
        self.push_column(Column {
            cost,
            min: 0.0,
            max: 1.0,
            kind: VariableKind::Binary,
        })
    }

    fn push_column(&mut self, column: Column) -> Variable {
        self.columns.push(column);
        Variable(self.columns.len() - 1)
    }

    /// Add a constraint requiring that the sum of `terms` lies within `bounds`
    pub fn add_row<B, I>(&mut self, bounds: B, terms: I)
    where
        B: RangeBounds<f64>,
        I: IntoIterator<Item = (Variable, f64)>,
    {
        let (min, max) = to_bounds(&bounds);
        self.rows.push(Row {
            min,
            max,
            terms: terms.into_iter().collect(),
        });
    }

    /// The variables of the problem, in the order they were added
    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    /// The constraints of the problem, in the order they were added
    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    /// Number of variables
    pub fn num_columns(&self) -> usize {
        self.columns.len()
    }

    /// Number of constraints
    pub fn num_rows(&self) -> usize {
        self.rows.len()
    }

    /// Evaluate the objective function for the given variable values
    pub fn objective_value(&self, values: &[f64]) -> f64 {
        self.columns
            .iter()
            .zip(values)
            .map(|(column, value)| column.cost * value)
            .sum()
    }
}

/// The four decisions made for every generator in every period
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, strum::Display)]
#[strum(serialize_all = "snake_case")]
pub enum DecisionKind {
    /// Whether the generator is running
    Operation,
    /// Whether the generator starts up
    Start,
    /// Whether the generator shuts down
    Stop,
    /// Power produced
    Output,
}

/// Dense lookup of the decision variables for each (period, generator) pair.
///
/// Variables are stored grouped by [`DecisionKind`], then by period, then by generator.
#[derive(Debug, Clone, PartialEq)]
pub struct VariableMap {
    num_periods: usize,
    num_generators: usize,
    variables: Vec<Variable>,
}

impl VariableMap {
    fn position(&self, kind: DecisionKind, period: usize, generator: usize) -> usize {
        assert!(
            period < self.num_periods && generator < self.num_generators,
            "Variable index out of range"
        );

        ((kind as usize * self.num_periods) + period) * self.num_generators + generator
    }

    /// Get the [`Variable`] for the given decision
    pub fn get(&self, kind: DecisionKind, period: usize, generator: usize) -> Variable {
        self.variables[self.position(kind, period, generator)]
    }

    /// The `operation` variable for a generator in a period
    pub fn operation(&self, period: usize, generator: usize) -> Variable {
        self.get(DecisionKind::Operation, period, generator)
    }

    /// The `start` variable for a generator in a period
    pub fn start(&self, period: usize, generator: usize) -> Variable {
        self.get(DecisionKind::Start, period, generator)
    }

    /// The `stop` variable for a generator in a period
    pub fn stop(&self, period: usize, generator: usize) -> Variable {
        self.get(DecisionKind::Stop, period, generator)
    }

    /// The `output` variable for a generator in a period
    pub fn output(&self, period: usize, generator: usize) -> Variable {
        self.get(DecisionKind::Output, period, generator)
    }

    /// Number of periods covered
    pub fn num_periods(&self) -> usize {
        self.num_periods
    }

    /// Number of generators covered
    pub fn num_generators(&self) -> usize {
        self.num_generators
    }

    /// Iterate over every variable along with the decision, period and generator it represents
    pub fn iter(&self) -> impl Iterator<Item = (DecisionKind, usize, usize, Variable)> + '_ {
        DecisionKind::iter().flat_map(move |kind| {
            (0..self.num_periods).flat_map(move |period| {
                (0..self.num_generators).map(move |generator| {
                    (kind, period, generator, self.get(kind, period, generator))
                })
            })
        })
    }
}

/// The unit commitment MILP along with the information needed to interpret its solution
#[derive(Debug, Clone, PartialEq)]
pub struct CommitmentModel {
    /// The optimisation problem
    pub problem: Problem,
    /// The decision variables
    pub variables: VariableMap,
    /// Which constraint each row of the problem represents
    pub constraint_keys: Vec<ConstraintKey>,
}

impl fmt::Display for CommitmentModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} variables and {} constraints for {} periods and {} generators",
            self.problem.num_columns(),
            self.problem.num_rows(),
            self.variables.num_periods(),
            self.variables.num_generators()
        )
    }
}

/// Build the unit commitment model.
///
/// The objective is the total cost over the horizon: running cost per unit of output plus the cost
/// of every start and stop event. This is set via the objective coefficients of the variables.
///
/// # Arguments
///
/// * `input` - Validated demand time series and generator fleet
/// * `initial_state` - How generators are treated before the first period
///
/// # Returns
///
/// The model or an error if there are no periods or no generators.
pub fn build_model(
    input: &InputData,
    initial_state: InitialState,
) -> Result<CommitmentModel, InvalidInputError> {
    if input.num_periods() == 0 {
        return Err(InvalidInputError::NoPeriods);
    }
    if input.num_generators() == 0 {
        return Err(InvalidInputError::NoGenerators);
    }

    let mut problem = Problem::default();
    let variables = add_variables(&mut problem, input);
    let constraint_keys =
        add_commitment_constraints(&mut problem, &variables, input, initial_state);
    let model = CommitmentModel {
        problem,
        variables,
        constraint_keys,
    };
    debug!("Built unit commitment model with {model}");

    Ok(model)
}

/// Add variables to the optimisation problem.
///
/// # Returns
///
/// A [`VariableMap`] with the problem's variables as values.
fn add_variables(problem: &mut Problem, input: &InputData) -> VariableMap {
    let num_periods = input.num_periods();
    let generators = input.generators();

    let mut variables = Vec::with_capacity(4 * num_periods * generators.len());
    for kind in DecisionKind::iter() {
        for _ in 0..num_periods {
            for generator in generators {
                let var = match kind {
                    DecisionKind::Operation => problem.add_binary_column(0.0),
                    DecisionKind::Start => problem.add_binary_column(generator.cost_start.value()),
                    DecisionKind::Stop => problem.add_binary_column(generator.cost_stop.value()),
                    DecisionKind::Output => problem.add_column(generator.cost_run.value(), 0.0..),
                };
                variables.push(var);
            }
        }
    }

    VariableMap {
        num_periods,
        num_generators: generators.len(),
        variables,
    }
}
