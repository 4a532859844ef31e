//! Error types for the different stages of a unit commitment run.
//!
//! Each stage has its own error type so that callers can tell apart, for example, "no feasible
//! commitment exists" from "the solver crashed". All of these are fatal to the current run. The
//! types are plain `thiserror` enums so they can be carried inside an [`anyhow::Error`] and
//! recovered with `downcast_ref`.
use crate::solver::SolveStatus;
use chrono::NaiveDate;
use thiserror::Error;

/// A malformed or constraint-violating input record.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    /// A quantity which must be finite and non-negative is not
    #[error("{owner}: {field} must be a finite number greater than or equal to zero (got {value})")]
    InvalidValue {
        /// The record the value belongs to
        owner: String,
        /// The name of the field
        field: &'static str,
        /// The offending value
        value: f64,
    },

    /// A generator whose maximum output is below its minimum output
    #[error("Generator {generator_id}: Pmax ({pmax}) must be greater than or equal to Pmin ({pmin})")]
    PmaxBelowPmin {
        /// The generator's ID
        generator_id: String,
        /// Minimum output
        pmin: f64,
        /// Maximum output
        pmax: f64,
    },

    /// Dates in the demand time series are not strictly increasing
    #[error("Dates must be strictly increasing, but {previous} is followed by {next}")]
    NonMonotonicDates {
        /// The earlier entry's date
        previous: NaiveDate,
        /// The later entry's date
        next: NaiveDate,
    },

    /// Period indices are not 1, 2, 3, ...
    #[error("Period indices must be contiguous and start at 1: expected {expected}, found {found}")]
    NonContiguousIndex {
        /// The index which should appear at this position
        expected: u32,
        /// The index which was found
        found: u32,
    },

    /// The same generator ID appears more than once
    #[error("Duplicate generator ID: {0}")]
    DuplicateGenerator(String),
}

/// Model inputs that are structurally degenerate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum InvalidInputError {
    /// There are no periods in the horizon
    #[error("Cannot build a model with zero periods")]
    NoPeriods,

    /// There are no generators in the fleet
    #[error("Cannot build a model with zero generators")]
    NoGenerators,
}

/// The solving engine could not provide a solution.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SolveFailure {
    /// No assignment satisfies all the constraints
    #[error("The model is infeasible: no commitment schedule satisfies all constraints")]
    Infeasible,

    /// The objective can be decreased without limit
    #[error("The model is unbounded")]
    Unbounded,

    /// The engine could only establish that the model is infeasible or unbounded
    #[error("The model is infeasible or unbounded")]
    InfeasibleOrUnbounded,

    /// The run was cancelled before a solution was accepted
    #[error("The solve was cancelled")]
    Cancelled,

    /// The engine itself failed
    #[error("Solver engine error: {0}")]
    Engine(String),
}

/// A solved assignment which cannot be trusted.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum MalformedSolutionError {
    /// The number of values doesn't match the number of variables in the model
    #[error("Incomplete solution: expected {expected} variable values, found {found}")]
    Incomplete {
        /// Number of variables in the model
        expected: usize,
        /// Number of values returned
        found: usize,
    },

    /// A variable has a NaN or infinite value
    #[error("Non-finite value {value} for {variable}")]
    NonFinite {
        /// Description of the variable
        variable: String,
        /// The value returned
        value: f64,
    },

    /// A binary variable has a value which is not close to either 0 or 1
    #[error("Non-integral value {value} for binary variable {variable}")]
    NonIntegral {
        /// Description of the variable
        variable: String,
        /// The value returned
        value: f64,
    },

    /// The assignment violates a constraint or variable bound of the model
    #[error("Solution ({status}) violates {constraint}: value {value} is outside [{min}, {max}]")]
    ConstraintViolated {
        /// The status the engine reported for this solution
        status: SolveStatus,
        /// Description of the violated constraint
        constraint: String,
        /// Value of the constraint expression
        value: f64,
        /// Lower bound
        min: f64,
        /// Upper bound
        max: f64,
    },
}
