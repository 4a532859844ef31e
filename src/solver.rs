//! The interface between the unit commitment model and the engine which solves it.
//!
//! The rest of the crate only depends on the [`SolverEngine`] trait, so any MILP-capable engine
//! can be substituted. [`HighsSolver`] is the engine used by the program itself.
use crate::error::SolveFailure;
use crate::optimisation::Problem;
use std::path::PathBuf;

pub mod highs;
pub use self::highs::HighsSolver;

/// Options controlling a single solve
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SolveOptions {
    /// Wall-clock budget in seconds
    pub time_limit: Option<f64>,
    /// Relative optimality gap at which the engine may stop
    pub mip_rel_gap: Option<f64>,
    /// File to write the engine's log to
    pub log_file: Option<PathBuf>,
}

/// How a solve ended, for solves which produced an assignment
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display)]
#[strum(serialize_all = "snake_case")]
pub enum SolveStatus {
    /// The assignment is optimal (within the configured gap)
    Optimal,
    /// The time budget ran out; the assignment is the best found so far
    TimeLimitReached,
}

/// The result of a successful solve
#[derive(Debug, Clone, PartialEq)]
pub struct Solution {
    /// How the solve ended
    pub status: SolveStatus,
    /// One value per column of the problem, in column order
    pub values: Vec<f64>,
}

/// An engine capable of solving mixed-integer linear programs.
///
/// Implementations must minimise the objective of the given problem and must not modify it.
pub trait SolverEngine {
    /// Solve `problem`, returning the value of every variable or the reason no solution exists.
    fn solve(&self, problem: &Problem, options: &SolveOptions) -> Result<Solution, SolveFailure>;
}

impl<T: SolverEngine + ?Sized> SolverEngine for &T {
    fn solve(&self, problem: &Problem, options: &SolveOptions) -> Result<Solution, SolveFailure> {
        (**self).solve(problem, options)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_solve_status_display() {
        assert_eq!(SolveStatus::Optimal.to_string(), "optimal");
        assert_eq!(
            SolveStatus::TimeLimitReached.to_string(),
            "time_limit_reached"
        );
    }
}
