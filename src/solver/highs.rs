//! Solving with the HiGHS engine.
use super::{Solution, SolveOptions, SolveStatus, SolverEngine};
use crate::error::SolveFailure;
use crate::optimisation::{Problem, VariableKind};
use highs::{HighsModelStatus, RowProblem, Sense};
use log::{debug, warn};

/// A [`SolverEngine`] backed by HiGHS
#[derive(Debug, Clone, Copy, Default)]
pub struct HighsSolver;

/// Convert to the `highs` crate's representation of the problem
fn to_highs_problem(problem: &Problem) -> RowProblem {
    let mut highs_problem = RowProblem::default();

    let columns: Vec<_> = problem
        .columns()
        .iter()
        .map(|column| match column.kind {
            VariableKind::Continuous => {
                highs_problem.add_column(column.cost, column.min..=column.max)
            }
            VariableKind::Binary => {
                highs_problem.add_integer_column(column.cost, column.min..=column.max)
            }
        })
        .collect();

    for row in problem.rows() {
        highs_problem.add_row(
            row.min..=row.max,
            row.terms
                .iter()
                .map(|(var, coeff)| (columns[var.index()], *coeff)),
        );
    }

    highs_problem
}

/// Apply solve options to a HiGHS model
fn set_options(model: &mut highs::Model, options: &SolveOptions) {
    // Keep HiGHS from writing to stdout, which is reserved for our own logger
    model.set_option("log_to_console", false);

    if let Some(log_file) = &options.log_file {
        model.set_option("output_flag", true);
        model.set_option("log_file", log_file.to_string_lossy().as_ref());
    } else {
        model.set_option("output_flag", false);
    }

    // Budgets such as `mip_max_nodes` end with a status the bindings cannot represent, so only
    // the time limit is exposed
    if let Some(time_limit) = options.time_limit {
        model.set_option("time_limit", time_limit);
    }
    if let Some(mip_rel_gap) = options.mip_rel_gap {
        model.set_option("mip_rel_gap", mip_rel_gap);
    }
}

/// Map the status reported by HiGHS onto a [`SolveStatus`] or [`SolveFailure`]
fn convert_status(status: HighsModelStatus) -> Result<SolveStatus, SolveFailure> {
    match status {
        HighsModelStatus::Optimal => Ok(SolveStatus::Optimal),
        HighsModelStatus::ReachedTimeLimit => Ok(SolveStatus::TimeLimitReached),
        HighsModelStatus::Infeasible => Err(SolveFailure::Infeasible),
        HighsModelStatus::Unbounded => Err(SolveFailure::Unbounded),
        HighsModelStatus::UnboundedOrInfeasible => Err(SolveFailure::InfeasibleOrUnbounded),
        status => Err(SolveFailure::Engine(format!(
            "HiGHS finished with status {status:?}"
        ))),
    }
}

impl SolverEngine for HighsSolver {
    fn solve(&self, problem: &Problem, options: &SolveOptions) -> Result<Solution, SolveFailure> {
        let mut model = to_highs_problem(problem).optimise(Sense::Minimise);
        set_options(&mut model, options);

        debug!(
            "Solving with HiGHS: {} columns, {} rows",
            problem.num_columns(),
            problem.num_rows()
        );
        let solved = model
            .try_solve()
            .map_err(|status| SolveFailure::Engine(format!("HiGHS failed: {status:?}")))?;

        let status = convert_status(solved.status())?;
        if status != SolveStatus::Optimal {
            warn!("Solve stopped early ({status}); using best solution found");
        }

        Ok(Solution {
            status,
            values: solved.get_solution().columns().to_vec(),
        })
    }
}
