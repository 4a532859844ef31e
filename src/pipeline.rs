//! Runs the stages of a unit commitment run in order: build the model, solve it and process the
//! solution.
//!
//! The first failing stage aborts the run. Errors carry the name of the stage which failed, with
//! the underlying typed error reachable through [`anyhow::Error::downcast_ref`].
use crate::error::SolveFailure;
use crate::input::{InputData, load_model};
use crate::model::{InitialState, ModelParameters};
use crate::optimisation::{CommitmentModel, build_model};
use crate::postprocess::{CommitmentResults, postprocess};
use crate::solver::{Solution, SolveOptions, SolverEngine};
use anyhow::{Context, Result};
use log::info;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// A flag which can be set from another thread to abandon a run
#[derive(Debug, Clone, Default)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
    /// Request that the run be abandoned
    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    /// Whether cancellation has been requested
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }

    /// Fail with [`SolveFailure::Cancelled`] if cancellation has been requested
    fn check(&self) -> Result<(), SolveFailure> {
        if self.is_cancelled() {
            Err(SolveFailure::Cancelled)
        } else {
            Ok(())
        }
    }
}

/// Everything a run needs besides its inputs and solving engine
#[derive(Debug, Clone, Default)]
pub struct PipelineConfig {
    /// How generators are treated before the first period
    pub initial_state: InitialState,
    /// Options passed to the solving engine
    pub solve_options: SolveOptions,
    /// Checked before and after solving
    pub cancel: CancelFlag,
}

impl PipelineConfig {
    /// Configuration for a run with the given model parameters
    ///
    /// # Arguments
    ///
    /// * `parameters` - The contents of `model.toml`
    /// * `solver_log_file` - Where the solving engine should write its log, if anywhere
    pub fn new(parameters: &ModelParameters, solver_log_file: Option<PathBuf>) -> Self {
        Self {
            initial_state: parameters.initial_state,
            solve_options: parameters.solve_options(solver_log_file),
            cancel: CancelFlag::default(),
        }
    }
}

/// The products of a successful run
#[derive(Debug)]
pub struct PipelineOutput {
    /// The model which was solved
    pub model: CommitmentModel,
    /// The engine's raw solution
    pub solution: Solution,
    /// Schedules and summaries derived from the solution
    pub results: CommitmentResults,
}

/// Read and validate the model inputs from `model_dir`.
pub fn load_input(model_dir: &Path) -> Result<(ModelParameters, InputData)> {
    let loaded = load_model(model_dir).context("Failed to load model input.")?;
    info!("Loaded model from {}", model_dir.display());

    Ok(loaded)
}

/// Build the model for `input` without solving it.
pub fn build(input: &InputData, config: &PipelineConfig) -> Result<CommitmentModel> {
    let model = build_model(input, config.initial_state).context("Failed to build model.")?;
    info!("Built model: {model}");

    Ok(model)
}

/// Build, solve and postprocess a unit commitment model.
///
/// # Arguments
///
/// * `input` - Validated demand time series and generator fleet
/// * `config` - Configuration for this run
/// * `engine` - The engine used to solve the model
pub fn run_pipeline<S: SolverEngine>(
    input: &InputData,
    config: &PipelineConfig,
    engine: &S,
) -> Result<PipelineOutput> {
    let model = build(input, config)?;

    let solution = solve(&model, config, engine).context("Failed to solve model.")?;
    info!(
        "Solve finished ({}) with objective value {}",
        solution.status,
        model.problem.objective_value(&solution.values)
    );

    let results = postprocess(input, &model, &solution).context("Failed to process solution.")?;
    info!(
        "Total cost of commitment schedule: {}",
        results.fleet_summary.overall_cost
    );

    Ok(PipelineOutput {
        model,
        solution,
        results,
    })
}

fn solve<S: SolverEngine>(
    model: &CommitmentModel,
    config: &PipelineConfig,
    engine: &S,
) -> Result<Solution, SolveFailure> {
    config.cancel.check()?;
    let solution = engine.solve(&model.problem, &config.solve_options)?;
    config.cancel.check()?;

    Ok(solution)
}
