//! Turning a solved model into schedules and cost summaries.
//!
//! Everything here is a pure function of the inputs and the solution, so processing the same
//! solution twice gives identical results.
use crate::error::MalformedSolutionError;
use crate::generator::GeneratorID;
use crate::input::InputData;
use crate::optimisation::CommitmentModel;
use crate::solver::{Solution, SolveStatus};
use crate::units::{Money, Power};
use chrono::NaiveDate;
use indexmap::IndexMap;

pub mod assignment;
pub use assignment::{Decision, DecisionAssignment};

/// What a single generator does on a single day
#[derive(Debug, Clone, PartialEq)]
pub struct DailySchedule {
    /// The day
    pub date: NaiveDate,
    /// The generator
    pub generator_id: GeneratorID,
    /// Whether the generator starts up
    pub start: bool,
    /// Whether the generator shuts down
    pub stop: bool,
    /// Whether the generator runs
    pub operation: bool,
    /// Power produced
    pub output: Power,
    /// Running cost plus any start or stop cost
    pub cost: Money,
}

/// Totals for a single generator over the horizon
#[derive(Debug, Clone, PartialEq)]
pub struct GeneratorSummary {
    /// The generator
    pub generator_id: GeneratorID,
    /// Total cost
    pub generator_cost: Money,
    /// Total output
    pub generator_output: Power,
    /// Number of days the generator runs
    pub generator_operation_days: u32,
    /// Number of days the generator starts up
    pub generator_start_days: u32,
    /// Number of days the generator shuts down
    pub generator_stop_days: u32,
}

impl GeneratorSummary {
    fn new(generator_id: GeneratorID) -> Self {
        Self {
            generator_id,
            generator_cost: Money(0.0),
            generator_output: Power(0.0),
            generator_operation_days: 0,
            generator_start_days: 0,
            generator_stop_days: 0,
        }
    }

    fn add(&mut self, schedule: &DailySchedule) {
        self.generator_cost += schedule.cost;
        self.generator_output += schedule.output;
        self.generator_operation_days += u32::from(schedule.operation);
        self.generator_start_days += u32::from(schedule.start);
        self.generator_stop_days += u32::from(schedule.stop);
    }
}

/// Totals for the whole fleet over the horizon
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FleetSummary {
    /// Total cost
    pub overall_cost: Money,
    /// Total output
    pub overall_output: Power,
    /// Total number of generator-days of operation
    pub overall_operation_days: u32,
    /// Total number of start events
    pub overall_start_days: u32,
    /// Total number of stop events
    pub overall_stop_days: u32,
}

/// Everything derived from a solved model
#[derive(Debug, Clone, PartialEq)]
pub struct CommitmentResults {
    /// How the solve ended
    pub status: SolveStatus,
    /// One entry per (period, generator), ordered by period then generator
    pub schedules: Vec<DailySchedule>,
    /// One entry per generator, in input order
    pub generator_summaries: Vec<GeneratorSummary>,
    /// Totals for the fleet
    pub fleet_summary: FleetSummary,
}

/// Build the daily schedule for every generator from the decisions
pub fn daily_schedules(input: &InputData, assignment: &DecisionAssignment) -> Vec<DailySchedule> {
    let mut schedules = Vec::with_capacity(input.num_periods() * input.num_generators());
    for (period, point) in input.time_series().iter().enumerate() {
        for (generator_index, generator) in input.generators().iter().enumerate() {
            let decision = assignment.get(period, generator_index);
            schedules.push(DailySchedule {
                date: point.date,
                generator_id: generator.id.clone(),
                start: decision.start,
                stop: decision.stop,
                operation: decision.operation,
                output: decision.output,
                cost: generator.period_cost(decision.output, decision.start, decision.stop),
            });
        }
    }

    schedules
}

/// Sum the daily schedules for each generator.
///
/// Summaries are in the order in which generators first appear in `schedules`.
pub fn summarise_generators(schedules: &[DailySchedule]) -> Vec<GeneratorSummary> {
    let mut summaries: IndexMap<GeneratorID, GeneratorSummary> = IndexMap::new();
    for schedule in schedules {
        summaries
            .entry(schedule.generator_id.clone())
            .or_insert_with(|| GeneratorSummary::new(schedule.generator_id.clone()))
            .add(schedule);
    }

    summaries.into_values().collect()
}

/// Sum the generator summaries for the whole fleet
pub fn summarise_fleet(summaries: &[GeneratorSummary]) -> FleetSummary {
    let mut fleet = FleetSummary::default();
    for summary in summaries {
        fleet.overall_cost += summary.generator_cost;
        fleet.overall_output += summary.generator_output;
        fleet.overall_operation_days += summary.generator_operation_days;
        fleet.overall_start_days += summary.generator_start_days;
        fleet.overall_stop_days += summary.generator_stop_days;
    }

    fleet
}

/// Check a solution and derive schedules and summaries from it.
///
/// # Arguments
///
/// * `input` - The inputs the model was built from
/// * `model` - The model which was solved
/// * `solution` - The engine's solution
pub fn postprocess(
    input: &InputData,
    model: &CommitmentModel,
    solution: &Solution,
) -> Result<CommitmentResults, MalformedSolutionError> {
    let assignment = DecisionAssignment::from_solution(model, input, solution)?;
    let schedules = daily_schedules(input, &assignment);
    let generator_summaries = summarise_generators(&schedules);
    let fleet_summary = summarise_fleet(&generator_summaries);

    Ok(CommitmentResults {
        status: solution.status,
        schedules,
        generator_summaries,
        fleet_summary,
    })
}
