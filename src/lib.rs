//! Formulate and solve daily unit commitment schedules for a fleet of power generators.
//!
//! A run reads a demand time series and generator parameters, builds a mixed-integer linear
//! program deciding which generators run on each day and at what output, solves it and aggregates
//! the solution into schedules and cost summaries.
#![warn(missing_docs)]
use std::path::PathBuf;

pub mod cli;
pub mod demand;
pub mod error;
pub mod generator;
pub mod input;
pub mod log;
pub mod model;
pub mod optimisation;
pub mod output;
pub mod pipeline;
pub mod postprocess;
pub mod settings;
pub mod solver;
pub mod units;

#[cfg(test)]
mod fixture;

/// Get the program's config directory
pub fn get_config_dir() -> PathBuf {
    let Some(mut config_dir) = dirs::config_dir() else {
        // No config dir on this platform: fall back to the current directory
        return PathBuf::new();
    };
    config_dir.push("unit-commitment");

    config_dir
}
