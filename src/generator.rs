//! Generators and their operating parameters.
use crate::error::ValidationError;
use crate::units::{Money, MoneyPerPower, Power};
use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::fmt;
use std::rc::Rc;

/// The name a generator is known by in input and output files
#[derive(Clone, Hash, PartialEq, Eq, PartialOrd, Ord, Debug, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GeneratorID(pub Rc<str>);

impl Borrow<str> for GeneratorID {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for GeneratorID {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for GeneratorID {
    fn from(s: &str) -> Self {
        Self(s.into())
    }
}

impl From<String> for GeneratorID {
    fn from(s: String) -> Self {
        Self(s.into())
    }
}

/// The technical and economic parameters of a single generator.
#[derive(Debug, Clone, PartialEq)]
pub struct GeneratorParameters {
    /// Unique identifier for the generator
    pub id: GeneratorID,
    /// Minimum output when running
    pub pmin: Power,
    /// Maximum output when running
    pub pmax: Power,
    /// Running cost per unit of output per period
    pub cost_run: MoneyPerPower,
    /// Cost incurred each time the generator starts
    pub cost_start: Money,
    /// Cost incurred each time the generator stops
    pub cost_stop: Money,
    /// Number of periods the generator must keep running after starting
    pub min_operation_time: u32,
    /// Number of periods the generator must stay off after stopping
    pub min_down_time: u32,
    /// Maximum increase in output between consecutive periods
    pub ramp_up: Power,
    /// Maximum decrease in output between consecutive periods
    pub ramp_down: Power,
}

impl GeneratorParameters {
    /// Check that the parameters describe a physically meaningful generator.
    ///
    /// All quantities must be finite and non-negative and `pmax` must be at least `pmin`.
    pub fn validate(&self) -> Result<(), ValidationError> {
        let values = [
            ("Pmin", self.pmin.value()),
            ("Pmax", self.pmax.value()),
            ("cost_run", self.cost_run.value()),
            ("cost_start", self.cost_start.value()),
            ("cost_stop", self.cost_stop.value()),
            ("ramp_up", self.ramp_up.value()),
            ("ramp_down", self.ramp_down.value()),
        ];
        for (field, value) in values {
            if !(value.is_finite() && value >= 0.0) {
                return Err(ValidationError::InvalidValue {
                    owner: format!("Generator {}", self.id),
                    field,
                    value,
                });
            }
        }

        if self.pmax < self.pmin {
            return Err(ValidationError::PmaxBelowPmin {
                generator_id: self.id.to_string(),
                pmin: self.pmin.value(),
                pmax: self.pmax.value(),
            });
        }

        Ok(())
    }

    /// The cost of running in one period with the given commitment decisions
    pub fn period_cost(&self, output: Power, start: bool, stop: bool) -> Money {
        let mut cost = self.cost_run * output;
        if start {
            cost += self.cost_start;
        }
        if stop {
            cost += self.cost_stop;
        }

        cost
    }
}
