use crate::error::SimulationError;
use serde::{Deserialize, Serialize};

/// Parameters fixed for the lifetime of one run. Changing any of them requires a reset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationParameters {
    pub width: usize,
    pub height: usize,
    /// Per-tick transmission strength; scaled by `infected_neighbors / 8`.
    pub infection_rate: f64,
    /// Probability that an infected cell dies on a tick.
    pub death_rate: f64,
    /// Probability that an infected cell which did not die becomes immune.
    pub immunity_rate: f64,
}

impl SimulationParameters {
    /// Builds and validates a parameter set.
    pub fn new(
        width: usize,
        height: usize,
        infection_rate: f64,
        death_rate: f64,
        immunity_rate: f64,
    ) -> Result<Self, SimulationError> {
        let params = Self {
            width,
            height,
            infection_rate,
            death_rate,
            immunity_rate,
        };
        params.validate()?;
        Ok(params)
    }

    /// Rejects non-positive dimensions and any rate outside `[0, 1]`. Never clamps.
    pub fn validate(&self) -> Result<(), SimulationError> {
        if self.width == 0 || self.height == 0 {
            return Err(SimulationError::InvalidGridSize {
                width: self.width,
                height: self.height,
            });
        }
        for (name, value) in [
            ("infection_rate", self.infection_rate),
            ("death_rate", self.death_rate),
            ("immunity_rate", self.immunity_rate),
        ] {
            // `contains` is false for NaN, so NaN is rejected too.
            if !(0.0..=1.0).contains(&value) {
                return Err(SimulationError::InvalidParameter { name, value });
            }
        }
        Ok(())
    }

    pub fn grid_size(&self) -> usize {
        self.width * self.height
    }
}

impl Default for SimulationParameters {
    fn default() -> Self {
        Self {
            width: 40,
            height: 40,
            infection_rate: 0.3,
            death_rate: 0.1,
            immunity_rate: 0.05,
        }
    }
}
