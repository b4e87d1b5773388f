//! Discrete-time outbreak simulation on a 2D grid.
//!
//! Each tick counts infected neighbors ([`grid`]), applies the stochastic
//! transition rule ([`transition`]), records statistics ([`stats`]) and checks
//! achievements ([`achievements`]). [`simulation`] ties these together behind
//! reset/step controls.

pub mod achievements;
pub mod grid;
pub mod patterns;
pub mod simulation;
pub mod stats;
pub mod transition;

pub use achievements::Achievement;
pub use grid::{count_infected_neighbors, CellMap, Grid, NeighborCounts, RiskMap};
pub use simulation::{AutorunOutcome, RunSnapshot, SimulationController, SimulationRun};
pub use stats::OutbreakStatus;

pub use outbreak_common::{
    CellState, OutbreakPattern, PatternKind, SimulationConfig, SimulationError, SimulationParameters,
    StatisticsSnapshot,
};
