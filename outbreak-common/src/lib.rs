pub mod cell;
pub mod config;
pub mod error;
pub mod pattern;
pub mod sim_params;
pub mod snapshot;

// Re-export key types for easier use by dependent crates
pub use cell::CellState;
pub use config::{GridConfig, OutputConfig, PatternConfig, RatesConfig, RunConfig, SimulationConfig};
pub use error::SimulationError;
pub use pattern::{OutbreakPattern, PatternKind};
pub use sim_params::SimulationParameters;
pub use snapshot::StatisticsSnapshot;
