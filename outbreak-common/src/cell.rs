use serde::{Deserialize, Serialize};
use std::fmt;

/// The state of a single individual on the grid.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CellState {
    #[default]
    Healthy,
    Infected,
    Immune,
    Dead,
}

impl CellState {
    /// Every state, in the order used by counters and output files.
    pub const ALL: [CellState; 4] = [
        CellState::Healthy,
        CellState::Infected,
        CellState::Immune,
        CellState::Dead,
    ];

    /// Immune and Dead cells never change again.
    pub fn is_absorbing(self) -> bool {
        matches!(self, CellState::Immune | CellState::Dead)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            CellState::Healthy => "healthy",
            CellState::Infected => "infected",
            CellState::Immune => "immune",
            CellState::Dead => "dead",
        }
    }
}

impl fmt::Display for CellState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
