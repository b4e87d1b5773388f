use serde::{Deserialize, Serialize};

/// Population statistics recorded after initialization and after every tick.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)] // Derive traits for easy saving/loading
pub struct StatisticsSnapshot {
    /// Tick index; 0 is the freshly initialized grid.
    pub step: usize,
    pub healthy: usize,
    pub infected: usize,
    pub immune: usize,
    pub dead: usize,
    /// Highest infected count seen at or before this step.
    pub peak_infected: usize,
    /// Cells that have been infected at least once, each counted once.
    pub total_ever_infected: usize,
    /// Cells that became infected since the previous snapshot.
    pub new_infections: usize,
    /// Cells that died since the previous snapshot.
    pub new_deaths: usize,
    /// Cells that became immune since the previous snapshot.
    pub new_recoveries: usize,
}

impl StatisticsSnapshot {
    /// Total number of cells accounted for. Always equals the grid size.
    pub fn population(&self) -> usize {
        self.healthy + self.infected + self.immune + self.dead
    }
}
