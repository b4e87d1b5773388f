//! Population statistics derived from grids.
//!
//! Everything here is a pure function of a grid and the previous snapshot (or the
//! history of snapshots); nothing accumulates outside the returned values.

use crate::grid::Grid;
use outbreak_common::{CellState, StatisticsSnapshot};
use serde::{Deserialize, Serialize};

/// Number of trailing snapshots used by [`transmission_rate`].
const TRANSMISSION_WINDOW: usize = 5;

/// Counts the grid and extends the running totals of `previous`.
///
/// `previous == None` marks the freshly initialized grid (step 0).
///
/// Cells only ever leave Healthy through infection, and Immune or Dead are only
/// reached from Infected, so every non-Healthy cell has been infected exactly once.
/// That makes `total_ever_infected` the non-Healthy count, with no per-cell marker.
pub fn observe(grid: &Grid, previous: Option<&StatisticsSnapshot>) -> StatisticsSnapshot {
    let mut counts = [0usize; 4];
    for &cell in grid.as_slice() {
        counts[cell as usize] += 1;
    }
    let [healthy, infected, immune, dead] = counts;
    let ever_infected = infected + immune + dead;

    match previous {
        None => StatisticsSnapshot {
            step: 0,
            healthy,
            infected,
            immune,
            dead,
            peak_infected: infected,
            total_ever_infected: ever_infected,
            new_infections: 0,
            new_deaths: 0,
            new_recoveries: 0,
        },
        Some(prev) => {
            let total_ever_infected = prev.total_ever_infected.max(ever_infected);
            StatisticsSnapshot {
                step: prev.step + 1,
                healthy,
                infected,
                immune,
                dead,
                peak_infected: prev.peak_infected.max(infected),
                total_ever_infected,
                new_infections: total_ever_infected - prev.total_ever_infected,
                new_deaths: dead.saturating_sub(prev.dead),
                new_recoveries: immune.saturating_sub(prev.immune),
            }
        }
    }
}

/// New infections over the last few ticks divided by the infected population that
/// caused them (every tick in the window except the newest).
///
/// Only post-tick snapshots count, so the rate stays 0.0 until two ticks have run.
pub fn transmission_rate(history: &[StatisticsSnapshot]) -> f64 {
    let ticks = match history.first() {
        Some(first) if first.step == 0 => &history[1..],
        _ => history,
    };
    if ticks.len() < 2 {
        return 0.0;
    }
    let recent = &ticks[ticks.len().saturating_sub(TRANSMISSION_WINDOW)..];
    let new_infections: usize = recent.iter().map(|s| s.new_infections).sum();
    let exposure: usize = recent[..recent.len() - 1].iter().map(|s| s.infected).sum();
    if exposure == 0 {
        0.0
    } else {
        new_infections as f64 / exposure as f64
    }
}

/// Share of ever-infected cells that died.
pub fn mortality_rate(snapshot: &StatisticsSnapshot) -> f64 {
    ratio(snapshot.dead, snapshot.total_ever_infected)
}

/// Share of ever-infected cells that became immune.
pub fn recovery_rate(snapshot: &StatisticsSnapshot) -> f64 {
    ratio(snapshot.immune, snapshot.total_ever_infected)
}

fn ratio(part: usize, whole: usize) -> f64 {
    if whole == 0 {
        0.0
    } else {
        part as f64 / whole as f64
    }
}

/// First step after the start at which no infected cells remained.
pub fn contained_at(history: &[StatisticsSnapshot]) -> Option<usize> {
    history
        .iter()
        .find(|s| s.step > 0 && s.infected == 0)
        .map(|s| s.step)
}

/// Coarse outcome of a run, read from its latest snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OutbreakStatus {
    /// Nothing has happened yet: step 0 with no infection.
    Ready,
    /// At least one cell is infected.
    Active,
    /// Every cell is dead.
    Extinct,
    /// The outbreak ended with more immune than dead cells.
    ImmunityPrevailed,
    /// The outbreak ended some other way.
    Contained,
}

impl OutbreakStatus {
    pub fn from_snapshot(snapshot: &StatisticsSnapshot) -> Self {
        if snapshot.infected > 0 {
            OutbreakStatus::Active
        } else if snapshot.step == 0 {
            OutbreakStatus::Ready
        } else if snapshot.dead == snapshot.population() {
            OutbreakStatus::Extinct
        } else if snapshot.immune > snapshot.dead {
            OutbreakStatus::ImmunityPrevailed
        } else {
            OutbreakStatus::Contained
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            OutbreakStatus::Ready => "ready to start",
            OutbreakStatus::Active => "active outbreak",
            OutbreakStatus::Extinct => "total extinction",
            OutbreakStatus::ImmunityPrevailed => "immunity prevailed",
            OutbreakStatus::Contained => "outbreak contained",
        }
    }
}

// Keeps `counts[cell as usize]` in `observe` aligned with the declaration order.
const _: () = {
    assert!(CellState::Healthy as usize == 0);
    assert!(CellState::Infected as usize == 1);
    assert!(CellState::Immune as usize == 2);
    assert!(CellState::Dead as usize == 3);
};
