//! The per-tick state transition rule.

use crate::grid::{Grid, NeighborCounts, RiskMap};
use outbreak_common::{CellState, SimulationParameters};
use rand::Rng;

/// Infection probability for a Healthy cell with `infected_neighbors` infected neighbors:
/// `min(1, n * infection_rate / 8)`, clamped to `[0, 1]`.
#[inline(always)]
pub fn infection_probability(infected_neighbors: u8, infection_rate: f64) -> f64 {
    (f64::from(infected_neighbors) * infection_rate / 8.0).clamp(0.0, 1.0)
}

/// One Bernoulli trial with success probability `p`, clamped to `[0, 1]`.
#[inline(always)]
fn bernoulli<R: Rng + ?Sized>(rng: &mut R, p: f64) -> bool {
    rng.random::<f64>() < p.clamp(0.0, 1.0)
}

/// Produces the next grid from `grid` and its neighbor counts.
///
/// The update is synchronous: every cell reads only `grid` and `counts`, both taken
/// before the tick, and writes into a fresh grid. Cells are visited in row-major order
/// so a given generator state always yields the same result.
///
/// - Dead and Immune cells never change.
/// - A Healthy cell with `n > 0` infected neighbors is infected with
///   [`infection_probability`]`(n, infection_rate)`.
/// - An Infected cell first draws for death (`death_rate`); if it survives it draws for
///   immunity (`immunity_rate`); otherwise it stays Infected.
pub fn step<R: Rng + ?Sized>(
    grid: &Grid,
    counts: &NeighborCounts,
    params: &SimulationParameters,
    rng: &mut R,
) -> Grid {
    debug_assert!(grid.same_shape(counts), "neighbor counts must match the grid");

    let mut next = grid.clone();
    for (idx, (&cell, &neighbors)) in grid
        .as_slice()
        .iter()
        .zip(counts.as_slice())
        .enumerate()
    {
        let updated = match cell {
            CellState::Dead | CellState::Immune => continue,
            CellState::Healthy => {
                if neighbors > 0
                    && bernoulli(rng, infection_probability(neighbors, params.infection_rate))
                {
                    CellState::Infected
                } else {
                    continue;
                }
            }
            CellState::Infected => {
                if bernoulli(rng, params.death_rate) {
                    CellState::Dead
                } else if bernoulli(rng, params.immunity_rate) {
                    CellState::Immune
                } else {
                    continue;
                }
            }
        };
        let (x, y) = grid.coords(idx);
        next.set(x, y, updated);
    }
    next
}

/// Per-cell probability of becoming infected on the next tick.
///
/// Uses the same formula as [`step`]; every non-Healthy cell is 0.0.
pub fn risk_map(grid: &Grid, counts: &NeighborCounts, infection_rate: f64) -> RiskMap {
    grid.zip_map(counts, |&cell, &neighbors| match cell {
        CellState::Healthy => infection_probability(neighbors, infection_rate),
        _ => 0.0,
    })
}
