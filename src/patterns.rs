//! Initial outbreak placement.
//!
//! Every pattern starts from an all-Healthy grid and marks a pattern-specific set of
//! cells Infected. All randomness comes from the caller's generator, so the same seed
//! always produces the same grid.

use crate::grid::Grid;
use log::debug;
use outbreak_common::{CellState, OutbreakPattern, SimulationError};
use rand::Rng;

/// Candidate positions drawn per placement round for an airport cluster.
const CANDIDATES_PER_ROUND: usize = 16;
/// Rounds tried before an airport cluster is declared unplaceable.
const MAX_PLACEMENT_ATTEMPTS: usize = 10;

/// Builds the initial grid for `pattern`.
///
/// Fails with [`SimulationError::InvalidGridSize`] for an empty grid and with
/// [`SimulationError::InvalidPattern`] when the pattern's parameters cannot fit.
/// An empty infected set is not an error.
pub fn initialize<R: Rng + ?Sized>(
    pattern: &OutbreakPattern,
    width: usize,
    height: usize,
    rng: &mut R,
) -> Result<Grid, SimulationError> {
    if width == 0 || height == 0 {
        return Err(SimulationError::InvalidGridSize { width, height });
    }
    let mut grid = Grid::healthy(width, height);

    match *pattern {
        OutbreakPattern::PatientZero => {
            grid.set(width / 2, height / 2, CellState::Infected);
        }
        OutbreakPattern::AirportSpread { clusters, cluster_radius } => {
            let centers = place_airport_clusters(clusters, cluster_radius, width, height, rng)?;
            for (cx, cy) in centers {
                fill_square(&mut grid, cx, cy, cluster_radius);
            }
        }
        OutbreakPattern::BorderInvasion { thickness } => {
            let max_thickness = width.min(height).div_ceil(2);
            if thickness > max_thickness {
                return Err(invalid(
                    pattern,
                    format!("thickness {} exceeds half of a {}x{} grid", thickness, width, height),
                ));
            }
            for y in 0..height {
                for x in 0..width {
                    let edge_distance = x.min(y).min(width - 1 - x).min(height - 1 - y);
                    if edge_distance < thickness {
                        grid.set(x, y, CellState::Infected);
                    }
                }
            }
        }
        OutbreakPattern::UrbanCenters { centers, radius } => {
            if centers > width * height {
                return Err(invalid(
                    pattern,
                    format!("{} centers exceed the {} cells of the grid", centers, width * height),
                ));
            }
            let fits = square_side(radius).is_some_and(|diameter| diameter <= width && diameter <= height);
            if centers > 0 && !fits {
                return Err(invalid(
                    pattern,
                    format!("radius {} does not fit a {}x{} grid", radius, width, height),
                ));
            }
            for i in 0..centers {
                // Evenly spaced along the diagonal, pulled inward so the disk fits.
                let cx = evenly_spaced(i, centers, width).clamp(radius, width - 1 - radius);
                let cy = evenly_spaced(i, centers, height).clamp(radius, height - 1 - radius);
                fill_disk(&mut grid, cx, cy, radius);
            }
        }
        OutbreakPattern::RandomChaos { density } => {
            if !(0.0..=1.0).contains(&density) {
                return Err(invalid(pattern, format!("density {} is outside [0, 1]", density)));
            }
            for y in 0..height {
                for x in 0..width {
                    if rng.random::<f64>() < density {
                        grid.set(x, y, CellState::Infected);
                    }
                }
            }
        }
    }

    debug!(
        "Initialized {} on {}x{} grid with {} infected cells.",
        pattern.name(),
        width,
        height,
        grid.count(CellState::Infected)
    );
    Ok(grid)
}

fn invalid(pattern: &OutbreakPattern, reason: String) -> SimulationError {
    SimulationError::InvalidPattern {
        pattern: pattern.name(),
        reason,
    }
}

/// Picks `clusters` disjoint cluster centers, each as far as possible from those already chosen.
///
/// Every round draws a batch of candidates and keeps the one with the largest distance to
/// its nearest placed center (best-candidate sampling). Candidates whose square would touch
/// an existing cluster are discarded. When sampling misses, every center is scanned in
/// row-major order. If the greedy layout still boxes itself in, the clusters go onto
/// randomly chosen slots of the aligned lattice, which holds every count that fits.
fn place_airport_clusters<R: Rng + ?Sized>(
    clusters: usize,
    radius: usize,
    width: usize,
    height: usize,
    rng: &mut R,
) -> Result<Vec<(usize, usize)>, SimulationError> {
    let pattern = OutbreakPattern::AirportSpread { clusters, cluster_radius: radius };
    if clusters == 0 {
        return Ok(Vec::new());
    }
    let side = match square_side(radius) {
        Some(side) if side <= width && side <= height => side,
        _ => {
            return Err(invalid(
                &pattern,
                format!("cluster radius {} does not fit a {}x{} grid", radius, width, height),
            ))
        }
    };
    // Axis-aligned squares of one size never pack tighter than the aligned lattice.
    let (cols, rows) = (width / side, height / side);
    if clusters > cols * rows {
        return Err(invalid(
            &pattern,
            format!(
                "{} clusters of side {} do not fit a {}x{} grid (at most {})",
                clusters,
                side,
                width,
                height,
                cols * rows
            ),
        ));
    }

    let mut centers: Vec<(usize, usize)> = Vec::with_capacity(clusters);
    for cluster in 0..clusters {
        let chosen = sample_cluster_center(&centers, radius, side, width, height, rng)
            .or_else(|| scan_cluster_center(&centers, radius, side, width, height));
        match chosen {
            Some(center) => centers.push(center),
            None => {
                debug!(
                    "Greedy airport placement stuck at cluster {} of {}; using the aligned lattice.",
                    cluster + 1,
                    clusters
                );
                return Ok(rand::seq::index::sample(rng, cols * rows, clusters)
                    .into_iter()
                    .map(|slot| (radius + (slot % cols) * side, radius + (slot / cols) * side))
                    .collect());
            }
        }
    }
    Ok(centers)
}

/// `2 * radius + 1`, or `None` on overflow.
fn square_side(radius: usize) -> Option<usize> {
    radius.checked_mul(2)?.checked_add(1)
}

fn is_disjoint(centers: &[(usize, usize)], candidate: (usize, usize), side: usize) -> bool {
    centers
        .iter()
        .all(|&(x, y)| candidate.0.abs_diff(x) >= side || candidate.1.abs_diff(y) >= side)
}

/// Squared distance to the nearest placed center.
fn spread(centers: &[(usize, usize)], candidate: (usize, usize)) -> u128 {
    centers
        .iter()
        .map(|&(x, y)| {
            let (dx, dy) = (candidate.0.abs_diff(x) as u128, candidate.1.abs_diff(y) as u128);
            dx * dx + dy * dy
        })
        .min()
        .unwrap_or(u128::MAX)
}

fn sample_cluster_center<R: Rng + ?Sized>(
    centers: &[(usize, usize)],
    radius: usize,
    side: usize,
    width: usize,
    height: usize,
    rng: &mut R,
) -> Option<(usize, usize)> {
    for _attempt in 0..MAX_PLACEMENT_ATTEMPTS {
        let mut best: Option<((usize, usize), u128)> = None;
        for _ in 0..CANDIDATES_PER_ROUND {
            let candidate = (
                rng.random_range(radius..=width - 1 - radius),
                rng.random_range(radius..=height - 1 - radius),
            );
            if !is_disjoint(centers, candidate, side) {
                continue;
            }
            let distance = spread(centers, candidate);
            if best.map_or(true, |(_, best_distance)| distance > best_distance) {
                best = Some((candidate, distance));
            }
        }
        if let Some((candidate, _)) = best {
            return Some(candidate);
        }
    }
    None
}

/// Deterministic fallback: the free center farthest from those already placed.
fn scan_cluster_center(
    centers: &[(usize, usize)],
    radius: usize,
    side: usize,
    width: usize,
    height: usize,
) -> Option<(usize, usize)> {
    let mut best: Option<((usize, usize), u128)> = None;
    for y in radius..=height - 1 - radius {
        for x in radius..=width - 1 - radius {
            if !is_disjoint(centers, (x, y), side) {
                continue;
            }
            let distance = spread(centers, (x, y));
            if best.map_or(true, |(_, best_distance)| distance > best_distance) {
                best = Some(((x, y), distance));
            }
        }
    }
    best.map(|(center, _)| center)
}

/// `(i + 1) * len / (count + 1)`, computed wide so large counts cannot overflow.
fn evenly_spaced(i: usize, count: usize, len: usize) -> usize {
    ((i as u128 + 1) * len as u128 / (count as u128 + 1)) as usize
}

fn fill_square(grid: &mut Grid, cx: usize, cy: usize, radius: usize) {
    for y in cy.saturating_sub(radius)..=cy + radius {
        for x in cx.saturating_sub(radius)..=cx + radius {
            grid.set(x, y, CellState::Infected);
        }
    }
}

fn fill_disk(grid: &mut Grid, cx: usize, cy: usize, radius: usize) {
    let r_sq = radius * radius;
    for y in cy.saturating_sub(radius)..=cy + radius {
        for x in cx.saturating_sub(radius)..=cx + radius {
            if x.abs_diff(cx).pow(2) + y.abs_diff(cy).pow(2) <= r_sq {
                grid.set(x, y, CellState::Infected);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn build(pattern: OutbreakPattern, width: usize, height: usize, seed: u64) -> Result<Grid, SimulationError> {
        let mut rng = StdRng::seed_from_u64(seed);
        initialize(&pattern, width, height, &mut rng)
    }

    #[test]
    fn test_patient_zero_is_the_center_cell() {
        let grid = build(OutbreakPattern::PatientZero, 5, 5, 1).unwrap();
        assert_eq!(grid.count(CellState::Infected), 1);
        assert_eq!(grid.get(2, 2), Some(&CellState::Infected));

        let even = build(OutbreakPattern::PatientZero, 4, 6, 1).unwrap();
        assert_eq!(even.get(2, 3), Some(&CellState::Infected));
    }

    #[test]
    fn test_border_band_has_requested_thickness() {
        let grid = build(OutbreakPattern::BorderInvasion { thickness: 2 }, 6, 5, 0).unwrap();
        // 6x5 minus the untouched 2x1 interior.
        assert_eq!(grid.count(CellState::Infected), 28);
        assert_eq!(grid.get(2, 2), Some(&CellState::Healthy));
        assert_eq!(grid.get(3, 2), Some(&CellState::Healthy));
        assert_eq!(grid.get(1, 2), Some(&CellState::Infected));
    }

    #[test]
    fn test_border_thickness_zero_infects_nothing() {
        let grid = build(OutbreakPattern::BorderInvasion { thickness: 0 }, 6, 6, 0).unwrap();
        assert_eq!(grid.count(CellState::Infected), 0);
    }

    #[test]
    fn test_border_thicker_than_grid_is_rejected() {
        let err = build(OutbreakPattern::BorderInvasion { thickness: 4 }, 6, 6, 0).unwrap_err();
        assert!(matches!(err, SimulationError::InvalidPattern { pattern: "border_invasion", .. }));
    }

    #[test]
    fn test_airport_clusters_are_disjoint_squares() {
        let pattern = OutbreakPattern::AirportSpread { clusters: 4, cluster_radius: 1 };
        let grid = build(pattern, 30, 30, 99).unwrap();
        // Disjoint 3x3 squares: exactly 4 * 9 infected cells.
        assert_eq!(grid.count(CellState::Infected), 36);
    }

    #[test]
    fn test_airport_is_reproducible_for_a_seed() {
        let pattern = OutbreakPattern::AirportSpread { clusters: 5, cluster_radius: 0 };
        let a = build(pattern.clone(), 40, 40, 12).unwrap();
        let b = build(pattern, 40, 40, 12).unwrap();
        assert_eq!(a, b);
        assert_eq!(a.count(CellState::Infected), 5);
    }

    #[test]
    fn test_airport_with_too_many_clusters_is_rejected() {
        let pattern = OutbreakPattern::AirportSpread { clusters: 10, cluster_radius: 1 };
        let err = build(pattern, 6, 6, 3).unwrap_err();
        assert!(matches!(err, SimulationError::InvalidPattern { pattern: "airport_spread", .. }));

        let oversized = OutbreakPattern::AirportSpread { clusters: 1, cluster_radius: 3 };
        assert!(build(oversized, 6, 6, 3).is_err());

        // 36 cells would hold five 3x3 squares by area, but only four fit.
        let crowded = OutbreakPattern::AirportSpread { clusters: 5, cluster_radius: 1 };
        assert!(build(crowded, 6, 6, 3).is_err());
    }

    #[test]
    fn test_airport_tight_layouts_fit_for_every_seed() {
        let cases = [((4, 1), (6, 6)), ((2, 1), (6, 3)), ((9, 0), (3, 3)), ((6, 1), (9, 7))];
        for ((clusters, cluster_radius), (width, height)) in cases {
            let side = 2 * cluster_radius + 1;
            let pattern = OutbreakPattern::AirportSpread { clusters, cluster_radius };
            for seed in 0..200 {
                let grid = build(pattern.clone(), width, height, seed)
                    .unwrap_or_else(|e| panic!("{}x{} {:?} seed {}: {}", width, height, pattern, seed, e));
                assert_eq!(grid.count(CellState::Infected), clusters * side * side);
            }
        }
    }

    #[test]
    fn test_huge_pattern_counts_are_rejected_not_overflowed() {
        let airport = OutbreakPattern::AirportSpread { clusters: usize::MAX / 4, cluster_radius: 1 };
        assert!(matches!(build(airport, 10, 10, 0), Err(SimulationError::InvalidPattern { .. })));

        let wide = OutbreakPattern::AirportSpread { clusters: 1, cluster_radius: usize::MAX };
        assert!(matches!(build(wide, 10, 10, 0), Err(SimulationError::InvalidPattern { .. })));

        let crowded = OutbreakPattern::UrbanCenters { centers: usize::MAX, radius: 1 };
        assert!(matches!(build(crowded, 10, 10, 0), Err(SimulationError::InvalidPattern { .. })));

        let wide = OutbreakPattern::UrbanCenters { centers: 1, radius: usize::MAX };
        assert!(matches!(build(wide, 10, 10, 0), Err(SimulationError::InvalidPattern { .. })));
    }

    #[test]
    fn test_urban_centers_spacing_handles_many_centers() {
        // 100 radius-0 centers on a 10x10 grid land on the diagonal.
        let pattern = OutbreakPattern::UrbanCenters { centers: 100, radius: 0 };
        let grid = build(pattern, 10, 10, 0).unwrap();
        assert!(grid.count(CellState::Infected) >= 1);
        assert!(grid.count(CellState::Infected) <= 10);
    }

    #[test]
    fn test_urban_centers_fill_disks() {
        let pattern = OutbreakPattern::UrbanCenters { centers: 2, radius: 2 };
        let grid = build(pattern, 30, 30, 0).unwrap();
        // Two non-overlapping radius-2 disks of 13 cells each, at (10, 10) and (20, 20).
        assert_eq!(grid.count(CellState::Infected), 26);
        assert_eq!(grid.get(10, 10), Some(&CellState::Infected));
        assert_eq!(grid.get(20, 22), Some(&CellState::Infected));
        assert_eq!(grid.get(12, 12), Some(&CellState::Healthy));
    }

    #[test]
    fn test_urban_radius_too_large_is_rejected() {
        let pattern = OutbreakPattern::UrbanCenters { centers: 1, radius: 5 };
        assert!(build(pattern, 8, 20, 0).is_err());
    }

    #[test]
    fn test_random_chaos_density_zero_is_all_healthy() {
        let grid = build(OutbreakPattern::RandomChaos { density: 0.0 }, 12, 9, 5).unwrap();
        assert_eq!(grid, Grid::healthy(12, 9));
    }

    #[test]
    fn test_random_chaos_density_one_is_all_infected() {
        let grid = build(OutbreakPattern::RandomChaos { density: 1.0 }, 4, 4, 5).unwrap();
        assert_eq!(grid.count(CellState::Infected), 16);
    }

    #[test]
    fn test_random_chaos_invalid_density_is_rejected() {
        assert!(build(OutbreakPattern::RandomChaos { density: 1.2 }, 4, 4, 5).is_err());
    }

    #[test]
    fn test_empty_grid_is_rejected() {
        assert_eq!(
            build(OutbreakPattern::PatientZero, 0, 4, 0).unwrap_err(),
            SimulationError::InvalidGridSize { width: 0, height: 4 }
        );
    }
}
