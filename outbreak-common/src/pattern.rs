use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Names of the outbreak patterns, as written in config files and on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PatternKind {
    PatientZero,
    AirportSpread,
    BorderInvasion,
    UrbanCenters,
    RandomChaos,
}

impl PatternKind {
    pub const ALL: [PatternKind; 5] = [
        PatternKind::PatientZero,
        PatternKind::AirportSpread,
        PatternKind::BorderInvasion,
        PatternKind::UrbanCenters,
        PatternKind::RandomChaos,
    ];

    pub fn name(self) -> &'static str {
        match self {
            PatternKind::PatientZero => "patient_zero",
            PatternKind::AirportSpread => "airport_spread",
            PatternKind::BorderInvasion => "border_invasion",
            PatternKind::UrbanCenters => "urban_centers",
            PatternKind::RandomChaos => "random_chaos",
        }
    }
}

impl fmt::Display for PatternKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for PatternKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        PatternKind::ALL
            .into_iter()
            .find(|kind| kind.name() == s)
            .ok_or_else(|| format!("unknown outbreak pattern: {}", s))
    }
}

/// How the initially infected cells are chosen. Only used when a run is reset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum OutbreakPattern {
    /// A single infected cell at the grid center.
    PatientZero,
    /// `clusters` disjoint square clusters (Chebyshev radius `cluster_radius`)
    /// at seeded, mutually distant positions.
    AirportSpread { clusters: usize, cluster_radius: usize },
    /// Every cell within `thickness` cells of the outer edge.
    BorderInvasion { thickness: usize },
    /// `centers` filled disks of `radius`, spaced evenly along the main diagonal.
    UrbanCenters { centers: usize, radius: usize },
    /// Every cell independently infected with probability `density`.
    RandomChaos { density: f64 },
}

impl OutbreakPattern {
    /// The pattern's parameters scaled to the grid, matching the classic GridLife presets.
    pub fn default_for(kind: PatternKind, width: usize, _height: usize) -> Self {
        match kind {
            PatternKind::PatientZero => OutbreakPattern::PatientZero,
            PatternKind::AirportSpread => OutbreakPattern::AirportSpread {
                clusters: 4,
                cluster_radius: 0,
            },
            PatternKind::BorderInvasion => OutbreakPattern::BorderInvasion { thickness: 1 },
            PatternKind::UrbanCenters => OutbreakPattern::UrbanCenters {
                centers: (width / 20).max(2),
                radius: (width / 15).max(2),
            },
            PatternKind::RandomChaos => OutbreakPattern::RandomChaos { density: 0.005 },
        }
    }

    pub fn kind(&self) -> PatternKind {
        match self {
            OutbreakPattern::PatientZero => PatternKind::PatientZero,
            OutbreakPattern::AirportSpread { .. } => PatternKind::AirportSpread,
            OutbreakPattern::BorderInvasion { .. } => PatternKind::BorderInvasion,
            OutbreakPattern::UrbanCenters { .. } => PatternKind::UrbanCenters,
            OutbreakPattern::RandomChaos { .. } => PatternKind::RandomChaos,
        }
    }

    pub fn name(&self) -> &'static str {
        self.kind().name()
    }
}
