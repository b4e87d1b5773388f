use crate::pattern::{OutbreakPattern, PatternKind};
use crate::sim_params::SimulationParameters;
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::Path;

// Grid dimensions
#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct GridConfig {
    pub width: usize,
    pub height: usize,
}

// Disease rates, each a probability per tick
#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct RatesConfig {
    pub infection_rate: f64,
    pub death_rate: f64,
    pub immunity_rate: f64,
}

/// Outbreak pattern selection. Parameters left out are scaled from the grid size.
#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct PatternConfig {
    #[serde(default = "default_pattern_kind")]
    pub kind: PatternKind,
    #[serde(default)]
    pub clusters: Option<usize>,
    #[serde(default)]
    pub cluster_radius: Option<usize>,
    #[serde(default)]
    pub thickness: Option<usize>,
    #[serde(default)]
    pub centers: Option<usize>,
    #[serde(default)]
    pub radius: Option<usize>,
    #[serde(default)]
    pub density: Option<f64>,
}

fn default_pattern_kind() -> PatternKind {
    PatternKind::PatientZero
}

impl Default for PatternConfig {
    fn default() -> Self {
        PatternConfig {
            kind: default_pattern_kind(),
            clusters: None,
            cluster_radius: None,
            thickness: None,
            centers: None,
            radius: None,
            density: None,
        }
    }
}

// Run control
#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct RunConfig {
    pub seed: u64,
    pub max_steps: usize,
    /// Stop as soon as no infected cells remain instead of stepping an inert grid.
    #[serde(default = "default_halt_on_inert")]
    pub halt_on_inert: bool,
    #[serde(default = "default_log_interval_steps")]
    pub log_interval_steps: usize,
}

fn default_halt_on_inert() -> bool {
    true
}

fn default_log_interval_steps() -> usize {
    10
}

// Output settings
#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct OutputConfig {
    pub base_filename: String,
    pub save_stats: bool,
    pub save_final_grid: bool,
    pub format: Option<String>, // Output format: "json", "bincode", "messagepack"
}

/// Full run configuration, loaded from config.toml.
#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct SimulationConfig {
    pub grid: GridConfig,
    pub rates: RatesConfig,
    #[serde(default)]
    pub pattern: PatternConfig,
    pub run: RunConfig,
    pub output: OutputConfig,
}

impl SimulationConfig {
    /// Loads the simulation configuration from a TOML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path_ref = path.as_ref();

        let config_str = std::fs::read_to_string(path_ref)
            .map_err(|e| anyhow::anyhow!("Failed to read config file '{}': {}", path_ref.display(), e))?;
        let config = Self::from_toml_str(&config_str)
            .map_err(|e| anyhow::anyhow!("Invalid config '{}': {}", path_ref.display(), e))?;
        Ok(config)
    }

    /// Parses and validates configuration text.
    pub fn from_toml_str(config_str: &str) -> Result<Self> {
        let config: SimulationConfig = toml::from_str(config_str)?;

        // Rates and dimensions are validated again at reset; failing here reports the file early.
        config.get_sim_params().validate()?;
        if config.run.max_steps == 0 {
            anyhow::bail!("max_steps must be greater than 0.");
        }
        if let Some(density) = config.pattern.density {
            if !(0.0..=1.0).contains(&density) {
                anyhow::bail!("pattern density must be within [0, 1], got {}.", density);
            }
        }

        Ok(config)
    }

    /// Converts the configuration into the parameters used at runtime.
    pub fn get_sim_params(&self) -> SimulationParameters {
        SimulationParameters {
            width: self.grid.width,
            height: self.grid.height,
            infection_rate: self.rates.infection_rate,
            death_rate: self.rates.death_rate,
            immunity_rate: self.rates.immunity_rate,
        }
    }

    /// Resolves the configured pattern, filling unset parameters from the grid-scaled defaults.
    pub fn outbreak_pattern(&self) -> OutbreakPattern {
        let p = &self.pattern;
        match OutbreakPattern::default_for(p.kind, self.grid.width, self.grid.height) {
            OutbreakPattern::PatientZero => OutbreakPattern::PatientZero,
            OutbreakPattern::AirportSpread { clusters, cluster_radius } => OutbreakPattern::AirportSpread {
                clusters: p.clusters.unwrap_or(clusters),
                cluster_radius: p.cluster_radius.unwrap_or(cluster_radius),
            },
            OutbreakPattern::BorderInvasion { thickness } => OutbreakPattern::BorderInvasion {
                thickness: p.thickness.unwrap_or(thickness),
            },
            OutbreakPattern::UrbanCenters { centers, radius } => OutbreakPattern::UrbanCenters {
                centers: p.centers.unwrap_or(centers),
                radius: p.radius.unwrap_or(radius),
            },
            OutbreakPattern::RandomChaos { density } => OutbreakPattern::RandomChaos {
                density: p.density.unwrap_or(density),
            },
        }
    }
}
