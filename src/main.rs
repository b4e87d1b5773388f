use anyhow::{Context, Result};
use clap::Parser;
use log::{debug, error, info, trace};
use outbreak_engine::{
    OutbreakPattern, PatternKind, SimulationConfig, SimulationController, SimulationError,
    StatisticsSnapshot,
};
use std::fs::File;
use std::io::Write;
use std::path::PathBuf;
use std::time::Instant;

/// Runs an outbreak simulation from a TOML config and saves its statistics.
#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    /// Path to the run configuration.
    #[arg(short, long, default_value = "config.toml")]
    config: PathBuf,

    /// Overrides `run.seed`.
    #[arg(long)]
    seed: Option<u64>,

    /// Overrides `run.max_steps`.
    #[arg(long)]
    steps: Option<usize>,

    /// Overrides the pattern with its grid-scaled defaults (e.g. `airport_spread`).
    #[arg(long)]
    pattern: Option<PatternKind>,
}

fn main() -> Result<()> {
    // Initialize the logger
    env_logger::init();
    let args = Args::parse();

    info!("Starting Outbreak Engine...");

    // --- Load Configuration ---
    let config = SimulationConfig::load(&args.config)?;
    let params = config.get_sim_params();
    let pattern = match args.pattern {
        Some(kind) => OutbreakPattern::default_for(kind, params.width, params.height),
        None => config.outbreak_pattern(),
    };
    let seed = args.seed.unwrap_or(config.run.seed);
    let total_steps = args.steps.unwrap_or(config.run.max_steps);
    let log_interval = config.run.log_interval_steps.max(1);
    debug!("Simulation Parameters: {:#?}", params);

    // --- Initialize Simulation ---
    let mut controller = SimulationController::new(pattern, params, seed, config.run.halt_on_inert)?;
    let initial = controller.current_snapshot().stats.clone();
    info!(
        "Initialized {}x{} grid with pattern {} (seed {}): {} infected.",
        controller.run().params().width,
        controller.run().params().height,
        controller.run().pattern().name(),
        seed,
        initial.infected
    );

    // --- Simulation Loop ---
    info!("Starting simulation loop for up to {} steps...", total_steps);
    let start_time = Instant::now();

    for step in 0..total_steps {
        let step_start_time = Instant::now();
        let unlocked = match controller.step() {
            Ok(unlocked) => unlocked,
            Err(SimulationError::TerminalState { step }) => {
                info!("No infected cells remain after step {}; stopping.", step);
                break;
            }
            Err(e) => {
                error!("Error during simulation step {}: {}", step + 1, e);
                anyhow::bail!("Simulation step failed.");
            }
        };
        let step_duration = step_start_time.elapsed();

        for achievement in &unlocked {
            info!("Achievement unlocked at step {}: {} - {}", step + 1, achievement, achievement.description());
        }

        let is_last_step = step + 1 == total_steps;
        if (step + 1) % log_interval == 0 || is_last_step {
            let stats = controller.current_snapshot().stats;
            info!(
                "Step [{}/{}] | Healthy: {} | Infected: {} | Immune: {} | Dead: {} | Peak: {} | Step Time: {:6.3} ms",
                step + 1,
                total_steps,
                stats.healthy,
                stats.infected,
                stats.immune,
                stats.dead,
                stats.peak_infected,
                step_duration.as_secs_f64() * 1000.0
            );
        } else {
            trace!(
                "Step [{}/{}] completed in {:.3} ms",
                step + 1,
                total_steps,
                step_duration.as_secs_f64() * 1000.0
            );
        }
    }

    let run = controller.run();
    let total_duration = start_time.elapsed();
    info!(
        "Simulation finished after {} steps in {:.3} seconds: {}.",
        run.step_index(),
        total_duration.as_secs_f64(),
        run.status().label()
    );
    info!(
        "Total ever infected: {} | Mortality: {:.1}% | Recovery: {:.1}% | Transmission: {:.3}",
        run.latest().total_ever_infected,
        run.mortality_rate() * 100.0,
        run.recovery_rate() * 100.0,
        run.transmission_rate()
    );
    if let Some(step) = run.contained_at() {
        info!("Outbreak contained at step {}.", step);
    }
    let unlocked: Vec<&str> = run.unlocked().iter().map(|a| a.id()).collect();
    info!("Achievements unlocked: {:?}", unlocked);

    // --- Save Recorded Data ---
    let base = &config.output.base_filename;
    if config.output.save_stats {
        let format = config.output.format.as_deref().unwrap_or("json");
        save_snapshots(run.history(), base, format)?;
    } else {
        info!("Skipping saving statistics as per config (save_stats is false).");
    }

    if config.output.save_final_grid {
        let filename = format!("{}_final_grid.csv", base);
        let mut writer = csv::Writer::from_path(&filename)
            .with_context(|| format!("Failed to create grid file '{}'", filename))?;
        writer.write_record(["x", "y", "state"])?;
        for (x, y, cell) in run.grid().iter_cells() {
            writer.write_record([x.to_string(), y.to_string(), cell.to_string()])?;
        }
        writer.flush()?;
        info!("Final grid saved to {}", filename);
    } else {
        info!("Skipping saving final grid as per config.");
    }

    info!("Simulation Complete.");
    Ok(())
}

/// Writes the statistics history as JSON, bincode or MessagePack.
fn save_snapshots(snapshots: &[StatisticsSnapshot], base: &str, format: &str) -> Result<()> {
    match format {
        "bincode" => {
            // Binary format (much more compact)
            let filename = format!("{}_stats.bin", base);
            let file = File::create(&filename)
                .with_context(|| format!("Failed to create stats file '{}'", filename))?;
            bincode::serialize_into(file, snapshots)
                .context("Failed to serialize statistics to bincode")?;
            info!("{} snapshots saved to {} (binary format)", snapshots.len(), filename);
        }
        "messagepack" => {
            // MessagePack format (compact and cross-platform)
            let filename = format!("{}_stats.msgpack", base);
            let mut file = File::create(&filename)
                .with_context(|| format!("Failed to create stats file '{}'", filename))?;
            rmp_serde::encode::write(&mut file, snapshots)
                .context("Failed to serialize statistics to MessagePack")?;
            info!("{} snapshots saved to {} (MessagePack format)", snapshots.len(), filename);
        }
        other => {
            if other != "json" {
                error!("Unknown output format: {}. Using JSON instead.", other);
            }
            let filename = format!("{}_stats.json", base);
            let json_string =
                serde_json::to_string(snapshots).context("Failed to serialize statistics to JSON")?;
            let mut file = File::create(&filename)
                .with_context(|| format!("Failed to create stats file '{}'", filename))?;
            file.write_all(json_string.as_bytes())
                .with_context(|| format!("Failed to write stats file '{}'", filename))?;
            info!("{} snapshots saved to {}", snapshots.len(), filename);
        }
    }
    Ok(())
}
