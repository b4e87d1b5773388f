use crate::achievements::{self, Achievement};
use crate::grid::{count_infected_neighbors, Grid, RiskMap};
use crate::patterns;
use crate::stats::{self, OutbreakStatus};
use crate::transition;
use log::{debug, info, trace};
use outbreak_common::{OutbreakPattern, SimulationError, SimulationParameters, StatisticsSnapshot};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::collections::BTreeSet;

/// Read-only view of a run at its latest step.
#[derive(Debug, Clone, Copy)]
pub struct RunSnapshot<'a> {
    pub grid: &'a Grid,
    pub stats: &'a StatisticsSnapshot,
    pub achievements: &'a BTreeSet<Achievement>,
}

/// One simulation run: the grid, its fixed parameters, the seeded generator, the
/// statistics history and the unlocked achievements.
///
/// Created by [`SimulationRun::reset`] and changed only by [`SimulationRun::step`].
/// Each tick builds a new grid from the previous one and appends one snapshot;
/// nothing carries over from an earlier run.
#[derive(Debug, Clone)]
pub struct SimulationRun {
    grid: Grid,
    params: SimulationParameters,
    pattern: OutbreakPattern,
    seed: u64,
    /// Generator for placement and every transition draw of this run.
    rng: StdRng,
    /// One snapshot per step, starting with step 0.
    history: Vec<StatisticsSnapshot>,
    unlocked: BTreeSet<Achievement>,
}

impl SimulationRun {
    /// Validates `params`, places `pattern`, and records the step-0 snapshot.
    pub fn reset(
        pattern: OutbreakPattern,
        params: SimulationParameters,
        seed: u64,
    ) -> Result<Self, SimulationError> {
        params.validate()?;
        let mut rng = StdRng::seed_from_u64(seed);
        let grid = patterns::initialize(&pattern, params.width, params.height, &mut rng)?;
        let initial = stats::observe(&grid, None);

        let mut run = Self {
            grid,
            params,
            pattern,
            seed,
            rng,
            history: vec![initial],
            unlocked: BTreeSet::new(),
        };
        let unlocked = run.evaluate_achievements();
        debug!(
            "Reset run: pattern={} grid={}x{} seed={} infected={} achievements={:?}",
            run.pattern.name(),
            run.params.width,
            run.params.height,
            seed,
            run.latest().infected,
            unlocked
        );
        Ok(run)
    }

    /// Advances exactly one tick and returns the achievements it unlocked.
    ///
    /// An inert grid (nothing Infected) is still stepped; it simply stays the same.
    pub fn step(&mut self) -> Vec<Achievement> {
        // Neighbor counts and the transition both read the pre-tick grid only.
        let counts = count_infected_neighbors(&self.grid);
        let next = transition::step(&self.grid, &counts, &self.params, &mut self.rng);
        let snapshot = stats::observe(&next, Some(self.latest()));
        self.grid = next;

        trace!(
            "Step {}: healthy={} infected={} immune={} dead={}",
            snapshot.step,
            snapshot.healthy,
            snapshot.infected,
            snapshot.immune,
            snapshot.dead
        );
        self.history.push(snapshot);
        self.evaluate_achievements()
    }

    fn evaluate_achievements(&mut self) -> Vec<Achievement> {
        let fresh = achievements::evaluate(&self.history, &self.params, &self.pattern, &self.unlocked);
        self.unlocked.extend(fresh.iter().copied());
        fresh
    }

    /// Grid, latest statistics and unlocked achievements.
    pub fn current_snapshot(&self) -> RunSnapshot<'_> {
        RunSnapshot {
            grid: &self.grid,
            stats: self.latest(),
            achievements: &self.unlocked,
        }
    }

    /// Infection probability of every Healthy cell for the next tick.
    pub fn risk_map(&self) -> RiskMap {
        let counts = count_infected_neighbors(&self.grid);
        transition::risk_map(&self.grid, &counts, self.params.infection_rate)
    }

    /// The most recent snapshot. The history always holds at least the step-0 entry.
    pub fn latest(&self) -> &StatisticsSnapshot {
        &self.history[self.history.len() - 1]
    }

    pub fn has_infected_cells(&self) -> bool {
        self.latest().infected > 0
    }

    /// Nothing can change any more: no cell is Infected.
    pub fn is_inert(&self) -> bool {
        !self.has_infected_cells()
    }

    pub fn status(&self) -> OutbreakStatus {
        OutbreakStatus::from_snapshot(self.latest())
    }

    pub fn transmission_rate(&self) -> f64 {
        stats::transmission_rate(&self.history)
    }

    pub fn mortality_rate(&self) -> f64 {
        stats::mortality_rate(self.latest())
    }

    pub fn recovery_rate(&self) -> f64 {
        stats::recovery_rate(self.latest())
    }

    pub fn contained_at(&self) -> Option<usize> {
        stats::contained_at(&self.history)
    }

    pub fn step_index(&self) -> usize {
        self.latest().step
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn params(&self) -> &SimulationParameters {
        &self.params
    }

    pub fn pattern(&self) -> &OutbreakPattern {
        &self.pattern
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn history(&self) -> &[StatisticsSnapshot] {
        &self.history
    }

    pub fn unlocked(&self) -> &BTreeSet<Achievement> {
        &self.unlocked
    }
}

/// Result of one [`SimulationController::autorun_tick`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AutorunOutcome {
    /// Autorun is off; nothing happened.
    Idle,
    /// One tick was taken.
    Advanced { unlocked: Vec<Achievement> },
    /// The grid was inert, so autorun switched itself off.
    Finished,
}

/// The surface the interactive layer drives: reset, single steps and autorun ticks.
#[derive(Debug, Clone)]
pub struct SimulationController {
    run: SimulationRun,
    /// Reject `step` on an inert grid instead of producing an unchanged snapshot.
    halt_on_inert: bool,
    autorun: bool,
}

impl SimulationController {
    pub fn new(
        pattern: OutbreakPattern,
        params: SimulationParameters,
        seed: u64,
        halt_on_inert: bool,
    ) -> Result<Self, SimulationError> {
        Ok(Self {
            run: SimulationRun::reset(pattern, params, seed)?,
            halt_on_inert,
            autorun: false,
        })
    }

    /// Discards the current run and starts a new one. Autorun is switched off.
    ///
    /// On error the previous run is kept untouched.
    pub fn reset(
        &mut self,
        pattern: OutbreakPattern,
        params: SimulationParameters,
        seed: u64,
    ) -> Result<(), SimulationError> {
        self.run = SimulationRun::reset(pattern, params, seed)?;
        self.autorun = false;
        info!(
            "Simulation reset with pattern {} ({} infected).",
            self.run.pattern().name(),
            self.run.latest().infected
        );
        Ok(())
    }

    /// Advances one tick and returns the newly unlocked achievements.
    pub fn step(&mut self) -> Result<Vec<Achievement>, SimulationError> {
        if self.halt_on_inert && self.run.is_inert() {
            return Err(SimulationError::TerminalState {
                step: self.run.step_index(),
            });
        }
        Ok(self.run.step())
    }

    /// One tick of auto-run: steps while the outbreak is active, then turns itself off.
    pub fn autorun_tick(&mut self) -> AutorunOutcome {
        if !self.autorun {
            return AutorunOutcome::Idle;
        }
        if self.run.is_inert() {
            self.autorun = false;
            info!(
                "Autorun stopped at step {}: {}.",
                self.run.step_index(),
                self.run.status().label()
            );
            return AutorunOutcome::Finished;
        }
        AutorunOutcome::Advanced {
            unlocked: self.run.step(),
        }
    }

    pub fn set_autorun(&mut self, enabled: bool) {
        self.autorun = enabled;
    }

    pub fn is_autorunning(&self) -> bool {
        self.autorun
    }

    pub fn current_snapshot(&self) -> RunSnapshot<'_> {
        self.run.current_snapshot()
    }

    pub fn risk_map(&self) -> RiskMap {
        self.run.risk_map()
    }

    pub fn run(&self) -> &SimulationRun {
        &self.run
    }
}
