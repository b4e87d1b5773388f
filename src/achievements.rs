//! Milestones unlocked by a run's statistics history.
//!
//! Evaluation is a pure pass over the history: it returns the achievements that
//! are met now and were not unlocked before. Merging them into the run's unlocked
//! set is the caller's job, and nothing is ever removed from that set.

use log::debug;
use outbreak_common::{OutbreakPattern, SimulationParameters, StatisticsSnapshot};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

const PANDEMIC_PEAK_SHARE: f64 = 0.80;
const SURVIVOR_MIN_STEP: usize = 100;
const SURVIVOR_HEALTHY_SHARE: f64 = 0.50;
const CONTAINMENT_MAX_SHARE: f64 = 0.05;
const CONTAINMENT_STREAK: usize = 20;
const RAPID_SPREAD_MAX_STEP: usize = 10;
const RAPID_SPREAD_SHARE: f64 = 0.25;
const ENDEMIC_MIN_STEP: usize = 50;
const ENDEMIC_WINDOW: usize = 20;
const ENDEMIC_MAX_SHARE: f64 = 0.10;
const GHOST_TOWN_EVER_SHARE: f64 = 0.50;
const GHOST_TOWN_DEATH_SHARE: f64 = 0.90;

/// Everything a predicate may look at.
#[derive(Debug, Clone, Copy)]
pub struct EvaluationContext<'a> {
    pub history: &'a [StatisticsSnapshot],
    pub params: &'a SimulationParameters,
    pub pattern: &'a OutbreakPattern,
}

impl EvaluationContext<'_> {
    fn share(&self, count: usize) -> f64 {
        let size = self.params.grid_size();
        if size == 0 {
            0.0
        } else {
            count as f64 / size as f64
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Achievement {
    PatientZero,
    Pandemic,
    Survivor,
    ExtinctionEvent,
    HerdImmunity,
    ContainmentMaster,
    RapidSpread,
    EndemicState,
    GhostTown,
}

impl Achievement {
    pub const ALL: [Achievement; 9] = [
        Achievement::PatientZero,
        Achievement::Pandemic,
        Achievement::Survivor,
        Achievement::ExtinctionEvent,
        Achievement::HerdImmunity,
        Achievement::ContainmentMaster,
        Achievement::RapidSpread,
        Achievement::EndemicState,
        Achievement::GhostTown,
    ];

    /// Stable identifier used in logs and output files.
    pub fn id(self) -> &'static str {
        match self {
            Achievement::PatientZero => "patient_zero",
            Achievement::Pandemic => "pandemic",
            Achievement::Survivor => "survivor",
            Achievement::ExtinctionEvent => "extinction_event",
            Achievement::HerdImmunity => "herd_immunity",
            Achievement::ContainmentMaster => "containment_master",
            Achievement::RapidSpread => "rapid_spread",
            Achievement::EndemicState => "endemic_state",
            Achievement::GhostTown => "ghost_town",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            Achievement::PatientZero => "The outbreak began with at least one infected cell",
            Achievement::Pandemic => "Peak infection reached 80% of the population",
            Achievement::Survivor => "Half the population was still healthy after 100 steps",
            Achievement::ExtinctionEvent => "Every cell died",
            Achievement::HerdImmunity => "The disease died out while immune cells remained",
            Achievement::ContainmentMaster => "Infection stayed at or below 5% for 20 consecutive steps",
            Achievement::RapidSpread => "A quarter of the population was infected within 10 steps",
            Achievement::EndemicState => "Infection lingered between 0% and 10% for 20 steps past step 50",
            Achievement::GhostTown => "Over half the population was infected and 90% of them died",
        }
    }

    /// Whether the predicate holds anywhere in the context's history.
    pub fn is_met(self, ctx: &EvaluationContext<'_>) -> bool {
        let history = ctx.history;
        match self {
            Achievement::PatientZero => history.first().is_some_and(|s| s.infected >= 1),
            Achievement::Pandemic => history
                .iter()
                .any(|s| ctx.share(s.peak_infected) >= PANDEMIC_PEAK_SHARE),
            Achievement::Survivor => history.iter().any(|s| {
                s.step >= SURVIVOR_MIN_STEP && ctx.share(s.healthy) >= SURVIVOR_HEALTHY_SHARE
            }),
            Achievement::ExtinctionEvent => history
                .iter()
                .any(|s| s.dead == ctx.params.grid_size()),
            Achievement::HerdImmunity => {
                let mut seen_infection = false;
                history.iter().any(|s| {
                    let extinguished = seen_infection && s.infected == 0 && s.immune > 0;
                    seen_infection |= s.infected > 0;
                    extinguished
                })
            }
            Achievement::ContainmentMaster => {
                let mut streak = 0;
                history
                    .iter()
                    .skip_while(|s| s.total_ever_infected == 0)
                    .any(|s| {
                        if ctx.share(s.infected) <= CONTAINMENT_MAX_SHARE {
                            streak += 1;
                        } else {
                            streak = 0;
                        }
                        streak >= CONTAINMENT_STREAK
                    })
            }
            Achievement::RapidSpread => history.iter().any(|s| {
                s.step <= RAPID_SPREAD_MAX_STEP && ctx.share(s.infected) >= RAPID_SPREAD_SHARE
            }),
            Achievement::EndemicState => history.windows(ENDEMIC_WINDOW).any(|window| {
                window[ENDEMIC_WINDOW - 1].step >= ENDEMIC_MIN_STEP
                    && window
                        .iter()
                        .all(|s| s.infected > 0 && ctx.share(s.infected) < ENDEMIC_MAX_SHARE)
            }),
            Achievement::GhostTown => history.iter().any(|s| {
                ctx.share(s.total_ever_infected) > GHOST_TOWN_EVER_SHARE
                    && s.dead as f64 >= GHOST_TOWN_DEATH_SHARE * s.total_ever_infected as f64
            }),
        }
    }
}

impl fmt::Display for Achievement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

/// Returns the achievements met by `history` that are not already in `already_unlocked`,
/// in declaration order.
pub fn evaluate(
    history: &[StatisticsSnapshot],
    params: &SimulationParameters,
    pattern: &OutbreakPattern,
    already_unlocked: &BTreeSet<Achievement>,
) -> Vec<Achievement> {
    let ctx = EvaluationContext {
        history,
        params,
        pattern,
    };
    let unlocked: Vec<Achievement> = Achievement::ALL
        .into_iter()
        .filter(|a| !already_unlocked.contains(a))
        .filter(|a| a.is_met(&ctx))
        .collect();
    for achievement in &unlocked {
        debug!("Achievement unlocked: {} ({})", achievement, achievement.description());
    }
    unlocked
}

#[cfg(test)]
mod tests {
    use super::*;

    /// 10x10 grid, so counts read directly as percentages.
    fn params() -> SimulationParameters {
        SimulationParameters::new(10, 10, 0.3, 0.1, 0.05).unwrap()
    }

    fn snap(step: usize, healthy: usize, infected: usize, immune: usize, dead: usize) -> StatisticsSnapshot {
        StatisticsSnapshot {
            step,
            healthy,
            infected,
            immune,
            dead,
            peak_infected: infected,
            total_ever_infected: infected + immune + dead,
            new_infections: 0,
            new_deaths: 0,
            new_recoveries: 0,
        }
    }

    /// Fixes up the running maxima so hand-written histories stay consistent.
    fn consistent(mut history: Vec<StatisticsSnapshot>) -> Vec<StatisticsSnapshot> {
        for i in 1..history.len() {
            let prev = history[i - 1].clone();
            let s = &mut history[i];
            s.peak_infected = s.peak_infected.max(prev.peak_infected);
            s.total_ever_infected = s.total_ever_infected.max(prev.total_ever_infected);
        }
        history
    }

    fn met(history: &[StatisticsSnapshot]) -> Vec<Achievement> {
        evaluate(history, &params(), &OutbreakPattern::PatientZero, &BTreeSet::new())
    }

    #[test]
    fn test_patient_zero_requires_initial_infection() {
        assert!(met(&[snap(0, 99, 1, 0, 0)]).contains(&Achievement::PatientZero));
        assert!(!met(&[snap(0, 100, 0, 0, 0)]).contains(&Achievement::PatientZero));
        assert!(met(&[]).is_empty());
    }

    #[test]
    fn test_pandemic_threshold_is_inclusive() {
        let history = consistent(vec![snap(0, 99, 1, 0, 0), snap(1, 20, 80, 0, 0)]);
        assert!(met(&history).contains(&Achievement::Pandemic));
        let history = consistent(vec![snap(0, 99, 1, 0, 0), snap(1, 21, 79, 0, 0)]);
        assert!(!met(&history).contains(&Achievement::Pandemic));
    }

    #[test]
    fn test_survivor_needs_step_one_hundred() {
        assert!(!met(&[snap(99, 60, 0, 40, 0)]).contains(&Achievement::Survivor));
        assert!(met(&[snap(100, 50, 0, 50, 0)]).contains(&Achievement::Survivor));
        assert!(!met(&[snap(150, 49, 0, 51, 0)]).contains(&Achievement::Survivor));
    }

    #[test]
    fn test_extinction_event_needs_every_cell_dead() {
        assert!(met(&[snap(9, 0, 0, 0, 100)]).contains(&Achievement::ExtinctionEvent));
        assert!(!met(&[snap(9, 0, 0, 1, 99)]).contains(&Achievement::ExtinctionEvent));
    }

    #[test]
    fn test_herd_immunity_needs_prior_infection() {
        let history = consistent(vec![snap(0, 95, 5, 0, 0), snap(1, 90, 0, 8, 2)]);
        assert!(met(&history).contains(&Achievement::HerdImmunity));

        // Immune cells with no infection ever recorded before them do not count.
        assert!(!met(&[snap(0, 90, 0, 10, 0)]).contains(&Achievement::HerdImmunity));

        let all_dead = consistent(vec![snap(0, 95, 5, 0, 0), snap(1, 95, 0, 0, 5)]);
        assert!(!met(&all_dead).contains(&Achievement::HerdImmunity));
    }

    #[test]
    fn test_containment_needs_a_sustained_streak() {
        let mut history = vec![snap(0, 98, 2, 0, 0)];
        for step in 1..CONTAINMENT_STREAK {
            history.push(snap(step, 97, 3, 0, 0));
        }
        let history = consistent(history);
        assert!(met(&history).contains(&Achievement::ContainmentMaster));
        assert!(!met(&history[..CONTAINMENT_STREAK - 1]).contains(&Achievement::ContainmentMaster));

        // A spike above 5% resets the streak.
        let mut spiked = history.clone();
        spiked[10] = snap(10, 90, 10, 0, 0);
        let spiked = consistent(spiked);
        assert!(!met(&spiked).contains(&Achievement::ContainmentMaster));
    }

    #[test]
    fn test_containment_ignores_steps_before_any_infection() {
        let history: Vec<_> = (0..30).map(|step| snap(step, 100, 0, 0, 0)).collect();
        assert!(!met(&history).contains(&Achievement::ContainmentMaster));
    }

    #[test]
    fn test_rapid_spread_window() {
        assert!(met(&[snap(10, 75, 25, 0, 0)]).contains(&Achievement::RapidSpread));
        assert!(!met(&[snap(11, 50, 50, 0, 0)]).contains(&Achievement::RapidSpread));
    }

    #[test]
    fn test_endemic_state_needs_twenty_low_steps_past_fifty() {
        let history: Vec<_> = (0..=ENDEMIC_MIN_STEP).map(|step| snap(step, 95, 5, 0, 0)).collect();
        let history = consistent(history);
        assert!(met(&history).contains(&Achievement::EndemicState));

        let early = consistent((0..40).map(|step| snap(step, 95, 5, 0, 0)).collect());
        assert!(!met(&early).contains(&Achievement::EndemicState));
    }

    #[test]
    fn test_ghost_town() {
        assert!(met(&[snap(30, 40, 0, 5, 55)]).contains(&Achievement::GhostTown));
        assert!(!met(&[snap(30, 40, 0, 10, 50)]).contains(&Achievement::GhostTown));
    }

    #[test]
    fn test_already_unlocked_are_not_reported_again() {
        let history = [snap(0, 99, 1, 0, 0)];
        let mut unlocked = BTreeSet::new();
        unlocked.insert(Achievement::PatientZero);
        let fresh = evaluate(&history, &params(), &OutbreakPattern::PatientZero, &unlocked);
        assert!(fresh.is_empty());
    }

    #[test]
    fn test_ids_are_unique() {
        let ids: BTreeSet<&str> = Achievement::ALL.iter().map(|a| a.id()).collect();
        assert_eq!(ids.len(), Achievement::ALL.len());
    }
}
