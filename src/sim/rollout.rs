//! Episode evaluation: drive a policy through one episode and record every
//! hour.

use std::fmt;

use serde::Serialize;
use tracing::info;

use crate::error::EnvError;

use super::env::{MicrogridEnv, ResetOptions};
use super::policy::Policy;
use super::types::{ACTION_DIM, NUM_GENERATORS, StepOutcome};

/// Everything observed and decided in one hour of an evaluated episode.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct StepRecord {
    /// Hour of the episode (0-based).
    pub hour: usize,
    pub price: f32,
    pub net_load: f32,
    /// Action applied during the hour.
    pub action: [f32; ACTION_DIM],
    /// Battery state of charge after the hour.
    pub soc: f32,
    /// Battery energy change (positive when charging).
    pub battery_energy_change: f32,
    /// Generator outputs after the hour.
    pub generator_outputs: [f32; NUM_GENERATORS],
    pub grid_import: f32,
    pub grid_export: f32,
    /// Supply minus net load.
    pub unbalance: f32,
    /// Deficit the grid could not cover.
    pub shedding: f32,
    /// Surplus the grid could not take.
    pub excess: f32,
    pub real_unbalance: f32,
    pub generation_cost: f32,
    pub battery_cost: f32,
    pub operation_cost: f32,
    pub reward: f32,
}

impl fmt::Display for StepRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [g1, g2, g3] = self.generator_outputs;
        write!(
            f,
            "hour {:2} | price {:6.3} | net load {:8.2} | soc {:.3} | gen [{:.1}, {:.1}, {:.1}] \
             | import {:7.2} | export {:7.2} | unbalance {:8.2} | reward {:10.4}",
            self.hour,
            self.price,
            self.net_load,
            self.soc,
            g1,
            g2,
            g3,
            self.grid_import,
            self.grid_export,
            self.unbalance,
            self.reward,
        )
    }
}

/// One complete evaluated episode.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EpisodeRecord {
    pub month: u32,
    pub day: u32,
    /// Battery state of charge at the start of the episode.
    pub initial_soc: f32,
    /// One record per hour, in order.
    pub steps: Vec<StepRecord>,
}

impl EpisodeRecord {
    /// Sum of hourly rewards.
    pub fn total_reward(&self) -> f32 {
        self.steps.iter().map(|s| s.reward).sum()
    }

    /// Sum of hourly imbalance the grid could not absorb.
    pub fn total_real_unbalance(&self) -> f32 {
        self.steps.iter().map(|s| s.real_unbalance).sum()
    }
}

/// Runs exactly one episode from a reset with `options`.
///
/// # Errors
///
/// Returns an [`EnvError`] if the reset anchor is invalid.
pub fn evaluate_episode(
    env: &mut MicrogridEnv,
    policy: &mut dyn Policy,
    options: ResetOptions,
) -> Result<EpisodeRecord, EnvError> {
    evaluate_episode_with(env, policy, options, |_, _| {})
}

/// Like [`evaluate_episode`], calling `on_step` after every hour with the
/// environment and the step outcome (e.g. to render it).
///
/// # Errors
///
/// Returns an [`EnvError`] if the reset anchor is invalid.
pub fn evaluate_episode_with<F>(
    env: &mut MicrogridEnv,
    policy: &mut dyn Policy,
    options: ResetOptions,
    mut on_step: F,
) -> Result<EpisodeRecord, EnvError>
where
    F: FnMut(&MicrogridEnv, &StepOutcome),
{
    let mut obs = env.reset(options)?;
    let mut record = EpisodeRecord {
        month: obs.month,
        day: obs.day,
        initial_soc: obs.soc,
        steps: Vec::with_capacity(env.episode_length()),
    };

    loop {
        let action = policy.act(&obs);
        let outcome = env.step(&action)?;
        let Some(report) = env.last_report().copied() else {
            return Err(EnvError::NotReset);
        };

        let s = report.costs.settlement;
        let [g1, g2, g3, _] = report.current_outputs;
        let mut step = StepRecord {
            hour: outcome.current_obs.hour,
            price: outcome.current_obs.price,
            net_load: outcome.current_obs.net_load,
            action: action.0,
            soc: report.soc,
            battery_energy_change: report.battery_energy_change,
            generator_outputs: [g1, g2, g3],
            grid_import: s.grid_import,
            grid_export: s.grid_export,
            unbalance: report.unbalance,
            shedding: s.shedding,
            excess: s.excess,
            real_unbalance: report.real_unbalance,
            generation_cost: report.costs.generation(),
            battery_cost: report.costs.battery,
            operation_cost: report.operation_cost,
            reward: outcome.reward,
        };
        // live assets are already reset for the next episode
        if outcome.done {
            if let Some(fin) = env.final_step_outputs() {
                step.generator_outputs = fin.generators;
                step.soc = fin.soc;
            }
        }
        record.steps.push(step);
        on_step(env, &outcome);

        if outcome.done {
            break;
        }
        obs = outcome.next_obs;
    }

    info!(
        month = record.month,
        day = record.day,
        policy = policy.name(),
        episode_return = record.total_reward(),
        unresolved = record.total_real_unbalance(),
        "episode evaluated"
    );
    Ok(record)
}

/// Evaluates one randomly sampled episode.
///
/// # Returns
///
/// `(sum of rewards, sum of real unbalance)`.
///
/// # Errors
///
/// Propagates environment errors.
pub fn episode_return(
    env: &mut MicrogridEnv,
    policy: &mut dyn Policy,
) -> Result<(f32, f32), EnvError> {
    let record = evaluate_episode(env, policy, ResetOptions::default())?;
    Ok((record.total_reward(), record.total_real_unbalance()))
}
