//! Episodic microgrid environment: observation building, hourly transition,
//! cost and reward, and the reset/auto-reset lifecycle.

use std::sync::Arc;

use rand::{Rng, SeedableRng, rngs::StdRng};
use tracing::{debug, trace};

use crate::data::calendar::{CalendarDay, HOURS_PER_DAY, days_in_month};
use crate::data::store::{Series, TimeSeriesStore};
use crate::devices::{
    Battery, BatteryParams, DispatchableAsset, Generator, GeneratorParams, GridConnection,
};
use crate::error::{CalendarError, EnvError};

use super::clock::EpisodeClock;
use super::power_balance::{Tariff, settle, unbalance};
use super::types::{
    ACTION_DIM, Action, CostBreakdown, FinalOutputs, NUM_GENERATORS, Observation, OptimizerInput,
    StepOutcome, StepReport,
};

/// First day of month eligible for random episode sampling.
pub const FIRST_SAMPLED_DAY: u32 = 3;

/// Static configuration of one environment instance.
#[derive(Debug, Clone, PartialEq)]
pub struct EnvConfig {
    /// Hours per episode, at most one calendar day.
    pub episode_length: usize,
    /// Seed for episode sampling and random initial charge.
    pub seed: u64,
    /// Grid settlement coefficients.
    pub tariff: Tariff,
    /// Battery parameters.
    pub battery: BatteryParams,
    /// Generator parameters in plant order.
    pub generators: [GeneratorParams; NUM_GENERATORS],
    /// Whether the grid tie line is in service.
    pub grid_enabled: bool,
    /// Tie-line capacity per hour when enabled.
    pub exchange_ability: f32,
}

/// Optional anchors for [`MicrogridEnv::reset`]. Anything left `None` is sampled.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ResetOptions {
    pub day: Option<u32>,
    pub month: Option<u32>,
    pub initial_soc: Option<f32>,
}

impl ResetOptions {
    /// Fixes the episode to (`month`, `day`).
    pub fn at(month: u32, day: u32) -> Self {
        Self {
            day: Some(day),
            month: Some(month),
            initial_soc: None,
        }
    }

    /// Fixes the initial state of charge.
    pub fn with_soc(mut self, soc: f32) -> Self {
        self.initial_soc = Some(soc);
        self
    }
}

/// Mutable state of every controllable asset.
#[derive(Debug, Clone, PartialEq)]
pub struct PlantState {
    pub battery: Battery,
    pub generators: [Generator; NUM_GENERATORS],
}

impl PlantState {
    /// Builds the plant from its parameter sets.
    pub fn new(battery: BatteryParams, generators: [GeneratorParams; NUM_GENERATORS]) -> Self {
        Self {
            battery: Battery::new(battery),
            generators: generators.map(Generator::new),
        }
    }

    /// Applies one action component per asset: battery, then generators in order.
    pub fn apply(&mut self, action: &Action) {
        let [g1, g2, g3] = &mut self.generators;
        let assets: [&mut dyn DispatchableAsset; ACTION_DIM] = [&mut self.battery, g1, g2, g3];
        for (asset, command) in assets.into_iter().zip(action.0) {
            asset.apply_action(command);
            trace!(
                asset = asset.asset_type(),
                command,
                supply = asset.supply(),
                "dispatched"
            );
        }
    }

    /// Supply of each asset after the last transition: generators 1 to 3,
    /// then the battery's discharge.
    pub fn current_outputs(&self) -> [f32; ACTION_DIM] {
        let [g1, g2, g3] = self.generator_outputs();
        [g1, g2, g3, self.battery.supply()]
    }

    /// Generator outputs in plant order.
    pub fn generator_outputs(&self) -> [f32; NUM_GENERATORS] {
        self.generators.each_ref().map(|g| g.current_output)
    }

    /// Fuel cost of each generator at its current output.
    pub fn generator_costs(&self) -> [f32; NUM_GENERATORS] {
        self.generators.each_ref().map(|g| g.operating_cost())
    }

    /// Resets the battery (given or random SOC) and switches every generator off.
    pub fn reset<R: Rng>(&mut self, initial_soc: Option<f32>, rng: &mut R) {
        self.battery.reset(initial_soc, rng);
        for g in &mut self.generators {
            g.reset();
        }
    }
}

/// Captured environment state for rollback.
#[derive(Debug, Clone)]
pub struct EnvSnapshot {
    plant: PlantState,
    clock: EpisodeClock,
    anchor: Option<CalendarDay>,
    rng: StdRng,
    last_report: Option<StepReport>,
    final_step_outputs: Option<FinalOutputs>,
}

/// The microgrid simulation environment.
///
/// Owns its assets exclusively; the time-series store is shared read-only,
/// so independent environments may run on separate threads.
///
/// `step` before the first `reset` is an error. Once reset, the environment
/// never reaches a held terminal state: the step that completes an episode
/// reports `done = true` and immediately resets to a freshly sampled
/// episode, whose first observation is returned as `next_obs`.
#[derive(Debug, Clone)]
pub struct MicrogridEnv {
    store: Arc<TimeSeriesStore>,
    plant: PlantState,
    grid: GridConnection,
    tariff: Tariff,
    clock: EpisodeClock,
    anchor: Option<CalendarDay>,
    rng: StdRng,
    last_report: Option<StepReport>,
    final_step_outputs: Option<FinalOutputs>,
}

impl MicrogridEnv {
    /// Creates an environment that still needs a `reset`.
    ///
    /// # Panics
    ///
    /// Panics if `episode_length` is zero or longer than a day, or if any
    /// asset parameters are physically inconsistent.
    pub fn new(config: &EnvConfig, store: Arc<TimeSeriesStore>) -> Self {
        assert!(
            config.episode_length <= HOURS_PER_DAY,
            "episode_length must be <= {HOURS_PER_DAY}"
        );

        Self {
            store,
            plant: PlantState::new(config.battery, config.generators),
            grid: GridConnection::new(config.grid_enabled, config.exchange_ability),
            tariff: config.tariff,
            clock: EpisodeClock::new(config.episode_length),
            anchor: None,
            rng: StdRng::seed_from_u64(config.seed),
            last_report: None,
            final_step_outputs: None,
        }
    }

    /// Starts a new episode.
    ///
    /// A missing month is drawn from 1..=12, a missing day from
    /// `3..=days_in_month - 1`, and a missing initial SOC from `[0.2, 0.8)`.
    ///
    /// # Errors
    ///
    /// Returns [`EnvError::Anchor`] if a given month or day is invalid.
    pub fn reset(&mut self, options: ResetOptions) -> Result<Observation, EnvError> {
        let month = match options.month {
            Some(m) => m,
            None => self.rng.random_range(1..=12),
        };
        let day = match options.day {
            Some(d) => d,
            None => self.sample_day(month)?,
        };
        let anchor = CalendarDay::new(month, day)?;

        self.anchor = Some(anchor);
        self.clock.reset();
        self.plant.reset(options.initial_soc, &mut self.rng);
        debug!(month, day, soc = self.plant.battery.soc, "episode reset");
        Ok(self.observation(anchor))
    }

    fn sample_day(&mut self, month: u32) -> Result<u32, CalendarError> {
        let last = days_in_month(month)? - 1;
        Ok(self.rng.random_range(FIRST_SAMPLED_DAY..=last))
    }

    /// Observation at the current hour of the current episode.
    ///
    /// # Errors
    ///
    /// Returns [`EnvError::NotReset`] before the first reset.
    pub fn observe(&self) -> Result<Observation, EnvError> {
        let anchor = self.anchor.ok_or(EnvError::NotReset)?;
        Ok(self.observation(anchor))
    }

    fn observation(&self, anchor: CalendarDay) -> Observation {
        let hour = self.clock.hour();
        let demand = self.store.at(Series::Demand, anchor, hour);
        let pv = self.store.at(Series::Solar, anchor, hour);
        Observation {
            hour,
            price: self.store.at(Series::Price, anchor, hour),
            soc: self.plant.battery.state_of_charge(),
            net_load: demand - pv,
            generator_outputs: self.plant.generator_outputs(),
            month: anchor.month(),
            day: anchor.day(),
        }
    }

    /// Simulates one hour under `action`.
    ///
    /// Net load and price come from the observation at the start of the
    /// hour. Costs use the post-transition asset states.
    ///
    /// # Errors
    ///
    /// Returns [`EnvError::NotReset`] before the first reset.
    pub fn step(&mut self, action: &Action) -> Result<StepOutcome, EnvError> {
        let anchor = self.anchor.ok_or(EnvError::NotReset)?;
        let current_obs = self.observation(anchor);

        self.plant.apply(action);
        let current_outputs = self.plant.current_outputs();
        let actual_production: f32 = current_outputs.iter().sum();
        let unbalance = unbalance(actual_production, current_obs.net_load);
        let settlement = settle(unbalance, current_obs.price, &self.grid, &self.tariff);

        let costs = CostBreakdown {
            battery: self.plant.battery.operating_cost(),
            generators: self.plant.generator_costs(),
            settlement,
        };
        let operation_cost = costs.total();
        let reward = -operation_cost;

        self.last_report = Some(StepReport {
            unbalance,
            real_unbalance: settlement.real_unbalance(),
            operation_cost,
            costs,
            current_outputs,
            battery_energy_change: self.plant.battery.energy_change,
            soc: self.plant.battery.soc,
        });
        let final_outputs = FinalOutputs {
            generators: self.plant.generator_outputs(),
            soc: self.plant.battery.soc,
        };
        trace!(hour = current_obs.hour, unbalance, reward, "step");

        let done = self.clock.tick();
        let next_obs = if done {
            self.final_step_outputs = Some(final_outputs);
            self.reset(ResetOptions::default())?
        } else {
            self.observation(anchor)
        };

        Ok(StepOutcome {
            current_obs,
            next_obs,
            reward,
            done,
        })
    }

    /// One-line text rendering of a step.
    pub fn render(&self, outcome: &StepOutcome) -> String {
        format!(
            "day={},hour={:2}, state={}, next_state={}, reward={:.4}, terminal={}",
            self.anchor.map_or(0, |a| a.day()),
            self.clock.hour(),
            outcome.current_obs,
            outcome.next_obs,
            outcome.reward,
            outcome.done,
        )
    }

    /// Diagnostics of the most recent step.
    pub fn last_report(&self) -> Option<&StepReport> {
        self.last_report.as_ref()
    }

    /// Asset outputs captured on the most recent terminal step, before the
    /// auto-reset cleared them.
    pub fn final_step_outputs(&self) -> Option<&FinalOutputs> {
        self.final_step_outputs.as_ref()
    }

    /// The 24-hour exogenous windows and asset parameters of one day, for an
    /// offline optimizer.
    ///
    /// # Errors
    ///
    /// Returns a [`CalendarError`] if the day is invalid.
    pub fn optimizer_input(&self, month: u32, day: u32) -> Result<OptimizerInput, CalendarError> {
        let anchor = CalendarDay::new(month, day)?;
        let pv = self.store.window(Series::Solar, anchor).to_vec();
        let load = self.store.window(Series::Demand, anchor).to_vec();
        let net_load = load.iter().zip(&pv).map(|(l, p)| l - p).collect();

        Ok(OptimizerInput {
            month,
            day,
            period: self.clock.episode_length(),
            price: self.store.window(Series::Price, anchor).to_vec(),
            pv,
            load,
            net_load,
            battery: *self.plant.battery.params(),
            generators: self.plant.generators.each_ref().map(|g| *g.params()),
            exchange_ability: self.grid.exchange_ability(),
            sell_coefficient: self.tariff.sell_coefficient,
        })
    }

    /// Captures the mutable state for a later [`restore`](Self::restore).
    pub fn snapshot(&self) -> EnvSnapshot {
        EnvSnapshot {
            plant: self.plant.clone(),
            clock: self.clock,
            anchor: self.anchor,
            rng: self.rng.clone(),
            last_report: self.last_report,
            final_step_outputs: self.final_step_outputs,
        }
    }

    /// Reinstates a snapshot taken from this environment.
    pub fn restore(&mut self, snapshot: EnvSnapshot) {
        self.plant = snapshot.plant;
        self.clock = snapshot.clock;
        self.anchor = snapshot.anchor;
        self.rng = snapshot.rng;
        self.last_report = snapshot.last_report;
        self.final_step_outputs = snapshot.final_step_outputs;
    }

    pub fn plant(&self) -> &PlantState {
        &self.plant
    }

    pub fn grid(&self) -> &GridConnection {
        &self.grid
    }

    pub fn tariff(&self) -> &Tariff {
        &self.tariff
    }

    pub fn store(&self) -> &Arc<TimeSeriesStore> {
        &self.store
    }

    /// Hours per episode.
    pub fn episode_length(&self) -> usize {
        self.clock.episode_length()
    }

    /// Current hour of the episode.
    pub fn hour(&self) -> usize {
        self.clock.hour()
    }

    /// Current episode's (month, day), if reset.
    pub fn anchor(&self) -> Option<(u32, u32)> {
        self.anchor.map(|a| (a.month(), a.day()))
    }
}
