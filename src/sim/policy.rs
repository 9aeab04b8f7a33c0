//! Baseline dispatch policies.
//!
//! Policies map an observation to a normalized action. They are used to
//! drive evaluation runs from the CLI and in tests; learned agents plug in
//! through the same [`Policy`] trait.

use rand::{Rng, SeedableRng, rngs::StdRng};

use crate::devices::{Battery, BatteryParams, DispatchableAsset, Generator, GeneratorParams};

use super::types::{ACTION_DIM, Action, NUM_GENERATORS, Observation};

/// Price at or above which the merit-order heuristic discharges the battery.
pub const DEFAULT_DISCHARGE_PRICE: f32 = 5.0;

/// Residual power below which no generator is committed.
const DISPATCH_DEADBAND: f32 = 1e-2;

/// A decision rule mapping observations to actions.
pub trait Policy {
    /// Chooses the action for the hour described by `obs`.
    fn act(&mut self, obs: &Observation) -> Action;

    /// Short identifier used in logs and reports.
    fn name(&self) -> &'static str;
}

/// Holds every asset where it is.
#[derive(Debug, Default, Clone, Copy)]
pub struct IdlePolicy;

impl Policy for IdlePolicy {
    fn act(&mut self, _obs: &Observation) -> Action {
        Action::idle()
    }

    fn name(&self) -> &'static str {
        "idle"
    }
}

/// Repeats the same action every hour.
#[derive(Debug, Clone, Copy)]
pub struct ConstantPolicy(pub Action);

impl Policy for ConstantPolicy {
    fn act(&mut self, _obs: &Observation) -> Action {
        self.0
    }

    fn name(&self) -> &'static str {
        "constant"
    }
}

/// Uniform random actions in `[-1, 1]`, reproducible from a seed.
#[derive(Debug, Clone)]
pub struct RandomPolicy {
    rng: StdRng,
}

impl RandomPolicy {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl Policy for RandomPolicy {
    fn act(&mut self, _obs: &Observation) -> Action {
        let mut values = [0.0; ACTION_DIM];
        for v in &mut values {
            *v = self.rng.random_range(-1.0..=1.0);
        }
        Action(values)
    }

    fn name(&self) -> &'static str {
        "random"
    }
}

/// Rule-based dispatch.
///
/// The battery soaks up any PV surplus and discharges when the price is at
/// or above `discharge_price`. Whatever net load is left goes to the grid
/// first when importing is cheaper than the cheapest generator's average
/// cost at rated output, then to the generators in order of marginal cost at
/// rated output.
///
/// Each command is chosen by stepping a scratch copy of the asset from the
/// observed state, so the plan respects ramp and output limits.
#[derive(Debug, Clone)]
pub struct MeritOrderPolicy {
    battery: BatteryParams,
    generators: [GeneratorParams; NUM_GENERATORS],
    exchange_ability: f32,
    discharge_price: f32,
    merit_order: [usize; NUM_GENERATORS],
}

impl MeritOrderPolicy {
    /// Creates the heuristic for a plant with the given assets.
    ///
    /// # Arguments
    ///
    /// * `battery` - Battery parameters of the plant
    /// * `generators` - Generator parameters in plant order
    /// * `exchange_ability` - Grid import capacity per hour
    pub fn new(
        battery: BatteryParams,
        generators: [GeneratorParams; NUM_GENERATORS],
        exchange_ability: f32,
    ) -> Self {
        let mut merit_order = [0, 1, 2];
        merit_order.sort_by(|&i, &j| {
            rated_marginal_cost(&generators[i]).total_cmp(&rated_marginal_cost(&generators[j]))
        });

        Self {
            battery,
            generators,
            exchange_ability,
            discharge_price: DEFAULT_DISCHARGE_PRICE,
            merit_order,
        }
    }

    /// Overrides the battery discharge price threshold.
    pub fn with_discharge_price(mut self, price: f32) -> Self {
        self.discharge_price = price;
        self
    }

    /// Generator indices, cheapest first.
    pub fn merit_order(&self) -> [usize; NUM_GENERATORS] {
        self.merit_order
    }

    fn battery_command(&self, obs: &Observation) -> f32 {
        let max_charge = self.battery.max_charge;
        if max_charge <= 0.0 {
            return 0.0;
        }
        if obs.net_load < 0.0 {
            (-obs.net_load / max_charge).min(1.0)
        } else if obs.price >= self.discharge_price {
            -(obs.net_load / max_charge).min(1.0)
        } else {
            0.0
        }
    }

    fn cheapest_average_cost(&self) -> f32 {
        self.generators
            .iter()
            .filter(|p| p.power_output_max > 0.0)
            .map(|p| Generator::new(*p).cost(p.power_output_max) / p.power_output_max)
            .fold(f32::INFINITY, f32::min)
    }
}

fn rated_marginal_cost(params: &GeneratorParams) -> f32 {
    Generator::new(*params).marginal_cost(params.power_output_max)
}

impl Policy for MeritOrderPolicy {
    fn act(&mut self, obs: &Observation) -> Action {
        let battery_cmd = self.battery_command(obs);
        let mut battery = Battery::new(self.battery);
        battery.soc = obs.soc;
        battery.apply_action(battery_cmd);

        let mut residual = obs.net_load - battery.supply();
        if obs.price < self.cheapest_average_cost() {
            residual -= residual.clamp(0.0, self.exchange_ability);
        }

        let mut commands = [0.0; NUM_GENERATORS];
        for &i in &self.merit_order {
            let params = self.generators[i];
            let current = obs.generator_outputs[i];
            let target = residual.min(params.power_output_max);
            let cmd = if target <= DISPATCH_DEADBAND || params.ramping_up <= 0.0 {
                -1.0
            } else {
                ((target - current) / params.ramping_up).clamp(-1.0, 1.0)
            };

            let mut unit = Generator::new(params);
            unit.current_output = current;
            unit.apply_action(cmd);
            residual -= unit.supply();
            commands[i] = cmd;
        }

        Action::new(battery_cmd, commands)
    }

    fn name(&self) -> &'static str {
        "merit"
    }
}

/// Policy selector for the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PolicyKind {
    #[default]
    Idle,
    Random,
    Merit,
}

impl PolicyKind {
    /// Parses a policy name as accepted on the command line.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "idle" => Some(Self::Idle),
            "random" => Some(Self::Random),
            "merit" => Some(Self::Merit),
            _ => None,
        }
    }

    /// Instantiates the selected policy for a plant.
    pub fn build(
        self,
        seed: u64,
        battery: BatteryParams,
        generators: [GeneratorParams; NUM_GENERATORS],
        exchange_ability: f32,
    ) -> Box<dyn Policy> {
        match self {
            Self::Idle => Box::new(IdlePolicy),
            Self::Random => Box::new(RandomPolicy::new(seed)),
            Self::Merit => Box::new(MeritOrderPolicy::new(battery, generators, exchange_ability)),
        }
    }
}
