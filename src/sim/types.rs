//! Core simulation types: observations, actions, and per-step reports.

use std::fmt;

use serde::Serialize;

use crate::devices::{BatteryParams, GeneratorParams};
use crate::error::EnvError;
use crate::sim::power_balance::Settlement;

/// Number of dispatchable generators in the plant.
pub const NUM_GENERATORS: usize = 3;

/// Length of the action vector: battery followed by each generator.
pub const ACTION_DIM: usize = 1 + NUM_GENERATORS;

/// Length of the flat observation vector.
pub const OBS_DIM: usize = 9;

/// Observation of the plant at the start of an hour.
///
/// Flattens to `[hour, price, soc, net_load, gen1, gen2, gen3, month, day]`.
///
/// # Examples
///
/// ```
/// use microgrid_sim::sim::types::Observation;
///
/// let obs = Observation {
///     hour: 3,
///     price: 2.5,
///     soc: 0.5,
///     net_load: 120.0,
///     generator_outputs: [0.0, 50.0, 0.0],
///     month: 6,
///     day: 15,
/// };
/// assert_eq!(obs.to_array()[0], 3.0);
/// assert_eq!(obs.to_array()[8], 15.0);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Observation {
    /// Hour of the episode (0-based).
    pub hour: usize,
    /// Price of the current hour.
    pub price: f32,
    /// Battery state of charge.
    pub soc: f32,
    /// Demand minus PV generation for the current hour.
    pub net_load: f32,
    /// Generator outputs carried over from the previous hour.
    pub generator_outputs: [f32; NUM_GENERATORS],
    /// Episode month (1-based).
    pub month: u32,
    /// Episode day (1-based).
    pub day: u32,
}

impl Observation {
    /// Flat vector form consumed by learned policies.
    pub fn to_array(&self) -> [f32; OBS_DIM] {
        let [g1, g2, g3] = self.generator_outputs;
        [
            self.hour as f32,
            self.price,
            self.soc,
            self.net_load,
            g1,
            g2,
            g3,
            self.month as f32,
            self.day as f32,
        ]
    }
}

impl fmt::Display for Observation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let values = self.to_array();
        write!(f, "[")?;
        for (i, v) in values.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{v:.4}")?;
        }
        write!(f, "]")
    }
}

/// One normalized command per controllable asset, nominally in `[-1, 1]`.
///
/// Order: battery, then generators 1 to 3. Values are not clamped; only the
/// assets' physical limits constrain the outcome.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct Action(pub [f32; ACTION_DIM]);

impl Action {
    /// Builds an action from its battery and generator components.
    pub fn new(battery: f32, generators: [f32; NUM_GENERATORS]) -> Self {
        let [g1, g2, g3] = generators;
        Self([battery, g1, g2, g3])
    }

    /// All-zero action: hold every asset where it is.
    pub fn idle() -> Self {
        Self::default()
    }

    /// Battery command.
    pub fn battery(&self) -> f32 {
        self.0[0]
    }

    /// Generator commands, in plant order.
    pub fn generators(&self) -> [f32; NUM_GENERATORS] {
        [self.0[1], self.0[2], self.0[3]]
    }
}

impl From<[f32; ACTION_DIM]> for Action {
    fn from(values: [f32; ACTION_DIM]) -> Self {
        Self(values)
    }
}

impl TryFrom<&[f32]> for Action {
    type Error = EnvError;

    fn try_from(values: &[f32]) -> Result<Self, Self::Error> {
        let array: [f32; ACTION_DIM] =
            values.try_into().map_err(|_| EnvError::ActionDimension {
                actual: values.len(),
                expected: ACTION_DIM,
            })?;
        Ok(Self(array))
    }
}

/// Cost components of one hour.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct CostBreakdown {
    /// Battery degradation cost.
    pub battery: f32,
    /// Fuel cost of each generator.
    pub generators: [f32; NUM_GENERATORS],
    /// Grid settlement (purchases, sales, penalties).
    pub settlement: Settlement,
}

impl CostBreakdown {
    /// Total operating cost; the reward is its negation.
    pub fn total(&self) -> f32 {
        let s = &self.settlement;
        let [g1, g2, g3] = self.generators;
        self.battery + g1 + g2 + g3 + s.excess_penalty + s.deficient_penalty - s.sell_benefit
            + s.buy_cost
    }

    /// Fuel cost summed over generators.
    pub fn generation(&self) -> f32 {
        self.generators.iter().sum()
    }
}

/// Result of one call to `step`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct StepOutcome {
    /// Observation at the start of the hour just simulated.
    pub current_obs: Observation,
    /// Observation for the next hour. On the terminal step this is the
    /// initial observation of the freshly reset next episode.
    pub next_obs: Observation,
    /// Negated operating cost of the hour.
    pub reward: f32,
    /// True exactly when this step completed the episode.
    pub done: bool,
}

/// Read-only diagnostics of the most recent step.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct StepReport {
    /// Supply minus net load.
    pub unbalance: f32,
    /// Portion of the imbalance the grid could not absorb.
    pub real_unbalance: f32,
    /// Operating cost of the hour.
    pub operation_cost: f32,
    /// Cost decomposition.
    pub costs: CostBreakdown,
    /// Post-transition supply per asset: generators 1 to 3, then the
    /// battery's discharge (`-energy_change`).
    pub current_outputs: [f32; ACTION_DIM],
    /// Battery energy change (positive when charging).
    pub battery_energy_change: f32,
    /// Battery state of charge after the transition.
    pub soc: f32,
}

/// Asset outputs captured just before the terminal auto-reset.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FinalOutputs {
    /// Generator outputs at the end of the episode.
    pub generators: [f32; NUM_GENERATORS],
    /// Battery state of charge at the end of the episode.
    pub soc: f32,
}

/// Everything an offline optimizer needs to solve one episode.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OptimizerInput {
    pub month: u32,
    pub day: u32,
    /// Number of hours to schedule.
    pub period: usize,
    pub pv: Vec<f32>,
    pub price: Vec<f32>,
    pub load: Vec<f32>,
    /// `load - pv`, hour by hour.
    pub net_load: Vec<f32>,
    pub battery: BatteryParams,
    pub generators: [GeneratorParams; NUM_GENERATORS],
    pub exchange_ability: f32,
    pub sell_coefficient: f32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn action_components_follow_plant_order() {
        let a = Action::new(0.1, [0.2, 0.3, 0.4]);
        assert_eq!(a.0, [0.1, 0.2, 0.3, 0.4]);
        assert_eq!(a.battery(), 0.1);
        assert_eq!(a.generators(), [0.2, 0.3, 0.4]);
    }

    #[test]
    fn action_from_slice_checks_dimension() {
        let ok = Action::try_from(&[0.0_f32, 1.0, -1.0, 0.5][..]);
        assert!(ok.is_ok());

        let err = Action::try_from(&[0.0_f32, 1.0][..]).unwrap_err();
        assert!(matches!(
            err,
            EnvError::ActionDimension {
                actual: 2,
                expected: 4
            }
        ));
    }

    #[test]
    fn cost_total_nets_sales_against_costs() {
        let costs = CostBreakdown {
            battery: 1.0,
            generators: [2.0, 3.0, 4.0],
            settlement: Settlement {
                sell_benefit: 5.0,
                excess_penalty: 50.0,
                ..Settlement::default()
            },
        };
        assert_eq!(costs.total(), 55.0);
        assert_eq!(costs.generation(), 9.0);
    }

    #[test]
    fn observation_display_lists_nine_values() {
        let obs = Observation {
            hour: 0,
            price: 1.0,
            soc: 0.5,
            net_load: -3.0,
            generator_outputs: [0.0; NUM_GENERATORS],
            month: 1,
            day: 4,
        };
        let s = format!("{obs}");
        assert_eq!(s.matches(',').count(), OBS_DIM - 1);
    }
}
