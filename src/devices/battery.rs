use rand::Rng;
use serde::Serialize;
use tracing::warn;

use crate::devices::types::DispatchableAsset;

/// Lower bound of the random initial state of charge.
pub const RANDOM_SOC_LOW: f32 = 0.2;
/// Upper bound (exclusive) of the random initial state of charge.
pub const RANDOM_SOC_HIGH: f32 = 0.8;

/// Static parameters of the battery.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BatteryParams {
    /// Energy capacity (kWh).
    pub capacity: f32,
    /// Upper state-of-charge bound (fraction).
    pub max_soc: f32,
    /// Lower state-of-charge bound (fraction).
    pub min_soc: f32,
    /// Nominal initial state of charge, exported to the optimizer contract.
    pub initial_capacity: f32,
    /// Degradation cost per squared kWh moved.
    pub degradation: f32,
    /// Energy moved per hour for a full-scale action (kWh).
    pub max_charge: f32,
    /// Discharge rating (kWh per hour); actions are scaled by `max_charge`.
    pub max_discharge: f32,
    /// Round-trip efficiency, used by the optimizer's state-of-charge model.
    pub efficiency: f32,
}

/// A battery energy storage system.
///
/// `Battery` tracks its state of charge as a fraction of capacity and the
/// energy it actually moved during the last hour.
///
/// # Sign Convention
/// - Positive `energy_change`: charging (takes energy from the bus)
/// - Negative `energy_change`: discharging (supplies energy to the bus)
#[derive(Debug, Clone, PartialEq)]
pub struct Battery {
    params: BatteryParams,

    /// State of charge as a fraction, always within `[min_soc, max_soc]`.
    pub soc: f32,

    /// Energy actually moved during the last hour (kWh), after SOC clamping.
    pub energy_change: f32,
}

impl Battery {
    /// Creates a battery at its nominal initial state of charge.
    ///
    /// # Panics
    ///
    /// Panics if capacity is not positive, the SOC bounds are not an ordered
    /// sub-range of `[0, 1]`, or the efficiency is outside `(0, 1]`.
    pub fn new(params: BatteryParams) -> Self {
        assert!(params.capacity > 0.0);
        assert!(0.0 <= params.min_soc && params.min_soc <= params.max_soc && params.max_soc <= 1.0);
        assert!(params.max_charge >= 0.0 && params.max_discharge >= 0.0);
        assert!(params.efficiency > 0.0 && params.efficiency <= 1.0);

        Self {
            soc: params
                .initial_capacity
                .clamp(params.min_soc, params.max_soc),
            energy_change: 0.0,
            params,
        }
    }

    /// Static parameters of this battery.
    pub fn params(&self) -> &BatteryParams {
        &self.params
    }

    /// Charges (positive action) or discharges (negative action) by
    /// `action * max_charge`, clamping the resulting SOC into its bounds.
    ///
    /// `energy_change` records the energy actually moved, which is smaller
    /// in magnitude than commanded whenever a bound is hit.
    pub fn step(&mut self, action: f32) {
        let capacity = self.params.capacity;
        let energy = action * self.params.max_charge;
        let updated_soc = ((self.soc * capacity + energy) / capacity)
            .min(self.params.max_soc)
            .max(self.params.min_soc);

        self.energy_change = (updated_soc - self.soc) * capacity;
        self.soc = updated_soc;
    }

    /// Degradation cost of moving `energy_change` kWh. Symmetric in direction.
    pub fn cost(&self, energy_change: f32) -> f32 {
        energy_change.powi(2) * self.params.degradation
    }

    /// Current state of charge.
    pub fn state_of_charge(&self) -> f32 {
        self.soc
    }

    /// Starts a new episode at `initial_soc`, or at a uniform draw in
    /// `[0.2, 0.8)` when none is given.
    ///
    /// An explicit value outside `[min_soc, max_soc]` is clamped into it.
    /// The random draw is taken from the overlap of `[0.2, 0.8)` with the
    /// battery limits; with no overlap the nearest limit is used.
    pub fn reset<R: Rng>(&mut self, initial_soc: Option<f32>, rng: &mut R) {
        let soc = match initial_soc {
            Some(soc) => {
                let clamped = soc.min(self.params.max_soc).max(self.params.min_soc);
                if clamped != soc {
                    warn!(
                        requested = soc,
                        applied = clamped,
                        "initial state of charge outside battery limits"
                    );
                }
                clamped
            }
            None => {
                let low = RANDOM_SOC_LOW.max(self.params.min_soc);
                let high = RANDOM_SOC_HIGH.min(self.params.max_soc);
                if low < high {
                    rng.random_range(low..high)
                } else {
                    low.clamp(self.params.min_soc, self.params.max_soc)
                }
            }
        };
        self.soc = soc;
        self.energy_change = 0.0;
    }
}

impl DispatchableAsset for Battery {
    fn apply_action(&mut self, action: f32) {
        self.step(action);
    }

    fn supply(&self) -> f32 {
        -self.energy_change
    }

    fn operating_cost(&self) -> f32 {
        self.cost(self.energy_change)
    }

    fn asset_type(&self) -> &'static str {
        "Battery"
    }
}
