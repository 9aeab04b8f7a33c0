use serde::Serialize;

use crate::devices::types::DispatchableAsset;

/// Static parameters of a dispatchable generator.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct GeneratorParams {
    /// Quadratic cost coefficient.
    pub a: f32,
    /// Linear cost coefficient.
    pub b: f32,
    /// No-load cost incurred whenever the unit runs.
    pub c: f32,
    /// Rated output (kWh per hour).
    pub power_output_max: f32,
    /// Minimum stable output while running.
    pub power_output_min: f32,
    /// Largest output change per hour for a full-scale action.
    pub ramping_up: f32,
    /// Ramp-down limit. Stored for reporting and the optimizer contract; the
    /// hourly transition scales actions by `ramping_up` in both directions.
    pub ramping_down: f32,
}

/// A diesel generator with a quadratic cost curve and ramp-scaled actions.
///
/// After every step the output is either exactly zero (unit off) or within
/// `[power_output_min, power_output_max]`.
#[derive(Debug, Clone, PartialEq)]
pub struct Generator {
    params: GeneratorParams,

    /// Output during the last simulated hour.
    pub current_output: f32,
}

impl Generator {
    /// Creates a generator that starts switched off.
    ///
    /// # Panics
    ///
    /// Panics if the output bounds are inverted or negative, or a ramp
    /// limit is negative.
    pub fn new(params: GeneratorParams) -> Self {
        assert!(params.power_output_min >= 0.0);
        assert!(params.power_output_min <= params.power_output_max);
        assert!(params.ramping_up >= 0.0 && params.ramping_down >= 0.0);

        Self {
            params,
            current_output: 0.0,
        }
    }

    /// Static parameters of this unit.
    pub fn params(&self) -> &GeneratorParams {
        &self.params
    }

    /// Moves the output by `action * ramping_up` and applies the output bounds.
    ///
    /// A non-positive target switches the unit off; a positive one is
    /// clamped into `[power_output_min, power_output_max]`.
    pub fn step(&mut self, action: f32) {
        let output_change = action * self.params.ramping_up;
        let output = self.current_output + output_change;
        self.current_output = if output > 0.0 {
            output
                .min(self.params.power_output_max)
                .max(self.params.power_output_min)
        } else {
            0.0
        };
    }

    /// Fuel cost of running at `output` for one hour: zero when off,
    /// `a·p² + b·p + c` otherwise.
    pub fn cost(&self, output: f32) -> f32 {
        if output <= 0.0 {
            0.0
        } else {
            self.params.a * output.powi(2) + self.params.b * output + self.params.c
        }
    }

    /// Marginal cost at `output`, `2a·p + b`.
    pub fn marginal_cost(&self, output: f32) -> f32 {
        2.0 * self.params.a * output + self.params.b
    }

    /// Switches the unit off.
    pub fn reset(&mut self) {
        self.current_output = 0.0;
    }
}

impl DispatchableAsset for Generator {
    fn apply_action(&mut self, action: f32) {
        self.step(action);
    }

    fn supply(&self) -> f32 {
        self.current_output
    }

    fn operating_cost(&self) -> f32 {
        self.cost(self.current_output)
    }

    fn asset_type(&self) -> &'static str {
        "Generator"
    }
}
