//! Hourly power balance and grid settlement.

use serde::Serialize;
use tracing::debug;

use crate::devices::GridConnection;

/// Economic coefficients applied when settling an imbalance.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tariff {
    /// Cost per kWh of imbalance the grid cannot absorb.
    pub penalty_coefficient: f32,
    /// Fraction of the price paid for exported energy.
    pub sell_coefficient: f32,
}

impl Default for Tariff {
    fn default() -> Self {
        Self {
            penalty_coefficient: 50.0,
            sell_coefficient: 0.5,
        }
    }
}

/// Outcome of settling one hour's imbalance against the grid.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct Settlement {
    /// Energy exported to the grid.
    pub grid_export: f32,
    /// Energy imported from the grid.
    pub grid_import: f32,
    /// Revenue from the export, at the discounted sell price.
    pub sell_benefit: f32,
    /// Cost of the import, at full price.
    pub buy_cost: f32,
    /// Surplus beyond the export capacity (curtailed).
    pub excess: f32,
    /// Deficit beyond the import capacity (unserved load).
    pub shedding: f32,
    /// Penalty on `excess`.
    pub excess_penalty: f32,
    /// Penalty on `shedding`.
    pub deficient_penalty: f32,
}

impl Settlement {
    /// Imbalance the grid could not absorb: `shedding + excess`.
    pub fn real_unbalance(&self) -> f32 {
        self.shedding + self.excess
    }
}

/// Supply minus net load. Positive is surplus, negative is deficit.
pub fn unbalance(actual_production: f32, netload: f32) -> f32 {
    actual_production - netload
}

/// Settles `unbalance` against the grid at `price`.
///
/// A surplus is sold up to the exchange capacity at
/// `price * sell_coefficient`; a deficit is bought up to the capacity at
/// `price`. Whatever exceeds the capacity is penalized at
/// `penalty_coefficient` per kWh.
pub fn settle(unbalance: f32, price: f32, grid: &GridConnection, tariff: &Tariff) -> Settlement {
    let mut s = Settlement::default();

    if unbalance >= 0.0 {
        let (exported, excess) = grid.cap(unbalance);
        s.grid_export = exported;
        s.sell_benefit = grid.cost(price, exported) * tariff.sell_coefficient;
        s.excess = excess;
        s.excess_penalty = excess * tariff.penalty_coefficient;
    } else {
        let (imported, shedding) = grid.cap(unbalance.abs());
        s.grid_import = imported;
        s.buy_cost = grid.cost(price, imported);
        s.shedding = shedding;
        s.deficient_penalty = shedding * tariff.penalty_coefficient;
    }

    if s.real_unbalance() > 0.0 {
        debug!(
            unbalance,
            excess = s.excess,
            shedding = s.shedding,
            "grid cannot absorb imbalance"
        );
    }
    s
}
