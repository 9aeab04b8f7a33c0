//! Post-hoc KPI computation from evaluated episodes.

use std::fmt;

use serde::Serialize;

use super::rollout::EpisodeRecord;

/// Aggregate key performance indicators of one evaluated episode.
///
/// Computed post-hoc from the step records to ensure consistency between
/// step data and reported metrics.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EpisodeKpi {
    /// Sum of hourly rewards.
    pub total_reward: f32,
    /// Sum of hourly operating costs.
    pub operation_cost: f32,
    /// Generator fuel cost.
    pub generation_cost: f32,
    /// Battery degradation cost.
    pub degradation_cost: f32,
    /// Energy bought from the grid (kWh).
    pub grid_import_kwh: f32,
    /// Energy sold to the grid (kWh).
    pub grid_export_kwh: f32,
    /// Deficit the grid could not cover (kWh).
    pub unserved_kwh: f32,
    /// Surplus the grid could not take (kWh).
    pub curtailed_kwh: f32,
    /// Hours with a non-zero unresolved imbalance.
    pub unresolved_hours: usize,
    /// Total battery energy throughput (kWh, sum of |energy change|).
    pub battery_throughput_kwh: f32,
    /// Highest combined generator output in any hour (kW).
    pub peak_generation_kw: f32,
}

impl EpisodeKpi {
    /// Computes all KPIs from an episode record.
    ///
    /// # Arguments
    ///
    /// * `record` - Complete evaluated episode
    ///
    /// # Returns
    ///
    /// An `EpisodeKpi` with all fields populated; zeros for an empty episode.
    pub fn from_records(record: &EpisodeRecord) -> Self {
        let mut kpi = Self {
            total_reward: 0.0,
            operation_cost: 0.0,
            generation_cost: 0.0,
            degradation_cost: 0.0,
            grid_import_kwh: 0.0,
            grid_export_kwh: 0.0,
            unserved_kwh: 0.0,
            curtailed_kwh: 0.0,
            unresolved_hours: 0,
            battery_throughput_kwh: 0.0,
            peak_generation_kw: 0.0,
        };

        for s in &record.steps {
            kpi.total_reward += s.reward;
            kpi.operation_cost += s.operation_cost;
            kpi.generation_cost += s.generation_cost;
            kpi.degradation_cost += s.battery_cost;
            kpi.grid_import_kwh += s.grid_import;
            kpi.grid_export_kwh += s.grid_export;
            kpi.unserved_kwh += s.shedding;
            kpi.curtailed_kwh += s.excess;
            kpi.battery_throughput_kwh += s.battery_energy_change.abs();

            if s.real_unbalance > 0.0 {
                kpi.unresolved_hours += 1;
            }

            let generation: f32 = s.generator_outputs.iter().sum();
            kpi.peak_generation_kw = kpi.peak_generation_kw.max(generation);
        }
        kpi
    }
}

impl fmt::Display for EpisodeKpi {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "--- Episode KPI ---")?;
        writeln!(f, "Episode return:        {:.4}", self.total_reward)?;
        writeln!(f, "Operation cost:        {:.4}", self.operation_cost)?;
        writeln!(f, "Generation cost:       {:.4}", self.generation_cost)?;
        writeln!(f, "Degradation cost:      {:.4}", self.degradation_cost)?;
        writeln!(f, "Grid import:           {:.2} kWh", self.grid_import_kwh)?;
        writeln!(f, "Grid export:           {:.2} kWh", self.grid_export_kwh)?;
        writeln!(f, "Unserved energy:       {:.2} kWh", self.unserved_kwh)?;
        writeln!(f, "Curtailed energy:      {:.2} kWh", self.curtailed_kwh)?;
        writeln!(f, "Battery throughput:    {:.2} kWh", self.battery_throughput_kwh)?;
        writeln!(f, "Peak generation:       {:.2} kW", self.peak_generation_kw)?;
        write!(f, "Unresolved hours:      {}", self.unresolved_hours)
    }
}
