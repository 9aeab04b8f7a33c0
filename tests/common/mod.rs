//! Shared test fixtures for integration tests.
#![allow(dead_code)]

use std::sync::Arc;

use microgrid_sim::data::{HOURS_PER_YEAR, SyntheticProfile, TimeSeriesStore};
use microgrid_sim::devices::{BatteryParams, GeneratorParams};
use microgrid_sim::sim::env::{EnvConfig, MicrogridEnv};
use microgrid_sim::sim::power_balance::Tariff;

/// Battery of the end-to-end scenario (500 kWh, SOC 0.2..0.8, 100 kWh/h,
/// degradation 0.01).
pub fn scenario_battery() -> BatteryParams {
    BatteryParams {
        capacity: 500.0,
        max_soc: 0.8,
        min_soc: 0.2,
        initial_capacity: 0.5,
        degradation: 0.01,
        max_charge: 100.0,
        max_discharge: 100.0,
        efficiency: 0.9,
    }
}

/// Generator of the end-to-end scenario (20..100 kW, 50 kW/h ramp).
pub fn scenario_generator() -> GeneratorParams {
    GeneratorParams {
        a: 0.01,
        b: 0.5,
        c: 10.0,
        power_output_max: 100.0,
        power_output_min: 20.0,
        ramping_up: 50.0,
        ramping_down: 50.0,
    }
}

/// Environment configuration with three identical scenario generators and a
/// 100 kWh/h grid tie line.
pub fn scenario_config(seed: u64) -> EnvConfig {
    EnvConfig {
        episode_length: 24,
        seed,
        tariff: Tariff::default(),
        battery: scenario_battery(),
        generators: [scenario_generator(); 3],
        grid_enabled: true,
        exchange_ability: 100.0,
    }
}

/// Store with the same value every hour of the year.
pub fn flat_store(solar: f32, price: f32, demand: f32) -> Arc<TimeSeriesStore> {
    let store = TimeSeriesStore::new(
        vec![solar; HOURS_PER_YEAR],
        vec![price; HOURS_PER_YEAR],
        vec![demand; HOURS_PER_YEAR],
    )
    .expect("flat year should be valid");
    Arc::new(store)
}

/// Deterministic synthetic year.
pub fn synthetic_store() -> Arc<TimeSeriesStore> {
    let store = SyntheticProfile::default()
        .generate(7)
        .expect("synthetic year should be valid");
    Arc::new(store)
}

/// Scenario environment over the synthetic year.
pub fn scenario_env(seed: u64) -> MicrogridEnv {
    MicrogridEnv::new(&scenario_config(seed), synthetic_store())
}
