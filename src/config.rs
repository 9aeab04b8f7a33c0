//! TOML-based scenario configuration and preset definitions.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

use crate::devices::{BatteryParams, GeneratorParams};
use crate::log::parse_level;
use crate::sim::env::EnvConfig;
use crate::sim::power_balance::Tariff;
use crate::sim::types::NUM_GENERATORS;

/// Top-level scenario configuration parsed from TOML.
///
/// All fields have defaults matching the reference plant. Load from TOML
/// with [`ScenarioConfig::from_toml_file`] or use
/// [`ScenarioConfig::reference`] for the built-in default.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ScenarioConfig {
    /// Episode and settlement parameters.
    #[serde(default)]
    pub environment: EnvironmentConfig,
    /// Battery storage parameters.
    #[serde(default)]
    pub battery: BatteryConfig,
    /// Diesel generator parameters.
    #[serde(default)]
    pub generators: GeneratorsConfig,
    /// Grid tie-line parameters.
    #[serde(default)]
    pub grid: GridConfig,
    /// Exogenous data source.
    #[serde(default)]
    pub data: DataConfig,
    /// Logging.
    #[serde(default)]
    pub log: LogConfig,
}

/// Episode and settlement parameters.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EnvironmentConfig {
    /// Hours per episode (1 to 24).
    pub episode_length: usize,
    /// Seed for episode sampling and random initial charge.
    pub seed: u64,
    /// Cost per kWh of imbalance the grid cannot absorb.
    pub penalty_coefficient: f32,
    /// Fraction of the price paid for exported energy.
    pub sell_coefficient: f32,
}

impl Default for EnvironmentConfig {
    fn default() -> Self {
        let tariff = Tariff::default();
        Self {
            episode_length: 24,
            seed: 42,
            penalty_coefficient: tariff.penalty_coefficient,
            sell_coefficient: tariff.sell_coefficient,
        }
    }
}

/// Battery storage parameters.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BatteryConfig {
    /// Total energy capacity (kWh).
    pub capacity: f32,
    /// Upper state-of-charge bound.
    pub max_soc: f32,
    /// Lower state-of-charge bound.
    pub min_soc: f32,
    /// Nominal initial state of charge.
    pub initial_capacity: f32,
    /// Degradation cost per kWh² moved.
    pub degradation: f32,
    /// Energy per hour at a full charge command (kWh).
    pub max_charge: f32,
    /// Energy per hour at a full discharge command (kWh).
    pub max_discharge: f32,
    /// Round-trip efficiency (0, 1].
    pub efficiency: f32,
}

impl Default for BatteryConfig {
    fn default() -> Self {
        Self {
            capacity: 500.0,
            max_soc: 0.8,
            min_soc: 0.2,
            initial_capacity: 0.2,
            degradation: 0.0,
            max_charge: 100.0,
            max_discharge: 100.0,
            efficiency: 0.9,
        }
    }
}

impl BatteryConfig {
    pub fn params(&self) -> BatteryParams {
        BatteryParams {
            capacity: self.capacity,
            max_soc: self.max_soc,
            min_soc: self.min_soc,
            initial_capacity: self.initial_capacity,
            degradation: self.degradation,
            max_charge: self.max_charge,
            max_discharge: self.max_discharge,
            efficiency: self.efficiency,
        }
    }
}

/// One diesel generator. Every field must be given when the table is present.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GeneratorConfig {
    /// Quadratic cost coefficient.
    pub a: f32,
    /// Linear cost coefficient.
    pub b: f32,
    /// Fixed cost while running.
    pub c: f32,
    /// Rated output (kW).
    pub power_output_max: f32,
    /// Minimum stable output while running (kW).
    pub power_output_min: f32,
    /// Output change at a full upward command (kW per hour).
    pub ramping_up: f32,
    /// Output change at a full downward command (kW per hour).
    pub ramping_down: f32,
}

impl GeneratorConfig {
    pub fn params(&self) -> GeneratorParams {
        GeneratorParams {
            a: self.a,
            b: self.b,
            c: self.c,
            power_output_max: self.power_output_max,
            power_output_min: self.power_output_min,
            ramping_up: self.ramping_up,
            ramping_down: self.ramping_down,
        }
    }
}

/// The plant's three generators.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GeneratorsConfig {
    pub gen_1: GeneratorConfig,
    pub gen_2: GeneratorConfig,
    pub gen_3: GeneratorConfig,
}

impl Default for GeneratorsConfig {
    fn default() -> Self {
        Self {
            gen_1: GeneratorConfig {
                a: 0.0034,
                b: 3.0,
                c: 30.0,
                power_output_max: 150.0,
                power_output_min: 10.0,
                ramping_up: 100.0,
                ramping_down: 100.0,
            },
            gen_2: GeneratorConfig {
                a: 0.001,
                b: 10.0,
                c: 40.0,
                power_output_max: 375.0,
                power_output_min: 50.0,
                ramping_up: 100.0,
                ramping_down: 100.0,
            },
            gen_3: GeneratorConfig {
                a: 0.001,
                b: 15.0,
                c: 70.0,
                power_output_max: 500.0,
                power_output_min: 100.0,
                ramping_up: 200.0,
                ramping_down: 200.0,
            },
        }
    }
}

impl GeneratorsConfig {
    /// Units in plant order with their dotted config names.
    fn units(&self) -> [(&'static str, &GeneratorConfig); NUM_GENERATORS] {
        [
            ("generators.gen_1", &self.gen_1),
            ("generators.gen_2", &self.gen_2),
            ("generators.gen_3", &self.gen_3),
        ]
    }

    pub fn params(&self) -> [GeneratorParams; NUM_GENERATORS] {
        self.units().map(|(_, g)| g.params())
    }
}

/// Grid tie-line parameters.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GridConfig {
    /// Whether the tie line is in service.
    pub enabled: bool,
    /// Import/export capacity per hour (kWh).
    pub exchange_ability: f32,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            exchange_ability: 100.0,
        }
    }
}

/// Exogenous data source.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DataConfig {
    /// Directory holding `PV.csv`, `Prices.csv` and `H4.csv`. A synthetic
    /// year is generated when absent.
    pub dir: Option<PathBuf>,
    /// Seed of the synthetic year.
    pub synthetic_seed: u64,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            dir: None,
            synthetic_seed: 2024,
        }
    }
}

/// Logging.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LogConfig {
    /// One of `off`, `error`, `warn`, `info`, `debug`, `trace`.
    pub level: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: crate::log::DEFAULT_LOG_LEVEL.to_string(),
        }
    }
}

/// Configuration error with field path and constraint description.
#[derive(Debug, Error)]
#[error("config error: {field}: {message}")]
pub struct ConfigError {
    /// Dotted field path (e.g., `"battery.max_soc"`).
    pub field: String,
    /// Human-readable constraint description.
    pub message: String,
}

impl ConfigError {
    fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl ScenarioConfig {
    /// Returns the reference plant: three diesel units, a 500 kWh battery
    /// and a 100 kWh grid tie line.
    pub fn reference() -> Self {
        Self {
            environment: EnvironmentConfig::default(),
            battery: BatteryConfig::default(),
            generators: GeneratorsConfig::default(),
            grid: GridConfig::default(),
            data: DataConfig::default(),
            log: LogConfig::default(),
        }
    }

    /// Returns the islanded preset: the tie line is out of service.
    pub fn islanded() -> Self {
        Self {
            grid: GridConfig {
                enabled: false,
                ..GridConfig::default()
            },
            ..Self::reference()
        }
    }

    /// Returns the tight-grid preset: halved exchange capacity and a
    /// battery that wears with use.
    pub fn tight_grid() -> Self {
        Self {
            battery: BatteryConfig {
                degradation: 0.01,
                ..BatteryConfig::default()
            },
            grid: GridConfig {
                exchange_ability: 50.0,
                ..GridConfig::default()
            },
            ..Self::reference()
        }
    }

    /// Available preset names.
    pub const PRESETS: &[&str] = &["reference", "islanded", "tight_grid"];

    /// Loads a scenario from a named preset.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the preset name is unknown.
    pub fn from_preset(name: &str) -> Result<Self, ConfigError> {
        match name {
            "reference" => Ok(Self::reference()),
            "islanded" => Ok(Self::islanded()),
            "tight_grid" => Ok(Self::tight_grid()),
            _ => Err(ConfigError::new(
                "preset",
                format!(
                    "unknown preset \"{name}\", available: {}",
                    Self::PRESETS.join(", ")
                ),
            )),
        }
    }

    /// Parses a scenario from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the file cannot be read or the TOML is invalid.
    pub fn from_toml_file(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|e| {
            let message = format!("cannot read \"{}\": {e}", path.display());
            ConfigError::new("scenario", message)
        })?;
        Self::from_toml_str(&content)
    }

    /// Parses a scenario from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the TOML is invalid or contains unknown fields.
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        toml::from_str(s).map_err(|e| ConfigError::new("toml", e.to_string()))
    }

    /// Validates all fields and returns a list of errors.
    ///
    /// Returns an empty vector if configuration is valid.
    pub fn validate(&self) -> Vec<ConfigError> {
        let mut errors = Vec::new();
        let mut check = |ok: bool, field: &str, message: &str| {
            if !ok {
                errors.push(ConfigError::new(field, message));
            }
        };

        let env = &self.environment;
        check(
            (1..=24).contains(&env.episode_length),
            "environment.episode_length",
            "must be in 1..=24",
        );
        check(
            env.penalty_coefficient >= 0.0,
            "environment.penalty_coefficient",
            "must be >= 0",
        );
        check(
            env.sell_coefficient >= 0.0,
            "environment.sell_coefficient",
            "must be >= 0",
        );

        let bat = &self.battery;
        check(bat.capacity > 0.0, "battery.capacity", "must be > 0");
        check(
            (0.0..=1.0).contains(&bat.min_soc),
            "battery.min_soc",
            "must be in [0.0, 1.0]",
        );
        check(
            (0.0..=1.0).contains(&bat.max_soc),
            "battery.max_soc",
            "must be in [0.0, 1.0]",
        );
        check(
            bat.min_soc <= bat.max_soc,
            "battery.min_soc",
            "must be <= battery.max_soc",
        );
        check(bat.max_charge >= 0.0, "battery.max_charge", "must be >= 0");
        check(
            bat.max_discharge >= 0.0,
            "battery.max_discharge",
            "must be >= 0",
        );
        check(
            bat.degradation >= 0.0,
            "battery.degradation",
            "must be >= 0",
        );
        check(
            bat.efficiency > 0.0 && bat.efficiency <= 1.0,
            "battery.efficiency",
            "must be in (0.0, 1.0]",
        );

        for (name, g) in self.generators.units() {
            for (coefficient, value) in [("a", g.a), ("b", g.b), ("c", g.c)] {
                check(
                    value >= 0.0,
                    &format!("{name}.{coefficient}"),
                    "must be >= 0",
                );
            }
            check(
                g.power_output_min >= 0.0,
                &format!("{name}.power_output_min"),
                "must be >= 0",
            );
            check(
                g.power_output_min <= g.power_output_max,
                &format!("{name}.power_output_min"),
                &format!("must be <= {name}.power_output_max"),
            );
            check(
                g.ramping_up >= 0.0,
                &format!("{name}.ramping_up"),
                "must be >= 0",
            );
            check(
                g.ramping_down >= 0.0,
                &format!("{name}.ramping_down"),
                "must be >= 0",
            );
        }

        check(
            self.grid.exchange_ability >= 0.0,
            "grid.exchange_ability",
            "must be >= 0",
        );
        check(
            parse_level(&self.log.level).is_some(),
            "log.level",
            "must be one of off, error, warn, info, debug, trace",
        );
        errors
    }

    /// Settlement coefficients.
    pub fn tariff(&self) -> Tariff {
        Tariff {
            penalty_coefficient: self.environment.penalty_coefficient,
            sell_coefficient: self.environment.sell_coefficient,
        }
    }

    /// Builds the environment configuration.
    pub fn env_config(&self) -> EnvConfig {
        EnvConfig {
            episode_length: self.environment.episode_length,
            seed: self.environment.seed,
            tariff: self.tariff(),
            battery: self.battery.params(),
            generators: self.generators.params(),
            grid_enabled: self.grid.enabled,
            exchange_ability: self.grid.exchange_ability,
        }
    }
}
