//! Microgrid dispatch simulator entry point: CLI wiring, data loading and
//! policy evaluation.

use std::fmt::Display;
use std::process;
use std::sync::Arc;

use tracing::info;

use microgrid_sim::cli::{CliOptions, parse_args, print_usage};
use microgrid_sim::config::ScenarioConfig;
use microgrid_sim::data::loader::load_year;
use microgrid_sim::data::{SyntheticProfile, TimeSeriesStore};
use microgrid_sim::error::DataError;
use microgrid_sim::io::export::{export_csv, export_json};
use microgrid_sim::log;
use microgrid_sim::sim::env::{MicrogridEnv, ResetOptions};
use microgrid_sim::sim::kpi::EpisodeKpi;
use microgrid_sim::sim::rollout::{EpisodeRecord, evaluate_episode_with};

/// Seed offset for the random policy to avoid correlation with episode sampling.
const POLICY_SEED_OFFSET: u64 = 101;

fn fail(e: impl Display) -> ! {
    eprintln!("error: {e}");
    process::exit(1);
}

/// Loads config: --scenario takes priority, then --preset.
fn load_scenario(cli: &CliOptions) -> ScenarioConfig {
    let loaded = if let Some(ref path) = cli.scenario {
        ScenarioConfig::from_toml_file(path)
    } else {
        let name = cli.preset.as_deref().unwrap_or("reference");
        ScenarioConfig::from_preset(name)
    };
    let mut scenario = loaded.unwrap_or_else(|e| fail(e));

    if let Some(seed) = cli.seed {
        scenario.environment.seed = seed;
    }
    if let Some(ref dir) = cli.data_dir {
        scenario.data.dir = Some(dir.clone());
    }
    scenario
}

fn load_store(scenario: &ScenarioConfig) -> Result<TimeSeriesStore, DataError> {
    match scenario.data.dir {
        Some(ref dir) => load_year(dir),
        None => {
            let seed = scenario.data.synthetic_seed;
            info!(seed, "no data directory configured, generating synthetic year");
            SyntheticProfile::default().generate(seed)
        }
    }
}

fn main() {
    let cli = parse_args().unwrap_or_else(|e| {
        eprintln!("error: {e}");
        print_usage();
        process::exit(1);
    });
    if cli.help {
        print_usage();
        return;
    }

    let scenario = load_scenario(&cli);

    // Validate
    let errors = scenario.validate();
    if !errors.is_empty() {
        for e in &errors {
            eprintln!("{e}");
        }
        process::exit(1);
    }

    if let Err(e) = log::init(Some(&scenario.log.level)) {
        fail(e);
    }

    let store = load_store(&scenario).unwrap_or_else(|e| fail(e));
    let env_config = scenario.env_config();
    let mut env = MicrogridEnv::new(&env_config, Arc::new(store));
    let mut policy = cli.policy.build(
        env_config.seed.wrapping_add(POLICY_SEED_OFFSET),
        env_config.battery,
        env_config.generators,
        env.grid().exchange_ability(),
    );
    let options = ResetOptions {
        month: cli.month,
        day: cli.day,
        initial_soc: cli.soc,
    };

    let mut episodes: Vec<EpisodeRecord> = Vec::with_capacity(cli.episodes);
    for episode in 0..cli.episodes {
        let record = evaluate_episode_with(&mut env, policy.as_mut(), options, |env, outcome| {
            if cli.render {
                println!("{}", env.render(outcome));
            }
        })
        .unwrap_or_else(|e| fail(e));

        let kpi = EpisodeKpi::from_records(&record);
        println!(
            "\nEpisode {} ({} policy, month {}, day {}, initial soc {:.3})",
            episode + 1,
            policy.name(),
            record.month,
            record.day,
            record.initial_soc
        );
        println!("{kpi}");
        episodes.push(record);
    }

    // Export CSV if requested
    if let Some(ref path) = cli.telemetry_out {
        if let Err(e) = export_csv(&episodes, path) {
            fail(format!("failed to write CSV: {e}"));
        }
        eprintln!("Telemetry written to {}", path.display());
    }

    if let Some(ref path) = cli.json_out {
        if let Err(e) = export_json(&episodes, path) {
            fail(format!("failed to write JSON: {e}"));
        }
        eprintln!("Episodes written to {}", path.display());
    }
}
