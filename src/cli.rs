use std::env;
use std::path::PathBuf;
use std::str::FromStr;

use crate::sim::policy::PolicyKind;

/// Default preset when neither `--scenario` nor `--preset` is given.
pub const DEFAULT_PRESET: &str = "reference";

#[derive(Debug, Clone, PartialEq)]
pub struct CliOptions {
    pub scenario: Option<PathBuf>,
    pub preset: Option<String>,
    pub data_dir: Option<PathBuf>,
    pub policy: PolicyKind,
    pub episodes: usize,
    pub seed: Option<u64>,
    pub month: Option<u32>,
    pub day: Option<u32>,
    pub soc: Option<f32>,
    pub render: bool,
    pub telemetry_out: Option<PathBuf>,
    pub json_out: Option<PathBuf>,
    pub help: bool,
}

pub fn parse_args() -> Result<CliOptions, String> {
    let args: Vec<String> = env::args().skip(1).collect();
    parse_args_from(args)
}

pub fn parse_args_from(args: Vec<String>) -> Result<CliOptions, String> {
    parse_options(&args)
}

fn parse_options(args: &[String]) -> Result<CliOptions, String> {
    let mut i = 0usize;
    let mut scenario = None;
    let mut preset = None;
    let mut data_dir = None;
    let mut policy = None;
    let mut episodes = None;
    let mut seed = None;
    let mut month = None;
    let mut day = None;
    let mut soc = None;
    let mut render = false;
    let mut telemetry_out = None;
    let mut json_out = None;

    while i < args.len() {
        let flag = args[i].as_str();
        match flag {
            "--scenario" => {
                i += 1;
                let path = args.next_or_err(
                    i,
                    "missing value for --scenario (expected a TOML file path)",
                )?;
                set_once(&mut scenario, PathBuf::from(path), flag)?;
            }
            "--preset" => {
                i += 1;
                let name =
                    args.next_or_err(i, "missing value for --preset (expected a preset name)")?;
                set_once(&mut preset, name.to_string(), flag)?;
            }
            "--data-dir" => {
                i += 1;
                let path =
                    args.next_or_err(i, "missing value for --data-dir (expected a directory)")?;
                set_once(&mut data_dir, PathBuf::from(path), flag)?;
            }
            "--policy" => {
                i += 1;
                let name = args.next_or_err(
                    i,
                    "missing value for --policy (expected idle, random or merit)",
                )?;
                let kind = PolicyKind::from_name(name).ok_or_else(|| {
                    format!("unknown policy \"{name}\" (expected idle, random or merit)")
                })?;
                set_once(&mut policy, kind, flag)?;
            }
            "--episodes" => {
                i += 1;
                let n: usize = parse_value(args, i, flag, "a positive integer")?;
                if n == 0 {
                    return Err("--episodes must be > 0".to_string());
                }
                set_once(&mut episodes, n, flag)?;
            }
            "--seed" => {
                i += 1;
                let value = parse_value(args, i, flag, "an unsigned integer")?;
                set_once(&mut seed, value, flag)?;
            }
            "--month" => {
                i += 1;
                let value = parse_value(args, i, flag, "a month number")?;
                set_once(&mut month, value, flag)?;
            }
            "--day" => {
                i += 1;
                let value = parse_value(args, i, flag, "a day of month")?;
                set_once(&mut day, value, flag)?;
            }
            "--soc" => {
                i += 1;
                let value = parse_value(args, i, flag, "a state of charge")?;
                set_once(&mut soc, value, flag)?;
            }
            "--render" => render = true,
            "--telemetry-out" => {
                i += 1;
                let path = args.next_or_err(
                    i,
                    "missing value for --telemetry-out (expected a file path)",
                )?;
                set_once(&mut telemetry_out, PathBuf::from(path), flag)?;
            }
            "--json-out" => {
                i += 1;
                let path =
                    args.next_or_err(i, "missing value for --json-out (expected a file path)")?;
                set_once(&mut json_out, PathBuf::from(path), flag)?;
            }
            "--help" | "-h" => {
                return Ok(CliOptions {
                    help: true,
                    ..CliOptions::default_run()
                });
            }
            other => return Err(format!("unknown argument: {other}")),
        }
        i += 1;
    }

    if scenario.is_some() && preset.is_some() {
        return Err(
            "arguments `--scenario` and `--preset` are mutually exclusive; choose one source"
                .to_string(),
        );
    }

    if day.is_some() && month.is_none() {
        return Err("`--day` requires `--month`".to_string());
    }

    if scenario.is_none() && preset.is_none() {
        preset = Some(DEFAULT_PRESET.to_string());
    }

    Ok(CliOptions {
        scenario,
        preset,
        data_dir,
        policy: policy.unwrap_or_default(),
        episodes: episodes.unwrap_or(1),
        seed,
        month,
        day,
        soc,
        render,
        telemetry_out,
        json_out,
        help: false,
    })
}

impl CliOptions {
    fn default_run() -> Self {
        Self {
            scenario: None,
            preset: Some(DEFAULT_PRESET.to_string()),
            data_dir: None,
            policy: PolicyKind::default(),
            episodes: 1,
            seed: None,
            month: None,
            day: None,
            soc: None,
            render: false,
            telemetry_out: None,
            json_out: None,
            help: false,
        }
    }
}

fn set_once<T>(slot: &mut Option<T>, value: T, flag: &str) -> Result<(), String> {
    if slot.replace(value).is_some() {
        return Err(format!("{flag} provided more than once"));
    }
    Ok(())
}

fn parse_value<T: FromStr>(
    args: &[String],
    index: usize,
    flag: &str,
    expected: &str,
) -> Result<T, String> {
    let raw = args.next_or_err(
        index,
        &format!("missing value for {flag} (expected {expected})"),
    )?;
    raw.parse()
        .map_err(|_| format!("invalid value \"{raw}\" for {flag} (expected {expected})"))
}

trait SliceArgExt {
    fn next_or_err(&self, index: usize, err: &str) -> Result<&str, String>;
}

impl SliceArgExt for [String] {
    fn next_or_err(&self, index: usize, err: &str) -> Result<&str, String> {
        self.get(index)
            .map(String::as_str)
            .ok_or_else(|| err.to_string())
    }
}

pub fn print_usage() {
    eprintln!("Usage:");
    eprintln!(
        "  cargo run --release -- [--scenario <path> | --preset <name>] [--data-dir <dir>]"
    );
    eprintln!("      [--policy idle|random|merit] [--episodes <n>] [--seed <u64>]");
    eprintln!("      [--month <1-12> [--day <d>]] [--soc <0-1>] [--render]");
    eprintln!("      [--telemetry-out <csv>] [--json-out <json>]");
    eprintln!();
    eprintln!("Presets: reference, islanded, tight_grid");
    eprintln!("Log level: set MICROGRID_LOG_LEVEL (off, error, warn, info, debug, trace)");
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn defaults_to_reference_preset() {
        let opts = parse_args_from(Vec::new()).expect("parse should succeed");
        assert_eq!(opts.preset.as_deref(), Some("reference"));
        assert_eq!(opts.policy, PolicyKind::Idle);
        assert_eq!(opts.episodes, 1);
        assert!(!opts.render);
    }

    #[test]
    fn supports_scenario_cli() {
        let parsed = parse_args_from(args(&["--scenario", "plant.toml"]));
        let opts = parsed.expect("parse should succeed");
        assert_eq!(opts.scenario, Some(PathBuf::from("plant.toml")));
        assert!(opts.preset.is_none());
    }

    #[test]
    fn parses_full_run() {
        let opts = parse_args_from(args(&[
            "--preset",
            "islanded",
            "--policy",
            "merit",
            "--episodes",
            "3",
            "--seed",
            "9",
            "--month",
            "6",
            "--day",
            "15",
            "--soc",
            "0.5",
            "--render",
            "--telemetry-out",
            "out.csv",
            "--json-out",
            "out.json",
        ]))
        .expect("parse should succeed");
        assert_eq!(opts.preset.as_deref(), Some("islanded"));
        assert_eq!(opts.policy, PolicyKind::Merit);
        assert_eq!(opts.episodes, 3);
        assert_eq!(opts.seed, Some(9));
        assert_eq!((opts.month, opts.day), (Some(6), Some(15)));
        assert_eq!(opts.soc, Some(0.5));
        assert!(opts.render);
        assert_eq!(opts.json_out, Some(PathBuf::from("out.json")));
    }

    #[test]
    fn rejects_scenario_with_preset() {
        let err = parse_args_from(args(&["--scenario", "a.toml", "--preset", "reference"]));
        assert!(err.is_err_and(|e| e.contains("mutually exclusive")));
    }

    #[test]
    fn rejects_bad_values() {
        assert!(parse_args_from(args(&["--policy", "greedy"])).is_err());
        assert!(parse_args_from(args(&["--episodes", "0"])).is_err());
        assert!(parse_args_from(args(&["--seed", "-1"])).is_err());
        assert!(parse_args_from(args(&["--soc"])).is_err());
        assert!(parse_args_from(args(&["--bogus"])).is_err());
    }

    #[test]
    fn rejects_duplicates_and_orphan_day() {
        assert!(parse_args_from(args(&["--seed", "1", "--seed", "2"])).is_err());
        assert!(parse_args_from(args(&["--day", "5"])).is_err());
    }

    #[test]
    fn help_flag_short_circuits() {
        let opts = parse_args_from(args(&["--episodes", "2", "-h"])).expect("help");
        assert!(opts.help);
    }
}
