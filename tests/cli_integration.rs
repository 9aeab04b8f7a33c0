use std::process::Command;

fn run(args: &[&str]) -> std::process::Output {
    Command::new(env!("CARGO_BIN_EXE_microgrid-sim"))
        .args(args)
        .env_remove("MICROGRID_LOG_LEVEL")
        .output()
        .expect("microgrid-sim process should run")
}

fn run_ok(args: &[&str]) -> String {
    let output = run(args);
    assert!(
        output.status.success(),
        "run failed for {args:?}: stderr={}",
        String::from_utf8_lossy(&output.stderr)
    );
    String::from_utf8(output.stdout).expect("stdout should be valid UTF-8")
}

fn parse_metric(stdout: &str, label: &str) -> f64 {
    let line = stdout
        .lines()
        .find(|line| line.trim_start().starts_with(label))
        .unwrap_or_else(|| panic!("missing KPI line `{label}` in output: {stdout}"));

    line.split_once(':')
        .map(|(_, right)| right.trim())
        .and_then(|raw| raw.split_whitespace().next())
        .and_then(|v| v.parse().ok())
        .unwrap_or_else(|| panic!("invalid KPI format for line `{line}`"))
}

#[test]
fn scenario_files_run_and_differ() {
    let fixed = ["--month", "1", "--day", "15", "--soc", "0.5"];
    let with = |path: &str| {
        let mut args = vec!["--scenario", path];
        args.extend(fixed);
        run_ok(&args)
    };

    let reference = with("scenarios/reference.toml");
    let islanded = with("scenarios/islanded.toml");
    let tight = with("scenarios/tight_grid.toml");

    for out in [&reference, &islanded, &tight] {
        assert!(out.contains("--- Episode KPI ---"));
    }

    let grid_import = parse_metric(&islanded, "Grid import:");
    assert_eq!(grid_import, 0.0, "islanded plant cannot import");

    let reference_return = parse_metric(&reference, "Episode return:");
    let islanded_return = parse_metric(&islanded, "Episode return:");
    assert!(
        islanded_return < reference_return,
        "islanding should cost more: reference={reference_return:.3}, islanded={islanded_return:.3}"
    );
}

#[test]
fn render_prints_one_line_per_hour() {
    let stdout = run_ok(&["--preset", "reference", "--policy", "merit", "--render"]);
    let renders = stdout.lines().filter(|l| l.starts_with("day=")).count();
    assert_eq!(renders, 24);
    assert!(stdout.lines().any(|l| l.ends_with("terminal=true")));
}

#[test]
fn multiple_episodes_and_exports() {
    let dir = tempfile::tempdir().expect("tempdir");
    let csv = dir.path().join("out.csv");
    let json = dir.path().join("out.json");
    let csv_arg = csv.to_string_lossy().to_string();
    let json_arg = json.to_string_lossy().to_string();

    let stdout = run_ok(&[
        "--policy",
        "random",
        "--episodes",
        "3",
        "--seed",
        "5",
        "--telemetry-out",
        &csv_arg,
        "--json-out",
        &json_arg,
    ]);
    assert_eq!(stdout.matches("--- Episode KPI ---").count(), 3);

    let text = std::fs::read_to_string(&csv).expect("csv written");
    assert_eq!(text.lines().count(), 1 + 3 * 24);
    assert!(json.exists());
}

#[test]
fn bad_arguments_exit_with_failure() {
    for args in [
        &["--preset", "nope"][..],
        &["--scenario", "a.toml", "--preset", "reference"][..],
        &["--policy", "greedy"][..],
        &["--month", "2", "--day", "30"][..],
        &["--data-dir", "/nonexistent/microgrid-data"][..],
    ] {
        let output = run(args);
        assert!(!output.status.success(), "expected failure for {args:?}");
        assert!(
            String::from_utf8_lossy(&output.stderr).contains("error"),
            "stderr should explain the failure for {args:?}"
        );
    }
}
