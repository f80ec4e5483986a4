//! Runs the binary end to end.

use std::process::Command;

use serde_json::Value;

fn run(args: &[&str]) -> std::process::Output {
    Command::new(env!("CARGO_BIN_EXE_dispatch-engine"))
        .args(args)
        .env("RUST_LOG", "warn")
        .output()
        .expect("dispatch-engine process should run")
}

fn run_json(args: &[&str]) -> Value {
    let output = run(args);
    assert!(
        output.status.success(),
        "run failed for {args:?}: stderr={}",
        String::from_utf8_lossy(&output.stderr)
    );
    serde_json::from_slice(&output.stdout).expect("stdout should be JSON")
}

#[test]
fn price_spike_scenario_costs_0_37() {
    let json = run_json(&["--scenario", "price_spike", "--strategy", "deterministic", "--json"]);
    let objective = json["objectiveValue"].as_f64().unwrap_or(f64::NAN);
    assert!((objective - 0.37).abs() < 1e-9, "objective {objective}");
    assert_eq!(json["constraintsSatisfied"], true);
}

#[test]
fn presets_run_every_strategy() {
    for preset in ["default", "conservative", "exploratory"] {
        for strategy in ["deterministic", "annealing", "sampling"] {
            let json = run_json(&[
                "--scenario",
                "tou_day",
                "--preset",
                preset,
                "--strategy",
                strategy,
                "--seed",
                "7",
                "--json",
            ]);
            assert_eq!(json["schedule"].as_array().map(Vec::len), Some(24), "{preset}/{strategy}");
            assert_eq!(json["strategyMetadata"]["name"], strategy);
        }
    }
}

#[test]
fn text_output_ends_with_summary() {
    let output = run(&["--scenario", "tou_day"]);
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("--- Dispatch Summary ---"));
    assert_eq!(stdout.lines().filter(|l| l.starts_with("t=")).count(), 24);
}

#[test]
fn unknown_strategy_fails() {
    let output = run(&["--scenario", "price_spike", "--strategy", "qaoa"]);
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("unknown strategy"));
}

#[test]
fn schedule_csv_is_written() {
    let path = std::env::temp_dir().join(format!("dispatch_cli_{}.csv", std::process::id()));
    let path_str = path.to_string_lossy().to_string();
    let output = run(&["--scenario", "price_spike", "--schedule-out", &path_str]);
    assert!(output.status.success());
    let content = std::fs::read_to_string(&path).unwrap_or_default();
    assert_eq!(content.lines().count(), 3);
    assert!(content.starts_with("t,charge_power"));
    std::fs::remove_file(&path).ok();
}
