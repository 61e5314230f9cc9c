//! Integration tests for the rollquest binary.
//!
//! These run the actual binary and check that JSON output parses, that file
//! exports are written and that bad arguments fail with a useful message.

use std::process::Command;

/// Runs the binary with a config path that does not exist, so built-in
/// defaults apply regardless of the working directory.
fn run(args: &[&str]) -> (bool, String, String) {
    let output = Command::new(env!("CARGO_BIN_EXE_rollquest"))
        .args(["--config", "no-such-dir/Config.toml"])
        .args(args)
        .env("RUST_LOG", "warn")
        .output()
        .expect("Failed to run rollquest binary");

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();

    (output.status.success(), stdout, stderr)
}

fn json(stdout: &str) -> serde_json::Value {
    serde_json::from_str(stdout).expect("Output should be valid JSON")
}

#[test]
fn die_json_reports_normalized_weights() {
    let (success, stdout, stderr) = run(&["die", "--weights", "1,1,1,1,1,5", "--format", "json"]);
    assert!(success, "stderr: {stderr}");

    let parsed = json(&stdout);
    assert_eq!(parsed["mode"], "tweaked");
    let p6 = parsed["probabilities"]["6"].as_f64().unwrap();
    assert!((p6 - 0.5).abs() < 1e-12);
}

#[test]
fn die_adjustment_rescales_other_faces() {
    let (success, stdout, stderr) = run(&[
        "die",
        "--adjust-face",
        "1",
        "--adjust-value",
        "0.5",
        "--format",
        "json",
    ]);
    assert!(success, "stderr: {stderr}");

    let parsed = json(&stdout);
    assert!((parsed["probabilities"]["1"].as_f64().unwrap() - 0.5).abs() < 1e-12);
    assert!((parsed["probabilities"]["2"].as_f64().unwrap() - 0.1).abs() < 1e-12);
}

#[test]
fn simulate_json_is_reproducible_with_seed() {
    let args = [
        "simulate", "-n", "500", "--seed", "42", "--strategy", "martingale", "--format", "json",
    ];
    let (success, first, stderr) = run(&args);
    assert!(success, "stderr: {stderr}");
    let (_, second, _) = run(&args);

    let a = json(&first);
    let b = json(&second);
    assert_eq!(a["summary"], b["summary"]);
    assert_eq!(a["parameters"]["bet_strategy"], "martingale");
    assert!(a["summary"]["total_rounds"].as_u64().unwrap() <= 500);
}

#[test]
fn simulate_exports_history_csv() {
    let dir = tempfile::tempdir().unwrap();
    let csv_path = dir.path().join("history.csv");
    let json_path = dir.path().join("result.json");

    let (success, stdout, stderr) = run(&[
        "simulate",
        "-n",
        "120",
        "--balance",
        "100000",
        "--face",
        "4",
        "--seed",
        "7",
        "--history-csv",
        csv_path.to_str().unwrap(),
        "--output",
        json_path.to_str().unwrap(),
    ]);
    assert!(success, "stderr: {stderr}");
    assert!(stdout.contains("STREAKS"));

    let csv = std::fs::read_to_string(&csv_path).unwrap();
    let mut lines = csv.lines();
    assert_eq!(
        lines.next(),
        Some("round,bet_face,bet_amount,result,won,balance")
    );
    assert_eq!(lines.count(), 120);

    let saved: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&json_path).unwrap()).unwrap();
    assert_eq!(saved["summary"]["total_rounds"], 120);
}

#[test]
fn simulate_rejects_too_few_trials() {
    let (success, _, stderr) = run(&["simulate", "-n", "10"]);
    assert!(!success);
    assert!(stderr.contains("minimum 100 trials"), "stderr: {stderr}");
}

#[test]
fn simulate_rejects_unknown_strategy() {
    let (success, _, stderr) = run(&["simulate", "--strategy", "dalembert"]);
    assert!(!success);
    assert!(stderr.contains("unknown strategy"), "stderr: {stderr}");
}

#[test]
fn convergence_json_has_requested_checkpoints() {
    let (success, stdout, stderr) = run(&[
        "convergence",
        "-n",
        "2000",
        "--checkpoints",
        "20",
        "--face",
        "3",
        "--seed",
        "1",
        "--format",
        "json",
    ]);
    assert!(success, "stderr: {stderr}");

    let parsed = json(&stdout);
    assert_eq!(parsed["target_face"], 3);
    assert_eq!(parsed["trials"].as_array().unwrap().len(), 20);
}

#[test]
fn batch_json_retains_per_run_scalars() {
    let (success, stdout, stderr) = run(&[
        "batch",
        "--simulations",
        "25",
        "-n",
        "100",
        "--seed",
        "3",
        "--format",
        "json",
    ]);
    assert!(success, "stderr: {stderr}");

    let parsed = json(&stdout);
    assert_eq!(parsed["num_simulations"], 25);
    assert_eq!(parsed["distribution"]["profits"].as_array().unwrap().len(), 25);
    assert_eq!(
        parsed["distribution"]["histogram"]["counts"]
            .as_array()
            .unwrap()
            .len(),
        20
    );
}

#[test]
fn chi_square_flags_biased_counts() {
    let (success, stdout, stderr) = run(&["chi-square", "--observed", "6000,0,0,0,0,0"]);
    assert!(success, "stderr: {stderr}");
    assert!(stdout.contains("BIASED"));
}

#[test]
fn chi_square_requires_six_counts() {
    let (success, _, stderr) = run(&["chi-square", "--observed", "1,2,3"]);
    assert!(!success);
    assert!(stderr.contains("6 counts"), "stderr: {stderr}");
}

#[test]
fn z_test_json_reports_significance() {
    let (success, stdout, stderr) = run(&[
        "z-test", "--wins", "1000", "--trials", "6000", "--format", "json",
    ]);
    assert!(success, "stderr: {stderr}");

    let parsed = json(&stdout);
    assert_eq!(parsed["is_significant"], false);
    assert!(parsed["z_score"].as_f64().unwrap().abs() < 1e-9);
}

#[test]
fn compare_requires_weights() {
    let (success, _, stderr) = run(&["compare", "-n", "200"]);
    assert!(!success);
    assert!(stderr.contains("--weights is required"), "stderr: {stderr}");
}

#[test]
fn compare_json_contains_both_runs() {
    let (success, stdout, stderr) = run(&[
        "compare",
        "-n",
        "200",
        "--face",
        "6",
        "--weights",
        "1,1,1,1,1,5",
        "--seed",
        "11",
        "--format",
        "json",
    ]);
    assert!(success, "stderr: {stderr}");

    let parsed = json(&stdout);
    assert_eq!(parsed["fair"]["parameters"]["game_mode"], "fair");
    assert_eq!(parsed["tweaked"]["parameters"]["game_mode"], "tweaked");
    assert_eq!(parsed["comparison"]["metrics"].as_array().unwrap().len(), 4);
}

#[test]
fn play_stops_when_balance_runs_out() {
    let (success, stdout, stderr) = run(&[
        "play",
        "--name",
        "Ada",
        "-n",
        "50",
        "--balance",
        "30",
        "--face",
        "1",
        "--weights",
        "0,1,0,0,0,0",
        "--seed",
        "5",
        "--format",
        "json",
    ]);
    assert!(success, "stderr: {stderr}");

    let parsed = json(&stdout);
    assert_eq!(parsed["statistics"]["player_name"], "Ada");
    assert_eq!(parsed["statistics"]["total_rounds"], 3);
    assert_eq!(parsed["statistics"]["balance"], 0.0);
    assert_eq!(parsed["streaks"]["current_streak"], -3);
}

#[test]
fn play_reports_rounds_played_before_rejected_bet() {
    let (success, stdout, stderr) = run(&[
        "play", "-n", "5", "--bet", "0.5", "--face", "2", "--seed", "1", "--format", "json",
    ]);
    assert!(success, "stderr: {stderr}");
    assert!(stderr.contains("bet must be between"));

    let parsed = json(&stdout);
    assert_eq!(parsed["statistics"]["total_rounds"], 0);
    assert_eq!(parsed["statistics"]["balance"], 1000.0);
}
