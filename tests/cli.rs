use assert_cmd::Command;
use predicates::prelude::*;

fn grindopt() -> Command {
    let mut cmd = Command::cargo_bin("grindopt").unwrap();
    cmd.env("RUST_LOG", "off");
    cmd
}

#[test]
fn test_help_lists_parameters() {
    grindopt()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("--probabilities"))
        .stdout(predicate::str::contains("--reset-cost"));
}

#[test]
fn test_coin_flip_run_writes_report() {
    let dir = tempfile::tempdir().unwrap();
    grindopt()
        .args(["-d", "1", "-r", "1", "-p", "0.5,0.5"])
        .args(["--reset-cost", "10", "--attempt-cost", "1"])
        .arg("--out-dir")
        .arg(dir.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("CHECK: sat"))
        .stdout(predicate::str::contains(
            "EXPECTED TIME TO GET ACHIEVEMENT: 20.00000 (20)",
        ));

    assert!(dir.path().join("1-deficit-1-rolls.xlsx").exists());
}

#[test]
fn test_config_file_is_layered_under_flags() {
    let dir = tempfile::tempdir().unwrap();
    let config = dir.path().join("grind.json");
    std::fs::write(
        &config,
        r#"{
            "outcome_probabilities": ["0.5", "0.5"],
            "reset_cost": "10",
            "attempt_cost": "1",
            "total_rolls": 1,
            "total_deficit": 1,
            "precision": 2
        }"#,
    )
    .unwrap();

    grindopt()
        .arg("--config")
        .arg(&config)
        .args(["--reset-cost", "20"])
        .arg("--out-dir")
        .arg(dir.path())
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "EXPECTED TIME TO GET ACHIEVEMENT: 40.00 (40)",
        ));
}

#[test]
fn test_bad_probabilities_fail_before_solving() {
    let dir = tempfile::tempdir().unwrap();
    grindopt()
        .args(["-p", "0.5,0.4"])
        .arg("--out-dir")
        .arg(dir.path())
        .assert()
        .failure()
        .stdout(predicate::str::contains("CHECK").not())
        .stderr(predicate::str::contains("sum to 0.9"));
}

#[test]
fn test_unknown_backend_is_rejected() {
    grindopt()
        .args(["--backend", "z3"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown solver backend"));
}
