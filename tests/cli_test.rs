use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn driftwood(dir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("driftwood").unwrap();
    cmd.arg("--working-dir")
        .arg(dir.path().join("state").to_str().unwrap());
    cmd
}

#[test]
fn test_plan_records_planned_state() {
    let dir = TempDir::new().unwrap();

    driftwood(&dir)
        .args(["plan", "--id", "c1", "--platform", "kubernetes"])
        .args(["--set", "region=us-east-1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("create"));

    driftwood(&dir)
        .args(["state", "show", "c1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("planned"))
        .stdout(predicate::str::contains("kubernetes"));
}

#[test]
fn test_apply_status_destroy_flow() {
    let dir = TempDir::new().unwrap();

    driftwood(&dir)
        .args(["apply", "--id", "svc", "--platform", "ecs"])
        .args(["--set", "cluster=staging"])
        .assert()
        .success()
        .stdout(predicate::str::contains("created"));

    driftwood(&dir)
        .args(["status", "--id", "svc", "--platform", "ecs"])
        .assert()
        .success()
        .stdout(predicate::str::contains("active"));

    driftwood(&dir)
        .args(["destroy", "--id", "svc", "--platform", "ecs"])
        .assert()
        .success()
        .stdout(predicate::str::contains("deleted"));

    // Repeat destroy still succeeds.
    driftwood(&dir)
        .args(["destroy", "--id", "svc", "--platform", "ecs"])
        .assert()
        .success()
        .stdout(predicate::str::contains("deleted"));
}

#[test]
fn test_drift_detection() {
    let dir = TempDir::new().unwrap();

    driftwood(&dir)
        .args(["apply", "--id", "c1", "--platform", "kubernetes"])
        .args(["--set", "region=us-east-1"])
        .assert()
        .success();

    driftwood(&dir)
        .args(["drift", "--id", "c1", "--set", "region=us-east-1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No drift"));

    driftwood(&dir)
        .args(["drift", "--id", "c1", "--set", "region=us-west-2"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Drift detected"))
        .stdout(predicate::str::contains("region"));
}

#[test]
fn test_drift_from_yaml_config() {
    let dir = TempDir::new().unwrap();
    let config_path = dir.path().join("desired.yaml");
    std::fs::write(&config_path, "region: us-east-1\nreplicas: 3\n").unwrap();

    driftwood(&dir)
        .args(["apply", "--id", "c1", "--platform", "kubernetes"])
        .args(["--config", config_path.to_str().unwrap()])
        .assert()
        .success();

    driftwood(&dir)
        .args(["drift", "--id", "c1"])
        .args(["--config", config_path.to_str().unwrap()])
        .args(["--set", "replicas=5"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Drift detected"))
        .stdout(predicate::str::contains("replicas"));
}

#[test]
fn test_unknown_platform_fails() {
    let dir = TempDir::new().unwrap();

    driftwood(&dir)
        .args(["plan", "--id", "c1", "--platform", "metal"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("no backend registered"));
}

#[test]
fn test_state_list_and_rm() {
    let dir = TempDir::new().unwrap();

    driftwood(&dir)
        .args(["plan", "--id", "alpha", "--platform", "mock"])
        .assert()
        .success();
    driftwood(&dir)
        .args(["plan", "--id", "beta", "--platform", "ecs"])
        .assert()
        .success();

    driftwood(&dir)
        .args(["state", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("alpha"))
        .stdout(predicate::str::contains("beta"));

    driftwood(&dir)
        .args(["state", "list", "--filter", "provider=ecs"])
        .assert()
        .success()
        .stdout(predicate::str::contains("beta"))
        .stdout(predicate::str::contains("alpha").not());

    driftwood(&dir)
        .args(["state", "rm", "alpha"])
        .assert()
        .success();

    driftwood(&dir)
        .args(["state", "show", "alpha"])
        .assert()
        .failure();
}

#[test]
fn test_platforms_lists_defaults() {
    let dir = TempDir::new().unwrap();

    driftwood(&dir)
        .arg("platforms")
        .assert()
        .success()
        .stdout(predicate::str::contains("kubernetes"))
        .stdout(predicate::str::contains("app.container"));
}
