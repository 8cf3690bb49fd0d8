//! Integration tests for the `build` and `inspect` subcommands.
//!
//! These tests use `assert_cmd` to verify CLI behavior including:
//! - building an artifact from the fixture feature file
//! - environment-variable path fallbacks
//! - inspect verdicts and exit codes
//! - JSON output format

use std::fs;
use std::path::{Path, PathBuf};

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

/// Path to the checked-in feature fixture.
fn fixture_path() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../../docs/fixtures/sample_network.ndjson")
}

/// Temporary working directory with the fixture copied in.
struct TestEnv {
    temp_dir: TempDir,
    input: PathBuf,
    output: PathBuf,
}

impl TestEnv {
    fn new() -> Self {
        let temp_dir = TempDir::new().expect("create temp dir");
        let input = temp_dir.path().join("roman_roads.ndjson");
        let output = temp_dir.path().join("itinere_graph.json");
        fs::copy(fixture_path(), &input).expect("copy fixture");
        Self {
            temp_dir,
            input,
            output,
        }
    }

    fn dir(&self) -> &Path {
        self.temp_dir.path()
    }

    fn command(&self) -> Command {
        let mut cmd = Command::cargo_bin("itinere-cli").expect("binary exists");
        cmd.current_dir(self.dir())
            .env_remove("ITINERE_INPUT")
            .env_remove("ITINERE_OUTPUT")
            .env("RUST_LOG", "warn");
        cmd
    }

    fn build(&self) {
        self.command()
            .args(["build", "--input"])
            .arg(&self.input)
            .arg("--output")
            .arg(&self.output)
            .assert()
            .success();
    }
}

#[test]
fn build_writes_artifact_and_reports_counts() {
    let env = TestEnv::new();

    env.command()
        .args(["build", "--input"])
        .arg(&env.input)
        .arg("--output")
        .arg(&env.output)
        .assert()
        .success()
        .stdout(predicate::str::contains("Created 6 nodes and 5 edges"))
        .stdout(predicate::str::contains("Added 1 port connector edges"));

    let artifact: serde_json::Value =
        serde_json::from_slice(&fs::read(&env.output).expect("artifact written"))
            .expect("artifact is JSON");
    assert_eq!(artifact["cellSize"], 0.25);
    assert_eq!(artifact["nodes"].as_array().map(Vec::len), Some(6));
}

#[test]
fn build_defaults_to_working_directory_files() {
    let env = TestEnv::new();

    env.command().arg("build").assert().success();
    assert!(env.output.exists());
}

#[test]
fn build_honours_environment_paths() {
    let env = TestEnv::new();
    let custom_output = env.dir().join("custom.json");

    env.command()
        .arg("build")
        .env("ITINERE_INPUT", &env.input)
        .env("ITINERE_OUTPUT", &custom_output)
        .assert()
        .success();

    assert!(custom_output.exists());
    assert!(!env.output.exists());
}

#[test]
fn build_json_report_is_machine_readable() {
    let env = TestEnv::new();

    let stdout = env
        .command()
        .args(["build", "--json", "--input"])
        .arg(&env.input)
        .arg("--output")
        .arg(&env.output)
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();

    let report: serde_json::Value = serde_json::from_slice(&stdout).expect("valid JSON output");
    assert_eq!(report["edges"], 5);
    assert_eq!(report["malformed_lines"], 1);
    assert_eq!(report["ports"]["ports_added"], 1);
    assert_eq!(report["edges_by_kind"]["port"], 1);
}

#[test]
fn build_without_ports_skips_bridging() {
    let env = TestEnv::new();

    env.command()
        .args(["build", "--no-ports"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Port bridging disabled"))
        .stdout(predicate::str::contains("Created 6 nodes and 4 edges"));
}

#[test]
fn build_fails_on_missing_input_without_writing() {
    let env = TestEnv::new();

    env.command()
        .args(["build", "--input", "does-not-exist.ndjson"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("input features not found"));
    assert!(!env.output.exists());
}

#[test]
fn build_rejects_invalid_cell_size() {
    let env = TestEnv::new();

    env.command()
        .args(["build", "--cell-size", "0"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid build configuration"));
    assert!(!env.output.exists());
}

#[test]
fn inspect_accepts_a_fresh_build() {
    let env = TestEnv::new();
    env.build();

    env.command()
        .arg("inspect")
        .arg(&env.output)
        .assert()
        .success()
        .stdout(predicate::str::contains("✓ Graph artifact is valid"))
        .stdout(predicate::str::contains("Nodes: 6"));
}

#[test]
fn inspect_json_output() {
    let env = TestEnv::new();
    env.build();

    let stdout = env
        .command()
        .args(["inspect", "--json"])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();

    let json: serde_json::Value = serde_json::from_slice(&stdout).expect("valid JSON output");
    assert_eq!(json["valid"], true);
    assert_eq!(json["summary"]["nodes"], 6);
    assert_eq!(json["summary"]["edges"], 5);
    assert!(json.get("problems").is_none());
}

#[test]
fn inspect_exit_codes() {
    // MISSING (2)
    {
        let env = TestEnv::new();
        env.command()
            .arg("inspect")
            .assert()
            .code(2)
            .stdout(predicate::str::contains("artifact not found"));
    }

    // UNREADABLE (3)
    {
        let env = TestEnv::new();
        fs::write(&env.output, "{\"nodes\": [").expect("write garbage");
        env.command().arg("inspect").assert().code(3);
    }

    // INVALID (4)
    {
        let env = TestEnv::new();
        env.build();
        let mut artifact: serde_json::Value =
            serde_json::from_slice(&fs::read(&env.output).expect("artifact written"))
                .expect("artifact is JSON");
        let from = artifact["edges"][0]["from"].clone();
        artifact["edges"][0]["to"] = from;
        fs::write(&env.output, artifact.to_string()).expect("rewrite artifact");

        env.command()
            .arg("inspect")
            .assert()
            .code(4)
            .stdout(predicate::str::contains("✗ Graph artifact is INVALID"))
            .stdout(predicate::str::contains("self-loop"));
    }
}
