//! CLI command integration tests.
//! Each test points PALACE_DIR at its own temp directory.

use std::path::Path;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn palace_cmd(dir: &TempDir) -> Command {
    #[allow(deprecated)]
    let mut cmd = Command::cargo_bin("palace").unwrap();
    cmd.env("PALACE_DIR", dir.path());
    cmd.env_remove("RUST_LOG");
    cmd
}

const REGISTRY: &str = r#"
[[nodes]]
name = "alpha"
position = [-6.0, 2.0, -4.0]
title = "Alpha"
summary = "first summary"
tags = ["one", "two"]

[[nodes.keywords]]
label = "Swap"
summary = "swapped summary"

[[nodes]]
name = "beta"
position = [6.0, -2.0, -8.0]
title = "Beta"
summary = "second summary"
"#;

/// A one-triangle glTF with its buffer in a sibling file.
fn write_model(dir: &Path) {
    let bytes: Vec<u8> = [-1.0f32, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0, 0.0]
        .iter()
        .flat_map(|f| f.to_le_bytes())
        .collect();
    std::fs::write(dir.join("tri.bin"), bytes).unwrap();
    std::fs::write(
        dir.join("model.gltf"),
        r#"{
  "asset": {"version": "2.0"},
  "scenes": [{"nodes": [0]}],
  "nodes": [{"mesh": 0}],
  "meshes": [{"primitives": [{"attributes": {"POSITION": 0}}]}],
  "buffers": [{"uri": "tri.bin", "byteLength": 36}],
  "bufferViews": [{"buffer": 0, "byteLength": 36}],
  "accessors": [{
    "bufferView": 0, "componentType": 5126, "count": 3, "type": "VEC3",
    "min": [-1, 0, 0], "max": [1, 1, 0]
  }]
}"#,
    )
    .unwrap();
}

fn full_palace() -> TempDir {
    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join("registry.toml"), REGISTRY).unwrap();
    write_model(dir.path());
    dir
}

#[test]
fn inspect_empty_dir_uses_builtins() {
    let dir = TempDir::new().unwrap();
    palace_cmd(&dir)
        .arg("inspect")
        .assert()
        .success()
        .stdout(predicate::str::contains("config:    (built-in)"))
        .stdout(predicate::str::contains("registry:  (built-in)"))
        .stdout(predicate::str::contains("model:     (none)"))
        .stdout(predicate::str::contains("nodes:     5"));
}

#[test]
fn inspect_reports_files() {
    let dir = full_palace();
    palace_cmd(&dir)
        .arg("inspect")
        .assert()
        .success()
        .stdout(predicate::str::contains("registry.toml"))
        .stdout(predicate::str::contains("model:     1 meshes, 3 vertices"))
        .stdout(predicate::str::contains("nodes:     2"))
        .stdout(predicate::str::contains("Alpha"));
}

#[test]
fn dir_flag_overrides_env() {
    let empty = TempDir::new().unwrap();
    let full = full_palace();
    palace_cmd(&empty)
        .arg("--dir")
        .arg(full.path())
        .arg("inspect")
        .assert()
        .success()
        .stdout(predicate::str::contains("nodes:     2"));
}

#[test]
fn tour_visits_sections_then_explores() {
    let dir = TempDir::new().unwrap();
    palace_cmd(&dir)
        .args(["--seed", "42", "tour", "--dwell", "0.5"])
        .assert()
        .success()
        .stdout(predicate::str::contains("section 0:"))
        .stdout(predicate::str::contains("exploring:"))
        // Without a model no node is ever built.
        .stdout(predicate::str::contains("nodes=0"));
}

#[test]
fn explore_opens_node_and_keyword() {
    let dir = full_palace();
    palace_cmd(&dir)
        .args(["--seed", "42", "explore", "--open", "alpha", "--keyword", "0"])
        .assert()
        .success()
        .stdout(predicate::str::contains("nodes:     2"))
        .stdout(predicate::str::contains("opened:    Alpha"))
        .stdout(predicate::str::contains("summary:   swapped summary"))
        .stdout(predicate::str::contains("tags:      one, two"))
        .stdout(predicate::str::contains("keywords:  Swap"));
}

#[test]
fn explore_unknown_node_fails() {
    let dir = full_palace();
    palace_cmd(&dir)
        .args(["explore", "--open", "gamma"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("no node named 'gamma'"));
}

#[test]
fn explore_without_model_cannot_open() {
    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join("registry.toml"), REGISTRY).unwrap();
    palace_cmd(&dir)
        .args(["explore", "--open", "alpha"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("was not built"));
}

#[test]
fn console_applies_valid_lines_from_stdin() {
    let dir = TempDir::new().unwrap();
    palace_cmd(&dir)
        .args(["console", "-"])
        .write_stdin("brain.position(1, 2, 3)\nnot a command\n// comment\ncamera.speed(9)\nbounds.extent(-1)\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("applied:    2"))
        .stdout(predicate::str::contains("model:      1.00, 2.00, 3.00"))
        .stdout(predicate::str::contains("speed:      9"));
}

#[test]
fn console_missing_script_fails() {
    let dir = TempDir::new().unwrap();
    palace_cmd(&dir)
        .args(["console", "nope.txt"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("failed to read nope.txt"));
}

#[test]
fn export_writes_snapshot() {
    let dir = full_palace();
    let out = dir.path().join("snapshot.json");
    palace_cmd(&dir)
        .args(["--seed", "42", "export", "--explore", "--points"])
        .arg(&out)
        .assert()
        .success()
        .stdout(predicate::str::contains("exported to"));

    let json: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&out).unwrap()).unwrap();
    assert_eq!(json["version"], "1");
    assert_eq!(json["state"], "exploring");
    assert_eq!(json["modelVertices"], 3);
    let nodes = json["nodes"].as_array().unwrap();
    assert_eq!(nodes.len(), 2);
    assert_eq!(nodes[0]["name"], "alpha");
    assert!(nodes[0]["points"].as_array().is_some_and(|p| !p.is_empty()));
}

#[test]
fn export_to_stdout_without_model() {
    let dir = TempDir::new().unwrap();
    let output = palace_cmd(&dir).arg("export").output().unwrap();
    assert!(output.status.success());
    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["state"], "intro");
    assert!(json["nodes"].as_array().unwrap().is_empty());
}

#[test]
fn invalid_config_names_the_file() {
    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join("palace.toml"), "[camera\n").unwrap();
    palace_cmd(&dir)
        .arg("inspect")
        .assert()
        .failure()
        .stderr(predicate::str::contains("palace.toml"));
}
