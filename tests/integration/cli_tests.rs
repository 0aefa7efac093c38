//! CLI integration tests
//!
//! These tests drive the compiled binary against the fixture project.

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

const TARGET: &str = "com.shop.legacy.LegacyExporter";

/// Get the path to the test fixtures directory
fn fixture_path() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/shop")
}

fn classprune() -> Command {
    Command::cargo_bin("classprune").unwrap()
}

fn copy_fixture() -> TempDir {
    fn copy_dir(from: &Path, to: &Path) {
        fs::create_dir_all(to).unwrap();
        for entry in fs::read_dir(from).unwrap() {
            let entry = entry.unwrap();
            let target = to.join(entry.file_name());
            if entry.file_type().unwrap().is_dir() {
                copy_dir(&entry.path(), &target);
            } else {
                fs::copy(entry.path(), &target).unwrap();
            }
        }
    }

    let dir = TempDir::new().unwrap();
    copy_dir(&fixture_path(), dir.path());
    dir
}

fn legacy_dir(root: &Path) -> PathBuf {
    root.join("src/main/java/com/shop/legacy")
}

// ============================================================================
// Basic CLI Tests
// ============================================================================

#[test]
fn test_help() {
    classprune()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("--target"))
        .stdout(predicate::str::contains("--single-pass"));
}

#[test]
fn test_no_targets_fails() {
    classprune()
        .arg(fixture_path())
        .arg("-q")
        .assert()
        .failure()
        .stderr(predicate::str::contains("target"));
}

#[test]
fn test_missing_path_fails() {
    classprune()
        .arg(fixture_path().join("nope"))
        .args(["-t", TARGET, "-q"])
        .assert()
        .failure();
}

#[test]
fn test_terminal_report_lists_deletable_classes() {
    classprune()
        .arg(fixture_path())
        .args(["-t", TARGET])
        .assert()
        .success()
        .stdout(predicate::str::contains("com.shop.legacy.CsvWriter"))
        .stdout(predicate::str::contains("6 classes can be deleted"))
        .stdout(predicate::str::contains("com.shop.OrderService"));
}

#[test]
fn test_single_pass_is_accepted() {
    classprune()
        .arg(fixture_path())
        .args(["-t", TARGET, "--single-pass", "--threads", "2"])
        .assert()
        .success();
}

// ============================================================================
// JSON output
// ============================================================================

#[test]
fn test_json_output_is_machine_readable() {
    let output = classprune()
        .arg(fixture_path())
        .args(["-t", TARGET, "-f", "json", "-q"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["deletable"].as_array().unwrap().len(), 6);
    assert_eq!(json["summary"]["deletable"], 6);
    assert_eq!(json["targets"][0], TARGET);
    assert!(json["retained"]
        .as_array()
        .unwrap()
        .iter()
        .any(|r| r["name"] == "com.shop.util.Money" && r["reason"] == "referenced"));
}

#[test]
fn test_json_output_file() {
    let dir = TempDir::new().unwrap();
    let report = dir.path().join("report.json");

    classprune()
        .arg(fixture_path())
        .args(["-t", TARGET, "-f", "json", "-q", "-o"])
        .arg(&report)
        .assert()
        .success();

    let json: serde_json::Value = serde_json::from_str(&fs::read_to_string(&report).unwrap()).unwrap();
    assert_eq!(json["cycles"].as_array().unwrap().len(), 1);
}

// ============================================================================
// Deletion
// ============================================================================

#[test]
fn test_dry_run_keeps_files() {
    let project = copy_fixture();

    classprune()
        .arg(project.path())
        .args(["-t", TARGET, "--dry-run"])
        .assert()
        .success()
        .stdout(predicate::str::contains("would delete"));

    assert!(legacy_dir(project.path()).join("LegacyExporter.java").exists());
    assert!(legacy_dir(project.path()).join("CsvWriter.java").exists());
}

#[test]
fn test_delete_with_yes_removes_files() {
    let project = copy_fixture();

    classprune()
        .arg(project.path())
        .args(["-t", TARGET, "--delete", "--yes", "-q"])
        .assert()
        .success();

    let legacy = legacy_dir(project.path());
    for name in ["LegacyExporter", "CsvWriter", "Escaper", "LegacyFormat", "Node", "Edge"] {
        assert!(!legacy.join(format!("{}.java", name)).exists(), "{} survived", name);
    }
    let shop = project.path().join("src/main/java/com/shop");
    assert!(shop.join("App.java").exists());
    assert!(shop.join("util/Money.java").exists());
    assert!(project.path().join("src/main/java/com/example/tools/Audit.java").exists());
}

#[test]
fn test_undo_script_restores_deleted_files() {
    let project = copy_fixture();
    let script = project.path().join("undo.sh");

    classprune()
        .arg(project.path())
        .args(["-t", TARGET, "--delete", "--yes", "-q", "--undo-script"])
        .arg(&script)
        .assert()
        .success();

    let contents = fs::read_to_string(&script).unwrap();
    assert!(contents.starts_with("#!/bin/bash"));
    assert!(contents.contains("LegacyExporter.java"));
    assert!(contents.contains("class CsvWriter"));
}

#[test]
fn test_targets_from_config_file() {
    let project = copy_fixture();
    fs::write(
        project.path().join(".classprune.toml"),
        format!("targets = [\"{}\"]\n\n[report]\nformat = \"json\"\n", TARGET),
    )
    .unwrap();

    let output = classprune().arg(project.path()).arg("-q").output().unwrap();
    assert!(output.status.success());

    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["deletable"].as_array().unwrap().len(), 6);
}
