//! Integration tests for the scrcheck CLI

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

const MATTHEW: &str = "\\id MAT\n\\c 1\n\\p\n\\v 1 The the book of the genealogy.\n\\v 2 Abraham begat Isaac.\n";

fn write_source(dir: &Path, content: &str) -> PathBuf {
    let path = dir.join("MAT.sfm");
    fs::write(&path, content).unwrap();
    path
}

fn scrcheck() -> Command {
    Command::cargo_bin("scrcheck").unwrap()
}

fn check(dir: &Path, source: &Path) -> Command {
    let mut cmd = scrcheck();
    cmd.arg("check")
        .arg("-i")
        .arg(source)
        .arg("-s")
        .arg(dir.join("store"))
        .arg("-q");
    cmd
}

#[test]
fn test_check_reports_and_creates_store() {
    let dir = TempDir::new().unwrap();
    let source = write_source(dir.path(), MATTHEW);

    check(dir.path(), &source)
        .assert()
        .success()
        .stdout(predicate::str::contains("Repeated Words"))
        .stdout(predicate::str::contains("1 new"))
        .stdout(predicate::str::contains("2 run(s): 1 annotation(s) created, 0 removed"));

    assert!(dir.path().join("store").join("MAT.annotations.json").exists());
}

#[test]
fn test_rerun_is_unchanged() {
    let dir = TempDir::new().unwrap();
    let source = write_source(dir.path(), MATTHEW);
    check(dir.path(), &source).assert().success();

    check(dir.path(), &source)
        .assert()
        .success()
        .stdout(predicate::str::contains("0 new, 0 updated, 1 unchanged, 0 removed"));
}

#[test]
fn test_fixed_text_removes_annotation() {
    let dir = TempDir::new().unwrap();
    let source = write_source(dir.path(), MATTHEW);
    check(dir.path(), &source).assert().success();

    write_source(dir.path(), &MATTHEW.replace("The the", "The"));
    check(dir.path(), &source)
        .assert()
        .success()
        .stdout(predicate::str::contains("no inconsistencies"))
        .stdout(predicate::str::contains("1 removed"));
}

#[test]
fn test_json_output() {
    let dir = TempDir::new().unwrap();
    let source = write_source(dir.path(), MATTHEW);

    let output = check(dir.path(), &source)
        .arg("-f")
        .arg("json")
        .output()
        .unwrap();
    assert!(output.status.success());
    let runs: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let runs = runs.as_array().unwrap();
    assert_eq!(runs.len(), 2);
    assert!(runs.iter().all(|r| r["book"] == "MAT"));
    assert!(runs
        .iter()
        .any(|r| r["check"] == "Repeated Words" && r["result"] == "inconsistencies"));
}

#[test]
fn test_single_check_selection() {
    let dir = TempDir::new().unwrap();
    let source = write_source(dir.path(), MATTHEW);

    check(dir.path(), &source)
        .arg("-c")
        .arg("sentence-final punctuation")
        .assert()
        .success()
        .stdout(predicate::str::contains("Sentence-Final Punctuation"))
        .stdout(predicate::str::contains("Repeated Words").not());
}

#[test]
fn test_unknown_check_fails() {
    let dir = TempDir::new().unwrap();
    let source = write_source(dir.path(), MATTHEW);

    check(dir.path(), &source)
        .arg("-c")
        .arg("Spelling")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unknown check: Spelling"));
    assert!(!dir.path().join("store").exists());
}

#[test]
fn test_no_matching_input_fails() {
    let dir = TempDir::new().unwrap();
    scrcheck()
        .arg("check")
        .arg("-i")
        .arg(dir.path().join("*.sfm").to_string_lossy().to_string())
        .arg("-q")
        .assert()
        .failure()
        .stderr(predicate::str::contains("No source files"));
}

#[test]
fn test_invalid_range_fails() {
    let dir = TempDir::new().unwrap();
    let source = write_source(dir.path(), MATTHEW);

    check(dir.path(), &source)
        .arg("--from")
        .arg("XYZ 1")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid reference"));
}

#[test]
fn test_range_outside_sources_runs_nothing() {
    let dir = TempDir::new().unwrap();
    let source = write_source(dir.path(), MATTHEW);

    check(dir.path(), &source)
        .arg("--from")
        .arg("GEN")
        .arg("--to")
        .arg("GEN")
        .assert()
        .success()
        .stdout(predicate::str::is_empty());
}

#[test]
fn test_status_after_check() {
    let dir = TempDir::new().unwrap();
    let source = write_source(dir.path(), MATTHEW);
    check(dir.path(), &source).assert().success();

    scrcheck()
        .arg("status")
        .arg("-s")
        .arg(dir.path().join("store"))
        .assert()
        .success()
        .stdout(predicate::str::contains("MAT: 1 open, 0 closed"))
        .stdout(predicate::str::contains("Repeated Words"));
}

#[test]
fn test_status_of_missing_store_is_empty() {
    let dir = TempDir::new().unwrap();
    scrcheck()
        .arg("status")
        .arg("-s")
        .arg(dir.path().join("nothing"))
        .arg("-f")
        .arg("json")
        .assert()
        .success()
        .stdout(predicate::str::contains("[]"));
}

#[test]
fn test_list_checks() {
    scrcheck()
        .arg("list")
        .arg("checks")
        .assert()
        .success()
        .stdout(predicate::str::contains("Repeated Words"))
        .stdout(predicate::str::contains("Sentence-Final Punctuation"));
}

#[test]
fn test_list_markers_with_project() {
    let dir = TempDir::new().unwrap();
    let project = dir.path().join("project.toml");
    fs::write(
        &project,
        "[[import.marker]]\nbegin = \"\\\\zz\"\nstyle = \"Custom Style\"\n",
    )
    .unwrap();

    scrcheck()
        .arg("list")
        .arg("markers")
        .arg("-p")
        .arg(&project)
        .assert()
        .success()
        .stdout(predicate::str::contains("\\zz"))
        .stdout(predicate::str::contains("Custom Style"))
        .stdout(predicate::str::contains("\\v"));
}

#[test]
fn test_help_lists_commands() {
    scrcheck()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("check"))
        .stdout(predicate::str::contains("status"))
        .stdout(predicate::str::contains("list"));
}
