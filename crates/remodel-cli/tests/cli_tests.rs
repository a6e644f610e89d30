use std::{fs, path::PathBuf};

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

/// Helper function to create a temporary directory for CLI tests
fn create_cli_test_environment() -> TempDir {
    TempDir::new().expect("Failed to create temporary directory")
}

/// Helper function to create a Command with --no-color flag for testing
fn remodel_cmd() -> Command {
    let mut cmd = Command::cargo_bin("remodel").expect("Failed to find remodel binary");
    cmd.arg("--no-color");
    cmd
}

const PLAN_JSON: &str = r#"{
  "title": "Cozy Reading Nook",
  "description": "Turn the spare corner into a reading spot.",
  "styleSummary": "Scandinavian",
  "estimatedCost": "$800",
  "estimatedTime": "1 weekend",
  "steps": [
    {
      "stepNumber": 2,
      "title": "Add shelving",
      "instruction": "Mount two floating oak shelves.",
      "substeps": ["Find studs", "Mount brackets"],
      "visualizationPrompt": "Two oak shelves above the chair",
      "difficulty": "medium"
    },
    {
      "stepNumber": 1,
      "title": "Paint the corner",
      "instruction": "Paint the walls a soft sage green.",
      "safetyWarning": "Ventilate the room.",
      "visualizationPrompt": "Sage green walls",
      "difficulty": "easy",
      "estimatedTime": "4 hours"
    }
  ],
  "materials": [
    { "name": "Sage paint", "quantity": "1 gallon", "estimatedCost": "$45" }
  ],
  "createdAt": "2026-01-15T10:00:00Z"
}"#;

fn write_plan(temp_dir: &TempDir, contents: &str) -> PathBuf {
    let path = temp_dir.path().join("plan.json");
    fs::write(&path, contents).expect("Failed to write plan");
    path
}

#[test]
fn test_cli_help_lists_commands() {
    remodel_cmd()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("run"))
        .stdout(predicate::str::contains("show"))
        .stdout(predicate::str::contains("script"));
}

#[test]
fn test_cli_run_help_lists_media_flags() {
    remodel_cmd()
        .args(["run", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("--narrate"))
        .stdout(predicate::str::contains("--no-variants"))
        .stdout(predicate::str::contains("--retry-lighting"));
}

#[test]
fn test_cli_show_plan() {
    let temp_dir = create_cli_test_environment();
    let plan = write_plan(&temp_dir, PLAN_JSON);

    remodel_cmd()
        .args(["show", plan.to_str().unwrap()])
        .assert()
        .success()
        .stdout(predicate::str::contains("# Cozy Reading Nook"))
        .stdout(predicate::str::contains("- Style: Scandinavian"))
        .stdout(predicate::str::contains("### 1. Paint the corner"))
        .stdout(predicate::str::contains("**Safety:** Ventilate the room."))
        .stdout(predicate::str::contains("Sage paint"));
}

#[test]
fn test_cli_show_orders_steps() {
    let temp_dir = create_cli_test_environment();
    let plan = write_plan(&temp_dir, PLAN_JSON);

    let output = remodel_cmd()
        .args(["show", plan.to_str().unwrap()])
        .output()
        .expect("Failed to run remodel");
    let stdout = String::from_utf8(output.stdout).unwrap();

    let first = stdout.find("### 1.").expect("step 1 is shown");
    let second = stdout.find("### 2.").expect("step 2 is shown");
    assert!(first < second);
}

#[test]
fn test_cli_script() {
    let temp_dir = create_cli_test_environment();
    let plan = write_plan(&temp_dir, PLAN_JSON);

    remodel_cmd()
        .args(["script", plan.to_str().unwrap()])
        .assert()
        .success()
        .stdout(predicate::str::starts_with(
            "Here is your renovation plan: Cozy Reading Nook. Step 1: Paint the corner.",
        ))
        .stdout(predicate::str::contains(
            "Step 2: Add shelving. Mount two floating oak shelves.",
        ));
}

#[test]
fn test_cli_show_missing_file() {
    let temp_dir = create_cli_test_environment();
    let missing = temp_dir.path().join("nope.json");

    remodel_cmd()
        .args(["show", missing.to_str().unwrap()])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to read"));
}

#[test]
fn test_cli_show_invalid_json() {
    let temp_dir = create_cli_test_environment();
    let plan = write_plan(&temp_dir, "{ not json");

    remodel_cmd()
        .args(["show", plan.to_str().unwrap()])
        .assert()
        .failure()
        .stderr(predicate::str::contains("is not a valid plan"));
}

#[test]
fn test_cli_show_rejects_gapped_step_numbers() {
    let temp_dir = create_cli_test_environment();
    let plan = write_plan(
        &temp_dir,
        r#"{
          "title": "Broken",
          "steps": [
            { "stepNumber": 1, "title": "A", "instruction": "a", "visualizationPrompt": "a" },
            { "stepNumber": 3, "title": "C", "instruction": "c", "visualizationPrompt": "c" }
          ]
        }"#,
    );

    remodel_cmd()
        .args(["show", plan.to_str().unwrap()])
        .assert()
        .failure()
        .stderr(predicate::str::contains("contiguous"));
}

#[test]
fn test_cli_run_without_api_key_fails_fast() {
    let temp_dir = create_cli_test_environment();
    let photo = temp_dir.path().join("room.jpg");
    fs::write(&photo, b"jpeg").unwrap();

    remodel_cmd()
        .env_remove("GEMINI_API_KEY")
        .env_remove("API_KEY")
        .args([
            "run",
            "--current",
            photo.to_str().unwrap(),
            "--inspiration",
            photo.to_str().unwrap(),
            "--output-dir",
            temp_dir.path().join("out").to_str().unwrap(),
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("GEMINI_API_KEY"));
}
