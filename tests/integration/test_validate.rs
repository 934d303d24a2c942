//! Tests for the `validate` command

use crate::helpers::*;
use anyhow::Result;
use serde_json::Value;

fn collect_to(workspace: &TestWorkspace, output: &str) -> Result<()> {
  run_release_progress(
    &workspace.path,
    &[
      "collect",
      "--schedule",
      "schedule.yaml",
      "--artifacts",
      "artifacts.yaml",
      "-o",
      output,
    ],
  )?;
  Ok(())
}

#[test]
fn test_validate_collected_json() -> Result<()> {
  let workspace = TestWorkspace::with_fixtures()?;
  collect_to(&workspace, "progress.json")?;

  let output = run_release_progress(&workspace.path, &["validate", "progress.json", "--json"])?;
  let report: Value = serde_json::from_slice(&output.stdout)?;
  assert_eq!(report["valid"], true);
  assert_eq!(report["records"], 6);
  Ok(())
}

#[test]
fn test_validate_collected_yaml() -> Result<()> {
  let workspace = TestWorkspace::with_fixtures()?;
  collect_to(&workspace, "progress.yaml")?;

  let output = run_release_progress(&workspace.path, &["validate", "progress.yaml"])?;
  assert!(String::from_utf8_lossy(&output.stdout).contains("valid progress document"));
  Ok(())
}

#[test]
fn test_validate_rejects_unknown_state() -> Result<()> {
  let workspace = TestWorkspace::with_fixtures()?;
  collect_to(&workspace, "progress.json")?;

  let mut document = workspace.read_json("progress.json")?;
  document["progress"][0]["state"] = Value::String("shipped".to_string());
  workspace.write_file("tampered.json", &serde_json::to_string_pretty(&document)?)?;

  let output = run_release_progress_raw(&workspace.path, &["validate", "tampered.json"])?;
  assert_eq!(output.status.code(), Some(3));
  Ok(())
}

#[test]
fn test_validate_rejects_inconsistent_counts() -> Result<()> {
  let workspace = TestWorkspace::with_fixtures()?;
  collect_to(&workspace, "progress.json")?;

  let mut document = workspace.read_json("progress.json")?;
  document["metadata"]["state_counts"]["published"] = Value::from(4);
  workspace.write_file("tampered.json", &serde_json::to_string_pretty(&document)?)?;

  let output = run_release_progress_raw(&workspace.path, &["validate", "tampered.json"])?;
  assert_eq!(output.status.code(), Some(3));
  assert!(String::from_utf8_lossy(&output.stderr).contains("state_counts"));
  Ok(())
}

#[test]
fn test_validate_rejects_reordered_records() -> Result<()> {
  let workspace = TestWorkspace::with_fixtures()?;
  collect_to(&workspace, "progress.json")?;

  let mut document = workspace.read_json("progress.json")?;
  if let Some(records) = document["progress"].as_array_mut() {
    records.reverse();
  }
  workspace.write_file("tampered.json", &serde_json::to_string_pretty(&document)?)?;

  let output = run_release_progress_raw(&workspace.path, &["validate", "tampered.json"])?;
  assert_eq!(output.status.code(), Some(3));
  Ok(())
}

#[test]
fn test_validate_missing_file() -> Result<()> {
  let workspace = TestWorkspace::new()?;
  let output = run_release_progress_raw(&workspace.path, &["validate", "absent.json"])?;
  assert_eq!(output.status.code(), Some(1));
  Ok(())
}
