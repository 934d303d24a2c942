//! Tests for the `collect` command

use crate::helpers::*;
use anyhow::Result;
use serde_json::Value;

fn record<'a>(document: &'a Value, api: &str) -> &'a Value {
  document["progress"]
    .as_array()
    .and_then(|records| records.iter().find(|r| r["api_name"] == api))
    .unwrap_or_else(|| panic!("no record for {}", api))
}

fn collect_json(workspace: &TestWorkspace) -> Result<Value> {
  let output = run_release_progress(
    &workspace.path,
    &["collect", "--schedule", "schedule.yaml", "--artifacts", "artifacts.yaml", "--json"],
  )?;
  Ok(serde_json::from_slice(&output.stdout)?)
}

#[test]
fn test_collect_writes_json_document() -> Result<()> {
  let workspace = TestWorkspace::with_fixtures()?;

  run_release_progress(
    &workspace.path,
    &[
      "collect",
      "--schedule",
      "schedule.yaml",
      "--artifacts",
      "artifacts.yaml",
      "-o",
      "out/progress.json",
    ],
  )?;

  assert!(workspace.file_exists("out/progress.json"));
  let document = workspace.read_json("out/progress.json")?;

  assert_eq!(record(&document, "sim-swap")["state"], "published");
  assert_eq!(record(&document, "quality-on-demand")["state"], "draft_ready");
  assert_eq!(record(&document, "device-location")["state"], "snapshot_active");
  assert_eq!(record(&document, "carrier-billing")["state"], "not_planned");
  assert_eq!(record(&document, "kyc-match")["state"], "planned");

  let metadata = &document["metadata"];
  assert_eq!(metadata["total_apis"], 6);
  assert_eq!(metadata["error_count"], 1);
  assert_eq!(metadata["repositories_scanned"], 6);
  assert_eq!(metadata["schema_version"], "1.0.0");
  assert_eq!(metadata["timed_out"], false);
  for state in ["not_planned", "published", "draft_ready", "snapshot_active", "planned"] {
    assert_eq!(metadata["state_counts"][state], 1, "count for {}", state);
  }

  Ok(())
}

#[test]
fn test_missing_repository_becomes_error_record() -> Result<()> {
  let workspace = TestWorkspace::with_fixtures()?;
  let document = collect_json(&workspace)?;

  let failed = record(&document, "number-verification");
  assert!(failed["state"].is_null());
  assert_eq!(failed["error"]["kind"], "fetch");

  // other APIs are unaffected
  assert_eq!(record(&document, "sim-swap")["state"], "published");
  Ok(())
}

#[test]
fn test_records_ordered_by_api_name() -> Result<()> {
  let workspace = TestWorkspace::with_fixtures()?;
  let document = collect_json(&workspace)?;

  let names: Vec<&str> = document["progress"]
    .as_array()
    .map(|records| records.iter().filter_map(|r| r["api_name"].as_str()).collect())
    .unwrap_or_default();
  assert_eq!(
    names,
    vec![
      "carrier-billing",
      "device-location",
      "kyc-match",
      "number-verification",
      "quality-on-demand",
      "sim-swap"
    ]
  );
  Ok(())
}

#[test]
fn test_milestones_and_warnings() -> Result<()> {
  let workspace = TestWorkspace::with_fixtures()?;
  let document = collect_json(&workspace)?;

  let sim_swap = record(&document, "sim-swap");
  assert_eq!(sim_swap["milestones"]["m1"]["date"], "2025-06-01");
  assert_eq!(sim_swap["milestones"]["m3"]["tag"], "r4.1-rc.1");
  assert_eq!(sim_swap["milestones"]["m4"]["type"], "release");
  assert_eq!(sim_swap["milestones"]["m4"]["reference"], "r4.1");
  assert_eq!(sim_swap["published_context"]["latest_public_release"], "r4.1");
  assert_eq!(sim_swap["published_context"]["newest_pre_release"], "r4.1-rc.1");
  assert!(sim_swap["artifacts"]["release_issue"].is_null());

  let qod = record(&document, "quality-on-demand");
  assert_eq!(qod["milestones"]["m4"]["type"], "pr");
  assert_eq!(qod["milestones"]["m4"]["reference"], "#412");
  assert_eq!(qod["artifacts"]["release_issue"]["number"], 398);
  assert!(qod["published_context"]["latest_public_release"].is_null());

  let kyc = record(&document, "kyc-match");
  assert_eq!(kyc["track"], "independent");
  assert!(kyc["milestones"]["m1"]["date"].is_null());
  assert_eq!(kyc["warnings"][0]["code"], "W003");
  assert_eq!(kyc["warnings"][0]["severity"], "info");

  let summaries = document["meta_releases"].as_array().cloned().unwrap_or_default();
  assert_eq!(summaries.len(), 1);
  assert_eq!(summaries[0]["name"], "Fall25");
  assert_eq!(summaries[0]["total_apis"], 5);
  assert_eq!(summaries[0]["m4_achieved"], 2);
  Ok(())
}

#[test]
fn test_collect_is_idempotent() -> Result<()> {
  let workspace = TestWorkspace::with_fixtures()?;
  let first = collect_json(&workspace)?;
  let second = collect_json(&workspace)?;

  assert_eq!(first["progress"], second["progress"]);
  assert_eq!(first["metadata"]["records_sha256"], second["metadata"]["records_sha256"]);
  Ok(())
}

#[test]
fn test_collect_yaml_output() -> Result<()> {
  let workspace = TestWorkspace::with_fixtures()?;

  run_release_progress(
    &workspace.path,
    &[
      "collect",
      "--schedule",
      "schedule.yaml",
      "--artifacts",
      "artifacts.yaml",
      "-o",
      "progress.yaml",
    ],
  )?;

  let content = workspace.read_file("progress.yaml")?;
  let document: Value = serde_yaml::from_str(&content)?;
  assert_eq!(record(&document, "sim-swap")["state"], "published");
  Ok(())
}

#[test]
fn test_text_summary() -> Result<()> {
  let workspace = TestWorkspace::with_fixtures()?;
  let output = run_release_progress(
    &workspace.path,
    &["collect", "--schedule", "schedule.yaml", "--artifacts", "artifacts.yaml"],
  )?;

  let stdout = String::from_utf8_lossy(&output.stdout);
  assert!(stdout.contains("Release Progress"));
  assert!(stdout.contains("sim-swap"));
  assert!(stdout.contains("error:fetch"));
  assert!(stdout.contains("W003 api-renamed"));
  Ok(())
}

#[test]
fn test_unknown_release_type_exits_with_config_error() -> Result<()> {
  let workspace = TestWorkspace::with_fixtures()?;
  workspace.write_file(
    "bad.yaml",
    "apis:\n  - api_name: sim-swap\n    target_release_type: eventually\n",
  )?;

  let output = run_release_progress_raw(
    &workspace.path,
    &["collect", "--schedule", "bad.yaml", "--artifacts", "artifacts.yaml"],
  )?;
  assert_eq!(output.status.code(), Some(1));
  assert!(String::from_utf8_lossy(&output.stderr).contains("eventually"));
  Ok(())
}

#[test]
fn test_duplicate_api_exits_with_config_error() -> Result<()> {
  let workspace = TestWorkspace::with_fixtures()?;
  workspace.write_file(
    "dup.yaml",
    "apis:\n  - api_name: a\n    target_release_type: none\n  - api_name: a\n    target_release_type: none\n",
  )?;

  let output = run_release_progress_raw(
    &workspace.path,
    &["collect", "--schedule", "dup.yaml", "--artifacts", "artifacts.yaml"],
  )?;
  assert_eq!(output.status.code(), Some(1));
  Ok(())
}

#[test]
fn test_missing_schedule_exits_with_config_error() -> Result<()> {
  let workspace = TestWorkspace::with_fixtures()?;
  let output = run_release_progress_raw(
    &workspace.path,
    &["collect", "--schedule", "nope.yaml", "--artifacts", "artifacts.yaml"],
  )?;
  assert_eq!(output.status.code(), Some(1));
  Ok(())
}

#[test]
fn test_invalid_config_exits_with_config_error() -> Result<()> {
  let workspace = TestWorkspace::with_fixtures()?;
  workspace.write_file(
    "progress.toml",
    "[[meta_releases]]\nname = \"Fall25\"\nm3 = { start = \"2025-08-15\", end = \"2025-07-01\" }\n",
  )?;

  let output = run_release_progress_raw(
    &workspace.path,
    &["collect", "--schedule", "schedule.yaml", "--artifacts", "artifacts.yaml"],
  )?;
  assert_eq!(output.status.code(), Some(1));
  Ok(())
}

#[test]
fn test_zero_concurrency_rejected() -> Result<()> {
  let workspace = TestWorkspace::with_fixtures()?;
  let output = run_release_progress_raw(
    &workspace.path,
    &[
      "collect",
      "--schedule",
      "schedule.yaml",
      "--artifacts",
      "artifacts.yaml",
      "--concurrency",
      "0",
    ],
  )?;
  assert_eq!(output.status.code(), Some(1));
  Ok(())
}

#[test]
fn test_explicit_config_path() -> Result<()> {
  let workspace = TestWorkspace::with_fixtures()?;
  std::fs::remove_file(workspace.path.join("progress.toml"))?;
  workspace.write_file(".config/custom.toml", CONFIG)?;

  let output = run_release_progress(
    &workspace.path,
    &[
      "collect",
      "--schedule",
      "schedule.yaml",
      "--artifacts",
      "artifacts.yaml",
      "--config",
      ".config/custom.toml",
      "--json",
    ],
  )?;
  let document: Value = serde_json::from_slice(&output.stdout)?;
  assert_eq!(record(&document, "kyc-match")["warnings"][0]["code"], "W003");
  Ok(())
}
