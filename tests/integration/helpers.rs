//! Test helpers for integration tests

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use tempfile::TempDir;

/// Schedule covering every release state plus one repository missing from the snapshot
pub const SCHEDULE: &str = r#"
apis:
  - api_name: sim-swap
    repository: SimSwap
    target_release_type: minor
    target_version: 2.1.0
    target_release_tag: r4.1
    meta_release: Fall25
    maturity: stable
  - api_name: quality-on-demand
    repository: QualityOnDemand
    target_release_type: major
    target_version: 1.0.0
    target_release_tag: r4.1
    meta_release: Fall25
    maturity: stable
  - api_name: device-location
    repository: DeviceLocation
    target_release_type: minor
    target_version: 0.5.0
    target_release_tag: r3.1
    meta_release: Fall25
  - api_name: carrier-billing
    repository: CarrierBilling
    target_release_type: none
    meta_release: Fall25
  - api_name: kyc-match
    repository: KnowYourCustomer
    target_release_type: patch
    target_version: 0.3.1
    target_release_tag: r2.2
    release_track: independent
  - api_name: number-verification
    repository: NumberVerification
    target_release_type: minor
    target_version: 1.1.0
    target_release_tag: r2.1
    meta_release: Fall25
"#;

/// Recorded artifacts for the repositories in `SCHEDULE` (NumberVerification missing)
pub const ARTIFACTS: &str = r#"
SimSwap:
  tags:
    - name: r4.1-rc.1
      created_at: 2025-07-15T09:00:00Z
    - name: r4.1
      created_at: 2025-09-12T14:30:00Z
      url: https://github.com/camaraproject/SimSwap/releases/tag/r4.1
QualityOnDemand:
  snapshot_branches:
    - release-snapshot/r4.1-9c1e2f0
  draft_releases:
    - name: r4.1
      tag_name: r4.1
  release_prs:
    - number: 412
      url: https://github.com/camaraproject/QualityOnDemand/pull/412
      base: release-snapshot/r4.1-9c1e2f0
  release_issue:
    number: 398
    url: https://github.com/camaraproject/QualityOnDemand/issues/398
DeviceLocation:
  snapshot_branches:
    - release-snapshot/r3.1-77aa01b
CarrierBilling: {}
KnowYourCustomer:
  tags:
    - name: r2.1
      created_at: 2025-03-01T00:00:00Z
"#;

pub const CONFIG: &str = r#"
[collector]
max_concurrency = 2
max_retries = 0

[renames]
"kyc-match" = "know-your-customer-match"

[[meta_releases]]
name = "Fall25"
m1 = "2025-06-01"
m3 = { start = "2025-07-01", end = "2025-08-15" }
m4 = { start = "2025-09-01", end = "2025-09-30" }
"#;

/// A temporary directory holding schedule, artifacts and config files
pub struct TestWorkspace {
  _root: TempDir,
  pub path: PathBuf,
}

impl TestWorkspace {
  /// Create an empty workspace
  pub fn new() -> Result<Self> {
    let root = TempDir::new()?;
    let path = root.path().to_path_buf();
    Ok(Self { _root: root, path })
  }

  /// Workspace with `schedule.yaml`, `artifacts.yaml` and `progress.toml`
  pub fn with_fixtures() -> Result<Self> {
    let workspace = Self::new()?;
    workspace.write_file("schedule.yaml", SCHEDULE)?;
    workspace.write_file("artifacts.yaml", ARTIFACTS)?;
    workspace.write_file("progress.toml", CONFIG)?;
    Ok(workspace)
  }

  /// Write a file relative to the workspace
  pub fn write_file(&self, path: &str, content: &str) -> Result<PathBuf> {
    let full = self.path.join(path);
    if let Some(parent) = full.parent() {
      std::fs::create_dir_all(parent)?;
    }
    std::fs::write(&full, content)?;
    Ok(full)
  }

  /// Check if a file exists
  pub fn file_exists(&self, path: &str) -> bool {
    self.path.join(path).exists()
  }

  /// Read a file
  pub fn read_file(&self, path: &str) -> Result<String> {
    Ok(std::fs::read_to_string(self.path.join(path))?)
  }

  /// Read a JSON file
  pub fn read_json(&self, path: &str) -> Result<serde_json::Value> {
    let content = self.read_file(path)?;
    serde_json::from_str(&content).with_context(|| format!("{} is not JSON", path))
  }
}

/// Run the release-progress binary, whatever its exit status
pub fn run_release_progress_raw(cwd: &Path, args: &[&str]) -> Result<Output> {
  let bin = env!("CARGO_BIN_EXE_release-progress");

  Command::new(bin)
    .current_dir(cwd)
    .args(args)
    .env_remove("RELEASE_PROGRESS_LOG")
    .output()
    .context("Failed to run release-progress")
}

/// Run the release-progress binary and fail unless it succeeds
pub fn run_release_progress(cwd: &Path, args: &[&str]) -> Result<Output> {
  let output = run_release_progress_raw(cwd, args)?;

  if !output.status.success() {
    let stderr = String::from_utf8_lossy(&output.stderr);
    let stdout = String::from_utf8_lossy(&output.stdout);
    anyhow::bail!(
      "release-progress command failed: release-progress {}\nstdout: {}\nstderr: {}",
      args.join(" "),
      stdout,
      stderr
    );
  }

  Ok(output)
}
