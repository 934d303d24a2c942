//! The progress document: run metadata, meta-release summaries, records

use crate::core::error::{ProgressResult, ResultExt};
use crate::core::format::DocumentFormat;
use crate::model::record::ProgressRecord;
use crate::model::state::ReleaseState;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::path::Path;

/// Version of the document layout (bumped with the JSON schema)
pub const SCHEMA_VERSION: &str = "1.0.0";

/// Version of the tool that produced the document
pub const COLLECTOR_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Record count per state; every state is present, zero included
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StateCounts {
  pub not_planned: usize,
  pub published: usize,
  pub draft_ready: usize,
  pub snapshot_active: usize,
  pub planned: usize,
}

impl StateCounts {
  pub fn from_records(records: &[ProgressRecord]) -> Self {
    let mut counts = Self::default();
    for state in records.iter().filter_map(|r| r.state) {
      *counts.slot(state) += 1;
    }
    counts
  }

  fn slot(&mut self, state: ReleaseState) -> &mut usize {
    match state {
      ReleaseState::NotPlanned => &mut self.not_planned,
      ReleaseState::Published => &mut self.published,
      ReleaseState::DraftReady => &mut self.draft_ready,
      ReleaseState::SnapshotActive => &mut self.snapshot_active,
      ReleaseState::Planned => &mut self.planned,
    }
  }

  pub fn get(&self, state: ReleaseState) -> usize {
    match state {
      ReleaseState::NotPlanned => self.not_planned,
      ReleaseState::Published => self.published,
      ReleaseState::DraftReady => self.draft_ready,
      ReleaseState::SnapshotActive => self.snapshot_active,
      ReleaseState::Planned => self.planned,
    }
  }

  pub fn total(&self) -> usize {
    ReleaseState::ALL.iter().map(|s| self.get(*s)).sum()
  }
}

/// Facts about the collection run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunMetadata {
  /// UTC timestamp, `YYYY-MM-DDTHH:MM:SSZ`
  pub last_updated: String,
  pub schema_version: String,
  pub collector_version: String,
  pub total_apis: usize,
  pub state_counts: StateCounts,
  pub error_count: usize,
  pub repositories_scanned: usize,
  /// Calls made to the artifact source, retries included
  pub source_calls: u64,
  pub duration_seconds: f64,
  pub timed_out: bool,
  /// SHA-256 of the serialized record list
  pub records_sha256: String,
}

/// Milestone achievement across one meta-release
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetaReleaseSummary {
  pub name: String,
  pub total_apis: usize,
  pub m1_achieved: usize,
  pub m3_achieved: usize,
  pub m4_achieved: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProgressDocument {
  pub metadata: RunMetadata,
  #[serde(default)]
  pub meta_releases: Vec<MetaReleaseSummary>,
  pub progress: Vec<ProgressRecord>,
}

impl ProgressDocument {
  pub fn render(&self, format: DocumentFormat) -> ProgressResult<String> {
    format.render(self)
  }

  pub fn write(&self, path: &Path, format: DocumentFormat) -> ProgressResult<()> {
    if let Some(parent) = path.parent()
      && !parent.as_os_str().is_empty()
    {
      std::fs::create_dir_all(parent)?;
    }
    let content = self.render(format)?;
    std::fs::write(path, content).context(format!("Failed to write {}", path.display()))?;
    tracing::info!("wrote {} records to {}", self.progress.len(), path.display());
    Ok(())
  }
}

/// Hex SHA-256 of the compact JSON encoding of `records`
pub fn records_digest(records: &[ProgressRecord]) -> ProgressResult<String> {
  let json = serde_json::to_vec(records)?;
  Ok(format!("{:x}", Sha256::digest(&json)))
}
