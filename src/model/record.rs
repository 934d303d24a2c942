//! Per-API progress records

use crate::model::artifacts::{ArtifactView, ReleaseIssue, ReleasePr};
use crate::model::plan::{Maturity, ReleasePlanEntry, ReleaseTrack, ReleaseType};
use crate::model::state::ReleaseState;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Severity of an advisory warning
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
  /// Informational message (not an issue)
  Info,
  /// Should be addressed
  Warning,
  /// Data is inconsistent
  Error,
}

impl fmt::Display for Severity {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Severity::Info => write!(f, "INFO"),
      Severity::Warning => write!(f, "WARN"),
      Severity::Error => write!(f, "ERROR"),
    }
  }
}

/// Advisory annotation attached to one record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Warning {
  /// Stable identifier, e.g. `W001`
  pub code: String,
  pub severity: Severity,
  pub message: String,
}

impl Warning {
  pub fn new(code: impl Into<String>, severity: Severity, message: impl Into<String>) -> Self {
    Self {
      code: code.into(),
      severity,
      message: message.into(),
    }
  }

  pub fn warning(code: impl Into<String>, message: impl Into<String>) -> Self {
    Self::new(code, Severity::Warning, message)
  }

  pub fn info(code: impl Into<String>, message: impl Into<String>) -> Self {
    Self::new(code, Severity::Info, message)
  }
}

/// M1: plan committed
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct M1 {
  #[serde(default)]
  pub date: Option<NaiveDate>,
}

/// M3: pre-release published inside the window
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct M3 {
  pub tag: String,
  pub date: DateTime<Utc>,
  #[serde(default)]
  pub url: Option<String>,
}

/// What satisfied M4
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum M4Kind {
  Release,
  Pr,
}

/// M4: public release, or the pull request that will produce it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct M4 {
  #[serde(rename = "type")]
  pub kind: M4Kind,
  /// Tag name for releases, `#<number>` for pull requests
  pub reference: String,
  #[serde(default)]
  pub url: Option<String>,
  #[serde(default)]
  pub date: Option<DateTime<Utc>>,
}

/// Milestones; absence means "not yet met"
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MilestoneRecord {
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub m1: Option<M1>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub m3: Option<M3>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub m4: Option<M4>,
}

/// Artifacts that matched the entry's target
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordArtifacts {
  #[serde(default)]
  pub release_tags: Vec<String>,
  #[serde(default)]
  pub snapshot_branch: Option<String>,
  #[serde(default)]
  pub draft_release: Option<String>,
  #[serde(default)]
  pub release_pr: Option<ReleasePr>,
  #[serde(default)]
  pub release_issue: Option<ReleaseIssue>,
}

impl RecordArtifacts {
  pub fn from_view(view: &ArtifactView<'_>) -> Self {
    Self {
      release_tags: view.release_tags.iter().map(|t| t.name.clone()).collect(),
      snapshot_branch: view.snapshot_branch.map(String::from),
      draft_release: view.draft_release_ref().map(String::from),
      release_pr: view.release_pr.cloned(),
      release_issue: view.release_issue.cloned(),
    }
  }
}

/// What the repository has already published, whatever the plan says
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublishedContext {
  /// Most recent dated public release tag
  #[serde(default)]
  pub latest_public_release: Option<String>,
  /// Most recent dated pre-release tag
  #[serde(default)]
  pub newest_pre_release: Option<String>,
}

/// Why a record carries no state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordErrorKind {
  /// Artifact lookup failed after retries
  Fetch,
  /// Collection deadline passed first
  Timeout,
  /// Derivation post-condition failed
  Invariant,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordError {
  pub kind: RecordErrorKind,
  pub message: String,
}

/// Aggregate per-API output
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgressRecord {
  pub api_name: String,
  pub repository: String,
  /// `None` only for error entries
  pub state: Option<ReleaseState>,
  pub track: ReleaseTrack,
  pub maturity: Maturity,
  pub target_release_type: ReleaseType,
  #[serde(default)]
  pub target_release_tag: Option<String>,
  #[serde(default)]
  pub target_version: Option<String>,
  #[serde(default)]
  pub meta_release: Option<String>,
  #[serde(default)]
  pub milestones: MilestoneRecord,
  #[serde(default)]
  pub artifacts: RecordArtifacts,
  #[serde(default)]
  pub published_context: PublishedContext,
  #[serde(default)]
  pub warnings: Vec<Warning>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub error: Option<RecordError>,
}

impl ProgressRecord {
  /// Record carrying only plan fields; state and derived parts filled by the caller
  pub fn from_entry(entry: &ReleasePlanEntry) -> Self {
    Self {
      api_name: entry.api_name.clone(),
      repository: entry.repository.clone(),
      state: None,
      track: entry.release_track,
      maturity: entry.maturity,
      target_release_type: entry.target_release_type,
      target_release_tag: entry.target_release_tag.clone(),
      target_version: entry.target_version.clone(),
      meta_release: entry.meta_release.clone(),
      milestones: MilestoneRecord::default(),
      artifacts: RecordArtifacts::default(),
      published_context: PublishedContext::default(),
      warnings: Vec::new(),
      error: None,
    }
  }

  /// Error entry: plan fields only, no state
  pub fn failed(entry: &ReleasePlanEntry, kind: RecordErrorKind, message: impl Into<String>) -> Self {
    Self {
      error: Some(RecordError {
        kind,
        message: message.into(),
      }),
      ..Self::from_entry(entry)
    }
  }

  pub fn is_error(&self) -> bool {
    self.error.is_some()
  }
}
