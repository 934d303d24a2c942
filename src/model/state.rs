use serde::{Deserialize, Serialize};
use std::fmt;

/// Release progress of one API, derived from repository artifacts
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReleaseState {
  /// Plan declares `target_release_type: none`
  NotPlanned,
  /// Target release tag exists
  Published,
  /// Snapshot branch and draft release exist
  DraftReady,
  /// Snapshot branch exists, no draft release yet
  SnapshotActive,
  /// Plan exists, no artifacts yet
  Planned,
}

impl ReleaseState {
  /// All states in derivation priority order
  pub const ALL: [ReleaseState; 5] = [
    ReleaseState::NotPlanned,
    ReleaseState::Published,
    ReleaseState::DraftReady,
    ReleaseState::SnapshotActive,
    ReleaseState::Planned,
  ];

  pub fn as_str(self) -> &'static str {
    match self {
      ReleaseState::NotPlanned => "not_planned",
      ReleaseState::Published => "published",
      ReleaseState::DraftReady => "draft_ready",
      ReleaseState::SnapshotActive => "snapshot_active",
      ReleaseState::Planned => "planned",
    }
  }
}

impl fmt::Display for ReleaseState {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}
