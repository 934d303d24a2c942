//! Offline artifact source replaying a recorded snapshot file
//!
//! The file maps repository names to artifacts:
//!
//! ```yaml
//! QualityOnDemand:
//!   tags:
//!     - name: r4.1-rc.1
//!       created_at: 2025-07-21T10:00:00Z
//!   snapshot_branches: [release-snapshot/r4.1-abc1234]
//! ```

use super::ArtifactSource;
use crate::core::error::{FetchError, ProgressResult};
use crate::core::format::read_document;
use crate::model::artifacts::RepositoryArtifacts;
use std::collections::BTreeMap;
use std::path::Path;
use std::time::Instant;

#[derive(Debug, Clone, Default)]
pub struct SnapshotSource {
  repositories: BTreeMap<String, RepositoryArtifacts>,
}

impl SnapshotSource {
  pub fn new(repositories: BTreeMap<String, RepositoryArtifacts>) -> Self {
    Self { repositories }
  }

  /// Load a snapshot file (YAML or JSON)
  pub fn load(path: &Path) -> ProgressResult<Self> {
    let repositories: BTreeMap<String, RepositoryArtifacts> = read_document(path)?;
    tracing::info!("loaded artifacts for {} repositories from {}", repositories.len(), path.display());
    Ok(Self::new(repositories))
  }

}

impl ArtifactSource for SnapshotSource {
  fn name(&self) -> &str {
    "snapshot"
  }

  /// Lookups are in memory; the deadline never binds
  fn fetch(&self, repository: &str, _deadline: Option<Instant>) -> Result<RepositoryArtifacts, FetchError> {
    self
      .repositories
      .get(repository)
      .cloned()
      .ok_or_else(|| FetchError::NotFound {
        repository: repository.to_string(),
      })
  }
}
