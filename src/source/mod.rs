//! Artifact sources
//!
//! A source answers one question: what release artifacts does a repository
//! have right now? `GithubSource` asks the hosting API through the `gh` CLI,
//! `SnapshotSource` replays a recorded file.

pub mod github;
pub mod retry;
pub mod snapshot;

use crate::core::error::FetchError;
use crate::model::artifacts::RepositoryArtifacts;
use std::time::Instant;

pub use github::GithubSource;
pub use snapshot::SnapshotSource;

/// Read-only access to repository artifacts
pub trait ArtifactSource: Send + Sync {
  /// Short name for logs
  fn name(&self) -> &str;

  /// Fetch every release-relevant artifact of `repository`.
  ///
  /// Work still running at `deadline` is abandoned with `FetchError::Timeout`.
  fn fetch(&self, repository: &str, deadline: Option<Instant>) -> Result<RepositoryArtifacts, FetchError>;
}
