//! Repository artifacts relevant to release tracking
//!
//! `RepositoryArtifacts` is what a source returns for one repository.
//! `ArtifactView` narrows it to one plan entry's target: the matching release
//! tags, snapshot branch, draft release and release pull request.

use crate::model::plan::ReleasePlanEntry;
use crate::release::tags;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Branch prefix for release snapshot branches
pub const SNAPSHOT_PREFIX: &str = "release-snapshot/";

/// A git tag with its creation time
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagInfo {
  pub name: String,
  #[serde(default)]
  pub created_at: Option<DateTime<Utc>>,
  #[serde(default)]
  pub url: Option<String>,
}

/// An unpublished release object
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DraftRelease {
  #[serde(default)]
  pub name: Option<String>,
  #[serde(default)]
  pub tag_name: Option<String>,
  #[serde(default)]
  pub url: Option<String>,
}

impl DraftRelease {
  /// Display reference: name, falling back to the tag name
  pub fn reference(&self) -> Option<&str> {
    self.name.as_deref().or(self.tag_name.as_deref())
  }
}

/// An open pull request targeting a snapshot branch
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReleasePr {
  pub number: u64,
  pub url: String,
  /// Base branch of the pull request
  pub base: String,
}

/// An open issue labelled `release-issue`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReleaseIssue {
  pub number: u64,
  pub url: String,
}

/// Everything observed in one repository at collection time
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepositoryArtifacts {
  #[serde(default)]
  pub tags: Vec<TagInfo>,
  /// Branch names under `release-snapshot/`
  #[serde(default)]
  pub snapshot_branches: Vec<String>,
  #[serde(default)]
  pub draft_releases: Vec<DraftRelease>,
  #[serde(default)]
  pub release_prs: Vec<ReleasePr>,
  #[serde(default)]
  pub release_issue: Option<ReleaseIssue>,
}

/// Artifacts narrowed to one plan entry
#[derive(Debug, Clone)]
pub struct ArtifactView<'a> {
  /// Tags that fulfil the entry's target
  pub release_tags: Vec<&'a TagInfo>,
  /// Every tag in the repository (milestone windows look beyond the target)
  pub all_tags: &'a [TagInfo],
  pub snapshot_branch: Option<&'a str>,
  pub draft_release: Option<&'a DraftRelease>,
  pub release_pr: Option<&'a ReleasePr>,
  /// Repository-wide; not tied to the target
  pub release_issue: Option<&'a ReleaseIssue>,
}

impl<'a> ArtifactView<'a> {
  pub fn new(entry: &ReleasePlanEntry, artifacts: &'a RepositoryArtifacts) -> Self {
    let target_tag = entry.target_release_tag.as_deref();
    let target_version = entry.target_semver();

    let mut release_tags: Vec<&TagInfo> = artifacts
      .tags
      .iter()
      .filter(|tag| tags::tag_matches_target(&tag.name, target_tag, target_version.as_ref()))
      .collect();
    release_tags.sort_by(|a, b| a.name.cmp(&b.name));

    let snapshot_branch = tags::find_matching_snapshot(&artifacts.snapshot_branches, target_tag);
    let draft_release = artifacts
      .draft_releases
      .iter()
      .find(|draft| tags::draft_matches_target(draft, target_tag));
    let release_pr = snapshot_branch.and_then(|branch| artifacts.release_prs.iter().find(|pr| pr.base == branch));

    Self {
      release_tags,
      all_tags: &artifacts.tags,
      snapshot_branch,
      draft_release,
      release_pr,
      release_issue: artifacts.release_issue.as_ref(),
    }
  }

  pub fn has_snapshot_branch(&self) -> bool {
    self.snapshot_branch.is_some()
  }

  pub fn has_draft_release(&self) -> bool {
    self.draft_release.is_some()
  }

  pub fn draft_release_ref(&self) -> Option<&'a str> {
    self.draft_release.and_then(|d| d.reference())
  }
}
