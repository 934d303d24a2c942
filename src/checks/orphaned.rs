//! W002: release artifacts exist for an API that is not planned

use super::trait_def::{Check, WarningContext};
use crate::model::record::Warning;
use crate::model::state::ReleaseState;

pub struct OrphanedArtifactsCheck;

impl Check for OrphanedArtifactsCheck {
  fn code(&self) -> &'static str {
    "W002"
  }

  fn name(&self) -> &'static str {
    "orphaned-artifacts"
  }

  fn description(&self) -> &'static str {
    "Release tags, snapshot branches or drafts exist although no release is planned"
  }

  fn run(&self, ctx: &WarningContext<'_>) -> Option<Warning> {
    if ctx.state != ReleaseState::NotPlanned {
      return None;
    }

    let view = ctx.view;
    let mut found = Vec::new();
    if let Some(tag) = view.release_tags.first() {
      found.push(format!("tag '{}'", tag.name));
    }
    if let Some(branch) = view.snapshot_branch {
      found.push(format!("branch '{}'", branch));
    }
    if let Some(draft) = view.draft_release_ref() {
      found.push(format!("draft '{}'", draft));
    }
    if found.is_empty() {
      return None;
    }

    Some(Warning::warning(
      self.code(),
      format!("No release planned but found {}", found.join(", ")),
    ))
  }
}
