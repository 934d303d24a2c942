//! W004: draft release exists without a snapshot branch

use super::trait_def::{Check, WarningContext};
use crate::model::record::Warning;

pub struct DraftWithoutSnapshotCheck;

impl Check for DraftWithoutSnapshotCheck {
  fn code(&self) -> &'static str {
    "W004"
  }

  fn name(&self) -> &'static str {
    "draft-without-snapshot"
  }

  fn description(&self) -> &'static str {
    "Draft release for the target exists but no release-snapshot branch does"
  }

  fn run(&self, ctx: &WarningContext<'_>) -> Option<Warning> {
    if ctx.view.has_snapshot_branch() {
      return None;
    }
    let draft = ctx.view.draft_release_ref()?;
    Some(Warning::info(
      self.code(),
      format!("Draft release '{}' has no matching snapshot branch", draft),
    ))
  }
}
