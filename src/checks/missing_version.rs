//! W005: planned release without a target version

use super::trait_def::{Check, WarningContext};
use crate::model::record::Warning;

pub struct MissingTargetVersionCheck;

impl Check for MissingTargetVersionCheck {
  fn code(&self) -> &'static str {
    "W005"
  }

  fn name(&self) -> &'static str {
    "missing-target-version"
  }

  fn description(&self) -> &'static str {
    "Release is planned but the schedule gives no target version"
  }

  fn run(&self, ctx: &WarningContext<'_>) -> Option<Warning> {
    if ctx.entry.target_release_type.is_none() || ctx.entry.target_version.is_some() {
      return None;
    }
    Some(Warning::info(
      self.code(),
      format!(
        "'{}' plans a {} release without target_version",
        ctx.entry.api_name, ctx.entry.target_release_type
      ),
    ))
  }
}
