//! W003: API appears in the rename table

use super::trait_def::{Check, WarningContext};
use crate::model::record::Warning;

pub struct RenamedApiCheck;

impl Check for RenamedApiCheck {
  fn code(&self) -> &'static str {
    "W003"
  }

  fn name(&self) -> &'static str {
    "api-renamed"
  }

  fn description(&self) -> &'static str {
    "API name has a configured successor"
  }

  fn run(&self, ctx: &WarningContext<'_>) -> Option<Warning> {
    let new_name = ctx.renames.get(&ctx.entry.api_name)?;
    Some(Warning::info(
      self.code(),
      format!("API '{}' was renamed to '{}'", ctx.entry.api_name, new_name),
    ))
  }
}
