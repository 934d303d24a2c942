//! Warning rule abstraction
//!
//! Every advisory rule implements `Check`. Rules see a read-only view of one
//! record's inputs and derived state, and return at most one warning. They
//! cannot change the state.

use crate::model::artifacts::ArtifactView;
use crate::model::plan::ReleasePlanEntry;
use crate::model::record::Warning;
use crate::model::state::ReleaseState;
use std::collections::BTreeMap;

/// Inputs available to warning rules
#[derive(Debug, Clone, Copy)]
pub struct WarningContext<'a> {
  pub entry: &'a ReleasePlanEntry,
  pub view: &'a ArtifactView<'a>,
  /// State already derived for the entry
  pub state: ReleaseState,
  /// Known API renames: old name -> new name
  pub renames: &'a BTreeMap<String, String>,
}

/// Advisory warning rule
///
/// # Example
///
/// ```rust,ignore
/// struct NoMetaRelease;
///
/// impl Check for NoMetaRelease {
///   fn code(&self) -> &'static str { "W100" }
///   fn name(&self) -> &'static str { "no-meta-release" }
///   fn description(&self) -> &'static str { "Entry is not assigned to a meta-release" }
///
///   fn run(&self, ctx: &WarningContext<'_>) -> Option<Warning> {
///     ctx.entry.meta_release.is_none().then(|| Warning::info(self.code(), "no meta-release"))
///   }
/// }
/// ```
pub trait Check: Send + Sync {
  /// Stable warning code, e.g. `W001`
  fn code(&self) -> &'static str;

  /// Unique name for this rule (kebab-case)
  fn name(&self) -> &'static str;

  /// Human-readable description of what this rule flags
  fn description(&self) -> &'static str;

  /// Evaluate the rule for one record
  fn run(&self, ctx: &WarningContext<'_>) -> Option<Warning>;
}
