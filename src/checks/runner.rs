//! Warning engine: runs every registered rule against a record

use super::trait_def::{Check, WarningContext};
use crate::model::record::Warning;
use std::sync::Arc;

/// Registry of warning rules
#[derive(Clone, Default)]
pub struct WarningEngine {
  checks: Vec<Arc<dyn Check>>,
}

impl WarningEngine {
  /// Create an engine with no rules
  pub fn new() -> Self {
    Self { checks: Vec::new() }
  }

  pub fn add_check(&mut self, check: Arc<dyn Check>) {
    self.checks.push(check);
  }

  /// Run all rules; warnings come back sorted by code
  pub fn run_all(&self, ctx: &WarningContext<'_>) -> Vec<Warning> {
    let mut warnings: Vec<Warning> = self
      .checks
      .iter()
      .filter_map(|check| {
        let warning = check.run(ctx);
        if let Some(w) = &warning {
          tracing::debug!("{}: {} ({}) {}", ctx.entry.api_name, w.code, check.name(), w.message);
        }
        warning
      })
      .collect();
    warnings.sort_by(|a, b| a.code.cmp(&b.code));
    warnings
  }

  /// Get all registered rules
  pub fn checks(&self) -> &[Arc<dyn Check>] {
    &self.checks
  }
}

/// Create an engine with all built-in rules
pub fn create_default_engine() -> WarningEngine {
  let mut engine = WarningEngine::new();

  engine.add_check(Arc::new(super::published_version::PublishedVersionCheck));
  engine.add_check(Arc::new(super::orphaned::OrphanedArtifactsCheck));
  engine.add_check(Arc::new(super::renamed::RenamedApiCheck));
  engine.add_check(Arc::new(super::draft_without_snapshot::DraftWithoutSnapshotCheck));
  engine.add_check(Arc::new(super::missing_version::MissingTargetVersionCheck));

  engine
}
