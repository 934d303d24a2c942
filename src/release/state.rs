//! Release state derivation
//!
//! States are derived by walking an ordered rule list; the first rule whose
//! predicate holds decides the state. Adding a state means adding one rule at
//! the right position.

use crate::core::error::InvariantViolation;
use crate::model::artifacts::ArtifactView;
use crate::model::plan::ReleasePlanEntry;
use crate::model::state::ReleaseState;

/// Predicate over a plan entry and its matched artifacts
pub type RulePredicate = fn(&ReleasePlanEntry, &ArtifactView<'_>) -> bool;

/// One step of the derivation
#[derive(Clone, Copy)]
pub struct Rule {
  pub name: &'static str,
  pub applies: RulePredicate,
  pub state: ReleaseState,
}

/// Derivation rules in priority order
pub const RULES: &[Rule] = &[
  Rule {
    name: "release-type-none",
    applies: release_type_is_none,
    state: ReleaseState::NotPlanned,
  },
  Rule {
    name: "release-tag-exists",
    applies: has_release_tags,
    state: ReleaseState::Published,
  },
  Rule {
    name: "snapshot-and-draft",
    applies: has_snapshot_and_draft,
    state: ReleaseState::DraftReady,
  },
  Rule {
    name: "snapshot-only",
    applies: has_snapshot,
    state: ReleaseState::SnapshotActive,
  },
  Rule {
    name: "plan-only",
    applies: always,
    state: ReleaseState::Planned,
  },
];

fn release_type_is_none(entry: &ReleasePlanEntry, _view: &ArtifactView<'_>) -> bool {
  entry.target_release_type.is_none()
}

fn has_release_tags(_entry: &ReleasePlanEntry, view: &ArtifactView<'_>) -> bool {
  !view.release_tags.is_empty()
}

fn has_snapshot_and_draft(_entry: &ReleasePlanEntry, view: &ArtifactView<'_>) -> bool {
  view.has_snapshot_branch() && view.has_draft_release()
}

fn has_snapshot(_entry: &ReleasePlanEntry, view: &ArtifactView<'_>) -> bool {
  view.has_snapshot_branch()
}

fn always(_entry: &ReleasePlanEntry, _view: &ArtifactView<'_>) -> bool {
  true
}

/// Derive the release state of one API
pub fn derive_state(entry: &ReleasePlanEntry, view: &ArtifactView<'_>) -> Result<ReleaseState, InvariantViolation> {
  derive_with_rules(RULES, entry, view)
}

/// Walk `rules` in order and verify the result's post-conditions
pub fn derive_with_rules(
  rules: &[Rule],
  entry: &ReleasePlanEntry,
  view: &ArtifactView<'_>,
) -> Result<ReleaseState, InvariantViolation> {
  let Some(rule) = rules.iter().find(|rule| (rule.applies)(entry, view)) else {
    return Err(InvariantViolation::NoRuleMatched {
      api_name: entry.api_name.clone(),
    });
  };

  tracing::debug!("{}: rule '{}' -> {}", entry.api_name, rule.name, rule.state);
  check_postconditions(entry, view, rule.state)?;
  Ok(rule.state)
}

fn check_postconditions(
  entry: &ReleasePlanEntry,
  view: &ArtifactView<'_>,
  state: ReleaseState,
) -> Result<(), InvariantViolation> {
  match state {
    ReleaseState::NotPlanned if !entry.target_release_type.is_none() => Err(InvariantViolation::NotPlannedWithoutNone {
      api_name: entry.api_name.clone(),
      release_type: entry.target_release_type.to_string(),
    }),
    ReleaseState::Published if view.release_tags.is_empty() => Err(InvariantViolation::PublishedWithoutTags {
      api_name: entry.api_name.clone(),
    }),
    _ => Ok(()),
  }
}
