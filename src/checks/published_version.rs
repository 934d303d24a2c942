//! W001: published tag carries a different version than planned

use super::trait_def::{Check, WarningContext};
use crate::model::record::Warning;
use crate::model::state::ReleaseState;
use crate::release::tags::ReleaseTag;
use semver::{Prerelease, Version};

pub struct PublishedVersionCheck;

fn release_core(version: &Version) -> Version {
  let mut core = version.clone();
  core.pre = Prerelease::EMPTY;
  core
}

impl Check for PublishedVersionCheck {
  fn code(&self) -> &'static str {
    "W001"
  }

  fn name(&self) -> &'static str {
    "published-version-mismatch"
  }

  fn description(&self) -> &'static str {
    "Published release tag version differs from the planned target version"
  }

  fn run(&self, ctx: &WarningContext<'_>) -> Option<Warning> {
    if ctx.state != ReleaseState::Published {
      return None;
    }
    let target = release_core(&ctx.entry.target_semver()?);

    let mismatch = ctx
      .view
      .release_tags
      .iter()
      .filter_map(|tag| ReleaseTag::parse(&tag.name))
      .find(|tag| release_core(&tag.version) != target)?;

    Some(Warning::warning(
      self.code(),
      format!(
        "Published tag '{}' carries version {}, plan targets {}",
        mismatch.tag_name, mismatch.version, target
      ),
    ))
  }
}
