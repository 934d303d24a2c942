//! Milestone derivation (M1 plan committed, M3 pre-release, M4 public release)
//!
//! Each milestone is computed on its own from the plan entry, the matched
//! artifacts and the entry's meta-release dates. A missing milestone means
//! "not yet met".

use crate::core::config::{MetaReleaseConfig, TrackerConfig};
use crate::core::error::{ConfigError, ProgressResult};
use crate::model::artifacts::{ArtifactView, TagInfo};
use crate::model::document::MetaReleaseSummary;
use crate::model::plan::ReleasePlanEntry;
use crate::model::record::{M1, M3, M4, M4Kind, MilestoneRecord, ProgressRecord, PublishedContext};
use crate::release::tags::PreReleaseMatcher;
use std::cmp::Ordering;
use std::collections::BTreeMap;

/// Derives milestones for plan entries
#[derive(Debug, Clone)]
pub struct MilestoneDeriver {
  matcher: PreReleaseMatcher,
  meta_releases: Vec<MetaReleaseConfig>,
}

impl MilestoneDeriver {
  pub fn new(matcher: PreReleaseMatcher, meta_releases: Vec<MetaReleaseConfig>) -> Self {
    Self { matcher, meta_releases }
  }

  pub fn from_config(config: &TrackerConfig) -> ProgressResult<Self> {
    let matcher = PreReleaseMatcher::new(&config.milestones.pre_release_pattern).map_err(|e| ConfigError::InvalidField {
      field: "milestones.pre_release_pattern".to_string(),
      reason: e.to_string(),
    })?;
    Ok(Self::new(matcher, config.meta_releases.clone()))
  }

  fn meta_release(&self, entry: &ReleasePlanEntry) -> Option<&MetaReleaseConfig> {
    let name = entry.meta_release.as_deref()?;
    self.meta_releases.iter().find(|m| m.name == name)
  }

  pub fn derive(&self, entry: &ReleasePlanEntry, view: &ArtifactView<'_>) -> MilestoneRecord {
    let meta = self.meta_release(entry);
    MilestoneRecord {
      m1: Some(self.derive_m1(entry, meta)),
      m3: self.derive_m3(entry, view, meta),
      m4: self.derive_m4(view),
    }
  }

  /// M1 is met as soon as the entry is in the schedule
  fn derive_m1(&self, entry: &ReleasePlanEntry, meta: Option<&MetaReleaseConfig>) -> M1 {
    M1 {
      date: entry.committed_on.or_else(|| meta.and_then(|m| m.m1)),
    }
  }

  /// Latest pre-release tag created inside the M3 window.
  ///
  /// With a target tag only its pre-releases count (`r4.1-rc.1` for `r4.1`);
  /// other APIs sharing the repository may pre-release other targets.
  fn derive_m3(&self, entry: &ReleasePlanEntry, view: &ArtifactView<'_>, meta: Option<&MetaReleaseConfig>) -> Option<M3> {
    let window = meta?.m3?;
    let target_prefix = entry.target_release_tag.as_deref().map(|tag| format!("{}-", tag));

    let best = view
      .all_tags
      .iter()
      .filter(|tag| target_prefix.as_deref().is_none_or(|prefix| tag.name.starts_with(prefix)))
      .filter(|tag| self.matcher.is_pre_release(&tag.name))
      .filter_map(|tag| tag.created_at.map(|created| (tag, created)))
      .filter(|(_, created)| window.contains(created.date_naive()))
      .max_by(|(a, a_created), (b, b_created)| {
        a_created
          .date_naive()
          .cmp(&b_created.date_naive())
          .then_with(|| a.name.cmp(&b.name))
      })?;

    let (tag, created) = best;
    Some(M3 {
      tag: tag.name.clone(),
      date: created,
      url: tag.url.clone(),
    })
  }

  /// A public release tag beats an open release pull request
  fn derive_m4(&self, view: &ArtifactView<'_>) -> Option<M4> {
    let release = view
      .release_tags
      .iter()
      .copied()
      .filter(|tag| !self.matcher.is_pre_release(&tag.name))
      .max_by(|a, b| latest_first(a, b));

    if let Some(tag) = release {
      return Some(M4 {
        kind: M4Kind::Release,
        reference: tag.name.clone(),
        url: tag.url.clone(),
        date: tag.created_at,
      });
    }

    view.release_pr.map(|pr| M4 {
      kind: M4Kind::Pr,
      reference: format!("#{}", pr.number),
      url: Some(pr.url.clone()),
      date: None,
    })
  }

  /// Newest dated public release and pre-release among all repository tags
  pub fn published_context(&self, tags: &[TagInfo]) -> PublishedContext {
    let newest = |pre_release: bool| {
      tags
        .iter()
        .filter(|tag| tag.created_at.is_some())
        .filter(|tag| self.matcher.is_pre_release(&tag.name) == pre_release)
        .max_by(|a, b| latest_first(a, b))
        .map(|tag| tag.name.clone())
    };

    PublishedContext {
      latest_public_release: newest(false),
      newest_pre_release: newest(true),
    }
  }
}

fn latest_first(a: &TagInfo, b: &TagInfo) -> Ordering {
  let a_date = a.created_at.map(|d| d.date_naive());
  let b_date = b.created_at.map(|d| d.date_naive());
  a_date.cmp(&b_date).then_with(|| a.name.cmp(&b.name))
}

/// Milestone counts per meta-release, sorted by name
pub fn summarize_meta_releases(records: &[ProgressRecord]) -> Vec<MetaReleaseSummary> {
  let mut summaries: BTreeMap<&str, MetaReleaseSummary> = BTreeMap::new();

  for record in records {
    let Some(name) = record.meta_release.as_deref() else {
      continue;
    };
    let summary = summaries.entry(name).or_insert_with(|| MetaReleaseSummary {
      name: name.to_string(),
      total_apis: 0,
      m1_achieved: 0,
      m3_achieved: 0,
      m4_achieved: 0,
    });
    summary.total_apis += 1;
    summary.m1_achieved += usize::from(record.milestones.m1.is_some());
    summary.m3_achieved += usize::from(record.milestones.m3.is_some());
    summary.m4_achieved += usize::from(record.milestones.m4.is_some());
  }

  summaries.into_values().collect()
}
