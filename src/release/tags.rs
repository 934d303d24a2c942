//! Tag naming: version extraction, target matching, pre-release detection
//!
//! Handles the tag shapes API repositories use:
//! - `r4.1` (release tags with no embedded version)
//! - `v1.2.3`, `1.2.3`
//! - `api-name@v1.2.3`, `api-name-v1.2.3`

use crate::model::artifacts::{DraftRelease, SNAPSHOT_PREFIX};
use crate::model::plan::parse_version;
use regex::Regex;
use semver::Version;

/// Version information parsed from a tag name
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReleaseTag {
  /// API prefix (empty for bare version tags)
  pub api_name: String,
  pub version: Version,
  pub tag_name: String,
}

impl ReleaseTag {
  /// Parse a tag name to extract the API prefix and version
  pub fn parse(tag_name: &str) -> Option<Self> {
    // api-name@vX.Y.Z
    if let Some((api_name, version_str)) = tag_name.split_once('@')
      && let Some(version) = parse_version(version_str)
    {
      return Some(Self {
        api_name: api_name.to_string(),
        version,
        tag_name: tag_name.to_string(),
      });
    }

    // api-name-vX.Y.Z (last "-v" so dashed names work)
    if let Some(v_pos) = tag_name.rfind("-v")
      && let Ok(version) = tag_name[v_pos + 2..].parse::<Version>()
    {
      return Some(Self {
        api_name: tag_name[..v_pos].to_string(),
        version,
        tag_name: tag_name.to_string(),
      });
    }

    // vX.Y.Z or X.Y.Z
    parse_version(tag_name).map(|version| Self {
      api_name: String::new(),
      version,
      tag_name: tag_name.to_string(),
    })
  }
}

/// Whether a tag fulfils the plan target.
///
/// With a target tag the names must be equal; otherwise the tag's version must
/// equal the target version.
pub fn tag_matches_target(tag_name: &str, target_tag: Option<&str>, target_version: Option<&Version>) -> bool {
  match (target_tag, target_version) {
    (Some(target), _) => tag_name == target,
    (None, Some(version)) => ReleaseTag::parse(tag_name).is_some_and(|t| &t.version == version),
    (None, None) => false,
  }
}

/// Find the snapshot branch for a target tag.
///
/// Snapshot branches are named `release-snapshot/{tag}-{suffix}`. Without a
/// target tag nothing matches: leftover branches belong to an earlier cycle.
pub fn find_matching_snapshot<'a>(branches: &'a [String], target_tag: Option<&str>) -> Option<&'a str> {
  let prefix = format!("{}{}-", SNAPSHOT_PREFIX, target_tag?);
  let mut matching: Vec<&str> = branches
    .iter()
    .map(String::as_str)
    .filter(|b| b.starts_with(&prefix))
    .collect();
  matching.sort_unstable();
  matching.into_iter().next()
}

/// Draft release names usually contain the release tag. No target, no match.
pub fn draft_matches_target(draft: &DraftRelease, target_tag: Option<&str>) -> bool {
  let Some(target) = target_tag else {
    return false;
  };
  let name = draft.name.as_deref().unwrap_or("");
  let tag = draft.tag_name.as_deref().unwrap_or("");
  name.contains(target) || tag.contains(target)
}

/// Pre-release naming convention
#[derive(Debug, Clone)]
pub struct PreReleaseMatcher {
  pattern: Regex,
}

impl PreReleaseMatcher {
  pub fn new(pattern: &str) -> Result<Self, regex::Error> {
    Ok(Self {
      pattern: Regex::new(pattern)?,
    })
  }

  /// A tag is a pre-release when its name matches the pattern or its parsed
  /// semantic version carries a pre-release component
  pub fn is_pre_release(&self, tag_name: &str) -> bool {
    self.pattern.is_match(tag_name) || ReleaseTag::parse(tag_name).is_some_and(|t| !t.version.pre.is_empty())
  }
}
