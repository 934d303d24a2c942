//! Master schedule: the declared release intent of every tracked API

use crate::core::error::{ConfigError, ProgressResult};
use crate::core::format::read_document;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::path::Path;
use std::str::FromStr;

/// Declared release type for the current cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ReleaseType {
  Major,
  Minor,
  Patch,
  PreReleaseAlpha,
  PreReleaseRc,
  PublicRelease,
  MaintenanceRelease,
  None,
}

impl ReleaseType {
  pub const ALL: [ReleaseType; 8] = [
    ReleaseType::Major,
    ReleaseType::Minor,
    ReleaseType::Patch,
    ReleaseType::PreReleaseAlpha,
    ReleaseType::PreReleaseRc,
    ReleaseType::PublicRelease,
    ReleaseType::MaintenanceRelease,
    ReleaseType::None,
  ];

  pub fn as_str(self) -> &'static str {
    match self {
      ReleaseType::Major => "major",
      ReleaseType::Minor => "minor",
      ReleaseType::Patch => "patch",
      ReleaseType::PreReleaseAlpha => "pre-release-alpha",
      ReleaseType::PreReleaseRc => "pre-release-rc",
      ReleaseType::PublicRelease => "public-release",
      ReleaseType::MaintenanceRelease => "maintenance-release",
      ReleaseType::None => "none",
    }
  }

  pub fn is_none(self) -> bool {
    self == ReleaseType::None
  }
}

impl fmt::Display for ReleaseType {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

impl FromStr for ReleaseType {
  type Err = String;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    let normalized = s.trim().to_ascii_lowercase().replace('_', "-");
    ReleaseType::ALL
      .into_iter()
      .find(|t| t.as_str() == normalized)
      .ok_or_else(|| s.to_string())
  }
}

/// API maturity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Maturity {
  #[default]
  Initial,
  Stable,
}

/// Whether the API follows the meta-release cadence
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ReleaseTrack {
  #[default]
  MetaRelease,
  Independent,
}

/// One API's declared intent for the current cycle
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReleasePlanEntry {
  pub api_name: String,
  /// Hosting repository (defaults to the API name)
  pub repository: String,
  pub target_release_type: ReleaseType,
  pub target_version: Option<String>,
  /// Release tag the cycle will produce, e.g. `r4.1`
  pub target_release_tag: Option<String>,
  pub meta_release: Option<String>,
  pub release_track: ReleaseTrack,
  pub maturity: Maturity,
  /// Date the plan was committed, if recorded
  pub committed_on: Option<NaiveDate>,
}

impl ReleasePlanEntry {
  /// Parsed target version (validated at load time)
  pub fn target_semver(&self) -> Option<semver::Version> {
    self.target_version.as_deref().and_then(parse_version)
  }
}

/// Accepts `1.2.0` and `v1.2.0`
pub fn parse_version(raw: &str) -> Option<semver::Version> {
  let trimmed = raw.trim();
  let trimmed = trimmed.strip_prefix('v').unwrap_or(trimmed);
  semver::Version::parse(trimmed).ok()
}

/// Schedule entry as written by humans; release type is checked separately
/// so unknown values surface with the API name attached.
#[derive(Debug, Deserialize)]
struct RawPlanEntry {
  api_name: String,
  #[serde(default)]
  repository: Option<String>,
  #[serde(default)]
  target_release_type: Option<String>,
  #[serde(default)]
  target_version: Option<String>,
  #[serde(default)]
  target_release_tag: Option<String>,
  #[serde(default)]
  meta_release: Option<String>,
  #[serde(default)]
  release_track: ReleaseTrack,
  #[serde(default)]
  maturity: Maturity,
  #[serde(default)]
  committed_on: Option<NaiveDate>,
}

#[derive(Debug, Deserialize)]
struct RawSchedule {
  #[serde(default)]
  apis: Vec<RawPlanEntry>,
}

/// Ordered collection of plan entries, unique by API name
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MasterSchedule {
  entries: Vec<ReleasePlanEntry>,
}

impl MasterSchedule {
  /// Load a schedule file (YAML or JSON)
  pub fn load(path: &Path) -> ProgressResult<Self> {
    let raw: RawSchedule = read_document(path)?;
    let schedule = Self::from_raw(raw)?;
    tracing::info!("loaded {} plan entries from {}", schedule.len(), path.display());
    Ok(schedule)
  }

  /// Build from already-validated entries
  pub fn new(entries: Vec<ReleasePlanEntry>) -> ProgressResult<Self> {
    let mut seen = HashSet::new();
    for entry in &entries {
      if !seen.insert(entry.api_name.as_str()) {
        return Err(
          ConfigError::DuplicateApi {
            api_name: entry.api_name.clone(),
          }
          .into(),
        );
      }
    }
    Ok(Self { entries })
  }

  fn from_raw(raw: RawSchedule) -> ProgressResult<Self> {
    let mut entries = Vec::with_capacity(raw.apis.len());

    for api in raw.apis {
      let Some(type_str) = api.target_release_type.as_deref() else {
        return Err(ConfigError::MissingReleaseType { api_name: api.api_name }.into());
      };
      let target_release_type = type_str.parse::<ReleaseType>().map_err(|value| ConfigError::UnknownReleaseType {
        api_name: api.api_name.clone(),
        value,
      })?;

      if let Some(version) = &api.target_version
        && parse_version(version).is_none()
      {
        return Err(
          ConfigError::InvalidVersion {
            api_name: api.api_name.clone(),
            value: version.clone(),
          }
          .into(),
        );
      }

      entries.push(ReleasePlanEntry {
        repository: api.repository.unwrap_or_else(|| api.api_name.clone()),
        api_name: api.api_name,
        target_release_type,
        target_version: api.target_version,
        target_release_tag: api.target_release_tag.filter(|t| !t.trim().is_empty()),
        meta_release: api.meta_release,
        release_track: api.release_track,
        maturity: api.maturity,
        committed_on: api.committed_on,
      });
    }

    Self::new(entries)
  }

  pub fn entries(&self) -> &[ReleasePlanEntry] {
    &self.entries
  }

  pub fn len(&self) -> usize {
    self.entries.len()
  }

  pub fn is_empty(&self) -> bool {
    self.entries.is_empty()
  }
}
