//! Tracker configuration (progress.toml)
//!
//! Searched in order: progress.toml, .progress.toml, .config/progress.toml.
//! A missing file means defaults everywhere. Dates are quoted strings
//! (`"2025-06-01"`) so they deserialize through chrono.

use crate::core::error::{ConfigError, ProgressError, ProgressResult};
use crate::source::retry::RetryPolicy;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Default pre-release naming convention for M3 tags
pub const DEFAULT_PRE_RELEASE_PATTERN: &str = r"-(alpha|beta|rc)(\.\d+)?$";

/// Configuration for release-progress
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TrackerConfig {
  #[serde(default)]
  pub collector: CollectorConfig,
  #[serde(default)]
  pub milestones: MilestoneConfig,
  /// Known API renames: old name -> new name
  #[serde(default)]
  pub renames: BTreeMap<String, String>,
  #[serde(default)]
  pub meta_releases: Vec<MetaReleaseConfig>,
}

/// Collection run settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CollectorConfig {
  /// GitHub organization owning the API repositories
  #[serde(default = "default_org")]
  pub org: String,

  /// Maximum repositories fetched in parallel
  #[serde(default = "default_max_concurrency")]
  pub max_concurrency: usize,

  /// Retries per repository after the first attempt
  #[serde(default = "default_max_retries")]
  pub max_retries: u32,

  #[serde(default = "default_initial_backoff_ms")]
  pub initial_backoff_ms: u64,

  #[serde(default = "default_max_backoff_ms")]
  pub max_backoff_ms: u64,

  /// Global deadline for the whole collection (0 = none)
  #[serde(default = "default_timeout_secs")]
  pub timeout_secs: u64,
}

fn default_org() -> String {
  "camaraproject".to_string()
}

fn default_max_concurrency() -> usize {
  8
}

fn default_max_retries() -> u32 {
  3
}

fn default_initial_backoff_ms() -> u64 {
  500
}

fn default_max_backoff_ms() -> u64 {
  8_000
}

fn default_timeout_secs() -> u64 {
  600
}

impl Default for CollectorConfig {
  fn default() -> Self {
    Self {
      org: default_org(),
      max_concurrency: default_max_concurrency(),
      max_retries: default_max_retries(),
      initial_backoff_ms: default_initial_backoff_ms(),
      max_backoff_ms: default_max_backoff_ms(),
      timeout_secs: default_timeout_secs(),
    }
  }
}

impl CollectorConfig {
  pub fn retry_policy(&self) -> RetryPolicy {
    RetryPolicy {
      max_retries: self.max_retries,
      initial_backoff: Duration::from_millis(self.initial_backoff_ms),
      max_backoff: Duration::from_millis(self.max_backoff_ms),
    }
  }

  pub fn timeout(&self) -> Option<Duration> {
    (self.timeout_secs > 0).then(|| Duration::from_secs(self.timeout_secs))
  }
}

/// Milestone derivation settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MilestoneConfig {
  /// Regex a tag name must match to count as a pre-release
  #[serde(default = "default_pre_release_pattern")]
  pub pre_release_pattern: String,
}

fn default_pre_release_pattern() -> String {
  DEFAULT_PRE_RELEASE_PATTERN.to_string()
}

impl Default for MilestoneConfig {
  fn default() -> Self {
    Self {
      pre_release_pattern: default_pre_release_pattern(),
    }
  }
}

/// Inclusive calendar date range
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateWindow {
  pub start: NaiveDate,
  pub end: NaiveDate,
}

impl DateWindow {
  pub fn contains(&self, date: NaiveDate) -> bool {
    self.start <= date && date <= self.end
  }
}

/// Dates of one meta-release cycle
///
/// ```toml
/// [[meta_releases]]
/// name = "Fall25"
/// m1 = "2025-06-01"
/// m3 = { start = "2025-07-01", end = "2025-08-15" }
/// m4 = { start = "2025-09-01", end = "2025-09-30" }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetaReleaseConfig {
  pub name: String,
  /// Plan commitment date
  #[serde(default)]
  pub m1: Option<NaiveDate>,
  /// Pre-release window
  #[serde(default)]
  pub m3: Option<DateWindow>,
  /// Public release window
  #[serde(default)]
  pub m4: Option<DateWindow>,
}

impl TrackerConfig {
  /// Find config file in search order
  pub fn find_config_path(path: &Path) -> Option<PathBuf> {
    let candidates = [
      path.join("progress.toml"),
      path.join(".progress.toml"),
      path.join(".config").join("progress.toml"),
    ];

    candidates.into_iter().find(|p| p.exists())
  }

  /// Load an explicit config file, or search `dir`, falling back to defaults
  pub fn load_or_default(dir: &Path, explicit: Option<&Path>) -> ProgressResult<Self> {
    match explicit {
      Some(path) => Self::load(path),
      None => match Self::find_config_path(dir) {
        Some(path) => Self::load(&path),
        None => {
          tracing::debug!("no progress.toml under {}, using defaults", dir.display());
          Ok(Self::default())
        }
      },
    }
  }

  /// Load and validate a config file
  pub fn load(path: &Path) -> ProgressResult<Self> {
    if !path.exists() {
      return Err(ConfigError::NotFound {
        path: path.to_path_buf(),
      }
      .into());
    }

    let content = fs::read_to_string(path)?;
    let config: TrackerConfig = toml_edit::de::from_str(&content).map_err(|e| ConfigError::Parse {
      path: path.to_path_buf(),
      reason: e.to_string(),
    })?;

    config.validate().map_err(|e| match e {
      ProgressError::Config(ConfigError::InvalidField { field, reason }) => ConfigError::InvalidField {
        field: format!("{} in {}", field, path.display()),
        reason,
      }
      .into(),
      other => other,
    })?;

    tracing::debug!(
      "loaded {} ({} meta-release(s), {} rename(s))",
      path.display(),
      config.meta_releases.len(),
      config.renames.len()
    );
    Ok(config)
  }

  /// Validate settings that serde cannot express
  pub fn validate(&self) -> ProgressResult<()> {
    if self.collector.max_concurrency == 0 {
      return Err(invalid("collector.max_concurrency", "must be at least 1"));
    }

    if self.collector.initial_backoff_ms > self.collector.max_backoff_ms {
      return Err(invalid(
        "collector.initial_backoff_ms",
        "must not exceed collector.max_backoff_ms",
      ));
    }

    if let Err(e) = regex::Regex::new(&self.milestones.pre_release_pattern) {
      return Err(invalid("milestones.pre_release_pattern", &e.to_string()));
    }

    let mut seen = HashSet::new();
    for meta in &self.meta_releases {
      if !seen.insert(meta.name.as_str()) {
        return Err(invalid("meta_releases", &format!("'{}' is declared twice", meta.name)));
      }
      for (label, window) in [("m3", meta.m3), ("m4", meta.m4)] {
        if let Some(window) = window
          && window.start > window.end
        {
          return Err(invalid(
            &format!("meta_releases.{}.{}", meta.name, label),
            "start is after end",
          ));
        }
      }
    }

    Ok(())
  }

  /// Dates for a named meta-release
  pub fn meta_release(&self, name: &str) -> Option<&MetaReleaseConfig> {
    self.meta_releases.iter().find(|m| m.name == name)
  }
}

fn invalid(field: &str, reason: &str) -> ProgressError {
  ConfigError::InvalidField {
    field: field.to_string(),
    reason: reason.to_string(),
  }
  .into()
}
