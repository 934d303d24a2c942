//! Progress collection: fetch, derive, aggregate
//!
//! Entries are grouped by repository so each repository is fetched once.
//! Repositories are processed on a bounded rayon pool; results are sorted by
//! API name afterwards so completion order never shows in the output.

use super::schema;
use crate::checks::{WarningContext, WarningEngine, create_default_engine};
use crate::core::config::{CollectorConfig, TrackerConfig};
use crate::core::error::{FetchError, ProgressResult};
use crate::model::artifacts::{ArtifactView, RepositoryArtifacts};
use crate::model::document::{
  COLLECTOR_VERSION, ProgressDocument, RunMetadata, SCHEMA_VERSION, StateCounts, records_digest,
};
use crate::model::plan::{MasterSchedule, ReleasePlanEntry};
use crate::model::record::{ProgressRecord, RecordArtifacts, RecordErrorKind};
use crate::release::milestones::{MilestoneDeriver, summarize_meta_releases};
use crate::release::state::derive_state;
use crate::source::ArtifactSource;
use crate::source::retry::{RetryPolicy, fetch_with_retry};
use crate::ui::progress::FetchProgress;
use rayon::prelude::*;
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Run limits for one collection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CollectorOptions {
  /// Repositories processed in parallel (at least 1)
  pub max_concurrency: usize,
  pub retry: RetryPolicy,
  /// Global deadline measured from the start of `collect`
  pub timeout: Option<Duration>,
}

impl CollectorOptions {
  pub fn from_config(config: &CollectorConfig) -> Self {
    Self {
      max_concurrency: config.max_concurrency.max(1),
      retry: config.retry_policy(),
      timeout: config.timeout(),
    }
  }
}

/// Records produced for one repository
struct RepositoryOutcome {
  records: Vec<ProgressRecord>,
  source_calls: u64,
  timed_out: bool,
}

pub struct Collector {
  source: Arc<dyn ArtifactSource>,
  milestones: MilestoneDeriver,
  warnings: WarningEngine,
  renames: BTreeMap<String, String>,
  options: CollectorOptions,
  show_progress: bool,
}

impl Collector {
  /// Collector with the built-in warning rules
  pub fn new(source: Arc<dyn ArtifactSource>, config: &TrackerConfig) -> ProgressResult<Self> {
    Ok(Self {
      source,
      milestones: MilestoneDeriver::from_config(config)?,
      warnings: create_default_engine(),
      renames: config.renames.clone(),
      options: CollectorOptions::from_config(&config.collector),
      show_progress: false,
    })
  }

  #[cfg(test)]
  pub fn with_warnings(mut self, warnings: WarningEngine) -> Self {
    self.warnings = warnings;
    self
  }

  #[cfg(test)]
  pub fn with_options(mut self, options: CollectorOptions) -> Self {
    self.options = CollectorOptions {
      max_concurrency: options.max_concurrency.max(1),
      ..options
    };
    self
  }

  /// Draw a progress bar on an interactive stderr
  pub fn with_progress(mut self, show: bool) -> Self {
    self.show_progress = show;
    self
  }

  /// Collect a validated progress document for every schedule entry
  pub fn collect(&self, schedule: &MasterSchedule) -> ProgressResult<ProgressDocument> {
    let started = Instant::now();
    let deadline = self.options.timeout.map(|timeout| started + timeout);
    let groups = group_by_repository(schedule.entries());

    tracing::info!(
      "collecting {} APIs from {} repositories via {} (concurrency {})",
      schedule.len(),
      groups.len(),
      self.source.name(),
      self.options.max_concurrency
    );

    let progress = if self.show_progress {
      FetchProgress::new(groups.len(), "Fetching repositories")
    } else {
      FetchProgress::hidden()
    };

    let pool = rayon::ThreadPoolBuilder::new()
      .num_threads(self.options.max_concurrency)
      .build()?;

    let outcomes: Vec<RepositoryOutcome> = pool.install(|| {
      groups
        .par_iter()
        .map(|(repository, entries)| {
          let outcome = self.process_repository(repository, entries, deadline);
          progress.inc();
          outcome
        })
        .collect()
    });

    let mut records = Vec::with_capacity(schedule.len());
    let mut source_calls = 0;
    let mut timed_out = false;
    for outcome in outcomes {
      records.extend(outcome.records);
      source_calls += outcome.source_calls;
      timed_out |= outcome.timed_out;
    }
    records.sort_by(|a, b| a.api_name.cmp(&b.api_name));

    if timed_out {
      tracing::warn!("collection deadline passed; remaining repositories recorded as timeouts");
    }

    let document = build_document(records, groups.len(), source_calls, started.elapsed(), timed_out)?;
    schema::validate_document(&document)?;

    tracing::info!(
      "collected {} records ({} errors) in {:.1}s",
      document.metadata.total_apis,
      document.metadata.error_count,
      document.metadata.duration_seconds
    );
    Ok(document)
  }

  fn process_repository(
    &self,
    repository: &str,
    entries: &[&ReleasePlanEntry],
    deadline: Option<Instant>,
  ) -> RepositoryOutcome {
    let outcome = fetch_with_retry(self.source.as_ref(), repository, &self.options.retry, deadline);
    let source_calls = u64::from(outcome.attempts);

    match outcome.result {
      Ok(artifacts) => RepositoryOutcome {
        records: entries.iter().map(|entry| self.derive_record(entry, &artifacts)).collect(),
        source_calls,
        timed_out: false,
      },
      Err(err) => {
        let kind = fetch_error_kind(&err);
        tracing::warn!("{}: {} ({} API(s) affected)", repository, err, entries.len());
        RepositoryOutcome {
          records: entries
            .iter()
            .map(|entry| ProgressRecord::failed(entry, kind, err.to_string()))
            .collect(),
          source_calls,
          timed_out: kind == RecordErrorKind::Timeout,
        }
      }
    }
  }

  /// State, milestones and warnings for one entry
  pub fn derive_record(&self, entry: &ReleasePlanEntry, artifacts: &RepositoryArtifacts) -> ProgressRecord {
    let view = ArtifactView::new(entry, artifacts);

    let state = match derive_state(entry, &view) {
      Ok(state) => state,
      Err(violation) => {
        tracing::error!("{}", violation);
        return ProgressRecord::failed(entry, RecordErrorKind::Invariant, violation.to_string());
      }
    };

    let milestones = self.milestones.derive(entry, &view);
    let warnings = self.warnings.run_all(&WarningContext {
      entry,
      view: &view,
      state,
      renames: &self.renames,
    });

    ProgressRecord {
      state: Some(state),
      milestones,
      artifacts: RecordArtifacts::from_view(&view),
      published_context: self.milestones.published_context(&artifacts.tags),
      warnings,
      ..ProgressRecord::from_entry(entry)
    }
  }
}

fn fetch_error_kind(err: &FetchError) -> RecordErrorKind {
  if err.is_timeout() {
    RecordErrorKind::Timeout
  } else {
    RecordErrorKind::Fetch
  }
}

/// Entries per repository, repositories in first-seen order
fn group_by_repository(entries: &[ReleasePlanEntry]) -> Vec<(String, Vec<&ReleasePlanEntry>)> {
  let mut index: HashMap<&str, usize> = HashMap::new();
  let mut groups: Vec<(String, Vec<&ReleasePlanEntry>)> = Vec::new();

  for entry in entries {
    match index.get(entry.repository.as_str()) {
      Some(&i) => groups[i].1.push(entry),
      None => {
        index.insert(entry.repository.as_str(), groups.len());
        groups.push((entry.repository.clone(), vec![entry]));
      }
    }
  }
  groups
}

fn build_document(
  records: Vec<ProgressRecord>,
  repositories_scanned: usize,
  source_calls: u64,
  elapsed: Duration,
  timed_out: bool,
) -> ProgressResult<ProgressDocument> {
  let metadata = RunMetadata {
    last_updated: chrono::Utc::now().format("%Y-%m-%dT%H:%M:%SZ").to_string(),
    schema_version: SCHEMA_VERSION.to_string(),
    collector_version: COLLECTOR_VERSION.to_string(),
    total_apis: records.len(),
    state_counts: StateCounts::from_records(&records),
    error_count: records.iter().filter(|r| r.is_error()).count(),
    repositories_scanned,
    source_calls,
    duration_seconds: (elapsed.as_secs_f64() * 10.0).round() / 10.0,
    timed_out,
    records_sha256: records_digest(&records)?,
  };

  Ok(ProgressDocument {
    metadata,
    meta_releases: summarize_meta_releases(&records),
    progress: records,
  })
}
