//! `collect`: build the progress document for a master schedule

use crate::checks::{Check, create_default_engine};
use crate::collect::Collector;
use crate::core::config::TrackerConfig;
use crate::core::error::{ConfigError, ProgressResult};
use crate::core::format::DocumentFormat;
use crate::model::document::ProgressDocument;
use crate::model::plan::MasterSchedule;
use crate::model::record::ProgressRecord;
use crate::model::state::ReleaseState;
use crate::source::{ArtifactSource, GithubSource, SnapshotSource};
use std::collections::BTreeSet;
use std::env;
use std::path::PathBuf;
use std::sync::Arc;

/// Options of the `collect` command
#[derive(Debug, Clone, Default)]
pub struct CollectArgs {
  pub schedule: PathBuf,
  pub config: Option<PathBuf>,
  /// Replay artifacts from a snapshot file instead of querying GitHub
  pub artifacts: Option<PathBuf>,
  pub output: Option<PathBuf>,
  pub format: Option<DocumentFormat>,
  pub concurrency: Option<usize>,
  pub timeout: Option<u64>,
  pub json: bool,
}

/// Run the collect command
pub fn run_collect(args: CollectArgs) -> ProgressResult<()> {
  let current_dir = env::current_dir()?;
  let mut config = TrackerConfig::load_or_default(&current_dir, args.config.as_deref())?;

  if let Some(concurrency) = args.concurrency {
    if concurrency == 0 {
      return Err(
        ConfigError::InvalidField {
          field: "--concurrency".to_string(),
          reason: "must be at least 1".to_string(),
        }
        .into(),
      );
    }
    config.collector.max_concurrency = concurrency;
  }
  if let Some(timeout) = args.timeout {
    config.collector.timeout_secs = timeout;
  }

  let schedule = MasterSchedule::load(&args.schedule)?;
  if schedule.is_empty() {
    tracing::warn!("{} lists no APIs", args.schedule.display());
  }
  warn_unconfigured_meta_releases(&schedule, &config);

  let source: Arc<dyn ArtifactSource> = match &args.artifacts {
    Some(path) => Arc::new(SnapshotSource::load(path)?),
    None => Arc::new(GithubSource::new(config.collector.org.clone())),
  };

  let document = Collector::new(source, &config)?
    .with_progress(!args.json)
    .collect(&schedule)?;

  if let Some(output) = &args.output {
    let format = args.format.unwrap_or_else(|| DocumentFormat::from_path(output));
    document.write(output, format)?;
  }

  if args.json {
    print!("{}", document.render(DocumentFormat::Json)?);
  } else {
    print_summary(&document);
  }

  Ok(())
}

/// Entries naming a meta-release without configured dates get no M1 date and
/// no M3 window
fn warn_unconfigured_meta_releases(schedule: &MasterSchedule, config: &TrackerConfig) {
  let missing: BTreeSet<&str> = schedule
    .entries()
    .iter()
    .filter_map(|entry| entry.meta_release.as_deref())
    .filter(|name| config.meta_release(name).is_none())
    .collect();

  for name in missing {
    tracing::warn!("meta-release '{}' has no [[meta_releases]] entry; M1 dates and M3 windows are unknown", name);
  }
}

fn legend_line(check: &dyn Check) -> String {
  format!("  {} {:<28} {}", check.code(), check.name(), check.description())
}

fn milestone_marks(record: &ProgressRecord) -> String {
  let mark = |met: bool| if met { "✓" } else { "·" };
  format!(
    "{} {} {}",
    mark(record.milestones.m1.is_some()),
    mark(record.milestones.m3.is_some()),
    mark(record.milestones.m4.is_some())
  )
}

fn print_summary(document: &ProgressDocument) {
  println!("\n📊 Release Progress\n");
  println!("{:<32} {:<16} {:<8} {:<8} WARNINGS", "API", "STATE", "TARGET", "M1 M3 M4");
  println!("{:-<100}", "");

  for record in &document.progress {
    let state = match (&record.state, &record.error) {
      (Some(state), _) => state.to_string(),
      (None, Some(error)) => format!("error:{:?}", error.kind).to_lowercase(),
      (None, None) => "-".to_string(),
    };
    let codes: Vec<&str> = record.warnings.iter().map(|w| w.code.as_str()).collect();
    println!(
      "{:<32} {:<16} {:<8} {:<8} {}",
      record.api_name,
      state,
      record.target_release_tag.as_deref().unwrap_or("-"),
      milestone_marks(record),
      codes.join(",")
    );
  }

  let metadata = &document.metadata;
  println!();
  for state in ReleaseState::ALL {
    println!("  {:<16} {}", state, metadata.state_counts.get(state));
  }
  println!("  {:<16} {}", "errors", metadata.error_count);

  for summary in &document.meta_releases {
    println!(
      "\n  {}: M1 {}/{}, M3 {}/{}, M4 {}/{}",
      summary.name,
      summary.m1_achieved,
      summary.total_apis,
      summary.m3_achieved,
      summary.total_apis,
      summary.m4_achieved,
      summary.total_apis
    );
  }

  let seen: BTreeSet<&str> = document
    .progress
    .iter()
    .flat_map(|r| r.warnings.iter().map(|w| w.code.as_str()))
    .collect();
  if !seen.is_empty() {
    println!("\nWarnings:");
    let engine = create_default_engine();
    let mut checks: Vec<_> = engine.checks().iter().filter(|c| seen.contains(c.code())).collect();
    checks.sort_by_key(|c| c.code());
    for check in checks {
      println!("{}", legend_line(&**check));
    }
  }

  if metadata.timed_out {
    println!("\n⚠️  Collection deadline passed; some repositories were not fetched");
  }
  println!(
    "\n{} APIs from {} repositories in {:.1}s",
    metadata.total_apis, metadata.repositories_scanned, metadata.duration_seconds
  );
}
