//! Progress indicator for repository fetches
//!
//! Uses `linya`, which draws to stderr and is safe to share across the
//! worker pool. Nothing is drawn unless stderr is a terminal.

use linya::{Bar, Progress};
use std::io::IsTerminal;
use std::sync::{Arc, Mutex};

/// Thread-safe progress bar over repositories
#[derive(Clone)]
pub struct FetchProgress {
  inner: Option<(Arc<Mutex<Progress>>, Arc<Bar>)>,
}

impl FetchProgress {
  /// Bar with `total` steps, or a no-op when stderr is not interactive
  pub fn new(total: usize, label: impl Into<String>) -> Self {
    if total == 0 || !std::io::stderr().is_terminal() {
      return Self::hidden();
    }
    let mut progress = Progress::new();
    let bar = progress.bar(total, label.into());
    Self {
      inner: Some((Arc::new(Mutex::new(progress)), Arc::new(bar))),
    }
  }

  /// Progress that never draws
  pub fn hidden() -> Self {
    Self { inner: None }
  }

  /// Increment by one (thread-safe)
  pub fn inc(&self) {
    if let Some((progress, bar)) = &self.inner
      && let Ok(mut progress) = progress.lock()
    {
      progress.inc_and_draw(bar, 1);
    }
  }
}
