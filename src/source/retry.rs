//! Bounded retry with exponential backoff for artifact fetches

use super::ArtifactSource;
use crate::core::error::FetchError;
use crate::model::artifacts::RepositoryArtifacts;
use std::time::{Duration, Instant};

/// How often and how patiently to retry transient failures
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
  /// Retries after the first attempt
  pub max_retries: u32,
  pub initial_backoff: Duration,
  pub max_backoff: Duration,
}

impl RetryPolicy {
  /// Single attempt, no waiting
  #[cfg(test)]
  pub fn none() -> Self {
    Self {
      max_retries: 0,
      initial_backoff: Duration::ZERO,
      max_backoff: Duration::ZERO,
    }
  }

  /// Delay before retry number `retry` (1-based)
  pub fn backoff(&self, retry: u32) -> Duration {
    let factor = 2u32.saturating_pow(retry.saturating_sub(1));
    self.initial_backoff.saturating_mul(factor).min(self.max_backoff)
  }
}

/// Result of a fetch plus the number of source calls it took
#[derive(Debug)]
pub struct FetchOutcome {
  pub result: Result<RepositoryArtifacts, FetchError>,
  pub attempts: u32,
}

/// Fetch `repository`, retrying transient failures until the policy or the
/// deadline runs out
pub fn fetch_with_retry(
  source: &dyn ArtifactSource,
  repository: &str,
  policy: &RetryPolicy,
  deadline: Option<Instant>,
) -> FetchOutcome {
  let timed_out = |attempts| FetchOutcome {
    result: Err(FetchError::Timeout {
      repository: repository.to_string(),
    }),
    attempts,
  };

  let mut attempts = 0;
  loop {
    if deadline.is_some_and(|d| Instant::now() >= d) {
      return timed_out(attempts);
    }

    attempts += 1;
    let err = match source.fetch(repository, deadline) {
      Ok(artifacts) => {
        return FetchOutcome {
          result: Ok(artifacts),
          attempts,
        };
      }
      Err(e) => e,
    };

    let retry = attempts;
    if !err.is_transient() || retry > policy.max_retries {
      if attempts > 1 {
        tracing::error!("{}: giving up on {} after {} attempts: {}", source.name(), repository, attempts, err);
      }
      return FetchOutcome {
        result: Err(err),
        attempts,
      };
    }

    let delay = policy.backoff(retry);
    if deadline.is_some_and(|d| Instant::now() + delay >= d) {
      return timed_out(attempts);
    }

    tracing::warn!(
      "{}: fetching {} failed (attempt {}/{}): {}. Retrying in {:?}...",
      source.name(),
      repository,
      attempts,
      policy.max_retries + 1,
      err,
      delay
    );
    std::thread::sleep(delay);
  }
}
