//! GitHub artifact source backed by the `gh` CLI
//!
//! Every request is one `gh api --paginate` call whose `--jq '.[]'` filter
//! flattens paginated arrays into a stream of JSON values. The subprocess runs
//! with an isolated environment: only PATH, HOME and the gh auth variables
//! are passed through. A call still running at the collection deadline is
//! killed.

use super::ArtifactSource;
use crate::core::error::FetchError;
use crate::model::artifacts::{DraftRelease, ReleaseIssue, ReleasePr, RepositoryArtifacts, SNAPSHOT_PREFIX, TagInfo};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use std::collections::HashSet;
use std::io::{self, Read};
use std::process::{Child, Command, ExitStatus, Stdio};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

/// Environment variables forwarded to `gh`
const FORWARDED_ENV: &[&str] = &["PATH", "HOME", "GH_TOKEN", "GITHUB_TOKEN", "GH_HOST", "GH_CONFIG_DIR"];

/// How often a running `gh` call is checked against the deadline
const POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Label marking the issue that tracks a repository's release
const RELEASE_ISSUE_LABEL: &str = "release-issue";

#[derive(Debug, Deserialize)]
struct GhRelease {
  tag_name: String,
  #[serde(default)]
  name: Option<String>,
  #[serde(default)]
  draft: bool,
  #[serde(default)]
  html_url: Option<String>,
  #[serde(default)]
  created_at: Option<DateTime<Utc>>,
  #[serde(default)]
  published_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Deserialize)]
struct GhTag {
  name: String,
}

#[derive(Debug, Deserialize)]
struct GhBranch {
  name: String,
}

#[derive(Debug, Deserialize)]
struct GhRef {
  #[serde(rename = "ref")]
  name: String,
}

#[derive(Debug, Deserialize)]
struct GhPull {
  number: u64,
  html_url: String,
  base: GhRef,
}

#[derive(Debug, Deserialize)]
struct GhIssue {
  number: u64,
  html_url: String,
  /// Set when the issues endpoint returns a pull request
  #[serde(default)]
  pull_request: Option<serde_json::Value>,
}

/// Artifact source for repositories of one GitHub organization
#[derive(Debug, Clone)]
pub struct GithubSource {
  org: String,
  program: String,
}

impl GithubSource {
  pub fn new(org: impl Into<String>) -> Self {
    Self {
      org: org.into(),
      program: "gh".to_string(),
    }
  }

  /// Use a different executable than `gh` from PATH
  #[cfg(test)]
  pub fn with_program(mut self, program: impl Into<String>) -> Self {
    self.program = program.into();
    self
  }

  /// Create a `gh` command with an isolated environment
  fn gh_cmd(&self) -> Command {
    let mut cmd = Command::new(&self.program);
    cmd.env_clear();
    for key in FORWARDED_ENV {
      if let Ok(value) = std::env::var(key) {
        cmd.env(key, value);
      }
    }
    cmd.env("GH_PROMPT_DISABLED", "1");
    cmd.env("NO_COLOR", "1");
    cmd
  }

  /// Run a paginated `gh api` request and collect its stdout
  fn api(&self, repository: &str, endpoint: &str, deadline: Option<Instant>) -> Result<Vec<u8>, FetchError> {
    let path = format!("repos/{}/{}/{}", self.org, repository, endpoint);
    let command = format!("{} api {}", self.program, path);
    let timeout = || FetchError::Timeout {
      repository: repository.to_string(),
    };
    let failed = |e: io::Error| FetchError::Command {
      command: command.clone(),
      stderr: e.to_string(),
    };

    if deadline.is_some_and(|d| Instant::now() >= d) {
      return Err(timeout());
    }
    tracing::debug!("gh api {}", path);

    let mut child = self
      .gh_cmd()
      .args(["api", "--paginate", "--jq", ".[]", path.as_str()])
      .stdin(Stdio::null())
      .stdout(Stdio::piped())
      .stderr(Stdio::piped())
      .spawn()
      .map_err(failed)?;

    let stdout = drain(child.stdout.take());
    let stderr = drain(child.stderr.take());

    let Some(status) = wait_until(&mut child, deadline).map_err(failed)? else {
      tracing::warn!("{}: killed `{}` at the collection deadline", repository, command);
      return Err(timeout());
    };

    let stdout = stdout.join().unwrap_or_default();
    if !status.success() {
      let stderr = stderr.join().unwrap_or_default();
      return Err(classify_failure(repository, &command, &String::from_utf8_lossy(&stderr)));
    }
    Ok(stdout)
  }
}

/// Read a child pipe to the end on its own thread so the child never stalls
/// on a full pipe
fn drain<R: Read + Send + 'static>(pipe: Option<R>) -> JoinHandle<Vec<u8>> {
  thread::spawn(move || {
    let mut buf = Vec::new();
    if let Some(mut pipe) = pipe {
      let _ = pipe.read_to_end(&mut buf);
    }
    buf
  })
}

/// Wait for `child` to exit. Returns `None` after killing it at the deadline.
fn wait_until(child: &mut Child, deadline: Option<Instant>) -> io::Result<Option<ExitStatus>> {
  let Some(deadline) = deadline else {
    return child.wait().map(Some);
  };

  loop {
    if let Some(status) = child.try_wait()? {
      return Ok(Some(status));
    }
    let now = Instant::now();
    if now >= deadline {
      let _ = child.kill();
      child.wait()?;
      return Ok(None);
    }
    thread::sleep(POLL_INTERVAL.min(deadline - now));
  }
}

impl ArtifactSource for GithubSource {
  fn name(&self) -> &str {
    "github"
  }

  fn fetch(&self, repository: &str, deadline: Option<Instant>) -> Result<RepositoryArtifacts, FetchError> {
    let releases: Vec<GhRelease> = parse_stream(repository, &self.api(repository, "releases", deadline)?)?;
    let tags: Vec<GhTag> = parse_stream(repository, &self.api(repository, "tags", deadline)?)?;
    let branches: Vec<GhBranch> = parse_stream(repository, &self.api(repository, "branches", deadline)?)?;
    let pulls: Vec<GhPull> = parse_stream(repository, &self.api(repository, "pulls?state=open", deadline)?)?;
    let issues_endpoint = format!("issues?labels={}&state=open", RELEASE_ISSUE_LABEL);
    let issues: Vec<GhIssue> = parse_stream(repository, &self.api(repository, &issues_endpoint, deadline)?)?;

    let mut artifacts = assemble(releases, tags, branches, pulls);
    artifacts.release_issue = pick_release_issue(issues);
    tracing::debug!(
      "{}: {} tag(s), {} snapshot branch(es), {} draft(s), {} release PR(s), release issue {:?}",
      repository,
      artifacts.tags.len(),
      artifacts.snapshot_branches.len(),
      artifacts.draft_releases.len(),
      artifacts.release_prs.len(),
      artifacts.release_issue.as_ref().map(|issue| issue.number)
    );
    Ok(artifacts)
  }
}

/// Map a failed `gh` invocation to a fetch error
fn classify_failure(repository: &str, command: &str, stderr: &str) -> FetchError {
  let lower = stderr.to_ascii_lowercase();
  if lower.contains("http 404") || lower.contains("not found") {
    FetchError::NotFound {
      repository: repository.to_string(),
    }
  } else if lower.contains("rate limit") || lower.contains("http 429") {
    FetchError::RateLimited {
      repository: repository.to_string(),
      detail: stderr.trim().to_string(),
    }
  } else {
    FetchError::Command {
      command: command.to_string(),
      stderr: stderr.to_string(),
    }
  }
}

/// Parse a stream of concatenated JSON values (one per line from `--jq`)
fn parse_stream<T: DeserializeOwned>(repository: &str, bytes: &[u8]) -> Result<Vec<T>, FetchError> {
  serde_json::Deserializer::from_slice(bytes)
    .into_iter::<T>()
    .collect::<Result<Vec<_>, _>>()
    .map_err(|e| FetchError::Parse {
      repository: repository.to_string(),
      reason: e.to_string(),
    })
}

/// Newest open release issue; pull requests share the endpoint and are skipped
fn pick_release_issue(issues: Vec<GhIssue>) -> Option<ReleaseIssue> {
  issues
    .into_iter()
    .filter(|issue| issue.pull_request.is_none())
    .max_by_key(|issue| issue.number)
    .map(|issue| ReleaseIssue {
      number: issue.number,
      url: issue.html_url,
    })
}

/// Combine raw API responses into repository artifacts.
///
/// Published releases give tags with dates and URLs; the tags endpoint adds
/// tags that have no release object (undated).
fn assemble(releases: Vec<GhRelease>, tags: Vec<GhTag>, branches: Vec<GhBranch>, pulls: Vec<GhPull>) -> RepositoryArtifacts {
  let mut artifacts = RepositoryArtifacts::default();
  let mut seen = HashSet::new();

  for release in releases {
    if release.draft {
      artifacts.draft_releases.push(DraftRelease {
        name: release.name,
        tag_name: Some(release.tag_name),
        url: release.html_url,
      });
      continue;
    }
    seen.insert(release.tag_name.clone());
    artifacts.tags.push(TagInfo {
      name: release.tag_name,
      created_at: release.published_at.or(release.created_at),
      url: release.html_url,
    });
  }

  for tag in tags {
    if seen.insert(tag.name.clone()) {
      artifacts.tags.push(TagInfo {
        name: tag.name,
        created_at: None,
        url: None,
      });
    }
  }
  artifacts.tags.sort_by(|a, b| a.name.cmp(&b.name));

  artifacts.snapshot_branches = branches
    .into_iter()
    .map(|b| b.name)
    .filter(|name| name.starts_with(SNAPSHOT_PREFIX))
    .collect();
  artifacts.snapshot_branches.sort();

  artifacts.release_prs = pulls
    .into_iter()
    .filter(|pr| pr.base.name.starts_with(SNAPSHOT_PREFIX))
    .map(|pr| ReleasePr {
      number: pr.number,
      url: pr.html_url,
      base: pr.base.name,
    })
    .collect();
  artifacts.release_prs.sort_by_key(|pr| pr.number);

  artifacts
}
