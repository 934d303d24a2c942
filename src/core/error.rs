//! Error types for release-progress with contextual messages and exit codes
//!
//! Errors fall into two groups. Configuration and schema errors are fatal for
//! the whole run. Fetch errors and derivation invariant violations are
//! recovered per API and end up as error markers in the progress document.

use std::fmt;
use std::io;
use std::path::PathBuf;

/// Exit codes for release-progress
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitCode {
  /// User error (config, schedule, invalid args)
  User = 1,
  /// System error (I/O, external tooling)
  System = 2,
  /// Output document failed schema validation
  Validation = 3,
}

impl ExitCode {
  /// Convert to i32 for process exit
  pub fn as_i32(self) -> i32 {
    self as i32
  }
}

/// Main error type for release-progress
#[derive(Debug)]
pub enum ProgressError {
  /// Malformed configuration or master schedule
  Config(ConfigError),

  /// Artifact lookup failure for one repository
  Fetch(FetchError),

  /// Assembled document does not match the output schema
  Schema(SchemaError),

  /// Internal derivation check failed
  Invariant(InvariantViolation),

  /// I/O errors
  Io(io::Error),

  /// Generic error with message and optional context
  Message {
    message: String,
    context: Option<String>,
    help: Option<String>,
  },
}

impl ProgressError {
  /// Create a simple error message
  pub fn message(msg: impl Into<String>) -> Self {
    ProgressError::Message {
      message: msg.into(),
      context: None,
      help: None,
    }
  }

  /// Add context to an existing error
  pub fn context(self, ctx: impl Into<String>) -> Self {
    let ctx_str = ctx.into();
    match self {
      ProgressError::Message { message, context, help } => ProgressError::Message {
        message,
        context: Some(context.map(|c| format!("{}\n{}", ctx_str, c)).unwrap_or(ctx_str)),
        help,
      },
      ProgressError::Io(err) => ProgressError::Message {
        message: format!("I/O error: {}", err),
        context: Some(ctx_str),
        help: None,
      },
      _ => self,
    }
  }

  /// Get the appropriate exit code for this error
  pub fn exit_code(&self) -> ExitCode {
    match self {
      ProgressError::Config(_) => ExitCode::User,
      ProgressError::Fetch(_) => ExitCode::System,
      ProgressError::Schema(_) => ExitCode::Validation,
      ProgressError::Invariant(_) => ExitCode::System,
      ProgressError::Io(_) => ExitCode::System,
      ProgressError::Message { .. } => ExitCode::User,
    }
  }

  /// Get contextual help message for this error
  pub fn help_message(&self) -> Option<String> {
    match self {
      ProgressError::Config(e) => e.help_message(),
      ProgressError::Fetch(e) => e.help_message(),
      ProgressError::Schema(_) => {
        Some("The document was not written. Run with --debug and report the violations above.".to_string())
      }
      ProgressError::Message { help, .. } => help.clone(),
      _ => None,
    }
  }
}

impl fmt::Display for ProgressError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      ProgressError::Config(e) => write!(f, "{}", e),
      ProgressError::Fetch(e) => write!(f, "{}", e),
      ProgressError::Schema(e) => write!(f, "{}", e),
      ProgressError::Invariant(e) => write!(f, "{}", e),
      ProgressError::Io(e) => write!(f, "I/O error: {}", e),
      ProgressError::Message { message, context, .. } => {
        write!(f, "{}", message)?;
        if let Some(ctx) = context {
          write!(f, "\n{}", ctx)?;
        }
        Ok(())
      }
    }
  }
}

impl std::error::Error for ProgressError {
  fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
    match self {
      ProgressError::Io(e) => Some(e),
      _ => None,
    }
  }
}

impl From<io::Error> for ProgressError {
  fn from(err: io::Error) -> Self {
    ProgressError::Io(err)
  }
}

impl From<String> for ProgressError {
  fn from(msg: String) -> Self {
    ProgressError::message(msg)
  }
}

impl From<&str> for ProgressError {
  fn from(msg: &str) -> Self {
    ProgressError::message(msg)
  }
}

impl From<ConfigError> for ProgressError {
  fn from(err: ConfigError) -> Self {
    ProgressError::Config(err)
  }
}

impl From<FetchError> for ProgressError {
  fn from(err: FetchError) -> Self {
    ProgressError::Fetch(err)
  }
}

impl From<SchemaError> for ProgressError {
  fn from(err: SchemaError) -> Self {
    ProgressError::Schema(err)
  }
}

impl From<InvariantViolation> for ProgressError {
  fn from(err: InvariantViolation) -> Self {
    ProgressError::Invariant(err)
  }
}

impl From<serde_json::Error> for ProgressError {
  fn from(err: serde_json::Error) -> Self {
    ProgressError::message(format!("JSON error: {}", err))
  }
}

impl From<serde_yaml::Error> for ProgressError {
  fn from(err: serde_yaml::Error) -> Self {
    ProgressError::message(format!("YAML error: {}", err))
  }
}

impl From<toml_edit::de::Error> for ProgressError {
  fn from(err: toml_edit::de::Error) -> Self {
    ProgressError::message(format!("TOML deserialization error: {}", err))
  }
}

impl From<rayon::ThreadPoolBuildError> for ProgressError {
  fn from(err: rayon::ThreadPoolBuildError) -> Self {
    ProgressError::message(format!("Failed to build worker pool: {}", err))
  }
}

/// Configuration and master schedule errors. Always fatal, raised before any
/// artifact is fetched.
#[derive(Debug)]
pub enum ConfigError {
  /// File not found
  NotFound { path: PathBuf },

  /// File exists but could not be parsed
  Parse { path: PathBuf, reason: String },

  /// Plan entry without a target_release_type
  MissingReleaseType { api_name: String },

  /// Plan entry with a target_release_type outside the known set
  UnknownReleaseType { api_name: String, value: String },

  /// Two plan entries share an api_name
  DuplicateApi { api_name: String },

  /// target_version is not a semantic version
  InvalidVersion { api_name: String, value: String },

  /// Any other invalid setting
  InvalidField { field: String, reason: String },
}

impl ConfigError {
  fn help_message(&self) -> Option<String> {
    match self {
      ConfigError::NotFound { .. } => Some("Check the path, or pass the file explicitly.".to_string()),
      ConfigError::MissingReleaseType { .. } | ConfigError::UnknownReleaseType { .. } => Some(
        "Valid values: major, minor, patch, pre-release-alpha, pre-release-rc, public-release, maintenance-release, none"
          .to_string(),
      ),
      ConfigError::InvalidVersion { .. } => Some("Use a semantic version such as 1.2.0 or 0.3.0-rc.1".to_string()),
      _ => None,
    }
  }
}

impl fmt::Display for ConfigError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      ConfigError::NotFound { path } => write!(f, "File not found: {}", path.display()),
      ConfigError::Parse { path, reason } => {
        write!(f, "Failed to parse {}: {}", path.display(), reason)
      }
      ConfigError::MissingReleaseType { api_name } => {
        write!(f, "API '{}' has no target_release_type", api_name)
      }
      ConfigError::UnknownReleaseType { api_name, value } => {
        write!(f, "API '{}' has unrecognized target_release_type '{}'", api_name, value)
      }
      ConfigError::DuplicateApi { api_name } => {
        write!(f, "API '{}' is declared more than once in the master schedule", api_name)
      }
      ConfigError::InvalidVersion { api_name, value } => {
        write!(f, "API '{}' has invalid target_version '{}'", api_name, value)
      }
      ConfigError::InvalidField { field, reason } => write!(f, "Invalid {}: {}", field, reason),
    }
  }
}

/// Per-repository artifact lookup failure
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchError {
  /// Repository unknown to the source
  NotFound { repository: String },

  /// Hosting API refused the request for rate limiting
  RateLimited { repository: String, detail: String },

  /// External command failed to run or exited non-zero
  Command { command: String, stderr: String },

  /// Response could not be decoded
  Parse { repository: String, reason: String },

  /// Global collection deadline passed before the lookup finished
  Timeout { repository: String },
}

impl FetchError {
  /// Whether a retry may succeed
  pub fn is_transient(&self) -> bool {
    matches!(self, FetchError::RateLimited { .. } | FetchError::Command { .. })
  }

  /// Whether the error came from the global deadline
  pub fn is_timeout(&self) -> bool {
    matches!(self, FetchError::Timeout { .. })
  }

  fn help_message(&self) -> Option<String> {
    match self {
      FetchError::RateLimited { .. } => Some("Lower [collector].max_concurrency or wait for the limit to reset.".to_string()),
      FetchError::Command { .. } => Some("Check that `gh` is installed and authenticated (`gh auth status`).".to_string()),
      _ => None,
    }
  }
}

impl fmt::Display for FetchError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      FetchError::NotFound { repository } => write!(f, "Repository '{}' not found", repository),
      FetchError::RateLimited { repository, detail } => {
        write!(f, "Rate limited while fetching '{}': {}", repository, detail)
      }
      FetchError::Command { command, stderr } => write!(f, "Command failed: {}\n{}", command, stderr.trim()),
      FetchError::Parse { repository, reason } => {
        write!(f, "Unexpected response for '{}': {}", repository, reason)
      }
      FetchError::Timeout { repository } => {
        write!(f, "Collection deadline exceeded before '{}' was fetched", repository)
      }
    }
  }
}

/// Output document schema violations
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaError {
  pub violations: Vec<String>,
}

impl fmt::Display for SchemaError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "Progress document failed schema validation ({} violation(s))", self.violations.len())?;
    for violation in &self.violations {
      write!(f, "\n  - {}", violation)?;
    }
    Ok(())
  }
}

/// Derivation post-condition failures. These indicate a programming error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InvariantViolation {
  /// No state rule matched
  NoRuleMatched { api_name: String },

  /// NOT_PLANNED derived for a plan that is not `none`
  NotPlannedWithoutNone { api_name: String, release_type: String },

  /// PUBLISHED derived without any matching release tag
  PublishedWithoutTags { api_name: String },
}

impl fmt::Display for InvariantViolation {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      InvariantViolation::NoRuleMatched { api_name } => {
        write!(f, "No state rule matched for API '{}'", api_name)
      }
      InvariantViolation::NotPlannedWithoutNone { api_name, release_type } => write!(
        f,
        "API '{}' derived not_planned although target_release_type is '{}'",
        api_name, release_type
      ),
      InvariantViolation::PublishedWithoutTags { api_name } => {
        write!(f, "API '{}' derived published without a matching release tag", api_name)
      }
    }
  }
}

/// Result type alias for release-progress
pub type ProgressResult<T> = Result<T, ProgressError>;

/// Helper trait to add context to Results
pub trait ResultExt<T> {
  /// Add context to an error result
  fn context(self, ctx: impl Into<String>) -> ProgressResult<T>;

  /// Add context using a closure (lazy evaluation)
  fn with_context<F>(self, f: F) -> ProgressResult<T>
  where
    F: FnOnce() -> String;
}

impl<T, E> ResultExt<T> for Result<T, E>
where
  E: Into<ProgressError>,
{
  fn context(self, ctx: impl Into<String>) -> ProgressResult<T> {
    self.map_err(|e| e.into().context(ctx))
  }

  fn with_context<F>(self, f: F) -> ProgressResult<T>
  where
    F: FnOnce() -> String,
  {
    self.map_err(|e| e.into().context(f()))
  }
}

/// Pretty-print an error to stderr with help text
pub fn print_error(error: &ProgressError) {
  eprintln!("\n❌ {}\n", error);

  if let Some(help) = error.help_message() {
    eprintln!("💡 Help: {}\n", help);
  }
}
