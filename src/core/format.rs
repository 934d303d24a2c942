//! Structured document formats (schedules, snapshots, progress documents)

use crate::core::error::{ConfigError, ProgressResult, ResultExt};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::path::Path;

/// On-disk format, chosen by file extension unless given explicitly
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum DocumentFormat {
  Json,
  Yaml,
}

impl DocumentFormat {
  /// `.json` is JSON; everything else is read as YAML (a JSON superset)
  pub fn from_path(path: &Path) -> Self {
    match path.extension().and_then(|e| e.to_str()) {
      Some(ext) if ext.eq_ignore_ascii_case("json") => DocumentFormat::Json,
      _ => DocumentFormat::Yaml,
    }
  }

  /// Parse `content` read from `path`
  pub fn parse<T: DeserializeOwned>(self, path: &Path, content: &str) -> ProgressResult<T> {
    let parsed = match self {
      DocumentFormat::Json => serde_json::from_str(content).map_err(|e| e.to_string()),
      DocumentFormat::Yaml => serde_yaml::from_str(content).map_err(|e| e.to_string()),
    };
    parsed.map_err(|reason| {
      ConfigError::Parse {
        path: path.to_path_buf(),
        reason,
      }
      .into()
    })
  }

  /// Render a value with a trailing newline
  pub fn render<T: Serialize>(self, value: &T) -> ProgressResult<String> {
    match self {
      DocumentFormat::Json => {
        let mut out = serde_json::to_string_pretty(value)?;
        out.push('\n');
        Ok(out)
      }
      DocumentFormat::Yaml => Ok(serde_yaml::to_string(value)?),
    }
  }
}

/// Read and parse a document, detecting the format from the extension
pub fn read_document<T: DeserializeOwned>(path: &Path) -> ProgressResult<T> {
  if !path.exists() {
    return Err(
      ConfigError::NotFound {
        path: path.to_path_buf(),
      }
      .into(),
    );
  }
  let content = std::fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))?;
  DocumentFormat::from_path(path).parse(path, &content)
}
