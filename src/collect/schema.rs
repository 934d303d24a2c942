//! Output document validation
//!
//! Two layers: the JSON schema embedded at build time, then structural
//! invariants the schema cannot express (ordering, counts, digest).

use crate::core::error::SchemaError;
use crate::model::document::{ProgressDocument, StateCounts, records_digest};
use serde_json::Value;

/// JSON schema of the progress document
pub const DOCUMENT_SCHEMA: &str = include_str!("../../schema/progress-document.schema.json");

/// Validate a parsed document value against the JSON schema
pub fn validate_value(instance: &Value) -> Result<(), SchemaError> {
  let schema: Value = serde_json::from_str(DOCUMENT_SCHEMA).map_err(|e| SchemaError {
    violations: vec![format!("embedded schema is not valid JSON: {}", e)],
  })?;
  let validator = jsonschema::draft202012::options()
    .build(&schema)
    .map_err(|e| SchemaError {
      violations: vec![format!("embedded schema does not compile: {}", e)],
    })?;

  let violations: Vec<String> = validator
    .iter_errors(instance)
    .map(|error| {
      let path = error.instance_path.to_string();
      if path.is_empty() {
        error.to_string()
      } else {
        format!("{}: {}", path, error)
      }
    })
    .collect();

  if violations.is_empty() {
    Ok(())
  } else {
    Err(SchemaError { violations })
  }
}

/// Check invariants that span fields
pub fn check_structure(document: &ProgressDocument) -> Result<(), SchemaError> {
  let mut violations = Vec::new();
  let records = &document.progress;
  let metadata = &document.metadata;

  for pair in records.windows(2) {
    if pair[0].api_name >= pair[1].api_name {
      violations.push(format!(
        "progress is not strictly ordered by api_name: '{}' before '{}'",
        pair[0].api_name, pair[1].api_name
      ));
    }
  }

  for record in records {
    if record.state.is_none() != record.error.is_some() {
      violations.push(format!(
        "record '{}' must carry either a state or an error",
        record.api_name
      ));
    }
  }

  if metadata.total_apis != records.len() {
    violations.push(format!(
      "metadata.total_apis is {} but progress has {} records",
      metadata.total_apis,
      records.len()
    ));
  }

  let errors = records.iter().filter(|r| r.is_error()).count();
  if metadata.error_count != errors {
    violations.push(format!(
      "metadata.error_count is {} but {} records carry errors",
      metadata.error_count, errors
    ));
  }

  let counts = StateCounts::from_records(records);
  if metadata.state_counts != counts {
    violations.push("metadata.state_counts does not match the records".to_string());
  }
  if counts.total() + errors != records.len() {
    violations.push("state counts plus errors do not add up to total_apis".to_string());
  }

  for pair in document.meta_releases.windows(2) {
    if pair[0].name >= pair[1].name {
      violations.push(format!(
        "meta_releases is not strictly ordered by name: '{}' before '{}'",
        pair[0].name, pair[1].name
      ));
    }
  }

  match records_digest(records) {
    Ok(digest) if digest == metadata.records_sha256 => {}
    Ok(_) => violations.push("metadata.records_sha256 does not match the records".to_string()),
    Err(e) => violations.push(format!("records cannot be digested: {}", e)),
  }

  if violations.is_empty() {
    Ok(())
  } else {
    Err(SchemaError { violations })
  }
}

/// Full validation of a typed document
pub fn validate_document(document: &ProgressDocument) -> Result<(), SchemaError> {
  let value = serde_json::to_value(document).map_err(|e| SchemaError {
    violations: vec![format!("document cannot be serialized: {}", e)],
  })?;
  validate_value(&value)?;
  check_structure(document)
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::model::artifacts::ReleaseIssue;
  use crate::model::document::{COLLECTOR_VERSION, RunMetadata, SCHEMA_VERSION};
  use crate::model::plan::{Maturity, ReleasePlanEntry, ReleaseTrack, ReleaseType};
  use crate::model::record::{ProgressRecord, PublishedContext, RecordErrorKind};
  use crate::model::state::ReleaseState;

  fn record(name: &str, state: Option<ReleaseState>) -> ProgressRecord {
    let entry = ReleasePlanEntry {
      api_name: name.to_string(),
      repository: name.to_string(),
      target_release_type: ReleaseType::Patch,
      target_version: Some("0.2.1".to_string()),
      target_release_tag: Some("r2.2".to_string()),
      meta_release: None,
      release_track: ReleaseTrack::MetaRelease,
      maturity: Maturity::Initial,
      committed_on: None,
    };
    match state {
      Some(state) => ProgressRecord {
        state: Some(state),
        ..ProgressRecord::from_entry(&entry)
      },
      None => ProgressRecord::failed(&entry, RecordErrorKind::Fetch, "repository not found"),
    }
  }

  fn document(records: Vec<ProgressRecord>) -> ProgressDocument {
    let counts = StateCounts::from_records(&records);
    ProgressDocument {
      metadata: RunMetadata {
        last_updated: "2025-09-01T12:00:00Z".to_string(),
        schema_version: SCHEMA_VERSION.to_string(),
        collector_version: COLLECTOR_VERSION.to_string(),
        total_apis: records.len(),
        state_counts: counts,
        error_count: records.iter().filter(|r| r.is_error()).count(),
        repositories_scanned: records.len(),
        source_calls: records.len() as u64,
        duration_seconds: 0.4,
        timed_out: false,
        records_sha256: records_digest(&records).unwrap(),
      },
      meta_releases: Vec::new(),
      progress: records,
    }
  }

  #[test]
  fn test_embedded_schema_compiles() {
    let schema: Value = serde_json::from_str(DOCUMENT_SCHEMA).unwrap();
    assert!(jsonschema::draft202012::options().build(&schema).is_ok());
  }

  #[test]
  fn test_valid_document_passes() {
    let doc = document(vec![
      record("carrier-billing", Some(ReleaseState::Published)),
      record("device-location", None),
      record("sim-swap", Some(ReleaseState::Planned)),
    ]);
    validate_document(&doc).unwrap();
  }

  #[test]
  fn test_unordered_records_rejected() {
    let doc = document(vec![
      record("sim-swap", Some(ReleaseState::Planned)),
      record("carrier-billing", Some(ReleaseState::Published)),
    ]);
    let err = validate_document(&doc).unwrap_err();
    assert!(err.violations.iter().any(|v| v.contains("ordered")));
  }

  #[test]
  fn test_count_mismatch_rejected() {
    let mut doc = document(vec![record("sim-swap", Some(ReleaseState::Planned))]);
    doc.metadata.total_apis = 2;
    let err = check_structure(&doc).unwrap_err();
    assert!(err.violations.iter().any(|v| v.contains("total_apis")));
  }

  #[test]
  fn test_tampered_records_rejected() {
    let mut doc = document(vec![record("sim-swap", Some(ReleaseState::Planned))]);
    doc.progress[0].target_version = Some("9.9.9".to_string());
    let err = check_structure(&doc).unwrap_err();
    assert!(err.violations.iter().any(|v| v.contains("records_sha256")));
  }

  #[test]
  fn test_schema_rejects_malformed_value() {
    let doc = document(vec![record("sim-swap", Some(ReleaseState::Planned))]);
    let mut value = serde_json::to_value(&doc).unwrap();
    value["progress"][0]["state"] = Value::String("shipped".to_string());
    value["metadata"]["records_sha256"] = Value::String("abc".to_string());
    let err = validate_value(&value).unwrap_err();
    assert!(err.violations.len() >= 2);
  }

  #[test]
  fn test_schema_requires_error_when_state_null() {
    let doc = document(vec![record("sim-swap", Some(ReleaseState::Planned))]);
    let mut value = serde_json::to_value(&doc).unwrap();
    value["progress"][0]["state"] = Value::Null;
    assert!(validate_value(&value).is_err());
  }

  #[test]
  fn test_release_issue_and_published_context_validate() {
    let mut published = record("sim-swap", Some(ReleaseState::Published));
    published.artifacts.release_issue = Some(ReleaseIssue {
      number: 12,
      url: "https://github.com/camaraproject/sim-swap/issues/12".to_string(),
    });
    published.published_context = PublishedContext {
      latest_public_release: Some("r2.2".to_string()),
      newest_pre_release: Some("r2.1-rc.1".to_string()),
    };
    let doc = document(vec![published]);
    validate_document(&doc).unwrap();

    let mut value = serde_json::to_value(&doc).unwrap();
    value["progress"][0]["artifacts"]["release_issue"]["number"] = Value::from(0);
    assert!(validate_value(&value).is_err());

    let mut value = serde_json::to_value(&doc).unwrap();
    if let Some(record) = value["progress"][0].as_object_mut() {
      record.remove("published_context");
    }
    assert!(validate_value(&value).is_err());
  }
}
