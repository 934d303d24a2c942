//! `validate`: re-check an existing progress document

use crate::collect::schema;
use crate::core::error::{ProgressResult, SchemaError};
use crate::core::format::read_document;
use crate::model::document::ProgressDocument;
use serde_json::Value;
use std::path::Path;

/// Run the validate command
pub fn run_validate(path: &Path, json: bool) -> ProgressResult<()> {
  let value: Value = read_document(path)?;

  schema::validate_value(&value)?;
  let document: ProgressDocument = serde_json::from_value(value).map_err(|e| SchemaError {
    violations: vec![e.to_string()],
  })?;
  schema::check_structure(&document)?;

  tracing::debug!("{} passed schema and structure checks", path.display());
  if json {
    let report = serde_json::json!({
      "valid": true,
      "path": path.display().to_string(),
      "records": document.progress.len(),
      "schema_version": document.metadata.schema_version,
    });
    println!("{}", serde_json::to_string_pretty(&report)?);
  } else {
    println!(
      "✅ {} is a valid progress document ({} records)",
      path.display(),
      document.progress.len()
    );
  }
  Ok(())
}
