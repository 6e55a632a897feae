//! Validation entry points.

use tabula_value::Value;
use tracing::debug;

use crate::column::{column_schema, ColumnDefinition};
use crate::config::CheckConfig;
use crate::error::Result;
use crate::issue::{Issue, IssueCode, SchemaValidationError};

/// Validate a candidate column definition with the default configuration.
pub fn check(candidate: &Value) -> std::result::Result<ColumnDefinition, SchemaValidationError> {
    check_with(&CheckConfig::default(), candidate)
}

/// Validate a candidate column definition.
///
/// Every issue in the candidate is reported at once; on success the returned
/// definition holds the validated document with defaults filled in and
/// callables guarded by their contracts.
pub fn check_with(
    config: &CheckConfig,
    candidate: &Value,
) -> std::result::Result<ColumnDefinition, SchemaValidationError> {
    let validated = match column_schema().parse(candidate, config) {
        Ok(validated) => validated,
        Err(err) => {
            let kind = candidate
                .get("type")
                .map(|tag| tag.preview())
                .unwrap_or_default();
            debug!(
                kind = %kind,
                issues = err.issues().len(),
                "column definition rejected"
            );
            return Err(err);
        }
    };

    match ColumnDefinition::from_validated(validated) {
        Some(definition) => {
            debug!(
                kind = %definition.kind,
                name = %definition.name,
                "column definition accepted"
            );
            Ok(definition)
        }
        None => {
            let issue = Issue::new(
                Vec::new(),
                IssueCode::ShapeMismatch {
                    expected: "column definition".to_string(),
                    received: candidate.type_name().to_string(),
                },
            );
            Err(SchemaValidationError::new(vec![issue], &config.report))
        }
    }
}

/// Validate a `serde_json` document; it cannot contain callables.
pub fn check_json(
    candidate: &serde_json::Value,
) -> std::result::Result<ColumnDefinition, SchemaValidationError> {
    check(&Value::from(candidate.clone()))
}

/// Validate with configuration loaded from defaults and `TABULA_` variables.
pub fn check_configured(candidate: &Value) -> Result<ColumnDefinition> {
    let config = CheckConfig::load()?;
    Ok(check_with(&config, candidate)?)
}
