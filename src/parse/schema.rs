//! Payload shape validation against the embedded JSON Schema.
//!
//! Runs before serde conversion so that every offending field is reported at
//! once instead of the first one serde trips over.

use std::sync::OnceLock;

use jsonschema::Validator;
use jsonschema::error::ValidationErrorKind;
use serde_json::Value;

use super::types::PipelinePayload;
use crate::error::PipelineError;

const SCHEMA_JSON: &str = include_str!("../../schemas/pipeline.schema.json");

static VALIDATOR: OnceLock<Result<Validator, String>> = OnceLock::new();

fn validator() -> Result<&'static Validator, PipelineError> {
    let compiled = VALIDATOR.get_or_init(|| {
        let schema: Value = serde_json::from_str(SCHEMA_JSON)
            .map_err(|e| format!("Failed to parse schema JSON: {}", e))?;
        Validator::new(&schema).map_err(|e| format!("Failed to compile schema: {}", e))
    });
    compiled
        .as_ref()
        .map_err(|reason| PipelineError::schema("S004", reason.clone(), ""))
}

/// Check `value` against the payload contract. Returns every violation found.
pub fn check_shape(value: &Value) -> Vec<PipelineError> {
    let validator = match validator() {
        Ok(v) => v,
        Err(e) => return vec![e],
    };

    validator
        .iter_errors(value)
        .map(|e| {
            let pointer = e.instance_path.to_string();
            match &e.kind {
                ValidationErrorKind::Required { property } => {
                    let field = property.as_str().unwrap_or_default();
                    PipelineError::schema(
                        "S001",
                        format!("Missing required field '{}'", field),
                        format!("{}/{}", pointer, field),
                    )
                }
                ValidationErrorKind::Type { .. } => {
                    PipelineError::schema("S002", e.to_string(), pointer)
                }
                ValidationErrorKind::MinLength { .. } => {
                    PipelineError::schema("S003", "Must be a non-empty string", pointer)
                }
                _ => PipelineError::schema("S004", e.to_string(), pointer),
            }
        })
        .collect()
}

/// Validate shape, then convert into the typed payload.
pub fn validate_payload(value: &Value) -> Result<PipelinePayload, Vec<PipelineError>> {
    let errors = check_shape(value);
    if !errors.is_empty() {
        return Err(errors);
    }

    serde_json::from_value::<PipelinePayload>(value.clone()).map_err(|e| {
        vec![PipelineError::schema(
            "S005",
            format!("Payload does not match pipeline types: {}", e),
            "",
        )]
    })
}
