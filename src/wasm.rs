//! WASM entry points for browser use.
//!
//! Lets the editor check a pipeline without a round trip to the server. The
//! result shapes match the HTTP responses.

use wasm_bindgen::prelude::*;

use crate::error::PipelineError;
use crate::parse::types::AnalysisResult;

/// Analyze a pipeline JSON string.
/// Returns `{ status: "ok", data: { num_nodes, num_edges, is_dag } }` or
/// `{ status: "invalid", data: [errors] }`.
#[wasm_bindgen]
pub fn analyze_pipeline(json: &str) -> JsValue {
    let result = analyze_pipeline_inner(json);
    serde_wasm_bindgen::to_value(&result).unwrap_or(JsValue::NULL)
}

fn analyze_pipeline_inner(json: &str) -> AnalyzeDto {
    let value = match crate::parse::parse_json(json) {
        Ok(v) => v,
        Err(errors) => return AnalyzeDto::Invalid(errors.into_iter().map(ErrorDto::from).collect()),
    };

    match crate::validate::analyze_value(&value) {
        Ok(result) => AnalyzeDto::Ok(result),
        Err(errors) => AnalyzeDto::Invalid(errors.into_iter().map(ErrorDto::from).collect()),
    }
}

/// Explain what is structurally wrong with a pipeline.
/// Returns a JSON array of error objects; empty when the pipeline is a valid DAG.
#[wasm_bindgen]
pub fn diagnose_pipeline(json: &str) -> JsValue {
    let result = diagnose_pipeline_inner(json);
    serde_wasm_bindgen::to_value(&result).unwrap_or(JsValue::NULL)
}

fn diagnose_pipeline_inner(json: &str) -> Vec<ErrorDto> {
    let payload = match crate::parse::parse(json) {
        Ok(p) => p,
        Err(errors) => return errors.into_iter().map(ErrorDto::from).collect(),
    };

    crate::validate::diagnose(&payload)
        .into_iter()
        .map(ErrorDto::from)
        .collect()
}

// ---------------------------------------------------------------------------
// DTOs for serialization to JS
// ---------------------------------------------------------------------------

#[derive(Debug, serde::Serialize, serde::Deserialize)]
struct ErrorDto {
    code: String,
    phase: String,
    message: String,
    path: Option<String>,
}

impl From<PipelineError> for ErrorDto {
    fn from(e: PipelineError) -> Self {
        ErrorDto {
            code: e.code,
            phase: e.phase.to_string(),
            message: e.message,
            path: e.path,
        }
    }
}

#[derive(Debug, serde::Serialize, serde::Deserialize)]
#[serde(tag = "status", content = "data")]
enum AnalyzeDto {
    #[serde(rename = "ok")]
    Ok(AnalysisResult),
    #[serde(rename = "invalid")]
    Invalid(Vec<ErrorDto>),
}
