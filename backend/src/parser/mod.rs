//! Input parsing for model output.
//!
//! Accepts either raw text (as returned by the extraction step) or an
//! already-parsed JSON value, and hands it to [`crate::validation`].
//! Text is never trusted: it must be a single JSON document.

use serde_json::Value;
use std::path::Path;

use crate::config::ExpandOptions;
use crate::error::{ModelResult, ParseError, PipelineResult};
use crate::validation::{validate_model_output, ValidatedModel};

/// Raw model output, before validation.
#[derive(Debug, Clone, PartialEq)]
pub enum ModelInput {
    /// JSON text, parsed on use.
    Text(String),
    /// Already-parsed JSON.
    Json(Value),
}

impl From<&str> for ModelInput {
    fn from(text: &str) -> Self {
        Self::Text(text.to_string())
    }
}

impl From<String> for ModelInput {
    fn from(text: String) -> Self {
        Self::Text(text)
    }
}

impl From<Value> for ModelInput {
    fn from(value: Value) -> Self {
        Self::Json(value)
    }
}

impl ModelInput {
    /// Turn the input into a JSON value, failing on malformed text.
    pub fn into_json(self) -> Result<Value, ParseError> {
        match self {
            Self::Text(text) => parse_json(&text),
            Self::Json(value) => Ok(value),
        }
    }
}

/// Parse JSON text.
///
/// # Example
/// ```ignore
/// use syllabus::parser::parse_json;
///
/// assert!(parse_json(r#"{"recurring": []}"#).is_ok());
/// assert!(parse_json("{recurring: []}").is_err());
/// ```
pub fn parse_json(text: &str) -> Result<Value, ParseError> {
    serde_json::from_str(text).map_err(ParseError::from)
}

/// Parse and validate model output.
pub fn parse_model(
    input: impl Into<ModelInput>,
    options: &ExpandOptions,
) -> ModelResult<ValidatedModel> {
    let data = input.into().into_json()?;
    Ok(validate_model_output(&data, options)?)
}

/// Read, parse and validate a model output file.
pub fn parse_model_file<P: AsRef<Path>>(
    path: P,
    options: &ExpandOptions,
) -> PipelineResult<ValidatedModel> {
    let text = std::fs::read_to_string(path.as_ref())?;
    Ok(parse_model(text, options)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{ModelError, PipelineError};
    use serde_json::json;
    use std::io::Write;

    const MODEL: &str = r#"{
        "recurring": [],
        "one_off": [{ "title": "Final", "date_local": "2025-12-10", "due_time_local": "08:00" }],
        "course_info": { "course_code": "MATH 2", "term_start": "2025-09-01", "term_end": "2025-12-12" }
    }"#;

    #[test]
    fn test_text_and_value_inputs_agree() {
        let opts = ExpandOptions::default();
        let from_text = parse_model(MODEL, &opts).unwrap();
        let value: Value = serde_json::from_str(MODEL).unwrap();
        let from_value = parse_model(value, &opts).unwrap();
        assert_eq!(from_text, from_value);
    }

    #[test]
    fn test_malformed_json_is_parse_error() {
        let err = parse_model("{\"recurring\": [", &ExpandOptions::default()).unwrap_err();
        assert!(matches!(err, ModelError::Parse(_)));
    }

    #[test]
    fn test_fenced_json_is_parse_error() {
        let fenced = format!("```json\n{}\n```", MODEL);
        let err = parse_model(fenced, &ExpandOptions::default()).unwrap_err();
        assert!(matches!(err, ModelError::Parse(_)));
    }

    #[test]
    fn test_wrong_shape_is_validation_error() {
        let err = parse_model(json!([1, 2, 3]), &ExpandOptions::default()).unwrap_err();
        assert!(matches!(err, ModelError::Validation(_)));
    }

    #[test]
    fn test_parse_model_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(MODEL.as_bytes()).unwrap();
        let model = parse_model_file(file.path(), &ExpandOptions::default()).unwrap();
        assert_eq!(model.output.course_info.course_code, "MATH 2");

        let missing = parse_model_file("/nonexistent/model.json", &ExpandOptions::default());
        assert!(matches!(missing, Err(PipelineError::Io(_))));
    }
}
