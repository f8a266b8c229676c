//! Error types for the syllabus expansion pipeline.
//!
//! The core (validation, expansion, serialization) only ever fails with a
//! [`ModelError`]:
//!
//! - [`ParseError`] - input text is not JSON
//! - [`ValidationError`] - JSON does not match the model output contract
//!
//! Host layers add their own errors on top:
//!
//! - [`ExportError`] - CSV writer plumbing
//! - [`AiError`] - extraction collaborator failures
//! - [`ConfigError`] - bad environment configuration
//! - [`PipelineError`] - host orchestration (wraps all of the above)
//! - [`ServerError`] - HTTP server startup
//!
//! Error conversion is automatic via `From` implementations,
//! allowing `?` to work across error boundaries.

use serde::Serialize;
use std::fmt;
use thiserror::Error;

// =============================================================================
// Parse Errors
// =============================================================================

/// Input text is not syntactically valid JSON.
#[derive(Debug, Clone, Error, PartialEq)]
#[error("Invalid JSON at line {line}, column {column}: {message}")]
pub struct ParseError {
    pub line: usize,
    pub column: usize,
    pub message: String,
}

impl From<serde_json::Error> for ParseError {
    fn from(err: serde_json::Error) -> Self {
        Self {
            line: err.line(),
            column: err.column(),
            message: err.to_string(),
        }
    }
}

// =============================================================================
// Validation Errors
// =============================================================================

/// A single violated constraint.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ValidationIssue {
    /// JSON pointer to the offending field (`/recurring/0/day_of_week`).
    pub path: String,
    /// What was expected.
    pub message: String,
}

impl ValidationIssue {
    pub fn new(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.path.is_empty() {
            write!(f, "(root): {}", self.message)
        } else {
            write!(f, "{}: {}", self.path, self.message)
        }
    }
}

/// Parsed JSON does not conform to the model output contract.
///
/// Carries every violation found, not just the first.
#[derive(Debug, Clone, Error, PartialEq)]
#[error("{} validation issue(s): {}", .issues.len(), format_issues(.issues))]
pub struct ValidationError {
    pub issues: Vec<ValidationIssue>,
}

impl ValidationError {
    pub fn new(issues: Vec<ValidationIssue>) -> Self {
        Self { issues }
    }

    pub fn single(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(vec![ValidationIssue::new(path, message)])
    }

    /// True if any issue points at `path` or one of its children.
    pub fn mentions(&self, path: &str) -> bool {
        self.issues.iter().any(|i| i.path.starts_with(path))
    }
}

fn format_issues(issues: &[ValidationIssue]) -> String {
    issues
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

// =============================================================================
// Model Errors (core)
// =============================================================================

/// Everything the core can fail with.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum ModelError {
    #[error("Parse error: {0}")]
    Parse(#[from] ParseError),

    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Export Errors
// =============================================================================

/// Errors from the CSV writer.
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("CSV write failed: {0}")]
    Csv(#[from] csv::Error),

    #[error("CSV flush failed: {0}")]
    Flush(String),

    #[error("CSV output is not UTF-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),
}

// =============================================================================
// AI Client Errors
// =============================================================================

/// Errors from the extraction collaborator.
#[derive(Debug, Error)]
pub enum AiError {
    /// Missing API key.
    #[error("Missing ANTHROPIC_API_KEY environment variable")]
    MissingApiKey,

    /// Syllabus text too short to be worth a model call.
    #[error("Syllabus text too short ({0} characters)")]
    InputTooShort(usize),

    /// HTTP request failed.
    #[error("HTTP request failed: {0}")]
    RequestFailed(String),

    /// API returned an error body.
    #[error("API error: {0}")]
    ApiError(String),

    /// Model returned nothing usable.
    #[error("Empty model response")]
    EmptyResponse,

    /// Response envelope could not be decoded.
    #[error("Invalid AI response: {0}")]
    InvalidResponse(String),
}

// =============================================================================
// Config Errors
// =============================================================================

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Unknown timezone in {var}: {value}")]
    UnknownTimezone { var: &'static str, value: String },

    #[error("Invalid value for {var}: {message}")]
    InvalidValue { var: &'static str, message: String },
}

// =============================================================================
// Pipeline Errors (host orchestration)
// =============================================================================

/// Top-level errors for the CLI and HTTP hosts.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error(transparent)]
    Model(#[from] ModelError),

    #[error("Export error: {0}")]
    Export(#[from] ExportError),

    #[error("AI error: {0}")]
    Ai(#[from] AiError),

    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<ParseError> for PipelineError {
    fn from(err: ParseError) -> Self {
        Self::Model(err.into())
    }
}

impl From<ValidationError> for PipelineError {
    fn from(err: ValidationError) -> Self {
        Self::Model(err.into())
    }
}

// =============================================================================
// Server Errors
// =============================================================================

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("Server IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Config error: {0}")]
    Config(#[from] ConfigError),
}

// =============================================================================
// Result Type Aliases
// =============================================================================

/// Result type for core operations.
pub type ModelResult<T> = Result<T, ModelError>;

/// Result type for CSV export.
pub type ExportResult<T> = Result<T, ExportError>;

/// Result type for AI operations.
pub type AiResult<T> = Result<T, AiError>;

/// Result type for pipeline operations.
pub type PipelineResult<T> = Result<T, PipelineError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_conversion_chain() {
        let parse_err = ParseError {
            line: 1,
            column: 2,
            message: "expected value".into(),
        };
        let pipeline_err: PipelineError = parse_err.into();
        assert!(matches!(
            pipeline_err,
            PipelineError::Model(ModelError::Parse(_))
        ));

        let validation_err = ValidationError::single("/course_info/term_start", "bad date");
        let pipeline_err: PipelineError = validation_err.into();
        assert!(pipeline_err.to_string().contains("term_start"));
    }

    #[test]
    fn test_validation_error_lists_every_issue() {
        let err = ValidationError::new(vec![
            ValidationIssue::new("/recurring/0/day_of_week", "\"TUES\" is not one of the weekday codes"),
            ValidationIssue::new("/recurring/0/end_week", "11 is greater than the maximum of 10"),
        ]);
        let msg = err.to_string();
        assert!(msg.starts_with("2 validation issue(s)"));
        assert!(msg.contains("day_of_week"));
        assert!(msg.contains("end_week"));
        assert!(err.mentions("/recurring/0"));
        assert!(!err.mentions("/one_off"));
    }

    #[test]
    fn test_root_issue_display() {
        let issue = ValidationIssue::new("", "\"recurring\" is a required property");
        assert_eq!(issue.to_string(), "(root): \"recurring\" is a required property");
    }

    #[test]
    fn test_parse_error_from_serde() {
        let err = serde_json::from_str::<serde_json::Value>("{\n  \"a\": ").unwrap_err();
        let parse_err = ParseError::from(err);
        assert_eq!(parse_err.line, 2);
        assert!(parse_err.to_string().contains("line 2"));
    }
}
