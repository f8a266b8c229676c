//! Validation of untrusted model output against the schedule contract.
//!
//! Two passes, both collecting every problem instead of stopping at the
//! first one:
//!
//! 1. **Schema** - JSON Schema Draft 7 (`schemas/model-output.json`, embedded
//!    at compile time). Types, required fields, weekday enum, date/time
//!    patterns, week bounds. The `end_week` maximum is patched in from
//!    [`ExpandOptions::max_week`].
//! 2. **Semantic** - what a schema cannot say: term dates must be real
//!    calendar dates, `term_start <= term_end`, the timezone must be a known
//!    IANA zone, and `start_week <= end_week` for every rule.
//!
//! # Example
//!
//! ```rust,ignore
//! use serde_json::json;
//! use syllabus::{validate_model_output, ExpandOptions};
//!
//! let data = json!({
//!     "recurring": [],
//!     "one_off": [],
//!     "course_info": {
//!         "course_code": "CS 101",
//!         "term_start": "2025-09-01",
//!         "term_end": "2025-12-05"
//!     }
//! });
//! let model = validate_model_output(&data, &ExpandOptions::default()).unwrap();
//! assert_eq!(model.output.course_info.course_code, "CS 101");
//! ```

use chrono::NaiveDate;
use chrono_tz::Tz;
use once_cell::sync::Lazy;
use serde_json::Value;

use crate::config::ExpandOptions;
use crate::error::{ValidationError, ValidationIssue};
use crate::models::{ModelOutput, Term};

static MODEL_OUTPUT_SCHEMA: Lazy<Value> = Lazy::new(|| {
    serde_json::from_str(include_str!("../../schemas/model-output.json"))
        .expect("Invalid embedded schema")
});

/// A model output that passed both validation passes.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedModel {
    pub output: ModelOutput,
    pub term: Term,
}

/// Validate `data` against `schema`, returning every violation.
///
/// # Example
/// ```ignore
/// use serde_json::json;
/// use syllabus::validation::validate;
///
/// let schema = json!({
///     "type": "object",
///     "required": ["name"],
///     "properties": { "name": { "type": "string" } }
/// });
///
/// assert!(validate(&schema, &json!({ "name": "test" })).is_ok());
/// assert!(validate(&schema, &json!({ "age": 42 })).is_err());
/// ```
pub fn validate(schema: &Value, data: &Value) -> Result<(), Vec<ValidationIssue>> {
    let validator = jsonschema::draft7::new(schema)
        .map_err(|e| vec![ValidationIssue::new("", format!("Invalid schema: {}", e))])?;

    let issues: Vec<ValidationIssue> = validator
        .iter_errors(data)
        .map(|e| ValidationIssue::new(e.instance_path.to_string(), e.to_string()))
        .collect();

    if issues.is_empty() {
        Ok(())
    } else {
        Err(issues)
    }
}

/// The model output schema with `end_week` capped at `max_week`.
pub fn model_output_schema(max_week: u32) -> Value {
    let mut schema = MODEL_OUTPUT_SCHEMA.clone();
    if let Some(end_week) = schema.pointer_mut("/definitions/recurring/properties/end_week") {
        end_week["maximum"] = Value::from(max_week);
    }
    schema
}

/// Validate a parsed model output and resolve its term.
pub fn validate_model_output(
    data: &Value,
    options: &ExpandOptions,
) -> Result<ValidatedModel, ValidationError> {
    let schema = model_output_schema(options.max_week);
    validate(&schema, data).map_err(ValidationError::new)?;

    let output: ModelOutput = serde_json::from_value(data.clone())
        .map_err(|e| ValidationError::single("", e.to_string()))?;

    let mut issues = Vec::new();
    let term = resolve_term(&output, options, &mut issues);

    for (i, rule) in output.recurring.iter().enumerate() {
        if rule.start_week > rule.end_week {
            issues.push(ValidationIssue::new(
                format!("/recurring/{}", i),
                format!(
                    "start_week ({}) must not exceed end_week ({})",
                    rule.start_week, rule.end_week
                ),
            ));
        }
    }

    match term {
        Some(term) if issues.is_empty() => Ok(ValidatedModel { output, term }),
        _ => Err(ValidationError::new(issues)),
    }
}

/// Quick check with default options.
pub fn is_valid_model_output(data: &Value) -> bool {
    validate_model_output(data, &ExpandOptions::default()).is_ok()
}

fn resolve_term(
    output: &ModelOutput,
    options: &ExpandOptions,
    issues: &mut Vec<ValidationIssue>,
) -> Option<Term> {
    let info = &output.course_info;
    let start = parse_calendar_date("/course_info/term_start", &info.term_start, issues);
    let end = parse_calendar_date("/course_info/term_end", &info.term_end, issues);

    let timezone = match info.timezone.as_deref() {
        None => Some(options.default_timezone),
        Some(name) => match name.parse::<Tz>() {
            Ok(tz) => Some(tz),
            Err(_) => {
                issues.push(ValidationIssue::new(
                    "/course_info/timezone",
                    format!("\"{}\" is not a known IANA timezone", name),
                ));
                None
            }
        },
    };

    let (start, end, timezone) = (start?, end?, timezone?);
    if start > end {
        issues.push(ValidationIssue::new(
            "/course_info",
            format!("term_start ({}) is after term_end ({})", start, end),
        ));
        return None;
    }

    Some(Term {
        start,
        end,
        timezone,
    })
}

/// Read the leading `YYYY-MM-DD` of a pattern-checked string.
fn parse_calendar_date(
    path: &str,
    value: &str,
    issues: &mut Vec<ValidationIssue>,
) -> Option<NaiveDate> {
    let parsed = value
        .get(..10)
        .and_then(|ymd| NaiveDate::parse_from_str(ymd, "%Y-%m-%d").ok());
    if parsed.is_none() {
        issues.push(ValidationIssue::new(
            path,
            format!("\"{}\" is not a valid calendar date", value),
        ));
    }
    parsed
}
