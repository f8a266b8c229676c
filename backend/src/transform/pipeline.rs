//! High-level pipeline API.
//!
//! Synchronous core entry points:
//!
//! - [`build_rows_from_model`] - validate, expand, sort
//! - [`build_spreadsheet_csv`] - same, plus CSV text
//!
//! Async host entry point:
//!
//! - [`syllabus_to_spreadsheet`] - run an extractor over syllabus text, then
//!   the core over its output
//!
//! # Example
//!
//! ```rust,ignore
//! use syllabus::{build_spreadsheet_csv, ExpandOptions};
//!
//! let text = std::fs::read_to_string("model.json")?;
//! let out = build_spreadsheet_csv(text, &ExpandOptions::default())?;
//! println!("{}", out.csv);
//! ```

use serde::Serialize;

use crate::ai::SyllabusExtractor;
use crate::api::logs::{log_error, log_info, log_success, log_warning};
use crate::config::ExpandOptions;
use crate::error::{ModelResult, PipelineResult};
use crate::export::rows_to_csv;
use crate::models::{CourseInfo, Row, RowType};
use crate::parser::{parse_model, ModelInput};

use super::rows::{build_rows, sort_rows};

/// Sorted rows and the course they belong to.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BuiltRows {
    pub rows: Vec<Row>,
    pub course_info: CourseInfo,
    /// Zone the row times are local to: the course's own, or the default.
    pub timezone: String,
}

/// CSV text plus the structured data it was rendered from.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SpreadsheetOutput {
    pub csv: String,
    pub rows: Vec<Row>,
    pub course_info: CourseInfo,
    pub timezone: String,
}

impl SpreadsheetOutput {
    pub fn recurring_count(&self) -> usize {
        self.rows
            .iter()
            .filter(|r| r.row_type == RowType::Recurring)
            .count()
    }

    pub fn one_off_count(&self) -> usize {
        self.rows.len() - self.recurring_count()
    }
}

/// Result of [`syllabus_to_spreadsheet`].
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SyllabusSpreadsheet {
    /// Raw extractor output, as handed to the validator.
    pub model_output: String,
    #[serde(flatten)]
    pub spreadsheet: SpreadsheetOutput,
}

/// Validate model output and produce sorted rows.
///
/// Fails only with a parse or validation error; expansion itself is total.
pub fn build_rows_from_model(
    input: impl Into<ModelInput>,
    options: &ExpandOptions,
) -> ModelResult<BuiltRows> {
    let model = parse_model(input, options)?;
    let mut rows = build_rows(&model);
    sort_rows(&mut rows);

    Ok(BuiltRows {
        rows,
        course_info: model.output.course_info,
        timezone: model.term.timezone.name().to_string(),
    })
}

/// Validate model output and render it as CSV.
pub fn build_spreadsheet_csv(
    input: impl Into<ModelInput>,
    options: &ExpandOptions,
) -> PipelineResult<SpreadsheetOutput> {
    let BuiltRows {
        rows,
        course_info,
        timezone,
    } = build_rows_from_model(input, options)?;
    let csv = rows_to_csv(&rows)?;

    Ok(SpreadsheetOutput {
        csv,
        rows,
        course_info,
        timezone,
    })
}

/// Extract a schedule from syllabus text and expand it.
pub async fn syllabus_to_spreadsheet(
    extractor: &dyn SyllabusExtractor,
    syllabus_text: &str,
    options: &ExpandOptions,
) -> PipelineResult<SyllabusSpreadsheet> {
    log_info(format!(
        "📖 Extracting schedule from {} characters of syllabus text...",
        syllabus_text.len()
    ));
    let model_output = extractor.extract(syllabus_text).await.map_err(|e| {
        log_error(format!("Extraction failed: {}", e));
        e
    })?;
    log_success(format!("Model returned {} bytes", model_output.len()));

    log_info("✔️  Validating and expanding schedule...");
    let spreadsheet = match build_spreadsheet_csv(model_output.as_str(), options) {
        Ok(out) => out,
        Err(e) => {
            log_error(e.to_string());
            return Err(e);
        }
    };

    log_success(format!(
        "{}: {} rows ({} recurring, {} one-off)",
        spreadsheet.course_info.course_code,
        spreadsheet.rows.len(),
        spreadsheet.recurring_count(),
        spreadsheet.one_off_count()
    ));
    if spreadsheet.rows.is_empty() {
        log_warning("No assignments found in syllabus");
    }

    Ok(SyllabusSpreadsheet {
        model_output,
        spreadsheet,
    })
}
