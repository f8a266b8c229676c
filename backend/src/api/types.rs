//! REST API types.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use uuid::Uuid;

use crate::error::ValidationIssue;
use crate::models::{CourseInfo, Row};
use crate::transform::pipeline::{SpreadsheetOutput, SyllabusSpreadsheet};

/// Query string for the spreadsheet endpoints.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SpreadsheetQuery {
    /// Default zone for this call, overriding the server default.
    pub tz: Option<String>,
}

/// Body of `POST /api/syllabus`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SyllabusRequest {
    pub syllabus_text: String,
    #[serde(default)]
    pub timezone: Option<String>,
}

/// Successful spreadsheet response.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpreadsheetResponse {
    /// Unique job identifier
    pub job_id: String,
    /// Always "ready"; errors use [`error_response`]
    pub status: String,
    pub csv: String,
    pub rows: Vec<Row>,
    pub course_info: CourseInfo,
    /// Zone the due times are local to
    pub timezone: String,
    pub stats: RowStats,
    /// Raw extractor output, when the request went through extraction
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub model_output: Option<String>,
}

/// Row counts by type
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RowStats {
    pub total: usize,
    pub recurring: usize,
    pub one_off: usize,
}

impl From<SpreadsheetOutput> for SpreadsheetResponse {
    fn from(out: SpreadsheetOutput) -> Self {
        let stats = RowStats {
            total: out.rows.len(),
            recurring: out.recurring_count(),
            one_off: out.one_off_count(),
        };

        SpreadsheetResponse {
            job_id: Uuid::new_v4().to_string(),
            status: "ready".to_string(),
            csv: out.csv,
            rows: out.rows,
            course_info: out.course_info,
            timezone: out.timezone,
            stats,
            model_output: None,
        }
    }
}

impl From<SyllabusSpreadsheet> for SpreadsheetResponse {
    fn from(result: SyllabusSpreadsheet) -> Self {
        let mut response = SpreadsheetResponse::from(result.spreadsheet);
        response.model_output = Some(result.model_output);
        response
    }
}

/// Create an error response
pub fn error_response(error: &str, issues: &[ValidationIssue]) -> Value {
    json!({
        "jobId": Uuid::new_v4().to_string(),
        "status": "error",
        "error": error,
        "issues": issues,
        "rows": [],
        "csv": null
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ExpandOptions;
    use crate::transform::pipeline::build_spreadsheet_csv;

    #[test]
    fn test_response_from_output() {
        let out = build_spreadsheet_csv(
            json!({
                "recurring": [{
                    "title": "Lab", "start_week": 1, "end_week": 2,
                    "day_of_week": "TUE", "due_time_local": "17:00"
                }],
                "one_off": [],
                "course_info": {
                    "course_code": "BIO 1", "term_start": "2025-09-01", "term_end": "2025-12-05"
                }
            }),
            &ExpandOptions::default(),
        )
        .unwrap();

        let response = SpreadsheetResponse::from(out);
        assert_eq!(response.status, "ready");
        assert_eq!(
            response.stats,
            RowStats { total: 2, recurring: 2, one_off: 0 }
        );

        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["courseInfo"]["course_code"], "BIO 1");
        assert_eq!(json["timezone"], "America/Los_Angeles");
        assert_eq!(json["rows"][0]["Type"], "Recurring");
        assert_eq!(json["rows"][0]["DateLocal"], "2025-09-02");
        assert!(json.get("modelOutput").is_none());
    }

    #[test]
    fn test_error_response_carries_issues() {
        let issues = vec![ValidationIssue::new("/recurring/0/day_of_week", "bad weekday")];
        let body = error_response("Validation error", &issues);
        assert_eq!(body["status"], "error");
        assert_eq!(body["issues"][0]["path"], "/recurring/0/day_of_week");
        assert_eq!(body["rows"], json!([]));
    }

    #[test]
    fn test_syllabus_request_camel_case() {
        let req: SyllabusRequest =
            serde_json::from_value(json!({ "syllabusText": "CS 101" })).unwrap();
        assert_eq!(req.syllabus_text, "CS 101");
        assert!(req.timezone.is_none());
    }
}
