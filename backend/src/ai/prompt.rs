//! Prompt for syllabus schedule extraction.
//!
//! The model is asked for exactly the shape accepted by
//! [`crate::validation::validate_model_output`]; whatever it returns is still
//! validated in full.

use crate::models::DayOfWeek;

/// Example of the expected output shape, shown to the model verbatim.
const OUTPUT_SHAPE: &str = r#"{
  "recurring": [
    {
      "title": "Weekly Quiz",
      "start_week": 2,
      "end_week": 10,
      "day_of_week": "FRI",
      "due_time_local": "23:59",
      "exceptions": ["Week 7"],
      "notes": ""
    }
  ],
  "one_off": [
    { "title": "Midterm", "date_local": "2025-10-31", "due_time_local": "10:00" }
  ],
  "course_info": {
    "course_code": "CODE",
    "term_start": "TERM_START",
    "term_end": "TERM_END",
    "timezone": "TZ"
  }
}"#;

/// System prompt: role and output rules.
pub fn system_prompt(max_week: u32) -> String {
    let weekdays = DayOfWeek::ALL.map(|d| d.code()).join(", ");
    format!(
        r#"You extract assignment schedules from a college syllabus.

Return ONLY valid JSON (no backticks, no commentary) with this shape:
{OUTPUT_SHAPE}

Rules:
- Capture repeating patterns (e.g., "every Friday 11:59pm weeks 2-10") in "recurring".
- Put exact dates (midterm/final/project) in "one_off".
- "day_of_week" is one of {weekdays}.
- Week numbers start at 1 and "end_week" is at most {max_week}.
- Dates are YYYY-MM-DD.
- Use 24h local time HH:MM; if no time is given, default to "23:59".
- Use "Week N" in exceptions if a week is skipped.
- "timezone" is an IANA zone name (e.g., "America/Los_Angeles"); omit it if unknown.
- No prose, JSON only."#
    )
}

/// User message wrapping the syllabus text.
pub fn user_prompt(syllabus_text: &str) -> String {
    format!("Syllabus:\n\"\"\"\n{}\n\"\"\"", syllabus_text.trim())
}
