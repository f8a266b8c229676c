//! Domain models for the syllabus expansion pipeline.
//!
//! - [`ModelOutput`] - validated root of the extraction contract
//! - [`CourseInfo`] - course code and term bounds
//! - [`RecurringRule`] - weekly assignment pattern
//! - [`OneOffItem`] - single dated assignment
//! - [`DayOfWeek`] - three-letter weekday codes
//! - [`Term`] - resolved term bounds and timezone
//! - [`Occurrence`] - one expanded week of a rule
//! - [`Row`] / [`RowType`] - spreadsheet rows

use chrono::{NaiveDate, Weekday};
use chrono_tz::Tz;
use serde::de::{self, Deserializer, Unexpected, Visitor};
use serde::{Deserialize, Serialize};
use std::fmt;

// =============================================================================
// Day of Week
// =============================================================================

/// Weekday as written in the model output.
///
/// Only the three-letter codes are accepted; `TUES`/`THURS` style codes are
/// rejected at validation time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum DayOfWeek {
    Mon,
    Tue,
    Wed,
    Thu,
    Fri,
    Sat,
    Sun,
}

impl DayOfWeek {
    /// Every code, Monday first.
    pub const ALL: [DayOfWeek; 7] = [
        Self::Mon,
        Self::Tue,
        Self::Wed,
        Self::Thu,
        Self::Fri,
        Self::Sat,
        Self::Sun,
    ];

    pub fn code(&self) -> &'static str {
        match self {
            Self::Mon => "MON",
            Self::Tue => "TUE",
            Self::Wed => "WED",
            Self::Thu => "THU",
            Self::Fri => "FRI",
            Self::Sat => "SAT",
            Self::Sun => "SUN",
        }
    }

    pub fn weekday(&self) -> Weekday {
        match self {
            Self::Mon => Weekday::Mon,
            Self::Tue => Weekday::Tue,
            Self::Wed => Weekday::Wed,
            Self::Thu => Weekday::Thu,
            Self::Fri => Weekday::Fri,
            Self::Sat => Weekday::Sat,
            Self::Sun => Weekday::Sun,
        }
    }
}

impl fmt::Display for DayOfWeek {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

// =============================================================================
// Model Output (input contract)
// =============================================================================

/// Course metadata. Dates are kept exactly as received.
///
/// A `null` timezone reads as absent.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CourseInfo {
    pub course_code: String,
    pub term_start: String,
    pub term_end: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timezone: Option<String>,
}

/// Week numbers arrive as JSON numbers; `2.0` counts as the integer 2,
/// the same as the schema's `integer` type.
fn week_number<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    struct WeekVisitor;

    impl<'de> Visitor<'de> for WeekVisitor {
        type Value = i64;

        fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str("an integral week number")
        }

        fn visit_i64<E: de::Error>(self, v: i64) -> Result<i64, E> {
            Ok(v)
        }

        fn visit_u64<E: de::Error>(self, v: u64) -> Result<i64, E> {
            i64::try_from(v).map_err(|_| E::invalid_value(Unexpected::Unsigned(v), &self))
        }

        fn visit_f64<E: de::Error>(self, v: f64) -> Result<i64, E> {
            if v.fract() == 0.0 && v >= i64::MIN as f64 && v < i64::MAX as f64 {
                Ok(v as i64)
            } else {
                Err(E::invalid_value(Unexpected::Float(v), &self))
            }
        }
    }

    deserializer.deserialize_any(WeekVisitor)
}

/// A weekly assignment, e.g. "Weekly Quiz, every FRI 23:59, weeks 2-10".
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RecurringRule {
    pub title: String,
    #[serde(deserialize_with = "week_number")]
    pub start_week: i64,
    #[serde(deserialize_with = "week_number")]
    pub end_week: i64,
    pub day_of_week: DayOfWeek,
    pub due_time_local: String,
    /// Free text; any "Week N" inside marks week N as skipped.
    #[serde(default)]
    pub exceptions: Vec<String>,
    #[serde(default)]
    pub notes: String,
}

/// An assignment with one explicit date.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OneOffItem {
    pub title: String,
    pub date_local: String,
    pub due_time_local: String,
    #[serde(default)]
    pub notes: String,
}

/// Validated root of the extraction contract.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ModelOutput {
    pub recurring: Vec<RecurringRule>,
    pub one_off: Vec<OneOffItem>,
    pub course_info: CourseInfo,
}

// =============================================================================
// Term
// =============================================================================

/// Term bounds resolved to calendar dates in a concrete zone.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Term {
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub timezone: Tz,
}

impl Term {
    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.start && date <= self.end
    }
}

// =============================================================================
// Occurrence
// =============================================================================

/// One concrete week of a recurring rule.
#[derive(Debug, Clone, PartialEq)]
pub struct Occurrence {
    pub title: String,
    pub week: i64,
    pub date: NaiveDate,
    pub due_time_local: String,
    pub day_of_week: DayOfWeek,
    pub notes: String,
}

// =============================================================================
// Rows
// =============================================================================

/// Where a row came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RowType {
    Recurring,
    #[serde(rename = "One-Off")]
    OneOff,
}

impl RowType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Recurring => "Recurring",
            Self::OneOff => "One-Off",
        }
    }
}

impl fmt::Display for RowType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One spreadsheet line. Field order matches the CSV header.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Row {
    #[serde(rename = "Course")]
    pub course: String,
    #[serde(rename = "Title")]
    pub title: String,
    #[serde(rename = "Type")]
    pub row_type: RowType,
    #[serde(rename = "Week")]
    pub week: String,
    #[serde(rename = "DateLocal")]
    pub date_local: String,
    #[serde(rename = "DueTimeLocal")]
    pub due_time_local: String,
    #[serde(rename = "DayOfWeek")]
    pub day_of_week: String,
    #[serde(rename = "Notes")]
    pub notes: String,
}

impl Row {
    pub fn one_off(course: &str, item: &OneOffItem) -> Self {
        Self {
            course: course.to_string(),
            title: item.title.clone(),
            row_type: RowType::OneOff,
            week: String::new(),
            date_local: item.date_local.clone(),
            due_time_local: item.due_time_local.clone(),
            day_of_week: String::new(),
            notes: item.notes.clone(),
        }
    }

    pub fn recurring(course: &str, occurrence: Occurrence) -> Self {
        Self {
            course: course.to_string(),
            title: occurrence.title,
            row_type: RowType::Recurring,
            week: occurrence.week.to_string(),
            date_local: occurrence.date.format("%Y-%m-%d").to_string(),
            due_time_local: occurrence.due_time_local,
            day_of_week: occurrence.day_of_week.code().to_string(),
            notes: occurrence.notes,
        }
    }
}
