//! Weekly rule expansion.
//!
//! Week `w` of a term spans the seven days starting at
//! `term_start + (w - 1) * 7`. A rule lands on the first day in that window
//! whose weekday matches `day_of_week`, so the term may start on any weekday.
//!
//! ```text
//! term_start = Wed 2025-09-03, rule = MON
//!
//! week 1: Wed 09-03 .. Tue 09-09  ->  Mon 09-08
//! week 2: Wed 09-10 .. Tue 09-16  ->  Mon 09-15
//! ```
//!
//! Weeks named in `exceptions` ("Week 7", "no lab week 3") are skipped, and
//! dates outside `[term_start, term_end]` are dropped without error.

use chrono::{Datelike, Days, NaiveDate};
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::BTreeSet;

use crate::models::{DayOfWeek, Occurrence, RecurringRule, Term};

static EXCEPTION_WEEK: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)week\s+(\d+)").expect("valid exception regex"));

/// Week numbers mentioned as "Week N" anywhere in `exceptions`.
pub fn exception_weeks(exceptions: &[String]) -> BTreeSet<i64> {
    exceptions
        .iter()
        .flat_map(|text| EXCEPTION_WEEK.captures_iter(text))
        .filter_map(|caps| caps[1].parse().ok())
        .collect()
}

/// First day of week `week` (1-based).
pub fn week_anchor(term_start: NaiveDate, week: i64) -> Option<NaiveDate> {
    let offset = u64::try_from(week.checked_sub(1)?).ok()?.checked_mul(7)?;
    term_start.checked_add_days(Days::new(offset))
}

/// The date in the seven days starting at `anchor` that falls on `day`.
pub fn date_for_weekday(anchor: NaiveDate, day: DayOfWeek) -> Option<NaiveDate> {
    let target = day.weekday().num_days_from_monday();
    let current = anchor.weekday().num_days_from_monday();
    let offset = (target + 7 - current) % 7;
    anchor.checked_add_days(Days::new(u64::from(offset)))
}

/// Expand one rule into its dated occurrences, in week order.
pub fn expand_rule(term: &Term, rule: &RecurringRule) -> Vec<Occurrence> {
    let skipped = exception_weeks(&rule.exceptions);
    let mut occurrences = Vec::new();

    for week in rule.start_week..=rule.end_week {
        if skipped.contains(&week) {
            continue;
        }

        let date = week_anchor(term.start, week)
            .and_then(|anchor| date_for_weekday(anchor, rule.day_of_week));
        let Some(date) = date.filter(|d| term.contains(*d)) else {
            continue;
        };

        occurrences.push(Occurrence {
            title: rule.title.clone(),
            week,
            date,
            due_time_local: rule.due_time_local.clone(),
            day_of_week: rule.day_of_week,
            notes: rule.notes.clone(),
        });
    }

    occurrences
}
