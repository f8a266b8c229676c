//! Row building and ordering.

use crate::models::Row;
use crate::validation::ValidatedModel;

use super::expander::expand_rule;

/// All rows for a validated model, unsorted.
///
/// One-off items come first in input order, then every rule's occurrences
/// in rule declaration order.
pub fn build_rows(model: &ValidatedModel) -> Vec<Row> {
    let output = &model.output;
    let course = output.course_info.course_code.as_str();

    let one_off = output.one_off.iter().map(|item| Row::one_off(course, item));
    let recurring = output
        .recurring
        .iter()
        .flat_map(|rule| expand_rule(&model.term, rule))
        .map(|occurrence| Row::recurring(course, occurrence));

    one_off.chain(recurring).collect()
}

/// Stable sort by `(DateLocal, DueTimeLocal)`.
///
/// Both fields are fixed-width and zero-padded, so byte order is
/// chronological. Ties keep their build order.
pub fn sort_rows(rows: &mut [Row]) {
    rows.sort_by(|a, b| {
        (a.date_local.as_str(), a.due_time_local.as_str())
            .cmp(&(b.date_local.as_str(), b.due_time_local.as_str()))
    });
}
