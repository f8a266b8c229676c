//! Transformation module.
//!
//! Model output to spreadsheet rows:
//! - Expander: recurring rules to dated occurrences
//! - Rows: occurrence and one-off rows, ordering
//! - Pipeline: validated end-to-end entry points

pub mod expander;
pub mod rows;
pub mod pipeline;

pub use expander::{date_for_weekday, exception_weeks, expand_rule, week_anchor};
pub use rows::{build_rows, sort_rows};
pub use pipeline::*;
