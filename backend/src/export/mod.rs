//! CSV rendering of spreadsheet rows.
//!
//! Fields that contain a comma, a double quote or a line break are quoted
//! with inner quotes doubled; everything else is written verbatim. Lines end
//! with `\n`.

use csv::{QuoteStyle, Terminator, WriterBuilder};

use crate::error::{ExportError, ExportResult};
use crate::models::Row;

/// Fixed column order of the spreadsheet.
pub const CSV_HEADER: [&str; 8] = [
    "Course",
    "Title",
    "Type",
    "Week",
    "DateLocal",
    "DueTimeLocal",
    "DayOfWeek",
    "Notes",
];

/// Render rows (in the given order) as CSV text, header first.
pub fn rows_to_csv(rows: &[Row]) -> ExportResult<String> {
    let mut writer = WriterBuilder::new()
        .has_headers(false)
        .quote_style(QuoteStyle::Necessary)
        .terminator(Terminator::Any(b'\n'))
        .from_writer(Vec::new());

    writer.write_record(CSV_HEADER)?;
    for row in rows {
        writer.serialize(row)?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| ExportError::Flush(e.error().to_string()))?;
    Ok(String::from_utf8(bytes)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::RowType;

    fn row(title: &str, notes: &str) -> Row {
        Row {
            course: "CS 101".into(),
            title: title.into(),
            row_type: RowType::Recurring,
            week: "3".into(),
            date_local: "2025-09-19".into(),
            due_time_local: "23:59".into(),
            day_of_week: "FRI".into(),
            notes: notes.into(),
        }
    }

    #[test]
    fn test_header_only() {
        let csv = rows_to_csv(&[]).unwrap();
        assert_eq!(csv, "Course,Title,Type,Week,DateLocal,DueTimeLocal,DayOfWeek,Notes\n");
    }

    #[test]
    fn test_plain_fields_verbatim() {
        let csv = rows_to_csv(&[row("Weekly Quiz", "")]).unwrap();
        let line = csv.lines().nth(1).unwrap();
        assert_eq!(line, "CS 101,Weekly Quiz,Recurring,3,2025-09-19,23:59,FRI,");
    }

    #[test]
    fn test_comma_is_quoted() {
        let csv = rows_to_csv(&[row("Quiz, Part 2", "")]).unwrap();
        assert!(csv.contains(",\"Quiz, Part 2\","));
    }

    #[test]
    fn test_quotes_are_doubled() {
        let csv = rows_to_csv(&[row("Read \"Dune\"", "")]).unwrap();
        assert!(csv.contains(",\"Read \"\"Dune\"\"\","));
    }

    #[test]
    fn test_newline_is_quoted() {
        let csv = rows_to_csv(&[row("Lab", "bring goggles\nand gloves")]).unwrap();
        assert!(csv.ends_with(",\"bring goggles\nand gloves\"\n"));
    }

    #[test]
    fn test_one_off_label() {
        let mut one_off = row("Midterm", "");
        one_off.row_type = RowType::OneOff;
        one_off.week = String::new();
        one_off.day_of_week = String::new();
        let csv = rows_to_csv(&[one_off]).unwrap();
        assert_eq!(
            csv.lines().nth(1).unwrap(),
            "CS 101,Midterm,One-Off,,2025-09-19,23:59,,"
        );
    }

    #[test]
    fn test_header_round_trip() {
        let csv = rows_to_csv(&[row("Quiz, Part 2", "x")]).unwrap();
        let mut reader = csv::Reader::from_reader(csv.as_bytes());
        let headers: Vec<String> = reader.headers().unwrap().iter().map(String::from).collect();
        assert_eq!(headers, CSV_HEADER);

        let parsed: Vec<Row> = reader.deserialize().collect::<Result<_, _>>().unwrap();
        assert_eq!(parsed, vec![row("Quiz, Part 2", "x")]);
    }
}
