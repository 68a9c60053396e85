//! CSV serializer for export operations
//!
//! Turns an ordered record sequence into the canonical export text:
//! a fixed header row, one row per record in the given order, values quoted
//! per RFC 4180 when they contain a delimiter, quote, or line break.

use std::borrow::Cow;
use std::fmt::Write;

use chrono::{DateTime, SecondsFormat, Utc};
use tracing::debug;

use crate::error::{Result, SerializationError};
use crate::store::Record;

use super::{ExportFormat, FormatWriter};

/// Column names of the export header row
pub const HEADERS: [&str; 4] = ["ID", "Name", "Email", "CreatedAt"];

const DELIMITER: char = ',';
const LINE_SEPARATOR: &str = "\n";

/// Writer for CSV format
///
/// The writer never re-sorts its input; ordering is the caller's contract.
#[derive(Debug, Clone, Copy, Default)]
pub struct CsvWriter;

impl CsvWriter {
    /// Create a new CSV writer
    pub fn new() -> Self {
        Self
    }

    /// Serialize records to CSV text
    ///
    /// # Arguments
    /// * `records` - Records in output order
    ///
    /// # Returns
    /// * `Result<String>` - Header-only text for an empty slice, otherwise
    ///   header plus one line per record, without a trailing newline
    pub fn serialize(&self, records: &[Record]) -> Result<String> {
        let mut out = String::with_capacity(32 * (records.len() + 1));

        Self::write_row(&mut out, &HEADERS)?;
        for record in records {
            out.push_str(LINE_SEPARATOR);
            let id = record.id.to_string();
            let created_at = format_timestamp(&record.created_at);
            Self::write_row(
                &mut out,
                &[
                    id.as_str(),
                    record.name.as_str(),
                    record.email.as_str(),
                    created_at.as_str(),
                ],
            )?;
        }

        debug!("Serialized {} records to CSV ({} bytes)", records.len(), out.len());
        Ok(out)
    }

    /// Append one delimited row
    fn write_row(out: &mut String, fields: &[&str]) -> Result<()> {
        for (i, field) in fields.iter().enumerate() {
            if i > 0 {
                out.push(DELIMITER);
            }
            write!(out, "{}", Self::escape_csv_value(field))
                .map_err(|e| SerializationError::Format(e.to_string()))?;
        }
        Ok(())
    }

    /// Escape a CSV value if necessary
    ///
    /// # Arguments
    /// * `value` - Value to escape
    ///
    /// # Returns
    /// * `Cow<str>` - The value itself, or the value wrapped in quotes with
    ///   embedded quotes doubled
    fn escape_csv_value(value: &str) -> Cow<'_, str> {
        if value.contains([DELIMITER, '"', '\n', '\r']) {
            Cow::Owned(format!("\"{}\"", value.replace('"', "\"\"")))
        } else {
            Cow::Borrowed(value)
        }
    }
}

impl FormatWriter for CsvWriter {
    fn format(&self) -> ExportFormat {
        ExportFormat::Csv
    }

    fn encode(&self, records: &[Record]) -> Result<Vec<u8>> {
        Ok(self.serialize(records)?.into_bytes())
    }
}

/// Render a timestamp as RFC 3339 UTC with the shortest exact fraction
///
/// e.g. `2024-01-02T03:04:05Z` or `2024-01-02T03:04:05.120Z`
pub fn format_timestamp(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::AutoSi, true)
}

/// Serialize records to the canonical export text
pub fn serialize(records: &[Record]) -> Result<String> {
    CsvWriter::new().serialize(records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn t1() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 6, 7, 8, 9).unwrap()
    }

    fn parse(text: &str) -> Vec<Vec<String>> {
        csv::ReaderBuilder::new()
            .has_headers(false)
            .from_reader(text.as_bytes())
            .records()
            .map(|row| row.unwrap().iter().map(str::to_string).collect())
            .collect()
    }

    #[test]
    fn test_empty_input_is_header_only() {
        assert_eq!(serialize(&[]).unwrap(), "ID,Name,Email,CreatedAt");
    }

    #[test]
    fn test_basic_rows() {
        let records = vec![
            Record::new(1, "Alice", "alice@x.com", t1()),
            Record::new(2, "Bob", "bob@y.com", t1()),
        ];
        let text = serialize(&records).unwrap();
        assert_eq!(
            text,
            "ID,Name,Email,CreatedAt\n\
             1,Alice,alice@x.com,2024-05-06T07:08:09Z\n\
             2,Bob,bob@y.com,2024-05-06T07:08:09Z"
        );
    }

    #[test]
    fn test_input_order_is_kept() {
        let records = vec![
            Record::new(9, "Zed", "z@x.com", t1()),
            Record::new(1, "Amy", "a@x.com", t1()),
        ];
        let text = serialize(&records).unwrap();
        let ids: Vec<&str> = text.lines().skip(1).map(|l| &l[..1]).collect();
        assert_eq!(ids, vec!["9", "1"]);
    }

    #[test]
    fn test_comma_in_name_keeps_four_columns() {
        let records = vec![Record::new(1, "Doe, Jane", "jane@x.com", t1())];
        let text = serialize(&records).unwrap();
        assert!(text.contains("1,\"Doe, Jane\",jane@x.com,"));

        let rows = parse(&text);
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[1].len(), 4);
        assert_eq!(rows[1][1], "Doe, Jane");
    }

    #[test]
    fn test_roundtrip_through_csv_reader() {
        let millis = Utc.timestamp_millis_opt(1_700_000_000_123).unwrap();
        let records = vec![
            Record::new(1, "Doe, Jane", "jane@x.com", t1()),
            Record::new(2, "The \"Rock\"", "rock@y.com", millis),
            Record::new(3, "Line\nBreak", "cr\r@z.com", t1()),
            Record::new(4, "Zoë", "", t1()),
        ];
        let rows = parse(&serialize(&records).unwrap());

        assert_eq!(rows[0], HEADERS);
        for (row, record) in rows[1..].iter().zip(&records) {
            assert_eq!(row[0].parse::<i64>().unwrap(), record.id);
            assert_eq!(row[1], record.name);
            assert_eq!(row[2], record.email);
            let parsed = DateTime::parse_from_rfc3339(&row[3]).unwrap();
            assert_eq!(parsed.with_timezone(&Utc), record.created_at);
        }
    }

    #[test]
    fn test_csv_escape_value() {
        assert_eq!(CsvWriter::escape_csv_value("simple"), "simple");
        assert_eq!(CsvWriter::escape_csv_value("with,comma"), "\"with,comma\"");
        assert_eq!(CsvWriter::escape_csv_value("with\"quote"), "\"with\"\"quote\"");
        assert_eq!(CsvWriter::escape_csv_value("with\nnewline"), "\"with\nnewline\"");
        assert_eq!(CsvWriter::escape_csv_value("with\rreturn"), "\"with\rreturn\"");
    }

    #[test]
    fn test_timestamp_format() {
        assert_eq!(format_timestamp(&t1()), "2024-05-06T07:08:09Z");
        let millis = Utc.timestamp_millis_opt(1_700_000_000_120).unwrap();
        assert_eq!(format_timestamp(&millis), "2023-11-14T22:13:20.120Z");
    }

    #[test]
    fn test_encode_matches_serialize() {
        let records = vec![Record::new(1, "Alice", "alice@x.com", t1())];
        let writer = CsvWriter::new();
        assert_eq!(
            writer.encode(&records).unwrap(),
            serialize(&records).unwrap().into_bytes()
        );
        assert_eq!(writer.format(), ExportFormat::Csv);
    }
}
