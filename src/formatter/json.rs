//! JSON formatting for record listings
//!
//! Timestamps use the same text form as the CSV export so both outputs agree.

use serde_json::{Value, json};

use crate::error::{Result, SerializationError};
use crate::export::writers::csv::format_timestamp;
use crate::store::Record;

/// JSON formatter with pretty printing support
pub struct JsonFormatter {
    /// Enable pretty printing
    pretty: bool,
}

impl JsonFormatter {
    /// Create a new JSON formatter
    ///
    /// # Arguments
    /// * `pretty` - Enable pretty printing
    pub fn new(pretty: bool) -> Self {
        Self { pretty }
    }

    /// Format records as a JSON array
    ///
    /// # Arguments
    /// * `records` - Records in display order
    ///
    /// # Returns
    /// * `Result<String>` - JSON array string or error
    pub fn format(&self, records: &[Record]) -> Result<String> {
        let values: Vec<Value> = records.iter().map(record_to_json).collect();
        self.render(&Value::Array(values))
    }

    /// Format a single record as a JSON object
    pub fn format_record(&self, record: &Record) -> Result<String> {
        self.render(&record_to_json(record))
    }

    fn render(&self, value: &Value) -> Result<String> {
        let text = if self.pretty {
            serde_json::to_string_pretty(value)
        } else {
            serde_json::to_string(value)
        };
        text.map_err(|e| SerializationError::Format(e.to_string()).into())
    }
}

/// Convert a record into a JSON object keyed by field name
pub fn record_to_json(record: &Record) -> Value {
    json!({
        "id": record.id,
        "name": record.name,
        "email": record.email,
        "created_at": format_timestamp(&record.created_at),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn record() -> Record {
        let t = Utc.with_ymd_and_hms(2024, 1, 2, 3, 4, 5).unwrap();
        Record::new(7, "Dana", "dana@x.com", t)
    }

    #[test]
    fn test_compact_record() {
        let text = JsonFormatter::new(false).format_record(&record()).unwrap();
        assert!(!text.contains('\n'));
        assert_eq!(
            serde_json::from_str::<Value>(&text).unwrap(),
            json!({
                "id": 7,
                "name": "Dana",
                "email": "dana@x.com",
                "created_at": "2024-01-02T03:04:05Z",
            })
        );
    }

    #[test]
    fn test_pretty_array() {
        let text = JsonFormatter::new(true).format(&[record()]).unwrap();
        let parsed: Value = serde_json::from_str(&text).unwrap();
        assert_eq!(parsed[0]["id"], 7);
        assert_eq!(parsed[0]["created_at"], "2024-01-02T03:04:05Z");
        assert!(text.contains('\n'));
    }

    #[test]
    fn test_empty_array() {
        assert_eq!(JsonFormatter::new(false).format(&[]).unwrap(), "[]");
    }
}
