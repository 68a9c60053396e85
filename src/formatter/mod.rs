//! Output formatting for roster
//!
//! Record listings are printed either as a table or as JSON, depending on
//! `display.format` and the `--format` flag of `roster list`.

pub mod json;
pub mod table;

pub use json::JsonFormatter;
pub use table::{TableFormatter, TableStyle};

use crate::config::OutputFormat;
use crate::error::Result;
use crate::store::Record;

/// Main formatter for record output
pub struct Formatter {
    /// Output format type
    format_type: OutputFormat,

    /// Enable colored output
    use_colors: bool,
}

impl Formatter {
    /// Create a new formatter
    ///
    /// # Arguments
    /// * `format_type` - Output format type
    /// * `use_colors` - Enable colored output
    pub fn new(format_type: OutputFormat, use_colors: bool) -> Self {
        Self {
            format_type,
            use_colors,
        }
    }

    /// Format a listing of records
    pub fn format_records(&self, records: &[Record]) -> Result<String> {
        match self.format_type {
            OutputFormat::Table => Ok(TableFormatter::with_colors(self.use_colors).format(records)),
            OutputFormat::Json => JsonFormatter::new(true).format(records),
        }
    }

    /// Format a single record, e.g. the one just inserted
    pub fn format_record(&self, record: &Record) -> Result<String> {
        match self.format_type {
            OutputFormat::Table => Ok(TableFormatter::with_colors(self.use_colors)
                .format(std::slice::from_ref(record))),
            OutputFormat::Json => JsonFormatter::new(true).format_record(record),
        }
    }
}
