//! Format writers for export operations
//!
//! This module provides a unified interface for turning records into the
//! bytes of a downloadable file (CSV text, ZIP archive).

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, Result};
use crate::store::Record;

pub mod archive;
pub mod csv;

pub use self::archive::{ARCHIVE_ENTRY_NAME, ArchiveWriter, pack};
pub use self::csv::{CsvWriter, serialize};

/// Trait for encoding records into a file format
pub trait FormatWriter: Send + Sync {
    /// Format produced by this writer
    fn format(&self) -> ExportFormat;

    /// Encode records, in the given order, into file content
    ///
    /// # Arguments
    /// * `records` - Records to encode
    ///
    /// # Returns
    /// * `Result<Vec<u8>>` - File content
    fn encode(&self, records: &[Record]) -> Result<Vec<u8>>;
}

/// Downloadable export format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    /// Comma-separated text
    #[default]
    Csv,

    /// ZIP archive holding the CSV text
    Zip,
}

impl ExportFormat {
    /// File extension without the leading dot
    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Csv => "csv",
            ExportFormat::Zip => "zip",
        }
    }

    /// Writer producing this format
    pub fn writer(&self) -> Box<dyn FormatWriter> {
        match self {
            ExportFormat::Csv => Box::new(CsvWriter::new()),
            ExportFormat::Zip => Box::new(ArchiveWriter::new()),
        }
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

impl FromStr for ExportFormat {
    type Err = ConfigError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "csv" => Ok(ExportFormat::Csv),
            "zip" | "archive" => Ok(ExportFormat::Zip),
            _ => Err(ConfigError::InvalidValue {
                field: "export format".to_string(),
                value: s.to_string(),
            }),
        }
    }
}
