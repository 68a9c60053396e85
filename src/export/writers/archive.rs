//! ZIP packager for export operations
//!
//! Wraps export text as the only entry of a ZIP archive. Entry timestamps and
//! permissions are pinned so the same input always produces the same bytes.

use std::io::{Cursor, Write};

use tracing::debug;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

use crate::error::{PackagingError, Result};
use crate::store::Record;

use super::csv::CsvWriter;
use super::{ExportFormat, FormatWriter};

/// Name of the CSV entry inside exported archives
pub const ARCHIVE_ENTRY_NAME: &str = "students.csv";

/// Writer for ZIP format
///
/// Serializes records with [`CsvWriter`] and stores the text under a single
/// named entry.
#[derive(Debug, Clone)]
pub struct ArchiveWriter {
    /// Entry name inside the archive
    entry_name: String,
    /// Serializer for the entry content
    csv: CsvWriter,
}

impl ArchiveWriter {
    /// Create an archive writer using the default entry name
    pub fn new() -> Self {
        Self::with_entry_name(ARCHIVE_ENTRY_NAME)
    }

    /// Create an archive writer with a custom entry name
    pub fn with_entry_name(entry_name: impl Into<String>) -> Self {
        Self {
            entry_name: entry_name.into(),
            csv: CsvWriter::new(),
        }
    }

    /// Entry name used for the packed text
    pub fn entry_name(&self) -> &str {
        &self.entry_name
    }
}

impl Default for ArchiveWriter {
    fn default() -> Self {
        Self::new()
    }
}

impl FormatWriter for ArchiveWriter {
    fn format(&self) -> ExportFormat {
        ExportFormat::Zip
    }

    fn encode(&self, records: &[Record]) -> Result<Vec<u8>> {
        let text = self.csv.serialize(records)?;
        pack(&self.entry_name, &text)
    }
}

/// Pack text as the sole entry of a ZIP archive
///
/// # Arguments
/// * `entry_name` - Name of the entry inside the archive
/// * `content` - Entry content, stored as UTF-8
///
/// # Returns
/// * `Result<Vec<u8>>` - Archive bytes
pub fn pack(entry_name: &str, content: &str) -> Result<Vec<u8>> {
    if entry_name.is_empty() {
        return Err(PackagingError::EmptyEntryName.into());
    }

    let options = SimpleFileOptions::default()
        .compression_method(CompressionMethod::Deflated)
        .last_modified_time(zip::DateTime::default())
        .unix_permissions(0o644);

    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
    writer
        .start_file(entry_name, options)
        .map_err(PackagingError::from)?;
    writer
        .write_all(content.as_bytes())
        .map_err(|e| PackagingError::Io(e.to_string()))?;
    let bytes = writer.finish().map_err(PackagingError::from)?.into_inner();

    debug!(
        "Packed {} bytes of text into {} bytes as '{}'",
        content.len(),
        bytes.len(),
        entry_name
    );
    Ok(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::RosterError;
    use crate::export::writers::csv::serialize;
    use chrono::{TimeZone, Utc};
    use std::io::Read;
    use zip::ZipArchive;

    fn unpack(bytes: &[u8]) -> Vec<(String, String)> {
        let mut archive = ZipArchive::new(Cursor::new(bytes)).unwrap();
        (0..archive.len())
            .map(|i| {
                let mut entry = archive.by_index(i).unwrap();
                let mut text = String::new();
                entry.read_to_string(&mut text).unwrap();
                (entry.name().to_string(), text)
            })
            .collect()
    }

    #[test]
    fn test_pack_empty_collection() {
        let text = serialize(&[]).unwrap();
        let bytes = pack(ARCHIVE_ENTRY_NAME, &text).unwrap();
        let entries = unpack(&bytes);
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].0, "students.csv");
        assert_eq!(entries[0].1, "ID,Name,Email,CreatedAt");
    }

    #[test]
    fn test_pack_is_deterministic() {
        let text = "ID,Name,Email,CreatedAt\n1,Alice,alice@x.com,2024-01-01T00:00:00Z";
        assert_eq!(pack("a.csv", text).unwrap(), pack("a.csv", text).unwrap());
    }

    #[test]
    fn test_pack_uses_deflate() {
        let bytes = pack("x.csv", &"repeat,".repeat(200)).unwrap();
        let mut archive = ZipArchive::new(Cursor::new(bytes)).unwrap();
        let entry = archive.by_index(0).unwrap();
        assert_eq!(entry.compression(), CompressionMethod::Deflated);
        assert!(entry.compressed_size() < entry.size());
    }

    #[test]
    fn test_pack_rejects_empty_entry_name() {
        assert!(matches!(
            pack("", "data"),
            Err(RosterError::Packaging(PackagingError::EmptyEntryName))
        ));
    }

    #[test]
    fn test_archive_writer_encodes_records() {
        let t = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let records = vec![Record::new(1, "Doe, Jane", "jane@x.com", t)];
        let writer = ArchiveWriter::new();
        let entries = unpack(&writer.encode(&records).unwrap());

        assert_eq!(writer.format(), ExportFormat::Zip);
        assert_eq!(entries[0].0, writer.entry_name());
        assert_eq!(entries[0].1, serialize(&records).unwrap());
    }
}
