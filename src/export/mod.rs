//! Query and export of student records
//!
//! # Architecture
//!
//! The export system is built on four components:
//!
//! 1. **filter**: narrows a record set with case-insensitive substring predicates
//! 2. **writers::csv**: serializes records into the canonical CSV text
//! 3. **writers::archive**: packs that text into a single-entry ZIP archive
//! 4. **coordinator**: runs fetch, filter, encode in order and names the payload
//!
//! A finished [`ExportPayload`] is handed to a [`DeliverySink`].
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use roster::export::{ExportCoordinator, ExportFormat, ExportRequest, FilterField, FilterSpec};
//! use roster::store::MemoryRecordStore;
//!
//! # async fn run() -> roster::Result<()> {
//! let store = Arc::new(MemoryRecordStore::new());
//! let request = ExportRequest::filtered(
//!     vec![FilterSpec::new(FilterField::Name, "ali")],
//!     ExportFormat::Zip,
//! );
//! let payload = ExportCoordinator::new(store).execute(&request).await?;
//! assert_eq!(payload.filename, "filtered_students.zip");
//! # Ok(())
//! # }
//! ```

pub mod coordinator;
pub mod filter;
pub mod sink;
pub mod writers;

pub use coordinator::{ExportCoordinator, ExportPayload, ExportRequest, export};
pub use filter::{FilterField, FilterSpec};
pub use sink::{DeliverySink, FileSink, StdoutSink};
pub use writers::{ArchiveWriter, CsvWriter, ExportFormat, FormatWriter};
