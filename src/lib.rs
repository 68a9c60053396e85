//! Roster library
//!
//! Student records kept in MongoDB, with a query and export pipeline that
//! turns a (possibly filtered) record set into CSV text or a ZIP archive.
//!
//! # Modules
//!
//! - `cli`: Command-line interface and argument parsing
//! - `config`: Configuration management
//! - `connection`: MongoDB connection management
//! - `error`: Error types and handling
//! - `export`: Filter engine, CSV serializer, archive packager and export coordinator
//! - `formatter`: Table and JSON output for record listings
//! - `store`: Record type and record store clients
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use roster::{config::Config, connection::ConnectionManager};
//! use roster::export::{ExportFormat, ExportRequest, export};
//! use roster::store::MongoRecordStore;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Config::default();
//!     let mut manager = ConnectionManager::new(config.connection.clone());
//!     manager.connect().await?;
//!
//!     let store = MongoRecordStore::new(
//!         &manager.database()?,
//!         &config.connection.collection,
//!         &config.connection.counters_collection,
//!     );
//!     let payload = export(Arc::new(store), &ExportRequest::all(ExportFormat::Csv)).await?;
//!     println!("{} records in {}", payload.record_count, payload.filename);
//!
//!     manager.disconnect().await?;
//!     Ok(())
//! }
//! ```

pub mod cli;
pub mod config;
pub mod connection;
pub mod error;
pub mod export;
pub mod formatter;
pub mod store;

// Re-export commonly used types
pub use config::Config;
pub use connection::ConnectionManager;
pub use error::{Result, RosterError};
pub use export::{ExportCoordinator, ExportFormat, ExportPayload, ExportRequest};
pub use formatter::Formatter;
pub use store::{MemoryRecordStore, MongoRecordStore, Record, RecordStore};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Get library version string
///
/// # Returns
/// * `&str` - Version string
pub fn version() -> &'static str {
    VERSION
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!version().is_empty());
    }
}
