//! Store-backed subcommands: add, list, export, status
//!
//! Each function takes the store (or connection) it needs, so the binary can
//! run them against MongoDB and tests against an in-memory store.

use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::connection::{ConnectionManager, sanitize_uri};
use crate::error::Result;
use crate::export::{DeliverySink, ExportCoordinator, ExportRequest, FilterSpec, filter};
use crate::store::{ListOrder, Record, RecordStore};

/// Insert one record
///
/// # Arguments
/// * `store` - Record store
/// * `name` - Student name
/// * `email` - Student email
///
/// # Returns
/// * `Result<Record>` - The stored record
pub async fn add_record(store: &dyn RecordStore, name: &str, email: &str) -> Result<Record> {
    let record = store.insert(name, email).await?;
    info!("Added record {}", record.id);
    Ok(record)
}

/// List records ordered by id
///
/// The first non-empty pattern is matched by the store; any further ones
/// narrow the result locally.
///
/// # Arguments
/// * `store` - Record store
/// * `filters` - Patterns given on the command line
///
/// # Returns
/// * `Result<Vec<Record>>` - Matching records
pub async fn list_records(store: &dyn RecordStore, filters: &[FilterSpec]) -> Result<Vec<Record>> {
    let mut active = filters.iter().filter(|spec| !spec.is_empty());

    let Some(first) = active.next() else {
        return store.list(ListOrder::IdAscending).await;
    };

    let records = store.list_filtered(ListOrder::IdAscending, first).await?;
    let rest: Vec<FilterSpec> = active.cloned().collect();
    debug!(
        "Store matched {} records on {}, {} local filters left",
        records.len(),
        first.field,
        rest.len()
    );

    Ok(filter::apply(records, &rest))
}

/// Run an export and hand the payload to `sink`
///
/// # Arguments
/// * `store` - Record store
/// * `request` - Export request
/// * `sink` - Destination of the payload
/// * `cancel_token` - Cancels the fetch when triggered
///
/// # Returns
/// * `Result<String>` - Summary line naming where the file went
pub async fn run_export(
    store: Arc<dyn RecordStore>,
    request: &ExportRequest,
    sink: &dyn DeliverySink,
    cancel_token: CancellationToken,
) -> Result<String> {
    let payload = ExportCoordinator::new(store)
        .with_cancellation(cancel_token)
        .execute(request)
        .await?;

    let location = sink.deliver(&payload).await?;
    Ok(format!(
        "Exported {} record(s) to {}",
        payload.record_count, location
    ))
}

/// Ping the store and describe the connection
///
/// # Returns
/// * `Result<String>` - Multi-line status report
pub async fn connection_status(manager: &ConnectionManager) -> Result<String> {
    let health = manager.health_check().await?;
    let config = manager.config();

    let mut lines = vec![
        format!("URI:       {}", sanitize_uri(&config.uri)),
        format!("Database:  {}", config.database),
        format!(
            "Status:    {}",
            if health.is_healthy { "ok" } else { "unreachable" }
        ),
        format!("Latency:   {} ms", health.response_time_ms),
    ];
    if let Some(version) = health.server_version {
        lines.push(format!("Server:    MongoDB {}", version));
    }

    Ok(lines.join("\n"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{RosterError, ValidationError};
    use crate::export::{ExportFormat, FileSink, FilterField};
    use crate::store::MemoryRecordStore;

    async fn seeded() -> Arc<MemoryRecordStore> {
        let store = Arc::new(MemoryRecordStore::new());
        for (name, email) in [
            ("Alice", "alice@x.com"),
            ("Bob", "bob@y.com"),
            ("Alina", "alina@y.com"),
        ] {
            add_record(store.as_ref(), name, email).await.unwrap();
        }
        store
    }

    #[tokio::test]
    async fn test_add_record_assigns_ids() {
        let store = seeded().await;
        let record = add_record(store.as_ref(), "Carol", "carol@z.org").await.unwrap();
        assert_eq!(record.id, 4);
    }

    #[tokio::test]
    async fn test_add_record_rejects_blank_name() {
        let store = MemoryRecordStore::new();
        let err = add_record(&store, "  ", "a@b.c").await.unwrap_err();
        assert!(matches!(
            err,
            RosterError::Validation(ValidationError::MissingInput(_))
        ));
    }

    #[tokio::test]
    async fn test_list_without_filters() {
        let store = seeded().await;
        let records = list_records(store.as_ref(), &[]).await.unwrap();
        let ids: Vec<i64> = records.iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![1, 2, 3]);
    }

    #[tokio::test]
    async fn test_list_combines_store_and_local_filters() {
        let store = seeded().await;
        let filters = vec![
            FilterSpec::new(FilterField::Name, "ali"),
            FilterSpec::new(FilterField::Email, "Y.COM"),
        ];

        let records = list_records(store.as_ref(), &filters).await.unwrap();

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].name, "Alina");
    }

    #[tokio::test]
    async fn test_list_skips_empty_patterns() {
        let store = seeded().await;
        let filters = vec![
            FilterSpec::new(FilterField::Name, ""),
            FilterSpec::new(FilterField::Email, "x.com"),
        ];
        let records = list_records(store.as_ref(), &filters).await.unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].name, "Alice");
    }

    #[tokio::test]
    async fn test_run_export_writes_file() {
        let store = seeded().await;
        let dir = tempfile::tempdir().unwrap();
        let sink = FileSink::new(dir.path());
        let request = ExportRequest::filtered(
            vec![FilterSpec::new(FilterField::Name, "ALI")],
            ExportFormat::Csv,
        );

        let summary = run_export(store, &request, &sink, CancellationToken::new())
            .await
            .unwrap();

        assert!(summary.starts_with("Exported 2 record(s)"));
        let text = std::fs::read_to_string(dir.path().join("filtered_students.csv")).unwrap();
        assert_eq!(text.lines().count(), 3);
    }

    #[tokio::test]
    async fn test_run_export_empty_result_writes_nothing() {
        let store = seeded().await;
        let dir = tempfile::tempdir().unwrap();
        let sink = FileSink::new(dir.path());
        let request = ExportRequest::filtered(
            vec![FilterSpec::new(FilterField::Email, "nobody")],
            ExportFormat::Zip,
        );

        let err = run_export(store, &request, &sink, CancellationToken::new())
            .await
            .unwrap_err();

        assert_eq!(err.to_string(), "No students found.");
        assert!(!dir.path().join("filtered_students.zip").exists());
    }
}
