//! Export coordinator for orchestrating export operations
//!
//! This module brings together the record store, the filter engine and the
//! format writers. One call to [`ExportCoordinator::execute`] runs the whole
//! pipeline and either returns a complete payload or an error; nothing
//! partial is ever produced.

use std::sync::Arc;
use std::time::Instant;

use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};

use crate::error::{Result, RosterError, ValidationError};
use crate::store::{ListOrder, Record, RecordStore};

use super::filter::{self, FilterSpec};
use super::writers::ExportFormat;

/// What to export and how
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportRequest {
    /// Filters to apply when `filtered` is set
    pub filters: Vec<FilterSpec>,
    /// Whether the caller asked for a filtered export
    pub filtered: bool,
    /// Output format
    pub format: ExportFormat,
}

impl ExportRequest {
    /// Export every record
    pub fn all(format: ExportFormat) -> Self {
        Self {
            filters: Vec::new(),
            filtered: false,
            format,
        }
    }

    /// Export the records matching `filters`
    pub fn filtered(filters: Vec<FilterSpec>, format: ExportFormat) -> Self {
        Self {
            filters,
            filtered: true,
            format,
        }
    }

    /// Whether filter input must be present before the store is contacted
    pub fn requires_filter_input(&self) -> bool {
        self.filtered
    }

    /// Check the request before any I/O happens
    ///
    /// A filtered export fails only when every filter value is empty; a
    /// single non-empty value is enough.
    pub fn validate(&self) -> Result<()> {
        if self.requires_filter_input() && self.filters.iter().all(FilterSpec::is_empty) {
            return Err(ValidationError::MissingFilterValue.into());
        }
        Ok(())
    }

    /// Suggested download name, e.g. `filtered_students.zip`
    pub fn filename(&self) -> String {
        let prefix = if self.filtered { "filtered" } else { "all" };
        format!("{}_students.{}", prefix, self.format.extension())
    }
}

/// Result of a successful export
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportPayload {
    /// File content
    pub content: Vec<u8>,
    /// Suggested file name
    pub filename: String,
    /// Format of `content`
    pub format: ExportFormat,
    /// Number of records exported
    pub record_count: usize,
}

/// Coordinator for export operations
///
/// Holds no state between calls; concurrent exports each fetch their own
/// snapshot of the store.
pub struct ExportCoordinator {
    /// Store to fetch records from
    store: Arc<dyn RecordStore>,
    /// Cancellation token for aborting the fetch
    cancel_token: Option<CancellationToken>,
}

impl ExportCoordinator {
    /// Create a new export coordinator
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        Self {
            store,
            cancel_token: None,
        }
    }

    /// Set cancellation token for this export operation
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel_token = Some(token);
        self
    }

    /// Execute the export operation
    ///
    /// 1. Reject a filtered request without any filter value
    /// 2. Fetch all records ordered by id
    /// 3. Apply the filters (filtered requests only)
    /// 4. Reject an empty result
    /// 5. Encode in the requested format
    /// 6. Name the payload
    ///
    /// # Arguments
    /// * `request` - Export request
    ///
    /// # Returns
    /// * `Result<ExportPayload>` - Complete payload or error
    pub async fn execute(&self, request: &ExportRequest) -> Result<ExportPayload> {
        request.validate()?;

        let start_time = Instant::now();
        info!(
            "Starting {} export ({})",
            if request.filtered { "filtered" } else { "full" },
            request.format
        );

        let records = self.fetch().await.inspect_err(|e| {
            if let RosterError::Serialization(inner) = e {
                error!("Stored record could not be read: {}", inner);
            }
        })?;
        let fetched = records.len();

        let records = if request.filtered {
            filter::apply(records, &request.filters)
        } else {
            records
        };
        debug!("{} of {} records selected", records.len(), fetched);

        if records.is_empty() {
            info!("Export matched no records");
            return Err(RosterError::EmptyResult);
        }

        let content = request
            .format
            .writer()
            .encode(&records)
            .inspect_err(|e| error!("Failed to encode {} export: {}", request.format, e))?;

        let payload = ExportPayload {
            content,
            filename: request.filename(),
            format: request.format,
            record_count: records.len(),
        };

        info!(
            "Export completed: {} records, {} bytes, {} ms",
            payload.record_count,
            payload.content.len(),
            start_time.elapsed().as_millis()
        );

        Ok(payload)
    }

    /// Fetch the full record set, giving up if the token is cancelled first
    async fn fetch(&self) -> Result<Vec<Record>> {
        let fetch = self.store.list(ListOrder::IdAscending);

        match &self.cancel_token {
            Some(token) => tokio::select! {
                biased;
                _ = token.cancelled() => {
                    info!("Export cancelled while fetching records");
                    Err(RosterError::Cancelled)
                }
                result = fetch => result,
            },
            None => fetch.await,
        }
    }
}

/// Run a single export against `store`
pub async fn export(store: Arc<dyn RecordStore>, request: &ExportRequest) -> Result<ExportPayload> {
    ExportCoordinator::new(store).execute(request).await
}
