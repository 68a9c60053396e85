//! In-process record store

use std::sync::atomic::{AtomicI64, AtomicUsize, Ordering};

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::debug;

use crate::error::Result;
use crate::export::filter::{self, FilterSpec};

use super::record::now_millis;
use super::{ListOrder, Record, RecordStore, validate_new_record};

/// Record store kept entirely in memory
///
/// Ids start at 1 and increase by one per insert. Every list request is
/// counted so callers can tell how often the store was consulted.
pub struct MemoryRecordStore {
    records: RwLock<Vec<Record>>,
    next_id: AtomicI64,
    list_calls: AtomicUsize,
}

impl MemoryRecordStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::with_records(Vec::new())
    }

    /// Create a store seeded with existing records
    ///
    /// New inserts continue after the highest seeded id.
    pub fn with_records(records: Vec<Record>) -> Self {
        let next_id = records.iter().map(|r| r.id).max().unwrap_or(0) + 1;
        Self {
            records: RwLock::new(records),
            next_id: AtomicI64::new(next_id),
            list_calls: AtomicUsize::new(0),
        }
    }

    /// Number of list requests served so far
    pub fn list_calls(&self) -> usize {
        self.list_calls.load(Ordering::SeqCst)
    }

    async fn snapshot(&self, order: ListOrder) -> Vec<Record> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        let mut records = self.records.read().await.clone();
        match order {
            ListOrder::IdAscending => records.sort_by_key(|r| r.id),
        }
        records
    }
}

impl Default for MemoryRecordStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl RecordStore for MemoryRecordStore {
    async fn insert(&self, name: &str, email: &str) -> Result<Record> {
        let (name, email) = validate_new_record(name, email)?;
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        let record = Record::new(id, name, email, now_millis());

        self.records.write().await.push(record.clone());
        debug!("Inserted record {} into memory store", id);

        Ok(record)
    }

    async fn list(&self, order: ListOrder) -> Result<Vec<Record>> {
        Ok(self.snapshot(order).await)
    }

    async fn list_filtered(&self, order: ListOrder, filter: &FilterSpec) -> Result<Vec<Record>> {
        let records = self.snapshot(order).await;
        Ok(filter::apply(records, std::slice::from_ref(filter)))
    }
}
