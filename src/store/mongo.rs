//! MongoDB-backed record store
//!
//! Records live in one collection (`users` by default) with a unique index on
//! `id`. Ids come from a counters collection bumped atomically with
//! `findOneAndUpdate`, which keeps them increasing and never reused.

use async_trait::async_trait;
use bson::{Bson, Document, doc};
use futures::TryStreamExt;
use mongodb::options::{IndexOptions, ReturnDocument};
use mongodb::{Collection, Database, IndexModel};
use tracing::{debug, info};

use crate::error::mongo::extract_error_info;
use crate::error::{Result, RosterError, StoreError};
use crate::export::filter::FilterSpec;

use super::record::now_millis;
use super::{ListOrder, Record, RecordStore, validate_new_record};

/// Record store backed by a MongoDB collection
pub struct MongoRecordStore {
    /// Collection holding the records
    records: Collection<Document>,
    /// Collection holding id sequences
    counters: Collection<Document>,
    /// Key of this collection's sequence in `counters`
    sequence_key: String,
}

impl MongoRecordStore {
    /// Create a store over the given database
    ///
    /// # Arguments
    /// * `database` - Database handle
    /// * `collection` - Name of the records collection
    /// * `counters_collection` - Name of the id sequence collection
    pub fn new(database: &Database, collection: &str, counters_collection: &str) -> Self {
        Self {
            records: database.collection(collection),
            counters: database.collection(counters_collection),
            sequence_key: collection.to_string(),
        }
    }

    /// Create the unique index on `id` if it does not exist yet
    pub async fn ensure_indexes(&self) -> Result<()> {
        let index = IndexModel::builder()
            .keys(doc! { "id": 1 })
            .options(IndexOptions::builder().unique(true).build())
            .build();
        self.records.create_index(index).await?;
        debug!("Ensured unique id index on {}", self.records.name());
        Ok(())
    }

    /// Allocate the next record id
    async fn next_id(&self) -> Result<i64> {
        let counter = self
            .counters
            .find_one_and_update(
                doc! { "_id": self.sequence_key.as_str() },
                doc! { "$inc": { "seq": 1_i64 } },
            )
            .upsert(true)
            .return_document(ReturnDocument::After)
            .await?
            .ok_or_else(|| StoreError::InsertFailed("id sequence was not returned".to_string()))?;

        match counter.get("seq") {
            Some(Bson::Int64(n)) => Ok(*n),
            Some(Bson::Int32(n)) => Ok(i64::from(*n)),
            _ => Err(StoreError::InsertFailed("id sequence is not an integer".to_string()).into()),
        }
    }

    async fn find(&self, query: Document, order: ListOrder) -> Result<Vec<Record>> {
        let cursor = self
            .records
            .find(query)
            .sort(order.sort_document())
            .await
            .map_err(|e| store_failure(StoreError::QueryFailed, &e))?;
        let docs: Vec<Document> = cursor
            .try_collect()
            .await
            .map_err(|e| store_failure(StoreError::QueryFailed, &e))?;

        debug!("Fetched {} documents from {}", docs.len(), self.records.name());

        docs.iter()
            .map(|doc| Record::from_document(doc).map_err(RosterError::from))
            .collect()
    }

    /// Case-insensitive substring query for one field
    fn filter_query(filter: &FilterSpec) -> Document {
        let mut query = Document::new();
        query.insert(
            filter.field.as_str(),
            doc! { "$regex": regex::escape(&filter.pattern), "$options": "i" },
        );
        query
    }
}

/// Wrap a driver error into a store error carrying its structured summary
fn store_failure(kind: fn(String) -> StoreError, error: &mongodb::error::Error) -> RosterError {
    let detail = extract_error_info(error)
        .to_json_compact()
        .unwrap_or_else(|_| error.to_string());
    kind(detail).into()
}

#[async_trait]
impl RecordStore for MongoRecordStore {
    async fn insert(&self, name: &str, email: &str) -> Result<Record> {
        let (name, email) = validate_new_record(name, email)?;
        let id = self.next_id().await?;
        let record = Record::new(id, name, email, now_millis());

        self.records
            .insert_one(record.to_document())
            .await
            .map_err(|e| store_failure(StoreError::InsertFailed, &e))?;
        info!("Inserted record {} into {}", id, self.records.name());

        Ok(record)
    }

    async fn list(&self, order: ListOrder) -> Result<Vec<Record>> {
        self.find(Document::new(), order).await
    }

    async fn list_filtered(&self, order: ListOrder, filter: &FilterSpec) -> Result<Vec<Record>> {
        self.find(Self::filter_query(filter), order).await
    }
}
