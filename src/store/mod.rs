//! Record store clients
//!
//! The store owns the authoritative record set. The rest of the crate only
//! talks to it through the [`RecordStore`] trait:
//! - [`MongoRecordStore`] keeps records in a MongoDB collection
//! - [`MemoryRecordStore`] keeps them in process, for tests and embedding

use async_trait::async_trait;
use bson::{Document, doc};

use crate::error::{Result, ValidationError};
use crate::export::filter::FilterSpec;

pub mod memory;
pub mod mongo;
pub mod record;

pub use memory::MemoryRecordStore;
pub use mongo::MongoRecordStore;
pub use record::Record;

/// Ordering requested from the store when listing records
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ListOrder {
    /// Ascending by record id (insertion order)
    #[default]
    IdAscending,
}

impl ListOrder {
    /// Sort specification in MongoDB form
    pub fn sort_document(&self) -> Document {
        match self {
            ListOrder::IdAscending => doc! { "id": 1 },
        }
    }
}

/// Client for the backing record store
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Insert a new record
    ///
    /// # Arguments
    /// * `name` - Display name, must not be blank
    /// * `email` - Contact email, must not be blank
    ///
    /// # Returns
    /// * `Result<Record>` - The stored record with its assigned id
    async fn insert(&self, name: &str, email: &str) -> Result<Record>;

    /// List every record in the requested order
    async fn list(&self, order: ListOrder) -> Result<Vec<Record>>;

    /// List records whose field contains the pattern, ignoring case
    async fn list_filtered(&self, order: ListOrder, filter: &FilterSpec) -> Result<Vec<Record>>;
}

/// Trim and check the inputs of an insert before the store is contacted.
pub(crate) fn validate_new_record(name: &str, email: &str) -> Result<(String, String)> {
    let name = name.trim();
    let email = email.trim();

    if name.is_empty() {
        return Err(ValidationError::MissingInput("name".to_string()).into());
    }
    if email.is_empty() {
        return Err(ValidationError::MissingInput("email".to_string()).into());
    }

    Ok((name.to_string(), email.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::RosterError;

    #[test]
    fn test_validate_new_record_trims() {
        let (name, email) = validate_new_record("  Alice ", "alice@x.com\n").unwrap();
        assert_eq!(name, "Alice");
        assert_eq!(email, "alice@x.com");
    }

    #[test]
    fn test_validate_new_record_rejects_blank() {
        let err = validate_new_record("Alice", "   ").unwrap_err();
        assert!(matches!(
            err,
            RosterError::Validation(ValidationError::MissingInput(field)) if field == "email"
        ));
        assert!(validate_new_record("", "a@b.c").is_err());
    }

    #[test]
    fn test_sort_document() {
        assert_eq!(ListOrder::IdAscending.sort_document(), doc! { "id": 1 });
    }
}
