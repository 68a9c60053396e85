//! The student record and its conversion from stored documents
//!
//! Documents are validated once, here, when they cross the store boundary.
//! Everything downstream works with typed [`Record`]s.

use bson::{Bson, Document, doc};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::SerializationError;
use crate::export::filter::FilterField;

/// One student entry.
///
/// `id` is assigned by the store and never reused; `created_at` is set once
/// at insert time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub created_at: DateTime<Utc>,
}

impl Record {
    /// Create a record with the given fields
    pub fn new(
        id: i64,
        name: impl Into<String>,
        email: impl Into<String>,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            email: email.into(),
            created_at,
        }
    }

    /// Text value of a filterable field
    pub fn field(&self, field: FilterField) -> &str {
        match field {
            FilterField::Name => &self.name,
            FilterField::Email => &self.email,
        }
    }

    /// Build a record from a stored document
    ///
    /// # Arguments
    /// * `doc` - Document as returned by the store
    ///
    /// # Returns
    /// * `Result<Record, SerializationError>` - Typed record, or the first
    ///   missing or mistyped field
    pub fn from_document(doc: &Document) -> Result<Self, SerializationError> {
        let id = match required(doc, "id")? {
            Bson::Int64(n) => *n,
            Bson::Int32(n) => i64::from(*n),
            other => return Err(invalid("id", format!("expected integer, found {other}"))),
        };

        let name = required_str(doc, "name")?;
        let email = required_str(doc, "email")?;

        let created_at = match required(doc, "created_at")? {
            Bson::DateTime(dt) => DateTime::from_timestamp_millis(dt.timestamp_millis())
                .ok_or_else(|| invalid("created_at", "timestamp out of range"))?,
            // Rows imported from SQL-backed deployments keep text timestamps
            Bson::String(text) => DateTime::parse_from_rfc3339(text)
                .map(|dt| dt.with_timezone(&Utc))
                .map_err(|e| invalid("created_at", e.to_string()))?,
            other => return Err(invalid("created_at", format!("expected date, found {other}"))),
        };

        Ok(Self {
            id,
            name,
            email,
            created_at,
        })
    }

    /// Convert the record to the document shape used by the store
    pub fn to_document(&self) -> Document {
        doc! {
            "id": self.id,
            "name": self.name.as_str(),
            "email": self.email.as_str(),
            "created_at": bson::DateTime::from_millis(self.created_at.timestamp_millis()),
        }
    }
}

/// Current time truncated to the millisecond precision the store keeps.
pub(crate) fn now_millis() -> DateTime<Utc> {
    let now = Utc::now();
    DateTime::from_timestamp_millis(now.timestamp_millis()).unwrap_or(now)
}

fn required<'a>(doc: &'a Document, field: &str) -> Result<&'a Bson, SerializationError> {
    match doc.get(field) {
        None | Some(Bson::Null) => Err(SerializationError::MissingField(field.to_string())),
        Some(value) => Ok(value),
    }
}

fn required_str(doc: &Document, field: &str) -> Result<String, SerializationError> {
    match required(doc, field)? {
        Bson::String(s) => Ok(s.clone()),
        other => Err(invalid(field, format!("expected string, found {other}"))),
    }
}

fn invalid(field: &str, reason: impl Into<String>) -> SerializationError {
    SerializationError::InvalidField {
        field: field.to_string(),
        reason: reason.into(),
    }
}
