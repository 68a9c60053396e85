//! Filter engine for narrowing a record set
//!
//! A [`FilterSpec`] pairs a record field with a case-insensitive substring
//! pattern. Several specs combine with logical AND. An empty pattern matches
//! every record, since every string contains the empty string; callers that
//! want to reject empty input must do so before filtering.

use std::fmt;
use std::str::FromStr;

use crate::error::ConfigError;
use crate::store::Record;

/// Record field a filter can match against
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FilterField {
    Name,
    Email,
}

impl FilterField {
    /// Field name as stored
    pub fn as_str(&self) -> &'static str {
        match self {
            FilterField::Name => "name",
            FilterField::Email => "email",
        }
    }
}

impl fmt::Display for FilterField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FilterField {
    type Err = ConfigError;

    /// Unknown fields are a configuration error, never silently skipped.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "name" => Ok(FilterField::Name),
            "email" => Ok(FilterField::Email),
            _ => Err(ConfigError::InvalidValue {
                field: "filter field".to_string(),
                value: s.to_string(),
            }),
        }
    }
}

/// A single field-level substring predicate
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterSpec {
    pub field: FilterField,
    pub pattern: String,
}

impl FilterSpec {
    pub fn new(field: FilterField, pattern: impl Into<String>) -> Self {
        Self {
            field,
            pattern: pattern.into(),
        }
    }

    /// Whether the pattern is empty and therefore matches everything
    pub fn is_empty(&self) -> bool {
        self.pattern.is_empty()
    }

    /// Whether the record's field contains the pattern, ignoring case
    pub fn matches(&self, record: &Record) -> bool {
        if self.pattern.is_empty() {
            return true;
        }
        record
            .field(self.field)
            .to_lowercase()
            .contains(&self.pattern.to_lowercase())
    }
}

/// Keep the records matching every filter, in their original order
///
/// # Arguments
/// * `records` - Record sequence, possibly empty
/// * `filters` - Zero or more specs combined with AND
///
/// # Returns
/// * `Vec<Record>` - `records` unchanged when `filters` is empty, otherwise
///   the matching subsequence
pub fn apply(records: Vec<Record>, filters: &[FilterSpec]) -> Vec<Record> {
    if filters.is_empty() {
        return records;
    }

    records
        .into_iter()
        .filter(|record| filters.iter().all(|spec| spec.matches(record)))
        .collect()
}
