//! Error handling for roster.
//!
//! The taxonomy mirrors how a failure should be surfaced:
//! - `Validation` and `EmptyResult` are recoverable, user-facing conditions
//! - `Store` / `MongoDb` report the backing store verbatim
//! - `Serialization` / `Packaging` are fatal for the single export request
//!
//! MongoDB driver errors are rendered through [`mongo::extract_error_info`]
//! as structured JSON.

pub mod kinds;
pub mod mongo;

pub use kinds::{
    ConfigError, PackagingError, Result, RosterError, SerializationError, StoreError,
    ValidationError,
};
pub use mongo::ErrorInfo;
