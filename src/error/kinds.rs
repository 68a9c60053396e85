use std::{fmt, io};

use crate::error::mongo::format_mongodb_error;

/// Crate-wide `Result` type using [`RosterError`] as the error.
///
/// This alias is re-exported by the parent `error` module and is intended
/// to be used throughout the crate for fallible operations.
pub type Result<T> = std::result::Result<T, RosterError>;

/// Top-level error type for roster operations.
///
/// Every failure path of the query and export pipeline ends up in one of
/// these variants, so callers can branch on the kind of failure instead of
/// inspecting messages.
#[derive(Debug)]
pub enum RosterError {
    /// Missing or malformed user input.
    Validation(ValidationError),

    /// The export matched no records.
    EmptyResult,

    /// Record store errors.
    Store(StoreError),

    /// MongoDB driver errors.
    MongoDb(mongodb::error::Error),

    /// Record data could not be turned into export text.
    Serialization(SerializationError),

    /// Export text could not be packed into an archive.
    Packaging(PackagingError),

    /// Configuration errors.
    Config(ConfigError),

    /// I/O errors.
    Io(io::Error),

    /// The operation was cancelled before it completed.
    Cancelled,
}

/// Input validation errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// A filtered export was requested but every filter value is empty.
    MissingFilterValue,

    /// A required input field was empty.
    MissingInput(String),
}

/// Record store errors.
#[derive(Debug)]
pub enum StoreError {
    /// No client has been established yet.
    NotConnected,

    /// Failed to reach the backing store.
    ConnectionFailed(String),

    /// A list request was rejected.
    QueryFailed(String),

    /// An insert request was rejected.
    InsertFailed(String),
}

/// Errors raised while turning records into export text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SerializationError {
    /// A stored record lacks a required field.
    MissingField(String),

    /// A stored record carries a field of the wrong type.
    InvalidField { field: String, reason: String },

    /// Writing the text failed.
    Format(String),
}

/// Errors raised while packing export text into an archive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PackagingError {
    /// The archive entry must have a name.
    EmptyEntryName,

    /// The ZIP writer rejected the content.
    Zip(String),

    /// Writing to the in-memory buffer failed.
    Io(String),
}

/// Configuration-specific errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// Config file not found.
    FileNotFound(String),

    /// Invalid config format.
    InvalidFormat(String),

    /// Invalid field value.
    InvalidValue { field: String, value: String },

    /// Anything else.
    Generic(String),
}

impl RosterError {
    /// Whether the error describes a condition the user can act on
    /// (bad input, nothing to export) rather than a failure.
    pub fn is_user_facing(&self) -> bool {
        matches!(self, RosterError::Validation(_) | RosterError::EmptyResult)
    }
}

/* ========================= Display & Error impls ========================= */

impl fmt::Display for RosterError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RosterError::Validation(e) => write!(f, "{e}"),
            RosterError::EmptyResult => write!(f, "No students found."),
            RosterError::Store(e) => write!(f, "Store error: {e}"),
            RosterError::MongoDb(e) => format_mongodb_error(f, e),
            RosterError::Serialization(e) => write!(f, "Serialization error: {e}"),
            RosterError::Packaging(e) => write!(f, "Packaging error: {e}"),
            RosterError::Config(e) => write!(f, "Configuration error: {e}"),
            RosterError::Io(e) => write!(f, "I/O error: {e}"),
            RosterError::Cancelled => write!(f, "Operation cancelled"),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationError::MissingFilterValue => {
                write!(f, "Missing filter value. Please enter a filter value.")
            }
            ValidationError::MissingInput(field) => write!(f, "Missing required input: {field}"),
        }
    }
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreError::NotConnected => write!(f, "Not connected to the record store"),
            StoreError::ConnectionFailed(msg) => write!(f, "Failed to connect: {msg}"),
            StoreError::QueryFailed(msg) => write!(f, "Query failed: {msg}"),
            StoreError::InsertFailed(msg) => write!(f, "Insert failed: {msg}"),
        }
    }
}

impl fmt::Display for SerializationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SerializationError::MissingField(field) => {
                write!(f, "Record is missing required field '{field}'")
            }
            SerializationError::InvalidField { field, reason } => {
                write!(f, "Record field '{field}' is invalid: {reason}")
            }
            SerializationError::Format(msg) => write!(f, "Failed to write text: {msg}"),
        }
    }
}

impl fmt::Display for PackagingError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PackagingError::EmptyEntryName => write!(f, "Archive entry name must not be empty"),
            PackagingError::Zip(msg) => write!(f, "Failed to build archive: {msg}"),
            PackagingError::Io(msg) => write!(f, "Failed to write archive: {msg}"),
        }
    }
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::FileNotFound(path) => write!(f, "Config file not found: {path}"),
            ConfigError::InvalidFormat(msg) => write!(f, "Invalid config format: {msg}"),
            ConfigError::InvalidValue { field, value } => {
                write!(f, "Invalid value '{value}' for field '{field}'")
            }
            ConfigError::Generic(msg) => write!(f, "{msg}"),
        }
    }
}

impl std::error::Error for RosterError {}
impl std::error::Error for ValidationError {}
impl std::error::Error for StoreError {}
impl std::error::Error for SerializationError {}
impl std::error::Error for PackagingError {}
impl std::error::Error for ConfigError {}

/* ========================= Conversions to RosterError ========================= */

impl From<io::Error> for RosterError {
    fn from(err: io::Error) -> Self {
        RosterError::Io(err)
    }
}

impl From<mongodb::error::Error> for RosterError {
    fn from(err: mongodb::error::Error) -> Self {
        RosterError::MongoDb(err)
    }
}

impl From<ValidationError> for RosterError {
    fn from(err: ValidationError) -> Self {
        RosterError::Validation(err)
    }
}

impl From<StoreError> for RosterError {
    fn from(err: StoreError) -> Self {
        RosterError::Store(err)
    }
}

impl From<SerializationError> for RosterError {
    fn from(err: SerializationError) -> Self {
        RosterError::Serialization(err)
    }
}

impl From<PackagingError> for RosterError {
    fn from(err: PackagingError) -> Self {
        RosterError::Packaging(err)
    }
}

impl From<ConfigError> for RosterError {
    fn from(err: ConfigError) -> Self {
        RosterError::Config(err)
    }
}

impl From<zip::result::ZipError> for PackagingError {
    fn from(err: zip::result::ZipError) -> Self {
        PackagingError::Zip(err.to_string())
    }
}
