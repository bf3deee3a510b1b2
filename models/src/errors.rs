// models/src/errors.rs

use std::io;
pub use thiserror::Error;
use anyhow::Error as AnyhowError;

use crate::identifiers::Identifier;

#[derive(Debug, Error)]
pub enum ClinicError {
    #[error("Storage error: {0}")]
    StorageError(String), // General storage operation error
    #[error("Serialization error: {0}")]
    SerializationError(String), // Error during data serialization
    #[error("Stored collection '{collection}' is corrupt: {reason}")]
    CorruptStore { collection: String, reason: String },
    #[error("Transaction error: {0}")]
    TransactionError(String),
    #[error("Invalid data provided: {0}")]
    InvalidData(String),

    #[error("record with identifier {0} was not found")]
    NotFound(Identifier),
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[cfg(feature = "sled-errors")]
    #[error(transparent)]
    Sled(#[from] sled::Error),
}

impl From<serde_json::Error> for ClinicError {
    fn from(err: serde_json::Error) -> Self {
        ClinicError::SerializationError(format!("JSON processing error: {}", err))
    }
}

impl From<AnyhowError> for ClinicError {
    fn from(err: AnyhowError) -> Self {
        ClinicError::StorageError(format!("Underlying storage operation failed: {}", err))
    }
}

/// A validation error raised before any write reaches the store.
#[derive(Debug, Error, PartialEq)]
pub enum ValidationError {
    /// A required form field was left empty.
    #[error("required field '{0}' is missing")]
    MissingField(&'static str),
    /// An identifier has an invalid length.
    #[error("identifier has invalid length")]
    InvalidIdentifierLength,
    /// Costs are money amounts and can't go below zero.
    #[error("cost must be a non-negative number, got {0}")]
    NegativeCost(f64),
    /// NaN or infinite.
    #[error("cost must be a finite amount, got {0}")]
    InvalidCost(f64),
    /// The incident points at a patient that doesn't exist.
    #[error("patient {0} does not exist")]
    UnknownPatient(String),
    /// An invalid date format was provided.
    #[error("invalid date format: {0}")]
    InvalidDateFormat(String),
    /// An incident status outside the known set.
    #[error("unknown incident status: {0}")]
    UnknownStatus(String),
    #[error("unknown role: {0}")]
    UnknownRole(String),
    #[error("invalid calendar month {year}-{month}")]
    InvalidMonth { year: i32, month: u32 },
    /// Not a `data:<mime>;base64,<payload>` string.
    #[error("malformed data URI: {0}")]
    MalformedDataUri(String),
}

/// A type alias for a `Result` that returns a `ClinicError` on failure.
pub type ClinicResult<T> = Result<T, ClinicError>;

/// A type alias for a `Result` that returns a `ValidationError` on failure.
pub type ValidationResult<T> = Result<T, ValidationError>;
