//! Error types for the data-loader crate.
//!
//! Every failure at the ingestion boundary maps onto one of these variants,
//! so nothing untyped ever reaches the ranking code.

use thiserror::Error;

/// Errors that can occur while loading and validating the attraction dataset
#[derive(Error, Debug)]
pub enum DataLoadError {
    /// File could not be found or opened
    #[error("Failed to open file: {path}")]
    FileNotFound { path: String },

    /// I/O error occurred while reading file
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// A data file was not valid JSON or did not match the record schema
    ///
    /// `reason` carries the serde message, which already includes line and column
    #[error("Malformed record in {file}: {reason}")]
    MalformedRecord { file: String, reason: String },

    /// A data field had an invalid value
    #[error("Invalid value for {field}: {value}")]
    InvalidValue { field: String, value: String },

    /// Referenced entity doesn't exist (e.g., review for an unknown attraction)
    #[error("Missing reference: {entity} with id {id}")]
    MissingReference { entity: String, id: String },

    /// Data validation failed
    #[error("Validation failed: {0}")]
    ValidationError(String),
}

/// Convenience type alias for Results in this crate
pub type Result<T> = std::result::Result<T, DataLoadError>;
