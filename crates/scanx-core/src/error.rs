//! # Errors
//!
//! Negotiation and partition enumeration failures are hard failures and reach the
//! caller unchanged. Statistics never fail at this layer: a backend that cannot
//! produce an estimate reports unknown values instead.

use crate::schema::DataType;

pub type Result<T> = std::result::Result<T, ScanError>;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ScanError {
    /// The backend rejected the whole pushdown call (e.g. a predicate on a column the
    /// table does not have). No partial negotiation result is recorded.
    #[error("Invalid predicate `{predicate}`: {reason}")]
    InvalidPredicate { predicate: String, reason: String },
    /// A required column is not part of the current read schema.
    #[error("Unknown column: {0}")]
    UnknownColumn(String),
    /// A required column exists but with a different type than requested.
    #[error("Column `{column}` has type {actual:?}, requested {requested:?}")]
    ColumnTypeMismatch {
        column: String,
        actual: DataType,
        requested: DataType,
    },
    /// The backend failed to enumerate partitions.
    #[error("Partition planning failed for {table}: {reason}")]
    Partitioning { table: String, reason: String },
    /// Any other backend-reported failure.
    #[error("Backend error: {0}")]
    Backend(String),
    /// Invalid configuration.
    #[error("Invalid configuration: {0}")]
    Config(String),
}
