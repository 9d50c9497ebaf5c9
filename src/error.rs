//! Error types for the ledger merge pipeline.

use thiserror::Error;

use crate::types::record::{Field, Record, RecordType};

/// A rule table that cannot be applied.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A field rule without a derive function must copy exactly one raw field.
    #[error("rule for {field} has no derive function and {keys} source keys")]
    FieldRule { field: Field, keys: usize },

    /// Group keys must start or end with the record type.
    #[error("group key rule for {kind} must place the record type first or last")]
    GroupRule { kind: RecordType },

    #[error("unsupported date pattern {pattern:?}")]
    DatePattern { pattern: String },
}

/// A raw value that does not parse.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum MalformedInput {
    #[error("date {value:?} does not match {pattern:?}")]
    Date { value: String, pattern: String },

    #[error("invalid decimal {value:?}")]
    Decimal { value: String },

    #[error("date cannot be written with {pattern:?}")]
    Pattern { pattern: String },
}

/// Structural violations found while merging one group.
///
/// Every variant carries the records of the offending group.
#[derive(Debug, Error)]
pub enum MergeError {
    #[error("duplicate fee leg in group of {} records", .group.len())]
    DuplicateFeeLeg { group: Vec<Record> },

    #[error("duplicate {side} operation leg in group of {} records", .group.len())]
    DuplicateOperationLeg {
        side: &'static str,
        group: Vec<Record>,
    },

    #[error("missing {side} operation leg in group of {} records", .group.len())]
    MissingOperationLeg {
        side: &'static str,
        group: Vec<Record>,
    },

    #[error("wrong group size {}, expected {expected}", .group.len())]
    WrongGroupSize {
        expected: &'static str,
        group: Vec<Record>,
    },

    #[error("coin mismatch in staking group: {expected} vs {found}")]
    CoinMismatch {
        expected: String,
        found: String,
        group: Vec<Record>,
    },

    #[error("{field} overflows in group of {} records", .group.len())]
    AmountOverflow { field: Field, group: Vec<Record> },

    #[error("invalid amount {value:?} in {field}")]
    InvalidAmount {
        field: Field,
        value: String,
        group: Vec<Record>,
    },
}

impl MergeError {
    pub fn group(&self) -> &[Record] {
        match self {
            MergeError::DuplicateFeeLeg { group }
            | MergeError::DuplicateOperationLeg { group, .. }
            | MergeError::MissingOperationLeg { group, .. }
            | MergeError::WrongGroupSize { group, .. }
            | MergeError::CoinMismatch { group, .. }
            | MergeError::AmountOverflow { group, .. }
            | MergeError::InvalidAmount { group, .. } => group,
        }
    }
}

#[derive(Debug, Error)]
pub enum Error {
    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),

    #[error("malformed {field}: {source}")]
    Malformed {
        field: Field,
        source: MalformedInput,
    },

    #[error("merge failed: {0}")]
    Merge(#[from] MergeError),

    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}
