//! Error taxonomy for partition expansion.
//!
//! Every variant is a definition-time error: the whole expansion call aborts
//! and the caller corrects the specification and resubmits. Structural
//! errors carry the source location of the offending clause where the parser
//! recorded one.

use partition_types::{PartType, PartitionStrategy, SourceLocation};
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum Error {
    #[error("missing boundary specification in partition \"{name}\" of type {strategy}")]
    MissingBoundSpec {
        name: String,
        strategy: PartitionStrategy,
        location: SourceLocation,
    },

    #[error("invalid boundary specification for {strategy} partition")]
    InvalidBoundSpec {
        strategy: PartitionStrategy,
        location: SourceLocation,
    },

    #[error("too many columns for RANGE partition -- only one column is allowed")]
    MultiColumnRangeKey,

    #[error("invalid number of {clause} values")]
    WrongBoundValueCount {
        clause: &'static str,
        location: SourceLocation,
    },

    #[error("EVERY clause requires START and END")]
    EveryRequiresStartEnd { location: SourceLocation },

    #[error("VALUES specification with more than one column not allowed")]
    MultiColumnListValue { location: SourceLocation },

    #[error("multiple default partitions are not allowed")]
    MultipleDefaultPartitions { location: SourceLocation },

    #[error("DEFAULT PARTITION requires a name")]
    UnnamedDefaultPartition { location: SourceLocation },

    #[error("no partitions specified at depth {depth}")]
    NoSubPartitions {
        depth: usize,
        location: SourceLocation,
    },

    #[error("invalid tablename specification")]
    InvalidTablename,

    #[error("unsupported partition strategy {strategy}")]
    UnsupportedStrategy { strategy: PartitionStrategy },

    #[error("partition \"{name}\" would expand to more than {limit} partitions")]
    TooManyPartitions { name: String, limit: usize },

    #[error(
        "collation of partition bound value for column \"{column}\" does not match \
         partition key collation \"{collation}\""
    )]
    CollationMismatch { column: String, collation: String },

    #[error("specified value cannot be cast to type {target} for column \"{column}\"")]
    CannotCast {
        target: PartType,
        column: String,
        location: SourceLocation,
    },

    #[error("operator does not exist: {left} + {right}")]
    OperatorNotFound { left: PartType, right: String },

    #[error("cannot use NULL with range partition specification")]
    NullRangeBound { location: SourceLocation },

    #[error("EVERY parameter too small")]
    EveryTooSmall { location: SourceLocation },

    #[error("END parameter not reached before type overflows")]
    EndNotReachedBeforeOverflow { location: SourceLocation },

    #[error("DEFAULT COLUMN ENCODING clause specified more than once for partition")]
    DuplicateDefaultEncoding { location: SourceLocation },
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

impl Error {
    /// Source location of the offending clause, when one was recorded.
    pub fn location(&self) -> SourceLocation {
        match self {
            Self::MissingBoundSpec { location, .. }
            | Self::InvalidBoundSpec { location, .. }
            | Self::WrongBoundValueCount { location, .. }
            | Self::EveryRequiresStartEnd { location }
            | Self::MultiColumnListValue { location }
            | Self::MultipleDefaultPartitions { location }
            | Self::UnnamedDefaultPartition { location }
            | Self::NoSubPartitions { location, .. }
            | Self::CannotCast { location, .. }
            | Self::NullRangeBound { location }
            | Self::EveryTooSmall { location }
            | Self::EndNotReachedBeforeOverflow { location }
            | Self::DuplicateDefaultEncoding { location } => *location,
            Self::MultiColumnRangeKey
            | Self::InvalidTablename
            | Self::UnsupportedStrategy { .. }
            | Self::TooManyPartitions { .. }
            | Self::CollationMismatch { .. }
            | Self::OperatorNotFound { .. } => SourceLocation::UNKNOWN,
        }
    }
}
