//! Expansion of legacy declarative table-partitioning specifications into
//! fully explicit child-partition directives.
//!
//! A specification names a strategy per hierarchy level (RANGE, LIST, or a
//! DEFAULT catch-all) and, for RANGE, may express boundaries implicitly
//! through a START/END/EVERY pattern instead of enumerating every child.
//! [`generate_partitions`] resolves everything the specification leaves
//! implicit:
//!
//!   * START/END/EVERY patterns are stepped out into concrete `[start, end)`
//!     ranges through the column type's own `+` operator, with the final
//!     range clamped to END;
//!   * missing lower/upper bounds are inferred from sorted neighbors, or
//!     pinned to MINVALUE/MAXVALUE sentinels at the open ends;
//!   * partition names, storage options, access methods, tablespaces and
//!     per-column encoding directives are inherited and merged across the
//!     parent, configuration and element levels.
//!
//! The result is an ordered list of [`partition_types::GeneratedPartition`]
//! records, each sufficient for physical table creation without further
//! bound inference. The engine holds no state across calls and performs no
//! catalog access of its own; parents and naming are consumed through the
//! [`catalog`] seams.

pub mod catalog;
mod encoding;
mod error;
mod eval;
mod every;
mod expand;
mod ops;
mod order;

pub use catalog::{
    InMemoryNamer, ParentRelation, PartitionKey, PartitionKeyColumn, PartitionNamer,
    ResolvedRelation,
};
pub use error::{Error, Result};
pub use expand::{generate_partitions, COLUMN_ORIENTED_AM, MAX_GENERATED_PARTITIONS};
