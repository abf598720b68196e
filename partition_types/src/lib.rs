//! Shared data model for legacy declarative table partitioning: the parsed
//! specification tree, typed partition-column values, and the fully
//! resolved partition records produced by the expansion engine.

pub mod bound;
pub mod spec;
pub mod value;

pub use bound::{GeneratedPartition, GeneratedPartitionBound, ListValue, RangeBound};
pub use spec::{
    BoundLiteral, BoundSpec, ColumnEncodingDirective, ListBoundExpr, OptionValue,
    PartitionDefElement, PartitionDefItem, PartitionDefinition, PartitionStrategy,
    RangeBoundExpr, SourceLocation, StorageOption, SubPartitionSpec, ValueExpr,
};
pub use value::{Collation, Interval, PartType, PartValue};
