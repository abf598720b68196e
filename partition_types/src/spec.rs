//! The parsed legacy partitioning specification tree.
//!
//! These types are produced by the statement parser and consumed once by the
//! expansion engine. A specification names a strategy per level and, for
//! RANGE, may express boundaries implicitly through START/END/EVERY instead
//! of enumerating every child.

use crate::value::{Collation, Interval};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Offset of a clause within the submitted statement, kept for error
/// reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SourceLocation(i32);

impl SourceLocation {
    /// No position was recorded for the clause.
    pub const UNKNOWN: Self = Self(-1);

    pub fn new(offset: u32) -> Self {
        Self(offset as i32)
    }

    pub fn is_known(&self) -> bool {
        self.0 >= 0
    }
}

impl Default for SourceLocation {
    fn default() -> Self {
        Self::UNKNOWN
    }
}

impl fmt::Display for SourceLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_known() {
            write!(f, "character {}", self.0)
        } else {
            f.write_str("unknown location")
        }
    }
}

/// Partitioning strategy of one hierarchy level, or of a generated bound.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PartitionStrategy {
    Range,
    List,
    /// The catch-all partition. Never valid as a key strategy; only appears
    /// on generated bounds.
    Default,
}

impl PartitionStrategy {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Range => "RANGE",
            Self::List => "LIST",
            Self::Default => "DEFAULT",
        }
    }
}

impl fmt::Display for PartitionStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Literal forms the parser can hand the engine for a bound or step value.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BoundLiteral {
    Null,
    Int(i64),
    String(String),
    Interval(Interval),
}

/// A bound or step value expression: a literal plus the collation the user
/// attached to it, if any, and where it appeared.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValueExpr {
    pub value: BoundLiteral,
    pub collation: Collation,
    pub location: SourceLocation,
}

impl ValueExpr {
    pub fn new(value: BoundLiteral) -> Self {
        Self {
            value,
            collation: Collation::Default,
            location: SourceLocation::UNKNOWN,
        }
    }

    pub fn int(value: i64) -> Self {
        Self::new(BoundLiteral::Int(value))
    }

    pub fn string(value: impl Into<String>) -> Self {
        Self::new(BoundLiteral::String(value.into()))
    }

    pub fn interval(value: Interval) -> Self {
        Self::new(BoundLiteral::Interval(value))
    }

    pub fn null() -> Self {
        Self::new(BoundLiteral::Null)
    }

    pub fn at(mut self, location: SourceLocation) -> Self {
        self.location = location;
        self
    }

    pub fn with_collation(mut self, collation: Collation) -> Self {
        self.collation = collation;
        self
    }
}

/// START/END/EVERY boundary pattern of one RANGE element.
///
/// Each clause carries one expression per partition-key column; RANGE keys
/// are restricted to a single column, and a mismatching count is a
/// definition error.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RangeBoundExpr {
    pub start: Option<Vec<ValueExpr>>,
    pub end: Option<Vec<ValueExpr>>,
    pub end_inclusive: bool,
    pub every: Option<Vec<ValueExpr>>,
    pub location: SourceLocation,
}

impl RangeBoundExpr {
    pub fn start_end(start: ValueExpr, end: ValueExpr) -> Self {
        Self {
            start: Some(vec![start]),
            end: Some(vec![end]),
            ..Self::default()
        }
    }

    pub fn with_every(mut self, every: ValueExpr) -> Self {
        self.every = Some(vec![every]);
        self
    }

    pub fn inclusive_end(mut self) -> Self {
        self.end_inclusive = true;
        self
    }
}

/// Enumerated value tuples of one LIST element. Multi-column tuples are
/// unsupported and rejected by the engine.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListBoundExpr {
    pub values: Vec<Vec<ValueExpr>>,
    pub location: SourceLocation,
}

impl ListBoundExpr {
    /// A single-column VALUES list, one tuple per expression.
    pub fn single_column(values: impl IntoIterator<Item = ValueExpr>) -> Self {
        Self {
            values: values.into_iter().map(|v| vec![v]).collect(),
            location: SourceLocation::UNKNOWN,
        }
    }
}

/// Strategy-specific boundary specification of one element.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum BoundSpec {
    Range(RangeBoundExpr),
    List(ListBoundExpr),
}

/// Value of one storage option.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum OptionValue {
    String(String),
    Int(i64),
    Bool(bool),
}

impl fmt::Display for OptionValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::String(v) => f.write_str(v),
            Self::Int(v) => write!(f, "{v}"),
            Self::Bool(v) => write!(f, "{v}"),
        }
    }
}

impl From<&str> for OptionValue {
    fn from(value: &str) -> Self {
        Self::String(value.to_owned())
    }
}

impl From<i64> for OptionValue {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<bool> for OptionValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

/// One name/value storage option. Options form an ordered list; the engine
/// treats the bag as opaque apart from the legacy `tablename` entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StorageOption {
    pub name: String,
    pub value: OptionValue,
}

impl StorageOption {
    pub fn new(name: impl Into<String>, value: impl Into<OptionValue>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// A per-column (or default) physical storage/compression directive.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnEncodingDirective {
    /// Column the directive applies to; absent on the default directive.
    pub column: Option<String>,
    pub options: Vec<StorageOption>,
    pub is_default: bool,
    pub location: SourceLocation,
}

impl ColumnEncodingDirective {
    pub fn for_column(column: impl Into<String>, options: Vec<StorageOption>) -> Self {
        Self {
            column: Some(column.into()),
            options,
            is_default: false,
            location: SourceLocation::UNKNOWN,
        }
    }

    /// The catch-all DEFAULT COLUMN ENCODING directive.
    pub fn default_directive(options: Vec<StorageOption>) -> Self {
        Self {
            column: None,
            options,
            is_default: true,
            location: SourceLocation::UNKNOWN,
        }
    }
}

/// One partition element of a definition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartitionDefElement {
    /// Explicit partition name; auto-numbered when absent.
    pub name: Option<String>,
    pub bound: Option<BoundSpec>,
    pub is_default: bool,
    pub options: Vec<StorageOption>,
    pub access_method: Option<String>,
    pub tablespace: Option<String>,
    pub encodings: Vec<ColumnEncodingDirective>,
    /// Nested next-level definition, used when the enclosing sub-partition
    /// specification is not a shared template.
    pub sub_spec: Option<PartitionDefinition>,
    pub location: SourceLocation,
}

impl PartitionDefElement {
    fn bare(name: Option<&str>) -> Self {
        Self {
            name: name.map(str::to_owned),
            bound: None,
            is_default: false,
            options: Vec::new(),
            access_method: None,
            tablespace: None,
            encodings: Vec::new(),
            sub_spec: None,
            location: SourceLocation::UNKNOWN,
        }
    }

    pub fn range(name: Option<&str>, bound: RangeBoundExpr) -> Self {
        Self {
            bound: Some(BoundSpec::Range(bound)),
            ..Self::bare(name)
        }
    }

    pub fn list(name: Option<&str>, bound: ListBoundExpr) -> Self {
        Self {
            bound: Some(BoundSpec::List(bound)),
            ..Self::bare(name)
        }
    }

    pub fn default_partition(name: &str) -> Self {
        Self {
            is_default: true,
            ..Self::bare(Some(name))
        }
    }
}

/// One entry of a partition definition. The specification grammar mixes
/// partition elements and configuration-level encoding directives in a
/// single list; the definition keeps that shape.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum PartitionDefItem {
    Element(PartitionDefElement),
    Encoding(ColumnEncodingDirective),
}

/// The ordered partition definition of one hierarchy level.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartitionDefinition {
    pub items: Vec<PartitionDefItem>,
    /// Whether this definition is a sub-partition template shared by all
    /// siblings of the enclosing level.
    pub is_template: bool,
    pub location: SourceLocation,
}

impl PartitionDefinition {
    pub fn new(elements: impl IntoIterator<Item = PartitionDefElement>) -> Self {
        Self {
            items: elements
                .into_iter()
                .map(PartitionDefItem::Element)
                .collect(),
            is_template: false,
            location: SourceLocation::UNKNOWN,
        }
    }

    pub fn push_encoding(&mut self, directive: ColumnEncodingDirective) {
        self.items.push(PartitionDefItem::Encoding(directive));
    }

    pub fn as_template(mut self) -> Self {
        self.is_template = true;
        self
    }

    /// Partition elements, in source order.
    pub fn elements(&self) -> impl Iterator<Item = &PartitionDefElement> {
        self.items.iter().filter_map(|item| match item {
            PartitionDefItem::Element(elem) => Some(elem),
            PartitionDefItem::Encoding(_) => None,
        })
    }

    /// Configuration-level encoding directives, in source order.
    pub fn encodings(&self) -> impl Iterator<Item = &ColumnEncodingDirective> {
        self.items.iter().filter_map(|item| match item {
            PartitionDefItem::Encoding(enc) => Some(enc),
            PartitionDefItem::Element(_) => None,
        })
    }
}

/// Sub-partitioning of the next hierarchy level: its strategy and key
/// columns, plus either a shared template definition or nothing (each
/// element then carries its own nested definition).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubPartitionSpec {
    pub strategy: PartitionStrategy,
    pub columns: Vec<String>,
    pub definition: Option<PartitionDefinition>,
    pub location: SourceLocation,
}
