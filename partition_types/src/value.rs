//! Typed partition-column values.
//!
//! The expansion engine does bound arithmetic and ordering over a closed set
//! of column types. Each type carries its own addition and comparison
//! behavior, selected once per compiled step expression rather than per
//! evaluation.

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Partition-column types supported by the expansion engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PartType {
    Int16,
    Int32,
    Int64,
    Date,
    Timestamp,
    Text,
}

impl PartType {
    /// SQL-facing type name, used in error messages.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Int16 => "smallint",
            Self::Int32 => "integer",
            Self::Int64 => "bigint",
            Self::Date => "date",
            Self::Timestamp => "timestamp without time zone",
            Self::Text => "text",
        }
    }
}

impl fmt::Display for PartType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A single partition bound value, typed per [`PartType`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PartValue {
    Int16(i16),
    Int32(i32),
    Int64(i64),
    Date(NaiveDate),
    Timestamp(NaiveDateTime),
    Text(String),
}

impl PartValue {
    pub fn part_type(&self) -> PartType {
        match self {
            Self::Int16(_) => PartType::Int16,
            Self::Int32(_) => PartType::Int32,
            Self::Int64(_) => PartType::Int64,
            Self::Date(_) => PartType::Date,
            Self::Timestamp(_) => PartType::Timestamp,
            Self::Text(_) => PartType::Text,
        }
    }
}

impl fmt::Display for PartValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int16(v) => write!(f, "{v}"),
            Self::Int32(v) => write!(f, "{v}"),
            Self::Int64(v) => write!(f, "{v}"),
            Self::Date(v) => write!(f, "{v}"),
            Self::Timestamp(v) => write!(f, "{v}"),
            Self::Text(v) => write!(f, "'{v}'"),
        }
    }
}

/// A step interval, in the months/days/microseconds shape interval-typed
/// EVERY clauses arrive in.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Interval {
    pub months: i32,
    pub days: i32,
    pub micros: i64,
}

impl Interval {
    pub fn from_months(months: i32) -> Self {
        Self {
            months,
            ..Self::default()
        }
    }

    pub fn from_days(days: i32) -> Self {
        Self {
            days,
            ..Self::default()
        }
    }

    pub fn from_micros(micros: i64) -> Self {
        Self {
            micros,
            ..Self::default()
        }
    }
}

/// Collation attached to a partition column or carried by an explicit
/// COLLATE clause on a bound value.
///
/// `Default` stands for "no explicit collation"; it is compatible with any
/// column collation. A named collation must match the column's exactly.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Collation {
    #[default]
    Default,
    Named(String),
}

impl Collation {
    pub fn named(name: impl Into<String>) -> Self {
        Self::Named(name.into())
    }

    pub fn is_default(&self) -> bool {
        matches!(self, Self::Default)
    }

    pub fn name(&self) -> &str {
        match self {
            Self::Default => "default",
            Self::Named(name) => name,
        }
    }
}

impl fmt::Display for Collation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
