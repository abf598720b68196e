//! Fully resolved partition bounds and the generated child-partition
//! records handed to the table-creation layer.

use crate::spec::{
    ColumnEncodingDirective, PartitionStrategy, StorageOption, SubPartitionSpec,
};
use crate::value::PartValue;
use serde::{Deserialize, Serialize};
use std::fmt;

/// One edge of a resolved RANGE bound: a concrete value, or a sentinel
/// meaning "no lower/upper limit". Sentinels order as always-least and
/// always-greatest; they are markers, not values of the column's domain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum RangeBound {
    Minvalue,
    Value(PartValue),
    Maxvalue,
}

impl RangeBound {
    pub fn value(&self) -> Option<&PartValue> {
        match self {
            Self::Value(v) => Some(v),
            Self::Minvalue | Self::Maxvalue => None,
        }
    }
}

impl fmt::Display for RangeBound {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Minvalue => f.write_str("MINVALUE"),
            Self::Value(v) => write!(f, "{v}"),
            Self::Maxvalue => f.write_str("MAXVALUE"),
        }
    }
}

/// A LIST bound value; `None` is the SQL NULL.
pub type ListValue = Option<PartValue>;

/// The resolved bound of one generated partition.
///
/// For RANGE partitions, `lower` and `upper` are `None` only while implicit
/// bounds are still being inferred; both are populated (possibly with
/// sentinels) on every bound the engine returns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneratedPartitionBound {
    pub strategy: PartitionStrategy,
    pub is_default: bool,
    pub lower: Option<Vec<RangeBound>>,
    pub upper: Option<Vec<RangeBound>>,
    pub list_values: Vec<ListValue>,
}

impl GeneratedPartitionBound {
    pub fn range(lower: Option<Vec<RangeBound>>, upper: Option<Vec<RangeBound>>) -> Self {
        Self {
            strategy: PartitionStrategy::Range,
            is_default: false,
            lower,
            upper,
            list_values: Vec::new(),
        }
    }

    pub fn list(values: Vec<ListValue>) -> Self {
        Self {
            strategy: PartitionStrategy::List,
            is_default: false,
            lower: None,
            upper: None,
            list_values: values,
        }
    }

    pub fn default_bound() -> Self {
        Self {
            strategy: PartitionStrategy::Default,
            is_default: true,
            lower: None,
            upper: None,
            list_values: Vec::new(),
        }
    }
}

/// One generated child partition, sufficient for physical creation without
/// further bound inference.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneratedPartition {
    pub name: String,
    pub bound: GeneratedPartitionBound,
    pub options: Vec<StorageOption>,
    pub access_method: Option<String>,
    pub tablespace: Option<String>,
    pub encodings: Vec<ColumnEncodingDirective>,
    /// Next-level specification the table-creation layer recurses into.
    pub sub_spec: Option<SubPartitionSpec>,
}
