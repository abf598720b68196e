//! Expansion of a legacy partitioning specification into the ordered list
//! of generated child partitions.

use crate::catalog::{ParentRelation, PartitionNamer};
use crate::encoding::merge_partition_encoding;
use crate::error::{Error, Result};
use crate::eval::coerce_bound_value;
use crate::every::PartEveryIterator;
use crate::order::deduce_implicit_range_bounds;
use partition_types::{
    BoundSpec, ColumnEncodingDirective, GeneratedPartition, GeneratedPartitionBound, OptionValue,
    PartitionDefElement, PartitionDefinition, PartitionStrategy, RangeBound, RangeBoundExpr,
    StorageOption, SubPartitionSpec, ValueExpr,
};
use tracing::debug;

/// Access method whose partitions carry column-encoding directives.
pub const COLUMN_ORIENTED_AM: &str = "aoco";

/// Ceiling on the partitions a single START/END/EVERY element may expand
/// to.
pub const MAX_GENERATED_PARTITIONS: usize = 32768;

/// Per-level naming state: 1-based depth in the partition hierarchy, the
/// running partition counter, and the legacy `tablename` override of the
/// element currently being expanded.
#[derive(Debug, Default)]
struct NamingContext {
    level: usize,
    partnum: usize,
    tablename: Option<String>,
}

impl NamingContext {
    fn bump(&mut self) -> usize {
        self.partnum += 1;
        self.partnum
    }
}

/// Expand `spec` into the ordered, fully resolved partition list for
/// `parent`.
///
/// Elements are processed with the default partition first so the
/// historical per-level numbering is reproduced, then the complete RANGE
/// result set is sorted and its implicit bounds are inferred. Errors abort
/// the whole call; no partial partition list is ever returned.
pub fn generate_partitions(
    parent: &dyn ParentRelation,
    spec: &PartitionDefinition,
    sub_spec: Option<&SubPartitionSpec>,
    parent_options: &[StorageOption],
    parent_access_method: Option<&str>,
    parent_encodings: &[ColumnEncodingDirective],
    namer: &mut dyn PartitionNamer,
) -> Result<Vec<GeneratedPartition>> {
    let key = parent.partition_key();
    let mut ctx = NamingContext {
        level: parent.ancestor_count() + 1,
        partnum: 0,
        tablename: None,
    };

    // The legacy name override never propagates through inheritance.
    let (_, parent_options) = extract_tablename(parent_options)?;

    let is_sub_template = sub_spec
        .and_then(|s| s.definition.as_ref())
        .is_some_and(|d| d.is_template);

    // Configuration-level directives live in the same list as the elements;
    // collect them and fold the parent-table level underneath.
    let config_encodings: Vec<_> = spec.encodings().cloned().collect();
    let config_encodings = merge_partition_encoding(&config_encodings, parent_encodings)?;

    // The default partition moves to the front of the processing list so it
    // always occupies counter slot 1 and the auto-numbered siblings keep
    // their historical numbers, wherever the default was written.
    let mut ordered: Vec<&PartitionDefElement> = Vec::new();
    let mut default_seen = false;
    for elem in spec.elements() {
        if elem.is_default {
            if default_seen {
                return Err(Error::MultipleDefaultPartitions {
                    location: elem.location,
                });
            }
            default_seen = true;
            ordered.insert(0, elem);
        } else {
            ordered.push(elem);
        }
    }

    debug!(
        parent = parent.name(),
        level = ctx.level,
        elements = ordered.len(),
        "expanding legacy partitioning specification"
    );

    let mut result = Vec::new();
    for elem in ordered {
        let effective_sub = match sub_spec {
            Some(sub) => {
                let mut sub = sub.clone();
                if !is_sub_template {
                    sub.definition = elem.sub_spec.clone();
                }
                if sub.definition.is_none() {
                    return Err(Error::NoSubPartitions {
                        depth: ctx.level + 1,
                        location: sub.location,
                    });
                }
                Some(sub)
            }
            None => None,
        };

        // The `tablename` option, when present, names the child directly;
        // it exists only so dump/restore reproduces historical names.
        let (tablename, options) = extract_tablename(&elem.options)?;
        ctx.tablename = tablename;

        let mut elem = elem.clone();
        elem.options = if options.is_empty() {
            parent_options.clone()
        } else {
            options
        };
        if elem.access_method.is_none() {
            elem.access_method = parent_access_method.map(str::to_owned);
        }
        if elem.tablespace.is_none() {
            elem.tablespace = parent.tablespace().map(str::to_owned);
        }
        if elem.access_method.as_deref() == Some(COLUMN_ORIENTED_AM) {
            elem.encodings = merge_partition_encoding(&elem.encodings, &config_encodings)?;
        }

        let new_parts = if elem.is_default {
            generate_default_partition(parent, namer, &mut ctx, &elem, effective_sub)?
        } else {
            match key.strategy {
                PartitionStrategy::Range => {
                    generate_range_partitions(parent, namer, &mut ctx, &elem, effective_sub)?
                }
                PartitionStrategy::List => {
                    generate_list_partition(parent, namer, &mut ctx, &elem, effective_sub)?
                }
                PartitionStrategy::Default => {
                    return Err(Error::UnsupportedStrategy {
                        strategy: key.strategy,
                    });
                }
            }
        };
        result.extend(new_parts);
    }

    // RANGE bounds may be partially specified; sort the complete sibling
    // set and infer what is missing.
    let result = if key.strategy == PartitionStrategy::Range {
        deduce_implicit_range_bounds(result, key)
    } else {
        result
    };

    debug!(partitions = result.len(), "expansion complete");
    Ok(result)
}

/// Expand one RANGE element, driving the START/END/EVERY iterator.
fn generate_range_partitions(
    parent: &dyn ParentRelation,
    namer: &mut dyn PartitionNamer,
    ctx: &mut NamingContext,
    elem: &PartitionDefElement,
    sub_spec: Option<SubPartitionSpec>,
) -> Result<Vec<GeneratedPartition>> {
    let bound = elem.bound.as_ref().ok_or_else(|| Error::MissingBoundSpec {
        name: elem.name.clone().unwrap_or_default(),
        strategy: PartitionStrategy::Range,
        location: elem.location,
    })?;
    let spec = match bound {
        BoundSpec::Range(spec) => spec,
        BoundSpec::List(_) => {
            return Err(Error::InvalidBoundSpec {
                strategy: PartitionStrategy::Range,
                location: elem.location,
            });
        }
    };

    let key = parent.partition_key();
    if key.num_columns() != 1 {
        return Err(Error::MultiColumnRangeKey);
    }
    let column = &key.columns[0];

    let start = single_bound_value(spec.start.as_deref(), key.num_columns(), "start", spec)?;
    let end = single_bound_value(spec.end.as_deref(), key.num_columns(), "end", spec)?;

    // A `tablename` override means this element is a restore of one
    // historical child; the EVERY clause is ignored even if present.
    let every = if ctx.tablename.is_none() {
        single_bound_value(spec.every.as_deref(), key.num_columns(), "every", spec)?
    } else {
        None
    };

    let iter = PartEveryIterator::new(column, start, end, spec.end_inclusive, every)?;

    let mut result = Vec::new();
    let mut suffix = 0;
    for item in iter {
        let (lower, upper) = item?;
        if result.len() >= MAX_GENERATED_PARTITIONS {
            return Err(Error::TooManyPartitions {
                name: elem.name.clone().unwrap_or_default(),
                limit: MAX_GENERATED_PARTITIONS,
            });
        }

        let bound = GeneratedPartitionBound::range(
            lower.map(|v| vec![RangeBound::Value(v)]),
            upper.map(|v| vec![RangeBound::Value(v)]),
        );

        let partname = match (&every, &elem.name) {
            (Some(_), Some(name)) => {
                suffix += 1;
                Some(format!("{name}_{suffix}"))
            }
            _ => elem.name.clone(),
        };

        result.push(make_partition(
            parent,
            namer,
            ctx,
            partname.as_deref(),
            bound,
            sub_spec.clone(),
            elem,
        ));
    }

    debug!(
        partition = elem.name.as_deref().unwrap_or(""),
        produced = result.len(),
        "expanded RANGE element"
    );
    Ok(result)
}

/// Expand one LIST element into a single partition covering all its values.
fn generate_list_partition(
    parent: &dyn ParentRelation,
    namer: &mut dyn PartitionNamer,
    ctx: &mut NamingContext,
    elem: &PartitionDefElement,
    sub_spec: Option<SubPartitionSpec>,
) -> Result<Vec<GeneratedPartition>> {
    let bound = elem.bound.as_ref().ok_or_else(|| Error::MissingBoundSpec {
        name: elem.name.clone().unwrap_or_default(),
        strategy: PartitionStrategy::List,
        location: elem.location,
    })?;
    let spec = match bound {
        BoundSpec::List(spec) => spec,
        BoundSpec::Range(_) => {
            return Err(Error::InvalidBoundSpec {
                strategy: PartitionStrategy::List,
                location: elem.location,
            });
        }
    };

    let key = parent.partition_key();
    let column = &key.columns[0];

    let mut list_values = Vec::with_capacity(spec.values.len());
    for tuple in &spec.values {
        if tuple.len() != 1 {
            return Err(Error::MultiColumnListValue {
                location: spec.location,
            });
        }
        list_values.push(coerce_bound_value(column, &tuple[0])?);
    }

    let bound = GeneratedPartitionBound::list(list_values);
    Ok(vec![make_partition(
        parent,
        namer,
        ctx,
        elem.name.as_deref(),
        bound,
        sub_spec,
        elem,
    )])
}

/// The catch-all partition: exactly one, no bounds, name required.
fn generate_default_partition(
    parent: &dyn ParentRelation,
    namer: &mut dyn PartitionNamer,
    ctx: &mut NamingContext,
    elem: &PartitionDefElement,
    sub_spec: Option<SubPartitionSpec>,
) -> Result<Vec<GeneratedPartition>> {
    let name = elem.name.as_deref().ok_or(Error::UnnamedDefaultPartition {
        location: elem.location,
    })?;
    let bound = GeneratedPartitionBound::default_bound();
    Ok(vec![make_partition(
        parent,
        namer,
        ctx,
        Some(name),
        bound,
        sub_spec,
        elem,
    )])
}

/// Assemble one generated partition, resolving its final relation name.
fn make_partition(
    parent: &dyn ParentRelation,
    namer: &mut dyn PartitionNamer,
    ctx: &mut NamingContext,
    partname: Option<&str>,
    bound: GeneratedPartitionBound,
    sub_spec: Option<SubPartitionSpec>,
    elem: &PartitionDefElement,
) -> GeneratedPartition {
    let name = match &ctx.tablename {
        Some(tablename) => tablename.clone(),
        None => {
            let level = ctx.level.to_string();
            let partnum = ctx.bump();
            match partname {
                Some(name) => namer.object_name(parent.name(), &level, &format!("prt_{name}")),
                None => namer.relation_name(parent.name(), &level, &format!("prt_{partnum}")),
            }
        }
    };

    GeneratedPartition {
        name,
        bound,
        options: elem.options.clone(),
        access_method: elem.access_method.clone(),
        tablespace: elem.tablespace.clone(),
        encodings: elem.encodings.clone(),
        sub_spec,
    }
}

/// Remove the legacy `tablename` option from an option list, returning the
/// name and the remaining options. Only the first occurrence is consumed.
fn extract_tablename(
    options: &[StorageOption],
) -> Result<(Option<String>, Vec<StorageOption>)> {
    let mut tablename = None;
    let mut rest = Vec::with_capacity(options.len());
    for opt in options {
        if tablename.is_none() && opt.name == "tablename" {
            match &opt.value {
                OptionValue::String(name) => tablename = Some(name.clone()),
                OptionValue::Int(_) | OptionValue::Bool(_) => {
                    return Err(Error::InvalidTablename);
                }
            }
        } else {
            rest.push(opt.clone());
        }
    }
    Ok((tablename, rest))
}

/// Validate one START/END/EVERY clause's value count against the partition
/// key and return its single expression.
fn single_bound_value<'a>(
    values: Option<&'a [ValueExpr]>,
    key_columns: usize,
    clause: &'static str,
    spec: &RangeBoundExpr,
) -> Result<Option<&'a ValueExpr>> {
    match values {
        Some(values) => {
            if values.len() != key_columns {
                return Err(Error::WrongBoundValueCount {
                    clause,
                    location: spec.location,
                });
            }
            Ok(values.first())
        }
        None => Ok(None),
    }
}
