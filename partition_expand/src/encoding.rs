//! Merge rules for column-encoding directives across the parent-table,
//! partition-configuration and element levels.

use crate::error::{Error, Result};
use partition_types::ColumnEncodingDirective;

/// Separate specific (named-column) directives from the single default
/// directive a list may carry.
fn split_encoding_clauses(
    encs: &[ColumnEncodingDirective],
) -> Result<(Vec<&ColumnEncodingDirective>, Option<&ColumnEncodingDirective>)> {
    let mut non_def = Vec::new();
    let mut def = None;
    for c in encs {
        if c.is_default {
            if def.is_some() {
                return Err(Error::DuplicateDefaultEncoding {
                    location: c.location,
                });
            }
            def = Some(c);
        } else {
            non_def.push(c);
        }
    }
    Ok((non_def, def))
}

/// Merge the encoding directives of one partition element with the
/// directives of the enclosing partition configuration.
///
/// Rules, in order:
///
/// 1. An element-level directive naming a specific column is never
///    overridden.
/// 2. Configuration-level directives naming a column the element does not
///    mention are appended to the element's list.
/// 3. If the element carries its own default directive, nothing more is
///    added.
/// 4. Otherwise the configuration's default directive, if any, is appended.
pub(crate) fn merge_partition_encoding(
    elem: &[ColumnEncodingDirective],
    config: &[ColumnEncodingDirective],
) -> Result<Vec<ColumnEncodingDirective>> {
    if config.is_empty() {
        return Ok(elem.to_vec());
    }
    // An element with no encodings of its own just adopts the
    // configuration-level set.
    if elem.is_empty() {
        return Ok(config.to_vec());
    }

    let (elem_nondefs, elem_def) = split_encoding_clauses(elem)?;
    let (config_nondefs, config_def) = split_encoding_clauses(config)?;

    let mut merged = elem.to_vec();
    for cd in config_nondefs {
        let mentioned = elem_nondefs.iter().any(|ed| ed.column == cd.column);
        if !mentioned {
            merged.push(cd.clone());
        }
    }

    if elem_def.is_none() {
        if let Some(def) = config_def {
            merged.push(def.clone());
        }
    }

    Ok(merged)
}
