//! Total ordering over generated partitions and implicit-bound inference
//! for RANGE siblings.

use crate::catalog::PartitionKey;
use crate::ops::compare;
use partition_types::{GeneratedPartition, RangeBound};
use std::cmp::Ordering;

/// Compare two sentinel-or-value bounds under one key column's collation.
fn compare_bounds(a: &RangeBound, b: &RangeBound, key: &PartitionKey, col: usize) -> Ordering {
    match (a, b) {
        (RangeBound::Minvalue, RangeBound::Minvalue) => Ordering::Equal,
        (RangeBound::Maxvalue, RangeBound::Maxvalue) => Ordering::Equal,
        (RangeBound::Minvalue, _) => Ordering::Less,
        (_, RangeBound::Minvalue) => Ordering::Greater,
        (RangeBound::Maxvalue, _) => Ordering::Greater,
        (_, RangeBound::Maxvalue) => Ordering::Less,
        (RangeBound::Value(x), RangeBound::Value(y)) => {
            compare(x, y, &key.columns[col].collation)
        }
    }
}

/// Column-by-column comparison of two bound lists; the first non-equal
/// column decides.
fn compare_bound_lists(a: &[RangeBound], b: &[RangeBound], key: &PartitionKey) -> Ordering {
    for (col, (x, y)) in a.iter().zip(b.iter()).enumerate() {
        let ord = compare_bounds(x, y, key, col);
        if ord != Ordering::Equal {
            return ord;
        }
    }
    Ordering::Equal
}

/// Total-order comparator over two generated partitions' bounds.
///
/// Default partitions sort after everything else. Otherwise the lower
/// bounds decide when both exist, then the upper bounds, then the mixed
/// cases: when one side has only a lower bound and the other only an upper
/// bound and they compare equal, the upper-bound side sorts first, so a
/// range whose start must be inferred lands directly after the range
/// providing it.
pub(crate) fn compare_generated(
    a: &GeneratedPartition,
    b: &GeneratedPartition,
    key: &PartitionKey,
) -> Ordering {
    let ab = &a.bound;
    let bb = &b.bound;

    if ab.is_default != bb.is_default {
        return if bb.is_default {
            Ordering::Less
        } else {
            Ordering::Greater
        };
    }

    match (&ab.lower, &bb.lower, &ab.upper, &bb.upper) {
        (Some(al), Some(bl), _, _) => compare_bound_lists(al, bl, key),
        (_, _, Some(au), Some(bu)) => compare_bound_lists(au, bu, key),
        (Some(al), None, _, Some(bu)) => match compare_bound_lists(al, bu, key) {
            Ordering::Equal => Ordering::Greater,
            ord => ord,
        },
        (None, Some(bl), Some(au), _) => compare_bound_lists(au, bl, key),
        _ => Ordering::Equal,
    }
}

/// Sort RANGE siblings and fill in the bounds the specification left
/// implicit: a missing lower bound comes from the previous sibling's upper
/// bound (or the MINVALUE sentinel at the front), a missing upper bound
/// from the next sibling's lower bound (or MAXVALUE at the back).
///
/// Runs once over the complete sibling set; neighbor inference needs the
/// final sort order. The default partition sorts last and carries no range
/// bounds, so inference skips it.
pub(crate) fn deduce_implicit_range_bounds(
    mut parts: Vec<GeneratedPartition>,
    key: &PartitionKey,
) -> Vec<GeneratedPartition> {
    parts.sort_by(|a, b| compare_generated(a, b, key));

    let ranged = parts
        .iter()
        .take_while(|p| !p.bound.is_default)
        .count();

    for i in 0..ranged {
        if parts[i].bound.lower.is_none() {
            parts[i].bound.lower = if i == 0 {
                Some(vec![RangeBound::Minvalue])
            } else {
                parts[i - 1].bound.upper.clone()
            };
        }
        if parts[i].bound.upper.is_none() {
            parts[i].bound.upper = if i + 1 < ranged {
                parts[i + 1].bound.lower.clone()
            } else {
                Some(vec![RangeBound::Maxvalue])
            };
        }
    }

    parts
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::PartitionKeyColumn;
    use partition_types::{GeneratedPartitionBound, PartType, PartValue, PartitionStrategy};
    use pretty_assertions::assert_eq;

    fn key() -> PartitionKey {
        PartitionKey::single(
            PartitionStrategy::Range,
            PartitionKeyColumn::new("j", PartType::Int32),
        )
    }

    fn part(
        name: &str,
        lower: Option<i32>,
        upper: Option<i32>,
    ) -> GeneratedPartition {
        GeneratedPartition {
            name: name.to_owned(),
            bound: GeneratedPartitionBound::range(
                lower.map(|v| vec![RangeBound::Value(PartValue::Int32(v))]),
                upper.map(|v| vec![RangeBound::Value(PartValue::Int32(v))]),
            ),
            options: Vec::new(),
            access_method: None,
            tablespace: None,
            encodings: Vec::new(),
            sub_spec: None,
        }
    }

    fn default_part(name: &str) -> GeneratedPartition {
        GeneratedPartition {
            bound: GeneratedPartitionBound::default_bound(),
            ..part(name, None, None)
        }
    }

    #[test]
    fn lower_bounds_decide_when_both_exist() {
        let k = key();
        let a = part("a", Some(10), Some(20));
        let b = part("b", Some(0), Some(10));
        assert_eq!(compare_generated(&a, &b, &k), Ordering::Greater);
        assert_eq!(compare_generated(&b, &a, &k), Ordering::Less);
    }

    #[test]
    fn equal_lower_and_upper_puts_the_upper_side_first() {
        let k = key();
        let lower_only = part("lower", Some(10), None);
        let upper_only = part("upper", None, Some(10));
        assert_eq!(
            compare_generated(&lower_only, &upper_only, &k),
            Ordering::Greater
        );
        assert_eq!(
            compare_generated(&upper_only, &lower_only, &k),
            Ordering::Less
        );
    }

    #[test]
    fn default_sorts_after_everything() {
        let k = key();
        let d = default_part("other");
        let p = part("p", Some(100), None);
        assert_eq!(compare_generated(&d, &p, &k), Ordering::Greater);
        assert_eq!(compare_generated(&p, &d, &k), Ordering::Less);
    }

    #[test]
    fn implicit_bounds_fill_from_neighbors_and_sentinels() {
        let k = key();
        let parts = vec![
            part("mid", Some(10), Some(20)),
            part("tail", Some(20), None),
            part("head", None, Some(10)),
        ];
        let resolved = deduce_implicit_range_bounds(parts, &k);

        let names: Vec<_> = resolved.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["head", "mid", "tail"]);

        assert_eq!(
            resolved[0].bound.lower,
            Some(vec![RangeBound::Minvalue])
        );
        assert_eq!(
            resolved[2].bound.upper,
            Some(vec![RangeBound::Maxvalue])
        );
        // Every adjacent pair shares its boundary value.
        for pair in resolved.windows(2) {
            assert_eq!(pair[0].bound.upper, pair[1].bound.lower);
        }
    }

    #[test]
    fn inference_skips_the_default_partition() {
        let k = key();
        let parts = vec![
            default_part("other"),
            part("p1", Some(1), None),
            part("p2", None, Some(1)),
        ];
        let resolved = deduce_implicit_range_bounds(parts, &k);

        assert_eq!(resolved.last().unwrap().name, "other");
        assert!(resolved.last().unwrap().bound.lower.is_none());
        assert_eq!(
            resolved[0].bound.lower,
            Some(vec![RangeBound::Minvalue])
        );
        assert_eq!(resolved[1].bound.upper, Some(vec![RangeBound::Maxvalue]));
    }
}
