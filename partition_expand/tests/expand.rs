//! End-to-end expansion tests over the public API.

use partition_expand::{
    generate_partitions, Error, InMemoryNamer, PartitionKey, PartitionKeyColumn, ResolvedRelation,
};
use partition_types::{
    ColumnEncodingDirective, GeneratedPartition, PartType, PartValue, PartitionDefElement,
    PartitionDefinition, PartitionStrategy, RangeBound, RangeBoundExpr, StorageOption, ValueExpr,
};
use pretty_assertions::assert_eq;
use proptest::prelude::*;

fn int_parent(part_type: PartType) -> ResolvedRelation {
    ResolvedRelation::new(
        "sales",
        PartitionKey::single(
            PartitionStrategy::Range,
            PartitionKeyColumn::new("j", part_type),
        ),
    )
}

fn expand(
    parent: &ResolvedRelation,
    spec: &PartitionDefinition,
) -> Result<Vec<GeneratedPartition>, Error> {
    let mut namer = InMemoryNamer::new();
    generate_partitions(parent, spec, None, &[], None, &[], &mut namer)
}

fn int_range(start: i64, end: i64) -> RangeBoundExpr {
    RangeBoundExpr::start_end(ValueExpr::int(start), ValueExpr::int(end))
}

fn lower_i64(part: &GeneratedPartition) -> Option<i64> {
    match part.bound.lower.as_deref() {
        Some([RangeBound::Value(PartValue::Int64(v))]) => Some(*v),
        _ => None,
    }
}

fn upper_i64(part: &GeneratedPartition) -> Option<i64> {
    match part.bound.upper.as_deref() {
        Some([RangeBound::Value(PartValue::Int64(v))]) => Some(*v),
        _ => None,
    }
}

fn int32_bounds(part: &GeneratedPartition) -> (i32, i32) {
    match (part.bound.lower.as_deref(), part.bound.upper.as_deref()) {
        (
            Some([RangeBound::Value(PartValue::Int32(lo))]),
            Some([RangeBound::Value(PartValue::Int32(hi))]),
        ) => (*lo, *hi),
        other => panic!("expected concrete int bounds, got {other:?}"),
    }
}

/// Generate a test asserting a START/END/EVERY triple expands to exactly
/// `want` as `[lower, upper)` pairs.
macro_rules! test_every_expansion {
    (
        $name:ident,
        range = $range:expr,
        want = $want:expr
    ) => {
        paste::paste! {
            #[test]
            fn [<every_expansion_ $name>]() {
                let parent = int_parent(PartType::Int32);
                let spec = PartitionDefinition::new([PartitionDefElement::range(
                    Some("p"),
                    $range,
                )]);
                let got: Vec<_> = expand(&parent, &spec)
                    .unwrap()
                    .iter()
                    .map(int32_bounds)
                    .collect();
                assert_eq!(got, $want);
            }
        }
    };
}

test_every_expansion!(
    divides_evenly,
    range = int_range(1, 10).with_every(ValueExpr::int(3)),
    want = vec![(1, 4), (4, 7), (7, 10)]
);

test_every_expansion!(
    clamps_remainder,
    range = int_range(1, 10).with_every(ValueExpr::int(4)),
    want = vec![(1, 5), (5, 9), (9, 10)]
);

test_every_expansion!(
    single_shot_without_every,
    range = int_range(1, 10),
    want = vec![(1, 10)]
);

test_every_expansion!(
    inclusive_end,
    range = int_range(1, 9).inclusive_end().with_every(ValueExpr::int(3)),
    want = vec![(1, 4), (4, 7), (7, 10)]
);

#[test]
fn degenerate_step_produces_no_partitions() {
    let parent = int_parent(PartType::Int32);
    let spec = PartitionDefinition::new([PartitionDefElement::range(
        Some("p"),
        int_range(1, 10).with_every(ValueExpr::int(0)),
    )]);
    let err = expand(&parent, &spec).unwrap_err();
    assert!(matches!(err, Error::EveryTooSmall { .. }));
}

#[test_log::test]
fn default_sorts_last_regardless_of_source_position() {
    let parent = int_parent(PartType::Int32);
    for default_at in 0..3 {
        let mut elements = vec![
            PartitionDefElement::range(Some("a"), int_range(1, 10)),
            PartitionDefElement::range(Some("b"), int_range(10, 20)),
        ];
        elements.insert(default_at, PartitionDefElement::default_partition("other"));
        let spec = PartitionDefinition::new(elements);

        let parts = expand(&parent, &spec).unwrap();
        assert!(parts.last().unwrap().bound.is_default);
        assert_eq!(parts.last().unwrap().name, "sales_1_prt_other");
    }
}

#[test]
fn open_ends_resolve_to_sentinels_and_neighbors() {
    let parent = int_parent(PartType::Int32);
    // "head" has no START, "tail" no END; "mid" supplies both boundaries.
    let head = PartitionDefElement::range(
        Some("head"),
        RangeBoundExpr {
            end: Some(vec![ValueExpr::int(10)]),
            ..RangeBoundExpr::default()
        },
    );
    let mid = PartitionDefElement::range(Some("mid"), int_range(10, 20));
    let tail = PartitionDefElement::range(
        Some("tail"),
        RangeBoundExpr {
            start: Some(vec![ValueExpr::int(20)]),
            ..RangeBoundExpr::default()
        },
    );
    let spec = PartitionDefinition::new([tail, head, mid]);

    let parts = expand(&parent, &spec).unwrap();
    let names: Vec<_> = parts.iter().map(|p| p.name.as_str()).collect();
    assert_eq!(
        names,
        vec!["sales_1_prt_head", "sales_1_prt_mid", "sales_1_prt_tail"]
    );

    assert_eq!(parts[0].bound.lower, Some(vec![RangeBound::Minvalue]));
    assert_eq!(parts[2].bound.upper, Some(vec![RangeBound::Maxvalue]));
    for pair in parts.windows(2) {
        assert_eq!(pair[0].bound.upper, pair[1].bound.lower);
    }
}

#[test]
fn naming_is_idempotent_across_runs() {
    let parent = int_parent(PartType::Int32);
    let spec = PartitionDefinition::new([
        PartitionDefElement::range(None, int_range(1, 10).with_every(ValueExpr::int(3))),
        PartitionDefElement::default_partition("other"),
    ]);
    let existing = ["sales_1_prt_2"];

    let run = || {
        let mut namer = InMemoryNamer::with_existing(existing);
        generate_partitions(&parent, &spec, None, &[], None, &[], &mut namer)
            .unwrap()
            .into_iter()
            .map(|p| p.name)
            .collect::<Vec<_>>()
    };

    let first = run();
    let second = run();
    assert_eq!(first, second);
}

#[test]
fn multiple_defaults_fail_with_no_output() {
    let parent = int_parent(PartType::Int32);
    let spec = PartitionDefinition::new([
        PartitionDefElement::default_partition("a"),
        PartitionDefElement::default_partition("b"),
    ]);
    let err = expand(&parent, &spec).unwrap_err();
    assert!(matches!(err, Error::MultipleDefaultPartitions { .. }));
}

#[test_log::test]
fn date_column_steps_by_month_interval() {
    use partition_types::Interval;

    let parent = ResolvedRelation::new(
        "events",
        PartitionKey::single(
            PartitionStrategy::Range,
            PartitionKeyColumn::new("day", PartType::Date),
        ),
    );
    let bound = RangeBoundExpr::start_end(
        ValueExpr::string("2021-01-01"),
        ValueExpr::string("2021-12-31"),
    )
    .inclusive_end()
    .with_every(ValueExpr::interval(Interval::from_months(3)));
    let spec = PartitionDefinition::new([PartitionDefElement::range(Some("q"), bound)]);

    let parts = expand(&parent, &spec).unwrap();
    assert_eq!(parts.len(), 4);

    let date = |y, m, d| {
        RangeBound::Value(PartValue::Date(
            chrono::NaiveDate::from_ymd_opt(y, m, d).unwrap(),
        ))
    };
    assert_eq!(parts[0].bound.lower, Some(vec![date(2021, 1, 1)]));
    assert_eq!(parts[2].bound.upper, Some(vec![date(2021, 10, 1)]));
    // Inclusive END(2021-12-31) converts to an exclusive 2022-01-01 through
    // the `date + 1` day operator, and the last range clamps to it.
    assert_eq!(parts[3].bound.upper, Some(vec![date(2022, 1, 1)]));

    let names: Vec<_> = parts.iter().map(|p| p.name.as_str()).collect();
    assert_eq!(
        names,
        vec![
            "events_1_prt_q_1",
            "events_1_prt_q_2",
            "events_1_prt_q_3",
            "events_1_prt_q_4"
        ]
    );
}

#[test]
fn encoding_precedence_across_all_three_levels() {
    let parent = int_parent(PartType::Int32);

    let elem_enc = ColumnEncodingDirective::for_column(
        "x",
        vec![StorageOption::new("compresstype", "rle_type")],
    );
    let config_enc_x =
        ColumnEncodingDirective::for_column("x", vec![StorageOption::new("compresstype", "zlib")]);
    let config_default =
        ColumnEncodingDirective::default_directive(vec![StorageOption::new("compresslevel", 1i64)]);
    let parent_enc_y =
        ColumnEncodingDirective::for_column("y", vec![StorageOption::new("compresstype", "zstd")]);

    let mut elem = PartitionDefElement::range(Some("p"), int_range(1, 10));
    elem.access_method = Some(partition_expand::COLUMN_ORIENTED_AM.to_owned());
    elem.encodings = vec![elem_enc.clone()];

    let mut spec = PartitionDefinition::new([elem]);
    spec.push_encoding(config_enc_x);
    spec.push_encoding(config_default.clone());

    let mut namer = InMemoryNamer::new();
    let parts = generate_partitions(
        &parent,
        &spec,
        None,
        &[],
        None,
        std::slice::from_ref(&parent_enc_y),
        &mut namer,
    )
    .unwrap();

    // The element's directive for "x" survives; the config directive for
    // "x" is dropped; the parent's "y" and the config default are appended.
    assert_eq!(
        parts[0].encodings,
        vec![elem_enc, parent_enc_y, config_default]
    );
}

proptest! {
    /// Contiguity and clamping over arbitrary integer START/END/EVERY.
    #[test]
    fn every_expansion_is_contiguous(
        start in -1_000i64..1_000,
        span in 1i64..400,
        step in 1i64..50,
    ) {
        let parent = int_parent(PartType::Int64);
        let end = start + span;
        let spec = PartitionDefinition::new([PartitionDefElement::range(
            Some("p"),
            int_range(start, end).with_every(ValueExpr::int(step)),
        )]);
        let parts = expand(&parent, &spec).unwrap();

        prop_assert!(!parts.is_empty());
        prop_assert_eq!(lower_i64(&parts[0]), Some(start));
        prop_assert_eq!(upper_i64(parts.last().unwrap()), Some(end));
        for part in &parts {
            let lo = lower_i64(part).unwrap();
            let hi = upper_i64(part).unwrap();
            prop_assert!(lo < hi);
            prop_assert!(hi - lo <= step);
        }
        for pair in parts.windows(2) {
            prop_assert_eq!(upper_i64(&pair[0]), lower_i64(&pair[1]));
        }
    }
}
