//! Forward-only iteration over the `[start, end)` sub-ranges of a RANGE
//! START/END/EVERY clause.

use crate::catalog::PartitionKeyColumn;
use crate::error::{Error, Result};
use crate::eval::{canonicalize_range_end, coerce_bound_value, EvalContext, PlusExpr};
use crate::ops::compare;
use partition_types::{PartValue, SourceLocation, ValueExpr};
use std::cmp::Ordering;

/// One produced sub-range. Either side is absent when the specification
/// left it open; the implicit-bound pass fills it in later.
pub(crate) type BoundPair = (Option<PartValue>, Option<PartValue>);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum IterState {
    NotStarted,
    Advancing,
    /// The bound produced last was clamped to END; nothing follows.
    Reached,
    Done,
}

/// Iterator over successive partition bounds of one RANGE element.
///
/// Without EVERY this is single-shot: one range covering the whole
/// `[START, END)` span, open ends left unset. With EVERY, each step
/// evaluates `previous end + step` through the compiled plus-expression,
/// clamps the final range to END, and verifies strict forward progress so a
/// degenerate or wrapping step terminates with an error instead of looping.
///
/// Not restartable, not seekable. The evaluation context lives exactly as
/// long as the iterator.
#[derive(Debug)]
pub(crate) struct PartEveryIterator<'a> {
    column: &'a PartitionKeyColumn,
    end_val: Option<PartValue>,
    plus: Option<PlusExpr>,
    cx: EvalContext,
    curr_start: Option<PartValue>,
    /// Holds the START value until the first advance.
    curr_end: Option<PartValue>,
    state: IterState,
    end_location: SourceLocation,
    every_location: SourceLocation,
}

impl<'a> PartEveryIterator<'a> {
    pub(crate) fn new(
        column: &'a PartitionKeyColumn,
        start: Option<&ValueExpr>,
        end: Option<&ValueExpr>,
        end_inclusive: bool,
        every: Option<&ValueExpr>,
    ) -> Result<Self> {
        let start_val = match start {
            Some(expr) => Some(require_bound_value(column, expr)?),
            None => None,
        };

        let end_val = match end {
            Some(expr) => {
                let value = require_bound_value(column, expr)?;
                Some(canonicalize_range_end(
                    column,
                    value,
                    end_inclusive,
                    expr.location,
                )?)
            }
            None => None,
        };

        let plus = match every {
            Some(expr) => {
                if start.is_none() || end.is_none() {
                    return Err(Error::EveryRequiresStartEnd {
                        location: expr.location,
                    });
                }
                Some(PlusExpr::compile(column, expr)?)
            }
            None => None,
        };

        Ok(Self {
            column,
            end_val,
            plus,
            cx: EvalContext::default(),
            curr_start: None,
            curr_end: start_val,
            state: IterState::NotStarted,
            end_location: end.map(|e| e.location).unwrap_or(SourceLocation::UNKNOWN),
            every_location: every.map(|e| e.location).unwrap_or(SourceLocation::UNKNOWN),
        })
    }

    fn next_with_every(&mut self, plus: &PlusExpr, first: bool) -> Result<BoundPair> {
        let collation = &self.column.collation;
        let curr_end = self
            .curr_end
            .clone()
            .expect("EVERY iteration requires a START value");
        let end_val = self
            .end_val
            .clone()
            .expect("EVERY iteration requires an END value");

        let next = plus.eval(&mut self.cx, &curr_end).map_err(|_| {
            Error::EndNotReachedBeforeOverflow {
                location: self.end_location,
            }
        })?;

        if compare(&next, &end_val, collation) != Ordering::Less {
            // Clamp the final range to END exactly.
            self.state = IterState::Reached;
            self.curr_start = Some(curr_end);
            self.curr_end = Some(end_val);
        } else {
            // The step must make strict forward progress, or the loop would
            // never terminate.
            if compare(&curr_end, &next, collation) != Ordering::Less {
                return Err(if first {
                    Error::EveryTooSmall {
                        location: self.every_location,
                    }
                } else {
                    // A smaller value after prior progress means the
                    // addition wrapped around.
                    Error::EndNotReachedBeforeOverflow {
                        location: self.end_location,
                    }
                });
            }
            self.state = IterState::Advancing;
            self.curr_start = Some(curr_end);
            self.curr_end = Some(next);
        }

        Ok((self.curr_start.clone(), self.curr_end.clone()))
    }
}

impl Iterator for PartEveryIterator<'_> {
    type Item = Result<BoundPair>;

    fn next(&mut self) -> Option<Self::Item> {
        let first = self.state == IterState::NotStarted;
        match self.state {
            IterState::Done | IterState::Reached => {
                self.state = IterState::Done;
                return None;
            }
            IterState::NotStarted | IterState::Advancing => {}
        }

        match self.plus.take() {
            Some(plus) => {
                let item = self.next_with_every(&plus, first);
                if item.is_err() {
                    self.state = IterState::Done;
                } else {
                    self.plus = Some(plus);
                }
                Some(item)
            }
            None => {
                // Without EVERY, one range covers the whole span.
                if !first {
                    return None;
                }
                self.state = IterState::Done;
                Some(Ok((self.curr_end.clone(), self.end_val.clone())))
            }
        }
    }
}

fn require_bound_value(column: &PartitionKeyColumn, expr: &ValueExpr) -> Result<PartValue> {
    coerce_bound_value(column, expr)?.ok_or(Error::NullRangeBound {
        location: expr.location,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use partition_types::{Interval, PartType};
    use pretty_assertions::assert_eq;

    fn int_column() -> PartitionKeyColumn {
        PartitionKeyColumn::new("j", PartType::Int32)
    }

    fn expand(
        column: &PartitionKeyColumn,
        start: Option<ValueExpr>,
        end: Option<ValueExpr>,
        end_inclusive: bool,
        every: Option<ValueExpr>,
    ) -> Result<Vec<BoundPair>> {
        PartEveryIterator::new(
            column,
            start.as_ref(),
            end.as_ref(),
            end_inclusive,
            every.as_ref(),
        )?
        .collect()
    }

    fn int_pair(lower: i32, upper: i32) -> BoundPair {
        (
            Some(PartValue::Int32(lower)),
            Some(PartValue::Int32(upper)),
        )
    }

    #[test]
    fn every_divides_evenly() {
        let column = int_column();
        let bounds = expand(
            &column,
            Some(ValueExpr::int(1)),
            Some(ValueExpr::int(10)),
            false,
            Some(ValueExpr::int(3)),
        )
        .unwrap();
        assert_eq!(bounds, vec![int_pair(1, 4), int_pair(4, 7), int_pair(7, 10)]);
    }

    #[test]
    fn every_clamps_the_remainder() {
        let column = int_column();
        let bounds = expand(
            &column,
            Some(ValueExpr::int(1)),
            Some(ValueExpr::int(10)),
            false,
            Some(ValueExpr::int(4)),
        )
        .unwrap();
        assert_eq!(bounds, vec![int_pair(1, 5), int_pair(5, 9), int_pair(9, 10)]);
    }

    #[test]
    fn no_every_is_single_shot() {
        let column = int_column();
        let bounds = expand(
            &column,
            Some(ValueExpr::int(1)),
            Some(ValueExpr::int(10)),
            false,
            None,
        )
        .unwrap();
        assert_eq!(bounds, vec![int_pair(1, 10)]);
    }

    #[test]
    fn open_ends_stay_unset() {
        let column = int_column();
        let bounds = expand(&column, None, Some(ValueExpr::int(10)), false, None).unwrap();
        assert_eq!(bounds, vec![(None, Some(PartValue::Int32(10)))]);

        let bounds = expand(&column, Some(ValueExpr::int(1)), None, false, None).unwrap();
        assert_eq!(bounds, vec![(Some(PartValue::Int32(1)), None)]);
    }

    #[test]
    fn zero_step_fails_before_producing_anything() {
        let column = int_column();
        let err = expand(
            &column,
            Some(ValueExpr::int(1)),
            Some(ValueExpr::int(10)),
            false,
            Some(ValueExpr::int(0)),
        )
        .unwrap_err();
        assert_eq!(
            err,
            Error::EveryTooSmall {
                location: SourceLocation::UNKNOWN
            }
        );
    }

    #[test]
    fn negative_step_fails_the_same_way() {
        let column = int_column();
        let err = expand(
            &column,
            Some(ValueExpr::int(1)),
            Some(ValueExpr::int(10)),
            false,
            Some(ValueExpr::int(-2)),
        )
        .unwrap_err();
        assert!(matches!(err, Error::EveryTooSmall { .. }));
    }

    #[test]
    fn wrapping_step_reports_overflow_after_progress() {
        let column = PartitionKeyColumn::new("j", PartType::Int16);
        let err = expand(
            &column,
            Some(ValueExpr::int(0)),
            Some(ValueExpr::int(32_767)),
            false,
            Some(ValueExpr::int(30_000)),
        )
        .unwrap_err();
        assert!(matches!(err, Error::EndNotReachedBeforeOverflow { .. }));
    }

    #[test]
    fn every_without_start_or_end_is_rejected() {
        let column = int_column();
        let err = expand(
            &column,
            Some(ValueExpr::int(1)),
            None,
            false,
            Some(ValueExpr::int(3)),
        )
        .unwrap_err();
        assert!(matches!(err, Error::EveryRequiresStartEnd { .. }));

        let err = expand(
            &column,
            None,
            Some(ValueExpr::int(10)),
            false,
            Some(ValueExpr::int(3)),
        )
        .unwrap_err();
        assert!(matches!(err, Error::EveryRequiresStartEnd { .. }));
    }

    #[test]
    fn inclusive_end_converts_before_iterating() {
        let column = int_column();
        let bounds = expand(
            &column,
            Some(ValueExpr::int(1)),
            Some(ValueExpr::int(9)),
            true,
            Some(ValueExpr::int(3)),
        )
        .unwrap();
        assert_eq!(bounds, vec![int_pair(1, 4), int_pair(4, 7), int_pair(7, 10)]);
    }

    #[test]
    fn null_range_bound_is_rejected() {
        let column = int_column();
        let err = expand(
            &column,
            Some(ValueExpr::null()),
            Some(ValueExpr::int(10)),
            false,
            None,
        )
        .unwrap_err();
        assert!(matches!(err, Error::NullRangeBound { .. }));
    }

    #[test]
    fn start_equal_to_end_clamps_immediately() {
        let column = int_column();
        let bounds = expand(
            &column,
            Some(ValueExpr::int(5)),
            Some(ValueExpr::int(5)),
            false,
            Some(ValueExpr::int(2)),
        )
        .unwrap();
        assert_eq!(bounds, vec![int_pair(5, 5)]);
    }

    #[test]
    fn month_interval_steps_a_date_column() {
        let column = PartitionKeyColumn::new("d", PartType::Date);
        let bounds = expand(
            &column,
            Some(ValueExpr::string("2020-01-01")),
            Some(ValueExpr::string("2020-04-01")),
            false,
            Some(ValueExpr::interval(Interval::from_months(1))),
        )
        .unwrap();
        let d = |m| {
            Some(PartValue::Date(
                chrono::NaiveDate::from_ymd_opt(2020, m, 1).unwrap(),
            ))
        };
        assert_eq!(
            bounds,
            vec![(d(1), d(2)), (d(2), d(3)), (d(3), d(4))]
        );
    }
}
