//! Addition and ordering operators for partition-column types.
//!
//! The legacy catalog resolves `+` and the ordering support function per
//! column type at run time. Here the registry is closed: a [`PlusOp`] is
//! selected once per compiled step expression from the (column type, step
//! type) pair, and [`compare`] is the ordering comparator for values of one
//! column type under its collation.

use chrono::{Days, Duration, Months, NaiveDate, NaiveDateTime, NaiveTime};
use partition_types::{Collation, Interval, PartType, PartValue};
use std::cmp::Ordering;

/// A step operand after coercion: an integer already range-checked into the
/// column's domain, or an interval.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum StepOperand {
    Int(i64),
    Interval(Interval),
}

impl StepOperand {
    pub(crate) fn type_name(&self) -> &'static str {
        match self {
            Self::Int(_) => "integer",
            Self::Interval(_) => "interval",
        }
    }
}

/// Returned when stepping leaves the representable domain of the column
/// type. Integer columns never report this; they wrap and the caller's
/// monotonicity check catches the regression instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct StepOverflow;

/// The `+` implementation selected for one (column type, step type) pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum PlusOp {
    /// `int2/int4/int8 + integer`, wrapping on overflow.
    IntPlusInt,
    /// `date + integer` adds whole days.
    DatePlusDays,
    /// `date + interval` goes through a timestamp and truncates back.
    DatePlusInterval,
    /// `timestamp + interval`.
    TimestampPlusInterval,
}

impl PlusOp {
    /// Look up the `+` operator for the pair, if one exists.
    pub(crate) fn resolve(column: PartType, step: &StepOperand) -> Option<Self> {
        match (column, step) {
            (PartType::Int16 | PartType::Int32 | PartType::Int64, StepOperand::Int(_)) => {
                Some(Self::IntPlusInt)
            }
            (PartType::Date, StepOperand::Int(_)) => Some(Self::DatePlusDays),
            (PartType::Date, StepOperand::Interval(_)) => Some(Self::DatePlusInterval),
            (PartType::Timestamp, StepOperand::Interval(_)) => Some(Self::TimestampPlusInterval),
            _ => None,
        }
    }

    pub(crate) fn apply(
        &self,
        current: &PartValue,
        step: &StepOperand,
    ) -> Result<PartValue, StepOverflow> {
        match (self, current, step) {
            (Self::IntPlusInt, PartValue::Int16(v), StepOperand::Int(s)) => {
                Ok(PartValue::Int16(v.wrapping_add(*s as i16)))
            }
            (Self::IntPlusInt, PartValue::Int32(v), StepOperand::Int(s)) => {
                Ok(PartValue::Int32(v.wrapping_add(*s as i32)))
            }
            (Self::IntPlusInt, PartValue::Int64(v), StepOperand::Int(s)) => {
                Ok(PartValue::Int64(v.wrapping_add(*s)))
            }
            (Self::DatePlusDays, PartValue::Date(d), StepOperand::Int(s)) => {
                add_days(*d, *s).map(PartValue::Date).ok_or(StepOverflow)
            }
            (Self::DatePlusInterval, PartValue::Date(d), StepOperand::Interval(iv)) => {
                add_interval(d.and_time(NaiveTime::MIN), iv)
                    .map(|dt| PartValue::Date(dt.date()))
                    .ok_or(StepOverflow)
            }
            (Self::TimestampPlusInterval, PartValue::Timestamp(ts), StepOperand::Interval(iv)) => {
                add_interval(*ts, iv)
                    .map(PartValue::Timestamp)
                    .ok_or(StepOverflow)
            }
            _ => unreachable!("plus operator applied to mismatched operands"),
        }
    }
}

fn add_days(date: NaiveDate, days: i64) -> Option<NaiveDate> {
    if days >= 0 {
        date.checked_add_days(Days::new(days as u64))
    } else {
        date.checked_sub_days(Days::new(days.unsigned_abs()))
    }
}

fn add_interval(ts: NaiveDateTime, iv: &Interval) -> Option<NaiveDateTime> {
    let ts = if iv.months >= 0 {
        ts.checked_add_months(Months::new(iv.months.unsigned_abs()))?
    } else {
        ts.checked_sub_months(Months::new(iv.months.unsigned_abs()))?
    };
    let ts = if iv.days >= 0 {
        ts.checked_add_days(Days::new(u64::from(iv.days.unsigned_abs())))?
    } else {
        ts.checked_sub_days(Days::new(u64::from(iv.days.unsigned_abs())))?
    };
    ts.checked_add_signed(Duration::microseconds(iv.micros))
}

/// Ordering comparator for two values of the same column type.
///
/// The signed result mirrors the catalog support-function contract the
/// legacy sort relied on. Collation is accepted for the text case; all
/// supported collations currently order by code point.
pub(crate) fn compare(a: &PartValue, b: &PartValue, _collation: &Collation) -> Ordering {
    match (a, b) {
        (PartValue::Int16(x), PartValue::Int16(y)) => x.cmp(y),
        (PartValue::Int32(x), PartValue::Int32(y)) => x.cmp(y),
        (PartValue::Int64(x), PartValue::Int64(y)) => x.cmp(y),
        (PartValue::Date(x), PartValue::Date(y)) => x.cmp(y),
        (PartValue::Timestamp(x), PartValue::Timestamp(y)) => x.cmp(y),
        (PartValue::Text(x), PartValue::Text(y)) => x.cmp(y),
        _ => unreachable!("comparing partition values of different types"),
    }
}
