//! Compilation and evaluation of the `current + step` expression, and
//! coercion of bound value expressions into the partition column's type.
//!
//! A [`PlusExpr`] is compiled once per START/END/EVERY clause and re-invoked
//! per iteration by feeding a new parameter value into its [`EvalContext`];
//! the step is never re-resolved. The EVERY clause is deliberately not cast
//! to the column type: a timestamp column steps by an interval, so the step
//! keeps its own type and only the `+` operator pair is looked up.

use crate::catalog::PartitionKeyColumn;
use crate::error::{Error, Result};
use crate::ops::{PlusOp, StepOperand, StepOverflow};
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use partition_types::{BoundLiteral, Collation, PartType, PartValue, SourceLocation, ValueExpr};

/// Scratch state for one compiled plus-expression: the single external
/// parameter slot the expression reads. Owned by exactly one bound iterator
/// (or one inclusive-end conversion) and dropped with it, on every exit
/// path.
#[derive(Debug, Default)]
pub(crate) struct EvalContext {
    param: Option<PartValue>,
}

/// A compiled `current + step` expression bound to one partition column.
#[derive(Debug)]
pub(crate) struct PlusExpr {
    op: PlusOp,
    step: StepOperand,
}

impl PlusExpr {
    /// Resolve the `+` operator for (column type, step type) and coerce the
    /// step into the column's domain. An explicit non-default collation on
    /// the step must match the column's.
    pub(crate) fn compile(column: &PartitionKeyColumn, step: &ValueExpr) -> Result<Self> {
        check_collation(column, &step.collation)?;

        let operand = match &step.value {
            BoundLiteral::Int(v) => StepOperand::Int(*v),
            BoundLiteral::Interval(iv) => StepOperand::Interval(*iv),
            BoundLiteral::String(_) => {
                return Err(Error::OperatorNotFound {
                    left: column.part_type,
                    right: "unknown".to_owned(),
                });
            }
            BoundLiteral::Null => {
                return Err(Error::NullRangeBound {
                    location: step.location,
                });
            }
        };

        let op = PlusOp::resolve(column.part_type, &operand).ok_or_else(|| {
            Error::OperatorNotFound {
                left: column.part_type,
                right: operand.type_name().to_owned(),
            }
        })?;
        let step = coerce_step(column, operand, step.location)?;

        Ok(Self { op, step })
    }

    /// Feed `current` into the parameter slot and evaluate.
    pub(crate) fn eval(
        &self,
        cx: &mut EvalContext,
        current: &PartValue,
    ) -> Result<PartValue, StepOverflow> {
        let param = cx.param.insert(current.clone());
        self.op.apply(param, &self.step)
    }
}

/// An explicit non-default collation must match the partition column's
/// collation exactly.
fn check_collation(column: &PartitionKeyColumn, expr_collation: &Collation) -> Result<()> {
    if !expr_collation.is_default() && *expr_collation != column.collation {
        return Err(Error::CollationMismatch {
            column: column.name.clone(),
            collation: column.collation.name().to_owned(),
        });
    }
    Ok(())
}

/// Range-check an integer step into the column's width so later additions
/// can use the column's native arithmetic.
fn coerce_step(
    column: &PartitionKeyColumn,
    operand: StepOperand,
    location: SourceLocation,
) -> Result<StepOperand> {
    let cannot_cast = || Error::CannotCast {
        target: column.part_type,
        column: column.name.clone(),
        location,
    };
    match (column.part_type, operand) {
        (PartType::Int16, StepOperand::Int(v)) => {
            i16::try_from(v).map_err(|_| cannot_cast())?;
        }
        (PartType::Int32, StepOperand::Int(v)) | (PartType::Date, StepOperand::Int(v)) => {
            i32::try_from(v).map_err(|_| cannot_cast())?;
        }
        _ => {}
    }
    Ok(operand)
}

/// Coerce one bound value expression into the partition column's type.
///
/// `Ok(None)` is a NULL literal; the RANGE path rejects it, the LIST path
/// admits it as a list value.
pub(crate) fn coerce_bound_value(
    column: &PartitionKeyColumn,
    expr: &ValueExpr,
) -> Result<Option<PartValue>> {
    check_collation(column, &expr.collation)?;

    let cannot_cast = || Error::CannotCast {
        target: column.part_type,
        column: column.name.clone(),
        location: expr.location,
    };

    let value = match (&expr.value, column.part_type) {
        (BoundLiteral::Null, _) => return Ok(None),
        (BoundLiteral::Int(v), PartType::Int16) => {
            PartValue::Int16(i16::try_from(*v).map_err(|_| cannot_cast())?)
        }
        (BoundLiteral::Int(v), PartType::Int32) => {
            PartValue::Int32(i32::try_from(*v).map_err(|_| cannot_cast())?)
        }
        (BoundLiteral::Int(v), PartType::Int64) => PartValue::Int64(*v),
        (BoundLiteral::String(s), PartType::Int16) => {
            let v: i64 = s.trim().parse().map_err(|_| cannot_cast())?;
            PartValue::Int16(i16::try_from(v).map_err(|_| cannot_cast())?)
        }
        (BoundLiteral::String(s), PartType::Int32) => {
            let v: i64 = s.trim().parse().map_err(|_| cannot_cast())?;
            PartValue::Int32(i32::try_from(v).map_err(|_| cannot_cast())?)
        }
        (BoundLiteral::String(s), PartType::Int64) => {
            PartValue::Int64(s.trim().parse().map_err(|_| cannot_cast())?)
        }
        (BoundLiteral::String(s), PartType::Date) => {
            PartValue::Date(parse_date(s).ok_or_else(cannot_cast)?)
        }
        (BoundLiteral::String(s), PartType::Timestamp) => {
            PartValue::Timestamp(parse_timestamp(s).ok_or_else(cannot_cast)?)
        }
        (BoundLiteral::String(s), PartType::Text) => PartValue::Text(s.clone()),
        _ => return Err(cannot_cast()),
    };
    Ok(Some(value))
}

fn parse_date(s: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d").ok()
}

fn parse_timestamp(s: &str) -> Option<NaiveDateTime> {
    let s = s.trim();
    NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S%.f")
        .ok()
        .or_else(|| parse_date(s).map(|d| d.and_time(NaiveTime::MIN)))
}

/// Convert an inclusive END into the exclusive form by adding one unit.
///
/// The unit is a literal integer `1` regardless of the column's type, the
/// same simplification the legacy implementation carries: integer and date
/// columns resolve a `+` operator for it, other types fail the lookup.
pub(crate) fn canonicalize_range_end(
    column: &PartitionKeyColumn,
    end: PartValue,
    end_inclusive: bool,
    location: SourceLocation,
) -> Result<PartValue> {
    if !end_inclusive {
        return Ok(end);
    }
    let one = ValueExpr::int(1);
    let plus = PlusExpr::compile(column, &one)?;
    let mut cx = EvalContext::default();
    plus.eval(&mut cx, &end)
        .map_err(|StepOverflow| Error::EndNotReachedBeforeOverflow { location })
}
