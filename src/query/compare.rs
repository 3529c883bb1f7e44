//! Value comparison under three-valued logic.
//!
//! A null operand makes any comparison unknown. An array on either side is
//! compared element by element: true if some element compares true, false
//! otherwise. An empty array counts as null.

use std::cmp::Ordering;
use crate::query::ast::Operator;
use crate::query::tri::Tri;
use crate::state::value::StateValue;

/// Ordering between two scalars, `None` when they are not comparable.
pub fn compare_scalars(a: &StateValue, b: &StateValue) -> Option<Ordering> {
    use StateValue::*;
    match (a, b) {
        (String(x), String(y)) => Some(x.cmp(y)),
        (Boolean(x), Boolean(y)) => Some(x.cmp(y)),
        (Date(x), Date(y)) => Some(x.cmp(y)),
        (Binary(x), Binary(y)) => Some(x.0.cmp(&y.0)),
        (Long(x), Long(y)) => Some(x.cmp(y)),
        // NXQL has no boolean literal, flags are queried as 0 / 1
        (Boolean(x), Long(_)) => compare_scalars(&Long(i64::from(*x)), b),
        (Long(_), Boolean(y)) => compare_scalars(a, &Long(i64::from(*y))),
        _ => {
            let x = a.as_number()?.as_f64();
            let y = b.as_number()?.as_f64();
            x.partial_cmp(&y)
        }
    }
}

fn null_like(value: &StateValue) -> bool {
    match value {
        StateValue::Null => true,
        StateValue::Array(values) => values.is_empty(),
        _ => false,
    }
}

/// Applies a comparison operator (`=`, `<>`, `<`, `>`, `<=`, `>=`).
pub fn compare(op: Operator, left: &StateValue, right: &StateValue) -> Tri {
    if null_like(left) || null_like(right) {
        return Tri::Unknown;
    }
    if let StateValue::Array(values) = left {
        return existential(values, |v| compare(op, v, right));
    }
    if let StateValue::Array(values) = right {
        return existential(values, |v| compare(op, left, v));
    }
    let Some(ordering) = compare_scalars(left, right) else {
        return Tri::Unknown;
    };
    Tri::from_bool(match op {
        Operator::Eq => ordering == Ordering::Equal,
        Operator::NotEq => ordering != Ordering::Equal,
        Operator::Lt => ordering == Ordering::Less,
        Operator::Gt => ordering == Ordering::Greater,
        Operator::LtEq => ordering != Ordering::Greater,
        Operator::GtEq => ordering != Ordering::Less,
        _ => return Tri::Unknown,
    })
}

/// True if any element yields true, false otherwise; never unknown.
pub fn existential<F>(values: &[StateValue], mut test: F) -> Tri
where
    F: FnMut(&StateValue) -> Tri,
{
    Tri::from_bool(values.iter().any(|v| test(v).is_true()))
}

/// Ternary `IN`: unknown for a null left value, true on a match, unknown if
/// the list holds a null and nothing matched, false otherwise.
pub fn in_list(left: &StateValue, list: &[StateValue]) -> Tri {
    if null_like(left) {
        return Tri::Unknown;
    }
    if let StateValue::Array(values) = left {
        return existential(values, |v| in_list(v, list));
    }
    let mut saw_null = false;
    for candidate in list {
        if candidate.is_null() {
            saw_null = true;
        } else if compare(Operator::Eq, left, candidate).is_true() {
            return Tri::True;
        }
    }
    if saw_null { Tri::Unknown } else { Tri::False }
}

/// Value as text for LIKE matching.
pub fn like_text(value: &StateValue) -> Option<String> {
    match value {
        StateValue::String(s) => Some(s.clone()),
        StateValue::Null | StateValue::Array(_) | StateValue::State(_) | StateValue::List(_) => None,
        StateValue::ListDiff(_) => None,
        other => Some(other.to_string()),
    }
}
