//! Strict and loose equality over states and their values.
//!
//! Strict equality distinguishes a null entry from an absent key. Loose
//! equality treats null, absent, and empty arrays/lists/states as the same
//! thing. Both walk an explicit stack so that deeply nested documents do not
//! grow the call stack.

use crate::state::list_diff::{ListDiff, ListDiffEntry};
use crate::state::state::State;
use crate::state::value::{Number, StateValue};

static NULL: StateValue = StateValue::Null;

enum Pair<'a> {
    Values(&'a StateValue, &'a StateValue),
    States(&'a State, &'a State),
    ListDiffs(&'a ListDiff, &'a ListDiff),
}

pub fn equals_strict(a: &StateValue, b: &StateValue) -> bool {
    walk(Pair::Values(a, b), false)
}

pub fn equals_loose(a: &StateValue, b: &StateValue) -> bool {
    walk(Pair::Values(a, b), true)
}

pub fn state_equals_strict(a: &State, b: &State) -> bool {
    walk(Pair::States(a, b), false)
}

pub fn state_equals_loose(a: &State, b: &State) -> bool {
    walk(Pair::States(a, b), true)
}

pub fn list_diff_equals_strict(a: &ListDiff, b: &ListDiff) -> bool {
    walk(Pair::ListDiffs(a, b), false)
}

pub fn list_diff_equals_loose(a: &ListDiff, b: &ListDiff) -> bool {
    walk(Pair::ListDiffs(a, b), true)
}

pub fn lists_equal_strict(a: &[State], b: &[State]) -> bool {
    a.len() == b.len() && a.iter().zip(b).all(|(x, y)| state_equals_strict(x, y))
}

pub fn lists_equal_loose(a: &[State], b: &[State]) -> bool {
    a.len() == b.len() && a.iter().zip(b).all(|(x, y)| state_equals_loose(x, y))
}

fn walk(start: Pair<'_>, loose: bool) -> bool {
    let mut stack = vec![start];
    while let Some(pair) = stack.pop() {
        let ok = match pair {
            Pair::States(a, b) => push_states(a, b, loose, &mut stack),
            Pair::Values(a, b) => push_values(a, b, loose, &mut stack),
            Pair::ListDiffs(a, b) => push_list_diffs(a, b, loose, &mut stack),
        };
        if !ok {
            return false;
        }
    }
    true
}

fn push_states<'a>(a: &'a State, b: &'a State, loose: bool, stack: &mut Vec<Pair<'a>>) -> bool {
    if loose {
        for (key, va) in a.iter() {
            stack.push(Pair::Values(va, b.get(key).unwrap_or(&NULL)));
        }
        for (key, vb) in b.iter() {
            if !a.contains_key(key) {
                stack.push(Pair::Values(&NULL, vb));
            }
        }
        return true;
    }
    if a.len() != b.len() {
        return false;
    }
    for (key, va) in a.iter() {
        match b.get(key) {
            Some(vb) => stack.push(Pair::Values(va, vb)),
            None => return false,
        }
    }
    true
}

fn push_values<'a>(
    a: &'a StateValue,
    b: &'a StateValue,
    loose: bool,
    stack: &mut Vec<Pair<'a>>,
) -> bool {
    if loose && a.is_loosely_absent() && b.is_loosely_absent() {
        return true;
    }
    match (a, b) {
        (StateValue::Null, StateValue::Null) => true,
        (StateValue::String(x), StateValue::String(y)) => x == y,
        (StateValue::Boolean(x), StateValue::Boolean(y)) => x == y,
        (StateValue::Long(x), StateValue::Long(y)) => x == y,
        (StateValue::Double(x), StateValue::Double(y)) => x == y,
        (StateValue::Date(x), StateValue::Date(y)) => x == y,
        (StateValue::Binary(x), StateValue::Binary(y)) => x == y,
        (StateValue::Delta(x), StateValue::Delta(y)) => {
            if loose {
                numbers_equal(x.full_value(), y.full_value())
            } else {
                x.base() == y.base() && x.delta() == y.delta()
            }
        }
        (StateValue::Delta(d), other) | (other, StateValue::Delta(d)) => {
            loose
                && other
                    .as_number()
                    .is_some_and(|n| numbers_equal(d.full_value(), n))
        }
        (StateValue::Array(x), StateValue::Array(y)) => {
            if x.len() != y.len() {
                return false;
            }
            stack.extend(x.iter().zip(y).map(|(p, q)| Pair::Values(p, q)));
            true
        }
        (StateValue::State(x), StateValue::State(y)) => {
            stack.push(Pair::States(x, y));
            true
        }
        (StateValue::List(x), StateValue::List(y)) => {
            if x.len() != y.len() {
                return false;
            }
            stack.extend(x.iter().zip(y).map(|(p, q)| Pair::States(p, q)));
            true
        }
        (StateValue::ListDiff(x), StateValue::ListDiff(y)) => {
            stack.push(Pair::ListDiffs(x, y));
            true
        }
        _ => false,
    }
}

fn push_list_diffs<'a>(
    a: &'a ListDiff,
    b: &'a ListDiff,
    loose: bool,
    stack: &mut Vec<Pair<'a>>,
) -> bool {
    if a.is_array != b.is_array {
        return false;
    }
    match (&a.diff, &b.diff) {
        (None, None) => {}
        (Some(x), Some(y)) => {
            if x.len() != y.len() {
                return false;
            }
            for (p, q) in x.iter().zip(y) {
                match (p, q) {
                    (ListDiffEntry::Nop, ListDiffEntry::Nop) => {}
                    (ListDiffEntry::Value(p), ListDiffEntry::Value(q)) => {
                        stack.push(Pair::Values(p, q))
                    }
                    _ => return false,
                }
            }
        }
        _ => return false,
    }
    let (x, y) = match (&a.rpush, &b.rpush) {
        (None, None) => return true,
        (Some(x), Some(y)) => (x.as_slice(), y.as_slice()),
        (x, y) if loose => (x.as_deref().unwrap_or(&[]), y.as_deref().unwrap_or(&[])),
        _ => return false,
    };
    if x.len() != y.len() {
        return false;
    }
    stack.extend(x.iter().zip(y).map(|(p, q)| Pair::Values(p, q)));
    true
}

fn numbers_equal(a: Number, b: Number) -> bool {
    match (a, b) {
        (Number::Long(x), Number::Long(y)) => x == y,
        (x, y) => x.as_f64() == y.as_f64(),
    }
}
