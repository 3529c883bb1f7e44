//! Minimal diffs between two states.
//!
//! A diff is itself a [`State`] flagged as a StateDiff: a non-null entry sets
//! a value (a nested StateDiff recurses), a null entry clears the key, and a
//! [`ListDiff`] entry patches an array or complex list in place.

use tracing::trace;
use crate::core::error::{Error, Result};
use crate::core::config::EngineConfig;
use crate::state::copy::{copy_with_depth, DEFAULT_MAX_DEPTH};
use crate::state::equality::{equals_loose, equals_strict};
use crate::state::list_diff::{ListDiff, ListDiffEntry};
use crate::state::state::State;
use crate::state::value::{Delta, StateValue};

/// Outcome of diffing two values.
#[derive(Debug, Clone, PartialEq)]
pub enum Diffed {
    /// Nothing changed.
    Nop,
    /// Replacement value, nested StateDiff, or ListDiff.
    Value(StateValue),
}

impl Diffed {
    pub fn is_nop(&self) -> bool {
        matches!(self, Diffed::Nop)
    }
}

/// Computes and applies state diffs, refusing states nested deeper than
/// `max_depth`.
#[derive(Debug, Clone)]
pub struct DiffEngine {
    pub max_depth: usize,
}

impl Default for DiffEngine {
    fn default() -> Self {
        DiffEngine {
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

impl DiffEngine {
    pub fn new(max_depth: usize) -> Self {
        DiffEngine { max_depth }
    }

    pub fn from_config(config: &EngineConfig) -> Self {
        DiffEngine::new(config.max_nesting_depth)
    }

    /// Deep copy bounded by this engine's depth limit.
    pub fn copy(&self, state: &State) -> Result<State> {
        copy_with_depth(state, self.max_depth)
    }

    /// StateDiff turning `before` into `after`. Empty when nothing changed.
    pub fn diff(&self, before: &State, after: &State) -> Result<State> {
        self.diff_states(before, after, 0)
    }

    pub fn diff_value(&self, before: &StateValue, after: &StateValue) -> Result<Diffed> {
        self.diff_values(before, after, 0)
    }

    pub fn diff_lists(&self, before: &[State], after: &[State]) -> Result<Diffed> {
        self.diff_lists_at(before, after, 0)
    }

    pub fn diff_arrays(&self, before: &[StateValue], after: &[StateValue]) -> Result<Diffed> {
        self.diff_arrays_at(before, after, 0)
    }

    pub(crate) fn check_depth(&self, depth: usize) -> Result<()> {
        if depth > self.max_depth {
            return Err(Error::data_integrity(format!(
                "state nesting exceeds {} levels",
                self.max_depth
            )));
        }
        Ok(())
    }

    fn diff_states(&self, before: &State, after: &State, depth: usize) -> Result<State> {
        self.check_depth(depth)?;
        let mut diff = State::new_diff();
        for (key, va) in before.iter() {
            if va.is_null() {
                continue;
            }
            let vb = match after.get(key) {
                Some(vb) if !vb.is_null() => vb,
                _ => {
                    diff.put(key, StateValue::Null);
                    continue;
                }
            };
            match self.diff_values(va, vb, depth + 1)? {
                Diffed::Nop => {}
                Diffed::Value(StateValue::Delta(delta)) => {
                    diff.put(key, rebase_delta(key, Some(va), delta));
                }
                Diffed::Value(value) => {
                    diff.put(key, value);
                }
            }
        }
        for (key, vb) in after.iter() {
            let covered = before.get(key).is_some_and(|va| !va.is_null());
            if covered || vb.is_loosely_absent() {
                continue;
            }
            let value = match vb {
                StateValue::Delta(delta) => rebase_delta(key, None, *delta),
                other => {
                    check_settable(other)?;
                    other.clone()
                }
            };
            diff.put(key, value);
        }
        Ok(diff)
    }

    fn diff_values(&self, before: &StateValue, after: &StateValue, depth: usize) -> Result<Diffed> {
        if equals_loose(before, after) {
            return Ok(Diffed::Nop);
        }
        match (before, after) {
            (StateValue::State(a), StateValue::State(b)) if !a.is_diff() && !b.is_diff() => {
                let diff = self.diff_states(a, b, depth)?;
                if diff.is_empty() {
                    Ok(Diffed::Nop)
                } else {
                    Ok(Diffed::Value(StateValue::State(diff)))
                }
            }
            (StateValue::Array(a), StateValue::Array(b)) => self.diff_arrays_at(a, b, depth),
            (StateValue::List(a), StateValue::List(b)) => self.diff_lists_at(a, b, depth),
            _ => {
                check_settable(after)?;
                Ok(Diffed::Value(after.clone()))
            }
        }
    }

    fn diff_arrays_at(&self, before: &[StateValue], after: &[StateValue], depth: usize) -> Result<Diffed> {
        self.check_depth(depth)?;
        diff_sequence(
            before,
            after,
            true,
            |a, b| self.diff_values(a, b, depth + 1),
            |v| v.clone(),
            || StateValue::Array(after.to_vec()),
        )
    }

    fn diff_lists_at(&self, before: &[State], after: &[State], depth: usize) -> Result<Diffed> {
        self.check_depth(depth)?;
        diff_sequence(
            before,
            after,
            false,
            |a, b| {
                if equals_loose_states(a, b) {
                    return Ok(Diffed::Nop);
                }
                let diff = self.diff_states(a, b, depth + 1)?;
                Ok(if diff.is_empty() {
                    Diffed::Nop
                } else {
                    Diffed::Value(StateValue::State(diff))
                })
            },
            |s| StateValue::State(s.clone()),
            || StateValue::List(after.to_vec()),
        )
    }
}

/// Element-wise diff shared by arrays and complex lists.
///
/// A positional diff is only kept when at least one element is a nested
/// StateDiff; growth of a non-empty sequence becomes `rpush`. Anything else
/// is a full replacement.
fn diff_sequence<T>(
    before: &[T],
    after: &[T],
    is_array: bool,
    elem_diff: impl Fn(&T, &T) -> Result<Diffed>,
    to_value: impl Fn(&T) -> StateValue,
    whole: impl Fn() -> StateValue,
) -> Result<Diffed> {
    let do_rpush = !before.is_empty() && before.len() < after.len();
    if before.len() != after.len() && !do_rpush {
        return Ok(Diffed::Value(whole()));
    }
    let len = before.len();
    let mut entries = Vec::with_capacity(len);
    let mut nops = 0;
    let mut nested = 0;
    for (a, b) in before.iter().zip(after) {
        match elem_diff(a, b)? {
            Diffed::Nop => {
                nops += 1;
                entries.push(ListDiffEntry::Nop);
            }
            Diffed::Value(value) => {
                if matches!(&value, StateValue::State(s) if s.is_diff()) {
                    nested += 1;
                }
                entries.push(ListDiffEntry::Value(value));
            }
        }
    }
    let mut list_diff = if is_array { ListDiff::for_array() } else { ListDiff::for_list() };
    if nops != len {
        if nested == 0 {
            trace!(len = len, "positional diff holds only replacements, sending whole sequence");
            return Ok(Diffed::Value(whole()));
        }
        list_diff.diff = Some(entries);
    }
    if do_rpush {
        list_diff.rpush = Some(after[len..].iter().map(to_value).collect());
    }
    if list_diff.is_empty() {
        Ok(Diffed::Nop)
    } else {
        Ok(Diffed::Value(StateValue::ListDiff(list_diff)))
    }
}

fn equals_loose_states(a: &State, b: &State) -> bool {
    crate::state::equality::state_equals_loose(a, b)
}

/// A Delta only survives when chained from the exact value it was computed
/// against.
fn rebase_delta(key: &str, before: Option<&StateValue>, delta: Delta) -> StateValue {
    let base = delta.base().into_value();
    match before {
        Some(current) if equals_strict(current, &base) => StateValue::Delta(delta),
        _ => {
            trace!(key = %key, "delta base does not match stored value, sending full value");
            delta.full_value().into_value()
        }
    }
}

fn check_settable(value: &StateValue) -> Result<()> {
    match value {
        StateValue::ListDiff(_) => Err(Error::data_integrity(
            "list diff found where a stored value was expected",
        )),
        StateValue::State(s) if s.is_diff() => Err(Error::data_integrity(
            "state diff found where a stored value was expected",
        )),
        _ => Ok(()),
    }
}

/// [`DiffEngine::diff`] with the default depth limit.
pub fn diff(before: &State, after: &State) -> Result<State> {
    DiffEngine::default().diff(before, after)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::value::Number;

    fn file(name: &str) -> State {
        [("name", StateValue::from(name))].into_iter().collect()
    }

    #[test]
    fn removed_key_becomes_explicit_null() {
        let before: State = [("a", 1i64), ("b", 2i64)].into_iter().collect();
        let after: State = [("a", 1i64)].into_iter().collect();
        let diff = diff(&before, &after).unwrap();
        assert!(diff.is_diff());
        assert_eq!(diff.len(), 1);
        assert_eq!(diff.get("b"), Some(&StateValue::Null));
    }

    #[test]
    fn new_empty_collections_are_not_sent() {
        let before = State::new();
        let mut after = State::new();
        after.put("tags", StateValue::Array(vec![]));
        assert!(diff(&before, &after).unwrap().is_empty());
    }

    #[test]
    fn nested_state_yields_nested_diff() {
        let mut before = State::new();
        before.state_mut("dc").put("title", "a");
        before.state_mut("dc").put("source", "s");
        let mut after = before.clone();
        after.state_mut("dc").put("title", "b");
        let diff = diff(&before, &after).unwrap();
        let nested = diff.get("dc").and_then(|v| v.as_state()).unwrap();
        assert!(nested.is_diff());
        assert_eq!(nested.len(), 1);
        assert_eq!(nested.get("title"), Some(&StateValue::from("b")));
    }

    #[test]
    fn appended_array_elements_become_rpush() {
        let engine = DiffEngine::default();
        let before = vec![StateValue::from("a"), StateValue::from("b")];
        let after = vec![StateValue::from("a"), StateValue::from("b"), StateValue::from("c")];
        let Diffed::Value(StateValue::ListDiff(list_diff)) = engine.diff_arrays(&before, &after).unwrap() else {
            panic!("expected a list diff");
        };
        assert!(list_diff.is_array);
        assert!(list_diff.diff.is_none());
        assert_eq!(list_diff.rpush, Some(vec![StateValue::from("c")]));
    }

    #[test]
    fn changed_scalar_in_array_replaces_whole_array() {
        let engine = DiffEngine::default();
        let before = vec![StateValue::from("a"), StateValue::from("b")];
        let after = vec![StateValue::from("a"), StateValue::from("x")];
        assert_eq!(
            engine.diff_arrays(&before, &after).unwrap(),
            Diffed::Value(StateValue::Array(after.clone()))
        );
    }

    #[test]
    fn shrunk_or_empty_before_replaces_whole_list() {
        let engine = DiffEngine::default();
        let two = vec![file("a"), file("b")];
        let one = vec![file("a")];
        assert_eq!(
            engine.diff_lists(&two, &one).unwrap(),
            Diffed::Value(StateValue::List(one.clone()))
        );
        assert_eq!(
            engine.diff_lists(&[], &one).unwrap(),
            Diffed::Value(StateValue::List(one))
        );
    }

    #[test]
    fn list_element_change_keeps_positional_diff() {
        let engine = DiffEngine::default();
        let before = vec![file("a"), file("b")];
        let after = vec![file("a"), file("c"), file("d")];
        let Diffed::Value(StateValue::ListDiff(list_diff)) = engine.diff_lists(&before, &after).unwrap() else {
            panic!("expected a list diff");
        };
        let entries = list_diff.diff.unwrap();
        assert!(entries[0].is_nop());
        assert!(matches!(&entries[1], ListDiffEntry::Value(StateValue::State(s)) if s.is_diff()));
        assert_eq!(list_diff.rpush.map(|r| r.len()), Some(1));
    }

    #[test]
    fn identical_lists_are_nop() {
        let engine = DiffEngine::default();
        let list = vec![file("a"), file("b")];
        assert!(engine.diff_lists(&list, &list).unwrap().is_nop());
    }

    #[test]
    fn delta_kept_when_base_matches() {
        let before: State = [("count", 5i64)].into_iter().collect();
        let mut after = State::new();
        after.put("count", Delta::new(Number::Long(5), Number::Long(2)));
        let diff = diff(&before, &after).unwrap();
        assert!(matches!(diff.get("count"), Some(StateValue::Delta(_))));
    }

    #[test]
    fn stale_delta_becomes_full_value() {
        let before: State = [("count", 4i64)].into_iter().collect();
        let mut after = State::new();
        after.put("count", Delta::new(Number::Long(5), Number::Long(2)));
        let diff = diff(&before, &after).unwrap();
        assert_eq!(diff.get("count"), Some(&StateValue::Long(7)));
    }

    #[test]
    fn depth_limit_is_enforced() {
        let engine = DiffEngine::new(2);
        let mut before = State::new();
        before.state_mut("a").state_mut("b").state_mut("c").put("x", 1i64);
        let mut after = before.clone();
        after.state_mut("a").state_mut("b").state_mut("c").put("x", 2i64);
        assert!(engine.diff(&before, &after).is_err());
    }
}
