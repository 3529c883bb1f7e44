use crate::core::error::{Error, Result};
use crate::state::diff::DiffEngine;
use crate::state::list_diff::{ListDiff, ListDiffEntry};
use crate::state::state::State;
use crate::state::value::StateValue;

impl DiffEngine {
    /// Applies a StateDiff produced by [`DiffEngine::diff`] to `state`.
    ///
    /// Not idempotent: deltas increment and `rpush` appends every time, so a
    /// caller applies each diff exactly once per state transition.
    pub fn apply(&self, state: &mut State, diff: &State) -> Result<()> {
        self.apply_at(state, diff, 0)
    }

    fn apply_at(&self, state: &mut State, diff: &State, depth: usize) -> Result<()> {
        self.check_depth(depth)?;
        for (key, value) in diff.iter() {
            match value {
                StateValue::Null => {
                    state.remove(key);
                }
                StateValue::State(nested) if nested.is_diff() => {
                    let target = state.state_mut(key);
                    self.apply_at(target, nested, depth + 1)?;
                }
                StateValue::ListDiff(list_diff) => {
                    let current = state.get(key).cloned();
                    let updated = self.apply_list_diff(key, current, list_diff, depth)?;
                    state.put(key, updated);
                }
                StateValue::Delta(delta) => {
                    let updated = match state.get(key).and_then(StateValue::as_number) {
                        Some(current) => current.add(delta.delta()),
                        None => delta.full_value(),
                    };
                    state.put(key, updated.into_value());
                }
                other => {
                    state.put(key, other.clone());
                }
            }
        }
        Ok(())
    }

    fn apply_list_diff(
        &self,
        key: &str,
        current: Option<StateValue>,
        list_diff: &ListDiff,
        depth: usize,
    ) -> Result<StateValue> {
        if list_diff.is_array {
            let mut values = match current {
                Some(StateValue::Array(values)) => values,
                None | Some(StateValue::Null) => Vec::new(),
                Some(other) => return Err(mismatch(key, "array", &other)),
            };
            for (i, entry) in list_diff.diff.iter().flatten().enumerate() {
                if let ListDiffEntry::Value(value) = entry {
                    let slot = values.get_mut(i).ok_or_else(|| out_of_bounds(key, i))?;
                    *slot = value.clone();
                }
            }
            values.extend(list_diff.rpush.iter().flatten().cloned());
            return Ok(StateValue::Array(values));
        }

        let mut states = match current {
            Some(StateValue::List(states)) => states,
            None | Some(StateValue::Null) => Vec::new(),
            Some(other) => return Err(mismatch(key, "list", &other)),
        };
        for (i, entry) in list_diff.diff.iter().flatten().enumerate() {
            match entry {
                ListDiffEntry::Nop => {}
                ListDiffEntry::Value(StateValue::State(element)) => {
                    let slot = states.get_mut(i).ok_or_else(|| out_of_bounds(key, i))?;
                    if element.is_diff() {
                        self.apply_at(slot, element, depth + 1)?;
                    } else {
                        *slot = element.clone();
                    }
                }
                ListDiffEntry::Value(other) => {
                    return Err(Error::data_integrity(format!(
                        "{}: list diff element of kind {}",
                        key,
                        other.kind()
                    )));
                }
            }
        }
        for pushed in list_diff.rpush.iter().flatten() {
            match pushed {
                StateValue::State(element) => states.push(element.clone()),
                other => {
                    return Err(Error::data_integrity(format!(
                        "{}: cannot append {} to a complex list",
                        key,
                        other.kind()
                    )));
                }
            }
        }
        Ok(StateValue::List(states))
    }
}

fn mismatch(key: &str, expected: &str, found: &StateValue) -> Error {
    Error::data_integrity(format!(
        "{}: list diff expects {}, found {}",
        key,
        expected,
        found.kind()
    ))
}

fn out_of_bounds(key: &str, index: usize) -> Error {
    Error::data_integrity(format!("{}: list diff index {} out of bounds", key, index))
}

/// [`DiffEngine::apply`] with the default depth limit.
pub fn apply_diff(state: &mut State, diff: &State) -> Result<()> {
    DiffEngine::default().apply(state, diff)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::diff::diff;
    use crate::state::equality::state_equals_loose;
    use crate::state::value::{Delta, Number};

    fn file(name: &str) -> State {
        [("name", StateValue::from(name))].into_iter().collect()
    }

    #[test]
    fn applies_nested_and_list_changes() {
        let mut before = State::new();
        before.put("title", "old");
        before.put("tags", StateValue::array(["a", "b"]));
        before.put("files", vec![file("a.txt"), file("b.txt")]);
        before.state_mut("dc").put("creator", "bob");

        let mut after = State::new();
        after.put("title", "new");
        after.put("tags", StateValue::array(["a", "b", "c"]));
        after.put("files", vec![file("a.txt"), file("c.txt"), file("d.txt")]);
        after.state_mut("dc").put("creator", "alice");

        let diff = diff(&before, &after).unwrap();
        let mut result = before.clone();
        apply_diff(&mut result, &diff).unwrap();
        assert!(state_equals_loose(&result, &after));
    }

    #[test]
    fn delta_is_applied_relative_to_current_value() {
        let mut state: State = [("count", 7i64)].into_iter().collect();
        let mut diff = State::new_diff();
        diff.put("count", Delta::new(Number::Long(5), Number::Long(2)));
        apply_diff(&mut state, &diff).unwrap();
        assert_eq!(state.get("count"), Some(&StateValue::Long(9)));
    }

    #[test]
    fn applying_rpush_twice_appends_twice() {
        let mut state = State::new();
        state.put("tags", StateValue::array(["a"]));
        let mut diff = State::new_diff();
        diff.put(
            "tags",
            ListDiff {
                is_array: true,
                diff: None,
                rpush: Some(vec!["b".into()]),
            },
        );
        apply_diff(&mut state, &diff).unwrap();
        apply_diff(&mut state, &diff).unwrap();
        assert_eq!(state.get("tags"), Some(&StateValue::array(["a", "b", "b"])));
    }

    #[test]
    fn out_of_bounds_positional_diff_is_rejected() {
        let mut state = State::new();
        let mut diff = State::new_diff();
        diff.put(
            "files",
            ListDiff {
                is_array: false,
                diff: Some(vec![ListDiffEntry::Value(StateValue::State(State::new_diff()))]),
                rpush: None,
            },
        );
        assert!(apply_diff(&mut state, &diff).is_err());
    }
}
