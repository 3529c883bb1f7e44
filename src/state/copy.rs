use std::sync::Arc;
use parking_lot::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use crate::core::error::{Error, Result};
use crate::state::list_diff::{ListDiff, ListDiffEntry};
use crate::state::state::State;
use crate::state::value::StateValue;

pub const DEFAULT_MAX_DEPTH: usize = 512;

/// Deep copy of a state, refusing anything a stored document cannot hold.
pub fn copy(state: &State) -> Result<State> {
    copy_with_depth(state, DEFAULT_MAX_DEPTH)
}

pub fn copy_with_depth(state: &State, max_depth: usize) -> Result<State> {
    validate(state, max_depth)?;
    Ok(state.clone())
}

pub fn copy_value(value: &StateValue) -> Result<StateValue> {
    match value {
        StateValue::State(state) => Ok(StateValue::State(copy(state)?)),
        StateValue::List(states) => {
            let copies = states.iter().map(copy).collect::<Result<Vec<_>>>()?;
            Ok(StateValue::List(copies))
        }
        StateValue::Array(values) => {
            check_array(values)?;
            Ok(value.clone())
        }
        StateValue::ListDiff(_) => Err(Error::data_integrity(
            "list diff cannot be copied outside of a state diff",
        )),
        _ => Ok(value.clone()),
    }
}

/// Checks the shape of a state tree without copying it.
///
/// Arrays may only hold scalars or nulls, list diffs may only appear inside a
/// StateDiff, and a StateDiff may not be nested inside a plain state.
pub fn validate(state: &State, max_depth: usize) -> Result<()> {
    let mut stack: Vec<(&State, usize)> = vec![(state, 0)];
    while let Some((current, depth)) = stack.pop() {
        if depth > max_depth {
            return Err(Error::data_integrity(format!(
                "state nesting exceeds {} levels",
                max_depth
            )));
        }
        for (key, value) in current.iter() {
            match value {
                StateValue::Array(values) => check_array(values)
                    .map_err(|e| Error::data_integrity(format!("{}: {}", key, e.context)))?,
                StateValue::State(child) => {
                    check_flavor(current, child, key)?;
                    stack.push((child, depth + 1));
                }
                StateValue::List(children) => {
                    for child in children {
                        if child.is_diff() {
                            return Err(Error::data_integrity(format!(
                                "{}: list element is a state diff",
                                key
                            )));
                        }
                        stack.push((child, depth + 1));
                    }
                }
                StateValue::ListDiff(list_diff) => {
                    if !current.is_diff() {
                        return Err(Error::data_integrity(format!(
                            "{}: list diff stored in a plain state",
                            key
                        )));
                    }
                    check_list_diff(list_diff, key)?;
                    for entry in list_diff.diff.iter().flatten() {
                        if let ListDiffEntry::Value(StateValue::State(child)) = entry {
                            stack.push((child, depth + 1));
                        }
                    }
                    for pushed in list_diff.rpush.iter().flatten() {
                        if let StateValue::State(child) = pushed {
                            stack.push((child, depth + 1));
                        }
                    }
                }
                _ => {}
            }
        }
    }
    Ok(())
}

fn check_array(values: &[StateValue]) -> Result<()> {
    for value in values {
        if matches!(value, StateValue::Delta(_)) || !(value.is_scalar() || value.is_null()) {
            return Err(Error::data_integrity(format!(
                "array element of kind {} is not a scalar",
                value.kind()
            )));
        }
    }
    Ok(())
}

fn check_flavor(parent: &State, child: &State, key: &str) -> Result<()> {
    if child.is_diff() && !parent.is_diff() {
        return Err(Error::data_integrity(format!(
            "{}: state diff nested in a plain state",
            key
        )));
    }
    Ok(())
}

fn check_list_diff(list_diff: &ListDiff, key: &str) -> Result<()> {
    if !list_diff.is_array {
        return Ok(());
    }
    let entries = list_diff.diff.iter().flatten().filter_map(|e| match e {
        ListDiffEntry::Value(v) => Some(v),
        ListDiffEntry::Nop => None,
    });
    for value in entries.chain(list_diff.rpush.iter().flatten()) {
        if !value.is_scalar() && !value.is_null() {
            return Err(Error::data_integrity(format!(
                "{}: array diff element of kind {}",
                key,
                value.kind()
            )));
        }
    }
    Ok(())
}

/// A state that may be read and mutated from several threads.
///
/// Copies made from it are again shared.
#[derive(Debug, Clone, Default)]
pub struct SharedState {
    inner: Arc<RwLock<State>>,
}

impl SharedState {
    pub fn new(state: State) -> Self {
        SharedState {
            inner: Arc::new(RwLock::new(state)),
        }
    }

    pub fn read(&self) -> RwLockReadGuard<'_, State> {
        self.inner.read()
    }

    pub fn write(&self) -> RwLockWriteGuard<'_, State> {
        self.inner.write()
    }

    pub fn get(&self, key: &str) -> Option<StateValue> {
        self.inner.read().get(key).cloned()
    }

    pub fn put(&self, key: impl Into<String>, value: impl Into<StateValue>) -> Option<StateValue> {
        self.inner.write().put(key, value)
    }

    pub fn deep_copy(&self) -> Result<SharedState> {
        let copied = copy(&self.inner.read())?;
        Ok(SharedState::new(copied))
    }

    pub fn snapshot(&self) -> Result<State> {
        copy(&self.inner.read())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::error::ErrorKind;
    use crate::state::value::{Delta, Number};

    #[test]
    fn copy_is_independent_of_source() {
        let mut source = State::new();
        source.state_mut("dc").put("title", "before");
        let mut copied = copy(&source).unwrap();
        copied.state_mut("dc").put("title", "after");
        let title = source.get("dc").and_then(|v| v.as_state()).and_then(|s| s.get("title"));
        assert_eq!(title.and_then(|v| v.as_str()), Some("before"));
    }

    #[test]
    fn copy_rejects_nested_arrays() {
        let mut state = State::new();
        state.put("bad", StateValue::Array(vec![StateValue::Array(vec![])]));
        let err = copy(&state).unwrap_err();
        assert_eq!(err.kind, ErrorKind::DataIntegrity);
    }

    #[test]
    fn copy_rejects_delta_in_array() {
        let delta = Delta::new(Number::Long(1), Number::Long(1));
        let mut state = State::new();
        state.put("bad", StateValue::Array(vec![StateValue::Delta(delta)]));
        assert!(copy(&state).is_err());
    }

    #[test]
    fn copy_rejects_list_diff_in_plain_state() {
        let mut state = State::new();
        state.put("bad", StateValue::ListDiff(ListDiff::for_array()));
        assert!(copy(&state).is_err());
        let mut diff = State::new_diff();
        diff.put("ok", StateValue::ListDiff(ListDiff::for_array()));
        assert!(copy(&diff).is_ok());
    }

    #[test]
    fn copy_enforces_depth() {
        let mut state = State::new();
        {
            let mut cursor = &mut state;
            for _ in 0..10 {
                cursor = cursor.state_mut("child");
            }
            cursor.put("leaf", 1i64);
        }
        assert!(copy_with_depth(&state, 20).is_ok());
        assert_eq!(copy_with_depth(&state, 5).unwrap_err().kind, ErrorKind::DataIntegrity);
    }

    #[test]
    fn shared_copy_stays_shared_and_detached() {
        let shared = SharedState::new(State::new());
        shared.put("count", 1i64);
        let other = shared.deep_copy().unwrap();
        other.put("count", 2i64);
        assert_eq!(shared.get("count"), Some(StateValue::Long(1)));
        assert_eq!(other.get("count"), Some(StateValue::Long(2)));
    }
}
