use std::collections::HashMap;
use std::collections::hash_map;
use std::fmt;
use std::slice;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde::ser::{SerializeMap, SerializeStruct};
use crate::state::value::StateValue;

/// Above this many entries the inline list is swapped for a hash map.
pub const INLINE_MAX: usize = 5;

#[derive(Debug, Clone)]
enum Entries {
    Inline(Vec<(String, StateValue)>),
    Map(HashMap<String, StateValue>),
}

/// Key/value properties of one document or one complex property.
///
/// A State created with [`State::new_diff`] is a StateDiff: putting `Null`
/// stores an explicit clear instead of removing the key.
#[derive(Debug, Clone)]
pub struct State {
    entries: Entries,
    diff: bool,
}

impl State {
    pub fn new() -> Self {
        State {
            entries: Entries::Inline(Vec::new()),
            diff: false,
        }
    }

    pub fn new_diff() -> Self {
        State {
            entries: Entries::Inline(Vec::new()),
            diff: true,
        }
    }

    /// Empty state of the same flavor (plain or diff).
    pub fn empty_like(&self) -> Self {
        State {
            entries: Entries::Inline(Vec::new()),
            diff: self.diff,
        }
    }

    pub fn is_diff(&self) -> bool {
        self.diff
    }

    pub fn len(&self) -> usize {
        match &self.entries {
            Entries::Inline(list) => list.len(),
            Entries::Map(map) => map.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn get(&self, key: &str) -> Option<&StateValue> {
        match &self.entries {
            Entries::Inline(list) => list.iter().find(|(k, _)| k == key).map(|(_, v)| v),
            Entries::Map(map) => map.get(key),
        }
    }

    pub fn get_mut(&mut self, key: &str) -> Option<&mut StateValue> {
        match &mut self.entries {
            Entries::Inline(list) => list.iter_mut().find(|(k, _)| k == key).map(|(_, v)| v),
            Entries::Map(map) => map.get_mut(key),
        }
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    /// Stores `value` under `key`, returning the previous value.
    ///
    /// On a plain State a `Null` value removes the key.
    pub fn put(&mut self, key: impl Into<String>, value: impl Into<StateValue>) -> Option<StateValue> {
        let key = key.into();
        let value = value.into();
        if value.is_null() && !self.diff {
            return self.remove(&key);
        }
        match &mut self.entries {
            Entries::Inline(list) => {
                if let Some(slot) = list.iter_mut().find(|(k, _)| *k == key) {
                    return Some(std::mem::replace(&mut slot.1, value));
                }
                if list.len() < INLINE_MAX {
                    list.push((key, value));
                    return None;
                }
                let mut map: HashMap<String, StateValue> = list.drain(..).collect();
                map.insert(key, value);
                self.entries = Entries::Map(map);
                None
            }
            Entries::Map(map) => map.insert(key, value),
        }
    }

    pub fn remove(&mut self, key: &str) -> Option<StateValue> {
        match &mut self.entries {
            Entries::Inline(list) => {
                let pos = list.iter().position(|(k, _)| k == key)?;
                Some(list.remove(pos).1)
            }
            Entries::Map(map) => map.remove(key),
        }
    }

    pub fn clear(&mut self) {
        self.entries = Entries::Inline(Vec::new());
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.iter().map(|(k, _)| k)
    }

    pub fn values(&self) -> impl Iterator<Item = &StateValue> {
        self.iter().map(|(_, v)| v)
    }

    pub fn iter(&self) -> Iter<'_> {
        match &self.entries {
            Entries::Inline(list) => Iter::Inline(list.iter()),
            Entries::Map(map) => Iter::Map(map.iter()),
        }
    }

    /// Mutable access to a nested State, creating it (with this State's
    /// flavor) when the key is absent or holds something else.
    pub fn state_mut(&mut self, key: &str) -> &mut State {
        let present = matches!(self.get(key), Some(StateValue::State(_)));
        if !present {
            let child = self.empty_like();
            self.put(key.to_string(), StateValue::State(child));
        }
        match self.get_mut(key) {
            Some(StateValue::State(state)) => state,
            _ => unreachable!("nested state was just inserted"),
        }
    }

    #[cfg(test)]
    pub(crate) fn is_inline(&self) -> bool {
        matches!(self.entries, Entries::Inline(_))
    }
}

impl Default for State {
    fn default() -> Self {
        Self::new()
    }
}

impl PartialEq for State {
    fn eq(&self, other: &Self) -> bool {
        crate::state::equality::state_equals_strict(self, other)
    }
}

pub enum Iter<'a> {
    Inline(slice::Iter<'a, (String, StateValue)>),
    Map(hash_map::Iter<'a, String, StateValue>),
}

impl<'a> Iterator for Iter<'a> {
    type Item = (&'a str, &'a StateValue);

    fn next(&mut self) -> Option<Self::Item> {
        match self {
            Iter::Inline(it) => it.next().map(|(k, v)| (k.as_str(), v)),
            Iter::Map(it) => it.next().map(|(k, v)| (k.as_str(), v)),
        }
    }
}

impl<'a> IntoIterator for &'a State {
    type Item = (&'a str, &'a StateValue);
    type IntoIter = Iter<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl IntoIterator for State {
    type Item = (String, StateValue);
    type IntoIter = Box<dyn Iterator<Item = (String, StateValue)>>;

    fn into_iter(self) -> Self::IntoIter {
        match self.entries {
            Entries::Inline(list) => Box::new(list.into_iter()),
            Entries::Map(map) => Box::new(map.into_iter()),
        }
    }
}

impl<K: Into<String>, V: Into<StateValue>> FromIterator<(K, V)> for State {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        let mut state = State::new();
        for (k, v) in iter {
            state.put(k, v);
        }
        state
    }
}

impl fmt::Display for State {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut keys: Vec<&str> = self.keys().collect();
        keys.sort_unstable();
        write!(f, "{}{{", if self.diff { "diff" } else { "" })?;
        for (i, key) in keys.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            if let Some(value) = self.get(key) {
                write!(f, "{}={}", key, value)?;
            }
        }
        write!(f, "}}")
    }
}

/// Serialized as `{"diff": bool, "entries": {key: value}}` so that a
/// StateDiff keeps its flag and its explicit `Null` clears.
impl Serialize for State {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut wire = serializer.serialize_struct("State", 2)?;
        wire.serialize_field("diff", &self.diff)?;
        wire.serialize_field("entries", &EntriesRef(self))?;
        wire.end()
    }
}

struct EntriesRef<'a>(&'a State);

impl Serialize for EntriesRef<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (k, v) in self.0.iter() {
            map.serialize_entry(k, v)?;
        }
        map.end()
    }
}

#[derive(Deserialize)]
struct StateWire {
    #[serde(default)]
    diff: bool,
    #[serde(default)]
    entries: HashMap<String, StateValue>,
}

impl<'de> Deserialize<'de> for State {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let wire = StateWire::deserialize(deserializer)?;
        let mut state = if wire.diff { State::new_diff() } else { State::new() };
        for (k, v) in wire.entries {
            state.put(k, v);
        }
        Ok(state)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn switches_to_map_past_inline_threshold() {
        let mut state = State::new();
        for i in 0..INLINE_MAX {
            state.put(format!("k{}", i), i as i64);
        }
        assert!(state.is_inline());
        state.put("extra", "x");
        assert!(!state.is_inline());
        assert_eq!(state.len(), INLINE_MAX + 1);
        for i in 0..INLINE_MAX {
            assert_eq!(state.get(&format!("k{}", i)), Some(&StateValue::Long(i as i64)));
        }
        assert_eq!(state.get("extra").and_then(|v| v.as_str()), Some("x"));
    }

    #[test]
    fn null_put_removes_on_plain_state() {
        let mut state = State::new();
        state.put("title", "doc");
        state.put("title", StateValue::Null);
        assert!(!state.contains_key("title"));
        assert!(state.is_empty());
    }

    #[test]
    fn null_put_is_kept_on_diff() {
        let mut diff = State::new_diff();
        diff.put("title", StateValue::Null);
        assert_eq!(diff.get("title"), Some(&StateValue::Null));
    }

    #[test]
    fn replacing_keeps_single_entry() {
        let mut state = State::new();
        assert_eq!(state.put("a", 1i64), None);
        assert_eq!(state.put("a", 2i64), Some(StateValue::Long(1)));
        assert_eq!(state.len(), 1);
    }

    #[test]
    fn lookup_ignores_insertion_order() {
        let a: State = (0..8).map(|i| (format!("k{}", i), i as i64)).collect();
        let b: State = (0..8).rev().map(|i| (format!("k{}", i), i as i64)).collect();
        assert_eq!(a, b);
    }

    #[test]
    fn state_mut_creates_nested_state() {
        let mut state = State::new();
        state.state_mut("dc").put("title", "x");
        let nested = state.get("dc").and_then(|v| v.as_state()).unwrap();
        assert_eq!(nested.get("title").and_then(|v| v.as_str()), Some("x"));
        assert!(!nested.is_diff());
    }

    #[test]
    fn serde_keeps_diff_flag_and_clears() {
        let mut diff = State::new_diff();
        diff.put("title", StateValue::Null);
        diff.state_mut("dc").put("b", StateValue::Null);
        let json = serde_json::to_string(&diff).unwrap();
        let back: State = serde_json::from_str(&json).unwrap();
        assert!(back.is_diff());
        assert_eq!(back, diff);
        let nested = back.get("dc").and_then(|v| v.as_state()).unwrap();
        assert!(nested.is_diff());
        assert_eq!(nested.get("b"), Some(&StateValue::Null));

        let plain: State = serde_json::from_str(r#"{"entries": {"title": {"String": "t"}}}"#).unwrap();
        assert!(!plain.is_diff());
        assert_eq!(plain.get("title").and_then(|v| v.as_str()), Some("t"));
    }
}
