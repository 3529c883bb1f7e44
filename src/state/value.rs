use std::fmt;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use crate::state::list_diff::ListDiff;
use crate::state::state::State;

/// Opaque reference to binary content held by an external blob manager.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BinaryRef(pub String);

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Number {
    Long(i64),
    Double(f64),
}

impl Number {
    pub fn add(self, other: Number) -> Number {
        match (self, other) {
            (Number::Long(a), Number::Long(b)) => Number::Long(a.wrapping_add(b)),
            (a, b) => Number::Double(a.as_f64() + b.as_f64()),
        }
    }

    pub fn as_f64(self) -> f64 {
        match self {
            Number::Long(v) => v as f64,
            Number::Double(v) => v,
        }
    }

    pub fn into_value(self) -> StateValue {
        match self {
            Number::Long(v) => StateValue::Long(v),
            Number::Double(v) => StateValue::Double(v),
        }
    }
}

/// An increment relative to the value it was computed against.
///
/// Only valid when applied on top of exactly `base`; the diff engine replaces
/// it with the full value otherwise.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Delta {
    base: Number,
    delta: Number,
}

impl Delta {
    pub fn new(base: Number, delta: Number) -> Self {
        Delta { base, delta }
    }

    pub fn base(&self) -> Number {
        self.base
    }

    pub fn delta(&self) -> Number {
        self.delta
    }

    pub fn full_value(&self) -> Number {
        self.base.add(self.delta)
    }

    /// Chains another increment, keeping the original base.
    pub fn add(&self, increment: Number) -> Delta {
        Delta {
            base: self.base,
            delta: self.delta.add(increment),
        }
    }
}

/// A property value held by a [`State`].
///
/// `Null` is only meaningful inside a StateDiff (explicit clear); `ListDiff`
/// is only valid as a StateDiff entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum StateValue {
    Null,
    String(String),
    Boolean(bool),
    Long(i64),
    Double(f64),
    Date(DateTime<Utc>),
    Binary(BinaryRef),
    Delta(Delta),
    Array(Vec<StateValue>),
    State(State),
    List(Vec<State>),
    ListDiff(ListDiff),
}

impl StateValue {
    pub fn array<I, V>(values: I) -> StateValue
    where
        I: IntoIterator<Item = V>,
        V: Into<StateValue>,
    {
        StateValue::Array(values.into_iter().map(Into::into).collect())
    }

    pub fn is_null(&self) -> bool {
        matches!(self, StateValue::Null)
    }

    pub fn is_scalar(&self) -> bool {
        matches!(
            self,
            StateValue::String(_)
                | StateValue::Boolean(_)
                | StateValue::Long(_)
                | StateValue::Double(_)
                | StateValue::Date(_)
                | StateValue::Binary(_)
                | StateValue::Delta(_)
        )
    }

    /// Null and empty collections, all equivalent to an absent key under
    /// loose equality.
    pub fn is_loosely_absent(&self) -> bool {
        match self {
            StateValue::Null => true,
            StateValue::Array(values) => values.is_empty(),
            StateValue::List(states) => states.is_empty(),
            StateValue::State(state) => state.is_empty(),
            _ => false,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            StateValue::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            StateValue::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            StateValue::Long(v) => Some(*v),
            _ => None,
        }
    }

    /// Numeric view; a Delta reads as its full value.
    pub fn as_number(&self) -> Option<Number> {
        match self {
            StateValue::Long(v) => Some(Number::Long(*v)),
            StateValue::Double(v) => Some(Number::Double(*v)),
            StateValue::Delta(d) => Some(d.full_value()),
            _ => None,
        }
    }

    pub fn as_state(&self) -> Option<&State> {
        match self {
            StateValue::State(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&[StateValue]> {
        match self {
            StateValue::Array(values) => Some(values),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[State]> {
        match self {
            StateValue::List(states) => Some(states),
            _ => None,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            StateValue::Null => "null",
            StateValue::String(_) => "string",
            StateValue::Boolean(_) => "boolean",
            StateValue::Long(_) => "long",
            StateValue::Double(_) => "double",
            StateValue::Date(_) => "date",
            StateValue::Binary(_) => "binary",
            StateValue::Delta(_) => "delta",
            StateValue::Array(_) => "array",
            StateValue::State(s) if s.is_diff() => "state-diff",
            StateValue::State(_) => "state",
            StateValue::List(_) => "list",
            StateValue::ListDiff(_) => "list-diff",
        }
    }
}

impl PartialEq for StateValue {
    fn eq(&self, other: &Self) -> bool {
        crate::state::equality::equals_strict(self, other)
    }
}

impl fmt::Display for StateValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StateValue::Null => write!(f, "null"),
            StateValue::String(s) => write!(f, "'{}'", s),
            StateValue::Boolean(b) => write!(f, "{}", b),
            StateValue::Long(v) => write!(f, "{}", v),
            StateValue::Double(v) => write!(f, "{}", v),
            StateValue::Date(d) => write!(f, "{}", d.to_rfc3339()),
            StateValue::Binary(b) => write!(f, "binary({})", b.0),
            StateValue::Delta(d) => write!(f, "delta({:?} + {:?})", d.base, d.delta),
            StateValue::Array(values) => {
                write!(f, "[")?;
                for (i, v) in values.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", v)?;
                }
                write!(f, "]")
            }
            StateValue::State(s) => write!(f, "{}", s),
            StateValue::List(states) => {
                write!(f, "[")?;
                for (i, s) in states.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", s)?;
                }
                write!(f, "]")
            }
            StateValue::ListDiff(ld) => write!(f, "{:?}", ld),
        }
    }
}

impl From<&str> for StateValue {
    fn from(value: &str) -> Self {
        StateValue::String(value.to_string())
    }
}

impl From<String> for StateValue {
    fn from(value: String) -> Self {
        StateValue::String(value)
    }
}

impl From<bool> for StateValue {
    fn from(value: bool) -> Self {
        StateValue::Boolean(value)
    }
}

impl From<i64> for StateValue {
    fn from(value: i64) -> Self {
        StateValue::Long(value)
    }
}

impl From<f64> for StateValue {
    fn from(value: f64) -> Self {
        StateValue::Double(value)
    }
}

impl From<DateTime<Utc>> for StateValue {
    fn from(value: DateTime<Utc>) -> Self {
        StateValue::Date(value)
    }
}

impl From<Delta> for StateValue {
    fn from(value: Delta) -> Self {
        StateValue::Delta(value)
    }
}

impl From<State> for StateValue {
    fn from(value: State) -> Self {
        StateValue::State(value)
    }
}

impl From<Vec<State>> for StateValue {
    fn from(value: Vec<State>) -> Self {
        StateValue::List(value)
    }
}

impl From<ListDiff> for StateValue {
    fn from(value: ListDiff) -> Self {
        StateValue::ListDiff(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn delta_chains_from_original_base() {
        let delta = Delta::new(Number::Long(10), Number::Long(2)).add(Number::Long(3));
        assert_eq!(delta.base(), Number::Long(10));
        assert_eq!(delta.full_value(), Number::Long(15));
    }

    #[test]
    fn mixed_numbers_widen_to_double() {
        assert_eq!(Number::Long(1).add(Number::Double(0.5)), Number::Double(1.5));
    }

    #[test]
    fn loosely_absent_values() {
        assert!(StateValue::Null.is_loosely_absent());
        assert!(StateValue::Array(vec![]).is_loosely_absent());
        assert!(StateValue::List(vec![]).is_loosely_absent());
        assert!(StateValue::State(State::new()).is_loosely_absent());
        assert!(!StateValue::from("").is_loosely_absent());
    }
}
