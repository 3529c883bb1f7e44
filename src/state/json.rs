//! Conversion between states and `serde_json` documents.
//!
//! JSON arrays of objects become complex lists, other arrays become scalar
//! arrays. Dates are written as RFC 3339 strings and read back as strings.

use serde_json::{Map, Number as JsonNumber, Value};
use crate::core::error::{Error, ErrorKind, Result};
use crate::state::state::State;
use crate::state::value::{Number, StateValue};

pub fn from_json(value: &Value) -> Result<State> {
    match value {
        Value::Object(map) => object_to_state(map),
        other => Err(Error::new(
            ErrorKind::InvalidArgument,
            format!("expected a JSON object, found {}", json_kind(other)),
        )),
    }
}

pub fn from_json_str(json: &str) -> Result<State> {
    let value: Value = serde_json::from_str(json)?;
    from_json(&value)
}

pub fn to_json(state: &State) -> Result<Value> {
    let mut map = Map::with_capacity(state.len());
    for (key, value) in state.iter() {
        map.insert(key.to_string(), value_to_json(value)?);
    }
    Ok(Value::Object(map))
}

fn object_to_state(map: &Map<String, Value>) -> Result<State> {
    let mut state = State::new();
    for (key, value) in map {
        let converted = json_to_value(value).map_err(|e| {
            Error::new(e.kind, format!("{}: {}", key, e.context))
        })?;
        if !converted.is_null() {
            state.put(key.as_str(), converted);
        }
    }
    Ok(state)
}

fn json_to_value(value: &Value) -> Result<StateValue> {
    Ok(match value {
        Value::Null => StateValue::Null,
        Value::Bool(b) => StateValue::Boolean(*b),
        Value::Number(n) => match n.as_i64() {
            Some(v) => StateValue::Long(v),
            None => StateValue::Double(n.as_f64().unwrap_or(f64::NAN)),
        },
        Value::String(s) => StateValue::String(s.clone()),
        Value::Object(map) => StateValue::State(object_to_state(map)?),
        Value::Array(items) if !items.is_empty() && items.iter().all(Value::is_object) => {
            let states = items
                .iter()
                .filter_map(Value::as_object)
                .map(object_to_state)
                .collect::<Result<Vec<_>>>()?;
            StateValue::List(states)
        }
        Value::Array(items) => {
            let values = items
                .iter()
                .map(|item| match item {
                    Value::Array(_) | Value::Object(_) => Err(Error::data_integrity(format!(
                        "array element of kind {} is not a scalar",
                        json_kind(item)
                    ))),
                    scalar => json_to_value(scalar),
                })
                .collect::<Result<Vec<_>>>()?;
            StateValue::Array(values)
        }
    })
}

fn value_to_json(value: &StateValue) -> Result<Value> {
    Ok(match value {
        StateValue::Null => Value::Null,
        StateValue::String(s) => Value::String(s.clone()),
        StateValue::Boolean(b) => Value::Bool(*b),
        StateValue::Long(v) => Value::from(*v),
        StateValue::Double(v) => JsonNumber::from_f64(*v).map(Value::Number).unwrap_or(Value::Null),
        StateValue::Date(d) => Value::String(d.to_rfc3339()),
        StateValue::Binary(b) => Value::String(b.0.clone()),
        StateValue::Delta(d) => match d.full_value() {
            Number::Long(v) => Value::from(v),
            Number::Double(v) => JsonNumber::from_f64(v).map(Value::Number).unwrap_or(Value::Null),
        },
        StateValue::Array(values) => {
            Value::Array(values.iter().map(value_to_json).collect::<Result<Vec<_>>>()?)
        }
        StateValue::State(state) => to_json(state)?,
        StateValue::List(states) => {
            Value::Array(states.iter().map(to_json).collect::<Result<Vec<_>>>()?)
        }
        StateValue::ListDiff(_) => {
            return Err(Error::data_integrity("list diff has no JSON document form"));
        }
    })
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
