use std::fmt;

use serde::{
    Deserialize,
    Serialize,
};
use serde_json::{
    Map,
    Number,
    Value,
};

use crate::errors::*;

const TRUE_STRINGS: &[&str] = &["true", "yes", "on"];
const FALSE_STRINGS: &[&str] = &["false", "no", "off"];

#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum ScalarType {
    String,
    Integer,
    Number,
    Boolean,
    StringMap,
    StringList,
    IntOrString,
    Any,
}

impl ScalarType {
    pub const ALL: &'static [ScalarType] = &[
        ScalarType::String,
        ScalarType::Integer,
        ScalarType::Number,
        ScalarType::Boolean,
        ScalarType::StringMap,
        ScalarType::StringList,
        ScalarType::IntOrString,
        ScalarType::Any,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            ScalarType::String => "string",
            ScalarType::Integer => "integer",
            ScalarType::Number => "number",
            ScalarType::Boolean => "boolean",
            ScalarType::StringMap => "stringMap",
            ScalarType::StringList => "stringList",
            ScalarType::IntOrString => "intOrString",
            ScalarType::Any => "any",
        }
    }

    pub fn from_name(name: &str) -> Option<ScalarType> {
        ScalarType::ALL.iter().find(|t| t.name() == name).copied()
    }

    // Coerce a user-supplied (or server-returned) value into this type.  `at` is only used to
    // make the error message point somewhere useful.  Callers handle `null` themselves; it is
    // never a valid value for any scalar type except `any`.
    pub fn coerce(&self, value: &Value, at: &str) -> anyhow::Result<Value> {
        let coerced = match self {
            ScalarType::String => coerce_string(value),
            ScalarType::Integer => coerce_integer(value),
            ScalarType::Number => coerce_number(value),
            ScalarType::Boolean => coerce_boolean(value),
            ScalarType::StringMap => match value {
                Value::Object(map) => map
                    .iter()
                    .map(|(k, v)| coerce_string(v).map(|s| (k.clone(), s)))
                    .collect::<Option<Map<_, _>>>()
                    .map(Value::Object),
                _ => None,
            },
            ScalarType::StringList => match value {
                Value::Array(items) => items
                    .iter()
                    .map(coerce_string)
                    .collect::<Option<Vec<_>>>()
                    .map(Value::Array),
                _ => None,
            },
            ScalarType::IntOrString => match value {
                Value::String(_) => Some(value.clone()),
                _ => coerce_integer(value),
            },
            ScalarType::Any => Some(value.clone()),
        };

        coerced.ok_or_else(|| ReconcileError::type_mismatch(&format!("{at}: expected {self}, got {value}")))
    }
}

impl fmt::Display for ScalarType {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.name())
    }
}

fn coerce_string(value: &Value) -> Option<Value> {
    match value {
        Value::String(_) => Some(value.clone()),
        Value::Number(n) => Some(Value::String(n.to_string())),
        Value::Bool(b) => Some(Value::String(b.to_string())),
        _ => None,
    }
}

fn coerce_integer(value: &Value) -> Option<Value> {
    match value {
        Value::Number(n) if n.is_i64() || n.is_u64() => Some(value.clone()),
        Value::String(s) => s.trim().parse::<i64>().ok().map(Value::from),
        _ => None,
    }
}

fn coerce_number(value: &Value) -> Option<Value> {
    match value {
        Value::Number(_) => Some(value.clone()),
        Value::String(s) => {
            let s = s.trim();
            if let Ok(i) = s.parse::<i64>() {
                return Some(Value::from(i));
            }
            s.parse::<f64>().ok().and_then(Number::from_f64).map(Value::Number)
        },
        _ => None,
    }
}

fn coerce_boolean(value: &Value) -> Option<Value> {
    match value {
        Value::Bool(_) => Some(value.clone()),
        Value::String(s) => {
            let s = s.trim().to_lowercase();
            if TRUE_STRINGS.contains(&s.as_str()) {
                Some(Value::Bool(true))
            } else if FALSE_STRINGS.contains(&s.as_str()) {
                Some(Value::Bool(false))
            } else {
                None
            }
        },
        _ => None,
    }
}
