// Copyright (c) 2025 - Cowboy AI, Inc.
//! Model Values
//!
//! [`ModelValue`] is the typed value held by a resource attribute. `Undefined`
//! is a first-class value: it is never conflated with zero, `false` or the
//! empty string, and defaults are only substituted at read time.
//!
//! # JSON Mapping
//!
//! | JSON                    | ModelValue          |
//! |-------------------------|---------------------|
//! | `null`                  | `Undefined`         |
//! | `true` / `false`        | `Boolean`           |
//! | integer within `i32`    | `Int`               |
//! | other integer           | `Long`              |
//! | `"${...}"` string       | `Expression`        |
//! | other string            | `String`            |
//! | array                   | `List`              |

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;
use std::fmt;
use thiserror::Error;

use super::expression::is_expression;

/// Value conversion error
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValueError {
    #[error("Unsupported value: {0}")]
    Unsupported(String),

    #[error("Cannot convert '{value}' to {target}")]
    Conversion { value: String, target: String },

    #[error("Cannot resolve expression '{0}'")]
    UnresolvedExpression(String),
}

/// A typed attribute value, or undefined
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum ModelValue {
    #[default]
    Undefined,
    Boolean(bool),
    Int(i32),
    Long(i64),
    String(String),
    /// Unresolved `${...}` expression, resolved only on request
    Expression(String),
    List(Vec<ModelValue>),
}

impl ModelValue {
    pub fn is_defined(&self) -> bool {
        !matches!(self, ModelValue::Undefined)
    }

    pub fn is_expression(&self) -> bool {
        match self {
            ModelValue::Expression(_) => true,
            ModelValue::List(items) => items.iter().any(ModelValue::is_expression),
            _ => false,
        }
    }

    /// Convert a raw JSON value, detecting expressions in strings
    pub fn from_json(value: &Value) -> Result<Self, ValueError> {
        match value {
            Value::Null => Ok(ModelValue::Undefined),
            Value::Bool(b) => Ok(ModelValue::Boolean(*b)),
            Value::Number(n) => match n.as_i64() {
                Some(i) => Ok(i32::try_from(i)
                    .map(ModelValue::Int)
                    .unwrap_or(ModelValue::Long(i))),
                None => Err(ValueError::Unsupported(format!(
                    "non-integer number {}",
                    n
                ))),
            },
            Value::String(s) if is_expression(s) => Ok(ModelValue::Expression(s.clone())),
            Value::String(s) => Ok(ModelValue::String(s.clone())),
            Value::Array(items) => items
                .iter()
                .map(ModelValue::from_json)
                .collect::<Result<Vec<_>, _>>()
                .map(ModelValue::List),
            Value::Object(_) => Err(ValueError::Unsupported("object value".to_string())),
        }
    }

    pub fn to_json(&self) -> Value {
        match self {
            ModelValue::Undefined => Value::Null,
            ModelValue::Boolean(b) => Value::Bool(*b),
            ModelValue::Int(i) => Value::from(*i),
            ModelValue::Long(l) => Value::from(*l),
            ModelValue::String(s) | ModelValue::Expression(s) => Value::String(s.clone()),
            ModelValue::List(items) => Value::Array(items.iter().map(ModelValue::to_json).collect()),
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            ModelValue::String(s) | ModelValue::Expression(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            ModelValue::Int(i) => Some(i64::from(*i)),
            ModelValue::Long(l) => Some(*l),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            ModelValue::Boolean(b) => Some(*b),
            _ => None,
        }
    }
}

impl fmt::Display for ModelValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ModelValue::Undefined => write!(f, "undefined"),
            ModelValue::Boolean(b) => write!(f, "{}", b),
            ModelValue::Int(i) => write!(f, "{}", i),
            ModelValue::Long(l) => write!(f, "{}", l),
            ModelValue::String(s) | ModelValue::Expression(s) => write!(f, "{}", s),
            ModelValue::List(items) => {
                write!(f, "[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ",")?;
                    }
                    write!(f, "{}", item)?;
                }
                write!(f, "]")
            }
        }
    }
}

impl From<&str> for ModelValue {
    fn from(s: &str) -> Self {
        if is_expression(s) {
            ModelValue::Expression(s.to_string())
        } else {
            ModelValue::String(s.to_string())
        }
    }
}

impl From<String> for ModelValue {
    fn from(s: String) -> Self {
        ModelValue::from(s.as_str())
    }
}

impl From<i32> for ModelValue {
    fn from(i: i32) -> Self {
        ModelValue::Int(i)
    }
}

impl From<i64> for ModelValue {
    fn from(l: i64) -> Self {
        ModelValue::Long(l)
    }
}

impl From<bool> for ModelValue {
    fn from(b: bool) -> Self {
        ModelValue::Boolean(b)
    }
}

impl<T: Into<ModelValue>> From<Option<T>> for ModelValue {
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or(ModelValue::Undefined)
    }
}

impl Serialize for ModelValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_json().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for ModelValue {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = Value::deserialize(deserializer)?;
        ModelValue::from_json(&raw).map_err(serde::de::Error::custom)
    }
}
