//! Attribute values attached to tree nodes.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Value stored under a node attribute.
///
/// Values compare by content: setting an attribute to a value equal to the
/// current one is a no-op.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
}

impl Value {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Bool(b) => write!(f, "{}", b),
            Value::Int(i) => write!(f, "{}", i),
            Value::Float(x) => write!(f, "{}", x),
            Value::Text(s) => write!(f, "{}", s),
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Text(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Text(s)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Int(i)
    }
}

impl From<f64> for Value {
    fn from(x: f64) -> Self {
        Value::Float(x)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn given_text_value_when_displayed_then_prints_raw_string() {
        assert_eq!(Value::from("orders").to_string(), "orders");
        assert_eq!(Value::from(42_i64).to_string(), "42");
    }

    #[test]
    fn given_untagged_toml_values_when_deserializing_then_picks_variant() {
        #[derive(Deserialize)]
        struct Holder {
            a: Value,
            b: Value,
            c: Value,
        }
        let h: Holder = toml::from_str("a = true\nb = 7\nc = \"x\"").unwrap();
        assert_eq!(h.a, Value::Bool(true));
        assert_eq!(h.b, Value::Int(7));
        assert_eq!(h.c, Value::Text("x".into()));
    }
}
