use std::fmt;

use serde::{Deserialize, Serialize};

/// A scalar parameter value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
  Bool(bool),
  Number(f64),
  String(String),
}

impl fmt::Display for Value {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      // Booleans print the way parameter files spell them.
      Value::Bool(true) => f.write_str("yes"),
      Value::Bool(false) => f.write_str("no"),
      Value::Number(n) => write!(f, "{}", n),
      Value::String(s) => f.write_str(s),
    }
  }
}

impl From<bool> for Value {
  fn from(value: bool) -> Self {
    Value::Bool(value)
  }
}

impl From<f64> for Value {
  fn from(value: f64) -> Self {
    Value::Number(value)
  }
}

impl From<i64> for Value {
  fn from(value: i64) -> Self {
    Value::Number(value as f64)
  }
}

impl From<&str> for Value {
  fn from(value: &str) -> Self {
    Value::String(value.to_string())
  }
}

impl From<String> for Value {
  fn from(value: String) -> Self {
    Value::String(value)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_display() {
    assert_eq!(Value::from(true).to_string(), "yes");
    assert_eq!(Value::from(false).to_string(), "no");
    assert_eq!(Value::from(3_i64).to_string(), "3");
    assert_eq!(Value::from(2.5).to_string(), "2.5");
    assert_eq!(Value::from("abc").to_string(), "abc");
  }

  #[test]
  fn test_serialize_untagged() {
    let json = serde_json::to_value(vec![Value::from(true), Value::from(1.5), Value::from("x")])
      .unwrap();
    assert_eq!(json, serde_json::json!([true, 1.5, "x"]));
  }
}
