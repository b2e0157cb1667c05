//! Runtime value types for SOPFLOW conditions and expressions
//!
//! The `Value` enum represents all possible runtime values flowing through
//! the decision engine, similar to JSON values. Comparison helpers here
//! implement the coercive-equality rules used by the EQUALS operator.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Runtime value type
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    /// Null value
    Null,
    /// Boolean value
    Bool(bool),
    /// Number value (f64 for simplicity, handles both int and float)
    Number(f64),
    /// String value
    String(String),
    /// Array of values
    Array(Vec<Value>),
    /// Object (key-value map)
    Object(HashMap<String, Value>),
}

impl Value {
    /// Human-readable type name, used in diagnostics
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "bool",
            Value::Number(_) => "number",
            Value::String(_) => "string",
            Value::Array(_) => "array",
            Value::Object(_) => "object",
        }
    }

    /// Numeric coercion: numbers pass through, numeric strings parse,
    /// booleans map to 0/1. Everything else is `None`.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(*n),
            Value::String(s) => s.trim().parse::<f64>().ok(),
            Value::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
            _ => None,
        }
    }

    /// String view without quoting (numbers render without trailing `.0`
    /// when integral)
    pub fn as_display_string(&self) -> String {
        match self {
            Value::Null => "null".to_string(),
            Value::Bool(b) => b.to_string(),
            Value::Number(n) => {
                if n.fract() == 0.0 && n.is_finite() {
                    format!("{}", *n as i64)
                } else {
                    n.to_string()
                }
            }
            Value::String(s) => s.clone(),
            other => serde_json::to_string(other).unwrap_or_default(),
        }
    }

    /// Truthiness used by expression evaluation
    pub fn is_truthy(&self) -> bool {
        match self {
            Value::Bool(b) => *b,
            Value::Null => false,
            Value::Number(n) => *n != 0.0,
            Value::String(s) => !s.is_empty(),
            Value::Array(a) => !a.is_empty(),
            Value::Object(o) => !o.is_empty(),
        }
    }

    /// Emptiness in the SOP sense: null, empty string, empty collection
    pub fn is_empty(&self) -> bool {
        match self {
            Value::Null => true,
            Value::String(s) => s.is_empty(),
            Value::Array(a) => a.is_empty(),
            Value::Object(o) => o.is_empty(),
            _ => false,
        }
    }

    /// Coercive equality used by the EQUALS operator.
    ///
    /// Identical values are equal; a numeric string compared with a number
    /// coerces the string; arrays compare element-wise with the same rule;
    /// objects compare by key set and element-wise values. All other type
    /// mixes are unequal.
    pub fn coercive_eq(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::Null, Value::Null) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Number(a), Value::Number(b)) => a == b,
            (Value::String(a), Value::String(b)) => a == b,
            (Value::Number(n), Value::String(s)) | (Value::String(s), Value::Number(n)) => {
                s.trim().parse::<f64>().map(|p| p == *n).unwrap_or(false)
            }
            (Value::Array(a), Value::Array(b)) => {
                a.len() == b.len() && a.iter().zip(b.iter()).all(|(x, y)| x.coercive_eq(y))
            }
            (Value::Object(a), Value::Object(b)) => {
                a.len() == b.len()
                    && a.iter().all(|(k, v)| {
                        b.get(k).map(|other| v.coercive_eq(other)).unwrap_or(false)
                    })
            }
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_coercive_eq_identical() {
        assert!(Value::Number(42.0).coercive_eq(&Value::Number(42.0)));
        assert!(Value::String("x".to_string()).coercive_eq(&Value::String("x".to_string())));
        assert!(Value::Null.coercive_eq(&Value::Null));
    }

    #[test]
    fn test_coercive_eq_numeric_string() {
        assert!(Value::Number(1500.0).coercive_eq(&Value::String("1500".to_string())));
        assert!(Value::String("3.5".to_string()).coercive_eq(&Value::Number(3.5)));
        assert!(!Value::String("abc".to_string()).coercive_eq(&Value::Number(1.0)));
    }

    #[test]
    fn test_coercive_eq_arrays() {
        let a = Value::Array(vec![Value::Number(1.0), Value::String("2".to_string())]);
        let b = Value::Array(vec![Value::Number(1.0), Value::Number(2.0)]);
        assert!(a.coercive_eq(&b));

        let c = Value::Array(vec![Value::Number(1.0)]);
        assert!(!a.coercive_eq(&c));
    }

    #[test]
    fn test_coercive_eq_objects() {
        let mut m1 = HashMap::new();
        m1.insert("amount".to_string(), Value::String("100".to_string()));
        let mut m2 = HashMap::new();
        m2.insert("amount".to_string(), Value::Number(100.0));

        assert!(Value::Object(m1.clone()).coercive_eq(&Value::Object(m2.clone())));

        m2.insert("extra".to_string(), Value::Null);
        assert!(!Value::Object(m1).coercive_eq(&Value::Object(m2)));
    }

    #[test]
    fn test_coercive_eq_type_mismatch() {
        assert!(!Value::Bool(true).coercive_eq(&Value::Number(1.0)));
        assert!(!Value::Null.coercive_eq(&Value::String(String::new())));
    }

    #[test]
    fn test_as_number() {
        assert_eq!(Value::Number(2.5).as_number(), Some(2.5));
        assert_eq!(Value::String(" 10 ".to_string()).as_number(), Some(10.0));
        assert_eq!(Value::Bool(true).as_number(), Some(1.0));
        assert_eq!(Value::Array(vec![]).as_number(), None);
    }

    #[test]
    fn test_is_truthy() {
        assert!(Value::Bool(true).is_truthy());
        assert!(!Value::Null.is_truthy());
        assert!(!Value::Number(0.0).is_truthy());
        assert!(Value::String("x".to_string()).is_truthy());
        assert!(!Value::Array(vec![]).is_truthy());
    }

    #[test]
    fn test_is_empty() {
        assert!(Value::Null.is_empty());
        assert!(Value::String(String::new()).is_empty());
        assert!(!Value::Number(0.0).is_empty());
        assert!(Value::Object(HashMap::new()).is_empty());
    }

    #[test]
    fn test_value_serde_json() {
        let val = Value::Object({
            let mut map = HashMap::new();
            map.insert("count".to_string(), Value::Number(42.0));
            map.insert("active".to_string(), Value::Bool(true));
            map
        });

        let json = serde_json::to_string(&val).unwrap();
        let deserialized: Value = serde_json::from_str(&json).unwrap();
        assert_eq!(val, deserialized);
    }
}
