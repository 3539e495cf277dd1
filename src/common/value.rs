use std::fmt;

use serde::Serialize;

use crate::common::types::DataType;

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Value {
    Int64(i64),
    Float64(f64),
    String(String),
    Null,
}

impl Value {
    pub fn data_type(&self) -> Option<DataType> {
        match self {
            Value::Int64(_) => Some(DataType::Int64),
            Value::Float64(_) => Some(DataType::Float64),
            Value::String(_) => Some(DataType::String),
            Value::Null => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Numeric view of the value. Strings are accepted when they parse as a number.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Int64(v) => Some(*v as f64),
            Value::Float64(v) => Some(*v),
            Value::String(s) => s.trim().parse().ok(),
            Value::Null => None,
        }
    }

    pub fn as_text(&self) -> Option<String> {
        match self {
            Value::Null => None,
            Value::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        }
    }

    /// Infers a value from a raw text cell: integer, then float, then string.
    pub fn infer(raw: &str) -> Value {
        let raw = raw.trim();
        if raw.is_empty() {
            return Value::Null;
        }
        if let Ok(v) = raw.parse::<i64>() {
            return Value::Int64(v);
        }
        if raw.chars().any(|c| c.is_ascii_digit()) {
            if let Ok(v) = raw.parse::<f64>() {
                return Value::Float64(v);
            }
        }
        Value::String(raw.to_string())
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Int64(v) => write!(f, "{v}"),
            Value::Float64(v) => write!(f, "{v}"),
            Value::String(v) => write!(f, "{v}"),
            Value::Null => write!(f, "NULL"),
        }
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int64(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float64(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::String(v.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn value_datatype_mapping() {
        assert_eq!(Value::Int64(10).data_type(), Some(DataType::Int64));
        assert_eq!(Value::from("x").data_type(), Some(DataType::String));
        assert_eq!(Value::Null.data_type(), None);
    }

    #[test]
    fn null_detection() {
        assert!(Value::Null.is_null());
        assert!(!Value::Int64(1).is_null());
    }

    #[test]
    fn numeric_strings_coerce() {
        assert_eq!(Value::from("30").as_f64(), Some(30.0));
        assert_eq!(Value::from("thirty").as_f64(), None);
        assert_eq!(Value::Null.as_f64(), None);
    }

    #[test]
    fn infers_cell_types() {
        assert_eq!(Value::infer("42"), Value::Int64(42));
        assert_eq!(Value::infer("4.5"), Value::Float64(4.5));
        assert_eq!(Value::infer(" Bob "), Value::from("Bob"));
        assert_eq!(Value::infer(""), Value::Null);
    }

    #[test]
    fn serializes_untagged() {
        let json = serde_json::to_string(&vec![
            Value::Int64(1),
            Value::from("A"),
            Value::Null,
        ])
        .unwrap();
        assert_eq!(json, r#"[1,"A",null]"#);
    }
}
