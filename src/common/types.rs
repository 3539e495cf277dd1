use std::fmt;

use serde::Serialize;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub enum DataType {
    Int64,
    Float64,
    String,
}

impl DataType {
    /// The narrowest type able to hold values of both `self` and `other`.
    pub fn widen(self, other: DataType) -> DataType {
        match (self, other) {
            (a, b) if a == b => a,
            (DataType::String, _) | (_, DataType::String) => DataType::String,
            _ => DataType::Float64,
        }
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DataType::Int64 => write!(f, "INT"),
            DataType::Float64 => write!(f, "FLOAT"),
            DataType::String => write!(f, "TEXT"),
        }
    }
}
