use serde::Serialize;

use crate::common::types::DataType;

pub type Schema = Vec<Column>;

#[derive(Debug, PartialEq, Eq, Hash, Clone, Serialize)]
pub struct Column {
    pub name: String,
    pub ty: DataType,
}

impl Column {
    pub fn new(name: impl Into<String>, ty: DataType) -> Self {
        Self {
            name: name.into().to_lowercase(),
            ty,
        }
    }
}
