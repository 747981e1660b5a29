pub mod store;
pub mod validator;

pub use store::TableStore;
pub use validator::PrimaryKeyMode;

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt::{self, Display};

/// One stored record, keyed by column name.
pub type Row = BTreeMap<String, DataValue>;

#[derive(PartialEq, Eq, Hash, Clone, Debug, Copy, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DataType {
    Int,
    Float,
    #[serde(rename = "boolean")]
    Bool,
    String,
}

#[derive(PartialEq, Clone, Debug, Serialize)]
#[serde(untagged)]
pub enum DataValue {
    Int(i64),
    Float(f64),
    Bool(bool),
    String(String),
    Null,
}

impl DataType {
    pub fn as_str(self) -> &'static str {
        match self {
            DataType::Int => "int",
            DataType::Float => "float",
            DataType::Bool => "boolean",
            DataType::String => "string",
        }
    }

    /// Resolves a case-insensitive type name, accepting `integer` and `double` as aliases.
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_lowercase().as_str() {
            "int" | "integer" => Some(DataType::Int),
            "float" | "double" => Some(DataType::Float),
            "string" => Some(DataType::String),
            "boolean" => Some(DataType::Bool),
            _ => None,
        }
    }
}

impl Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl DataValue {
    /// Converts a JSON scalar. Arrays and objects have no row representation.
    pub fn from_json(column: &str, value: &serde_json::Value) -> Result<Self> {
        use serde_json::Value;
        Ok(match value {
            Value::Null => DataValue::Null,
            Value::Bool(b) => DataValue::Bool(*b),
            Value::String(s) => DataValue::String(s.clone()),
            Value::Number(n) => match n.as_i64() {
                Some(i) => DataValue::Int(i),
                None => DataValue::Float(n.as_f64().unwrap_or(f64::NAN)),
            },
            Value::Array(_) | Value::Object(_) => {
                return Err(Error::UnsupportedValue(column.to_string()));
            }
        })
    }

    pub fn kind(&self) -> &'static str {
        match self {
            DataValue::Int(_) => "int",
            DataValue::Float(_) => "float",
            DataValue::Bool(_) => "boolean",
            DataValue::String(_) => "string",
            DataValue::Null => "null",
        }
    }

    /// Returns the value normalised to `data_type`, or `None` when the declared type
    /// does not accept it. Integral floats satisfy `int`, every number satisfies `float`.
    pub fn coerce(&self, data_type: DataType) -> Option<DataValue> {
        match (data_type, self) {
            (DataType::Int, DataValue::Int(i)) => Some(DataValue::Int(*i)),
            (DataType::Int, DataValue::Float(f))
                if f.is_finite()
                    && f.fract() == 0.0
                    && *f >= i64::MIN as f64
                    && *f < i64::MAX as f64 =>
            {
                Some(DataValue::Int(*f as i64))
            }
            (DataType::Float, DataValue::Int(i)) => Some(DataValue::Float(*i as f64)),
            (DataType::Float, DataValue::Float(f)) => Some(DataValue::Float(*f)),
            (DataType::String, DataValue::String(s)) => Some(DataValue::String(s.clone())),
            (DataType::Bool, DataValue::Bool(b)) => Some(DataValue::Bool(*b)),
            _ => None,
        }
    }
}

impl Display for DataValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DataValue::Int(i) => write!(f, "{i}"),
            DataValue::Float(x) => write!(f, "{x:?}"),
            DataValue::Bool(b) => write!(f, "{b}"),
            DataValue::String(s) => write!(f, "{s}"),
            DataValue::Null => f.write_str("null"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Column {
    pub name: String,
    #[serde(rename = "type")]
    pub data_type: DataType,
    #[serde(rename = "primaryKey")]
    pub is_primary_key: bool,
}

impl Column {
    pub fn new(name: impl Into<String>, data_type: DataType, is_primary_key: bool) -> Self {
        Self {
            name: name.into(),
            data_type,
            is_primary_key,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct TableMetadata {
    pub schema: Vec<Column>,
    pub rows: Vec<Row>,
}

impl TableMetadata {
    pub fn new(schema: Vec<Column>) -> Self {
        Self {
            schema,
            rows: Vec::new(),
        }
    }
}

/// Decodes a JSON object into a row without checking it against any schema.
pub fn row_from_json(object: &serde_json::Map<String, serde_json::Value>) -> Result<Row> {
    object
        .iter()
        .map(|(name, value)| Ok((name.clone(), DataValue::from_json(name, value)?)))
        .collect()
}
