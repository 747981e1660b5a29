use crate::query::TablePath;
use crate::storage::{DataType, DataValue};

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("{0}")]
    MalformedSchema(String),
    #[error("Invalid path format '{path}'. Expected: {expected}")]
    MalformedPath { path: String, expected: &'static str },
    #[error("Invalid row index: '{0}'")]
    InvalidIndex(String),
    #[error("Table not found: {0}")]
    TableNotFound(TablePath),
    #[error("Missing required column: {0}")]
    MissingColumn(String),
    #[error("Type mismatch for column: {column}. Expected: {expected}, Got: {}", .actual.kind())]
    TypeMismatch {
        column: String,
        expected: DataType,
        actual: DataValue,
    },
    #[error("Duplicate primary key value for column: {column} = {value}")]
    DuplicatePrimaryKey { column: String, value: DataValue },
    #[error("Duplicate primary key value for columns: ({columns}) = ({values})")]
    DuplicateCompositeKey { columns: String, values: String },
    #[error("Row index out of range: {index} (table has {len} rows)")]
    IndexOutOfRange { index: usize, len: usize },
    #[error("Invalid macro format. Use: macro name = value;")]
    InvalidMacroSyntax(String),
    #[error("Unsupported value for column: {0}. Expected a string, number or boolean")]
    UnsupportedValue(String),
    #[error("{0}")]
    InvalidRequest(String),
    #[error("No query engine attached; cannot run '{0}'")]
    EngineUnavailable(String),
}

impl Error {
    /// HTTP-style status code used when the error is rendered as a response.
    pub fn status(&self) -> u16 {
        match self {
            Error::EngineUnavailable(_) => 501,
            _ => 400,
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_messages_name_the_offender() {
        let path: TablePath = "w::d::s::t".parse().unwrap();
        assert_eq!(
            Error::TableNotFound(path).to_string(),
            "Table not found: w::d::s::t"
        );
        let dup = Error::DuplicatePrimaryKey {
            column: "id".into(),
            value: DataValue::Int(7),
        };
        assert_eq!(
            dup.to_string(),
            "Duplicate primary key value for column: id = 7"
        );
        let mismatch = Error::TypeMismatch {
            column: "id".into(),
            expected: DataType::Int,
            actual: DataValue::Float(1.5),
        };
        assert_eq!(
            mismatch.to_string(),
            "Type mismatch for column: id. Expected: int, Got: float"
        );
    }

    #[test]
    fn test_status() {
        assert_eq!(Error::MissingColumn("a".into()).status(), 400);
        assert_eq!(Error::EngineUnavailable("db x".into()).status(), 501);
    }
}
