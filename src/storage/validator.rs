//! Row validation against a table schema.
//!
//! Presence and type checks run over every declared column before any primary-key
//! scan, so a rejected row never leaves partial work behind.

use super::{Column, Row};
use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};

/// How rows are compared when more than one column is flagged as primary key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PrimaryKeyMode {
    /// Every flagged column must be unique on its own.
    #[default]
    PerColumn,
    /// The tuple of all flagged columns must be unique.
    Composite,
}

/// Checks `row` against `schema` and the rows already stored, returning the row with
/// declared columns normalised to their declared types.
pub fn validate(
    schema: &[Column],
    existing: &[Row],
    mut row: Row,
    mode: PrimaryKeyMode,
) -> Result<Row> {
    for column in schema {
        let value = row
            .get(&column.name)
            .ok_or_else(|| Error::MissingColumn(column.name.clone()))?;
        let coerced = value
            .coerce(column.data_type)
            .ok_or_else(|| Error::TypeMismatch {
                column: column.name.clone(),
                expected: column.data_type,
                actual: value.clone(),
            })?;
        row.insert(column.name.clone(), coerced);
    }

    let keys: Vec<&Column> = schema.iter().filter(|c| c.is_primary_key).collect();
    match mode {
        PrimaryKeyMode::PerColumn => {
            for column in keys {
                let value = &row[&column.name];
                if existing.iter().any(|r| r.get(&column.name) == Some(value)) {
                    return Err(Error::DuplicatePrimaryKey {
                        column: column.name.clone(),
                        value: value.clone(),
                    });
                }
            }
        }
        PrimaryKeyMode::Composite if !keys.is_empty() => {
            let same_key = |other: &Row| {
                keys.iter().all(|c| other.get(&c.name) == row.get(&c.name))
            };
            if existing.iter().any(same_key) {
                let names: Vec<&str> = keys.iter().map(|c| c.name.as_str()).collect();
                let values: Vec<String> = keys.iter().map(|c| row[&c.name].to_string()).collect();
                return Err(Error::DuplicateCompositeKey {
                    columns: names.join(", "),
                    values: values.join(", "),
                });
            }
        }
        PrimaryKeyMode::Composite => {}
    }
    Ok(row)
}
