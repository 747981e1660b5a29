//! The table-definition DSL:
//!
//! ```text
//! create warehouse::database::schema::table(id [int] [primarykey], name [string])
//! ```

use super::path::TablePath;
use crate::error::{Error, Result};
use crate::storage::{Column, DataType};

pub const CREATE_PREFIX: &str = "create ";

#[derive(Debug, Clone, PartialEq)]
pub struct CreateTable {
    pub path: TablePath,
    pub columns: Vec<Column>,
}

/// Parses a full `create <path>(<column-defs>)` declaration.
pub fn parse_create(src: &str) -> Result<CreateTable> {
    let src = src.trim();
    let rest = src
        .strip_prefix(CREATE_PREFIX)
        .ok_or_else(|| Error::MalformedSchema("Payload must start with 'create '".into()))?
        .trim();
    let (first, last) = match (rest.find('('), rest.rfind(')')) {
        (Some(first), Some(last)) if last > first => (first, last),
        _ => {
            return Err(Error::MalformedSchema(
                "Missing or malformed schema declaration".into(),
            ));
        }
    };
    let path = rest[..first].parse::<TablePath>()?;
    let columns = parse_columns(&rest[first + 1..last])?;
    Ok(CreateTable { path, columns })
}

/// Parses the comma-separated column definitions between the parentheses.
pub fn parse_columns(src: &str) -> Result<Vec<Column>> {
    let mut columns: Vec<Column> = Vec::new();
    for def in src.split(',') {
        let column = parse_column(def.trim())?;
        if columns.iter().any(|c| c.name == column.name) {
            return Err(Error::MalformedSchema(format!(
                "Duplicate column: {}",
                column.name
            )));
        }
        columns.push(column);
    }
    Ok(columns)
}

fn parse_column(def: &str) -> Result<Column> {
    let tokens: Vec<&str> = def.split_whitespace().collect();
    if tokens.len() < 2 {
        return Err(Error::MalformedSchema(format!(
            "Invalid column definition: {def}"
        )));
    }
    let name = tokens[0];
    let mut type_name: Option<String> = None;
    let mut is_primary_key = false;
    for token in &tokens[1..] {
        let Some(content) = token
            .strip_prefix('[')
            .and_then(|t| t.strip_suffix(']'))
        else {
            continue;
        };
        let content = content.to_lowercase();
        if content == "primarykey" || content == "primary_key" {
            is_primary_key = true;
        } else if let Some(previous) = &type_name {
            return Err(Error::MalformedSchema(format!(
                "Multiple types for column: {name} ([{previous}] and [{content}])"
            )));
        } else {
            type_name = Some(content);
        }
    }
    let data_type = type_name
        .as_deref()
        .and_then(DataType::from_name)
        .ok_or_else(|| {
            Error::MalformedSchema(format!("Missing or invalid type for column: {name}"))
        })?;
    Ok(Column::new(name, data_type, is_primary_key))
}
