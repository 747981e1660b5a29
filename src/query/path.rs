use crate::error::{Error, Result};
use std::fmt::{self, Display};
use std::str::FromStr;

pub const SEPARATOR: &str = "::";

const TABLE_FORMAT: &str = "warehouse::database::schema::table";
const ROW_FORMAT: &str = "warehouse::database::schema::table::index";

/// Four-segment address of one table.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TablePath {
    pub warehouse: String,
    pub database: String,
    pub schema: String,
    pub table: String,
}

/// A table path plus the ordinal position of one row in it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowAddress {
    pub path: TablePath,
    pub index: usize,
}

fn segments<'a>(src: &'a str, expected: usize, format: &'static str) -> Result<Vec<&'a str>> {
    let parts: Vec<&str> = src.trim().split(SEPARATOR).collect();
    if parts.len() != expected || parts.iter().any(|p| p.is_empty()) {
        return Err(Error::MalformedPath {
            path: src.trim().to_string(),
            expected: format,
        });
    }
    Ok(parts)
}

impl TablePath {
    pub fn new(
        warehouse: impl Into<String>,
        database: impl Into<String>,
        schema: impl Into<String>,
        table: impl Into<String>,
    ) -> Self {
        Self {
            warehouse: warehouse.into(),
            database: database.into(),
            schema: schema.into(),
            table: table.into(),
        }
    }

    fn from_segments(parts: &[&str]) -> Self {
        Self::new(parts[0], parts[1], parts[2], parts[3])
    }
}

impl FromStr for TablePath {
    type Err = Error;

    fn from_str(src: &str) -> Result<Self> {
        let parts = segments(src, 4, TABLE_FORMAT)?;
        Ok(Self::from_segments(&parts))
    }
}

impl Display for TablePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}{SEPARATOR}{}{SEPARATOR}{}{SEPARATOR}{}",
            self.warehouse, self.database, self.schema, self.table
        )
    }
}

impl FromStr for RowAddress {
    type Err = Error;

    fn from_str(src: &str) -> Result<Self> {
        let parts = segments(src, 5, ROW_FORMAT)?;
        let index = parts[4]
            .parse::<usize>()
            .map_err(|_| Error::InvalidIndex(parts[4].to_string()))?;
        Ok(Self {
            path: TablePath::from_segments(&parts),
            index,
        })
    }
}
