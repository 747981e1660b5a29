//! Classification of interpreter lines.
//!
//! A raw line is first matched against the macro and engine commands, in priority
//! order. Anything left over is macro-expanded and then matched against the table
//! store statements; whatever still matches nothing is an engine query.

use super::path::{RowAddress, TablePath};
use super::schema::{self, CreateTable};
use crate::error::{Error, Result};
use crate::storage::{Row, row_from_json};

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    DefineMacro(String),
    ShowMacros,
    ClearMacros,
    Load {
        source: String,
        connection: String,
        table: Option<String>,
    },
    Db {
        connection: String,
    },
    DropAllTables {
        connection: String,
    },
    GetTables {
        connection: String,
    },
    GetAttributes {
        connection: String,
        table: String,
    },
    GetAll,
    Complete {
        partial: String,
    },
    /// Needs macro expansion before it can be classified further.
    Expand(String),
}

#[derive(Debug, Clone, PartialEq)]
pub enum Stmt {
    Create(CreateTable),
    Insert { path: TablePath, row: Row },
    Delete(RowAddress),
    Fetch(TablePath),
    Describe(TablePath),
    ShowTables,
    Query(String),
}

fn exactly_two<'a>(line: &'a str, usage: &str) -> Result<&'a str> {
    match line.trim_end().split(' ').collect::<Vec<_>>().as_slice() {
        [_, arg] => Ok(*arg),
        _ => Err(Error::InvalidRequest(usage.to_string())),
    }
}

impl Command {
    pub fn parse(line: &str) -> Result<Self> {
        let trimmed = line.trim();
        if trimmed.starts_with("macro ") {
            return Ok(Command::DefineMacro(trimmed.to_string()));
        }
        if trimmed.starts_with("show_macros") {
            return Ok(Command::ShowMacros);
        }
        if trimmed.starts_with("clear_macros") {
            return Ok(Command::ClearMacros);
        }

        if line.starts_with("load ") {
            let tokens: Vec<&str> = line.trim_end().split(' ').collect();
            if !(3..=4).contains(&tokens.len()) {
                return Err(Error::InvalidRequest(
                    "load should be used as 'load <source> <connection> [<table>]'".into(),
                ));
            }
            return Ok(Command::Load {
                source: tokens[1].to_string(),
                connection: tokens[2].to_string(),
                table: tokens.get(3).map(|t| t.to_string()),
            });
        }
        if line.starts_with("db") {
            let connection = exactly_two(line, "db should be used as 'db <connection>'")?;
            return Ok(Command::Db {
                connection: connection.to_string(),
            });
        }
        if line.starts_with("drop_all_tables ") {
            let connection = exactly_two(
                line,
                "drop_all_tables should be used as 'drop_all_tables <connection>'",
            )?;
            return Ok(Command::DropAllTables {
                connection: connection.to_string(),
            });
        }
        if line.starts_with("get_tables") {
            let connection = exactly_two(line, "Usage: get_tables <connection>")?;
            return Ok(Command::GetTables {
                connection: connection.to_string(),
            });
        }
        if let Some(reference) = line.strip_prefix("get_attributes") {
            let (connection, table) = reference.trim().rsplit_once('.').ok_or_else(|| {
                Error::InvalidRequest("Usage: get_attributes <connectionName>.<tableName>".into())
            })?;
            return Ok(Command::GetAttributes {
                connection: connection.to_string(),
                table: table.to_string(),
            });
        }
        if line.starts_with("get_all") {
            return Ok(Command::GetAll);
        }
        if line.starts_with("complete") {
            let partial = trimmed.split_whitespace().nth(1).unwrap_or_default();
            return Ok(Command::Complete {
                partial: partial.to_string(),
            });
        }
        Ok(Command::Expand(line.to_string()))
    }
}

impl Stmt {
    /// Classifies a line that has already been macro-expanded.
    pub fn parse(line: &str) -> Result<Self> {
        let trimmed = line.trim();
        if trimmed.starts_with(schema::CREATE_PREFIX) {
            return Ok(Stmt::Create(schema::parse_create(trimmed)?));
        }
        if let Some(rest) = trimmed.strip_prefix("insert ") {
            let (path, body) = rest.trim().split_once(char::is_whitespace).ok_or_else(|| {
                Error::InvalidRequest("insert should be used as 'insert <path> <json-row>'".into())
            })?;
            let object: serde_json::Map<String, serde_json::Value> =
                serde_json::from_str(body.trim())
                    .map_err(|e| Error::InvalidRequest(format!("Invalid row: {e}")))?;
            return Ok(Stmt::Insert {
                path: path.parse()?,
                row: row_from_json(&object)?,
            });
        }
        if let Some(rest) = trimmed.strip_prefix("delete ") {
            return Ok(Stmt::Delete(rest.parse()?));
        }
        if let Some(rest) = trimmed.strip_prefix("fetch ") {
            return Ok(Stmt::Fetch(rest.parse()?));
        }
        if let Some(rest) = trimmed.strip_prefix("describe ") {
            return Ok(Stmt::Describe(rest.parse()?));
        }
        if trimmed == "show_tables" {
            return Ok(Stmt::ShowTables);
        }
        Ok(Stmt::Query(line.to_string()))
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::storage::DataValue;

    #[test]
    fn test_macro_commands() {
        assert_eq!(
            Command::parse("  macro x = 1").unwrap(),
            Command::DefineMacro("macro x = 1".into())
        );
        assert_eq!(Command::parse("show_macros").unwrap(), Command::ShowMacros);
        assert_eq!(Command::parse(" clear_macros ").unwrap(), Command::ClearMacros);
    }

    #[test]
    fn test_macro_reference_is_not_a_definition() {
        assert_eq!(
            Command::parse("macro{t}->limit(1)").unwrap(),
            Command::Expand("macro{t}->limit(1)".into())
        );
    }

    #[test]
    fn test_engine_commands() {
        assert_eq!(
            Command::parse("load /tmp/a.csv local").unwrap(),
            Command::Load {
                source: "/tmp/a.csv".into(),
                connection: "local".into(),
                table: None,
            }
        );
        assert_eq!(
            Command::parse("db local").unwrap(),
            Command::Db {
                connection: "local".into()
            }
        );
        assert_eq!(
            Command::parse("get_attributes my.conn.people").unwrap(),
            Command::GetAttributes {
                connection: "my.conn".into(),
                table: "people".into(),
            }
        );
        assert_eq!(Command::parse("get_all").unwrap(), Command::GetAll);
        assert_eq!(
            Command::parse("complete #>{").unwrap(),
            Command::Complete {
                partial: "#>{".into()
            }
        );
        assert_eq!(
            Command::parse("complete").unwrap(),
            Command::Complete {
                partial: String::new()
            }
        );
    }

    #[test]
    fn test_trailing_whitespace_is_ignored() {
        assert_eq!(
            Command::parse("get_tables local ").unwrap(),
            Command::GetTables {
                connection: "local".into()
            }
        );
        assert_eq!(
            Command::parse("drop_all_tables local  ").unwrap(),
            Command::DropAllTables {
                connection: "local".into()
            }
        );
        assert_eq!(
            Command::parse("load /tmp/a.csv local people ").unwrap(),
            Command::Load {
                source: "/tmp/a.csv".into(),
                connection: "local".into(),
                table: Some("people".into()),
            }
        );
        assert!(matches!(
            Command::parse("get_tables "),
            Err(Error::InvalidRequest(_))
        ));
    }

    #[test]
    fn test_engine_usage_errors() {
        for bad in [
            "load a",
            "load a b c d",
            "db",
            "db a b",
            "drop_all_tables a b",
            "get_tables",
            "get_attributes people",
        ] {
            assert!(
                matches!(Command::parse(bad), Err(Error::InvalidRequest(_))),
                "accepted {bad:?}"
            );
        }
    }

    #[test]
    fn test_prefix_priority() {
        // `macro ` wins even when the rest would look like another command
        assert!(matches!(
            Command::parse("macro get_all = 1").unwrap(),
            Command::DefineMacro(_)
        ));
        // engine prefixes are whitespace-sensitive
        assert_eq!(
            Command::parse(" get_all").unwrap(),
            Command::Expand(" get_all".into())
        );
    }

    #[test]
    fn test_store_statements() {
        assert!(matches!(
            Stmt::parse("create w::d::s::t(id [int])").unwrap(),
            Stmt::Create(_)
        ));
        assert_eq!(
            Stmt::parse("fetch w::d::s::t").unwrap(),
            Stmt::Fetch(TablePath::new("w", "d", "s", "t"))
        );
        assert_eq!(
            Stmt::parse("delete w::d::s::t::4").unwrap(),
            Stmt::Delete(RowAddress {
                path: TablePath::new("w", "d", "s", "t"),
                index: 4,
            })
        );
        assert_eq!(
            Stmt::parse("describe w::d::s::t").unwrap(),
            Stmt::Describe(TablePath::new("w", "d", "s", "t"))
        );
        assert_eq!(Stmt::parse("show_tables").unwrap(), Stmt::ShowTables);

        let Stmt::Insert { path, row } =
            Stmt::parse(r#"insert w::d::s::t {"id": 1, "name": "a b"}"#).unwrap()
        else {
            panic!("expected insert");
        };
        assert_eq!(path, TablePath::new("w", "d", "s", "t"));
        assert_eq!(row["id"], DataValue::Int(1));
        assert_eq!(row["name"], DataValue::String("a b".into()));
    }

    #[test]
    fn test_store_statement_errors() {
        assert!(matches!(
            Stmt::parse("insert w::d::s::t"),
            Err(Error::InvalidRequest(_))
        ));
        assert!(matches!(
            Stmt::parse("insert w::d::s::t [1]"),
            Err(Error::InvalidRequest(_))
        ));
        assert!(matches!(
            Stmt::parse("fetch w::d"),
            Err(Error::MalformedPath { .. })
        ));
    }

    #[test]
    fn test_query_fallback() {
        assert_eq!(
            Stmt::parse("#>{w::d::s::t}#->select(~id)").unwrap(),
            Stmt::Query("#>{w::d::s::t}#->select(~id)".into())
        );
    }
}
