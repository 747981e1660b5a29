//! Boundary to the external query engine.
//!
//! Everything routed here (plan execution, loading into connections, connection
//! introspection, autocomplete) lives outside this program. The executor only
//! checks the command's argument shape and hands it over.

use crate::error::{Error, Result};

pub trait Engine: Send + Sync {
    /// `load <source> <connection> [<table>]`
    fn load(&self, source: &str, connection: &str, table: Option<&str>) -> Result<String>;

    /// `db <connection>`: the connection's database rendered as text.
    fn describe_database(&self, connection: &str) -> Result<String>;

    /// `drop_all_tables <connection>`: returns the names of dropped tables.
    fn drop_all_tables(&self, connection: &str) -> Result<Vec<String>>;

    fn tables(&self, connection: &str) -> Result<Vec<String>>;

    /// Column names of `table` as known to `connection`.
    fn attributes(&self, connection: &str, table: &str) -> Result<Vec<String>>;

    fn connections(&self) -> Result<Vec<String>>;

    fn complete(&self, partial: &str) -> Result<Vec<String>>;

    /// Runs a macro-expanded line that matched no other command.
    fn execute(&self, line: &str) -> Result<serde_json::Value>;
}

/// Used when no engine is attached; every call fails with `EngineUnavailable`.
#[derive(Debug, Default, Clone, Copy)]
pub struct DetachedEngine;

impl Engine for DetachedEngine {
    fn load(&self, source: &str, connection: &str, _table: Option<&str>) -> Result<String> {
        Err(Error::EngineUnavailable(format!("load {source} {connection}")))
    }

    fn describe_database(&self, connection: &str) -> Result<String> {
        Err(Error::EngineUnavailable(format!("db {connection}")))
    }

    fn drop_all_tables(&self, connection: &str) -> Result<Vec<String>> {
        Err(Error::EngineUnavailable(format!(
            "drop_all_tables {connection}"
        )))
    }

    fn tables(&self, connection: &str) -> Result<Vec<String>> {
        Err(Error::EngineUnavailable(format!("get_tables {connection}")))
    }

    fn attributes(&self, connection: &str, table: &str) -> Result<Vec<String>> {
        Err(Error::EngineUnavailable(format!(
            "get_attributes {connection}.{table}"
        )))
    }

    fn connections(&self) -> Result<Vec<String>> {
        Err(Error::EngineUnavailable("get_all".into()))
    }

    fn complete(&self, partial: &str) -> Result<Vec<String>> {
        Err(Error::EngineUnavailable(format!("complete {partial}")))
    }

    fn execute(&self, line: &str) -> Result<serde_json::Value> {
        Err(Error::EngineUnavailable(line.to_string()))
    }
}
