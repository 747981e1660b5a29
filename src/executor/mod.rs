/*
Command interpreter.

Every line is classified by its leading text, first match wins:

    macro <name> = <value>      define (or redefine) a macro
    show_macros                 list macros
    clear_macros                forget every macro
    load / db / drop_all_tables / get_tables / get_attributes / get_all / complete
                                handed to the attached query engine

Anything else has its `macro{name}` references expanded once, then:

    create w::d::s::t(id [int] [primarykey], name [string])
    insert w::d::s::t {"id": 1, "name": "a"}
    delete w::d::s::t::0
    fetch  w::d::s::t
    describe w::d::s::t
    show_tables

and whatever is still unrecognised runs on the query engine.
*/

use crate::engine::{DetachedEngine, Engine};
use crate::error::{Error, Result};
use crate::macros::MacroTable;
use crate::query::{Command, CreateTable, RowAddress, Stmt, TablePath, parse_create};
use crate::storage::{PrimaryKeyMode, Row, TableStore, row_from_json};
use serde_json::{Value, json};
use std::fmt::{self, Display};
use tracing::debug;

#[derive(Debug, Clone, PartialEq)]
pub enum QueryResult {
    Text(String),
    Json(Value),
}

impl Display for QueryResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QueryResult::Text(text) => f.write_str(text),
            QueryResult::Json(value) => match serde_json::to_string_pretty(value) {
                Ok(pretty) => f.write_str(&pretty),
                Err(_) => write!(f, "{value}"),
            },
        }
    }
}

pub struct Executor {
    store: TableStore,
    macros: MacroTable,
    engine: Box<dyn Engine>,
}

impl Executor {
    pub fn new(key_mode: PrimaryKeyMode) -> Self {
        Self::with_engine(key_mode, Box::new(DetachedEngine))
    }

    pub fn with_engine(key_mode: PrimaryKeyMode, engine: Box<dyn Engine>) -> Self {
        Self {
            store: TableStore::new(key_mode),
            macros: MacroTable::new(),
            engine,
        }
    }

    pub fn run(&self, line: &str) -> Result<QueryResult> {
        let command = Command::parse(line)?;
        debug!(?command, "dispatching");
        Ok(match command {
            Command::DefineMacro(definition) => {
                let name = self.macros.define_from_line(&definition)?;
                QueryResult::Text(format!("Macro '{name}' defined."))
            }
            Command::ShowMacros => QueryResult::Text(self.macros.render()),
            Command::ClearMacros => {
                self.macros.clear();
                QueryResult::Text("All macros cleared.".into())
            }
            Command::Load {
                source,
                connection,
                table,
            } => QueryResult::Text(self.engine.load(&source, &connection, table.as_deref())?),
            Command::Db { connection } => {
                QueryResult::Text(self.engine.describe_database(&connection)?)
            }
            Command::DropAllTables { connection } => {
                let dropped = self.engine.drop_all_tables(&connection)?;
                QueryResult::Text(format!("Dropped tables: {}", dropped.join(", ")))
            }
            Command::GetTables { connection } => {
                QueryResult::Json(json!({ "tables": self.engine.tables(&connection)? }))
            }
            Command::GetAttributes { connection, table } => QueryResult::Json(
                json!({ "attributes": self.engine.attributes(&connection, &table)? }),
            ),
            Command::GetAll => {
                QueryResult::Json(json!({ "connections": self.engine.connections()? }))
            }
            Command::Complete { partial } => {
                let mut completions = self.engine.complete(&partial)?;
                let mut seen = std::collections::HashSet::new();
                completions.retain(|c| seen.insert(c.clone()));
                QueryResult::Json(json!({ "completions": completions }))
            }
            Command::Expand(line) => {
                let expanded = self.macros.expand(&line);
                self.run_stmt(Stmt::parse(&expanded)?)?
            }
        })
    }

    fn run_stmt(&self, stmt: Stmt) -> Result<QueryResult> {
        Ok(match stmt {
            Stmt::Create(create) => QueryResult::Json(self.apply_create(create)),
            Stmt::Insert { path, row } => QueryResult::Json(self.apply_insert(&path, row)?),
            Stmt::Delete(addr) => QueryResult::Json(self.apply_delete(&addr)?),
            Stmt::Fetch(path) => QueryResult::Json(json!(self.store.fetch_rows(&path)?)),
            Stmt::Describe(path) => {
                let meta = self.store.lookup(&path)?;
                QueryResult::Json(json!({
                    "path": path.to_string(),
                    "columns": meta.schema,
                    "rowCount": meta.rows.len(),
                }))
            }
            Stmt::ShowTables => QueryResult::Json(self.show_tables()),
            Stmt::Query(query) => {
                debug!(%query, "routing to query engine");
                QueryResult::Json(self.engine.execute(&query)?)
            }
        })
    }

    fn apply_create(&self, create: CreateTable) -> Value {
        let CreateTable { path, columns } = create;
        let payload = json!({
            "message": "Table initialized with schema",
            "warehouse": path.warehouse,
            "database": path.database,
            "schema": path.schema,
            "table": path.table,
            "columns": columns,
        });
        self.store.create_table(&path, columns);
        payload
    }

    fn apply_insert(&self, path: &TablePath, row: Row) -> Result<Value> {
        let row = self.store.insert_row(path, row)?;
        Ok(json!({ "message": "Row added", "row": row }))
    }

    fn apply_delete(&self, addr: &RowAddress) -> Result<Value> {
        let row = self.store.delete_row_at(addr)?;
        Ok(json!({ "message": "Row deleted successfully", "deletedRow": row }))
    }

    /// `create <path>(<column-defs>)` sent as plain text.
    pub fn create_table(&self, payload: &str) -> Result<Value> {
        Ok(self.apply_create(parse_create(payload)?))
    }

    /// `{"path": "<w::d::s::t>", "row": {...}}`
    pub fn insert_row(&self, body: &Value) -> Result<Value> {
        let path = body.get("path").and_then(Value::as_str).ok_or_else(|| {
            Error::InvalidRequest(
                "Missing or malformed 'path' field. Expected format: warehouse::database::schema::table"
                    .into(),
            )
        })?;
        let path: TablePath = path.parse()?;
        let object = body
            .get("row")
            .and_then(Value::as_object)
            .ok_or_else(|| Error::InvalidRequest("Missing or invalid 'row' field".into()))?;
        self.apply_insert(&path, row_from_json(object)?)
    }

    /// `<w::d::s::t>::<index>` sent as plain text.
    pub fn delete_row(&self, payload: &str) -> Result<Value> {
        self.apply_delete(&payload.parse()?)
    }

    /// `<w::d::s::t>` sent as plain text.
    pub fn fetch_table(&self, payload: &str) -> Result<Value> {
        let path: TablePath = payload.parse()?;
        Ok(json!(self.store.fetch_rows(&path)?))
    }

    pub fn show_tables(&self) -> Value {
        let tables: Vec<String> = self
            .store
            .list_tables()
            .iter()
            .map(ToString::to_string)
            .collect();
        json!({ "count": tables.len(), "tables": tables })
    }
}
