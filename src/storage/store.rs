use super::validator::{self, PrimaryKeyMode};
use super::{Column, Row, TableMetadata};
use crate::error::{Error, Result};
use crate::query::{RowAddress, TablePath};
use parking_lot::{Mutex, RwLock};
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{debug, info};

type Table = Arc<Mutex<TableMetadata>>;
type Schemas = BTreeMap<String, BTreeMap<String, Table>>;
type Databases = BTreeMap<String, Schemas>;
type Warehouses = BTreeMap<String, Databases>;

/// In-memory tables addressed as `warehouse::database::schema::table`.
///
/// The hierarchy is guarded by one read-write lock and every table by its own mutex,
/// so writers to different tables never wait on each other.
#[derive(Default)]
pub struct TableStore {
    warehouses: RwLock<Warehouses>,
    key_mode: PrimaryKeyMode,
}

impl TableStore {
    pub fn new(key_mode: PrimaryKeyMode) -> Self {
        Self {
            warehouses: RwLock::new(Warehouses::new()),
            key_mode,
        }
    }

    /// Creates the table, replacing any table already at `path` along with its rows.
    pub fn create_table(&self, path: &TablePath, columns: Vec<Column>) {
        let mut warehouses = self.warehouses.write();
        let replaced = warehouses
            .entry(path.warehouse.clone())
            .or_default()
            .entry(path.database.clone())
            .or_default()
            .entry(path.schema.clone())
            .or_default()
            .insert(
                path.table.clone(),
                Arc::new(Mutex::new(TableMetadata::new(columns))),
            )
            .is_some();
        if replaced {
            info!(%path, "table replaced");
        } else {
            info!(%path, "table created");
        }
    }

    fn table(&self, path: &TablePath) -> Result<Table> {
        self.warehouses
            .read()
            .get(&path.warehouse)
            .and_then(|dbs| dbs.get(&path.database))
            .and_then(|schemas| schemas.get(&path.schema))
            .and_then(|tables| tables.get(&path.table))
            .cloned()
            .ok_or_else(|| Error::TableNotFound(path.clone()))
    }

    /// Snapshot of the schema and rows at `path`.
    pub fn lookup(&self, path: &TablePath) -> Result<TableMetadata> {
        Ok(self.table(path)?.lock().clone())
    }

    /// Validates `row` and appends it, returning the row as stored.
    pub fn insert_row(&self, path: &TablePath, row: Row) -> Result<Row> {
        let table = self.table(path)?;
        let mut meta = table.lock();
        let row = validator::validate(&meta.schema, &meta.rows, row, self.key_mode)?;
        meta.rows.push(row.clone());
        debug!(%path, rows = meta.rows.len(), "row inserted");
        Ok(row)
    }

    /// Removes the row at `addr.index`; later rows shift down by one.
    pub fn delete_row_at(&self, addr: &RowAddress) -> Result<Row> {
        let table = self.table(&addr.path)?;
        let mut meta = table.lock();
        let len = meta.rows.len();
        if addr.index >= len {
            return Err(Error::IndexOutOfRange {
                index: addr.index,
                len,
            });
        }
        let row = meta.rows.remove(addr.index);
        debug!(path = %addr.path, index = addr.index, "row deleted");
        Ok(row)
    }

    pub fn fetch_rows(&self, path: &TablePath) -> Result<Vec<Row>> {
        Ok(self.table(path)?.lock().rows.clone())
    }

    /// Every table currently present, in depth-first key order.
    pub fn list_tables(&self) -> Vec<TablePath> {
        let warehouses = self.warehouses.read();
        let mut paths = Vec::new();
        for (warehouse, dbs) in warehouses.iter() {
            for (database, schemas) in dbs {
                for (schema, tables) in schemas {
                    for table in tables.keys() {
                        paths.push(TablePath::new(warehouse, database, schema, table));
                    }
                }
            }
        }
        paths
    }
}
