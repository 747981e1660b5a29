pub mod command;
pub mod path;
pub mod schema;

pub use command::{Command, Stmt};
pub use path::{RowAddress, TablePath};
pub use schema::{CreateTable, parse_create};
