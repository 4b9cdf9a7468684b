// Driver boundary - the synchronous database API wrapped by the executor

pub mod sqlite;

pub use sqlite::{OpenOptions, SqliteDriver};

use crate::core::{CursorId, DriverError, ResultColumn, Value};

/// Table or view as reported by the driver's metadata.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableEntry {
    pub name: String,
    /// Object kind: `"TABLE"`, `"VIEW"`, `"SYSTEM TABLE"`.
    pub kind: String,
}

/// Column as reported by the driver's metadata.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnEntry {
    pub name: String,
    /// Numeric type code (JDBC numbering).
    pub type_code: i32,
}

/// Outcome of running one prepared statement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Execution {
    /// The statement produced a row set, readable through the cursor.
    Rows(CursorId),
    /// The statement produced no row set.
    Done { changes: usize },
}

/// Blocking, single-threaded database API.
///
/// Implementations are never called concurrently: every call happens on the
/// worker owned by the connection's serial executor. They only need to be
/// movable between threads.
pub trait Driver: Send + 'static {
    fn tables(&mut self) -> Result<Vec<TableEntry>, DriverError>;

    fn columns(&mut self, table: &str) -> Result<Vec<ColumnEntry>, DriverError>;

    fn primary_key_columns(&mut self, table: &str) -> Result<Vec<String>, DriverError>;

    /// Binds `params` positionally, executes the statement once and reports
    /// whether it produced a row set.
    fn prepare_and_execute(&mut self, sql: &str, params: &[Value]) -> Result<Execution, DriverError>;

    fn result_columns(&self, cursor: CursorId) -> Result<Vec<ResultColumn>, DriverError>;

    /// Advances the cursor; `None` once the row set is exhausted.
    fn next_row(&mut self, cursor: CursorId) -> Result<Option<Vec<Value>>, DriverError>;

    fn close_cursor(&mut self, cursor: CursorId) -> Result<(), DriverError>;

    fn close(self: Box<Self>) -> Result<(), DriverError>;
}
