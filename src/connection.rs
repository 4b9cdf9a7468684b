use std::path::{Path, PathBuf};

use tokio::runtime::Handle;
use tracing::info;

use crate::core::{DatabaseError, Schema, Statement};
use crate::driver::{Driver, OpenOptions, SqliteDriver};
use crate::executor::{Completion, Cursor, SchemaReader, SerialExecutor, StatementExecutor, StatementOutcome};

/// Asynchronous handle to one database file.
///
/// Every operation is queued on the connection's serial executor and runs
/// against the driver one at a time, in submission order. Clones share the
/// same queue, so a connection can be handed to as many threads as needed.
#[derive(Clone)]
pub struct DatabaseConnection {
    path: PathBuf,
    executor: SerialExecutor,
}

impl DatabaseConnection {
    /// Opens a SQLite file and starts its worker on the current runtime.
    pub async fn open(path: impl AsRef<Path>, options: OpenOptions) -> Result<Self, DatabaseError> {
        let path = path.as_ref().to_path_buf();
        let driver_path = path.clone();
        let driver = tokio::task::spawn_blocking(move || SqliteDriver::open(&driver_path, &options))
            .await
            .map_err(|_| DatabaseError::OperationAborted)?
            .map_err(|source| DatabaseError::Open {
                path: path.display().to_string(),
                source,
            })?;

        info!("Successfully opened database: {}", path.display());
        Self::from_driver(path, Box::new(driver))
    }

    /// Wraps an already opened driver. The connection owns it from now on.
    pub fn from_driver(path: impl Into<PathBuf>, driver: Box<dyn Driver>) -> Result<Self, DatabaseError> {
        let path = path.into();
        let executor = SerialExecutor::spawn_current(executor_name(&path), driver)?;
        Ok(Self { path, executor })
    }

    /// Like [`DatabaseConnection::from_driver`], with the worker on `runtime`.
    pub fn with_runtime(path: impl Into<PathBuf>, driver: Box<dyn Driver>, runtime: &Handle) -> Self {
        let path = path.into();
        let executor = SerialExecutor::spawn(executor_name(&path), driver, runtime);
        Self { path, executor }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// True once `close` has been requested.
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.executor.is_closed()
    }

    /// Closes the driver connection. Terminal: every later operation fails
    /// with `ConnectionClosed`, including a second `close`.
    pub fn close(&self) -> Completion<()> {
        let path = self.path.clone();
        self.executor.close(move |driver| {
            driver.close().map_err(DatabaseError::Close)?;
            info!("Successfully closed database: {}", path.display());
            Ok(())
        })
    }

    /// Reads a fresh snapshot of every table and view.
    pub fn read_schema(&self) -> Completion<Schema> {
        let path = self.path.clone();
        self.executor.submit(move |driver| {
            let schema = SchemaReader::read(driver).map_err(DatabaseError::MetadataRead)?;
            info!("Successfully read database schema: {}", path.display());
            Ok(schema)
        })
    }

    /// Executes one statement. Yields a cursor when it produced a row set.
    pub fn execute(&self, statement: impl Into<Statement>) -> Completion<Option<Cursor>> {
        let statement = statement.into();
        let executor = self.executor.clone();
        self.executor.submit(move |driver| {
            match StatementExecutor::execute(driver, &statement).map_err(DatabaseError::Statement)? {
                StatementOutcome::Rows { cursor, columns } => Ok(Some(Cursor::new(cursor, columns, executor))),
                StatementOutcome::Done { .. } => Ok(None),
            }
        })
    }
}

impl std::fmt::Debug for DatabaseConnection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DatabaseConnection")
            .field("path", &self.path)
            .field("closed", &self.is_closed())
            .finish()
    }
}

fn executor_name(path: &Path) -> String {
    format!("sqlite:{}", path.display())
}
