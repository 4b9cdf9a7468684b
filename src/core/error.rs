use thiserror::Error;

/// Identifier of a row cursor held open inside a driver.
pub type CursorId = u64;

/// Failures raised by the synchronous driver underneath the executor.
#[derive(Error, Debug)]
pub enum DriverError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("Cursor #{0} is not open")]
    UnknownCursor(CursorId),
    #[error("Unknown column type code {0}")]
    UnknownTypeCode(i32),
    #[error("{0}")]
    Other(String),
}

#[derive(Error, Debug)]
pub enum CursorError {
    #[error("Cursor is closed")]
    Closed,
    #[error("{0}")]
    Driver(#[from] DriverError),
}

#[derive(Error, Debug)]
pub enum DatabaseError {
    #[error("Database connection is closed")]
    ConnectionClosed,
    #[error("Failed to open database '{path}': {source}")]
    Open {
        path: String,
        #[source]
        source: DriverError,
    },
    #[error("Failed to close database: {0}")]
    Close(#[source] DriverError),
    #[error("Failed to read database schema: {0}")]
    MetadataRead(#[source] DriverError),
    #[error("Statement failed: {0}")]
    Statement(#[source] DriverError),
    #[error("Cursor error: {0}")]
    Cursor(#[from] CursorError),
    #[error("Operation aborted before completion")]
    OperationAborted,
    #[error("No async runtime to run the worker on: {0}")]
    Runtime(#[from] tokio::runtime::TryCurrentError),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
