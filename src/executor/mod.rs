/// Executor module - serialized access to one database driver
///
/// Structure:
/// - serial: single-worker FIFO queue that owns the driver
/// - schema_reader: schema snapshot from driver metadata
/// - statement: prepare/bind/execute and outcome classification
/// - cursor: row iteration routed back through the serial queue

pub mod serial;
pub mod schema_reader;
pub mod statement;
pub mod cursor;

pub use serial::{Completion, SerialExecutor};
pub use schema_reader::SchemaReader;
pub use statement::{StatementExecutor, StatementOutcome};
pub use cursor::{Cursor, CursorState};
