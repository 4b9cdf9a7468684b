// sqlite-inspector - serialized asynchronous access to local SQLite databases
// One worker per connection: every driver call runs one at a time, in order

// Clippy configuration - allow non-critical warnings
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::cast_possible_wrap)]
#![allow(clippy::too_many_lines)]
#![allow(clippy::needless_pass_by_value)]
#![allow(clippy::match_same_arms)]
#![allow(clippy::significant_drop_tightening)]
#![allow(clippy::manual_let_else)]
#![allow(clippy::option_if_let_else)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::float_cmp)]
#![allow(clippy::multiple_crate_versions)]

// Core data model (values, types, schema, statements, errors)
pub mod core;

// Backward compatibility - re-export all core types as types module
pub mod types {
    pub use crate::core::*;
}

// Driver boundary (Driver trait, SQLite implementation)
pub mod driver;

// Serial executor, schema reader, statement executor, cursors
pub mod executor;

// Connection facade
pub mod connection;

// Layered settings (file, environment)
pub mod config;

// Interactive input parser (meta-commands, bound parameters)
pub mod parser;

// Re-export commonly used types for convenience
pub use crate::core::{
    Column, CursorError, DatabaseError, DriverError, ResultColumn, Row, RowIdName, Schema, SqlType,
    Statement, Table, Value,
};
pub use connection::DatabaseConnection;
pub use driver::{Driver, OpenOptions, SqliteDriver};
pub use executor::{Completion, Cursor, CursorState, SerialExecutor};
pub use config::Settings;
pub use parser::{Command, parse_command};
