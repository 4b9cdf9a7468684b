/// Statement executor - prepares, binds and runs one statement
///
/// Classifies the outcome: a row set stays open in the driver behind a
/// cursor id, anything else reports the number of changed rows.

use tracing::info;

use crate::core::{CursorId, DriverError, ResultColumn, Statement};
use crate::driver::{Driver, Execution};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StatementOutcome {
    Rows {
        cursor: CursorId,
        columns: Vec<ResultColumn>,
    },
    Done {
        changes: usize,
    },
}

pub struct StatementExecutor;

impl StatementExecutor {
    /// Runs `statement` once, binding its parameters positionally.
    pub fn execute(driver: &mut dyn Driver, statement: &Statement) -> Result<StatementOutcome, DriverError> {
        let outcome = match driver.prepare_and_execute(&statement.text, &statement.params)? {
            Execution::Rows(cursor) => match driver.result_columns(cursor) {
                Ok(columns) => StatementOutcome::Rows { cursor, columns },
                Err(err) => {
                    // Release the row set before reporting the failure.
                    let _ = driver.close_cursor(cursor);
                    return Err(err);
                }
            },
            Execution::Done { changes } => StatementOutcome::Done { changes },
        };

        info!("SQL statement \"{}\" executed with success.", statement.text);
        Ok(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{SqlType, Value};
    use crate::driver::SqliteDriver;

    fn driver() -> SqliteDriver {
        let mut driver = SqliteDriver::open_in_memory().unwrap();
        driver
            .prepare_and_execute("CREATE TABLE items (id INTEGER PRIMARY KEY, label TEXT UNIQUE)", &[])
            .unwrap();
        driver
    }

    #[test]
    fn test_insert_has_no_row_set() {
        let mut driver = driver();
        let statement = Statement::new("INSERT INTO items (label) VALUES (?)").bind(Value::Text("a".into()));
        assert_eq!(
            StatementExecutor::execute(&mut driver, &statement).unwrap(),
            StatementOutcome::Done { changes: 1 }
        );
    }

    #[test]
    fn test_select_opens_cursor_with_columns() {
        let mut driver = driver();
        let outcome = StatementExecutor::execute(&mut driver, &Statement::new("SELECT id, label FROM items")).unwrap();
        let StatementOutcome::Rows { cursor, columns } = outcome else {
            panic!("expected a row set");
        };
        assert_eq!(columns.len(), 2);
        assert_eq!(columns[0].declared_type, Some(SqlType::Integer));
        assert_eq!(driver.open_cursor_count(), 1);
        driver.close_cursor(cursor).unwrap();
    }

    #[test]
    fn test_constraint_violation_is_reported() {
        let mut driver = driver();
        let insert = Statement::new("INSERT INTO items (label) VALUES (?)").bind(Value::Text("dup".into()));
        StatementExecutor::execute(&mut driver, &insert).unwrap();
        assert!(StatementExecutor::execute(&mut driver, &insert).is_err());
    }

    #[test]
    fn test_parameter_count_mismatch_is_reported() {
        let mut driver = driver();
        let statement = Statement::new("INSERT INTO items (id, label) VALUES (?, ?)").bind(Value::Integer(1));
        assert!(StatementExecutor::execute(&mut driver, &statement).is_err());
    }
}
