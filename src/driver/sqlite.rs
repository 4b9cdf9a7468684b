use std::collections::{HashMap, VecDeque};
use std::path::{Path, PathBuf};

use rusqlite::types::{ToSqlOutput, Value as SqlValue, ValueRef};
use rusqlite::{params_from_iter, Connection, OpenFlags, ToSql};

use super::{ColumnEntry, Driver, Execution, TableEntry};
use crate::core::{CursorId, DriverError, ResultColumn, SqlType, Value};

/// Options for opening a database file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OpenOptions {
    pub read_only: bool,
    /// Create the file when it does not exist (ignored for read-only opens).
    pub create: bool,
}

impl Default for OpenOptions {
    fn default() -> Self {
        Self {
            read_only: false,
            create: true,
        }
    }
}

/// Row set kept open between `next_row` calls.
///
/// SQLite statements borrow their connection, so nothing prepared survives
/// a driver call. The statement is stepped to completion by
/// `prepare_and_execute` and its rows are handed out from here, unaffected
/// by later writes on the same connection.
struct OpenCursor {
    columns: Vec<ResultColumn>,
    rows: VecDeque<Vec<Value>>,
}

/// [`Driver`] over a local SQLite file.
pub struct SqliteDriver {
    conn: Connection,
    path: PathBuf,
    cursors: HashMap<CursorId, OpenCursor>,
    next_cursor: CursorId,
}

impl SqliteDriver {
    pub fn open(path: impl AsRef<Path>, options: &OpenOptions) -> Result<Self, DriverError> {
        let path = path.as_ref();
        let flags = if options.read_only {
            OpenFlags::SQLITE_OPEN_READ_ONLY
        } else if options.create {
            OpenFlags::SQLITE_OPEN_READ_WRITE | OpenFlags::SQLITE_OPEN_CREATE
        } else {
            OpenFlags::SQLITE_OPEN_READ_WRITE
        };
        let conn = Connection::open_with_flags(path, flags | OpenFlags::SQLITE_OPEN_URI)?;
        Ok(Self::from_connection(conn, path.to_path_buf()))
    }

    pub fn open_in_memory() -> Result<Self, DriverError> {
        let conn = Connection::open_in_memory()?;
        Ok(Self::from_connection(conn, PathBuf::from(":memory:")))
    }

    #[must_use]
    pub fn from_connection(conn: Connection, path: PathBuf) -> Self {
        Self {
            conn,
            path,
            cursors: HashMap::new(),
            next_cursor: 1,
        }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    #[must_use]
    pub fn open_cursor_count(&self) -> usize {
        self.cursors.len()
    }
}

impl Driver for SqliteDriver {
    fn tables(&mut self) -> Result<Vec<TableEntry>, DriverError> {
        let mut stmt = self.conn.prepare(
            "SELECT name, type FROM sqlite_master WHERE type IN ('table', 'view') ORDER BY type, name",
        )?;
        let tables = stmt
            .query_map([], |row| Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?)))?
            .map(|entry| {
                entry.map(|(name, kind)| TableEntry {
                    kind: table_kind(&name, &kind).to_string(),
                    name,
                })
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(tables)
    }

    fn columns(&mut self, table: &str) -> Result<Vec<ColumnEntry>, DriverError> {
        let mut stmt = self
            .conn
            .prepare("SELECT name, type FROM pragma_table_info(?1) ORDER BY cid")?;
        let columns = stmt
            .query_map([table], |row| Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?)))?
            .map(|entry| {
                entry.map(|(name, declared)| ColumnEntry {
                    name,
                    type_code: declared_sql_type(&declared).type_code(),
                })
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(columns)
    }

    fn primary_key_columns(&mut self, table: &str) -> Result<Vec<String>, DriverError> {
        let mut stmt = self
            .conn
            .prepare("SELECT name FROM pragma_table_info(?1) WHERE pk > 0 ORDER BY pk")?;
        let names = stmt
            .query_map([table], |row| row.get::<_, String>(0))?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(names)
    }

    fn prepare_and_execute(&mut self, sql: &str, params: &[Value]) -> Result<Execution, DriverError> {
        let sql = trim_statement(sql);
        let (columns, rows) = {
            let mut stmt = self.conn.prepare(sql)?;
            if stmt.column_count() == 0 {
                let changes = stmt.execute(params_from_iter(params.iter()))?;
                return Ok(Execution::Done { changes });
            }

            let columns = result_columns_of(&stmt);
            let mut rows = VecDeque::new();
            let mut source = stmt.query(params_from_iter(params.iter()))?;
            while let Some(row) = source.next()? {
                rows.push_back(read_row(row, columns.len())?);
            }
            (columns, rows)
        };

        let id = self.next_cursor;
        self.next_cursor += 1;
        self.cursors.insert(id, OpenCursor { columns, rows });
        Ok(Execution::Rows(id))
    }

    fn result_columns(&self, cursor: CursorId) -> Result<Vec<ResultColumn>, DriverError> {
        self.cursors
            .get(&cursor)
            .map(|c| c.columns.clone())
            .ok_or(DriverError::UnknownCursor(cursor))
    }

    fn next_row(&mut self, cursor: CursorId) -> Result<Option<Vec<Value>>, DriverError> {
        self.cursors
            .get_mut(&cursor)
            .map(|open| open.rows.pop_front())
            .ok_or(DriverError::UnknownCursor(cursor))
    }

    fn close_cursor(&mut self, cursor: CursorId) -> Result<(), DriverError> {
        self.cursors
            .remove(&cursor)
            .map(|_| ())
            .ok_or(DriverError::UnknownCursor(cursor))
    }

    fn close(self: Box<Self>) -> Result<(), DriverError> {
        let Self { conn, .. } = *self;
        conn.close().map_err(|(_, err)| DriverError::Sqlite(err))
    }
}

fn read_row(row: &rusqlite::Row<'_>, width: usize) -> Result<Vec<Value>, rusqlite::Error> {
    (0..width)
        .map(|i| row.get_ref(i).map(value_from_ref))
        .collect()
}

fn value_from_ref(value: ValueRef<'_>) -> Value {
    match value {
        ValueRef::Null => Value::Null,
        ValueRef::Integer(i) => Value::Integer(i),
        ValueRef::Real(r) => Value::Real(r),
        // SQLite does not validate TEXT; bytes that are not UTF-8 stay raw.
        ValueRef::Text(bytes) => String::from_utf8(bytes.to_vec())
            .map_or_else(|err| Value::Blob(err.into_bytes()), Value::Text),
        ValueRef::Blob(bytes) => Value::Blob(bytes.to_vec()),
    }
}

fn result_columns_of(stmt: &rusqlite::Statement<'_>) -> Vec<ResultColumn> {
    stmt.columns()
        .into_iter()
        .map(|column| ResultColumn {
            name: column.name().to_string(),
            declared_type: column
                .decl_type()
                .filter(|declared| !declared.trim().is_empty())
                .map(declared_sql_type),
        })
        .collect()
}

fn table_kind(name: &str, kind: &str) -> &'static str {
    if kind.eq_ignore_ascii_case("view") {
        "VIEW"
    } else if name.starts_with("sqlite_") {
        "SYSTEM TABLE"
    } else {
        "TABLE"
    }
}

/// Maps a declared column type onto [`SqlType`].
///
/// Follows SQLite's affinity rules (substring matches, in order), refined
/// for boolean and date/time names so their values can be decoded.
#[must_use]
pub fn declared_sql_type(declared: &str) -> SqlType {
    let upper = declared.to_ascii_uppercase();
    let has = |needle: &str| upper.contains(needle);

    if has("INT") {
        SqlType::Integer
    } else if has("BOOL") {
        SqlType::Boolean
    } else if has("CHAR") || has("CLOB") || has("TEXT") {
        SqlType::Varchar
    } else if has("BLOB") || upper.trim().is_empty() {
        SqlType::Blob
    } else if has("DOUB") {
        SqlType::Double
    } else if has("FLOA") {
        SqlType::Float
    } else if has("REAL") {
        SqlType::Real
    } else if has("DATETIME") || has("TIMESTAMP") {
        SqlType::Timestamp
    } else if has("DATE") {
        SqlType::Date
    } else if has("TIME") {
        SqlType::Time
    } else if has("DEC") {
        SqlType::Decimal
    } else {
        SqlType::Numeric
    }
}

fn trim_statement(sql: &str) -> &str {
    sql.trim().trim_end_matches(';').trim_end()
}

impl ToSql for Value {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(match self {
            Self::Null => ToSqlOutput::Owned(SqlValue::Null),
            Self::Integer(i) => ToSqlOutput::Owned(SqlValue::Integer(*i)),
            Self::Real(r) => ToSqlOutput::Owned(SqlValue::Real(*r)),
            Self::Text(s) => ToSqlOutput::Borrowed(ValueRef::Text(s.as_bytes())),
            Self::Blob(b) => ToSqlOutput::Borrowed(ValueRef::Blob(b)),
            Self::Boolean(b) => ToSqlOutput::Owned(SqlValue::Integer(i64::from(*b))),
            Self::Date(d) => ToSqlOutput::Owned(SqlValue::Text(d.format("%Y-%m-%d").to_string())),
            Self::Timestamp(t) => {
                ToSqlOutput::Owned(SqlValue::Text(t.format("%Y-%m-%d %H:%M:%S%.f").to_string()))
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn driver() -> SqliteDriver {
        let mut driver = SqliteDriver::open_in_memory().unwrap();
        for sql in [
            "CREATE TABLE users (id INTEGER PRIMARY KEY, name TEXT NOT NULL, active BOOLEAN)",
            "CREATE TABLE tags (label VARCHAR(20), weight REAL)",
            "CREATE VIEW active_users AS SELECT id, name FROM users WHERE active = 1",
        ] {
            driver.prepare_and_execute(sql, &[]).unwrap();
        }
        driver
    }

    fn insert_users(driver: &mut SqliteDriver, count: i64) {
        for i in 1..=count {
            driver
                .prepare_and_execute(
                    "INSERT INTO users (id, name, active) VALUES (?, ?, ?)",
                    &[Value::Integer(i), Value::Text(format!("user{i}")), Value::Boolean(i % 2 == 0)],
                )
                .unwrap();
        }
    }

    fn drain(driver: &mut SqliteDriver, cursor: CursorId) -> Vec<Vec<Value>> {
        let mut rows = Vec::new();
        while let Some(row) = driver.next_row(cursor).unwrap() {
            rows.push(row);
        }
        rows
    }

    #[test]
    fn test_declared_sql_type_affinity() {
        assert_eq!(declared_sql_type("INTEGER"), SqlType::Integer);
        assert_eq!(declared_sql_type("bigint"), SqlType::Integer);
        assert_eq!(declared_sql_type("VARCHAR(255)"), SqlType::Varchar);
        assert_eq!(declared_sql_type("TEXT"), SqlType::Varchar);
        assert_eq!(declared_sql_type(""), SqlType::Blob);
        assert_eq!(declared_sql_type("DOUBLE PRECISION"), SqlType::Double);
        assert_eq!(declared_sql_type("BOOLEAN"), SqlType::Boolean);
        assert_eq!(declared_sql_type("DATETIME"), SqlType::Timestamp);
        assert_eq!(declared_sql_type("DATE"), SqlType::Date);
        assert_eq!(declared_sql_type("DECIMAL(10,2)"), SqlType::Decimal);
        assert_eq!(declared_sql_type("MONEY"), SqlType::Numeric);
    }

    #[test]
    fn test_tables_report_kind() {
        let mut driver = driver();
        let tables = driver.tables().unwrap();
        let kinds: Vec<(&str, &str)> = tables
            .iter()
            .map(|t| (t.name.as_str(), t.kind.as_str()))
            .collect();
        assert_eq!(
            kinds,
            vec![("tags", "TABLE"), ("users", "TABLE"), ("active_users", "VIEW")]
        );
    }

    #[test]
    fn test_columns_and_primary_key() {
        let mut driver = driver();
        let columns = driver.columns("users").unwrap();
        assert_eq!(columns.len(), 3);
        assert_eq!(columns[0].name, "id");
        assert_eq!(columns[0].type_code, SqlType::Integer.type_code());
        assert_eq!(columns[1].type_code, SqlType::Varchar.type_code());
        assert_eq!(driver.primary_key_columns("users").unwrap(), vec!["id".to_string()]);
        assert!(driver.primary_key_columns("tags").unwrap().is_empty());
    }

    #[test]
    fn test_non_query_reports_changes() {
        let mut driver = driver();
        let execution = driver
            .prepare_and_execute("INSERT INTO tags VALUES ('a', 1.0), ('b', 2.0);", &[])
            .unwrap();
        assert_eq!(execution, Execution::Done { changes: 2 });
    }

    #[test]
    fn test_rows_unaffected_by_later_writes() {
        let mut driver = driver();
        insert_users(&mut driver, 6);

        let Execution::Rows(cursor) = driver
            .prepare_and_execute("SELECT id FROM users WHERE id > ? ORDER BY id", &[Value::Integer(1)])
            .unwrap()
        else {
            panic!("expected a row set");
        };

        let mut ids = Vec::new();
        while let Some(mut row) = driver.next_row(cursor).unwrap() {
            let id = row.remove(0);
            driver
                .prepare_and_execute("DELETE FROM users WHERE id = ?", std::slice::from_ref(&id))
                .unwrap();
            ids.push(id);
        }
        assert_eq!(ids, (2..=6).map(Value::Integer).collect::<Vec<_>>());
        assert_eq!(driver.next_row(cursor).unwrap(), None);
    }

    #[test]
    fn test_returning_statement_runs_once() {
        let mut driver = driver();
        let Execution::Rows(cursor) = driver
            .prepare_and_execute(
                "INSERT INTO tags VALUES ('x', 1.5), ('y', 2.5) RETURNING label",
                &[],
            )
            .unwrap()
        else {
            panic!("expected a row set");
        };
        assert_eq!(drain(&mut driver, cursor).len(), 2);
        driver.close_cursor(cursor).unwrap();

        let Execution::Rows(count) = driver.prepare_and_execute("SELECT COUNT(*) FROM tags", &[]).unwrap() else {
            panic!("expected a row set");
        };
        assert_eq!(driver.next_row(count).unwrap(), Some(vec![Value::Integer(2)]));
    }

    #[test]
    fn test_result_columns_carry_declared_types() {
        let mut driver = driver();
        let Execution::Rows(cursor) = driver
            .prepare_and_execute("SELECT id, active, COUNT(*) AS n FROM users", &[])
            .unwrap()
        else {
            panic!("expected a row set");
        };
        let columns = driver.result_columns(cursor).unwrap();
        assert_eq!(columns[0].declared_type, Some(SqlType::Integer));
        assert_eq!(columns[1].declared_type, Some(SqlType::Boolean));
        assert_eq!(columns[2].name, "n");
        assert_eq!(columns[2].declared_type, None);
    }

    #[test]
    fn test_close_cursor_releases_it() {
        let mut driver = driver();
        let Execution::Rows(cursor) = driver.prepare_and_execute("SELECT 1", &[]).unwrap() else {
            panic!("expected a row set");
        };
        assert_eq!(driver.open_cursor_count(), 1);
        driver.close_cursor(cursor).unwrap();
        assert_eq!(driver.open_cursor_count(), 0);
        assert!(matches!(
            driver.next_row(cursor),
            Err(DriverError::UnknownCursor(id)) if id == cursor
        ));
    }

    #[test]
    fn test_malformed_sql_is_an_error() {
        let mut driver = driver();
        assert!(matches!(
            driver.prepare_and_execute("SELEC nope", &[]),
            Err(DriverError::Sqlite(_))
        ));
    }

    #[test]
    fn test_comment_after_semicolon() {
        let mut driver = driver();
        insert_users(&mut driver, 3);
        let Execution::Rows(cursor) = driver
            .prepare_and_execute("SELECT id FROM users ORDER BY id; -- every user", &[])
            .unwrap()
        else {
            panic!("expected a row set");
        };
        assert_eq!(drain(&mut driver, cursor).len(), 3);
    }

    #[test]
    fn test_invalid_utf8_text_stays_raw() {
        let mut driver = driver();
        let Execution::Rows(cursor) = driver
            .prepare_and_execute("SELECT CAST(x'fffe' AS TEXT), CAST(x'6869' AS TEXT)", &[])
            .unwrap()
        else {
            panic!("expected a row set");
        };
        assert_eq!(
            driver.next_row(cursor).unwrap(),
            Some(vec![Value::Blob(vec![0xff, 0xfe]), Value::Text("hi".to_string())])
        );
    }
}
